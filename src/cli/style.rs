//! Terminal styling helpers

use owo_colors::{OwoColorize, Stream, Style};

/// Styling shortcuts that respect `NO_COLOR` and non-tty output
pub trait Stylize: std::fmt::Display + Sized {
    /// Bold
    fn emphasis(&self) -> String {
        self.styled(Style::new().bold())
    }

    /// Cyan highlight
    fn accent(&self) -> String {
        self.styled(Style::new().cyan())
    }

    /// Dimmed
    fn muted(&self) -> String {
        self.styled(Style::new().dimmed())
    }

    /// Green
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Yellow
    fn warn(&self) -> String {
        self.styled(Style::new().yellow())
    }

    /// Red
    fn error(&self) -> String {
        self.styled(Style::new().red())
    }

    /// Apply `style` when stdout supports color
    fn styled(&self, style: Style) -> String {
        self.if_supports_color(Stream::Stdout, |s| s.style(style))
            .to_string()
    }
}

impl<T: std::fmt::Display> Stylize for T {}

/// Check mark
pub const CHECK: &str = "\u{2713}";

/// Cross mark
pub const CROSS: &str = "\u{2717}";
