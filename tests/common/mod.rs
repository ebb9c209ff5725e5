//! Shared test utilities

pub mod mock_api;

#[allow(unused_imports)]
pub use mock_api::*;
