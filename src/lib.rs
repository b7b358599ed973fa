//! pantrypal - Pantry-driven recipe discovery
//!
//! Library half of the pantrypal application. It holds everything that is not
//! a screen or a command line:
//! - The pantry store, its persistence adapters and the hydration binding
//! - The built-in recipe catalog and the ingredient matcher
//! - The AI flows for ingredient standardization, recipe suggestion,
//!   meal planning and recipe illustration
//! - Configuration, logging and error types shared by the binary

pub mod ai;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pantry;
pub mod search;
pub mod storage;

pub use error::{AiError, Error, Result};
