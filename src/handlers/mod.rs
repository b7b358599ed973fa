//! Event Handling Module
//!
//! Sits between raw terminal events and application state changes.
//!
//! # Module Organization
//!
//! - **`keys`**: Keyboard input processing and navigation logic
//! - **`ai`**: Background AI requests and their result messages

pub mod ai;
pub mod keys;
