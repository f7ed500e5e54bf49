//! Request handlers.
//!
//! Handlers stay thin: they resolve the caller, delegate to the core
//! services in [`AppState`](crate::state::AppState), publish an event for
//! every state change and map errors via [`AppError`](crate::error::AppError).

pub mod edits;
pub mod recognition;
pub mod validation;
