//! Utils module - Shared utilities and helpers

/// Bounded retry with credential-rotation hook
pub mod retry;

/// Input validation and sanitization utilities
pub mod validation;
