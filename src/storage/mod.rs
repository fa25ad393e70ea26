//! Storage layer for tabq
//!
//! Handles configuration file management and the credential store that
//! re-reads rotated SAS tokens from it.

use crate::error::ConfigError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, ConfigError>;
