//! Input validation utilities

use crate::error::CliError;

/// Validate a logical table name before it reaches the remote store.
/// Names are 3-63 characters, alphanumeric, and start with a letter.
pub fn validate_table_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(CliError::InvalidArguments("Table name cannot be empty".to_string()).into());
    }

    if name.len() < 3 || name.len() > 63 {
        return Err(CliError::InvalidArguments(format!(
            "Invalid table name '{}': must be 3-63 characters",
            name
        ))
        .into());
    }

    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CliError::InvalidArguments(format!(
            "Invalid table name '{}': must be alphanumeric and start with a letter",
            name
        ))
        .into());
    }

    Ok(())
}
