//! Core query logic: the paginated executor and the table read service.

pub mod query;
pub mod services;
