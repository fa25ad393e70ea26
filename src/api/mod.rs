//! Table storage API layer
//!
//! `TableClient` is a bound connection handle (one endpoint, one credential
//! snapshot); `ClientFactory` owns the cached handle and rebinds it after a
//! credential rotation.

pub mod client;
pub mod factory;
pub mod models;
