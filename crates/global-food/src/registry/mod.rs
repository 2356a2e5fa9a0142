//! Provider registry module.
//!
//! This module manages provider credentials and lifecycle:
//! - Merging partial credential updates per provider
//! - Building adapters, in the background when a token handshake is needed
//! - Snapshotting ready adapters for a search

mod credential_store;
mod state;

pub use credential_store::{CredentialReport, CredentialStore, StoreSnapshot, UpdateOutcome};
pub use state::{ProviderHealth, ProviderState};
