//! GlobalFood models
//!
//! This module contains the core data types:
//! - `types` - Provider identity (ProviderKind)
//! - `credentials` - Per-provider credential bundles (Credentials, CredentialBundle)
//! - `geo` - Coordinates and distance
//! - `query` - Caller input and its validated form (SearchRequest, CanonicalQuery)
//! - `record` - Canonical restaurant record (CanonicalRecord, PriceTier, SourceTag)
//! - `result` - Search output (AggregatedResult, ProviderStatus, SkipReason)

mod credentials;
mod geo;
mod query;
mod record;
mod result;
mod types;

pub use credentials::{BundleValidity, CredentialBundle, Credentials};
pub use geo::Coordinates;
pub use query::{CanonicalQuery, SearchRequest};
pub use record::{CanonicalRecord, PriceTier, SourceTag};
pub use result::{AggregatedResult, ProviderStatus, SkipReason};
pub use types::ProviderKind;
