//! GlobalFood Crate
//!
//! One search interface over several restaurant-data APIs.
//!
//! # Overview
//!
//! The crate supports:
//! - Four providers: Yelp Fusion, Foursquare, Zomato and Factual
//! - Partial credential updates with background token handshakes
//! - Concurrent fan-out with per-provider timeouts and failure isolation
//! - Duplicate detection across providers, attribute voting and ranking
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  SearchRequest   | --> |  CanonicalQuery  |  (validated input)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | CredentialStore  |  (ready adapters snapshot)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Aggregator     |  (concurrent dispatch)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderAdapter  |  (Yelp, Foursquare, etc.)
//!                          +------------------+
//!                                  |
//!                                  v
//!                         +--------------------+
//!                         |  AggregatedResult  |  (merged, ranked records)
//!                         +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`GlobalFood`] - The facade callers hold
//! - [`Credentials`] - Per-provider credential bundles
//! - [`SearchRequest`] - Caller search input
//! - [`CanonicalRecord`] - Provider-neutral restaurant record
//! - [`AggregatedResult`] - Ranked records plus per-provider status
//!
//! # Example
//!
//! ```no_run
//! use global_food::{Credentials, GlobalFood, SearchRequest};
//!
//! # async fn run() -> Result<(), global_food::GlobalFoodError> {
//! let client = GlobalFood::new(Credentials::from_env()).await;
//! client.wait_for_handshakes().await;
//!
//! let result = client
//!     .search(SearchRequest::near(40.7301, -73.9971).with_term("pizza"))
//!     .await?;
//! for record in &result.records {
//!     println!("{} ({} sources)", record.name, record.sources.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GlobalFood;
pub use config::Config;
pub use errors::{ErrorScope, GlobalFoodError};

// Re-export all public types from models
pub use models::{
    AggregatedResult, BundleValidity, CanonicalQuery, CanonicalRecord, Coordinates,
    CredentialBundle, Credentials, PriceTier, ProviderKind, ProviderStatus, SearchRequest,
    SkipReason, SourceTag,
};

// Re-export provider types
pub use provider::factual::FactualAdapter;
pub use provider::foursquare::FoursquareAdapter;
pub use provider::yelp::YelpAdapter;
pub use provider::zomato::ZomatoAdapter;
pub use provider::{
    HttpConnector, ProviderAdapter, ProviderCapabilities, ProviderConnector, ProviderRequest,
    ProviderResponse, Translation,
};

// Re-export registry types
pub use registry::{CredentialReport, ProviderHealth, ProviderState, UpdateOutcome};
