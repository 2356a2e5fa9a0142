//! Restaurant-data provider abstractions and implementations.
//!
//! This module contains:
//! - The `ProviderAdapter` trait that all providers implement
//! - Provider capabilities (location support, page and radius limits)
//! - The `ProviderConnector` seam that turns credential bundles into adapters
//! - Concrete provider implementations (Yelp, Foursquare, Zomato, Factual)
//!
//! # Architecture
//!
//! Adapters never see each other or the aggregator. Each one translates a
//! canonical query into its own request, executes it with credentials it owns,
//! and normalizes the payload back into canonical records. Rebuilding
//! credentials produces a fresh adapter instead of mutating a live one.

mod capabilities;
mod connector;
mod http;
mod traits;

pub mod factual;
pub mod foursquare;
pub mod yelp;
pub mod zomato;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use connector::{HttpConnector, ProviderConnector};
pub use http::build_client;
pub use traits::{ProviderAdapter, ProviderRequest, ProviderResponse, Translation};
