use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use global_food::{Credentials, SearchRequest};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Search restaurants across every configured provider.
#[derive(Parser, Debug)]
#[command(name = "global-food")]
#[command(about = "Search Yelp, Foursquare, Zomato and Factual in one go")]
pub struct Args {
    /// Latitude of the search center
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the search center
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Free-text place, e.g. "New York"
    #[arg(long)]
    pub place: Option<String>,

    /// What to look for, e.g. "pizza"
    #[arg(short, long)]
    pub term: Option<String>,

    /// Search radius in meters
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Maximum number of merged results
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// JSON credentials file (nested or flat layout). Defaults to GF_* variables.
    #[arg(short, long, env = "GF_CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// Print provider states instead of searching
    #[arg(long)]
    pub states: bool,
}

impl Args {
    pub fn search_request(&self) -> SearchRequest {
        let mut request = SearchRequest::default();
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            request = SearchRequest::near(lat, lng);
        }
        if let Some(place) = &self.place {
            request.place = Some(place.clone());
        }
        if let Some(term) = &self.term {
            request = request.with_term(term.clone());
        }
        if let Some(radius) = self.radius {
            request = request.with_radius(radius);
        }
        if let Some(limit) = self.limit {
            request = request.with_limit(limit);
        }
        request
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("GF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn load_credentials(path: Option<&Path>) -> anyhow::Result<Credentials> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read credentials from {}", path.display()))?;
            Credentials::from_json_str(&raw)
                .with_context(|| format!("Invalid credentials file {}", path.display()))
        }
        None => Ok(Credentials::from_env()),
    }
}
