//! Per-provider credential bundles.
//!
//! Bundles are opaque string maps. Which fields a provider needs is declared on
//! [`ProviderKind`]; the store only merges and checks them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderKind;
use crate::errors::GlobalFoodError;

/// Flat camel-case keys of the single-object credential layout.
const LEGACY_KEYS: &[(&str, ProviderKind, &str)] = &[
    ("yelpID", ProviderKind::Yelp, "client_id"),
    ("yelpSecret", ProviderKind::Yelp, "client_secret"),
    ("foursquareID", ProviderKind::Foursquare, "client_id"),
    ("foursquareSecret", ProviderKind::Foursquare, "client_secret"),
    ("foursquareVersion", ProviderKind::Foursquare, "version"),
    ("foursquareMode", ProviderKind::Foursquare, "mode"),
    ("zomatoKey", ProviderKind::Zomato, "user_key"),
    ("factualKey", ProviderKind::Factual, "key"),
    ("factualSecret", ProviderKind::Factual, "secret"),
];

/// Result of checking a bundle against a provider's required fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundleValidity {
    /// Every required field is present and non-blank.
    Valid,
    /// A required field is absent.
    Missing { field: &'static str },
    /// A required field is present but blank after trimming.
    Blank { field: &'static str },
}

/// Field name -> value map for a single provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBundle(BTreeMap<String, String>);

impl CredentialBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Trimmed value of a field, `None` when absent or blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite fields present in `update`, keep the rest.
    pub fn merge(&mut self, update: &CredentialBundle) {
        for (field, value) in &update.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn check(&self, kind: ProviderKind) -> BundleValidity {
        let mut missing = None;
        for field in kind.required_fields() {
            match self.0.get(*field) {
                Some(value) if value.trim().is_empty() => {
                    return BundleValidity::Blank { field };
                }
                Some(_) => {}
                None => {
                    missing.get_or_insert(*field);
                }
            }
        }
        match missing {
            Some(field) => BundleValidity::Missing { field },
            None => BundleValidity::Valid,
        }
    }
}

/// Credentials for any subset of providers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<ProviderKind, CredentialBundle>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ProviderKind, bundle: CredentialBundle) -> Self {
        self.0.insert(kind, bundle);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&CredentialBundle> {
        self.0.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProviderKind, &CredentialBundle)> {
        self.0.iter()
    }

    /// Build from the flat `yelpID` / `zomatoKey` style keys.
    ///
    /// Unknown keys are ignored.
    pub fn from_legacy<K, V, I>(fields: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut credentials = Self::new();
        for (key, value) in fields {
            if let Some((_, kind, field)) = LEGACY_KEYS.iter().find(|(k, _, _)| *k == key.as_ref())
            {
                credentials
                    .0
                    .entry(*kind)
                    .or_default()
                    .set(*field, value.into());
            }
        }
        credentials
    }

    /// Parse JSON in either the nested (`{"yelp": {...}}`) or the legacy flat layout.
    pub fn from_json_str(raw: &str) -> Result<Self, GlobalFoodError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| GlobalFoodError::invalid_input(format!("credentials: {}", e)))?;
        let object = value.as_object().ok_or_else(|| {
            GlobalFoodError::invalid_input("credentials must be a JSON object")
        })?;

        let nested = object
            .iter()
            .any(|(k, v)| k.parse::<ProviderKind>().is_ok() && v.is_object());
        if nested {
            return serde_json::from_value(value)
                .map_err(|e| GlobalFoodError::invalid_input(format!("credentials: {}", e)));
        }

        Ok(Self::from_legacy(object.iter().filter_map(|(k, v)| {
            v.as_str().map(|s| (k.as_str(), s.to_string()))
        })))
    }

    /// Read `GF_<PROVIDER>_<FIELD>` variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::new();
        for kind in ProviderKind::ALL {
            let fields = kind
                .required_fields()
                .iter()
                .chain(kind.optional_fields().iter());
            for field in fields {
                let name = env_var_name(kind, field);
                if let Some(value) = lookup(&name) {
                    credentials.0.entry(kind).or_default().set(*field, value);
                }
            }
        }
        credentials
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn env_var_name(kind: ProviderKind, field: &str) -> String {
    format!(
        "GF_{}_{}",
        kind.as_str().to_ascii_uppercase(),
        field.to_ascii_uppercase()
    )
}
