//! Concurrent fan-out over ready providers and fan-in of their records.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};

use super::merge::{merge_records, rank_records};
use super::validator::RecordValidator;
use crate::config::Config;
use crate::errors::GlobalFoodError;
use crate::models::{
    AggregatedResult, CanonicalQuery, CanonicalRecord, ProviderKind, ProviderStatus,
};
use crate::provider::{ProviderAdapter, ProviderRequest, Translation};

/// Dispatches one canonical query to many adapters and merges what comes back.
pub struct Aggregator {
    config: Config,
    validator: RecordValidator,
}

impl Aggregator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            validator: RecordValidator::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search every adapter at once.
    ///
    /// 1. Translate the query per adapter; skips are recorded, not dispatched
    /// 2. Execute all remaining requests concurrently, each under the
    ///    provider timeout
    /// 3. Normalize and validate each successful response
    /// 4. Merge duplicates, rank, truncate to the query limit
    ///
    /// A failing provider only affects its own status. The search itself fails
    /// with `NoProviderAvailable` when nothing could be dispatched or every
    /// dispatched provider failed.
    pub async fn search(
        &self,
        query: &CanonicalQuery,
        adapters: &[Arc<dyn ProviderAdapter>],
    ) -> Result<AggregatedResult, GlobalFoodError> {
        if adapters.is_empty() {
            warn!("Search requested with no ready providers");
            return Err(GlobalFoodError::NoProviderAvailable);
        }

        let mut statuses: BTreeMap<ProviderKind, ProviderStatus> = BTreeMap::new();
        let mut dispatches: Vec<(&Arc<dyn ProviderAdapter>, ProviderRequest)> = Vec::new();

        for adapter in adapters {
            match adapter.translate_query(query) {
                Translation::Request(request) => dispatches.push((adapter, request)),
                Translation::Skip(reason) => {
                    debug!("Provider '{}' skipped: {:?}", adapter.kind(), reason);
                    statuses.insert(adapter.kind(), ProviderStatus::Skipped { reason });
                }
            }
        }

        if dispatches.is_empty() {
            warn!("No provider could translate the query");
            return Err(GlobalFoodError::NoProviderAvailable);
        }

        info!("Dispatching search to {} provider(s)", dispatches.len());
        let outcomes = join_all(
            dispatches
                .iter()
                .map(|(adapter, request)| self.dispatch(adapter, request)),
        )
        .await;

        let mut records: Vec<CanonicalRecord> = Vec::new();
        for (kind, outcome) in outcomes {
            match outcome {
                Ok(batch) => {
                    let valid = self.validator.validate_batch(kind, batch);
                    debug!("Provider '{}' contributed {} record(s)", kind, valid.len());
                    statuses.insert(kind, ProviderStatus::Succeeded { count: valid.len() });
                    records.extend(valid);
                }
                Err(error) => {
                    warn!("Provider '{}' failed: {}", kind, error);
                    statuses.insert(kind, ProviderStatus::Failed { error });
                }
            }
        }

        let mut merged = merge_records(records, &self.config);
        rank_records(&mut merged, &self.config);
        merged.truncate(query.limit as usize);

        let result = AggregatedResult {
            records: merged,
            statuses,
            completed_at: Utc::now(),
        };

        if !result.has_success() {
            warn!("Every provider failed: {}", result.summary());
            return Err(GlobalFoodError::NoProviderAvailable);
        }

        info!(
            "Search returned {} record(s): {}",
            result.records.len(),
            result.summary()
        );
        Ok(result)
    }

    async fn dispatch(
        &self,
        adapter: &Arc<dyn ProviderAdapter>,
        request: &ProviderRequest,
    ) -> (ProviderKind, Result<Vec<CanonicalRecord>, GlobalFoodError>) {
        let kind = adapter.kind();
        let timeout = self.config.provider_timeout;

        let outcome =
            match tokio::time::timeout(timeout, adapter.execute_search(request)).await {
                Ok(Ok(response)) => adapter.normalize_response(response),
                Ok(Err(error)) => Err(error),
                Err(_) => Err(GlobalFoodError::transport(
                    kind,
                    format!("timed out after {}ms", timeout.as_millis()),
                )),
            };

        (kind, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{SearchRequest, SkipReason};
    use crate::test_support::{record, FakeAdapter};

    fn query(limit: u32) -> CanonicalQuery {
        CanonicalQuery::from_request(
            SearchRequest::near(40.73, -73.997)
                .with_term("pizza")
                .with_limit(limit),
            20,
        )
        .unwrap()
    }

    fn place_query() -> CanonicalQuery {
        CanonicalQuery::from_request(SearchRequest::in_place("New York"), 20).unwrap()
    }

    fn adapters(list: Vec<FakeAdapter>) -> Vec<Arc<dyn ProviderAdapter>> {
        list.into_iter()
            .map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>)
            .collect()
    }

    fn yelp_with_joes() -> FakeAdapter {
        FakeAdapter::new(ProviderKind::Yelp).with_records(vec![record(
            ProviderKind::Yelp,
            "joes",
            "Joe's Pizza",
            40.7301,
            -73.9971,
            0,
        )
        .with_rating(Some(4.5))])
    }

    fn foursquare_with_joes() -> FakeAdapter {
        FakeAdapter::new(ProviderKind::Foursquare).with_records(vec![
            record(ProviderKind::Foursquare, "4a", "Joes Pizza", 40.73012, -73.99708, 0)
                .with_rating(Some(4.3)),
            record(ProviderKind::Foursquare, "4b", "Prince St Pizza", 40.7231, -73.9945, 1),
        ])
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let aggregator = Aggregator::new(Config::default());
        let failing = FakeAdapter::new(ProviderKind::Zomato).failing(GlobalFoodError::provider(
            ProviderKind::Zomato,
            "HTTP 500 - oops",
        ));
        let list = adapters(vec![yelp_with_joes(), foursquare_with_joes(), failing]);

        let result = aggregator.search(&query(20), &list).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].id, "yelp:joes");
        assert_eq!(result.records[0].rating, Some(4.5));
        assert_eq!(result.records[0].corroboration(), 2);
        assert_eq!(
            result.status(ProviderKind::Yelp),
            Some(&ProviderStatus::Succeeded { count: 1 })
        );
        assert_eq!(
            result.status(ProviderKind::Foursquare),
            Some(&ProviderStatus::Succeeded { count: 2 })
        );
        assert!(matches!(
            result.status(ProviderKind::Zomato),
            Some(ProviderStatus::Failed { .. })
        ));
        assert_eq!(result.errors().len(), 1);
        assert!(result
            .records
            .iter()
            .all(|r| !r.has_source(ProviderKind::Zomato)));
    }

    #[tokio::test]
    async fn test_no_adapters() {
        let aggregator = Aggregator::new(Config::default());
        let err = aggregator.search(&query(20), &[]).await.unwrap_err();
        assert_eq!(err, GlobalFoodError::NoProviderAvailable);
    }

    #[tokio::test]
    async fn test_every_adapter_skips() {
        let aggregator = Aggregator::new(Config::default());
        let list = adapters(vec![FakeAdapter::new(ProviderKind::Zomato).coordinates_only()]);

        let err = aggregator.search(&place_query(), &list).await.unwrap_err();
        assert_eq!(err, GlobalFoodError::NoProviderAvailable);
    }

    #[tokio::test]
    async fn test_every_adapter_fails() {
        let aggregator = Aggregator::new(Config::default());
        let list = adapters(vec![
            FakeAdapter::new(ProviderKind::Yelp)
                .failing(GlobalFoodError::transport(ProviderKind::Yelp, "refused")),
            FakeAdapter::new(ProviderKind::Factual)
                .failing(GlobalFoodError::provider(ProviderKind::Factual, "bad")),
        ]);

        let err = aggregator.search(&query(20), &list).await.unwrap_err();
        assert_eq!(err, GlobalFoodError::NoProviderAvailable);
    }

    #[tokio::test]
    async fn test_skipped_provider_is_reported() {
        let aggregator = Aggregator::new(Config::default());
        let yelp = Arc::new(yelp_with_joes());
        let zomato = Arc::new(FakeAdapter::new(ProviderKind::Zomato).coordinates_only());
        let list: Vec<Arc<dyn ProviderAdapter>> = vec![yelp.clone(), zomato.clone()];

        let result = aggregator.search(&place_query(), &list).await.unwrap();
        assert_eq!(
            result.status(ProviderKind::Zomato),
            Some(&ProviderStatus::Skipped {
                reason: SkipReason::MissingCoordinates
            })
        );
        assert_eq!(yelp.calls(), 1);
        assert_eq!(zomato.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out_alone() {
        let config = Config {
            provider_timeout: Duration::from_secs(2),
            ..Config::default()
        };
        let aggregator = Aggregator::new(config);
        let slow = FakeAdapter::new(ProviderKind::Factual).delayed(Duration::from_secs(30));
        let list = adapters(vec![yelp_with_joes(), slow]);

        let result = aggregator.search(&query(20), &list).await.unwrap();

        assert_eq!(result.records.len(), 1);
        match result.status(ProviderKind::Factual) {
            Some(ProviderStatus::Failed {
                error: GlobalFoodError::Transport { provider, message },
            }) => {
                assert_eq!(*provider, ProviderKind::Factual);
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_run_concurrently() {
        let aggregator = Aggregator::new(Config::default());
        let list = adapters(vec![
            yelp_with_joes().delayed(Duration::from_secs(3)),
            foursquare_with_joes().delayed(Duration::from_secs(3)),
        ]);

        let started = tokio::time::Instant::now();
        aggregator.search(&query(20), &list).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_empty_success_and_limit() {
        let aggregator = Aggregator::new(Config::default());
        let empty = FakeAdapter::new(ProviderKind::Factual);
        let list = adapters(vec![foursquare_with_joes(), empty]);

        let result = aggregator.search(&query(1), &list).await.unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.status(ProviderKind::Factual),
            Some(&ProviderStatus::Succeeded { count: 0 })
        );
    }

    #[tokio::test]
    async fn test_invalid_records_are_not_counted() {
        let aggregator = Aggregator::new(Config::default());
        let adapter = FakeAdapter::new(ProviderKind::Yelp).with_records(vec![
            record(ProviderKind::Yelp, "ok", "Good", 40.0, -73.0, 0),
            record(ProviderKind::Yelp, "bad", "", 40.0, -73.0, 1),
        ]);
        let list = adapters(vec![adapter]);

        let result = aggregator.search(&query(20), &list).await.unwrap();
        assert_eq!(
            result.status(ProviderKind::Yelp),
            Some(&ProviderStatus::Succeeded { count: 1 })
        );
    }
}
