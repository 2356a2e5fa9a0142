//! Duplicate detection, attribute voting and ranking.
//!
//! Records are visited in provider priority order, then by their rank in the
//! provider's response. A record joins the first cluster whose anchor (its
//! first member) has the same name key, lies within the dedup radius, and
//! shares no provider with the record. Each cluster collapses into one record.

use std::cmp::Ordering;

use super::normalize::name_key;
use crate::config::Config;
use crate::models::{CanonicalRecord, ProviderKind, SourceTag};

struct Cluster {
    key: String,
    members: Vec<CanonicalRecord>,
}

impl Cluster {
    fn anchor(&self) -> &CanonicalRecord {
        &self.members[0]
    }

    fn has_any_provider(&self, record: &CanonicalRecord) -> bool {
        self.members
            .iter()
            .any(|m| record.sources.iter().any(|s| m.has_source(s.provider)))
    }
}

fn lead_source(record: &CanonicalRecord) -> Option<&SourceTag> {
    record.sources.first()
}

/// Priority of the record's first provider, then its rank there.
fn visit_key(config: &Config, record: &CanonicalRecord) -> (usize, usize) {
    match lead_source(record) {
        Some(source) => (config.priority_index(source.provider), source.rank),
        None => (usize::MAX, usize::MAX),
    }
}

/// Cluster and collapse records from every provider.
///
/// The output is unordered; call [`rank_records`] afterwards.
pub fn merge_records(records: Vec<CanonicalRecord>, config: &Config) -> Vec<CanonicalRecord> {
    let mut records = records;
    records.sort_by(|a, b| {
        visit_key(config, a)
            .cmp(&visit_key(config, b))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut clusters: Vec<Cluster> = Vec::new();
    for record in records {
        let key = name_key(&record.name);
        let existing = clusters.iter_mut().find(|cluster| {
            cluster.key == key
                && cluster
                    .anchor()
                    .coordinates
                    .distance_meters(&record.coordinates)
                    <= config.dedup_radius_meters
                && !cluster.has_any_provider(&record)
        });
        match existing {
            Some(cluster) => cluster.members.push(record),
            None => clusters.push(Cluster {
                key,
                members: vec![record],
            }),
        }
    }

    clusters
        .into_iter()
        .map(|cluster| collapse(cluster.members, config))
        .collect()
}

/// Most-supported value, earliest candidate on a tie.
fn vote<T: PartialEq>(candidates: impl IntoIterator<Item = (T, usize)>) -> Option<T> {
    let mut tallies: Vec<(T, usize)> = Vec::new();
    for (value, weight) in candidates {
        match tallies.iter_mut().find(|(v, _)| *v == value) {
            Some(tally) => tally.1 += weight,
            None => tallies.push((value, weight)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in tallies {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn collapse(mut members: Vec<CanonicalRecord>, config: &Config) -> CanonicalRecord {
    if members.len() == 1 {
        return members.swap_remove(0);
    }

    let weight = |m: &CanonicalRecord| m.sources.len().max(1);

    let name = vote(members.iter().map(|m| (m.name.trim(), weight(m))))
        .unwrap_or_default()
        .to_string();
    let coordinates = vote(members.iter().map(|m| (m.coordinates, weight(m))))
        .unwrap_or(members[0].coordinates);
    let address = vote(
        members
            .iter()
            .filter_map(|m| m.address.as_deref().map(|a| (a, weight(m)))),
    )
    .map(str::to_string);
    let rating = vote(
        members
            .iter()
            .filter_map(|m| m.rating.map(|r| (r, weight(m)))),
    );
    let price = vote(members.iter().filter_map(|m| m.price.map(|p| (p, weight(m)))));

    let mut categories: Vec<String> = Vec::new();
    for category in members.iter().flat_map(|m| m.categories.iter()) {
        let folded = category.to_lowercase();
        if !categories.iter().any(|c| c.to_lowercase() == folded) {
            categories.push(category.clone());
        }
    }

    let mut sources: Vec<SourceTag> = members.into_iter().flat_map(|m| m.sources).collect();
    sources.sort_by(|a, b| {
        config
            .priority_index(a.provider)
            .cmp(&config.priority_index(b.provider))
            .then_with(|| a.rank.cmp(&b.rank))
            .then_with(|| a.native_id.cmp(&b.native_id))
    });
    sources.dedup_by(|a, b| a.provider == b.provider && a.native_id == b.native_id);

    let id = sources
        .first()
        .map(|s| format!("{}:{}", s.provider, s.native_id))
        .unwrap_or_default();

    CanonicalRecord {
        id,
        name,
        coordinates,
        address,
        categories,
        rating,
        price,
        sources,
    }
}

/// Order records for presentation.
///
/// 1. Number of corroborating providers, descending
/// 2. Rating, descending, unrated last
/// 3. Priority of the first contributing provider
/// 4. Rank within that provider's response
pub fn rank_records(records: &mut [CanonicalRecord], config: &Config) {
    records.sort_by(|a, b| {
        b.corroboration()
            .cmp(&a.corroboration())
            .then_with(|| compare_ratings(a.rating, b.rating))
            .then_with(|| visit_key(config, a).cmp(&visit_key(config, b)))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Providers backing at least one record.
pub fn contributing_providers(records: &[CanonicalRecord]) -> Vec<ProviderKind> {
    let mut providers: Vec<ProviderKind> = records
        .iter()
        .flat_map(|r| r.sources.iter().map(|s| s.provider))
        .collect();
    providers.sort();
    providers.dedup();
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceTier;
    use crate::test_support::record;

    fn merged(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
        let config = Config::default();
        let mut out = merge_records(records, &config);
        rank_records(&mut out, &config);
        out
    }

    fn joes_yelp() -> CanonicalRecord {
        record(ProviderKind::Yelp, "joes-pizza", "Joe's Pizza", 40.73012, -73.99711, 0)
            .with_address(Some("7 Carmine St, New York, NY 10014".to_string()))
            .with_categories(vec!["Pizza".to_string()])
            .with_rating(Some(4.5))
            .with_price(Some(PriceTier::Inexpensive))
    }

    fn joes_foursquare() -> CanonicalRecord {
        record(ProviderKind::Foursquare, "4a3d", "Joes Pizza", 40.73015, -73.99705, 0)
            .with_categories(vec!["pizza".to_string(), "Italian".to_string()])
            .with_rating(Some(4.3))
    }

    #[test]
    fn test_same_venue_from_two_providers_merges() {
        let out = merged(vec![joes_foursquare(), joes_yelp()]);

        assert_eq!(out.len(), 1);
        let joe = &out[0];
        assert_eq!(joe.id, "yelp:joes-pizza");
        assert_eq!(joe.name, "Joe's Pizza");
        assert_eq!(joe.rating, Some(4.5));
        assert_eq!(joe.price, Some(PriceTier::Inexpensive));
        assert_eq!(
            joe.address.as_deref(),
            Some("7 Carmine St, New York, NY 10014")
        );
        assert_eq!(joe.categories, vec!["Pizza".to_string(), "Italian".to_string()]);
        let providers: Vec<_> = joe.sources.iter().map(|s| s.provider).collect();
        assert_eq!(providers, vec![ProviderKind::Yelp, ProviderKind::Foursquare]);
    }

    #[test]
    fn test_caller_priority_breaks_ties() {
        let config = Config {
            provider_priority: vec![
                ProviderKind::Foursquare,
                ProviderKind::Yelp,
                ProviderKind::Zomato,
                ProviderKind::Factual,
            ],
            ..Config::default()
        };
        let mut out = merge_records(vec![joes_yelp(), joes_foursquare()], &config);
        rank_records(&mut out, &config);

        assert_eq!(out.len(), 1);
        let joe = &out[0];
        assert_eq!(joe.id, "foursquare:4a3d");
        assert_eq!(joe.name, "Joes Pizza");
        assert_eq!(joe.rating, Some(4.3));
        assert_eq!(joe.sources[0].provider, ProviderKind::Foursquare);
        assert_eq!(joe.corroboration(), 2);
    }

    #[test]
    fn test_majority_beats_priority() {
        let zomato = record(ProviderKind::Zomato, "1", "Joe's Pizza", 40.73013, -73.9971, 0)
            .with_rating(Some(4.3));
        let out = merged(vec![joes_yelp(), joes_foursquare(), zomato]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rating, Some(4.3));
        assert_eq!(out[0].corroboration(), 3);
    }

    #[test]
    fn test_same_provider_never_merges() {
        let a = record(ProviderKind::Yelp, "a", "Starbucks", 40.7301, -73.9971, 0);
        let b = record(ProviderKind::Yelp, "b", "Starbucks", 40.7302, -73.9971, 1);
        assert_eq!(merged(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_distant_namesakes_stay_apart() {
        let near = record(ProviderKind::Yelp, "a", "Joe's Pizza", 40.7301, -73.9971, 0);
        // About 1.1 km north.
        let far = record(ProviderKind::Foursquare, "b", "Joe's Pizza", 40.7401, -73.9971, 0);
        assert_eq!(merged(vec![near, far]).len(), 2);
    }

    #[test]
    fn test_ranking_order() {
        let solo_high = record(ProviderKind::Zomato, "z", "Dosa Hut", 40.70, -73.90, 0)
            .with_rating(Some(4.9));
        let solo_unrated = record(ProviderKind::Yelp, "u", "Mystery", 40.71, -73.91, 0);
        let solo_low = record(ProviderKind::Factual, "f", "Diner", 40.72, -73.92, 0)
            .with_rating(Some(3.0));
        let tied_rank = record(ProviderKind::Yelp, "t", "Deli", 40.75, -73.93, 1)
            .with_rating(Some(3.0));

        let out = merged(vec![
            solo_high,
            solo_unrated,
            solo_low,
            tied_rank,
            joes_yelp(),
            joes_foursquare(),
        ]);
        let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["yelp:joes-pizza", "zomato:z", "yelp:t", "factual:f", "yelp:u"]
        );
    }

    #[test]
    fn test_merge_is_deterministic_and_idempotent() {
        let input = vec![
            joes_foursquare(),
            record(ProviderKind::Zomato, "9", "Katz's Delicatessen", 40.7222, -73.9874, 0),
            joes_yelp(),
            record(ProviderKind::Yelp, "katz", "Katz’s Delicatessen", 40.72223, -73.98743, 1),
        ];
        let mut reversed = input.clone();
        reversed.reverse();

        let once = merged(input);
        assert_eq!(once, merged(reversed));
        assert_eq!(once.len(), 2);
        assert_eq!(merged(once.clone()), once);
    }

    #[test]
    fn test_vote_ties_go_to_first() {
        assert_eq!(vote(vec![("a", 1), ("b", 1)]), Some("a"));
        assert_eq!(vote(vec![("a", 1), ("b", 1), ("b", 1)]), Some("b"));
        assert_eq!(vote(Vec::<(&str, usize)>::new()), None);
    }

    #[test]
    fn test_contributing_providers() {
        let out = merged(vec![joes_yelp(), joes_foursquare()]);
        assert_eq!(
            contributing_providers(&out),
            vec![ProviderKind::Yelp, ProviderKind::Foursquare]
        );
    }
}
