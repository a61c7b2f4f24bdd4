//! Cross-joins an area selection with a work (category) selection against a
//! catalog snapshot.
//!
//! A pair `(area, category)` is registered when some catalog item has exactly
//! that category and an address containing the trimmed area. One
//! [`MatchResult`] is produced per pair occurrence; group keys of the area
//! selection are dropped, the work selection key is reported as the big
//! category.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::selection::Selection;
use crate::modules::catalog::entities::catalog_item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Registered,
    Unregistered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub big_category: String,
    pub small_category: String,
    pub area: String,
    pub state: MatchState,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub results: Vec<MatchResult>,
    /// Number of registered pairs, not of distinct catalog items
    pub matched_count: usize,
}

impl Evaluation {
    pub fn has_match(&self) -> bool {
        self.matched_count > 0
    }
}

pub fn item_matches(item: &catalog_item::Model, area: &str, category: &str) -> bool {
    item.category == category && item.address.contains(area.trim())
}

/// Catalog grouped by exact category so each pair only scans its own bucket.
struct CategoryIndex<'a> {
    by_category: HashMap<&'a str, Vec<&'a catalog_item::Model>>,
}

impl<'a> CategoryIndex<'a> {
    fn build(catalog: &'a [catalog_item::Model]) -> Self {
        let mut by_category: HashMap<&str, Vec<&catalog_item::Model>> = HashMap::new();
        for item in catalog {
            by_category.entry(item.category.as_str()).or_default().push(item);
        }
        Self { by_category }
    }

    fn matching<'s>(
        &'s self,
        area: &'s str,
        category: &'s str,
    ) -> impl Iterator<Item = &'a catalog_item::Model> + 's {
        self.by_category
            .get(category)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |item| item_matches(item, area, category))
    }
}

/// Ordered `(area, big category, small category)` triples of the cross-product.
fn pairs<'a>(
    area_selection: &'a Selection,
    work_selection: &'a Selection,
) -> impl Iterator<Item = (&'a str, &'a str, &'a str)> {
    area_selection.leaves().flat_map(move |(_, area)| {
        work_selection
            .leaves()
            .map(move |(big, small)| (area, big, small))
    })
}

/// Evaluates every `(area, category)` pair. `fallback_date` (the request's
/// creation time) dates unregistered pairs; registered pairs carry the newest
/// `updated_at` among their matching items so the result does not depend on
/// catalog order.
pub fn evaluate(
    area_selection: &Selection,
    work_selection: &Selection,
    catalog: &[catalog_item::Model],
    fallback_date: NaiveDateTime,
) -> Evaluation {
    let index = CategoryIndex::build(catalog);
    let mut results =
        Vec::with_capacity(area_selection.leaf_count() * work_selection.leaf_count());
    let mut matched_count = 0;

    for (area, big, small) in pairs(area_selection, work_selection) {
        let latest = index.matching(area, small).map(|item| item.updated_at).max();
        let (state, date) = match latest {
            Some(updated_at) => {
                matched_count += 1;
                (MatchState::Registered, updated_at)
            }
            None => (MatchState::Unregistered, fallback_date),
        };

        results.push(MatchResult {
            big_category: big.to_string(),
            small_category: small.to_string(),
            area: area.to_string(),
            state,
            date,
        });
    }

    Evaluation {
        results,
        matched_count,
    }
}

/// Distinct (by URL) catalog items satisfying at least one pair, in
/// cross-product order then catalog order.
pub fn matching_items<'a>(
    area_selection: &Selection,
    work_selection: &Selection,
    catalog: &'a [catalog_item::Model],
) -> Vec<&'a catalog_item::Model> {
    let index = CategoryIndex::build(catalog);
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (area, _, small) in pairs(area_selection, work_selection) {
        for item in index.matching(area, small) {
            if seen.insert(item.url.as_str()) {
                items.push(item);
            }
        }
    }

    items
}

/// Distinct categories named by a work selection, used to narrow the catalog
/// snapshot before evaluating.
pub fn referenced_categories(work_selection: &Selection) -> Vec<String> {
    let mut seen = HashSet::new();
    work_selection
        .leaves()
        .filter(|(_, small)| seen.insert(*small))
        .map(|(_, small)| small.to_string())
        .collect()
}
