//! Name search over the station store

use std::collections::HashMap;
use std::sync::Arc;

use nucleo::pattern::{CaseMatching, Normalization};
use nucleo::{Config, Nucleo, Utf32String};

/// Fuzzy search index over station names and catalog numbers.
///
/// Rebuilt whenever an ingestion batch lands; between rebuilds queries are
/// incremental.
pub struct SearchIndex {
    matcher: Nucleo<SearchItem>,
    /// All ids sorted by display name, for empty-query browsing
    sorted_by_name: Vec<u32>,
    /// Lowercased name -> ids, for exact hits
    name_index: HashMap<String, Vec<u32>>,
    last_query: String,
}

struct SearchItem {
    norad: u32,
    haystack: String,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self {
            matcher: new_matcher(),
            sorted_by_name: Vec::new(),
            name_index: HashMap::new(),
            last_query: String::new(),
        }
    }
}

fn new_matcher() -> Nucleo<SearchItem> {
    Nucleo::new(Config::DEFAULT, Arc::new(|| {}), None, 1)
}

impl SearchIndex {
    /// Re-index from the current station set.
    pub fn rebuild<'a>(&mut self, stations: impl Iterator<Item = (u32, &'a str)>) {
        self.matcher = new_matcher();
        self.name_index.clear();
        self.last_query.clear();

        let injector = self.matcher.injector();
        let mut items: Vec<(String, u32)> = Vec::new();

        for (norad, name) in stations {
            let name_lower = name.to_lowercase();
            self.name_index
                .entry(name_lower.clone())
                .or_default()
                .push(norad);

            let haystack = format!("{} {}", name_lower, norad);
            injector.push(SearchItem { norad, haystack }, |data, cols| {
                cols[0] = Utf32String::from(data.haystack.as_str());
            });

            items.push((name_lower, norad));
        }

        items.sort();
        self.sorted_by_name = items.into_iter().map(|(_, n)| n).collect();
    }

    /// Search for stations matching a query string.
    pub fn search(&mut self, query: &str, limit: usize) -> Vec<u32> {
        let query_lower = query.to_lowercase().trim().to_string();

        if query_lower.is_empty() {
            self.last_query.clear();
            return self.sorted_by_name.iter().take(limit).copied().collect();
        }

        // Exact name, then catalog number, then fuzzy
        if let Some(matches) = self.name_index.get(&query_lower) {
            return matches.iter().take(limit).copied().collect();
        }

        if let Ok(norad) = query_lower.parse::<u32>() {
            if self.sorted_by_name.contains(&norad) {
                return vec![norad];
            }
        }

        if query_lower != self.last_query {
            let append = query_lower.starts_with(&self.last_query)
                && query_lower.len() > self.last_query.len();
            self.matcher.pattern.reparse(
                0,
                &query_lower,
                CaseMatching::Respect,
                Normalization::Smart,
                append,
            );
            self.last_query = query_lower;
        }

        self.matcher.tick(10);
        let snapshot = self.matcher.snapshot();

        let take = limit.min(snapshot.matched_item_count() as usize) as u32;
        snapshot
            .matched_items(0..take)
            .map(|item| item.data.norad)
            .collect()
    }
}
