use std::collections::{HashMap, hash_map::Entry};

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::{
    client::{ChartSource, RawChartItem, error::FetchError},
    domain::category::ChartCategory,
};

/// Last successful fetch of a category.
#[derive(Debug, Clone)]
pub struct CachedChart {
    pub items: Vec<RawChartItem>,
    pub fetched_at: DateTime<Local>,
}

/// Memoizes successful fetches per category for the lifetime of the cache.
///
/// Failures are never stored, so the next request for a failed category
/// goes to the source again.
#[derive(Debug, Default)]
pub struct ChartCache {
    entries: HashMap<ChartCategory, CachedChart>,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fetch(
        &mut self,
        source: &impl ChartSource,
        category: ChartCategory,
    ) -> Result<&CachedChart, FetchError> {
        match self.entries.entry(category) {
            Entry::Occupied(entry) => {
                debug!("cache hit for {category}");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!("cache miss for {category}");
                let items = source.fetch(category)?;
                Ok(entry.insert(CachedChart {
                    items,
                    fetched_at: Local::now(),
                }))
            }
        }
    }

    pub fn get(&self, category: ChartCategory) -> Option<&CachedChart> {
        self.entries.get(&category)
    }

    /// Records a successful fetch made outside the cache, replacing any
    /// previous entry.
    pub fn store(&mut self, category: ChartCategory, items: Vec<RawChartItem>) -> &CachedChart {
        let cached = CachedChart {
            items,
            fetched_at: Local::now(),
        };
        match self.entries.entry(category) {
            Entry::Occupied(mut entry) => {
                entry.insert(cached);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(cached),
        }
    }

    /// Drops the cached chart of `category`, returns whether one was present.
    pub fn invalidate(&mut self, category: ChartCategory) -> bool {
        let removed = self.entries.remove(&category).is_some();
        if removed {
            info!("invalidated cached {category} chart");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
