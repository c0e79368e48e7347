//! View counting.
//!
//! Each detail view bumps two values in the counter store:
//! - `image:<id>:views`, the per-image total shown on the detail page
//! - member `<id>` of the `image_ranking` sorted set, used by the ranking page

use std::sync::Arc;

use crate::counters::{CounterResult, CounterStore};

/// Sorted set of image ids scored by view count
pub const RANKING_KEY: &str = "image_ranking";

/// Counter key for an image's total views
pub fn views_key(image_id: i32) -> String {
    format!("image:{}:views", image_id)
}

/// Records views and reads them back
#[derive(Clone)]
pub struct ViewTracker {
    store: Arc<dyn CounterStore>,
}

impl ViewTracker {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Count one view of an existing image, returning its total views
    pub async fn record_view(&self, image_id: i32) -> CounterResult<i64> {
        let total = self
            .store
            .incr_with_score(&views_key(image_id), RANKING_KEY, &image_id.to_string(), 1)
            .await?;
        tracing::debug!("Image {} now has {} views", image_id, total);
        Ok(total)
    }

    /// Total views of an image (0 if never viewed)
    #[cfg(test)]
    pub async fn total_views(&self, image_id: i32) -> CounterResult<i64> {
        Ok(self.store.get(&views_key(image_id)).await?.unwrap_or(0))
    }

    /// Most viewed image ids with their scores, best first
    pub async fn ranked_ids(&self, limit: usize) -> CounterResult<Vec<(i32, f64)>> {
        let entries = self.store.zrange_desc(RANKING_KEY, limit).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(member, score)| match member.parse::<i32>() {
                Ok(id) => Some((id, score)),
                Err(_) => {
                    tracing::warn!("Skipping non-numeric ranking member {:?}", member);
                    None
                }
            })
            .collect())
    }
}
