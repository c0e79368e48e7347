//! Most-viewed ranking: merges the counter store's order with image rows.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::views::ViewTracker;
use crate::db::entities::image;
use crate::error::Result;

/// An image with its ranking score
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedImage {
    pub image: image::Model,
    pub views: i64,
}

/// The `limit` most viewed images, best first.
///
/// Ranked ids with no image row are dropped; the ranking set keeps them.
pub async fn top_viewed(
    db: &DatabaseConnection,
    views: &ViewTracker,
    limit: usize,
) -> Result<Vec<RankedImage>> {
    let ranked = views.ranked_ids(limit).await?;
    if ranked.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = ranked.iter().map(|(id, _)| *id).collect();
    let images = image::Entity::find()
        .filter(image::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;

    let scores: HashMap<i32, f64> = ranked.into_iter().collect();
    Ok(order_by_rank(&ids, images)
        .into_iter()
        .map(|image| {
            let views = scores.get(&image.id).copied().unwrap_or(0.0) as i64;
            RankedImage { image, views }
        })
        .collect())
}

/// Sort `images` by the position of their id in `ranked_ids`; ids not in the list are dropped
pub fn order_by_rank(ranked_ids: &[i32], images: Vec<image::Model>) -> Vec<image::Model> {
    let position: HashMap<i32, usize> = ranked_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let mut ordered: Vec<(usize, image::Model)> = images
        .into_iter()
        .filter_map(|img| position.get(&img.id).map(|p| (*p, img)))
        .collect();
    ordered.sort_by_key(|(p, _)| *p);
    ordered.into_iter().map(|(_, img)| img).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::MemoryCounterStore;
    use crate::images::test_support::{seed_image, seed_user};
    use crate::images::views::RANKING_KEY;
    use std::sync::Arc;

    fn model(id: i32) -> image::Model {
        image::Model {
            id,
            user_id: 1,
            title: format!("Image {}", id),
            slug: format!("image-{}", id),
            url: format!("https://example.com/{}.jpg", id),
            description: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_order_by_rank() {
        let images = vec![model(1), model(2), model(3)];
        let ordered = order_by_rank(&[3, 1, 2], images);
        let ids: Vec<i32> = ordered.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_order_by_rank_drops_unranked_and_missing() {
        let images = vec![model(5), model(9)];
        let ordered = order_by_rank(&[7, 9], images);
        let ids: Vec<i32> = ordered.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[tokio::test]
    async fn test_top_viewed_follows_store_order() {
        let db = crate::db::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "ranker").await;
        let a = seed_image(&db, user.id, "A").await;
        let b = seed_image(&db, user.id, "B").await;
        let c = seed_image(&db, user.id, "C").await;

        let views = ViewTracker::new(Arc::new(MemoryCounterStore::new()));
        for _ in 0..5 {
            views.record_view(a.id).await.unwrap();
        }
        for _ in 0..3 {
            views.record_view(b.id).await.unwrap();
            views.record_view(c.id).await.unwrap();
        }

        let top = top_viewed(&db, &views, 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].image.id, a.id);
        assert_eq!(top[0].views, 5);
        // B and C tie; either may come second
        assert!([b.id, c.id].contains(&top[1].image.id));
        assert_eq!(top[1].views, 3);
    }

    #[tokio::test]
    async fn test_top_viewed_drops_stale_ids() {
        let db = crate::db::connect_in_memory().await.unwrap();
        let user = seed_user(&db, "stale").await;
        let kept = seed_image(&db, user.id, "Kept").await;

        let views = ViewTracker::new(Arc::new(MemoryCounterStore::new()));
        views.record_view(kept.id).await.unwrap();
        // Id with no image row, scored higher
        views.store().zincr(RANKING_KEY, "999", 50.0).await.unwrap();

        let top = top_viewed(&db, &views, 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].image.id, kept.id);
    }

    #[tokio::test]
    async fn test_top_viewed_empty_ranking() {
        let db = crate::db::connect_in_memory().await.unwrap();
        let views = ViewTracker::new(Arc::new(MemoryCounterStore::new()));
        assert!(top_viewed(&db, &views, 10).await.unwrap().is_empty());
    }
}
