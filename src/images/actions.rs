//! Activity feed.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::db::entities::{action, user};
use crate::db::now_secs;

/// Repeats of the same action inside this window are not recorded again
const DEDUPE_WINDOW_SECS: i64 = 60;

/// Record `verb` by `user_id` on an optional target image.
///
/// Returns `false` when an identical action was recorded within the last minute.
pub async fn create_action(
    db: &DatabaseConnection,
    user_id: i32,
    verb: &str,
    target_image_id: Option<i32>,
) -> Result<bool, DbErr> {
    let now = now_secs();

    let mut similar = action::Entity::find()
        .filter(action::Column::UserId.eq(user_id))
        .filter(action::Column::Verb.eq(verb))
        .filter(action::Column::CreatedAt.gte(now - DEDUPE_WINDOW_SECS));
    similar = match target_image_id {
        Some(id) => similar.filter(action::Column::TargetImageId.eq(id)),
        None => similar.filter(action::Column::TargetImageId.is_null()),
    };

    if similar.count(db).await? > 0 {
        return Ok(false);
    }

    action::ActiveModel {
        user_id: Set(user_id),
        verb: Set(verb.to_string()),
        target_image_id: Set(target_image_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(true)
}

/// Activity entry for templates
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityItem {
    pub username: String,
    pub verb: String,
    pub target_image_id: Option<i32>,
    pub created_at: i64,
}

/// Latest actions, newest first
pub async fn recent_actions(db: &DatabaseConnection, limit: u64) -> Result<Vec<ActivityItem>, DbErr> {
    let rows = action::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(action::Column::CreatedAt)
        .order_by_desc(action::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(a, u)| ActivityItem {
            username: u.map(|u| u.username).unwrap_or_default(),
            verb: a.verb,
            target_image_id: a.target_image_id,
            created_at: a.created_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::images::test_support::{seed_image, seed_user};

    #[tokio::test]
    async fn test_repeat_action_is_deduplicated() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "actor").await;
        let image = seed_image(&db, user.id, "Target").await;

        assert!(create_action(&db, user.id, "likes", Some(image.id)).await.unwrap());
        assert!(!create_action(&db, user.id, "likes", Some(image.id)).await.unwrap());

        // Different verb or target is a new action
        assert!(create_action(&db, user.id, "bookmarked image", Some(image.id)).await.unwrap());
        assert!(create_action(&db, user.id, "likes", None).await.unwrap());

        assert_eq!(action::Entity::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_old_action_does_not_block() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "actor").await;

        action::ActiveModel {
            user_id: Set(user.id),
            verb: Set("likes".to_string()),
            target_image_id: Set(Some(1)),
            created_at: Set(now_secs() - 2 * DEDUPE_WINDOW_SECS),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(create_action(&db, user.id, "likes", Some(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_recent_actions_newest_first() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "feed").await;
        create_action(&db, user.id, "first", None).await.unwrap();
        create_action(&db, user.id, "second", None).await.unwrap();

        let items = recent_actions(&db, 10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].verb, "second");
        assert_eq!(items[0].username, "feed");
    }
}
