//! Like/unlike toggling.

use std::fmt;
use std::str::FromStr;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use thiserror::Error;

use super::actions::create_action;
use crate::db::entities::{image, image_like};
use crate::db::now_secs;

#[derive(Error, Debug)]
pub enum LikeError {
    #[error("Image not found: {0}")]
    NotFound(i32),

    #[error("Invalid like action: {0}")]
    InvalidAction(String),

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// What the user wants to do with an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

impl FromStr for LikeAction {
    type Err = LikeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(LikeAction::Like),
            "unlike" => Ok(LikeAction::Unlike),
            other => Err(LikeError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for LikeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LikeAction::Like => write!(f, "like"),
            LikeAction::Unlike => write!(f, "unlike"),
        }
    }
}

/// Add or remove `user_id` from an image's liked-by set.
///
/// Both directions are idempotent. Liking also records a "likes" action.
pub async fn toggle_like(
    db: &DatabaseConnection,
    image_id: i32,
    action: LikeAction,
    user_id: i32,
) -> Result<(), LikeError> {
    if image::Entity::find_by_id(image_id).one(db).await?.is_none() {
        return Err(LikeError::NotFound(image_id));
    }

    match action {
        LikeAction::Like => {
            let like = image_like::ActiveModel {
                image_id: Set(image_id),
                user_id: Set(user_id),
                created_at: Set(now_secs()),
                ..Default::default()
            };
            let inserted = image_like::Entity::insert(like)
                .on_conflict(
                    OnConflict::columns([image_like::Column::ImageId, image_like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await?;
            tracing::debug!("User {} liked image {} ({} new)", user_id, image_id, inserted);

            create_action(db, user_id, "likes", Some(image_id)).await?;
        }
        LikeAction::Unlike => {
            let removed = image_like::Entity::delete_many()
                .filter(image_like::Column::ImageId.eq(image_id))
                .filter(image_like::Column::UserId.eq(user_id))
                .exec(db)
                .await?;
            tracing::debug!(
                "User {} unliked image {} ({} removed)",
                user_id,
                image_id,
                removed.rows_affected
            );
        }
    }

    Ok(())
}

/// Number of users who like an image
pub async fn like_count(db: &DatabaseConnection, image_id: i32) -> Result<u64, DbErr> {
    image_like::Entity::find()
        .filter(image_like::Column::ImageId.eq(image_id))
        .count(db)
        .await
}

/// Check if user has liked an image
pub async fn has_liked(db: &DatabaseConnection, image_id: i32, user_id: i32) -> Result<bool, DbErr> {
    let found = image_like::Entity::find()
        .filter(image_like::Column::ImageId.eq(image_id))
        .filter(image_like::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::db::entities::action;
    use crate::images::test_support::{seed_image, seed_user};

    #[test]
    fn test_parse_action() {
        assert_eq!("like".parse::<LikeAction>().unwrap(), LikeAction::Like);
        assert_eq!("unlike".parse::<LikeAction>().unwrap(), LikeAction::Unlike);
        assert!(matches!(
            "LIKE".parse::<LikeAction>(),
            Err(LikeError::InvalidAction(a)) if a == "LIKE"
        ));
    }

    #[tokio::test]
    async fn test_like_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "liker").await;
        let image = seed_image(&db, user.id, "Liked").await;

        toggle_like(&db, image.id, LikeAction::Like, user.id).await.unwrap();
        toggle_like(&db, image.id, LikeAction::Like, user.id).await.unwrap();

        assert_eq!(like_count(&db, image.id).await.unwrap(), 1);
        assert!(has_liked(&db, image.id, user.id).await.unwrap());
        // One activity entry despite two likes
        assert_eq!(action::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unlike_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "unliker").await;
        let other = seed_user(&db, "other").await;
        let image = seed_image(&db, user.id, "Unliked").await;

        toggle_like(&db, image.id, LikeAction::Like, user.id).await.unwrap();
        toggle_like(&db, image.id, LikeAction::Like, other.id).await.unwrap();

        toggle_like(&db, image.id, LikeAction::Unlike, user.id).await.unwrap();
        toggle_like(&db, image.id, LikeAction::Unlike, user.id).await.unwrap();

        assert!(!has_liked(&db, image.id, user.id).await.unwrap());
        assert!(has_liked(&db, image.id, other.id).await.unwrap());
        assert_eq!(like_count(&db, image.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_image_is_not_found() {
        let db = connect_in_memory().await.unwrap();
        let user = seed_user(&db, "ghost").await;

        let result = toggle_like(&db, 12345, LikeAction::Like, user.id).await;
        assert!(matches!(result, Err(LikeError::NotFound(12345))));
        assert_eq!(image_like::Entity::find().count(&db).await.unwrap(), 0);
    }
}
