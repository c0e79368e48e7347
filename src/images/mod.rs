//! Image bookmarks: catalog queries, likes, views and the popularity ranking.

pub mod actions;
pub mod forms;
pub mod likes;
pub mod pagination;
pub mod ranking;
pub mod views;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::db::entities::{image, image_like, user};
use crate::db::now_secs;
use forms::CleanedImage;
use pagination::{num_pages, resolve_page, PageOutcome};

/// Store a validated bookmark for `user_id`
pub async fn create_image(
    db: &DatabaseConnection,
    user_id: i32,
    cleaned: CleanedImage,
) -> Result<image::Model, DbErr> {
    let new_image = image::ActiveModel {
        user_id: Set(user_id),
        title: Set(cleaned.title),
        slug: Set(cleaned.slug),
        url: Set(cleaned.url),
        description: Set(cleaned.description),
        created_at: Set(now_secs()),
        ..Default::default()
    };
    let created = new_image.insert(db).await?;
    tracing::info!("User {} bookmarked image {} ({})", user_id, created.id, created.slug);
    Ok(created)
}

/// Look up an image by id and slug
pub async fn find_image(
    db: &DatabaseConnection,
    id: i32,
    slug: &str,
) -> Result<Option<image::Model>, DbErr> {
    image::Entity::find_by_id(id)
        .filter(image::Column::Slug.eq(slug))
        .one(db)
        .await
}

/// Usernames of everyone who likes an image
pub async fn liked_by(db: &DatabaseConnection, image_id: i32) -> Result<Vec<String>, DbErr> {
    let rows = image_like::Entity::find()
        .filter(image_like::Column::ImageId.eq(image_id))
        .find_also_related(user::Entity)
        .order_by_asc(image_like::Column::CreatedAt)
        .order_by_asc(image_like::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(_, u)| u.map(|u| u.username))
        .collect())
}

/// One page of the image list
#[derive(Debug, Clone)]
pub struct ListPage {
    pub images: Vec<image::Model>,
    /// 1-based page number that was served (or would have been, if out of range)
    pub page: u64,
    pub num_pages: u64,
    /// The requested page number was outside the available range
    pub out_of_range: bool,
}

impl ListPage {
    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }
}

/// Newest-first page of images for the raw `page` query value.
///
/// An out-of-range request is served the last page, flagged with `out_of_range`.
pub async fn list_page(
    db: &DatabaseConnection,
    per_page: u64,
    requested: Option<&str>,
) -> Result<ListPage, DbErr> {
    let paginator = image::Entity::find()
        .order_by_desc(image::Column::CreatedAt)
        .order_by_desc(image::Column::Id)
        .paginate(db, per_page.max(1));

    let total = paginator.num_items().await?;
    let pages = num_pages(total, per_page);

    let (page, out_of_range) = match resolve_page(requested, pages) {
        PageOutcome::Page(n) => (n, false),
        PageOutcome::OutOfRange { last } => (last, true),
    };

    let images = paginator.fetch_page(page - 1).await?;
    Ok(ListPage {
        images,
        page,
        num_pages: pages,
        out_of_range,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn seed_user(db: &DatabaseConnection, username: &str) -> user::Model {
        user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(String::new()),
            email: Set(None),
            created_at: Set(now_secs()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    pub async fn seed_image(db: &DatabaseConnection, user_id: i32, title: &str) -> image::Model {
        create_image(
            db,
            user_id,
            CleanedImage {
                title: title.to_string(),
                slug: forms::slug_for(title),
                url: format!("https://example.com/{}.jpg", forms::slug_for(title)),
                description: None,
            },
        )
        .await
        .unwrap()
    }
}
