//! Image bookmark pages: create, detail and the paginated list.

use axum::{
    extract::{Form, Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tera::Context;

use super::utils::{
    base_context, format_relative_time, get_current_session, is_ajax_request, render_server_error,
    render_template, require_login,
};
use crate::db::entities::{image, user};
use crate::error::ServerError;
use crate::images::actions::{create_action, recent_actions};
use crate::images::forms::{FormErrors, ImageCreateForm};
use crate::images::likes::{has_liked, like_count};
use crate::images::{create_image, find_image, liked_by, list_page};
use crate::state::AppState;

/// Form values echoed back into the template
#[derive(serde::Serialize)]
struct FormValues {
    title: String,
    url: String,
    description: String,
}

impl From<&ImageCreateForm> for FormValues {
    fn from(form: &ImageCreateForm) -> Self {
        Self {
            title: form.title.clone().unwrap_or_default(),
            url: form.url.clone().unwrap_or_default(),
            description: form.description.clone().unwrap_or_default(),
        }
    }
}

/// Image summary for list templates
#[derive(serde::Serialize)]
struct ImageCard {
    id: i32,
    title: String,
    url: String,
    absolute_url: String,
}

impl From<image::Model> for ImageCard {
    fn from(image: image::Model) -> Self {
        Self {
            absolute_url: image.absolute_url(),
            id: image.id,
            title: image.title,
            url: image.url,
        }
    }
}

fn render_create_form(context: &mut Context, form: &ImageCreateForm, errors: &FormErrors) -> Response {
    context.insert("form", &FormValues::from(form));
    context.insert("errors", errors);
    render_template("images/create.html", context)
}

/// Bookmark form (GET), prefilled from the query string
pub async fn create_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(form): Query<ImageCreateForm>,
) -> Response {
    let session = match require_login(&state, &headers, "/images/create/") {
        Ok(s) => s,
        Err(redirect) => return redirect,
    };

    let mut context = base_context("images", Some(&session));
    render_create_form(&mut context, &form, &FormErrors::default())
}

/// Bookmark submit (POST)
pub async fn create_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ImageCreateForm>,
) -> Response {
    let session = match require_login(&state, &headers, "/images/create/") {
        Ok(s) => s,
        Err(redirect) => return redirect,
    };

    let cleaned = match form.validate() {
        Ok(c) => c,
        Err(errors) => {
            let mut context = base_context("images", Some(&session));
            return render_create_form(&mut context, &form, &errors);
        }
    };

    let created = match create_image(&state.db, session.user_id, cleaned).await {
        Ok(img) => img,
        Err(e) => return render_server_error(e.into()),
    };

    if let Err(e) = create_action(&state.db, session.user_id, "bookmarked image", Some(created.id)).await {
        tracing::warn!("Failed to record bookmark action for image {}: {}", created.id, e);
    }

    Redirect::to(&format!(
        "{}?message={}",
        created.absolute_url(),
        urlencoding::encode("Image added successfully")
    ))
    .into_response()
}

/// Flash-style message passed through a redirect
#[derive(serde::Deserialize, Default)]
pub struct MessageQuery {
    pub message: Option<String>,
}

/// Image detail page; counts a view
pub async fn image_detail(
    State(state): State<Arc<AppState>>,
    Path((id, slug)): Path<(String, String)>,
    Query(query): Query<MessageQuery>,
    headers: HeaderMap,
) -> Response {
    let Ok(image_id) = id.parse::<i32>() else {
        return render_server_error(ServerError::ImageNotFound(id));
    };

    let image = match find_image(&state.db, image_id, &slug).await {
        Ok(Some(img)) => img,
        Ok(None) => return render_server_error(ServerError::ImageNotFound(id)),
        Err(e) => return render_server_error(e.into()),
    };

    // Best-effort: a counter store outage must not take the page down
    let total_views = match state.views.record_view(image.id).await {
        Ok(total) => Some(total),
        Err(e) => {
            tracing::warn!("Failed to record view of image {}: {}", image.id, e);
            None
        }
    };

    let session = get_current_session(&state, &headers);

    let owner = match user::Entity::find_by_id(image.user_id).one(state.db.as_ref()).await {
        Ok(u) => u.map(|u| u.username).unwrap_or_default(),
        Err(e) => return render_server_error(e.into()),
    };
    let likes = match like_count(&state.db, image.id).await {
        Ok(n) => n,
        Err(e) => return render_server_error(e.into()),
    };
    let likers = match liked_by(&state.db, image.id).await {
        Ok(names) => names,
        Err(e) => return render_server_error(e.into()),
    };
    let liked = match &session {
        Some(s) => match has_liked(&state.db, image.id, s.user_id).await {
            Ok(liked) => liked,
            Err(e) => return render_server_error(e.into()),
        },
        None => false,
    };

    let mut context = base_context("images", session.as_ref());
    if let Some(message) = &query.message {
        context.insert("message", message);
    }
    context.insert("created_ago", &format_relative_time(image.created_at));
    context.insert("image", &image);
    context.insert("owner", &owner);
    context.insert("total_views", &total_views);
    context.insert("like_count", &likes);
    context.insert("liked_by", &likers);
    context.insert("liked", &liked);

    render_template("images/detail.html", &context)
}

/// Query params for the image list
#[derive(serde::Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// Paginated image list; XHR requests get just the next fragment
pub async fn image_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    let session = match require_login(&state, &headers, "/images/") {
        Ok(s) => s,
        Err(redirect) => return redirect,
    };
    let is_ajax = is_ajax_request(&headers);

    let page = match list_page(&state.db, state.config.page_size, query.page.as_deref()).await {
        Ok(p) => p,
        Err(e) => return render_server_error(e.into()),
    };

    if page.out_of_range && is_ajax {
        return Html(String::new()).into_response();
    }

    let mut context = base_context("images", Some(&session));
    context.insert("page", &page.page);
    context.insert("num_pages", &page.num_pages);
    context.insert("has_next", &page.has_next());
    let cards: Vec<ImageCard> = page.images.into_iter().map(ImageCard::from).collect();
    context.insert("images", &cards);

    if is_ajax {
        return render_template("images/list_ajax.html", &context);
    }

    let activity = recent_actions(&state.db, 10).await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load recent activity: {}", e);
        Vec::new()
    });
    context.insert("recent_actions", &activity);

    render_template("images/list.html", &context)
}
