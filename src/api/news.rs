use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::entities::{news_post, prelude::*};

#[derive(Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct NewsPostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<news_post::Model> for NewsPostResponse {
    fn from(model: news_post::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            image: model.image,
            created_at: model.created_at,
        }
    }
}

// GET /api/news - newest bulletins first
pub async fn list_news(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    match NewsPost::find()
        .order_by_desc(news_post::Column::CreatedAt)
        .all(&db)
        .await
    {
        Ok(posts) => {
            let response: Vec<NewsPostResponse> = posts.into_iter().map(|p| p.into()).collect();
            (axum::http::StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch news posts: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch news posts",
            )
                .into_response()
        }
    }
}

// POST /api/news
pub async fn create_news(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateNewsRequest>,
) -> impl IntoResponse {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            "Title and content are required",
        )
            .into_response();
    }

    let active_model = news_post::ActiveModel {
        title: Set(payload.title),
        content: Set(payload.content),
        image: Set(payload.image),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    match active_model.insert(&db).await {
        Ok(post) => {
            info!(post_id = post.id, "News post published");
            (
                axum::http::StatusCode::CREATED,
                Json(NewsPostResponse::from(post)),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create news post: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create news post",
            )
                .into_response()
        }
    }
}

// DELETE /api/news/:id
pub async fn delete_news(
    Extension(db): Extension<DatabaseConnection>,
    Path(post_id): Path<i32>,
) -> impl IntoResponse {
    let post = match NewsPost::find_by_id(post_id).one(&db).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (axum::http::StatusCode::NOT_FOUND, "News post not found").into_response()
        }
        Err(e) => {
            error!("Failed to fetch news post {}: {}", post_id, e);
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
            )
                .into_response();
        }
    };

    match NewsPost::delete_by_id(post.id).exec(&db).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"status": "deleted"})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete news post {}: {}", post_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete news post",
            )
                .into_response()
        }
    }
}
