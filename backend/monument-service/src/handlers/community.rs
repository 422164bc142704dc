//! Community post endpoints.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::info;

use crate::error::{AppError, Result};
use crate::handlers::{read_media_file, read_text_field};
use crate::models::{CreatePostResponse, MessageResponse, PostsResponse};
use crate::services::community::{MediaFile, NewPost};
use crate::AppState;

/// Posts for one monument
#[utoipa::path(
    get,
    path = "/community/{monument_name}",
    tag = "Community",
    params(("monument_name" = String, Path, description = "Monument whose posts to list")),
    responses(
        (status = 200, description = "Posts with count, or an explanatory message", body = PostsResponse),
        (status = 500, description = "Document store failure")
    )
)]
pub async fn get_community(
    state: web::Data<AppState>,
    monument_name: web::Path<String>,
) -> Result<HttpResponse> {
    let monument_name = monument_name.into_inner();
    if monument_name.is_empty() {
        return Ok(HttpResponse::Ok().json(MessageResponse::new("Monument name is required.")));
    }

    let posts = state.community.posts_for_monument(&monument_name).await?;
    if posts.is_empty() {
        return Ok(HttpResponse::Ok().json(MessageResponse::new(
            "No posts available for this monument.",
        )));
    }

    info!(count = posts.len(), monument = %monument_name, "fetched community posts");
    Ok(HttpResponse::Ok().json(PostsResponse {
        count: posts.len(),
        posts,
    }))
}

/// Posts across every monument
#[utoipa::path(
    get,
    path = "/community",
    tag = "Community",
    responses(
        (status = 200, description = "All posts with count, or an explanatory message", body = PostsResponse),
        (status = 500, description = "Document store failure")
    )
)]
pub async fn get_all_community(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.community.all_posts().await?;
    if posts.is_empty() {
        return Ok(HttpResponse::Ok().json(MessageResponse::new("No community posts available.")));
    }

    info!(count = posts.len(), "fetched all community posts");
    Ok(HttpResponse::Ok().json(PostsResponse {
        count: posts.len(),
        posts,
    }))
}

/// Create a community post from a multipart form: the four required text
/// fields plus any number of `images`, `videos`, and `gifs` files.
#[utoipa::path(
    post,
    path = "/community/post",
    tag = "Community",
    responses(
        (status = 200, description = "Post created", body = CreatePostResponse),
        (status = 400, description = "Missing required form field"),
        (status = 500, description = "Upload or store failure")
    )
)]
pub async fn create_community_post(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut username: Option<String> = None;
    let mut monument_name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut review: Option<String> = None;
    let mut images: Vec<MediaFile> = Vec::new();
    let mut videos: Vec<MediaFile> = Vec::new();
    let mut gifs: Vec<MediaFile> = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field = field
            .map_err(|e| AppError::validation(format!("Malformed multipart payload: {e}")))?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "Username" => username = Some(read_text_field(&mut field).await?),
            "Monument_name" => monument_name = Some(read_text_field(&mut field).await?),
            "Description" => description = Some(read_text_field(&mut field).await?),
            "Review" => review = Some(read_text_field(&mut field).await?),
            "images" => {
                if let Some(file) = read_media_file(&mut field).await? {
                    images.push(file);
                }
            }
            "videos" => {
                if let Some(file) = read_media_file(&mut field).await? {
                    videos.push(file);
                }
            }
            "gifs" => {
                if let Some(file) = read_media_file(&mut field).await? {
                    gifs.push(file);
                }
            }
            _ => {}
        }
    }

    let post = NewPost {
        username: require_field(username, "Username")?,
        monument_name: require_field(monument_name, "Monument_name")?,
        description: require_field(description, "Description")?,
        review: require_field(review, "Review")?,
    };

    let (post_id, post_data) = state
        .community
        .create_post(post, images, videos, gifs)
        .await?;

    Ok(HttpResponse::Ok().json(CreatePostResponse {
        message: "Community post created successfully!".to_string(),
        post_id,
        post_data,
    }))
}

fn require_field(value: Option<String>, name: &str) -> Result<String> {
    value.ok_or_else(|| AppError::validation(format!("Missing required form field: {name}")))
}
