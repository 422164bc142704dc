//! Community posts: media uploads plus per-monument Firestore collections.
//!
//! Each monument's posts live in a collection named after the monument,
//! with the name duplicated as the `Monument_name` field. Both halves of
//! that layout are load-bearing: existing data is addressed as
//! `collections[Monument_name]/posts[id]`.

use bytes::Bytes;
use firestore_client::FirestoreClient;
use gcs_storage::GcsBucket;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CommunityPost, MediaUrls};

/// Firestore collection mirroring identity-provider accounts.
pub const USERS_COLLECTION: &str = "users";

/// Collections that belong to the service's own bookkeeping and must not
/// surface as monuments in the flattened community view.
const RESERVED_COLLECTIONS: &[&str] = &[USERS_COLLECTION];

/// One uploaded file as read from the multipart form.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Incoming post fields; media URLs are assigned during creation.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub username: String,
    pub monument_name: String,
    pub description: String,
    pub review: String,
}

#[derive(Clone)]
pub struct CommunityService {
    firestore: FirestoreClient,
    bucket: GcsBucket,
}

impl CommunityService {
    pub fn new(firestore: FirestoreClient, bucket: GcsBucket) -> Self {
        Self { firestore, bucket }
    }

    /// Upload all media, then write the post document.
    ///
    /// Uploads that finished before a failure are not rolled back; the
    /// document is written last, so no partial post ever becomes
    /// addressable. Returns the assigned id and the stored record.
    pub async fn create_post(
        &self,
        post: NewPost,
        images: Vec<MediaFile>,
        videos: Vec<MediaFile>,
        gifs: Vec<MediaFile>,
    ) -> Result<(String, Value)> {
        let media_urls = MediaUrls {
            image_urls: self.upload_category("images", images).await?,
            video_urls: self.upload_category("videos", videos).await?,
            gif_urls: self.upload_category("gifs", gifs).await?,
        };

        let post = CommunityPost {
            username: post.username,
            monument_name: post.monument_name,
            description: post.description,
            review: post.review,
            media_urls,
        };

        let post_data = serde_json::to_value(&post)
            .map_err(|e| AppError::service(format!("failed to encode post: {e}")))?;
        let document = self
            .firestore
            .create_document(&post.monument_name, &post_data)
            .await?;

        info!(
            post_id = %document.id,
            monument = %post.monument_name,
            "community post created"
        );
        Ok((document.id, post_data))
    }

    async fn upload_category(
        &self,
        category: &str,
        files: Vec<MediaFile>,
    ) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let object_path = object_path_for(category, &file.file_name);
            let url = self
                .bucket
                .upload_public(&object_path, file.data, &file.content_type)
                .await?;
            debug!(%url, "media file uploaded");
            urls.push(url);
        }
        Ok(urls)
    }

    /// Posts in one monument's collection, each with its document id
    /// attached as `id`.
    pub async fn posts_for_monument(&self, monument_name: &str) -> Result<Vec<Value>> {
        let documents = self.firestore.list_documents(monument_name).await?;
        Ok(documents
            .into_iter()
            .map(|doc| with_id(doc.fields, doc.id))
            .collect())
    }

    /// Every post across all monument collections, flattened, with `id`
    /// and a synthesized lowercase `monument_name` from the collection key.
    pub async fn all_posts(&self) -> Result<Vec<Value>> {
        let mut posts = Vec::new();

        for collection_id in self.firestore.list_collection_ids().await? {
            if RESERVED_COLLECTIONS.contains(&collection_id.as_str()) {
                continue;
            }
            for doc in self.firestore.list_documents(&collection_id).await? {
                let mut post = with_id(doc.fields, doc.id);
                if let Some(map) = post.as_object_mut() {
                    map.insert("monument_name".to_string(), json!(collection_id));
                }
                posts.push(post);
            }
        }

        Ok(posts)
    }
}

fn with_id(mut fields: Value, id: String) -> Value {
    if let Some(map) = fields.as_object_mut() {
        map.insert("id".to_string(), Value::String(id));
    }
    fields
}

/// Storage object name for an uploaded file: category-scoped, fresh UUID,
/// keeping the client file name's extension (the whole name when it has
/// none).
fn object_path_for(category: &str, file_name: &str) -> String {
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => file_name,
    };
    format!("{category}/{}.{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_keeps_extension() {
        let path = object_path_for("images", "holiday.jpg");
        assert!(path.starts_with("images/"));
        assert!(path.ends_with(".jpg"));
        // category, uuid, and extension only
        assert_eq!(path.matches('/').count(), 1);
    }

    #[test]
    fn object_path_uses_last_extension_segment() {
        let path = object_path_for("videos", "clip.tar.gz");
        assert!(path.ends_with(".gz"));
    }

    #[test]
    fn extensionless_name_becomes_the_extension() {
        let path = object_path_for("gifs", "loop");
        assert!(path.ends_with(".loop"));
    }

    #[test]
    fn object_paths_do_not_collide() {
        let a = object_path_for("images", "same.jpg");
        let b = object_path_for("images", "same.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn with_id_attaches_document_id() {
        let post = with_id(json!({ "Review": "great" }), "doc42".to_string());
        assert_eq!(post["id"], "doc42");
        assert_eq!(post["Review"], "great");
    }

    #[test]
    fn users_collection_is_reserved() {
        assert!(RESERVED_COLLECTIONS.contains(&USERS_COLLECTION));
    }
}
