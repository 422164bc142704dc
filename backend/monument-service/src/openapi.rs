/// OpenAPI documentation for the monument service
use utoipa::OpenApi;

use crate::models::{
    CommunityPost, CreatePostResponse, LoginRequest, MediaUrls, MessageResponse,
    MonumentIdentification, PostsResponse, SignupRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Travisco Monument Service API",
        version = "1.0.0",
        description = "Monument identification backed by a generative vision model, plus per-monument community posts with uploaded media.",
        contact(
            name = "Travisco Team",
            email = "team@travisco.app"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Auth", description = "Account signup and login"),
        (name = "Find", description = "Monument identification from an image or a text query"),
        (name = "Community", description = "Per-monument community posts"),
    ),
    paths(
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::find::find_monument,
        crate::handlers::community::get_community,
        crate::handlers::community::get_all_community,
        crate::handlers::community::create_community_post,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        MessageResponse,
        MonumentIdentification,
        MediaUrls,
        CommunityPost,
        PostsResponse,
        CreatePostResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/signup",
            "/login",
            "/find",
            "/community",
            "/community/post",
            "/community/{monument_name}",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
