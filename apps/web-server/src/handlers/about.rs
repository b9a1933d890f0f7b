//! Static informational pages.

use actix_web::HttpResponse;
use serde::Serialize;
use yatube_shared::PageResponse;

use super::render;
use crate::middleware::auth::OptionalIdentity;

#[derive(Serialize)]
struct StaticPage {
    body: &'static str,
}

/// GET /about/author/
pub async fn author(identity: OptionalIdentity) -> HttpResponse {
    render(
        &PageResponse::new(
            "about:author",
            "About the author",
            StaticPage {
                body: "Yatube is a small blogging platform written as a learning project.",
            },
        )
        .with_viewer(identity.viewer()),
    )
}

/// GET /about/tech/
pub async fn tech(identity: OptionalIdentity) -> HttpResponse {
    render(
        &PageResponse::new(
            "about:tech",
            "Technologies",
            StaticPage {
                body: "Rust, actix-web, SeaORM on PostgreSQL, Redis for the page cache.",
            },
        )
        .with_viewer(identity.viewer()),
    )
}
