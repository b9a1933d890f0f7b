//! Request-level tests over the in-memory store.

mod accounts;
mod posts;

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::web;

use yatube_core::domain::{Group, NewGroup, NewPost, NewUser, Post, User};
use yatube_core::ports::TokenService;
use yatube_core::services::Repositories;
use yatube_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryMediaStorage, InMemoryStore, JwtConfig,
    JwtTokenService,
};

use crate::middleware::auth::SESSION_COOKIE;
use crate::state::{AppState, Backends};

pub(crate) const BOUNDARY: &str = "yatube-test-boundary";

/// 1x1 GIF.
pub(crate) const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\x0A\x00\x3B";

pub(crate) struct Harness {
    pub repos: Repositories,
    pub cache: Arc<InMemoryCache>,
    pub media: Arc<InMemoryMediaStorage>,
    pub tokens: Arc<JwtTokenService>,
    pub state: web::Data<AppState>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(posts_per_page: u64) -> Self {
        let repos = Arc::new(InMemoryStore::new()).repositories();
        let cache = Arc::new(InMemoryCache::new());
        let media = Arc::new(InMemoryMediaStorage::new());
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "yatube-test".to_string(),
        }));

        let state = AppState::from_backends(
            Backends {
                repos: repos.clone(),
                cache: cache.clone(),
                media: media.clone(),
                tokens: tokens.clone(),
                passwords: Arc::new(Argon2PasswordService::new()),
                store: "memory",
            },
            posts_per_page,
            Duration::from_secs(20),
        );

        Self {
            repos,
            cache,
            media,
            tokens,
            state: web::Data::new(state),
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.repos
            .users
            .create(NewUser::new(
                username.to_string(),
                format!("{username}@example.com"),
                "unused".to_string(),
            ))
            .await
            .unwrap()
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.repos
            .groups
            .create(NewGroup {
                title: format!("Group {slug}"),
                slug: slug.to_string(),
                description: Some("Test group".to_string()),
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.repos
            .posts
            .create(NewPost {
                text: text.to_string(),
                author_id: author.id,
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .unwrap()
    }

    pub fn session(&self, user: &User) -> Cookie<'static> {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}

/// The app under test with every route mounted.
macro_rules! app {
    ($harness:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($harness.state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}
pub(crate) use app;

/// `multipart/form-data` body with text fields and an optional image part.
pub(crate) fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(crate) fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
