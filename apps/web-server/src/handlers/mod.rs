//! HTTP handlers and route configuration.

mod about;
mod health;
mod media;
mod posts;
mod upload;
mod users;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use yatube_shared::PageResponse;

use crate::middleware::error::not_found;

/// `?page=` as given; the paginator decides what it means.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/profile/{username}/follow/", web::get().to(posts::profile_follow))
        .route("/profile/{username}/unfollow/", web::get().to(posts::profile_unfollow))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/posts/{post_id}/comment/")
                .route(web::get().to(posts::add_comment_get))
                .route(web::post().to(posts::add_comment)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/follow/", web::get().to(posts::follow_index))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(users::signup_form))
                        .route(web::post().to(users::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(users::login_form))
                        .route(web::post().to(users::login)),
                )
                .route("/logout/", web::get().to(users::logout)),
        )
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .route("/media/{path:.*}", web::get().to(media::serve))
        .default_service(web::to(not_found));
}

fn render<T: Serialize>(page: &PageResponse<T>) -> HttpResponse {
    render_with_status(StatusCode::OK, page)
}

fn render_with_status<T: Serialize>(status: StatusCode, page: &PageResponse<T>) -> HttpResponse {
    HttpResponse::build(status).json(page)
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}
