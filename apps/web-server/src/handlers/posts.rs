//! Feeds, post pages, the post form, comments and follow toggles.

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, http::header::ContentType, web};
use serde::Serialize;

use yatube_core::Page;
use yatube_core::error::DomainError;
use yatube_core::forms::{BoundForm, CommentForm, FormErrors, PostForm};
use yatube_core::services::{EditAccess, EditOutcome, PostCard, PostDetail};
use yatube_shared::PageResponse;

use super::upload::read_post_form;
use super::{PageQuery, redirect, render, render_with_status};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::page_cache;
use crate::state::AppState;

#[derive(Serialize)]
struct FeedContext {
    page: Page<PostCard>,
}

#[derive(Serialize)]
struct DetailContext {
    #[serde(flatten)]
    detail: PostDetail,
    /// Present for signed-in viewers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_form: Option<BoundForm>,
}

#[derive(Serialize)]
struct PostFormContext {
    form: BoundForm,
    is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<i64>,
}

/// GET / - served from the page cache for `index_cache_ttl`.
///
/// The cached body is shared by every visitor, so it carries no viewer.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = page_cache::key(&req);
    let body = page_cache::get_or_render(
        state.cache.as_ref(),
        &key,
        state.index_cache_ttl,
        || async {
            let page = state.feed.index(query.page.as_deref()).await?;
            Ok(PageResponse::new(
                "posts:index",
                "Latest updates on the site",
                FeedContext { page },
            ))
        },
    )
    .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let feed = state.feed.group(&path, query.page.as_deref()).await?;
    let title = format!("Posts of the group {}", feed.group);
    Ok(render(
        &PageResponse::new("posts:group_list", title, feed).with_viewer(identity.viewer()),
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let feed = state
        .feed
        .profile(&path, identity.user_id(), query.page.as_deref())
        .await?;
    let title = format!("Profile of {}", feed.author.username);
    Ok(render(
        &PageResponse::new("posts:profile", title, feed).with_viewer(identity.viewer()),
    ))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let detail = state.feed.post_detail(path.into_inner()).await?;
    let title = format!("Post {}", detail.post.post);
    let comment_form = identity
        .0
        .as_ref()
        .map(|_| BoundForm::unbound(CommentForm::schema()));

    Ok(render(
        &PageResponse::new(
            "posts:post_detail",
            title,
            DetailContext {
                detail,
                comment_form,
            },
        )
        .with_viewer(identity.viewer()),
    ))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.posts.groups().await?;
    let form = BoundForm::unbound(PostForm::schema(&groups));
    Ok(post_form_page(&identity, StatusCode::OK, form, None))
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (form, image) = read_post_form(payload).await?;

    match state.posts.create_post(identity.user_id, &form, image).await {
        Ok(_) => Ok(redirect(format!("/profile/{}/", identity.username))),
        Err(DomainError::InvalidForm(errors)) => {
            invalid_post_form(&state, &identity, &form, errors, None).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{post_id}/edit/ - non-authors are sent back to the post.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = match state.posts.edit_access(identity.user_id, post_id).await? {
        EditAccess::Allowed(post) => post,
        EditAccess::NotAuthor => return Ok(redirect(post_url(post_id))),
    };

    let groups = state.posts.groups().await?;
    let form = BoundForm::unbound(PostForm::schema(&groups))
        .with_values(PostForm::initial(&post).values());
    Ok(post_form_page(&identity, StatusCode::OK, form, Some(post_id)))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let (form, image) = read_post_form(payload).await?;

    match state
        .posts
        .edit_post(identity.user_id, post_id, &form, image)
        .await
    {
        Ok(EditOutcome::Updated(_) | EditOutcome::NotAuthor) => Ok(redirect(post_url(post_id))),
        Err(DomainError::InvalidForm(errors)) => {
            invalid_post_form(&state, &identity, &form, errors, Some(post_id)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /posts/{post_id}/comment/ - an invalid comment is dropped.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    match state.posts.add_comment(identity.user_id, post_id, &form).await {
        Ok(_) => {}
        Err(DomainError::InvalidForm(errors)) => {
            tracing::debug!(post_id, %errors, "Dropping invalid comment");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(redirect(post_url(post_id)))
}

/// GET /posts/{post_id}/comment/
pub async fn add_comment_get(_identity: Identity, path: web::Path<i64>) -> HttpResponse {
    redirect(post_url(path.into_inner()))
}

/// GET /follow/
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .following(identity.user_id, query.page.as_deref())
        .await?;
    Ok(render(
        &PageResponse::new("posts:follow_index", "Your subscriptions", FeedContext { page })
            .with_viewer(Some(identity.viewer())),
    ))
}

/// GET /profile/{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state.follows.follow(identity.user_id, &path).await?;
    tracing::debug!(user_id = identity.user_id, author = %path, ?outcome, "Follow requested");
    Ok(redirect(format!("/profile/{}/", path)))
}

/// GET /profile/{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.follows.unfollow(identity.user_id, &path).await?;
    Ok(redirect(format!("/profile/{}/", path)))
}

fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

fn post_form_page(
    identity: &Identity,
    status: StatusCode,
    form: BoundForm,
    post_id: Option<i64>,
) -> HttpResponse {
    let title = if post_id.is_some() { "Edit post" } else { "New post" };
    let context = PostFormContext {
        form,
        is_edit: post_id.is_some(),
        post_id,
    };
    render_with_status(
        status,
        &PageResponse::new("posts:create_post", title, context)
            .with_viewer(Some(identity.viewer())),
    )
}

/// Redisplay the form with the submitted values and their errors.
async fn invalid_post_form(
    state: &AppState,
    identity: &Identity,
    form: &PostForm,
    errors: FormErrors,
    post_id: Option<i64>,
) -> AppResult<HttpResponse> {
    let groups = state.posts.groups().await?;
    let bound = BoundForm::unbound(PostForm::schema(&groups))
        .with_values(form.values())
        .with_errors(errors);
    Ok(post_form_page(
        identity,
        StatusCode::UNPROCESSABLE_ENTITY,
        bound,
        post_id,
    ))
}
