//! Signup, login and logout.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use yatube_core::error::DomainError;
use yatube_core::forms::{BoundForm, LoginForm, SignupForm};
use yatube_shared::PageResponse;

use super::{redirect, render, render_with_status};
use crate::middleware::auth::{OptionalIdentity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Serialize)]
struct FormContext {
    form: BoundForm,
}

#[derive(Serialize)]
struct Empty {}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /auth/signup/
pub async fn signup_form() -> HttpResponse {
    render(&signup_page(BoundForm::unbound(SignupForm::schema())))
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    match state.accounts.signup(&form).await {
        Ok(_) => Ok(redirect("/")),
        Err(DomainError::InvalidForm(errors)) => {
            let bound = BoundForm::unbound(SignupForm::schema())
                .with_values(form.values())
                .with_errors(errors);
            Ok(render_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                &signup_page(bound),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/?next=...
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    let initial = LoginForm {
        next: query.into_inner().next,
        ..LoginForm::default()
    };
    let form = BoundForm::unbound(LoginForm::schema()).with_values(initial.values());
    render(&login_page(form))
}

/// POST /auth/login/ - sets the session cookie and follows `next` when it is
/// a local path.
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let user = match state.accounts.authenticate(&form).await {
        Ok(user) => user,
        Err(DomainError::InvalidForm(errors)) => {
            let bound = BoundForm::unbound(LoginForm::schema())
                .with_values(form.values())
                .with_errors(errors);
            return Ok(render_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                &login_page(bound),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = user.id, "User logged in");
    let mut response = redirect(safe_next(form.next.as_deref()));
    response
        .add_cookie(&cookie)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// GET /auth/logout/
pub async fn logout(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    if let Some(identity) = &identity.0 {
        tracing::info!(user_id = identity.user_id, "User logged out");
    }

    let mut response = render(&PageResponse::new(
        "users:logged_out",
        "You have logged out",
        Empty {},
    ));
    response
        .add_removal_cookie(&Cookie::build(SESSION_COOKIE, "").path("/").finish())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

fn signup_page(form: BoundForm) -> PageResponse<FormContext> {
    PageResponse::new("users:signup", "Sign up", FormContext { form })
}

fn login_page(form: BoundForm) -> PageResponse<FormContext> {
    PageResponse::new("users:login", "Log in", FormContext { form })
}

/// Only same-site absolute paths are followed; anything else lands on `/`.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_foreign_targets() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
