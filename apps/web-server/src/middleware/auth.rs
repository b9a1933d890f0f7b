//! Session identity extractors.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures::future::LocalBoxFuture;

use yatube_core::domain::User;
use yatube_core::ports::AuthError;
use yatube_shared::Viewer;

use super::error::{AppError, AppResult};
use crate::state::AppState;

/// Cookie carrying the session JWT.
pub const SESSION_COOKIE: &str = "yatube_session";

pub const LOGIN_PATH: &str = "/auth/login/";

/// The signed-in user. Gated handlers take this as an argument; anonymous
/// requests are redirected to the login page with `next` set to the
/// requested path and query.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl Identity {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            id: self.user_id,
            username: self.username.clone(),
        }
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// Anonymous access to a gated route.
#[derive(Debug)]
pub struct LoginRequired {
    pub next: String,
    pub reason: AuthError,
}

impl std::fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "login required for {}: {}", self.next, self.reason)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_url(&self.next)))
            .finish()
    }
}

/// `/auth/login/?next=<path>`.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

fn session_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Ok(cookie.value().to_string());
    }

    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(AuthError::MissingAuth);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

/// Requested path with its query string.
fn full_path(req: &HttpRequest) -> String {
    match req.query_string() {
        "" => req.path().to_string(),
        query => format!("{}?{}", req.path(), query),
    }
}

/// Resolve the session to an account that still exists.
///
/// The outer error is a store failure; the inner one means the request is
/// anonymous (no token, a bad token, or a deleted account).
async fn identify(req: &HttpRequest) -> AppResult<Result<Identity, AuthError>> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AppError::Internal("Server configuration error".to_string()));
    };

    let claims = match session_token(req).and_then(|token| state.tokens.validate_token(&token)) {
        Ok(claims) => claims,
        Err(reason) => return Ok(Err(reason)),
    };

    match state.accounts.session_user(claims.user_id).await? {
        Some(user) => Ok(Ok(Identity::from(user))),
        None => {
            tracing::debug!(user_id = claims.user_id, "Session for a deleted account");
            Ok(Err(AuthError::InvalidToken("Account no longer exists".to_string())))
        }
    }
}

async fn require_identity(req: HttpRequest) -> Result<Identity, actix_web::Error> {
    match identify(&req).await? {
        Ok(identity) => Ok(identity),
        Err(reason) => {
            tracing::debug!(path = %req.path(), %reason, "Anonymous request to gated route");
            Err(LoginRequired {
                next: full_path(&req),
                reason,
            }
            .into())
        }
    }
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(require_identity(req.clone()))
    }
}

/// Identity when present; never rejects the request.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|identity| identity.user_id)
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(Identity::viewer)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let identity = identify(&req).await?.ok();
            Ok::<_, actix_web::Error>(OptionalIdentity(identity))
        })
    }
}
