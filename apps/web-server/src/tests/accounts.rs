use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::Value;

use yatube_core::ports::TokenService;

use super::{Harness, app};
use crate::middleware::auth::SESSION_COOKIE;

const PASSWORD: &str = "correct-horse-battery";

fn signup_request(username: &str, password1: &str, password2: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/auth/signup/").set_form([
        ("username", username),
        ("email", "leo@example.com"),
        ("password1", password1),
        ("password2", password2),
    ])
}

#[actix_web::test]
async fn test_signup_creates_user() {
    let h = Harness::new();
    let app = app!(h);

    let resp = test::call_service(&app, signup_request("leo", PASSWORD, PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let user = h.repos.users.find_by_username("leo").await.unwrap().unwrap();
    assert_eq!(user.email, "leo@example.com");
    assert_ne!(user.password_hash, PASSWORD);
}

#[actix_web::test]
async fn test_signup_rejects_taken_username_and_mismatch() {
    let h = Harness::new();
    h.user("leo").await;
    let app = app!(h);

    let resp = test::call_service(&app, signup_request("leo", PASSWORD, PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["view"], "users:signup");
    assert!(page["form"]["errors"]["username"].is_array());
    assert_eq!(page["form"]["values"]["username"], "leo");

    let resp = test::call_service(
        &app,
        signup_request("ann", PASSWORD, "something-else").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page: Value = test::read_body_json(resp).await;
    assert!(page["form"]["errors"]["password2"].is_array());
    assert!(page["form"]["values"].get("password1").is_none());
    assert!(h.repos.users.find_by_username("ann").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_login_sets_session_and_follows_next() {
    let h = Harness::new();
    let app = app!(h);
    test::call_service(&app, signup_request("leo", PASSWORD, PASSWORD).to_request()).await;

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/login/?next=/follow/")
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["values"]["next"], "/follow/");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "leo"),
                ("password", PASSWORD),
                ("next", "/follow/"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/follow/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cookie.http_only(), Some(true));
    let claims = h.tokens.validate_token(cookie.value()).unwrap();
    assert_eq!(claims.username, "leo");

    let feed = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .cookie(cookie.into_owned())
            .to_request(),
    )
    .await;
    assert_eq!(feed.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_with_bad_credentials() {
    let h = Harness::new();
    let app = app!(h);
    test::call_service(&app, signup_request("leo", PASSWORD, PASSWORD).to_request()).await;

    for (username, password) in [("leo", "wrong-password"), ("nobody", PASSWORD)] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login/")
                .set_form([("username", username), ("password", password)])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp.response().cookies().next().is_none());

        let page: Value = test::read_body_json(resp).await;
        assert!(page["form"]["errors"]["__all__"].is_array());
    }
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let h = Harness::new();
    let user = h.user("leo").await;
    let app = app!(h);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/logout/")
            .cookie(h.session(&user))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cookie.value(), "");

    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["view"], "users:logged_out");
}

#[actix_web::test]
async fn test_bearer_token_identifies_user() {
    let h = Harness::new();
    let user = h.user("leo").await;
    let app = app!(h);
    let token = h.tokens.generate_token(user.id, &user.username).unwrap();

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(page["viewer"]["username"], "leo");
}
