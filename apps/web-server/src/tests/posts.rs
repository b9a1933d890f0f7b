use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::Value;

use yatube_core::domain::PostFilter;
use yatube_core::ports::{Cache, MediaStorage};

use super::{Harness, SMALL_GIF, app, multipart, multipart_content_type};

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn item_texts(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_index_splits_thirteen_posts_into_ten_and_three() {
    let h = Harness::new();
    let author = h.user("leo").await;
    for n in 0..13 {
        h.post(&author, &format!("post {n}"), None).await;
    }
    let app = app!(h);

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(first["view"], "posts:index");
    assert_eq!(first["page"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["page"]["num_pages"], 2);
    assert_eq!(item_texts(&first["page"])[0], "post 12");

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=2").to_request(),
    )
    .await;
    assert_eq!(second["page"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(second["page"]["has_next"], false);

    let beyond: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=99").to_request(),
    )
    .await;
    assert_eq!(beyond["page"]["number"], 2);

    let garbage: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=abc").to_request(),
    )
    .await;
    assert_eq!(garbage["page"]["number"], 1);
}

#[actix_web::test]
async fn test_group_and_profile_pages_hold_ten_then_three() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let other = h.user("ann").await;
    let cats = h.group("cats").await;
    for n in 0..13 {
        h.post(&author, &format!("cat post {n}"), Some(&cats)).await;
    }
    h.post(&other, "elsewhere", None).await;
    let app = app!(h);

    for base in ["/group/cats/", "/profile/leo/"] {
        let first: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(base).to_request())
                .await;
        assert_eq!(first["page"]["items"].as_array().unwrap().len(), 10, "{base}");
        assert_eq!(first["page"]["count"], 13, "{base}");

        let second: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("{base}?page=2"))
                .to_request(),
        )
        .await;
        assert_eq!(second["page"]["items"].as_array().unwrap().len(), 3, "{base}");
        assert_eq!(item_texts(&second["page"])[2], "cat post 0", "{base}");
    }
}

#[actix_web::test]
async fn test_index_stays_cached_until_cleared() {
    let h = Harness::new();
    let author = h.user("leo").await;
    h.post(&author, "first", None).await;
    let app = app!(h);

    let before: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(before["page"]["count"], 1);

    h.post(&author, "second", None).await;
    let cached: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cached, before);

    h.cache.clear().await.unwrap();
    let fresh: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(fresh["page"]["count"], 2);
    assert_eq!(item_texts(&fresh["page"])[0], "second");
}

#[actix_web::test]
async fn test_group_page_lists_only_group_posts() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let cats = h.group("cats").await;
    let dogs = h.group("dogs").await;
    h.post(&author, "about cats", Some(&cats)).await;
    h.post(&author, "about dogs", Some(&dogs)).await;
    let app = app!(h);

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/group/cats/").to_request(),
    )
    .await;
    assert_eq!(page["group"]["slug"], "cats");
    assert_eq!(item_texts(&page["page"]), ["about cats"]);
    assert_eq!(page["page"]["items"][0]["group"]["title"], "Group cats");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/missing/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profile_shows_count_and_follow_state() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let reader = h.user("ann").await;
    h.post(&author, "one", None).await;
    h.post(&author, "two", None).await;
    h.repos.follows.insert_if_absent(reader.id, author.id).await.unwrap();
    let app = app!(h);

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/leo/")
            .cookie(h.session(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(page["author"]["username"], "leo");
    assert!(page["author"].get("password_hash").is_none());
    assert_eq!(page["post_count"], 2);
    assert_eq!(page["following"], true);
    assert_eq!(page["viewer"]["username"], "ann");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/nobody/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_detail_and_missing_post() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let post = h.post(&author, "A rather long post text", None).await;
    let app = app!(h);

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(page["post"]["text"], "A rather long post text");
    assert_eq!(page["post"]["author"], "leo");
    assert_eq!(page["author_post_count"], 1);
    assert_eq!(page["title"], "Post A rather long p");
    assert!(page.get("comment_form").is_none());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/999/").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_create_requires_login() {
    let h = Harness::new();
    let app = app!(h);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");
}

#[actix_web::test]
async fn test_login_redirect_keeps_query_string() {
    let h = Harness::new();
    let app = app!(h);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/follow/?page=2").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Ffollow%2F%3Fpage%3D2");
}

#[actix_web::test]
async fn test_session_of_deleted_user_is_anonymous() {
    let h = Harness::new();
    let user = h.user("leo").await;
    let session = h.session(&user);
    h.repos.users.delete(user.id).await.unwrap();
    let app = app!(h);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .cookie(session.clone())
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart(&[("text", "ghost post")], None))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");
    assert_eq!(h.repos.posts.count(PostFilter::All).await.unwrap(), 0);

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/about/author/").cookie(session).to_request(),
    )
    .await;
    assert!(page.get("viewer").is_none());
}

#[actix_web::test]
async fn test_create_post_with_image() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let group = h.group("cats").await;
    let app = app!(h);

    let group_id = group.id.to_string();
    let body = multipart(
        &[("text", "New post"), ("group", group_id.as_str())],
        Some(("small.gif", SMALL_GIF)),
    );
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .cookie(h.session(&author))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");

    let posts = h.repos.posts.list(PostFilter::All, 0, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].group_id, Some(group.id));
    assert_eq!(posts[0].image.as_deref(), Some("posts/small.gif"));
    assert_eq!(
        h.media.read("posts/small.gif").await.unwrap(),
        Some(SMALL_GIF.to_vec())
    );

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/media/posts/small.gif").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/gif");
}

#[actix_web::test]
async fn test_invalid_post_form_is_redisplayed() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let app = app!(h);

    let body = multipart(&[("text", "   "), ("group", "42")], Some(("notes.txt", b"plain text")));
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .cookie(h.session(&author))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["view"], "posts:create_post");
    assert!(page["form"]["errors"]["text"].is_array());
    assert!(page["form"]["errors"]["group"].is_array());
    assert!(page["form"]["errors"]["image"].is_array());
    assert_eq!(page["form"]["values"]["group"], "42");
    assert_eq!(h.repos.posts.count(PostFilter::All).await.unwrap(), 0);
    assert!(h.media.is_empty().await);
}

#[actix_web::test]
async fn test_edit_by_non_author_changes_nothing() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let other = h.user("ann").await;
    let post = h.post(&author, "original", None).await;
    let app = app!(h);
    let edit_url = format!("/posts/{}/edit/", post.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&edit_url)
            .cookie(h.session(&other))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit_url)
            .cookie(h.session(&other))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart(&[("text", "hijacked")], None))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = h.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);
}

#[actix_web::test]
async fn test_author_edit_keeps_pub_date_and_image() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let group = h.group("cats").await;
    let app = app!(h);

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .cookie(h.session(&author))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart(&[("text", "before")], Some(("small.gif", SMALL_GIF))))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::FOUND);
    let post = h.repos.posts.list(PostFilter::All, 0, 1).await.unwrap().remove(0);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", post.id))
            .cookie(h.session(&author))
            .to_request(),
    )
    .await;
    assert_eq!(form["is_edit"], true);
    assert_eq!(form["form"]["values"]["text"], "before");

    let group_id = group.id.to_string();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .cookie(h.session(&author))
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart(&[("text", "after"), ("group", group_id.as_str())], None))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let stored = h.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "after");
    assert_eq!(stored.group_id, Some(group.id));
    assert_eq!(stored.pub_date, post.pub_date);
    assert_eq!(stored.image, post.image);
}

#[actix_web::test]
async fn test_comments_need_login_and_text() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let reader = h.user("ann").await;
    let post = h.post(&author, "post", None).await;
    let app = app!(h);
    let comment_url = format!("/posts/{}/comment/", post.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&comment_url)
            .set_form([("text", "anonymous")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/?next="));

    for text in ["Nice post", "   "] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&comment_url)
                .cookie(h.session(&reader))
                .set_form([("text", text)])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    }

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .cookie(h.session(&reader))
            .to_request(),
    )
    .await;
    let comments = page["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Nice post");
    assert_eq!(comments[0]["author"], "ann");
    assert!(page["comment_form"].is_object());
}

#[actix_web::test]
async fn test_follow_feed_and_toggle() {
    let h = Harness::new();
    let author = h.user("leo").await;
    let reader = h.user("ann").await;
    let stranger = h.user("bob").await;
    h.post(&author, "followed content", None).await;
    let app = app!(h);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/profile/leo/follow/")
                .cookie(h.session(&reader))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/leo/");
    }
    assert!(h.repos.follows.exists(reader.id, author.id).await.unwrap());

    let feed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .cookie(h.session(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(item_texts(&feed["page"]), ["followed content"]);

    let other_feed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .cookie(h.session(&stranger))
            .to_request(),
    )
    .await;
    assert_eq!(other_feed["page"]["count"], 0);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/profile/leo/follow/")
            .cookie(h.session(&author))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(!h.repos.follows.exists(author.id, author.id).await.unwrap());

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/profile/leo/unfollow/")
                .cookie(h.session(&reader))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    assert!(!h.repos.follows.exists(reader.id, author.id).await.unwrap());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/profile/nobody/follow/")
            .cookie(h.session(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_unknown_path_and_health() {
    let h = Harness::new();
    let app = app!(h);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nowhere/").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["instance"], "/nowhere/");

    let health: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"], "memory");

    let about: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/about/tech/").to_request(),
    )
    .await;
    assert_eq!(about["view"], "about:tech");
}
