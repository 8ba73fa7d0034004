use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use murmur::api::AppState;
use murmur::config::Config;
use murmur::db::Store;
use murmur::state::SharedState;
use tower::ServiceExt;

/// Admin account seeded by the initial migration.
const ADMIN_EMAIL: &str = "admin@murmur.local";
const ADMIN_PASSWORD: &str = "changeme";

async fn spawn_app() -> (Router, Arc<AppState>) {
    let config = Config::default();

    // Single connection so every request sees the same in-memory database.
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to create store");

    let shared = Arc::new(SharedState::with_store(config, store));
    let state = murmur::api::create_app_state(shared, None);
    let router = murmur::api::router(state.clone()).await;

    (router, state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Sign up a user and return (id, token).
async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (i32, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({ "name": name, "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    let id = body["data"]["user"]["id"].as_i64().unwrap() as i32;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (id, token)
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn signup_authenticates_immediately_and_normalizes_email() {
    let (app, _state) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({
            "name": "Alice Adams",
            "email": "Alice@Example.COM",
            "password": "secret123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert_eq!(body["data"]["user"]["is_admin"], false);

    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    // The fresh token works on a protected route straight away.
    let (status, _) = send(&app, "GET", "/api/users", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_authentication() {
    let (app, _state) = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/feed", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/system/status", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn short_name_fails_validation_and_persists_nothing() {
    let (app, _state) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({
            "name": "Al",
            "email": "al@example.com",
            "password": "secret123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("name"));

    // Nothing was written: the attempted credentials do not authenticate.
    let (status, _) = login(&app, "al@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn weak_password_and_bad_email_are_rejected() {
    let (app, _state) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({
            "name": "Bob Brown",
            "email": "bob@example.com",
            "password": "123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("password"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({
            "name": "Bob Brown",
            "email": "not-an-email",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (app, _state) = spawn_app().await;

    signup(&app, "Carol One", "carol@example.com", "secret123").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(serde_json::json!({
            "name": "Carol Two",
            "email": "Carol@Example.com",
            "password": "secret456"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _state) = spawn_app().await;

    signup(&app, "Dave Davis", "dave@example.com", "secret123").await;

    let (wrong_pw_status, wrong_pw_body) = login(&app, "dave@example.com", "wrongpass").await;
    let (unknown_status, unknown_body) = login(&app, "nobody@example.com", "whatever").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Identical bodies: no account-enumeration signal.
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn relogin_rotates_the_token() {
    let (app, state) = spawn_app().await;

    let (id, first_token) = signup(&app, "Erin Estes", "erin@example.com", "secret123").await;

    let (status, body) = login(&app, "erin@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    let second_token = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(first_token, second_token);

    // The superseded token is dead, the new one lives.
    let (status, _) = send(&app, "GET", "/api/users", Some(&first_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/users", Some(&second_token), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(state.store().live_token_count(id).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_token_issuance_leaves_exactly_one_live_token() {
    let (app, state) = spawn_app().await;

    let (id, _) = signup(&app, "Fred Finch", "fred@example.com", "secret123").await;

    let store = state.store();
    let (a, b) = tokio::join!(store.issue_token(id), store.issue_token(id));
    a.unwrap();
    b.unwrap();

    assert_eq!(store.live_token_count(id).await.unwrap(), 1);
}

#[tokio::test]
async fn logout_revokes_and_is_idempotent() {
    let (app, state) = spawn_app().await;

    let (id, token) = signup(&app, "Gina Gray", "gina@example.com", "secret123").await;

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store().live_token_count(id).await.unwrap(), 0);

    let (status, _) = send(&app, "GET", "/api/feed", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Revoking with no live token is not an error.
    state.store().revoke_tokens(id).await.unwrap();
}

#[tokio::test]
async fn session_cookie_works_without_bearer_token() {
    let (app, _state) = spawn_app().await;

    signup(&app, "Hana Hall", "hana@example.com", "secret123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "email": "hana@example.com", "password": "secret123" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("Cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let (app, _state) = spawn_app().await;

    let (id, token) = signup(&app, "Ivan Ivic", "ivan@example.com", "secret123").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{id}/follow"),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn follow_is_idempotent_and_unfollow_tolerates_absence() {
    let (app, _state) = spawn_app().await;

    let (_a_id, a_token) = signup(&app, "Jill Jones", "jill@example.com", "secret123").await;
    let (b_id, b_token) = signup(&app, "Karl Kern", "karl@example.com", "secret123").await;

    // Unfollow before any edge exists: a no-op, not an error.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{b_id}/unfollow"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/users/{b_id}/follow"),
            Some(&a_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Exactly one edge regardless of the repeat.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{b_id}/followers"),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{b_id}/is-following"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["following"], true);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{b_id}/unfollow"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/users/{b_id}/followers"),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn feed_merges_followed_authors_newest_first() {
    let (app, _state) = spawn_app().await;

    let (a_id, a_token) = signup(&app, "Liam Law", "liam@example.com", "secret123").await;
    let (b_id, b_token) = signup(&app, "Mona Moss", "mona@example.com", "secret123").await;
    let (_x_id, x_token) = signup(&app, "Xena Xu", "xena@example.com", "secret123").await;

    // Empty follow set produces an empty feed, not an error.
    let (status, body) = send(&app, "GET", "/api/feed", Some(&x_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Interleaved posting: A, then B, then A again.
    for (token, content) in [
        (&a_token, "first from A"),
        (&b_token, "first from B"),
        (&a_token, "second from A"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/microposts",
            Some(token),
            Some(serde_json::json!({ "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for id in [a_id, b_id] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/users/{id}/follow"),
            Some(&x_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", "/api/feed", Some(&x_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);

    // Globally ordered across both authors, not author-by-author.
    assert_eq!(items[0]["content"], "second from A");
    assert_eq!(items[1]["content"], "first from B");
    assert_eq!(items[2]["content"], "first from A");

    let times: Vec<&str> = items
        .iter()
        .map(|i| i["created_at"].as_str().unwrap())
        .collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn post_deletion_is_author_only() {
    let (app, _state) = spawn_app().await;

    let (_a_id, a_token) = signup(&app, "Nora Nash", "nora@example.com", "secret123").await;
    let (_b_id, b_token) = signup(&app, "Omar Ortiz", "omar@example.com", "secret123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/microposts",
        Some(&a_token),
        Some(serde_json::json!({ "content": "hello world" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = body["data"]["id"].as_i64().unwrap();

    // Another user cannot delete it.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/microposts/{post_id}"),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Not even the admin: post deletion is ownership-based.
    let (_, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/microposts/{post_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/microposts/{post_id}"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn account_updates_are_owner_or_admin_only() {
    let (app, _state) = spawn_app().await;

    let (a_id, a_token) = signup(&app, "Pete Park", "pete@example.com", "secret123").await;
    let (_b_id, b_token) = signup(&app, "Quin Quade", "quin@example.com", "secret123").await;

    // A stranger cannot update the account: Forbidden, not NotFound.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/users/{a_id}"),
        Some(&b_token),
        Some(serde_json::json!({ "name": "Hacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner can.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/users/{a_id}"),
        Some(&a_token),
        Some(serde_json::json!({ "name": "Peter Park" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Peter Park");

    // The merged result is validated: a bad email never commits.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/users/{a_id}"),
        Some(&a_token),
        Some(serde_json::json!({ "email": "broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // An admin can rename anyone.
    let (_, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/users/{a_id}"),
        Some(&admin_token),
        Some(serde_json::json!({ "name": "Renamed by admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn account_deletion_is_admin_only_and_cascades() {
    let (app, state) = spawn_app().await;

    let (a_id, a_token) = signup(&app, "Rita Reed", "rita@example.com", "secret123").await;
    let (b_id, b_token) = signup(&app, "Saul Soto", "saul@example.com", "secret123").await;

    // Build up state referencing B: posts and edges in both directions.
    let (status, _) = send(
        &app,
        "POST",
        "/api/microposts",
        Some(&b_token),
        Some(serde_json::json!({ "content": "soon to vanish" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    send(
        &app,
        "POST",
        &format!("/api/users/{b_id}/follow"),
        Some(&a_token),
        None,
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/users/{a_id}/follow"),
        Some(&b_token),
        None,
    )
    .await;

    // A non-admin cannot delete, and the target is untouched.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{b_id}"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{b_id}"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The admin can.
    let (_, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/{b_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Gone, with nothing dangling.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{b_id}"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/feed", Some(&b_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/users/{a_id}/following"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/users/{a_id}/followers"),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    assert_eq!(state.store().live_token_count(b_id).await.unwrap(), 0);
    assert_eq!(
        state.store().post_count_by_author(b_id).await.unwrap(),
        0
    );

    // A's feed no longer references the deleted author.
    let (status, body) = send(&app, "GET", "/api/feed", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn profile_reports_posts_and_graph_counts() {
    let (app, _state) = spawn_app().await;

    let (t_id, t_token) = signup(&app, "Tess Tate", "tess@example.com", "secret123").await;
    let (_u_id, u_token) = signup(&app, "Ugo Udo", "ugo@example.com", "secret123").await;

    send(
        &app,
        "POST",
        "/api/microposts",
        Some(&t_token),
        Some(serde_json::json!({ "content": "a post" })),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/users/{t_id}/follow"),
        Some(&u_token),
        None,
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{t_id}"),
        Some(&u_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], t_id);
    assert_eq!(body["data"]["microposts"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["follower_count"], 1);
    assert_eq!(body["data"]["following_count"], 0);
}
