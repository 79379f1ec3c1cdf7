use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use chrono::{Duration, Utc};
use rolegate::app::AuthState;
use rolegate::auth::{Claims, TokenIssuer};
use rolegate::config::Config;
use rolegate::models::{Role, User};
use rolegate::routes::{self, health};
use rolegate::store::MemoryUserStore;
use serde_json::Value;
use std::net::TcpListener;
use std::sync::Arc;
use uuid::Uuid;

const SECRET: &str = "access_test_secret";

fn test_state() -> AuthState {
    let config = Config::from_lookup(|name| match name {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config");
    AuthState::new(&config, Arc::new(MemoryUserStore::new())).expect("test state")
}

fn user(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: format!("{}_user", role),
        password_hash: String::new(),
        role,
        active: true,
        created_at: Utc::now(),
    }
}

fn token(secret: &str, role: Role) -> String {
    TokenIssuer::new(secret, Duration::hours(1))
        .unwrap()
        .issue(&user(role))
        .unwrap()
}

/// Sends a request to `uri` with the given `Authorization` value and returns
/// the status and parsed body.
async fn request(uri: &str, authorization: Option<String>) -> (StatusCode, Value) {
    let state = test_state();
    let verifier = state.verifier.clone();
    let app = test::init_service(
        App::new()
            .app_data(state.service.clone())
            .service(web::scope("/api").configure(|cfg| routes::configure(cfg, &verifier))),
    )
    .await;

    let mut req = if uri.ends_with("/me") {
        test::TestRequest::get().uri(uri)
    } else {
        test::TestRequest::post().uri(uri)
    };
    if let Some(value) = authorization {
        req = req.append_header(("Authorization", value));
    }

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[actix_rt::test]
async fn test_missing_header_is_unauthenticated() {
    let (status, body) = request("/api/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header missing");
}

#[actix_rt::test]
async fn test_basic_scheme_is_unauthenticated() {
    let (status, body) = request("/api/me", Some("Basic xyz".to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid authorization header");
}

#[actix_rt::test]
async fn test_user_token_forbidden_on_admin_route() {
    let header = format!("Bearer {}", token(SECRET, Role::User));
    let (status, _) = request("/api/admin/promote/anyone", Some(header)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_user_token_admitted_when_no_role_required() {
    let header = format!("Bearer {}", token(SECRET, Role::User));
    let (status, body) = request("/api/me", Some(header)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[actix_rt::test]
async fn test_admin_token_admitted_on_admin_route() {
    let header = format!("Bearer {}", token(SECRET, Role::Admin));
    // Passes the gate; the target account does not exist.
    let (status, _) = request("/api/admin/promote/anyone", Some(header)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_foreign_and_expired_tokens_look_the_same() {
    let foreign = format!("Bearer {}", token("some_other_secret", Role::Admin));
    let (status, foreign_body) = request("/api/me", Some(foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let issuer = TokenIssuer::new(SECRET, Duration::hours(1)).unwrap();
    let expired_claims = Claims::for_user(
        &user(Role::Admin),
        Utc::now() - Duration::hours(3),
        Duration::hours(1),
    )
    .unwrap();
    let expired = format!("Bearer {}", issuer.sign(&expired_claims).unwrap());
    let (status, expired_body) = request("/api/me", Some(expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(foreign_body, expired_body);
    assert_eq!(expired_body["error"], "Invalid token");
}

#[actix_rt::test]
async fn test_protected_route_over_http() {
    let state = test_state();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_state = state.clone();
    let server = HttpServer::new(move || {
        let verifier = server_state.verifier.clone();
        App::new()
            .app_data(server_state.service.clone())
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(|cfg| routes::configure(cfg, &verifier)))
    })
    .workers(1)
    .bind(("127.0.0.1", port))
    .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
    .run();
    let handle = server.handle();
    rt::spawn(server);

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/api/me", port);

    let resp = client.get(&url).send().await.expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(&url)
        .bearer_auth(token(SECRET, Role::Admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["role"], "admin");

    handle.stop(true).await;
}
