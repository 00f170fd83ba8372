use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::account;
use super::health;
use super::middleware::logging_middleware;
use super::predict;
use super::state::AppState;
use crate::config::CorsConfig;

/// Create the full router with application state
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let body_limit = state.upload.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .merge(account::create_account_router())
        .merge(predict::create_prediction_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Any origin when the list is empty, otherwise only the listed ones
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::domain::DiseaseClass;
    use crate::infrastructure::imaging::fixtures;

    const BOUNDARY: &str = "lesion-scan-test-boundary";

    fn app() -> Router {
        let config = AppConfig::default();
        let state = crate::create_in_memory_app_state(&config).unwrap();
        create_router(state, &config.cors)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    enum Part<'a> {
        File(&'a str, Vec<u8>),
        Text(&'a str, &'a str),
    }

    fn multipart_request(parts: Vec<Part<'_>>) -> Request<Body> {
        let mut body = Vec::new();

        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());

            match part {
                Part::File(filename, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
            }

            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn jpeg(name: &str) -> Part<'_> {
        Part::File(name, fixtures::jpeg_bytes(80, 60))
    }

    async fn signup(app: &Router, username: &str, password: &str) -> i64 {
        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/signup",
                json!({"username": username, "password": password}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        body["user_id"].as_i64().unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_classifier() {
        let app = app();
        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["classifier"], "fallback");

        let (status, body) = send(&app, get("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "database");
    }

    #[tokio::test]
    async fn test_signup_and_login() {
        let app = app();
        let user_id = signup(&app, "alice", "pw1").await;

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/login", json!({"username": "alice", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["user_id"], user_id);
        assert_eq!(body["username"], "alice");

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/login", json!({"username": "alice", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "auth_error");
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicates_and_missing_fields() {
        let app = app();
        signup(&app, "alice", "pw1").await;

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/signup", json!({"username": "alice", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username already exists");

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/signup", json!({"username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_predict_two_images_without_model() {
        let app = app();
        let (status, body) = send(&app, multipart_request(vec![jpeg("a.jpg"), jpeg("b.jpg")])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["images_processed"], 2);

        let confidence = body["confidence"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&confidence));

        let disease = body["disease"].as_str().unwrap();
        assert!(DiseaseClass::ALL.iter().any(|class| class.label() == disease));

        assert!(body["image"].as_str().unwrap().starts_with("data:"));
        assert_eq!(body["predictions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_predict_then_history() {
        let app = app();
        let user_id = signup(&app, "carol", "secret").await;
        let user_id_text = user_id.to_string();

        let (status, _) = send(
            &app,
            multipart_request(vec![jpeg("scan.jpeg"), Part::Text("user_id", &user_id_text)]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get(&format!("/history?user_id={}", user_id))).await;
        assert_eq!(status, StatusCode::OK);

        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0]["image_path"].as_str().unwrap().starts_with("data:image/jpeg"));
        assert!(history[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_predict_validation_errors() {
        let app = app();

        let (status, body) = send(
            &app,
            multipart_request(vec![jpeg("1.jpg"), jpeg("2.jpg"), jpeg("3.jpg"), jpeg("4.jpg")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "too many images");

        let (status, body) =
            send(&app, multipart_request(vec![Part::File("lesion.gif", vec![1, 2, 3])])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid file type");

        let (status, body) = send(&app, multipart_request(vec![Part::Text("user_id", "1")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "no image provided");

        let (status, body) = send(
            &app,
            multipart_request(vec![jpeg("a.jpg"), Part::Text("user_id", "abc")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_predict_over_body_limit_is_payload_too_large() {
        let mut config = AppConfig::default();
        config.upload.max_body_bytes = 2048;
        let state = crate::create_in_memory_app_state(&config).unwrap();
        let app = create_router(state, &config.cors);

        let (status, body) = send(
            &app,
            multipart_request(vec![Part::File("big.jpg", vec![0xAB; 10_000])]),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "payload_too_large_error");
        assert!(body["message"].as_str().unwrap().starts_with("Payload too large"));
    }

    #[tokio::test]
    async fn test_predict_truncated_multipart_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.jpg\"\r\n\r\nabc",
                BOUNDARY
            )))
            .unwrap();

        let (status, body) = send(&app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_predict_with_only_broken_images() {
        let app = app();
        let (status, body) = send(
            &app,
            multipart_request(vec![Part::File("broken.png", b"not an image".to_vec())]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no_valid_images_error");
    }

    #[tokio::test]
    async fn test_history_requires_user_id() {
        let app = app();
        let (status, body) = send(&app, get("/history")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "user_id is required");
    }

    #[tokio::test]
    async fn test_change_and_reset_password() {
        let app = app();
        let user_id = signup(&app, "dave", "old").await;

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/change-password",
                json!({"user_id": user_id, "current_password": "wrong", "new_password": "new"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Current password is incorrect");

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/change-password",
                json!({"user_id": user_id, "current_password": "old", "new_password": "new"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/change-password", json!({"user_id": user_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/reset-password",
                json!({"username": "nobody", "new_password": "x"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/reset-password",
                json!({"username": "dave", "new_password": "reset"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            json_request(Method::POST, "/login", json!({"username": "dave", "password": "reset"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_account_removes_history() {
        let app = app();
        let user_id = signup(&app, "erin", "pw").await;
        let user_id_text = user_id.to_string();

        send(
            &app,
            multipart_request(vec![jpeg("a.jpg"), Part::Text("user_id", &user_id_text)]),
        )
        .await;

        let uri = format!("/user/{}", user_id);

        let (status, body) =
            send(&app, json_request(Method::DELETE, &uri, json!({"password": "bad"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Incorrect password");

        let (status, _) = send(&app, json_request(Method::DELETE, &uri, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, json_request(Method::DELETE, &uri, json!({"password": "pw"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get(&format!("/history?user_id={}", user_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["history"].as_array().unwrap().is_empty());

        let (status, _) =
            send(&app, json_request(Method::DELETE, "/user/9999", json!({"password": "pw"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string(), "bad\norigin".to_string()],
        };

        let _ = cors_layer(&config);
        let _ = cors_layer(&CorsConfig::default());
    }
}
