//! Axum router construction and route mapping.
//!
//! The [`app`] function wires every endpoint to its handler and
//! returns a ready-to-serve [`axum::Router`].  Authentication follows
//! a deny-by-default rule: the gate middleware lets the public routes
//! through and demands a valid bearer token for everything else.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::auth;
use crate::errors::{generate_request_id, ApiError};
use crate::handlers;
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::AppState;

// -- OpenAPI specification ----------------------------------------------------

/// OpenAPI documentation for the Storefront admin API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Admin API",
        version = "0.1.0",
        description = "E-commerce administrative backend"
    ),
    paths(
        health_check,
        // Admin
        crate::handlers::admin::login,
        crate::handlers::admin::update_username,
        crate::handlers::admin::update_password,
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        // Vacancies
        crate::handlers::vacancies::list_vacancies,
        crate::handlers::vacancies::create_vacancy,
        crate::handlers::vacancies::update_vacancy,
        crate::handlers::vacancies::delete_vacancy,
        // Contact
        crate::handlers::contact::submit_message,
        crate::handlers::contact::list_messages,
        // AI
        crate::handlers::ai::generate_description,
        crate::handlers::ai::chat,
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Admin", description = "Authentication and profile management"),
        (name = "Products", description = "Product catalogue CRUD"),
        (name = "Vacancies", description = "Job vacancy CRUD"),
        (name = "Contact", description = "Contact-form messages"),
        (name = "AI", description = "Generative-AI assisted endpoints"),
    )
)]
struct ApiDoc;

/// Build the axum [`Router`] with all API routes.
///
/// The returned router is ready to be passed to `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        // Service banner, health, metrics, OpenAPI document.
        .route("/", get(service_banner))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_spec))
        // Admin authentication and profile.
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/profile", put(handlers::admin::update_username))
        .route(
            "/api/admin/profile/password",
            put(handlers::admin::update_password),
        )
        // Products (public reads, admin mutations).
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Vacancies (public active listing, admin mutations).
        .route(
            "/api/vacancies",
            get(handlers::vacancies::list_vacancies).post(handlers::vacancies::create_vacancy),
        )
        .route(
            "/api/vacancies/:id",
            put(handlers::vacancies::update_vacancy).delete(handlers::vacancies::delete_vacancy),
        )
        // Contact form (public submission, admin listing).
        .route("/api/contact", post(handlers::contact::submit_message))
        .route("/api/contact/messages", get(handlers::contact::list_messages))
        // AI-assisted endpoints.
        .route(
            "/api/admin/ai/generate-description",
            post(handlers::ai::generate_description),
        )
        .route("/api/chat", post(handlers::ai::chat))
        // Application state shared across all handlers.
        .with_state(state.clone())
        // Layer ordering: inner layers run first, outer layers wrap them.
        // auth_middleware is innermost (closest to handlers, after routing).
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        // common_headers_middleware adds standard response headers.
        .layer(middleware::from_fn(common_headers_middleware))
        // metrics_middleware is outer (captures full request lifecycle).
        .layer(middleware::from_fn(metrics_middleware))
        // The frontend is served from another origin.
        .layer(CorsLayer::permissive())
        // Multipart payloads: 4 images at 5 MB each, plus headroom.
        .layer(DefaultBodyLimit::max(max_body_size))
}

// -- Common headers middleware -----------------------------------------------

/// Tower middleware that adds common response headers to every response:
/// - `x-request-id`: 16-character uppercase hex string
/// - `Date`: RFC 7231 formatted timestamp
/// - `Server`: `Storefront`
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if !headers.contains_key("x-request-id") {
        let request_id = generate_request_id();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert("x-request-id", value);
        }
    }

    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    if let Ok(value) = HeaderValue::from_str(&date) {
        headers.insert("date", value);
    }
    headers.insert("server", HeaderValue::from_static("Storefront"));

    response
}

// -- Auth middleware ---------------------------------------------------------

/// Whether a request may pass the gate without a token.
///
/// Public surface: the banner/infrastructure endpoints, login, product
/// and vacancy reads, contact submission, and the chatbot.  The gate
/// runs before routing resolves, so a path outside the route table is
/// denied with 401 here rather than reaching the router's 404.
fn is_public(method: &Method, path: &str) -> bool {
    match *method {
        Method::GET => {
            matches!(path, "/" | "/health" | "/metrics" | "/openapi.json")
                || path == "/api/products"
                || is_id_route(path, "/api/products/")
                || path == "/api/vacancies"
        }
        Method::POST => matches!(path, "/api/admin/login" | "/api/contact" | "/api/chat"),
        // CORS preflight never carries credentials.
        Method::OPTIONS => true,
        _ => false,
    }
}

/// True when `path` is `prefix` followed by a single non-empty segment.
fn is_id_route(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Bearer-token authentication middleware.
///
/// Runs before handlers.  Public routes pass straight through; every
/// other request must carry `Authorization: Bearer <token>` with a
/// valid signature and expiry.  On success the decoded
/// [`auth::AdminIdentity`] is inserted into the request extensions for
/// the downstream handler.  All failures collapse to a generic 401.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(auth::extract_bearer)
        .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

    let identity = auth::verify_token(token, &state.config.auth.jwt_secret)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

// -- Infrastructure handlers --------------------------------------------------

/// `GET /` -- Service banner.
async fn service_banner() -> impl IntoResponse {
    Json(json!({ "message": "E-Commerce Backend is Running" }))
}

/// `GET /health` -- Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "HealthCheck",
    responses((status = 200, description = "Service is up"))
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `GET /openapi.json` -- Serve the OpenAPI document.
async fn openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ScriptedModel, TextModel};
    use crate::config::Config;
    use crate::media::{MediaStorage, MemoryMediaBackend};
    use crate::store::store::now_rfc3339;
    use crate::store::{AdminRecord, DocumentStore, MemoryStore};
    use axum::body::Body;
    use serde_json::Value;
    use tower::ServiceExt;

    const TEST_SECRET: &str = "test-secret";

    struct TestApp {
        app: Router,
        store: Arc<MemoryStore>,
        media: Arc<MemoryMediaBackend>,
        model: Arc<ScriptedModel>,
        admin_id: String,
    }

    /// Build a full router over in-memory backends with one seeded
    /// admin (`admin` / `password123`).
    async fn test_app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(MemoryMediaBackend::new());
        let model = Arc::new(ScriptedModel::new());

        let admin_id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();
        store
            .seed_admin(AdminRecord {
                id: admin_id.clone(),
                username: "admin".to_string(),
                password_hash: auth::hash_password("password123").unwrap(),
                created_at: now.clone(),
                updated_at: now,
            })
            .await
            .unwrap();

        let mut config = Config::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();

        let state = Arc::new(AppState {
            config,
            store: store.clone() as Arc<dyn DocumentStore>,
            media: media.clone() as Arc<dyn MediaStorage>,
            model: model.clone() as Arc<dyn TextModel>,
        });

        TestApp {
            app: app(state),
            store,
            media,
            model,
            admin_id,
        }
    }

    fn bearer(admin_id: &str) -> String {
        let token = auth::issue_token(admin_id, "admin", TEST_SECRET, 7).unwrap();
        format!("Bearer {token}")
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    /// Assemble a `multipart/form-data` body from text fields and
    /// `images` file parts.
    fn multipart_body(
        text_fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in text_fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        for (file_name, content_type, data) in files {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Vec<u8>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri).header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    /// Create a product through the API, returning its id.
    async fn create_test_product(t: &TestApp, name: &str) -> String {
        let body = multipart_body(
            &[
                ("name", name),
                ("description", "A fine product"),
                ("price", "2500"),
                ("stock", "8"),
                ("category", "Electronics"),
            ],
            &[("photo.jpg", "image/jpeg", b"jpeg-bytes")],
        );
        let (status, json) = send(
            &t.app,
            multipart_request("POST", "/api/products", Some(&bearer(&t.admin_id)), body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["product"]["id"].as_str().unwrap().to_string()
    }

    // -- Infrastructure ------------------------------------------------------

    #[tokio::test]
    async fn test_banner_and_health_are_public() {
        let t = test_app().await;

        let (status, json) = send(&t.app, json_request("GET", "/", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "E-Commerce Backend is Running");

        let (status, json) = send(&t.app, json_request("GET", "/health", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_openapi_document_describes_request_bodies() {
        let t = test_app().await;
        let (status, json) =
            send(&t.app, json_request("GET", "/openapi.json", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["info"]["title"], "Storefront Admin API");

        // Every Json-consuming handler advertises its request schema.
        let login_body = &json["paths"]["/api/admin/login"]["post"]["requestBody"];
        assert!(!login_body.is_null());
        let chat_body = &json["paths"]["/api/chat"]["post"]["requestBody"];
        assert!(!chat_body.is_null());
    }

    #[tokio::test]
    async fn test_unknown_path_is_denied_before_routing() {
        let t = test_app().await;
        let (status, json) = send(
            &t.app,
            json_request("GET", "/api/nonexistent", None, Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Access denied. No token provided.");
    }

    // -- Login ---------------------------------------------------------------

    #[tokio::test]
    async fn test_login_issues_decodable_token() {
        let t = test_app().await;
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/login",
                None,
                serde_json::json!({ "username": "admin", "password": "password123" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["admin"]["username"], "admin");

        let token = json["token"].as_str().unwrap();
        let identity = auth::verify_token(token, TEST_SECRET).unwrap();
        assert_eq!(identity.id, t.admin_id);
        assert_eq!(identity.username, "admin");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let t = test_app().await;

        for payload in [
            serde_json::json!({ "username": "admin", "password": "wrong" }),
            serde_json::json!({ "username": "nobody", "password": "password123" }),
        ] {
            let (status, json) =
                send(&t.app, json_request("POST", "/api/admin/login", None, payload)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["message"], "Invalid credentials");
            assert!(json.get("token").is_none());
        }
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let t = test_app().await;
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/login",
                None,
                serde_json::json!({ "username": "admin" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Username and password are required");
    }

    // -- Request gate --------------------------------------------------------

    #[tokio::test]
    async fn test_gate_rejects_missing_and_invalid_tokens() {
        let t = test_app().await;

        // No token at all.
        let (status, json) = send(
            &t.app,
            json_request("GET", "/api/contact/messages", None, Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Access denied. No token provided.");

        // Garbage token.
        let (status, json) = send(
            &t.app,
            json_request(
                "GET",
                "/api/contact/messages",
                Some("Bearer not.a.jwt"),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid or expired token.");

        // Well-formed token signed with the wrong secret.
        let forged = auth::issue_token(&t.admin_id, "admin", "wrong-secret", 7).unwrap();
        let (status, _) = send(
            &t.app,
            json_request(
                "GET",
                "/api/contact/messages",
                Some(&format!("Bearer {forged}")),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gate_rejects_mutations_without_token() {
        let t = test_app().await;
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/vacancies",
                None,
                serde_json::json!({ "title": "T", "description": "D" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // -- Profile -------------------------------------------------------------

    #[tokio::test]
    async fn test_update_username_requires_current_password() {
        let t = test_app().await;
        let auth_header = bearer(&t.admin_id);

        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/admin/profile",
                Some(&auth_header),
                serde_json::json!({ "username": "root", "currentPassword": "wrong" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Current password is incorrect");

        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/admin/profile",
                Some(&auth_header),
                serde_json::json!({ "username": "root", "currentPassword": "password123" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["username"], "root");

        let renamed = t.store.get_admin(&t.admin_id).await.unwrap().unwrap();
        assert_eq!(renamed.username, "root");
    }

    #[tokio::test]
    async fn test_update_username_uniqueness() {
        let t = test_app().await;
        let now = now_rfc3339();
        t.store
            .seed_admin(AdminRecord {
                id: uuid::Uuid::new_v4().to_string(),
                username: "other".to_string(),
                password_hash: auth::hash_password("irrelevant").unwrap(),
                created_at: now.clone(),
                updated_at: now,
            })
            .await
            .unwrap();

        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/admin/profile",
                Some(&bearer(&t.admin_id)),
                serde_json::json!({ "username": "other", "currentPassword": "password123" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Username already taken");
    }

    #[tokio::test]
    async fn test_update_password_flow() {
        let t = test_app().await;
        let auth_header = bearer(&t.admin_id);

        // Too short.
        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/admin/profile/password",
                Some(&auth_header),
                serde_json::json!({ "currentPassword": "password123", "newPassword": "abc" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "New password must be at least 6 characters");

        // Success.
        let (status, _) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/admin/profile/password",
                Some(&auth_header),
                serde_json::json!({ "currentPassword": "password123", "newPassword": "hunter22" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // The new password now logs in.
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/login",
                None,
                serde_json::json!({ "username": "admin", "password": "hunter22" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // -- Products ------------------------------------------------------------

    #[tokio::test]
    async fn test_create_product_requires_an_image() {
        let t = test_app().await;
        let body = multipart_body(
            &[
                ("name", "Kettle"),
                ("description", "Boils water"),
                ("price", "2500"),
                ("stock", "8"),
                ("category", "Electronics"),
            ],
            &[],
        );
        let (status, json) = send(
            &t.app,
            multipart_request("POST", "/api/products", Some(&bearer(&t.admin_id)), body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "At least one image is required");
    }

    #[tokio::test]
    async fn test_create_product_success() {
        let t = test_app().await;
        let id = create_test_product(&t, "Kettle").await;

        let stored = t.store.get_product(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Kettle");
        assert_eq!(stored.price, 2500.0);
        assert_eq!(stored.stock, 8);
        assert_eq!(stored.images.len(), 1);
        assert!(stored.images[0].starts_with("https://media.local/products/"));
        assert_eq!(t.media.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_create_product_rejects_non_image_upload() {
        let t = test_app().await;
        let body = multipart_body(
            &[
                ("name", "Kettle"),
                ("description", "Boils water"),
                ("price", "2500"),
                ("stock", "8"),
                ("category", "Electronics"),
            ],
            &[("notes.txt", "text/plain", b"not an image")],
        );
        let (status, json) = send(
            &t.app,
            multipart_request("POST", "/api/products", Some(&bearer(&t.admin_id)), body),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["message"], "Only image files are allowed");
        assert_eq!(t.media.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_create_product_rejects_oversize_image() {
        let t = test_app().await;
        let oversize = vec![0u8; crate::media::MAX_IMAGE_BYTES + 1];
        let body = multipart_body(
            &[
                ("name", "Kettle"),
                ("description", "Boils water"),
                ("price", "2500"),
                ("stock", "8"),
                ("category", "Electronics"),
            ],
            &[("huge.jpg", "image/jpeg", &oversize)],
        );
        let (status, json) = send(
            &t.app,
            multipart_request("POST", "/api/products", Some(&bearer(&t.admin_id)), body),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["message"], "Each image must be 5MB or smaller");
        assert_eq!(t.media.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_create_product_rejects_five_images() {
        let t = test_app().await;
        let files: Vec<(&str, &str, &[u8])> = vec![
            ("a.jpg", "image/jpeg", b"a"),
            ("b.jpg", "image/jpeg", b"b"),
            ("c.jpg", "image/jpeg", b"c"),
            ("d.jpg", "image/jpeg", b"d"),
            ("e.jpg", "image/jpeg", b"e"),
        ];
        let body = multipart_body(
            &[
                ("name", "Kettle"),
                ("description", "Boils water"),
                ("price", "2500"),
                ("stock", "8"),
                ("category", "Electronics"),
            ],
            &files,
        );
        let (status, json) = send(
            &t.app,
            multipart_request("POST", "/api/products", Some(&bearer(&t.admin_id)), body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "At most 4 images are allowed");
    }

    #[tokio::test]
    async fn test_partial_update_only_stock() {
        let t = test_app().await;
        let id = create_test_product(&t, "Kettle").await;
        let before = t.store.get_product(&id).await.unwrap().unwrap();

        let body = multipart_body(&[("stock", "0")], &[]);
        let (status, json) = send(
            &t.app,
            multipart_request(
                "PUT",
                &format!("/api/products/{id}"),
                Some(&bearer(&t.admin_id)),
                body,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["product"]["stock"], 0);

        let after = t.store.get_product(&id).await.unwrap().unwrap();
        assert_eq!(after.stock, 0);
        assert_eq!(after.name, before.name);
        assert_eq!(after.description, before.description);
        assert_eq!(after.category, before.category);
        assert_eq!(after.price, before.price);
        assert_eq!(after.images, before.images);
    }

    #[tokio::test]
    async fn test_update_replaces_image_set() {
        let t = test_app().await;
        let id = create_test_product(&t, "Kettle").await;
        let before = t.store.get_product(&id).await.unwrap().unwrap();

        let body = multipart_body(
            &[],
            &[
                ("new1.png", "image/png", b"png-1"),
                ("new2.png", "image/png", b"png-2"),
            ],
        );
        let (status, _) = send(
            &t.app,
            multipart_request(
                "PUT",
                &format!("/api/products/{id}"),
                Some(&bearer(&t.admin_id)),
                body,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let after = t.store.get_product(&id).await.unwrap().unwrap();
        assert_eq!(after.images.len(), 2);
        assert!(after.images.iter().all(|url| !before.images.contains(url)));
    }

    #[tokio::test]
    async fn test_product_id_routes_reject_malformed_ids() {
        let t = test_app().await;
        let auth_header = bearer(&t.admin_id);

        let (status, json) = send(
            &t.app,
            json_request("GET", "/api/products/not-a-uuid", None, Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid identifier format");

        let (status, _) = send(
            &t.app,
            multipart_request(
                "PUT",
                "/api/products/not-a-uuid",
                Some(&auth_header),
                multipart_body(&[("stock", "1")], &[]),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &t.app,
            json_request("DELETE", "/api/products/not-a-uuid", Some(&auth_header), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_vacancy_id_routes_reject_malformed_ids() {
        let t = test_app().await;
        let auth_header = bearer(&t.admin_id);

        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                "/api/vacancies/not-a-uuid",
                Some(&auth_header),
                serde_json::json!({ "title": "T" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid identifier format");

        let (status, json) = send(
            &t.app,
            json_request(
                "DELETE",
                "/api/vacancies/not-a-uuid",
                Some(&auth_header),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid identifier format");
    }

    #[tokio::test]
    async fn test_get_missing_product_is_404() {
        let t = test_app().await;
        let ghost = uuid::Uuid::new_v4();
        let (status, json) = send(
            &t.app,
            json_request("GET", &format!("/api/products/{ghost}"), None, Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_product_listing_is_public_and_newest_first() {
        let t = test_app().await;
        let first = create_test_product(&t, "Older").await;
        let second = create_test_product(&t, "Newer").await;

        let (status, json) =
            send(&t.app, json_request("GET", "/api/products", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        let listed = json.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["id"], second.as_str());
        assert_eq!(listed[1]["id"], first.as_str());
    }

    // -- Vacancies -----------------------------------------------------------

    #[tokio::test]
    async fn test_vacancy_lifecycle() {
        let t = test_app().await;
        let auth_header = bearer(&t.admin_id);

        // Create.
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/vacancies",
                Some(&auth_header),
                serde_json::json!({ "title": "Cashier", "description": "Front desk" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["vacancy"]["is_active"], true);
        let id = json["vacancy"]["id"].as_str().unwrap().to_string();

        // Deactivate with an explicit false.
        let (status, json) = send(
            &t.app,
            json_request(
                "PUT",
                &format!("/api/vacancies/{id}"),
                Some(&auth_header),
                serde_json::json!({ "isActive": false }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["vacancy"]["is_active"], false);
        assert_eq!(json["vacancy"]["title"], "Cashier");

        // Public listing hides it now.
        let (status, json) =
            send(&t.app, json_request("GET", "/api/vacancies", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 0);

        // Delete, then delete again.
        let (status, _) = send(
            &t.app,
            json_request("DELETE", &format!("/api/vacancies/{id}"), Some(&auth_header), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            &t.app,
            json_request("DELETE", &format!("/api/vacancies/{id}"), Some(&auth_header), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Vacancy not found");
    }

    #[tokio::test]
    async fn test_delete_unknown_vacancy_is_404() {
        let t = test_app().await;
        let ghost = uuid::Uuid::new_v4();
        let (status, _) = send(
            &t.app,
            json_request(
                "DELETE",
                &format!("/api/vacancies/{ghost}"),
                Some(&bearer(&t.admin_id)),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_vacancy_missing_fields() {
        let t = test_app().await;
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/vacancies",
                Some(&bearer(&t.admin_id)),
                serde_json::json!({ "title": "Cashier" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Title and description are required");
    }

    // -- Contact -------------------------------------------------------------

    #[tokio::test]
    async fn test_contact_submission_flow() {
        let t = test_app().await;

        // Invalid email.
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/contact",
                None,
                serde_json::json!({ "name": "A", "email": "bad-email", "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid email format");

        // Two valid submissions.
        for (email, message) in [("a@example.com", "first"), ("b@example.com", "second")] {
            let (status, _) = send(
                &t.app,
                json_request(
                    "POST",
                    "/api/contact",
                    None,
                    serde_json::json!({ "name": "A", "email": email, "message": message }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        // Admin listing, newest first.
        let (status, json) = send(
            &t.app,
            json_request(
                "GET",
                "/api/contact/messages",
                Some(&bearer(&t.admin_id)),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let listed = json.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["message"], "second");
        assert_eq!(listed[1]["message"], "first");
    }

    // -- AI ------------------------------------------------------------------

    #[tokio::test]
    async fn test_generate_description() {
        let t = test_app().await;
        t.model.push_response("A fine kettle for every kitchen.");

        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/ai/generate-description",
                Some(&bearer(&t.admin_id)),
                serde_json::json!({ "name": "Kettle", "category": "Electronics" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["description"], "A fine kettle for every kitchen.");
        assert!(t.model.prompts()[0].contains("Kettle"));
    }

    #[tokio::test]
    async fn test_generate_description_requires_auth() {
        let t = test_app().await;
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/ai/generate-description",
                None,
                serde_json::json!({ "name": "Kettle", "category": "Electronics" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_generate_description_model_failure_is_503() {
        let t = test_app().await;
        // No scripted response queued: the model call fails.
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/admin/ai/generate-description",
                Some(&bearer(&t.admin_id)),
                serde_json::json!({ "name": "Kettle", "category": "Electronics" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["message"], "Failed to generate description");
    }

    #[tokio::test]
    async fn test_chat_is_public_and_fails_with_apology() {
        let t = test_app().await;
        t.model.push_response("We are open until 6pm.");

        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/chat",
                None,
                serde_json::json!({ "message": "when do you close?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["reply"], "We are open until 6pm.");

        // Model exhausted: the next call returns the static apology.
        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/chat",
                None,
                serde_json::json!({ "message": "hello again" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["message"], "Sorry, I'm having trouble right now.");
    }

    #[tokio::test]
    async fn test_chat_product_enquiry_lists_catalogue_matches() {
        let t = test_app().await;
        create_test_product(&t, "USB Cable").await;
        t.model.push_response("USB Cable");

        let (status, json) = send(
            &t.app,
            json_request(
                "POST",
                "/api/chat",
                None,
                serde_json::json!({ "message": "do you have usb cable in stock?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply = json["reply"].as_str().unwrap();
        assert!(reply.contains("USB Cable"));
        assert!(reply.contains("Stock: 8 units"));
    }
}
