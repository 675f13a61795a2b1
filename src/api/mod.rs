//! Ministry REST API
//!
//! HTTP API layer for the ministry portal, built with Axum.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/auth` - Log in (sets the `auth_token` cookie)
//! - `GET /api/auth` - Current user
//! - `PUT /api/auth` - Create or update an account
//! - `DELETE /api/auth` - Log out
//! - `GET /api/auth/check` - Session summary
//!
//! ## Staff
//! - `GET|POST|PUT|DELETE /api/leaders`
//! - `GET|POST|DELETE /api/team`
//! - `GET|POST|PUT|DELETE /api/supervisors`
//!
//! ## Records
//! - `GET|POST|PUT|DELETE /api/antiblat`
//! - `GET|POST|DELETE /api/points`
//! - `GET|POST|DELETE /api/warnings`
//!
//! ## Prices and tasks
//! - `GET|POST /api/prices` - Catalog and the change-request workflow
//! - `GET /api/services` - Flat service list
//! - `GET|POST /api/tasks` - Tasks and submissions
//!
//! ## Dashboard
//! - `GET /api/dashboard` - Summary for the current session
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use ministry::api::{serve, AppState};
//! use ministry::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::seeded(Config::load_default());
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route(
            "/auth",
            get(routes::auth::current_user)
                .post(routes::auth::login)
                .put(routes::auth::upsert_account)
                .delete(routes::auth::logout),
        )
        .route("/auth/check", get(routes::auth::check))
        // Antiblat routes
        .route(
            "/antiblat",
            get(routes::antiblat::list_entries)
                .post(routes::antiblat::create_entry)
                .put(routes::antiblat::update_entry)
                .delete(routes::antiblat::delete_entry),
        )
        // Staff routes
        .route(
            "/leaders",
            get(routes::leaders::get_leaders)
                .post(routes::leaders::appoint_leader)
                .put(routes::leaders::update_leader)
                .delete(routes::leaders::remove_leader),
        )
        .route(
            "/team",
            get(routes::team::get_team)
                .post(routes::team::appoint_member)
                .delete(routes::team::remove_member),
        )
        .route(
            "/supervisors",
            get(routes::supervisors::get_supervisors)
                .post(routes::supervisors::create_supervisor)
                .put(routes::supervisors::update_supervisor)
                .delete(routes::supervisors::delete_supervisor),
        )
        // Points and warnings
        .route(
            "/points",
            get(routes::points::list_points)
                .post(routes::points::award_points)
                .delete(routes::points::delete_points),
        )
        .route(
            "/warnings",
            get(routes::warnings::list_warnings)
                .post(routes::warnings::issue_warning)
                .delete(routes::warnings::delete_warning),
        )
        // Prices and services
        .route(
            "/prices",
            get(routes::prices::get_prices).post(routes::prices::price_action),
        )
        .route("/services", get(routes::services::list_services))
        // Tasks
        .route(
            "/tasks",
            get(routes::tasks::get_tasks).post(routes::tasks::task_action),
        )
        .route("/dashboard", get(routes::dashboard::get_dashboard));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.api);
    let timeout = Duration::from_secs(state.config.api.request_timeout_secs);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin when none are configured; otherwise only the listed ones,
/// with credentials so the session cookie is sent
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Ministry API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Ministry API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        build_router(AppState::seeded(Config::default()))
    }

    fn open_app() -> Router {
        let mut config = Config::default();
        config.auth.enforce_roles = false;
        build_router(AppState::seeded(config))
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Log in and return the `auth_token=...` pair to send back
    async fn login(app: &Router, username: &str, password: &str) -> String {
        let response = send(
            app,
            json_request(
                "POST",
                "/api/auth",
                json!({"username": username, "password": password}),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = send(&app, get(uri, None)).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let app = create_test_app();
        let cookie = login(&app, "admin", "admin123").await;
        assert!(cookie.starts_with("auth_token="));

        let response = send(&app, get("/api/auth", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = body_json(response).await;
        assert_eq!(user["username"], "admin");
        assert_eq!(user["role"], "main_supervisor");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = create_test_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/auth",
                json!({"username": "admin", "password": "nope"}),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Неверное имя пользователя или пароль");
    }

    #[tokio::test]
    async fn test_anonymous_mutation_rejected() {
        let app = create_test_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/antiblat",
                json!({"hospital": "ls", "nickname": "Someone", "rank": 6, "reason": "call"}),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_antiblat_create_as_leader() {
        let app = create_test_app();
        let cookie = login(&app, "leader_ls", "password123").await;

        let response = send(
            &app,
            json_request(
                "POST",
                "/api/antiblat",
                json!({"hospital": "ls", "nickname": "New_Player", "rank": "6", "reason": "trusted"}),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let entry = body_json(response).await;
        assert_eq!(entry["id"], 3);
        assert_eq!(entry["rank"], 6);

        let response = send(
            &app,
            json_request(
                "POST",
                "/api/antiblat",
                json!({"hospital": "sf", "nickname": "X", "rank": 6, "reason": "call"}),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_price_request_workflow() {
        let app = create_test_app();
        let minister = login(&app, "minister", "password123").await;
        let admin = login(&app, "admin", "admin123").await;

        let response = send(
            &app,
            json_request(
                "POST",
                "/api/prices",
                json!({"type": "request", "changes": {"1": 70000}}),
                Some(&minister),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let request_id = created[0]["id"].as_u64().unwrap();
        assert_eq!(created[0]["status"], "pending");
        assert_eq!(created[0]["oldPrice"], 60000);

        let approve = json!({"type": "approve", "requestId": request_id});
        let response = send(
            &app,
            json_request("POST", "/api/prices", approve.clone(), Some(&minister)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(
            &app,
            json_request("POST", "/api/prices", approve.clone(), Some(&admin)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let reviewed = body_json(response).await;
        assert_eq!(reviewed["status"], "approved");
        assert_eq!(reviewed["approvedBy"], "admin");

        let response = send(&app, get("/api/services?category=basic", None)).await;
        let services = body_json(response).await;
        let treatment = services
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["id"] == 1)
            .unwrap();
        assert_eq!(treatment["price"], 70000);

        let response = send(
            &app,
            json_request("POST", "/api/prices", approve, Some(&admin)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_price_action() {
        let app = open_app();
        let response = send(
            &app,
            json_request("POST", "/api/prices", json!({"type": "bogus"}), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Неверный тип запроса");
    }

    #[tokio::test]
    async fn test_points_total() {
        let app = create_test_app();
        let response = send(&app, get("/api/points?userId=2", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalPoints"], 25);
        assert_eq!(body["points"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_mode_uses_body_audit_fields() {
        let app = open_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/warnings",
                json!({
                    "userId": 2,
                    "userRole": "leader",
                    "userHospital": "ls",
                    "userName": "Иван Петров",
                    "reason": "Опоздание",
                    "issuedBy": "minister",
                    "issuedById": 4,
                    "issuedByName": "Дмитрий Соколов"
                }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let warning = body_json(response).await;
        assert_eq!(warning["issuedByName"], "Дмитрий Соколов");
    }

    #[tokio::test]
    async fn test_dashboard_requires_session() {
        let app = create_test_app();
        let response = send(&app, get("/api/dashboard", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let cookie = login(&app, "admin", "admin123").await;
        let response = send(&app, get("/api/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let dashboard = body_json(response).await;
        assert_eq!(dashboard["panels"], json!(["admin"]));
        assert_eq!(dashboard["pending"]["submissions"], 1);
    }

    #[tokio::test]
    async fn test_team_rejects_unknown_role() {
        let app = open_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/team",
                json!({"hospital": "ls", "role": "janitor", "name": "X", "login": "x", "password": "y"}),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Неверная роль");
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let app = create_test_app();
        let response = send(&app, get("/api/tasks?id=99", None)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Задание не найдено");
    }

    #[tokio::test]
    async fn test_create_supervisor_then_duplicate_login() {
        let app = create_test_app();
        let cookie = login(&app, "admin", "admin123").await;
        let body = json!({
            "nickname": "Supervisor_New",
            "type": "supervisor",
            "login": "supervisor_new",
            "password": "secret",
            "assignedHospital": "ls"
        });

        let request = json_request("POST", "/api/supervisors", body.clone(), Some(&cookie));
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["login"], "supervisor_new");
        assert!(created.get("passwordHash").is_none());

        // the new login can sign in
        login(&app, "supervisor_new", "secret").await;

        let request = json_request("POST", "/api/supervisors", body, Some(&cookie));
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert_eq!(error["error"], "Пользователь с таким логином уже существует");
    }

    #[tokio::test]
    async fn test_oversized_point_awards_rejected() {
        let app = open_app();
        for amount in [json!("9223372036854775807"), json!(9223372036854775807i64), json!("1e30")] {
            let response = send(
                &app,
                json_request(
                    "POST",
                    "/api/points",
                    json!({
                        "userId": 2,
                        "userRole": "leader",
                        "userHospital": "ls",
                        "userName": "Иван Петров",
                        "amount": amount,
                        "reason": "Бонус"
                    }),
                    None,
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let body = body_json(send(&app, get("/api/points?userId=2", None)).await).await;
        assert_eq!(body["totalPoints"], 25);
    }

    #[tokio::test]
    async fn test_price_out_of_range_rejected() {
        let app = open_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/prices",
                json!({"type": "update", "changes": {"1": "1e30"}}),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let services = body_json(send(&app, get("/api/services?category=basic", None)).await).await;
        assert_eq!(services[0]["id"], 1);
        assert_eq!(services[0]["price"], 60000);
    }

    #[tokio::test]
    async fn test_update_leader_in_wrong_hospital_not_found() {
        let app = create_test_app();
        let cookie = login(&app, "admin", "admin123").await;

        // id 2 leads LV, so it is not the LS leader
        let response = send(
            &app,
            json_request(
                "PUT",
                "/api/leaders",
                json!({
                    "id": 2,
                    "hospital": "ls",
                    "nickname": "Мария Козлова",
                    "login": "leader_lv"
                }),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = body_json(response).await;
        assert_eq!(error["error"], "Лидер не найден");
    }
}
