// ============================================================================
// CRM API - Router
// File: crates/crm-api/src/routes.rs
// ============================================================================

use std::time::Duration;

use axum::{
    http::{HeaderValue, StatusCode},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use crate::handlers::{admin, auth, contacts, customers, dashboard, exports, gifts, health, users};
use crate::state::AppState;
use crm_shared::constants::REQUEST_TIMEOUT_SECS;

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/password", post(auth::set_password));

    // Every handler here takes `CurrentUser`
    let protected_routes = Router::new()
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .route("/api/v1/dashboard/executive", get(dashboard::executive))
        .route("/api/v1/dashboard/manager", get(dashboard::manager))
        .route("/api/v1/users/{id}/role", put(users::change_role))
        .route("/api/v1/customers", get(customers::list).post(customers::create))
        .route("/api/v1/customers/{id}", get(customers::get).put(customers::update))
        .route("/api/v1/contacts", get(contacts::list).post(contacts::create))
        .route("/api/v1/contacts/{id}", put(contacts::update))
        .route("/api/v1/export/contacts.csv", get(exports::contacts_csv))
        .route("/api/v1/export/customers.csv", get(exports::customers_csv))
        .route("/api/v1/gifts", get(gifts::list_gifts).post(gifts::create_gift))
        .route("/api/v1/gift-seasons", get(gifts::list_seasons).post(gifts::create_season))
        .route("/api/v1/gift-seasons/{id}/plan", get(gifts::open_plan))
        .route("/api/v1/gift-assignments/{id}", put(gifts::update_assignment))
        .route("/api/v1/admin/welcome-emails", post(admin::send_welcome_emails));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(cors_layer(cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
