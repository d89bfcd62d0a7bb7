use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedAdmin, state::AppState};

pub mod applications;
pub mod auth;
pub mod health;
pub mod intake;
pub mod onboarding;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    // Driver-facing routes are token-scoped: no session, the onboarding
    // token in the query string is the whole authorization.
    let onboarding_routes = Router::new()
        .route("/profile", get(onboarding::get_profile))
        .route("/vehicle", put(onboarding::save_vehicle))
        .route("/documents", post(onboarding::upload_document))
        .route("/submit", post(onboarding::submit));

    let admin_state = state.clone();
    let admin_routes = Router::new()
        .route("/applications", get(applications::list_applications))
        .route(
            "/applications/:id",
            get(applications::get_application).patch(applications::update_application),
        )
        .route(
            "/applications/:id/onboarding",
            get(applications::get_onboarding_profile),
        )
        .route(
            "/applications/:id/send-link",
            post(applications::send_onboarding_link),
        )
        .route(
            "/applications/:id/archive",
            post(applications::archive_application),
        )
        .route(
            "/documents/:doc_id/review",
            post(applications::review_document),
        )
        .layer(middleware::from_extractor_with_state::<AuthenticatedAdmin, _>(admin_state));

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api/onboarding", onboarding_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/apply/driver", post(intake::apply_driver))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        // 6MB documents arrive base64-encoded inside a JSON envelope.
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
}
