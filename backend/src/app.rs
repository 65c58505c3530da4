//! Router assembly. Kept separate from `main` so integration tests can
//! drive the exact service the binary runs.

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers,
    middleware::{self as app_middleware, rate_limit::create_login_rate_limiter},
    state::AppState,
};

pub fn build_app(state: AppState) -> Router {
    // Credential-accepting routes sit behind the per-IP throttle. A burst
    // size of zero disables the layer (used by tests).
    let mut login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/qr-login", post(handlers::auth::qr_login))
        .route("/api/admin/auth/login", post(handlers::admin::auth::login));
    if state.config.rate_limit_burst > 0 {
        login_routes = login_routes.route_layer(create_login_rate_limiter(&state.config));
    }

    let public_routes = Router::new()
        .route(
            "/api/auth/login-target/{member_id}",
            get(handlers::auth::login_target),
        )
        .route("/api/auth/qr/{token}", get(handlers::auth::qr_resolve))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/admin/auth/logout", post(handlers::admin::auth::logout));

    let member_routes = Router::new()
        .route("/api/members/me", get(handlers::members::me))
        .route(
            "/api/auth/change-password",
            put(handlers::auth::change_password),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::member_auth,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/stats", get(handlers::admin::members::stats))
        .route(
            "/api/admin/members",
            get(handlers::admin::members::list_members)
                .post(handlers::admin::members::create_member),
        )
        .route(
            "/api/admin/members/bulk-update",
            post(handlers::admin::members::bulk_update),
        )
        .route(
            "/api/admin/members/reset-passwords",
            post(handlers::admin::members::bulk_reset_passwords),
        )
        .route(
            "/api/admin/members/import",
            post(handlers::admin::members::import_members),
        )
        .route(
            "/api/admin/members/qr-codes",
            get(handlers::admin::members::qr_codes),
        )
        .route(
            "/api/admin/members/check-images",
            post(handlers::admin::members::check_images),
        )
        .route(
            "/api/admin/members/{member_id}",
            get(handlers::admin::members::view_member)
                .put(handlers::admin::members::update_member)
                .delete(handlers::admin::members::delete_member),
        )
        .route(
            "/api/admin/members/{member_id}/reset-password",
            post(handlers::admin::members::reset_password),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::admin_auth,
        ));

    Router::new()
        .merge(login_routes)
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(
                    app_middleware::request_id::request_id,
                ))
                .layer(axum_middleware::from_fn(
                    app_middleware::security_headers::security_headers,
                ))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state)
}
