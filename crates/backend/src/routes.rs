use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::shared::app_state::AppState;
use crate::{handlers, system};

/// All application routes
pub fn configure_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Bundles
        .route("/api/a001/bundles", get(handlers::a001_bundle::list))
        .route(
            "/api/a001/bundles/:id",
            get(handlers::a001_bundle::get_by_id).delete(handlers::a001_bundle::delete),
        )
        // A003 Line assignments
        .route(
            "/api/a003/line-assignments",
            post(handlers::a003_line_assignment::create),
        )
        .route(
            "/api/a003/line-assignments/batch",
            post(handlers::a003_line_assignment::create_batch),
        )
        .route(
            "/api/a003/line-assignments/:id",
            get(handlers::a003_line_assignment::get_by_id)
                .delete(handlers::a003_line_assignment::delete),
        )
        .route(
            "/api/a003/line-assignments/:id/stations/:station/complete",
            post(handlers::a003_line_assignment::complete_station),
        )
        .route(
            "/api/a003/line-assignments/:id/stations/:station/undo",
            post(handlers::a003_line_assignment::undo_station),
        )
        // U501 Markup upload
        .route("/api/u501/upload", post(handlers::u501_upload_markup::upload))
        .route(
            "/api/u501/upload-json",
            post(handlers::u501_upload_markup::upload_json),
        )
        // U502 Line manifest
        .route(
            "/api/u502/manifest",
            post(handlers::u502_import_manifest::import),
        )
        // D400 Job drill-down
        .route("/api/d400/jobs", get(handlers::d400_job_drilldown::list_jobs))
        .route(
            "/api/d400/jobs/:job_number",
            get(handlers::d400_job_drilldown::job_detail),
        )
        .route(
            "/api/d400/bundles/:id/types/:member_type",
            get(handlers::d400_job_drilldown::members_of_type),
        )
        // D401 Station view
        .route(
            "/api/d401/station-view",
            get(handlers::d401_station_view::station_view),
        )
        .route(
            "/api/d401/station-view/dates",
            get(handlers::d401_station_view::dates),
        )
        .route(
            "/api/d401/station-view/progress",
            get(handlers::d401_station_view::progress),
        )
}

/// Router with state, upload limit, request logging and CORS applied
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_mb.saturating_mul(1024 * 1024);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    configure_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(system::middleware::request_logger::request_logger))
        .layer(cors)
        .with_state(state)
}
