//! Route definitions for the TickWatch platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/farms", farm_routes())
        .nest("/climate", climate_routes())
}

/// Farm routes; every farm-scoped resource takes the farm id from the path
fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route("/nearby", get(handlers::nearby_farms))
        .route("/default", get(handlers::get_default_farm))
        .route("/:farm_id", get(handlers::get_farm))
        // Risk
        .route("/:farm_id/risk", get(handlers::get_risk))
        .route("/:farm_id/risk/recompute", post(handlers::recompute_risk))
        .route(
            "/:farm_id/risk/history-selection",
            put(handlers::apply_history_selection),
        )
        .route("/:farm_id/risk/import", post(handlers::import_risk))
        .route("/:farm_id/risk/climate", get(handlers::climate_adjusted_risk))
        // Animals
        .route(
            "/:farm_id/animals",
            get(handlers::list_animals).post(handlers::create_animal),
        )
        .route("/:farm_id/animals/:animal_id", get(handlers::get_animal))
        .route(
            "/:farm_id/animals/:animal_id/photos",
            get(handlers::list_photos).post(handlers::add_photo),
        )
        .route(
            "/:farm_id/animals/:animal_id/analyses",
            get(handlers::list_analyses).post(handlers::analyze_animal),
        )
        // Contamination history
        .route(
            "/:farm_id/history",
            get(handlers::list_days).put(handlers::replace_days),
        )
        .route("/:farm_id/history/count", get(handlers::count_days))
        .route("/:farm_id/history/:day/toggle", post(handlers::toggle_day))
}

/// Climate routes
fn climate_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::current_climate))
        .route("/assess", post(handlers::assess_climate))
}
