use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::models::city::City;
use crate::models::driver::Driver;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", get(list_drivers))
        .route("/cities", get(list_cities))
}

#[derive(Serialize)]
pub struct DriversResponse {
    pub drivers: Vec<Driver>,
    pub warning: Option<String>,
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Result<Json<DriversResponse>, AppError> {
    let drivers = state.store.list_available_drivers()?;

    let warning = if drivers.is_empty() {
        warn!("driver list requested but no drivers are available");
        Some("no drivers are available right now".to_string())
    } else {
        None
    };

    Ok(Json(DriversResponse { drivers, warning }))
}

async fn list_cities() -> Json<Vec<City>> {
    Json(City::ALL.to_vec())
}
