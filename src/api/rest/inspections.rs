use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::matching::{self, MatchOutcome, Route};
use crate::error::AppError;
use crate::inspection::inspect;
use crate::models::city::City;
use crate::models::driver::Driver;
use crate::models::inspection::{Inspection, Label};
use crate::models::order::Order;
use crate::models::quote::Quote;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/inspections",
            post(create_inspection).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/quotes/:id", get(get_quote))
        .route("/quotes/:id/confirm", post(confirm_quote))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    NoDrivers,
}

#[derive(Serialize)]
pub struct InspectionResponse {
    pub inspection: Inspection,
    pub needs_attention: bool,
    pub outcome: MatchStatus,
    pub quote: Option<Quote>,
    pub warning: Option<String>,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub order: Order,
    pub driver: Driver,
    pub city: City,
    pub message: String,
}

/// A parsed upload; the image lives in a temp file deleted on drop.
struct Upload {
    image: NamedTempFile,
    city: City,
    route: Route,
}

async fn create_inspection(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<InspectionResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    let started = Instant::now();
    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || analyze(&worker_state, upload))
        .await
        .map_err(|err| AppError::Internal(format!("analysis task failed: {err}")))?;

    let outcome = outcome_label(&result);
    state
        .metrics
        .inspections_total
        .with_label_values(&[outcome])
        .inc();
    state
        .metrics
        .inspection_latency_seconds
        .with_label_values(&[outcome])
        .observe(started.elapsed().as_secs_f64());

    if let Err(err) = &result {
        warn!(error = %err, outcome, "inspection rejected");
    }

    result.map(Json)
}

fn analyze(state: &AppState, upload: Upload) -> Result<InspectionResponse, AppError> {
    let Upload { image, city, route } = upload;

    let inspection = {
        let mut random = state.random()?;
        inspect(image.path(), state.classifier.as_ref(), &mut **random)
    };
    drop(image);
    let inspection = inspection?;

    info!(
        cleanliness = inspection.cleanliness.label.as_str(),
        cleanliness_confidence = inspection.cleanliness.confidence,
        damage = inspection.damage.label.as_str(),
        damage_confidence = inspection.damage.confidence,
        "car inspected"
    );

    let outcome = matching::find_match(&state.store, &mut **state.random()?)?;

    let response = match outcome {
        MatchOutcome::NoDrivers => {
            state
                .metrics
                .matches_total
                .with_label_values(&["no_drivers"])
                .inc();

            InspectionResponse {
                inspection,
                needs_attention: inspection.flags_car(),
                outcome: MatchStatus::NoDrivers,
                quote: None,
                warning: Some("no drivers are available right now".to_string()),
            }
        }
        MatchOutcome::Matched(matched) => {
            state
                .metrics
                .matches_total
                .with_label_values(&["matched"])
                .inc();

            let quote = matching::quote(matched, inspection, city, route);
            state.insert_quote(quote.clone());

            InspectionResponse {
                inspection,
                needs_attention: inspection.flags_car(),
                outcome: MatchStatus::Matched,
                quote: Some(quote),
                warning: None,
            }
        }
    };

    Ok(response)
}

fn outcome_label<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AppError::ImageTooSmall { .. }) => "too_small",
        Err(AppError::UnreadableImage(_)) => "unreadable",
        Err(AppError::AnalysisFailed(_)) => "failed",
        Err(_) => "error",
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut image = None;
    let mut city = None;
    let mut route = Route::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => image = Some(store_image(field).await?),
            "city" => {
                let raw = field_text(field).await?;
                city = Some(
                    City::parse(&raw)
                        .ok_or_else(|| AppError::BadRequest(format!("unknown city: {raw}")))?,
                );
            }
            "from_address" => route.from_address = Some(field_text(field).await?),
            "to_address" => route.to_address = Some(field_text(field).await?),
            _ => {}
        }
    }

    Ok(Upload {
        image: image.ok_or_else(|| AppError::BadRequest("image is required".to_string()))?,
        city: city.ok_or_else(|| AppError::BadRequest("city is required".to_string()))?,
        route,
    })
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid form field: {err}")))
}

async fn store_image(field: Field<'_>) -> Result<NamedTempFile, AppError> {
    if !is_accepted_upload(field.content_type(), field.file_name()) {
        return Err(AppError::BadRequest(
            "image must be a JPEG or PNG file".to_string(),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|err| AppError::BadRequest(format!("failed to read image: {err}")))?;

    let mut file = tempfile::Builder::new()
        .prefix("car-upload-")
        .tempfile()
        .map_err(|err| AppError::Internal(format!("failed to create temp file: {err}")))?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|err| AppError::Internal(format!("failed to write temp file: {err}")))?;

    Ok(file)
}

fn is_accepted_upload(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(content_type) = content_type {
        if matches!(content_type, "image/jpeg" | "image/jpg" | "image/png") {
            return true;
        }
        if content_type != "application/octet-stream" {
            return false;
        }
    }

    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
        .unwrap_or(false)
}

async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, AppError> {
    Ok(Json(state.quote(id)?))
}

async fn confirm_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let quote = state.take_quote(id)?;

    let order = match matching::confirm(&state.store, &quote) {
        Ok(order) => order,
        Err(err) => {
            state.restore_quote(quote);
            return Err(err);
        }
    };

    state.metrics.orders_created_total.inc();
    let _ = state.order_events_tx.send(order.clone());

    Ok(Json(ConfirmResponse {
        message: format!(
            "Driver {} is on the way in {}",
            quote.driver.name, quote.city
        ),
        order,
        driver: quote.driver,
        city: quote.city,
    }))
}

#[cfg(test)]
mod tests {
    use super::is_accepted_upload;

    #[test]
    fn accepts_jpeg_and_png_only() {
        assert!(is_accepted_upload(Some("image/png"), None));
        assert!(is_accepted_upload(Some("image/jpeg"), Some("car.bin")));
        assert!(is_accepted_upload(None, Some("CAR.JPG")));
        assert!(is_accepted_upload(Some("application/octet-stream"), Some("car.jpeg")));

        assert!(!is_accepted_upload(Some("image/gif"), Some("car.png")));
        assert!(!is_accepted_upload(None, Some("car.webp")));
        assert!(!is_accepted_upload(None, None));
    }
}
