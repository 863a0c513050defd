use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::entities::medicine::MedicineInfo;
use crate::entities::suggestion::{self, Suggestions};
use crate::error::OpenClinicError;
use crate::server::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct MedicineParams {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

/// `GET /api/medicine?name=<name>`
pub(crate) async fn medicine(
    State(state): State<AppState>,
    params: Option<Query<MedicineParams>>,
) -> Result<Json<MedicineInfo>, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let info = state.lookup.search(params.name.as_deref()).await?;
    Ok(Json(info))
}

/// `GET /api/suggestions?q=<prefix>`; always answers 200.
pub(crate) async fn suggestions(params: Option<Query<SuggestionParams>>) -> Json<Suggestions> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    Json(Suggestions {
        suggestions: suggestion::suggest(params.q.as_deref()),
    })
}

pub(crate) async fn health() -> Result<Json<HealthStatus>, ApiError> {
    let timestamp = crate::utils::date::now_iso8601().map_err(OpenClinicError::from)?;
    Ok(Json(HealthStatus {
        status: "OK",
        timestamp,
    }))
}
