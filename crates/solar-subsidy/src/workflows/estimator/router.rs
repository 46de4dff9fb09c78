use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::catalog::{estimate_for_region, RegionCatalog};
use super::domain::{EstimateView, RegionCoefficients, SizingInput};
use crate::access::{authorize_administration, Caller};
use crate::error::AppError;

/// Shared state for calculator handlers.
pub struct CalculatorState<C> {
    pub catalog: Arc<C>,
    pub default_region: String,
}

/// Request body accepted by the estimate endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub monthly_bill: f64,
    pub roof_area: f64,
    #[serde(default)]
    pub connected_load: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
}

impl EstimateRequest {
    fn sizing_input(&self) -> SizingInput {
        SizingInput {
            monthly_bill: self.monthly_bill,
            roof_area: self.roof_area,
            connected_load_kw: self.connected_load,
        }
    }
}

/// Router builder exposing the calculator and region coefficient endpoints.
pub fn calculator_router<C>(state: Arc<CalculatorState<C>>) -> Router
where
    C: RegionCatalog + 'static,
{
    Router::new()
        .route("/api/v1/calculator/estimate", post(estimate_handler::<C>))
        .route("/api/v1/calculator/regions", get(regions_handler::<C>))
        .route(
            "/api/v1/calculator/regions/:region",
            put(upsert_region_handler::<C>),
        )
        .with_state(state)
}

pub(crate) async fn estimate_handler<C>(
    State(state): State<Arc<CalculatorState<C>>>,
    axum::Json(request): axum::Json<EstimateRequest>,
) -> Response
where
    C: RegionCatalog + 'static,
{
    let region = request
        .state
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(state.default_region.as_str());

    match estimate_for_region(state.catalog.as_ref(), region, &request.sizing_input()) {
        Ok(result) => {
            debug!(region, capacity_kw = result.capacity_kw, "estimate computed");
            (StatusCode::OK, axum::Json(EstimateView::from(&result))).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn regions_handler<C>(State(state): State<Arc<CalculatorState<C>>>) -> Response
where
    C: RegionCatalog + 'static,
{
    (StatusCode::OK, axum::Json(state.catalog.list())).into_response()
}

pub(crate) async fn upsert_region_handler<C>(
    State(state): State<Arc<CalculatorState<C>>>,
    Path(region): Path<String>,
    headers: HeaderMap,
    axum::Json(mut coeffs): axum::Json<RegionCoefficients>,
) -> Response
where
    C: RegionCatalog + 'static,
{
    let caller = match Caller::from_headers(&headers) {
        Ok(caller) => caller,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response();
        }
    };

    if let Err(reason) = authorize_administration(&caller, "publish region coefficients")
        .into_result()
    {
        let payload = json!({ "error": reason });
        return (StatusCode::FORBIDDEN, axum::Json(payload)).into_response();
    }

    coeffs.region = region;
    match state.catalog.upsert(coeffs) {
        Ok(stored) => {
            info!(region = %stored.region, by = %caller.id, "region coefficients published");
            (StatusCode::OK, axum::Json(stored)).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}
