use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::appraisal::{AppraisalEstimate, AppraisalPayload, APPRAISAL_FAILED};
use crate::services::pricing;
use crate::services::valuation::Valuation;

/// POST /api/v1/appraisal — estimate the market value of a jewelry item.
///
/// The external model gets exactly one attempt; any failure there is
/// absorbed by the local spot-price calculation, so the only errors a
/// caller can see are a validation failure and a generic 500 for bodies
/// that cannot be read at all.
pub async fn appraise(
    State(state): State<AppState>,
    payload: Result<Json<AppraisalPayload>, JsonRejection>,
) -> Result<Json<AppraisalEstimate>, ApiError> {
    metrics::counter!("appraisal_requests_total").increment(1);

    let Json(payload) = payload.map_err(|rejection| {
        tracing::error!(error = %rejection, "unreadable appraisal request body");
        ApiError::Internal(APPRAISAL_FAILED)
    })?;

    let request = payload.normalize().inspect_err(|_| {
        metrics::counter!("appraisal_rejected_total").increment(1);
    })?;

    let valuation = match state.valuer.estimate(&request).await {
        Ok(estimate) => Valuation::External(estimate),
        Err(error) => {
            tracing::warn!(error = %error, "external valuation failed, using local calculation");
            Valuation::Fallback(pricing::fallback_estimate(&request))
        }
    };

    match &valuation {
        Valuation::External(_) => metrics::counter!("appraisal_external_total").increment(1),
        Valuation::Fallback(_) => metrics::counter!("appraisal_fallback_total").increment(1),
    }

    tracing::info!(
        source = valuation.source(),
        market_value = valuation.estimate().market_value,
        "appraisal estimate produced"
    );

    Ok(Json(valuation.into_estimate()))
}
