use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::listing_queries;
use crate::error::ApiError;
use crate::models::listing::{CreateListingRequest, Listing, UpdateListingRequest};

/// Storefront reads may sit in a CDN for a minute; admin dashboard reads
/// must always see fresh data.
const PUBLIC_CACHE: &str = "public, s-maxage=60, stale-while-revalidate=120";
const ADMIN_CACHE: &str = "private, no-cache, no-store, must-revalidate, max-age=0";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingsQuery {
    pub public: bool,
}

/// GET /api/v1/listings — every listing, or only storefront-visible ones.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = if query.public {
        listing_queries::list_public(&state.db).await
    } else {
        listing_queries::list_all(&state.db).await
    }
    .map_err(ApiError::database("Failed to fetch listings"))?;

    Ok(Json(listings))
}

/// GET /api/v1/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let listing = listing_queries::get(&state.db, id)
        .await
        .map_err(ApiError::database("Failed to fetch listing"))?
        .ok_or(ApiError::NotFound("Listing not found"))?;

    let is_admin = headers
        .get("x-admin-request")
        .and_then(|value| value.to_str().ok())
        == Some("true");
    let cache = if is_admin { ADMIN_CACHE } else { PUBLIC_CACHE };

    Ok(([(header::CACHE_CONTROL, cache)], Json(listing)))
}

/// POST /api/v1/listings
pub async fn create_listing(
    State(state): State<AppState>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|report| ApiError::from_report(&report))?;

    let listing = listing_queries::create(&state.db, &payload)
        .await
        .map_err(ApiError::database("Failed to create listing"))?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// PUT /api/v1/listings/{id} — partial update.
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, ApiError> {
    payload
        .validate()
        .map_err(|report| ApiError::from_report(&report))?;

    let listing = listing_queries::update(&state.db, id, &payload)
        .await
        .map_err(ApiError::database("Failed to update listing"))?
        .ok_or(ApiError::NotFound("Listing not found"))?;

    Ok(Json(listing))
}

/// DELETE /api/v1/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = listing_queries::delete(&state.db, id)
        .await
        .map_err(ApiError::database("Failed to delete listing"))?;

    if !deleted {
        return Err(ApiError::NotFound("Listing not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
