use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;
use uuid::Uuid;

/// Lifecycle of a listing. Storefront visitors only ever see `Active` and
/// `Reserved` listings; the rest exist for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Active,
    Reserved,
    Sold,
    Inactive,
}

impl ListingStatus {
    pub fn is_public(self) -> bool {
        matches!(self, ListingStatus::Active | ListingStatus::Reserved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListingCategory {
    Jewelry,
    Watches,
    Art,
    Furniture,
    Collectibles,
    Antiques,
    Fashion,
    Other,
}

/// A marketplace listing. Prices are whole forints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub category: ListingCategory,
    pub price: i64,
    pub description: String,
    pub photos: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for POST /api/v1/listings.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[garde(length(min = 1, max = 200))]
    pub title: String,

    #[garde(skip)]
    pub category: ListingCategory,

    #[garde(range(min = 1, max = 10_000_000))]
    pub price: i64,

    #[garde(length(max = 5000))]
    pub description: String,

    #[garde(length(max = 20), inner(custom(photo_url)))]
    pub photos: Vec<String>,

    #[garde(skip)]
    pub status: ListingStatus,
}

/// Payload for PUT /api/v1/listings/{id}; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateListingRequest {
    #[garde(inner(length(min = 1, max = 200)))]
    pub title: Option<String>,

    #[garde(skip)]
    pub category: Option<ListingCategory>,

    #[garde(inner(range(min = 1, max = 10_000_000)))]
    pub price: Option<i64>,

    #[garde(inner(length(max = 5000)))]
    pub description: Option<String>,

    #[garde(inner(length(max = 20), inner(custom(photo_url))))]
    pub photos: Option<Vec<String>>,

    #[garde(skip)]
    pub status: Option<ListingStatus>,
}

/// Image hosts the storefront is allowed to embed.
const ALLOWED_PHOTO_HOSTS: &[&str] = &[
    "images.unsplash.com",
    "unsplash.com",
    "imgur.com",
    "i.imgur.com",
    "cloudinary.com",
    "res.cloudinary.com",
];

fn photo_url(value: &str, _context: &()) -> garde::Result {
    let parsed = Url::parse(value).map_err(|_| garde::Error::new("not a valid URL"))?;

    if parsed.scheme() != "https" {
        return Err(garde::Error::new("photo URLs must use HTTPS"));
    }

    let host = parsed.host_str().unwrap_or_default();
    let allowed = ALLOWED_PHOTO_HOSTS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));
    if !allowed {
        return Err(garde::Error::new("photo host is not on the allowlist"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_request(body: serde_json::Value) -> CreateListingRequest {
        serde_json::from_value(body).expect("payload deserializes")
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Arany pecsétgyűrű",
            "category": "jewelry",
            "price": 185000,
            "description": "14k, fémjelzett.",
            "photos": ["https://images.unsplash.com/photo-123"],
            "status": "active",
        })
    }

    #[test]
    fn valid_listing_passes() {
        assert!(create_request(valid_body()).validate().is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let mut body = valid_body();
        body["title"] = json!("");
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn non_positive_price_fails() {
        let mut body = valid_body();
        body["price"] = json!(0);
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn price_above_cap_fails() {
        let mut body = valid_body();
        body["price"] = json!(10_000_001);
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn plain_http_photo_fails() {
        let mut body = valid_body();
        body["photos"] = json!(["http://images.unsplash.com/photo-123"]);
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn unlisted_photo_host_fails() {
        let mut body = valid_body();
        body["photos"] = json!(["https://example.com/ring.jpg"]);
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn subdomain_of_allowed_host_passes() {
        let mut body = valid_body();
        body["photos"] = json!(["https://res.cloudinary.com/demo/image/upload/ring.jpg"]);
        assert!(create_request(body).validate().is_ok());
    }

    #[test]
    fn more_than_twenty_photos_fails() {
        let mut body = valid_body();
        let photos: Vec<String> = (0..21)
            .map(|i| format!("https://images.unsplash.com/photo-{i}"))
            .collect();
        body["photos"] = json!(photos);
        assert!(create_request(body).validate().is_err());
    }

    #[test]
    fn unknown_status_token_fails_to_deserialize() {
        let mut body = valid_body();
        body["status"] = json!("archived");
        assert!(serde_json::from_value::<CreateListingRequest>(body).is_err());
    }

    #[test]
    fn empty_update_passes_validation() {
        let update: UpdateListingRequest = serde_json::from_value(json!({})).unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn update_rejects_bad_nested_values() {
        let update: UpdateListingRequest =
            serde_json::from_value(json!({ "price": -5 })).unwrap();
        assert!(update.validate().is_err());

        let update: UpdateListingRequest =
            serde_json::from_value(json!({ "photos": ["ftp://x"] })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn only_active_and_reserved_are_public() {
        assert!(ListingStatus::Active.is_public());
        assert!(ListingStatus::Reserved.is_public());
        assert!(!ListingStatus::Draft.is_public());
        assert!(!ListingStatus::Sold.is_public());
        assert!(!ListingStatus::Inactive.is_public());
    }

    #[test]
    fn status_round_trips_through_its_wire_token() {
        assert_eq!(ListingStatus::Reserved.to_string(), "reserved");
        assert_eq!("sold".parse::<ListingStatus>(), Ok(ListingStatus::Sold));
        assert_eq!(ListingCategory::Watches.to_string(), "watches");
        assert!("unknown".parse::<ListingCategory>().is_err());
    }
}
