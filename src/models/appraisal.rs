use std::fmt;

use base64::Engine;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ApiError;

/// Client-facing message when either required appraisal field is missing.
/// The storefront form displays it verbatim, so it stays in Hungarian.
pub const MISSING_REQUIRED_FIELDS: &str = "Hiányzó kötelező mezők: súly, fémjelzés";

/// Client-facing message for unexpected appraisal failures. External-model
/// failures never surface this; they divert to the local calculation.
pub const APPRAISAL_FAILED: &str =
    "Hiba történt az értékbecslés során. Kérjük, próbálja újra később.";

/// A form field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// A string of only whitespace counts as absent.
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
        }
    }

    /// Lenient decimal parse; anything unparsable counts as zero grams.
    fn as_grams(&self) -> f64 {
        match self {
            FieldValue::Number(value) => *value,
            FieldValue::Text(text) => text.trim().parse().unwrap_or(0.0),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Text(text) => f.write_str(text.trim()),
        }
    }
}

/// Metal of the appraised piece, keyed by the storefront's wire tokens.
/// Unlisted tokens are carried verbatim and priced as "egyeb".
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
pub enum Metal {
    #[strum(serialize = "arany")]
    Gold,
    #[strum(serialize = "feherarany")]
    WhiteGold,
    #[strum(serialize = "ezust")]
    Silver,
    #[strum(serialize = "platina")]
    Platinum,
    #[strum(serialize = "egyeb")]
    Other,
    #[strum(default)]
    Unrecognized(String),
}

impl Metal {
    /// Karat purity adjustments only apply to gold alloys.
    pub fn is_gold(&self) -> bool {
        matches!(self, Metal::Gold | Metal::WhiteGold)
    }
}

/// Stated gold purity, out of 24 parts.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
pub enum Karat {
    #[strum(serialize = "8k")]
    K8,
    #[strum(serialize = "9k")]
    K9,
    #[strum(serialize = "10k")]
    K10,
    #[strum(serialize = "14k")]
    K14,
    #[strum(serialize = "18k")]
    K18,
    #[strum(serialize = "21k")]
    K21,
    #[strum(serialize = "22k")]
    K22,
    #[strum(serialize = "ismeretlen")]
    Unknown,
    #[strum(default)]
    Unrecognized(String),
}

/// Whether the piece carries a hallmark stamp. Only presence is enforced,
/// so tokens outside the form's choices round-trip instead of rejecting.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
pub enum Hallmark {
    #[strum(serialize = "igen")]
    Yes,
    #[strum(serialize = "nem")]
    No,
    #[strum(serialize = "nemtudom")]
    Undetermined,
    #[strum(default)]
    Other(String),
}

/// Confidence of an estimate. `Low` is reserved for the local calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// The estimate returned to the caller. Amounts are whole forints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalEstimate {
    pub market_value: i64,
    pub lower_bound: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An inline photo attachment, kept base64-encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: &'static str,
}

/// Raw body of POST /api/v1/appraisal, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppraisalPayload {
    pub weight: Option<FieldValue>,
    pub material: Option<String>,
    pub karat: Option<String>,
    pub has_hallmark: Option<String>,
    pub length: Option<FieldValue>,
    pub width: Option<FieldValue>,
    pub thickness: Option<FieldValue>,
    pub images: Vec<String>,
}

/// A validated appraisal request, shared by both estimation paths.
#[derive(Debug, Clone)]
pub struct AppraisalRequest {
    /// Weight as supplied, embedded verbatim in the model instruction.
    pub weight: String,
    /// Parsed weight for the local calculation; unparsable input is zero.
    pub weight_grams: f64,
    pub material: Option<Metal>,
    pub karat: Option<Karat>,
    pub hallmark: Hallmark,
    pub length_mm: Option<String>,
    pub width_mm: Option<String>,
    pub thickness_mm: Option<String>,
    pub images: Vec<ImagePayload>,
}

impl AppraisalPayload {
    /// Enforce the two required fields, then normalize into a typed request.
    ///
    /// Weight and hallmark must both be present and non-empty; nothing else
    /// is checked here, so a weight of "0.01" (or an unparsable one, which
    /// prices as zero) passes through to the estimation paths.
    pub fn normalize(self) -> Result<AppraisalRequest, ApiError> {
        let weight = match self.weight {
            Some(value) if !value.is_blank() => value,
            _ => return Err(ApiError::MissingFields(MISSING_REQUIRED_FIELDS)),
        };

        let hallmark = match self.has_hallmark.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token
                .parse()
                .unwrap_or_else(|_| Hallmark::Other(token.to_string())),
            _ => return Err(ApiError::MissingFields(MISSING_REQUIRED_FIELDS)),
        };

        let material = self
            .material
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse()
                    .unwrap_or_else(|_| Metal::Unrecognized(token.to_string()))
            });

        let karat = self
            .karat
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse()
                    .unwrap_or_else(|_| Karat::Unrecognized(token.to_string()))
            });

        let images = self
            .images
            .iter()
            .filter_map(|encoded| decode_image(encoded))
            .collect();

        Ok(AppraisalRequest {
            weight_grams: weight.as_grams(),
            weight: weight.to_string(),
            material,
            karat,
            hallmark,
            length_mm: dimension(self.length),
            width_mm: dimension(self.width),
            thickness_mm: dimension(self.thickness),
            images,
        })
    }
}

fn dimension(value: Option<FieldValue>) -> Option<String> {
    value
        .filter(|value| !value.is_blank())
        .map(|value| value.to_string())
}

/// Decode an attachment far enough to sniff its MIME type. The payload
/// itself stays base64-encoded for the outbound call.
fn decode_image(encoded: &str) -> Option<ImagePayload> {
    let trimmed = encoded.trim();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(error = %error, "discarding attachment that is not valid base64");
            return None;
        }
    };

    let mime_type = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        // The storefront uploads JPEG; anything unrecognized is sent as such.
        _ => "image/jpeg",
    };

    Some(ImagePayload {
        data: trimmed.to_string(),
        mime_type,
    })
}
