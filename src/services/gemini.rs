use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::appraisal::{AppraisalEstimate, AppraisalRequest, Confidence};
use crate::services::valuation::{ValuationClient, ValuationError};

/// Client for the Gemini `generateContent` API.
///
/// Sends the appraisal instruction plus any photo attachments and decodes
/// the JSON object the model is asked to reply with. Every failure mode is
/// a `ValuationError`; the caller decides what to do with it.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        // Client-level timeout: a hung upstream call must resolve into the
        // fallback path, not stall the request.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gemini_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
        })
    }
}

#[async_trait]
impl ValuationClient for GeminiClient {
    async fn estimate(
        &self,
        request: &AppraisalRequest,
    ) -> Result<AppraisalEstimate, ValuationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let mut parts = vec![Part::text(build_instruction(request))];
        for attachment in &request.images {
            parts.push(Part::image(attachment.mime_type, &attachment.data));
        }

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateContentRequest {
                contents: vec![Content { parts }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ValuationError::Status { status, body });
        }

        let decoded: GenerateContentResponse = response.json().await?;
        let reply = decoded.text();
        if reply.trim().is_empty() {
            return Err(ValuationError::EmptyReply);
        }

        parse_reply(&reply)
    }
}

/// Assemble the appraisal instruction, omitting optional fields that were
/// not supplied rather than passing empty placeholders.
fn build_instruction(request: &AppraisalRequest) -> String {
    let mut lines = vec![
        "Te egy szakértő ékszer értékbecslő vagy. A mellékelt képek és a következő adatok alapján becsüld meg egy ékszer piaci értékét Hungarian Forint (HUF) valutában.".to_string(),
        String::new(),
        "Ékszer adatok:".to_string(),
        format!("- Súly: {} gramm", request.weight),
    ];

    if let Some(material) = &request.material {
        lines.push(format!("- Anyag: {material}"));
    }
    if let Some(karat) = &request.karat {
        lines.push(format!("- Karát: {karat}"));
    }
    lines.push(format!("- Fémjelzés van-e: {}", request.hallmark));
    if let Some(length) = &request.length_mm {
        lines.push(format!("- Hosszúság: {length} mm"));
    }
    if let Some(width) = &request.width_mm {
        lines.push(format!("- Szélesség: {width} mm"));
    }
    if let Some(thickness) = &request.thickness_mm {
        lines.push(format!("- Vastagság: {thickness} mm"));
    }

    lines.extend(
        [
            "",
            "Fontos tudnivalók:",
            "1. Elemezd a képeket: állapot, kidolgozottság, anyagminőség, fémjelzés",
            "2. A nemesfém világpiaci árakat kell figyelembe venni (arany, ezüst, platina aktuális ára)",
            "3. Az értékbecslést HUF valutában add meg",
            "4. Készíts egy piaci értéket és egy alsó értéket (világpiaci érték - 15%)",
            "5. Legyen reális és konzervatív a becslésben",
            "6. A válasz CSAK egy JSON formátumú legyen, semmi más szöveg",
            "7. Az alábbi formátumban válaszolj:",
            "",
            "{",
            "  \"marketValue\": 150000,",
            "  \"lowerBound\": 127500,",
            "  \"confidence\": \"medium\",",
            "  \"notes\": \"Rövid magyarázat a becslésről 1-2 mondatban, beleértve a képeken látott állapotot és minőséget\"",
            "}",
            "",
            "CSAK a JSON-t add vissza, más szöveget ne!",
        ]
        .map(str::to_string),
    );

    lines.join("\n")
}

/// Pull the JSON object out of a reply that may wrap it in markdown fences
/// or surrounding prose.
fn extract_json(reply: &str) -> Option<String> {
    let trimmed = reply.trim();

    if let Some(fenced) = trimmed.strip_prefix("```") {
        let body = fenced.strip_prefix("json").unwrap_or(fenced);
        let body = body.rfind("```").map_or(body, |end| &body[..end]);
        return Some(body.trim().to_string());
    }

    // Best effort otherwise: first '{' through last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| trimmed[start..=end].to_string())
}

/// Decode the reply into an estimate, enforcing output sanity.
fn parse_reply(reply: &str) -> Result<AppraisalEstimate, ValuationError> {
    let payload = extract_json(reply).unwrap_or_else(|| reply.trim().to_string());
    let raw: RawEstimate = serde_json::from_str(&payload)?;
    raw.into_estimate()
}

/// Estimate as the model returns it: amounts may be fractional, confidence
/// and notes may be absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEstimate {
    market_value: f64,
    lower_bound: f64,
    #[serde(default)]
    confidence: Option<Confidence>,
    #[serde(default)]
    notes: Option<String>,
}

impl RawEstimate {
    fn into_estimate(self) -> Result<AppraisalEstimate, ValuationError> {
        if self.market_value < 0.0 || self.lower_bound < 0.0 {
            return Err(ValuationError::Malformed("negative amount"));
        }
        if self.lower_bound > self.market_value {
            return Err(ValuationError::Malformed("lower bound above market value"));
        }

        Ok(AppraisalEstimate {
            market_value: self.market_value.round() as i64,
            lower_bound: self.lower_bound.round() as i64,
            confidence: self.confidence,
            notes: self.notes,
        })
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Part {
            text: Some(text),
            inline_data: None,
        }
    }

    fn image(mime_type: &str, data: &str) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        let mut out = String::new();
        if let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) {
            for part in &content.parts {
                if let Some(text) = &part.text {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
        }
        out
    }
}
