use async_trait::async_trait;

use crate::models::appraisal::{AppraisalEstimate, AppraisalRequest};

/// Client for the external valuation model.
///
/// Implementations must only return well-formed estimates (non-negative
/// amounts, lower bound at or below the market value); anything else is an
/// error, which callers recover from with the local calculation.
#[async_trait]
pub trait ValuationClient: Send + Sync {
    async fn estimate(
        &self,
        request: &AppraisalRequest,
    ) -> Result<AppraisalEstimate, ValuationError>;
}

/// Failure modes of the external valuation call. None of these reach the
/// caller: they all divert to the fallback calculation.
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("reply is not a valid estimate: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reply contained no text")]
    EmptyReply,

    #[error("malformed estimate: {0}")]
    Malformed(&'static str),
}

/// Which path produced an estimate. The wire response does not distinguish
/// them beyond `confidence`; logs and metrics do.
#[derive(Debug, Clone, PartialEq)]
pub enum Valuation {
    External(AppraisalEstimate),
    Fallback(AppraisalEstimate),
}

impl Valuation {
    pub fn source(&self) -> &'static str {
        match self {
            Valuation::External(_) => "external",
            Valuation::Fallback(_) => "fallback",
        }
    }

    pub fn estimate(&self) -> &AppraisalEstimate {
        match self {
            Valuation::External(estimate) | Valuation::Fallback(estimate) => estimate,
        }
    }

    pub fn into_estimate(self) -> AppraisalEstimate {
        match self {
            Valuation::External(estimate) | Valuation::Fallback(estimate) => estimate,
        }
    }
}
