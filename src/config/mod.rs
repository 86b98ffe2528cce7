use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini API base URL (override for testing against a local stub)
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Model used for appraisals
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Timeout for the external valuation call, in seconds
    #[serde(default = "default_gemini_timeout_secs")]
    pub gemini_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
