use anyhow::{Context, Result};

/// Public Gemini generateContent endpoint used when `GEMINI_API_URL` is unset.
pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Application configuration loaded from environment variables.
/// Read once at startup; the analysis core never re-reads the environment.
#[derive(Clone)]
pub struct Config {
    /// Selects the bearer-token endpoint instead of the API-key endpoint.
    pub use_alternate_endpoint: bool,
    pub alternate_api_url: Option<String>,
    pub alternate_api_token: Option<String>,
    pub gemini_api_url: String,
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            use_alternate_endpoint: parse_flag(
                optional_env("USE_ALTERNATE_ENDPOINT").as_deref(),
            )
            .context("USE_ALTERNATE_ENDPOINT must be a boolean (true/false)")?,
            alternate_api_url: optional_env("ALTERNATE_API_URL"),
            alternate_api_token: optional_env("ALTERNATE_API_TOKEN"),
            gemini_api_url: optional_env("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

// Credentials stay out of logs and panic messages.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("use_alternate_endpoint", &self.use_alternate_endpoint)
            .field("alternate_api_url", &self.alternate_api_url)
            .field("alternate_api_token", &redacted(&self.alternate_api_token))
            .field("gemini_api_url", &self.gemini_api_url)
            .field("gemini_api_key", &redacted(&self.gemini_api_key))
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn redacted(secret: &Option<String>) -> &'static str {
    match secret {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

/// Reads a variable, treating blank values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("unrecognized boolean value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_defaults_to_false() {
        assert!(!parse_flag(None).unwrap());
    }

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag(Some("true")).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some("1")).unwrap());
        assert!(!parse_flag(Some("false")).unwrap());
        assert!(!parse_flag(Some("0")).unwrap());
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config {
            use_alternate_endpoint: true,
            alternate_api_url: Some("https://llm.internal/v1/generate".to_string()),
            alternate_api_token: Some("sk-super-secret".to_string()),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-super-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
    }
}
