use std::time::Duration;

use anyhow::Context as _;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Settings for the upstream completion API.
///
/// Built once at startup and handed to the router, so the handler never reads the
/// process environment itself.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// Bearer token. `None` is a valid state: requests that pass validation answer 500.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// No timeout unless explicitly configured.
    pub timeout: Option<Duration>,
}

impl DeepSeekConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same rules as [`DeepSeekConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match non_blank("DEEPSEEK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DEEPSEEK_TIMEOUT_SECS is not a number: {raw}"))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key: non_blank("DEEPSEEK_API_KEY"),
            base_url: non_blank("DEEPSEEK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_blank("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
