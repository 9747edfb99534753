use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: i64,
}

/// Runtime configuration, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub llm: LlmSettings,
    pub retry: RetrySettings,
    pub telegram: Option<TelegramSettings>,
    pub yahoo_base_url: String,
    pub news_max_results: usize,
    pub database_url: String,
    pub http_timeout: Duration,
}

impl Settings {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) if !bot_token.is_empty() => {
                match chat_id.trim().parse::<i64>() {
                    Ok(chat_id) => Some(TelegramSettings { bot_token, chat_id }),
                    Err(e) => {
                        warn!("TELEGRAM_CHAT_ID must be a number ({}), notifier disabled", e);
                        None
                    }
                }
            }
            _ => None,
        };

        Self {
            llm: LlmSettings {
                api_key: string("NVIDIA_API_KEY", "NVCF-DEFAULT"),
                base_url: string("NVIDIA_API_BASE", "https://integrate.api.nvidia.com/v1")
                    .trim_end_matches('/')
                    .to_string(),
                model: string("LLM_MODEL", "meta/llama3-8b-instruct"),
                temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.3),
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 256),
            },
            retry: RetrySettings {
                max_attempts: parse_or(&lookup, "RETRY_MAX_ATTEMPTS", 3u32).max(1),
                initial_backoff: Duration::from_secs(parse_or(
                    &lookup,
                    "RETRY_INITIAL_BACKOFF_SECS",
                    2,
                )),
                max_backoff: Duration::from_secs(parse_or(&lookup, "RETRY_MAX_BACKOFF_SECS", 10)),
                jitter: parse_or(&lookup, "RETRY_JITTER", false),
            },
            telegram,
            yahoo_base_url: string("YAHOO_BASE_URL", "https://query1.finance.yahoo.com")
                .trim_end_matches('/')
                .to_string(),
            news_max_results: parse_or(&lookup, "NEWS_MAX_RESULTS", 3),
            database_url: string("DATABASE_URL", "sqlite:market_agent.db"),
            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring {}={:?}: {}", key, raw, e);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied_at_boundary() {
        let s = settings(&[]);
        assert_eq!(s.llm.api_key, "NVCF-DEFAULT");
        assert_eq!(s.llm.base_url, "https://integrate.api.nvidia.com/v1");
        assert_eq!(s.llm.max_tokens, 256);
        assert_eq!(s.llm.temperature, 0.3);
        assert_eq!(s.retry.max_attempts, 3);
        assert_eq!(s.retry.initial_backoff, Duration::from_secs(2));
        assert_eq!(s.retry.max_backoff, Duration::from_secs(10));
        assert!(!s.retry.jitter);
        assert_eq!(s.news_max_results, 3);
        assert!(s.telegram.is_none());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let s = settings(&[
            ("NVIDIA_API_BASE", "http://localhost:8000/v1/"),
            ("NEWS_MAX_RESULTS", "7"),
            ("LLM_MAX_TOKENS", "lots"),
        ]);
        assert_eq!(s.llm.base_url, "http://localhost:8000/v1");
        assert_eq!(s.news_max_results, 7);
        assert_eq!(s.llm.max_tokens, 256);
    }

    #[test]
    fn test_telegram_requires_numeric_chat_id() {
        let s = settings(&[("TELEGRAM_BOT_TOKEN", "abc"), ("TELEGRAM_CHAT_ID", "-1001")]);
        assert_eq!(
            s.telegram,
            Some(TelegramSettings {
                bot_token: "abc".into(),
                chat_id: -1001
            })
        );

        let s = settings(&[("TELEGRAM_BOT_TOKEN", "abc"), ("TELEGRAM_CHAT_ID", "chat")]);
        assert!(s.telegram.is_none());
    }
}
