use crate::error::{Result, SlackNotifError};

pub const DEFAULT_WATCH_CHANNEL: &str = "lunch";
pub const DEFAULT_WATCH_KEYWORD: &str = ":hungry_greendale_human_being:";

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub watch: WatchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// User token (`xoxc-...`) of the account being watched
    pub api_token: String,
    /// Session cookie that accompanies the user token
    pub cookie: String,
}

/// Channel/keyword pair that alerts even without a mention
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub channel: String,
    pub keyword: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_WATCH_CHANNEL.to_string(),
            keyword: DEFAULT_WATCH_KEYWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub json: bool,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
    let required = |key: &str| {
        lookup(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SlackNotifError::Config(format!("Missing {}", key)))
    };

    let slack = SlackConfig {
        api_token: required("API_TOKEN")?,
        cookie: required("COOKIE")?,
    };

    // Empty values fall back to the defaults; an empty keyword would match every message
    let optional = |key: &str, default: &str| {
        lookup(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let watch = WatchConfig {
        channel: optional("WATCH_CHANNEL", DEFAULT_WATCH_CHANNEL),
        keyword: optional("WATCH_KEYWORD", DEFAULT_WATCH_KEYWORD),
    };

    let log = LogConfig {
        json: match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(SlackNotifError::Config(format!(
                    "Invalid LOG_FORMAT: {}",
                    other
                )));
            }
        },
    };

    Ok(Settings { slack, watch, log })
}
