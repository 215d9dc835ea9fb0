mod settings;

pub use settings::{
    DEFAULT_WATCH_CHANNEL, DEFAULT_WATCH_KEYWORD, LogConfig, Settings, SlackConfig, WatchConfig,
    load_settings,
};
