pub mod alert;
pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod slack;

pub use error::{Result, SlackNotifError};
