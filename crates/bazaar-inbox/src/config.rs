//! Inbox configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the inbox can start with zero
//! configuration for local development.

use std::path::PathBuf;

use bazaar_shared::constants::{
    DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_MESSAGE_LEN, DEFAULT_TIME_FORMAT,
};
use bazaar_shared::Role;
use chrono::format::{Item, StrftimeItems};

#[derive(Debug, Clone)]
pub struct InboxConfig {
    /// SQLite file holding conversations.
    /// Env: `BAZAAR_DB_PATH`
    /// Default: `None` (platform data directory).
    pub db_path: Option<PathBuf>,

    /// Largest image accepted by `send_image`, in bytes.
    /// Env: `BAZAAR_MAX_IMAGE_BYTES`
    /// Default: 5 MiB
    pub max_image_bytes: usize,

    /// Longest text message, in characters.
    /// Env: `BAZAAR_MAX_MESSAGE_LEN`
    /// Default: 2000
    pub max_message_len: usize,

    /// chrono format string for message display times.
    /// Env: `BAZAAR_TIME_FORMAT`
    /// Default: `%-I:%M %p`
    pub time_format: String,

    /// Partition shown when the inbox opens.
    /// Env: `BAZAAR_START_VIEW` (buyer/seller)
    /// Default: buyer
    pub start_view: Role,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            start_view: Role::AsBuyer,
        }
    }
}

impl InboxConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("BAZAAR_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("BAZAAR_MAX_IMAGE_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_image_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid BAZAAR_MAX_IMAGE_BYTES, using default"),
            }
        }

        if let Some(val) = lookup("BAZAAR_MAX_MESSAGE_LEN") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_message_len = n,
                _ => tracing::warn!(value = %val, "Invalid BAZAAR_MAX_MESSAGE_LEN, using default"),
            }
        }

        if let Some(fmt) = lookup("BAZAAR_TIME_FORMAT") {
            if is_valid_time_format(&fmt) {
                config.time_format = fmt;
            } else {
                tracing::warn!(value = %fmt, "Invalid BAZAAR_TIME_FORMAT, using default");
            }
        }

        if let Some(val) = lookup("BAZAAR_START_VIEW") {
            match Role::from_str_opt(&val) {
                Some(role) => config.start_view = role,
                None => tracing::warn!(value = %val, "Invalid BAZAAR_START_VIEW, using default"),
            }
        }

        config
    }
}

/// chrono panics when displaying a format with bad specifiers, so reject
/// them up front.
pub fn is_valid_time_format(fmt: &str) -> bool {
    !fmt.is_empty() && StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}
