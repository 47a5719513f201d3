//! Site configuration.
//!
//! The browser build bakes values in at compile time through `option_env!`;
//! anything unset falls back to the defaults below.

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://cyber-grid-backend.vercel.app/api";

pub const ENV_API_BASE: &str = "CYBER_GRID_API_BASE";
pub const ENV_REMOTE_URL: &str = "CYBER_GRID_REMOTE_URL";
pub const ENV_PAGE_SIZE: &str = "CYBER_GRID_PAGE_SIZE";
pub const ENV_LOG: &str = "CYBER_GRID_LOG";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub api_base: String,
    /// Root URL of the realtime cart mirror. `None` keeps the cart local only.
    pub remote_sync_url: Option<String>,
    pub page_size: usize,
    pub toast_ms: u32,
    pub view_setup_delay_ms: u32,
    pub chat_reply_delay_ms: u32,
    pub acquire_close_delay_ms: u32,
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            remote_sync_url: None,
            page_size: 9,
            toast_ms: 3000,
            view_setup_delay_ms: 10,
            chat_reply_delay_ms: 500,
            acquire_close_delay_ms: 800,
            log_level: "info".to_owned(),
        }
    }
}

impl SiteConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(ENV_API_BASE) {
            let base = base.trim().trim_end_matches('/');
            if base.is_empty() {
                return Err(ConfigError::Empty { key: ENV_API_BASE });
            }
            config.api_base = base.to_owned();
        }

        config.remote_sync_url = lookup(ENV_REMOTE_URL)
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| is_usable_remote_url(url));

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: ENV_PAGE_SIZE,
                        value: raw,
                    });
                }
            };
        }

        if let Some(level) = lookup(ENV_LOG).filter(|level| !level.trim().is_empty()) {
            config.log_level = level.trim().to_owned();
        }

        Ok(config)
    }

    /// Values captured when the crate was compiled.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                ENV_API_BASE => option_env!("CYBER_GRID_API_BASE"),
                ENV_REMOTE_URL => option_env!("CYBER_GRID_REMOTE_URL"),
                ENV_PAGE_SIZE => option_env!("CYBER_GRID_PAGE_SIZE"),
                ENV_LOG => option_env!("CYBER_GRID_LOG"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    pub fn remote_sync_enabled(&self) -> bool {
        self.remote_sync_url.is_some()
    }
}

// Placeholder project settings ("YOUR_DATABASE_URL") disable the mirror.
fn is_usable_remote_url(url: &str) -> bool {
    !url.is_empty() && !url.contains("YOUR_")
}
