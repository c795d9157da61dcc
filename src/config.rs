use crate::error::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_FLASH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";

/// Tunables for the dashboard core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub debounce_ms: u64,               // quiet period before input settles
    pub auto_trigger_min_chars: usize,  // settled text must be longer than this
    pub bulk_max_lines: usize,          // lines submitted from one upload
    pub bulk_min_line_chars: usize,     // lines at or below this length are dropped
    pub trend_window: usize,            // history entries in the trend view
    pub bubble_limit: usize,            // keywords kept in the bubble map
    pub radar_floor: u32,               // minimum radar normalization ceiling
    pub request_timeout_secs: u64,
    pub api_key: Option<String>,
    pub flash_model: String,
    pub pro_model: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1500,
            auto_trigger_min_chars: 20,
            bulk_max_lines: 10,
            bulk_min_line_chars: 5,
            trend_window: 15,
            bubble_limit: 10,
            radar_floor: 10,
            request_timeout_secs: 60,
            api_key: None,
            flash_model: DEFAULT_FLASH_MODEL.to_string(),
            pro_model: DEFAULT_PRO_MODEL.to_string(),
            log_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Build a config from defaults overridden by `SENTILENS_*` environment variables
    pub fn from_env() -> DashboardResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> DashboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SENTILENS_DEBOUNCE_MS") {
            config.debounce_ms = parse_var("SENTILENS_DEBOUNCE_MS", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_AUTO_TRIGGER_MIN_CHARS") {
            config.auto_trigger_min_chars = parse_var("SENTILENS_AUTO_TRIGGER_MIN_CHARS", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_BULK_MAX_LINES") {
            config.bulk_max_lines = parse_var("SENTILENS_BULK_MAX_LINES", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_BULK_MIN_LINE_CHARS") {
            config.bulk_min_line_chars = parse_var("SENTILENS_BULK_MIN_LINE_CHARS", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_TREND_WINDOW") {
            config.trend_window = parse_var("SENTILENS_TREND_WINDOW", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_BUBBLE_LIMIT") {
            config.bubble_limit = parse_var("SENTILENS_BUBBLE_LIMIT", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_RADAR_FLOOR") {
            config.radar_floor = parse_var("SENTILENS_RADAR_FLOOR", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_var("SENTILENS_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SENTILENS_FLASH_MODEL") {
            config.flash_model = v;
        }
        if let Some(v) = lookup("SENTILENS_PRO_MODEL") {
            config.pro_model = v;
        }
        if let Some(v) = lookup("SENTILENS_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(v));
        }

        config.api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> DashboardResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DashboardError::config(format!("{} has invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.debounce_ms, 1500);
        assert_eq!(config.auto_trigger_min_chars, 20);
        assert_eq!(config.bulk_max_lines, 10);
        assert_eq!(config.trend_window, 15);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SENTILENS_DEBOUNCE_MS", "200"),
            ("SENTILENS_PRO_MODEL", "gemini-exp"),
            ("GEMINI_API_KEY", "abc"),
        ]
        .into_iter()
        .collect();

        let config = DashboardConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.debounce_ms, 200);
        assert_eq!(config.pro_model, "gemini-exp");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_analytics_and_bulk_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SENTILENS_BULK_MIN_LINE_CHARS", "2"),
            ("SENTILENS_TREND_WINDOW", "30"),
            ("SENTILENS_BUBBLE_LIMIT", " 5 "),
            ("SENTILENS_RADAR_FLOOR", "20"),
        ]
        .into_iter()
        .collect();

        let config = DashboardConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bulk_min_line_chars, 2);
        assert_eq!(config.trend_window, 30);
        assert_eq!(config.bubble_limit, 5);
        assert_eq!(config.radar_floor, 20);
        assert_eq!(config.bulk_max_lines, 10);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let result = DashboardConfig::from_lookup(|k| {
            (k == "SENTILENS_BULK_MAX_LINES").then(|| "ten".to_string())
        });
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = DashboardConfig::from_lookup(|k| (k == "GEMINI_API_KEY").then(|| "  ".to_string())).unwrap();
        assert!(config.api_key.is_none());
    }
}
