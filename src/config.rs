// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "QUAKE_FEEDS_PATH";

const USGS_BASE: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// One named feed endpoint. Declaration order inside `endpoints` is the
/// dedup precedence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEndpoint {
    pub name: String,
    pub url: String,
}

impl FeedEndpoint {
    fn usgs(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{USGS_BASE}/{name}.geojson"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Primary feeds, most specific window first.
    pub endpoints: Vec<FeedEndpoint>,
    /// Consulted only when every primary yields nothing usable.
    pub fallback: FeedEndpoint,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Classification used when a record carries none.
    pub default_kind: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                FeedEndpoint::usgs("all_hour"),
                FeedEndpoint::usgs("2.5_day"),
                FeedEndpoint::usgs("4.5_week"),
            ],
            fallback: FeedEndpoint::usgs("significant_month"),
            poll_interval_secs: 120,
            request_timeout_secs: 10,
            default_kind: "earthquake".to_string(),
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Load configuration from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<FeedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load configuration using env var + fallbacks:
/// 1) $QUAKE_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in defaults (the USGS hour/day/week summaries)
pub fn load_config_default() -> Result<FeedConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("QUAKE_FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(FeedConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[endpoints]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed config format"))
}

fn parse_toml(s: &str) -> Result<FeedConfig> {
    Ok(toml::from_str(s)?)
}

fn parse_json(s: &str) -> Result<FeedConfig> {
    Ok(serde_json::from_str(s)?)
}
