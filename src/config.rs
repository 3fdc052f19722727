//! Application configuration.
//!
//! Settings come from an optional `config.toml` in the user config
//! directory, overridden by command line flags:
//!
//! ```toml
//! server_url = "http://nas.local:8080/api/v1"
//! thumb_size = 3
//! request_timeout_secs = 20
//! thumbnail_cache = true
//! ```

use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "sd-gallery";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_THUMB_SIZE: u8 = 2;

pub const USAGE: &str = "\
Usage: sd-gallery [--url <base-url>] [--thumb-size <1-4>]

Options:
  --url <base-url>     Backend API root (default: http://localhost:8080/api/v1)
  --thumb-size <1-4>   Initial thumbnail size
  -h, --help           Print this help

Set RUST_LOG (e.g. RUST_LOG=sd_gallery=debug) to change log verbosity.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub thumb_size: Option<u8>,
    /// No timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub thumbnail_cache: Option<bool>,
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Load the user's config file, or defaults when there is none
pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Command line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub help: bool,
    pub url: Option<String>,
    pub thumb_size: Option<u8>,
}

impl CliArgs {
    pub fn from_env() -> Result<Self> {
        Self::parse(pico_args::Arguments::from_env())
    }

    pub fn from_vec(args: Vec<OsString>) -> Result<Self> {
        Self::parse(pico_args::Arguments::from_vec(args))
    }

    fn parse(mut args: pico_args::Arguments) -> Result<Self> {
        let cli = CliArgs {
            help: args.contains(["-h", "--help"]),
            url: args.opt_value_from_str("--url")?,
            thumb_size: args.opt_value_from_str("--thumb-size")?,
        };

        let rest = args.finish();
        if !rest.is_empty() {
            tracing::warn!("Ignoring unexpected arguments: {:?}", rest);
        }
        Ok(cli)
    }
}

/// Effective settings after merging defaults, config file and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub thumb_size: u8,
    pub request_timeout: Option<Duration>,
    pub thumbnail_cache: bool,
}

impl Settings {
    /// Flags win over the config file, which wins over defaults
    pub fn resolve(config: Config, cli: CliArgs) -> Self {
        Self {
            server_url: cli
                .url
                .or(config.server_url)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            thumb_size: cli
                .thumb_size
                .or(config.thumb_size)
                .unwrap_or(DEFAULT_THUMB_SIZE),
            request_timeout: config
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            thumbnail_cache: config.thumbnail_cache.unwrap_or(true),
        }
    }
}
