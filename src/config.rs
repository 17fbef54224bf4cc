use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{GREEN, RESET};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub quiet: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            date_format: default_date_format(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            display: DisplayConfig::default(),
            search: SearchConfig::default(),
            quiet: false,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_color() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

const fn default_page_size() -> usize {
    50
}

pub fn load_config() -> Result<Config> {
    let (cfg, _) = load_config_with_status()?;
    Ok(cfg)
}

pub fn load_config_with_status() -> Result<(Config, bool)> {
    let path = config_path()?;
    if !path.exists() {
        return Ok((Config::default(), false));
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let cfg = parse_config(&data)?;
    Ok((cfg, true))
}

fn parse_config(data: &str) -> Result<Config> {
    serde_yaml::from_str(data).with_context(|| "failed to parse configuration from YAML".to_string())
}

pub fn config_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("failed to determine home directory")?;
    Ok(base.home_dir().join(".antbox-cli.yaml"))
}

pub fn create_default_config_file() -> Result<PathBuf> {
    let path = config_path()?;
    let cfg = Config::default();
    let yaml = serde_yaml::to_string(&cfg)?;
    fs::write(&path, yaml)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(path)
}

pub fn display_settings() -> Result<()> {
    let path = config_path()?;
    let (config, existed) = load_config_with_status()?;

    if !existed {
        println!("📝 Configuration file not found. Creating default configuration...\n");
        let created_path = create_default_config_file()?;
        println!(
            "✅ Created default configuration at: {}\n",
            created_path.display()
        );
    }

    println!("🔧 Antbox CLI Settings");
    println!("══════════════════════\n");
    println!("📍 Config file: {}\n", path.display());

    let row = |key: &str, value: String| {
        println!("  • {green}{key}{reset}: {value}", green = GREEN, reset = RESET);
    };

    println!("🔘 Verbosity:");
    row("quiet", config.quiet.to_string());
    println!();

    println!("🌐 HTTP:");
    row("http.timeout_secs", config.http.timeout_secs.to_string());
    println!();

    println!("🖥  Display:");
    row("display.color", config.display.color.to_string());
    row("display.date_format", format!("{:?}", config.display.date_format));
    println!();

    println!("🔍 Search:");
    row("search.page_size", config.search.page_size.to_string());
    println!();

    println!("💡 Edit {} and restart the shell to apply changes.", path.display());
    Ok(())
}

pub fn print_config_error(err: &anyhow::Error) {
    eprintln!("❌ Failed to load configuration: {err:#}");
}
