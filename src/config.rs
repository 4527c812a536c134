use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            max_upload_bytes: 20 * 1024 * 1024, // Gemini inline_data limit
        }
    }
}

impl AppSettings {
    pub fn gemini_configured(&self) -> bool {
        !self.gemini_api_key.is_empty() && self.gemini_api_key != PLACEHOLDER_KEY
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply environment overrides (env vars take priority over the file).
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini_api_key = key.trim().to_string();
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if let Some(url) = var("GEMINI_BASE_URL") {
            self.gemini_base_url = url;
        }
        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(dir) = var("BLOODLENS_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(mb) = var("BLOODLENS_MAX_UPLOAD_MB") {
            let mb: usize = mb
                .trim()
                .parse()
                .with_context(|| format!("Invalid BLOODLENS_MAX_UPLOAD_MB: {}", mb))?;
            self.max_upload_bytes = mb
                .checked_mul(1024 * 1024)
                .with_context(|| format!("BLOODLENS_MAX_UPLOAD_MB too large: {}", mb))?;
        }
        Ok(())
    }
}

/// `<config_dir>/bloodlens/settings.json`
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bloodlens").join("settings.json"))
}

fn read_settings_file(path: &std::path::Path) -> Result<AppSettings> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse settings: {}", path.display()))
}

/// Load settings from disk if present, or defaults, then apply env vars.
pub fn load() -> Result<AppSettings> {
    let mut settings = match settings_path() {
        Some(path) if path.exists() => {
            log::info!("Loading settings from {}", path.display());
            read_settings_file(&path)?
        }
        _ => AppSettings::default(),
    };

    settings.apply_env(|name| std::env::var(name).ok())?;
    Ok(settings)
}
