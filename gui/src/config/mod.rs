// GUI configuration, embedded from assets/config/default.json
pub mod theme;

use serde::Deserialize;

use chart::OverlayPalette;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub version: String,
    pub app: AppSettings,
    pub engine: EngineConnSettings,
    pub chart: ChartConfig,
    pub indicators: OverlayPalette,
    pub search: SearchSettings,
    pub shortcuts: Shortcuts,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub title: String,
    pub theme: String, // "dark" or "light"
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConnSettings {
    pub host: String,
    pub port: u16,
}

impl EngineConnSettings {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    pub background: String,
    pub grid_color: String,
    pub bullish_color: String,
    pub bearish_color: String,
    /// Fraction of the visible span added or removed per wheel notch.
    pub wheel_zoom_step: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchSettings {
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Shortcuts {
    pub command_palette: String,
    pub indicators: String,
    pub backtest: String,
}

impl AppConfig {
    pub fn load_default() -> Result<Self, anyhow::Error> {
        let config_str = include_str!("../../assets/config/default.json");
        let config: AppConfig = serde_json::from_str(config_str)?;
        Ok(config)
    }
}
