// Colours used by the component styles
use super::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemePalette {
    pub background: String,
    pub panel: String,
    pub foreground: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub chart_background: String,
    pub chart_grid: String,
    pub chart_bullish: String,
    pub chart_bearish: String,
}

impl ThemePalette {
    pub fn default_dark() -> Self {
        Self {
            background: "#1e1e1e".to_string(),
            panel: "#252526".to_string(),
            foreground: "#d1d4dc".to_string(),
            muted: "#8a8f98".to_string(),
            accent: "#007acc".to_string(),
            border: "#3c3c3c".to_string(),
            chart_background: "#131722".to_string(),
            chart_grid: "#2a2e39".to_string(),
            chart_bullish: "#26a69a".to_string(),
            chart_bearish: "#ef5350".to_string(),
        }
    }

    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            panel: "#f3f3f3".to_string(),
            foreground: "#1e1e1e".to_string(),
            muted: "#6e6e6e".to_string(),
            accent: "#007acc".to_string(),
            border: "#d4d4d4".to_string(),
            chart_background: "#ffffff".to_string(),
            chart_grid: "#e0e3eb".to_string(),
            chart_bullish: "#4caf50".to_string(),
            chart_bearish: "#f44336".to_string(),
        }
    }

    /// Base palette for `app.theme`, with the chart colours from the config.
    pub fn from_config(config: &AppConfig) -> Self {
        let base = if config.app.theme.eq_ignore_ascii_case("light") {
            Self::default_light()
        } else {
            Self::default_dark()
        };
        Self {
            chart_background: config.chart.background.clone(),
            chart_grid: config.chart.grid_color.clone(),
            chart_bullish: config.chart.bullish_color.clone(),
            chart_bearish: config.chart.bearish_color.clone(),
            ..base
        }
    }
}
