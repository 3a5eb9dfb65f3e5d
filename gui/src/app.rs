#![allow(non_snake_case)]
use dioxus::prelude::*;

use crate::components::backtest_panel::BacktestPanel;
use crate::components::chart::ChartView;
use crate::components::command_palette::CommandPalette;
use crate::components::indicator_menu::IndicatorMenu;
use crate::components::sidebar::Sidebar;
use crate::components::toolbar::Toolbar;
use crate::config::theme::ThemePalette;
use crate::config::{AppConfig, Shortcuts};
use crate::state::app_state::use_app_state_provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    TogglePalette,
    ToggleIndicators,
    ToggleBacktest,
}

/// True when `binding` ("Ctrl+K") names `key` with the given Ctrl state.
pub fn matches_binding(binding: &str, key: &Key, ctrl: bool) -> bool {
    let mut wants_ctrl = false;
    let mut wanted = None;
    for part in binding.split('+').map(str::trim) {
        if part.eq_ignore_ascii_case("ctrl") {
            wants_ctrl = true;
        } else {
            wanted = Some(part);
        }
    }
    let Some(wanted) = wanted else {
        return false;
    };
    match key {
        Key::Character(c) => wants_ctrl == ctrl && c.eq_ignore_ascii_case(wanted),
        _ => false,
    }
}

pub fn shortcut_action(shortcuts: &Shortcuts, key: &Key, ctrl: bool) -> Option<ShortcutAction> {
    [
        (shortcuts.command_palette.as_str(), ShortcutAction::TogglePalette),
        (shortcuts.indicators.as_str(), ShortcutAction::ToggleIndicators),
        (shortcuts.backtest.as_str(), ShortcutAction::ToggleBacktest),
    ]
    .into_iter()
    .find(|(binding, _)| matches_binding(binding, key, ctrl))
    .map(|(_, action)| action)
}

#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let theme = use_context_provider(|| ThemePalette::from_config(&config));
    let mut state = use_app_state_provider(&config);
    let shortcuts = config.shortcuts.clone();
    let last_error = state.snapshot.read().last_error.clone();

    rsx! {
        div {
            class: "app",
            tabindex: "0",
            autofocus: true,
            style: "display: flex; flex-direction: column; height: 100vh; margin: 0; outline: none; font-family: sans-serif; background: {theme.background}; color: {theme.foreground};",
            onkeydown: move |evt| {
                if evt.key() == Key::Escape {
                    state.dismiss_panels();
                    return;
                }
                let Some(action) = shortcut_action(&shortcuts, &evt.key(), evt.modifiers().ctrl()) else {
                    return;
                };
                let signal = match action {
                    ShortcutAction::TogglePalette => &mut state.palette_open,
                    ShortcutAction::ToggleIndicators => &mut state.indicator_menu_open,
                    ShortcutAction::ToggleBacktest => &mut state.backtest_open,
                };
                let open = *signal.read();
                signal.set(!open);
            },
            Toolbar {}
            div {
                style: "display: flex; flex: 1; min-height: 0;",
                Sidebar {}
                ChartView {}
            }
            if let Some(message) = last_error {
                div {
                    class: "error-banner",
                    style: "padding: 4px 10px; background: {theme.chart_bearish}; color: #fff; font-size: 12px;",
                    "{message}"
                }
            }
            CommandPalette {}
            IndicatorMenu {}
            BacktestPanel {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcuts() -> Shortcuts {
        AppConfig::load_default().unwrap().shortcuts
    }

    #[test]
    fn ctrl_letter_bindings_match_case_insensitively() {
        let k = Key::Character("k".to_string());
        assert!(matches_binding("Ctrl+K", &k, true));
        assert!(!matches_binding("Ctrl+K", &k, false));
        assert!(!matches_binding("Ctrl+I", &k, true));
        assert!(!matches_binding("Ctrl+", &k, true));
        assert!(!matches_binding("Ctrl+K", &Key::Enter, true));
    }

    #[test]
    fn configured_shortcuts_map_to_actions() {
        let shortcuts = shortcuts();
        let key = |c: &str| Key::Character(c.to_string());

        assert_eq!(shortcut_action(&shortcuts, &key("k"), true), Some(ShortcutAction::TogglePalette));
        assert_eq!(shortcut_action(&shortcuts, &key("I"), true), Some(ShortcutAction::ToggleIndicators));
        assert_eq!(shortcut_action(&shortcuts, &key("b"), true), Some(ShortcutAction::ToggleBacktest));
        assert_eq!(shortcut_action(&shortcuts, &key("b"), false), None);
    }
}
