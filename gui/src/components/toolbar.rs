// Toolbar: symbol search, timeframe switcher and panel toggles
#![allow(non_snake_case)]
use dioxus::prelude::*;

use chart::stores::TimeframeStore;
use shared::models::TimeFrame;
use shared::utils::format_day;

use super::search_bar::SearchBar;
use crate::config::theme::ThemePalette;
use crate::state::app_state::{AppState, ChartCommand};

/// "2014-01-01 to 2024-05-10": the request window of the active timeframe.
pub fn period_label(store: &TimeframeStore) -> String {
    let (from, to) = store.period();
    format!("{} to {}", format_day(&from), format_day(&to))
}

#[component]
pub fn Toolbar() -> Element {
    let mut state = use_context::<AppState>();
    let theme = use_context::<ThemePalette>();
    let current = state.snapshot.read().timeframe.timeframe();
    let period = period_label(&state.snapshot.read().timeframe);
    let symbol = state
        .snapshot
        .read()
        .watchlist
        .selected()
        .unwrap_or("No symbol")
        .to_string();

    rsx! {
        div {
            class: "toolbar",
            style: "display: flex; align-items: center; gap: 8px; padding: 6px 10px; background: {theme.panel}; border-bottom: 1px solid {theme.border};",
            span { style: "font-weight: bold; min-width: 90px;", "{symbol}" }
            SearchBar {}
            div {
                style: "display: flex; gap: 2px;",
                for timeframe in TimeFrame::ALL {
                    {
                        let style = if timeframe == current {
                            format!("background: {}; color: {}; border: none; padding: 4px 8px;", theme.accent, theme.background)
                        } else {
                            format!("background: none; color: {}; border: none; padding: 4px 8px;", theme.foreground)
                        };
                        rsx! {
                            button {
                                key: "{timeframe}",
                                style: "{style}",
                                onclick: move |_| state.send(ChartCommand::SelectTimeframe(timeframe)),
                                "{timeframe}"
                            }
                        }
                    }
                }
            }
            span { style: "color: {theme.muted}; font-size: 11px;", "{period}" }
            button {
                style: "background: none; color: {theme.foreground}; border: 1px solid {theme.border}; padding: 4px 8px;",
                onclick: move |_| {
                    let open = (state.indicator_menu_open)();
                    state.indicator_menu_open.set(!open);
                },
                "Indicators"
            }
            button {
                style: "background: none; color: {theme.foreground}; border: 1px solid {theme.border}; padding: 4px 8px;",
                onclick: move |_| {
                    let open = (state.backtest_open)();
                    state.backtest_open.set(!open);
                },
                "Backtest"
            }
        }
    }
}
