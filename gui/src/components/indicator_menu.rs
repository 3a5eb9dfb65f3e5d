// Indicator menu: the predefined overlays, grouped by family
#![allow(non_snake_case)]
use dioxus::prelude::*;

use shared::{Indicator, IndicatorFamily, PREDEFINED_INDICATORS};

use crate::config::theme::ThemePalette;
use crate::state::app_state::{AppState, ChartCommand};

#[derive(Debug, Clone, PartialEq)]
pub struct MenuGroup {
    pub family: IndicatorFamily,
    pub items: Vec<(Indicator, bool)>,
}

/// Menu groups with each variant flagged when it is on the chart.
pub fn menu_groups(active: &[Indicator]) -> Vec<MenuGroup> {
    PREDEFINED_INDICATORS
        .iter()
        .map(|group| MenuGroup {
            family: group.family,
            items: group
                .variants
                .iter()
                .filter_map(|variant| variant.parse::<Indicator>().ok())
                .map(|indicator| (indicator, active.contains(&indicator)))
                .collect(),
        })
        .collect()
}

#[component]
pub fn IndicatorMenu() -> Element {
    let mut state = use_context::<AppState>();
    let theme = use_context::<ThemePalette>();
    if !(state.indicator_menu_open)() {
        return None;
    }
    let groups = menu_groups(&state.snapshot.read().active_indicators);

    rsx! {
        div {
            class: "indicator-menu",
            style: "position: fixed; top: 48px; right: 16px; z-index: 950; width: 260px; max-height: 70%; overflow-y: auto; padding: 10px; background: {theme.panel}; color: {theme.foreground}; border: 1px solid {theme.border}; border-radius: 6px;",
            onkeydown: move |evt| {
                if evt.key() == Key::Escape {
                    state.indicator_menu_open.set(false);
                }
            },
            div {
                style: "display: flex; justify-content: space-between; margin-bottom: 6px;",
                strong { "Indicators" }
                button {
                    style: "background: none; border: none; color: {theme.muted}; cursor: pointer;",
                    onclick: move |_| state.indicator_menu_open.set(false),
                    "×"
                }
            }
            for group in groups {
                div {
                    key: "{group.family}",
                    style: "margin-bottom: 8px;",
                    div { style: "color: {theme.muted}; font-size: 11px; margin-bottom: 2px;", "{group.family}" }
                    div {
                        style: "display: flex; flex-wrap: wrap; gap: 4px;",
                        for (indicator, active) in group.items {
                            {
                                let background = if active { theme.accent.as_str() } else { "transparent" };
                                rsx! {
                                    button {
                                        key: "{indicator}",
                                        style: "padding: 3px 6px; border: 1px solid {theme.border}; color: {theme.foreground}; background: {background}; cursor: pointer;",
                                        onclick: move |_| state.send(ChartCommand::ToggleIndicator(indicator)),
                                        "{indicator}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
