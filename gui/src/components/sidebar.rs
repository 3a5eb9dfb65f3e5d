// Watchlist sidebar
#![allow(non_snake_case)]
use dioxus::prelude::*;

use crate::config::theme::ThemePalette;
use crate::state::app_state::{AppState, ChartCommand};

#[component]
pub fn Sidebar() -> Element {
    let state = use_context::<AppState>();
    let theme = use_context::<ThemePalette>();
    let watchlist = state.snapshot.read().watchlist.clone();

    rsx! {
        div {
            class: "sidebar",
            style: "width: 160px; display: flex; flex-direction: column; background: {theme.panel}; border-right: 1px solid {theme.border}; overflow-y: auto;",
            div { style: "padding: 8px; color: {theme.muted}; font-size: 11px; text-transform: uppercase;", "Watchlist" }
            if watchlist.labels().is_empty() {
                div { style: "padding: 8px; color: {theme.muted};", "Search a symbol to add it" }
            }
            for label in watchlist.labels().iter().cloned() {
                {
                    let selected = watchlist.selected() == Some(label.as_str());
                    let background = if selected { theme.accent.as_str() } else { "transparent" };
                    let select = label.clone();
                    let remove = label.clone();
                    rsx! {
                        div {
                            key: "{label}",
                            style: "display: flex; justify-content: space-between; padding: 6px 8px; cursor: pointer; background: {background};",
                            onclick: move |_| state.send(ChartCommand::SelectSymbol(select.clone())),
                            span { "{label}" }
                            button {
                                style: "background: none; border: none; color: {theme.muted}; cursor: pointer;",
                                title: "Remove from watchlist",
                                onclick: move |evt| {
                                    evt.stop_propagation();
                                    state.send(ChartCommand::RemoveFromWatchlist(remove.clone()));
                                },
                                "×"
                            }
                        }
                    }
                }
            }
        }
    }
}
