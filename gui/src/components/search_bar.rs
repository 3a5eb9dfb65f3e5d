// Symbol search with a debounced backend lookup
#![allow(non_snake_case)]
use std::time::Duration;

use dioxus::prelude::*;

use crate::config::theme::ThemePalette;
use crate::config::AppConfig;
use crate::state::app_state::{AppState, ChartCommand};

#[component]
pub fn SearchBar() -> Element {
    let state = use_context::<AppState>();
    let config = use_context::<AppConfig>();
    let theme = use_context::<ThemePalette>();
    let mut text = use_signal(String::new);
    // bumped on every keystroke; only the latest pending lookup fires
    let mut generation = use_signal(|| 0u64);
    let debounce = Duration::from_millis(config.search.debounce_ms);

    let search = state.snapshot.read().search.clone();

    rsx! {
        div {
            class: "search-bar",
            style: "position: relative;",
            input {
                r#type: "text",
                value: "{text}",
                placeholder: "Search symbol...",
                style: "width: 200px; padding: 4px 8px; background: {theme.background}; color: {theme.foreground}; border: 1px solid {theme.border}; border-radius: 3px;",
                oninput: move |evt| {
                    let query = evt.value();
                    text.set(query.clone());
                    generation += 1;
                    let mine = generation();
                    spawn(async move {
                        tokio::time::sleep(debounce).await;
                        if generation() == mine {
                            state.send(ChartCommand::Search(query));
                        }
                    });
                },
                onkeydown: move |evt| {
                    if evt.key() == Key::Escape {
                        state.send(ChartCommand::CloseSearch);
                    }
                },
            }
            if search.is_open() {
                ul {
                    class: "search-results",
                    style: "position: absolute; top: 100%; left: 0; z-index: 900; list-style: none; margin: 2px 0 0 0; padding: 0; min-width: 200px; max-height: 260px; overflow-y: auto; background: {theme.panel}; border: 1px solid {theme.border};",
                    for label in search.results().iter().cloned() {
                        li {
                            key: "{label}",
                            style: "padding: 6px 8px; cursor: pointer;",
                            onclick: {
                                let label = label.clone();
                                move |_| {
                                    text.set(String::new());
                                    generation += 1;
                                    state.send(ChartCommand::AddToWatchlist(label.clone()));
                                }
                            },
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}
