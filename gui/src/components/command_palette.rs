// Command palette (VSCode style)
#![allow(non_snake_case)]
use dioxus::prelude::*;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use chart::ChartSnapshot;
use shared::models::{Strategy, TimeFrame};
use shared::{Indicator, PREDEFINED_INDICATORS};

use crate::state::app_state::{AppState, ChartCommand};

#[derive(Debug, Clone, PartialEq)]
pub enum PaletteAction {
    Chart(ChartCommand),
    OpenIndicators,
    OpenBacktest,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub name: String,
    pub description: String,
    pub action: PaletteAction,
}

impl PaletteEntry {
    fn new(name: impl Into<String>, description: impl Into<String>, action: PaletteAction) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            action,
        }
    }
}

/// Every command that makes sense for the current chart.
pub fn palette_entries(snapshot: &ChartSnapshot) -> Vec<PaletteEntry> {
    let mut entries = Vec::new();

    for symbol in snapshot.watchlist.labels() {
        entries.push(PaletteEntry::new(
            format!("Open {}", symbol),
            "Chart a watchlist symbol",
            PaletteAction::Chart(ChartCommand::SelectSymbol(symbol.clone())),
        ));
    }

    for timeframe in TimeFrame::ALL {
        entries.push(PaletteEntry::new(
            format!("Timeframe: {}", timeframe),
            "Change the candle interval",
            PaletteAction::Chart(ChartCommand::SelectTimeframe(timeframe)),
        ));
    }

    for group in PREDEFINED_INDICATORS {
        for variant in group.variants {
            let Ok(indicator) = variant.parse::<Indicator>() else {
                continue;
            };
            let verb = if snapshot.active_indicators.contains(&indicator) { "Remove" } else { "Add" };
            entries.push(PaletteEntry::new(
                format!("{} Indicator: {}", verb, indicator),
                format!("Toggle the {} overlay", group.family),
                PaletteAction::Chart(ChartCommand::ToggleIndicator(indicator)),
            ));
        }
    }

    for strategy in Strategy::ALL {
        entries.push(PaletteEntry::new(
            format!("Backtest Strategy: {}", strategy),
            "Select the strategy for the next backtest",
            PaletteAction::Chart(ChartCommand::SetBacktestStrategy(strategy)),
        ));
    }

    entries.push(PaletteEntry::new(
        "Run Backtest",
        "Backtest the selected strategy on the current symbol",
        PaletteAction::Chart(ChartCommand::RunBacktest),
    ));
    entries.push(PaletteEntry::new("Indicators...", "Open the indicator menu", PaletteAction::OpenIndicators));
    entries.push(PaletteEntry::new("Backtest...", "Open the backtest panel", PaletteAction::OpenBacktest));
    entries.push(PaletteEntry::new("Exit Application", "Close Home Trader", PaletteAction::Exit));
    entries
}

/// Entries matching `filter`, best match first. An empty filter keeps the
/// original order.
pub fn filter_entries(entries: &[PaletteEntry], filter: &str) -> Vec<PaletteEntry> {
    if filter.trim().is_empty() {
        return entries.to_vec();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &PaletteEntry)> = entries
        .iter()
        .filter_map(|entry| matcher.fuzzy_match(&entry.name, filter.trim()).map(|score| (score, entry)))
        .collect();
    // stable sort keeps ties in definition order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, entry)| entry.clone()).collect()
}

fn dispatch(mut state: AppState, action: PaletteAction) {
    state.palette_open.set(false);
    match action {
        PaletteAction::Chart(command) => state.send(command),
        PaletteAction::OpenIndicators => state.indicator_menu_open.set(true),
        PaletteAction::OpenBacktest => state.backtest_open.set(true),
        PaletteAction::Exit => {
            tracing::info!("Exit requested from the command palette");
            dioxus_desktop::window().close();
        }
    }
}

#[component]
pub fn CommandPalette() -> Element {
    let mut state = use_context::<AppState>();
    let mut filter_text = use_signal(String::new);
    let mut selected_index = use_signal(|| 0usize);

    if !(state.palette_open)() {
        return None;
    }

    let entries = palette_entries(&state.snapshot.read());
    let filtered = filter_entries(&entries, &filter_text.read());
    let selected = selected_index().min(filtered.len().saturating_sub(1));

    let keyboard_entries = filtered.clone();
    let handle_keydown = move |evt: KeyboardEvent| {
        let count = keyboard_entries.len();
        match evt.key() {
            Key::Escape => {
                state.palette_open.set(false);
                filter_text.set(String::new());
            }
            Key::ArrowDown if count > 0 => selected_index.set((selected + 1) % count),
            Key::ArrowUp if count > 0 => selected_index.set((selected + count - 1) % count),
            Key::Enter => {
                if let Some(entry) = keyboard_entries.get(selected) {
                    filter_text.set(String::new());
                    selected_index.set(0);
                    dispatch(state, entry.action.clone());
                }
            }
            _ => {}
        }
    };

    rsx! {
        div {
            class: "command-palette",
            style: "position: fixed; top: 10%; left: 50%; transform: translateX(-50%); background-color: #333; color: #eee; border: 1px solid #555; padding: 15px; z-index: 1000; width: 600px; border-radius: 8px; box-shadow: 0 5px 15px rgba(0,0,0,0.5);",
            onkeydown: handle_keydown,
            input {
                id: "command-palette-input",
                r#type: "text",
                value: "{filter_text}",
                placeholder: "Type a command...",
                autofocus: true,
                style: "width: calc(100% - 20px); padding: 10px; margin-bottom: 10px; background-color: #444; color: #eee; border: 1px solid #666; border-radius: 4px;",
                oninput: move |evt| {
                    filter_text.set(evt.value());
                    selected_index.set(0);
                },
            }
            ul {
                style: "list-style: none; padding: 0; margin: 0; max-height: 300px; overflow-y: auto;",
                if filtered.is_empty() {
                    li { style: "padding: 8px; color: #888;", "No commands match your search." }
                }
                for (idx, entry) in filtered.into_iter().enumerate() {
                    {
                        let background = if idx == selected { "#555" } else { "transparent" };
                        let action = entry.action.clone();
                        rsx! {
                            li {
                                key: "{entry.name}",
                                style: "padding: 10px 12px; cursor: pointer; border-radius: 3px; background-color: {background};",
                                onmouseenter: move |_| selected_index.set(idx),
                                onclick: move |_| {
                                    filter_text.set(String::new());
                                    selected_index.set(0);
                                    dispatch(state, action.clone());
                                },
                                div { style: "font-weight: bold;", "{entry.name}" }
                                div { style: "font-size: 0.9em; color: #aaa;", "{entry.description}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart::stores::WatchlistStore;

    fn snapshot() -> ChartSnapshot {
        ChartSnapshot {
            watchlist: WatchlistStore::new(vec!["AAPL".into(), "PETR4.SA".into()]),
            active_indicators: vec![Indicator::Sma(21)],
            ..ChartSnapshot::default()
        }
    }

    #[test]
    fn entries_cover_symbols_timeframes_and_indicators() {
        let entries = palette_entries(&snapshot());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert!(names.contains(&"Open PETR4.SA"));
        assert!(names.contains(&"Timeframe: 1WK"));
        assert!(names.contains(&"Remove Indicator: SMA 21"));
        assert!(names.contains(&"Add Indicator: MACD 12 26 9"));
        assert!(names.contains(&"Run Backtest"));
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let entries = palette_entries(&snapshot());
        assert_eq!(filter_entries(&entries, "  "), entries);
    }

    #[test]
    fn fuzzy_filter_finds_the_indicator() {
        let entries = palette_entries(&snapshot());
        let filtered = filter_entries(&entries, "rsi 14");

        assert!(!filtered.is_empty());
        assert_eq!(
            filtered[0].action,
            PaletteAction::Chart(ChartCommand::ToggleIndicator(Indicator::Rsi(14)))
        );
    }

    #[test]
    fn unmatched_filter_is_empty() {
        let entries = palette_entries(&snapshot());
        assert!(filter_entries(&entries, "zzzzqqq").is_empty());
    }
}
