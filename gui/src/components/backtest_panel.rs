// Backtest panel: strategy, date range and the last result
#![allow(non_snake_case)]
use dioxus::prelude::*;

use shared::models::{Strategy, StrategyResult, TradeSignal};
use shared::utils::{format_day, parse_date};

use crate::config::theme::ThemePalette;
use crate::state::app_state::{AppState, ChartCommand};

/// Dated buy and sell signals; holds are left out.
pub fn trade_rows(result: &StrategyResult) -> Vec<(String, TradeSignal)> {
    result
        .dates
        .iter()
        .zip(result.signals.iter())
        .filter(|(_, signal)| **signal != TradeSignal::Hold)
        .map(|(date, signal)| (date.clone(), *signal))
        .collect()
}

#[component]
pub fn BacktestPanel() -> Element {
    let mut state = use_context::<AppState>();
    let theme = use_context::<ThemePalette>();
    if !(state.backtest_open)() {
        return None;
    }

    let (store, result) = {
        let snapshot = state.snapshot.read();
        (snapshot.backtest.clone(), snapshot.backtest_result.clone())
    };
    let valid = store.is_valid_date_range();
    let from = format_day(&store.from());
    let to = format_day(&store.to());
    let input_style = format!(
        "background: {}; color: {}; border: 1px solid {}; padding: 3px;",
        theme.background, theme.foreground, theme.border
    );

    rsx! {
        div {
            class: "backtest-panel",
            style: "position: fixed; bottom: 16px; right: 16px; z-index: 950; width: 340px; max-height: 60%; overflow-y: auto; padding: 10px; background: {theme.panel}; color: {theme.foreground}; border: 1px solid {theme.border}; border-radius: 6px;",
            div {
                style: "display: flex; justify-content: space-between; margin-bottom: 8px;",
                strong { "Backtest" }
                button {
                    style: "background: none; border: none; color: {theme.muted}; cursor: pointer;",
                    onclick: move |_| state.backtest_open.set(false),
                    "×"
                }
            }
            div {
                style: "display: grid; grid-template-columns: 60px 1fr; gap: 6px; align-items: center;",
                label { "Strategy" }
                select {
                    style: "{input_style}",
                    onchange: move |evt| match evt.value().parse::<Strategy>() {
                        Ok(strategy) => state.send(ChartCommand::SetBacktestStrategy(strategy)),
                        Err(e) => tracing::warn!(error = %e, "Unknown strategy selected"),
                    },
                    for strategy in Strategy::ALL {
                        option {
                            key: "{strategy}",
                            value: "{strategy}",
                            selected: strategy == store.strategy(),
                            "{strategy}"
                        }
                    }
                }
                label { "From" }
                input {
                    r#type: "date",
                    style: "{input_style}",
                    value: "{from}",
                    onchange: move |evt| {
                        if let Ok(date) = parse_date(&evt.value()) {
                            state.send(ChartCommand::SetBacktestFrom(date));
                        }
                    },
                }
                label { "To" }
                input {
                    r#type: "date",
                    style: "{input_style}",
                    value: "{to}",
                    onchange: move |evt| {
                        if let Ok(date) = parse_date(&evt.value()) {
                            state.send(ChartCommand::SetBacktestTo(date));
                        }
                    },
                }
            }
            if !valid {
                div { style: "color: {theme.chart_bearish}; margin-top: 6px; font-size: 12px;", "Pick a range of at least three months." }
            }
            button {
                style: "margin-top: 8px; width: 100%; padding: 6px; background: {theme.accent}; color: {theme.background}; border: none; cursor: pointer;",
                disabled: !valid,
                onclick: move |_| state.send(ChartCommand::RunBacktest),
                "Run {store.strategy()}"
            }
            if let Some(result) = result {
                BacktestResultView { result }
            }
        }
    }
}

#[component]
fn BacktestResultView(result: StrategyResult) -> Element {
    let theme = use_context::<ThemePalette>();
    let rows = trade_rows(&result);

    rsx! {
        div {
            style: "margin-top: 10px; font-size: 12px;",
            div { "Trades: {result.num_trades} ({result.winning_trades} won, {result.losing_trades} lost)" }
            div { "Win rate: {result.winning_percentage:.1}%" }
            div { "Profit factor: {result.profit_factor:.2}" }
            div { "Final capital: {result.final_capital:.2}" }
            div { "Return: {result.total_return_percentage:.2}%" }
            table {
                style: "width: 100%; margin-top: 6px; border-collapse: collapse;",
                for (i, (date, signal)) in rows.into_iter().enumerate() {
                    {
                        let color = if signal == TradeSignal::Buy { theme.chart_bullish.clone() } else { theme.chart_bearish.clone() };
                        rsx! {
                            tr {
                                key: "{i}",
                                td { "{date}" }
                                td { style: "color: {color};", "{signal.as_str()}" }
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

    #[test]
    fn holds_are_not_listed() {
        let result = StrategyResult {
            signals: vec![TradeSignal::Hold, TradeSignal::Buy, TradeSignal::Hold, TradeSignal::Sell],
            dates: vec![
                "2023-01-02".into(),
                "2023-01-03".into(),
                "2023-01-04".into(),
                "2023-01-05".into(),
            ],
            num_trades: 1,
            winning_trades: 1,
            losing_trades: 0,
            winning_percentage: 100.0,
            profit_factor: 39.0,
            final_capital: 100_039.0,
            total_return_percentage: 0.039,
        };

        assert_eq!(
            trade_rows(&result),
            vec![
                ("2023-01-03".to_string(), TradeSignal::Buy),
                ("2023-01-05".to_string(), TradeSignal::Sell),
            ]
        );
    }
}
