// Application state shared through the Dioxus context.
//
// The chart controller lives inside a single coroutine. Components never touch
// it directly: they send `ChartCommand`s and render the `ChartSnapshot` the
// coroutine publishes after every command.
use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use futures::StreamExt;
use tracing::{info, warn};

use chart::{ChartController, ChartError, ChartSnapshot, DataFetch, VisibleRange};
use shared::models::{Strategy, TimeFrame};
use shared::Indicator;

use crate::config::AppConfig;
use crate::services::engine_client::EngineClient;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartCommand {
    SelectSymbol(String),
    SelectTimeframe(TimeFrame),
    ToggleIndicator(Indicator),
    RemoveIndicator(Indicator),
    Pan(VisibleRange),
    Search(String),
    CloseSearch,
    AddToWatchlist(String),
    RemoveFromWatchlist(String),
    RefreshLabels,
    SetBacktestStrategy(Strategy),
    SetBacktestFrom(DateTime<Utc>),
    SetBacktestTo(DateTime<Utc>),
    RunBacktest,
}

/// Runs one command against the controller.
pub async fn apply<F: DataFetch>(
    controller: &mut ChartController<F>,
    command: ChartCommand,
) -> Result<(), ChartError> {
    match command {
        ChartCommand::SelectSymbol(symbol) => controller.select_symbol(&symbol).await,
        ChartCommand::SelectTimeframe(timeframe) => controller.select_timeframe(timeframe).await,
        ChartCommand::ToggleIndicator(indicator) => controller.toggle_indicator(indicator).await,
        ChartCommand::RemoveIndicator(indicator) => {
            controller.remove_indicator(&indicator);
            Ok(())
        }
        ChartCommand::Pan(range) => {
            if controller.pan(range).await? {
                info!(from = range.from, "Loaded older history");
            }
            Ok(())
        }
        ChartCommand::Search(query) => {
            controller.search(&query).await;
            Ok(())
        }
        ChartCommand::CloseSearch => {
            controller.close_search();
            Ok(())
        }
        ChartCommand::AddToWatchlist(label) => controller.add_to_watchlist(&label).await,
        ChartCommand::RemoveFromWatchlist(label) => controller.remove_from_watchlist(&label).await,
        ChartCommand::RefreshLabels => controller.refresh_labels().await,
        ChartCommand::SetBacktestStrategy(strategy) => {
            controller.backtest_mut().set_strategy(strategy);
            Ok(())
        }
        ChartCommand::SetBacktestFrom(from) => {
            controller.backtest_mut().set_from(from);
            Ok(())
        }
        ChartCommand::SetBacktestTo(to) => {
            controller.backtest_mut().set_to(to);
            Ok(())
        }
        ChartCommand::RunBacktest => controller.run_backtest().await,
    }
}

/// Applies `command` and returns the snapshot to publish, with the command's
/// error surfaced when the controller did not record one itself.
pub async fn step<F: DataFetch>(controller: &mut ChartController<F>, command: ChartCommand) -> ChartSnapshot {
    let result = apply(controller, command).await;
    let mut snapshot = controller.snapshot();
    if let Err(e) = result {
        warn!(error = %e, "Chart command failed");
        snapshot.last_error.get_or_insert_with(|| e.to_string());
    }
    snapshot
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub snapshot: Signal<ChartSnapshot>,
    pub commands: Coroutine<ChartCommand>,
    pub palette_open: Signal<bool>,
    pub indicator_menu_open: Signal<bool>,
    pub backtest_open: Signal<bool>,
}

impl AppState {
    pub fn send(&self, command: ChartCommand) {
        self.commands.send(command);
    }

    /// Closes every overlay panel.
    pub fn dismiss_panels(&mut self) {
        self.palette_open.set(false);
        self.indicator_menu_open.set(false);
        self.backtest_open.set(false);
    }
}

/// Creates the app state and starts the coroutine that owns the controller.
pub fn use_app_state_provider(config: &AppConfig) -> AppState {
    let mut snapshot = use_signal(ChartSnapshot::default);
    let endpoint = config.engine.endpoint();
    let palette = config.indicators.clone();

    let commands = use_coroutine(move |mut rx: UnboundedReceiver<ChartCommand>| {
        let endpoint = endpoint.clone();
        let palette = palette.clone();
        async move {
            let client = match EngineClient::new(&endpoint) {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!(endpoint = %endpoint, error = %e, "Invalid engine endpoint");
                    snapshot.write().last_error = Some(e.to_string());
                    return;
                }
            };
            info!(endpoint = client.endpoint(), "Engine client ready");
            let mut controller = ChartController::new(client, palette);
            snapshot.set(step(&mut controller, ChartCommand::RefreshLabels).await);

            while let Some(command) = rx.next().await {
                tracing::debug!(?command, "Chart command");
                snapshot.set(step(&mut controller, command).await);
            }
        }
    });

    let state = AppState {
        snapshot,
        commands,
        palette_open: use_signal(|| false),
        indicator_menu_open: use_signal(|| false),
        backtest_open: use_signal(|| false),
    };
    use_context_provider(|| state)
}
