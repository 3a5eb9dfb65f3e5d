// Fixed-lot trade simulator shared by every strategy
use shared::models::{Candle, StrategyResult, TradeSignal};
use shared::utils::format_day;

pub const INITIAL_CAPITAL: f64 = 100_000.0;
pub const LOT_SIZE: f64 = 20.0;
/// Charged on each side of a trade.
pub const COMMISSION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Position {
    Flat,
    Long { entry: f64 },
    Short { entry: f64 },
}

#[derive(Debug, Default)]
struct Tally {
    num_trades: u32,
    winning_trades: u32,
    losing_trades: u32,
    profit: f64,
    loss: f64,
}

impl Tally {
    fn record(&mut self, trade_profit: f64) {
        if trade_profit > 0.0 {
            self.winning_trades += 1;
            self.profit += trade_profit;
        } else {
            self.losing_trades += 1;
            self.loss -= trade_profit;
        }
    }
}

/// Replays `signals` against the closes of `data`. A buy opens a long or
/// closes a short, a sell opens a short or closes a long. A position still
/// open at the end is closed at the last close but not counted as won or lost.
pub fn calculate_performance(data: &[Candle], signals: &[TradeSignal]) -> StrategyResult {
    let mut capital = INITIAL_CAPITAL;
    let mut position = Position::Flat;
    let mut tally = Tally::default();

    for (candle, signal) in data.iter().zip(signals) {
        let price = candle.close;
        position = match (position, signal) {
            (Position::Flat, TradeSignal::Buy) => {
                capital -= COMMISSION;
                tally.num_trades += 1;
                tracing::trace!(price, capital, "Opening long position");
                Position::Long { entry: price }
            }
            (Position::Flat, TradeSignal::Sell) => {
                capital -= COMMISSION;
                tally.num_trades += 1;
                tracing::trace!(price, capital, "Opening short position");
                Position::Short { entry: price }
            }
            (Position::Long { entry }, TradeSignal::Sell) => {
                let gross = LOT_SIZE * (price - entry);
                capital += gross - COMMISSION;
                tally.record(gross - 2.0 * COMMISSION);
                tracing::trace!(price, capital, "Closing long position");
                Position::Flat
            }
            (Position::Short { entry }, TradeSignal::Buy) => {
                let gross = LOT_SIZE * (entry - price);
                capital += gross - COMMISSION;
                tally.record(gross - 2.0 * COMMISSION);
                tracing::trace!(price, capital, "Closing short position");
                Position::Flat
            }
            (unchanged, _) => unchanged,
        };
    }

    let last_close = data.last().map(|c| c.close).unwrap_or_default();
    let final_capital = match position {
        Position::Flat => capital,
        Position::Long { entry } => capital + LOT_SIZE * (last_close - entry) - COMMISSION,
        Position::Short { entry } => capital + LOT_SIZE * (entry - last_close) - COMMISSION,
    };

    let winning_percentage = if tally.num_trades > 0 {
        tally.winning_trades as f64 / tally.num_trades as f64 * 100.0
    } else {
        0.0
    };
    let profit_factor = if tally.loss > 0.0 { tally.profit / tally.loss } else { tally.profit };

    StrategyResult {
        signals: signals.to_vec(),
        dates: data.iter().map(|c| format_day(&c.time)).collect(),
        num_trades: tally.num_trades,
        winning_trades: tally.winning_trades,
        losing_trades: tally.losing_trades,
        winning_percentage,
        profit_factor,
        final_capital,
        total_return_percentage: (final_capital / INITIAL_CAPITAL - 1.0) * 100.0,
    }
}
