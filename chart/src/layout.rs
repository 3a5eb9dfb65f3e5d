// Vertical space allocation between the price pane and indicator panes.
//
// Oscillators (RSI, MACD) get a lower band; moving averages share the price
// pane and volume stacks just above the oscillator band.
use std::fmt;

use shared::IndicatorFamily;

use crate::surface::ChartSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScaleId {
    Price,
    Ma,
    Volume,
    Rsi,
    MacdLine,
    SignalLine,
    MacdHistogram,
}

impl ScaleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleId::Price => "price",
            ScaleId::Ma => "ma",
            ScaleId::Volume => "volume",
            ScaleId::Rsi => "rsi",
            ScaleId::MacdLine => "macdLine",
            ScaleId::SignalLine => "signalLine",
            ScaleId::MacdHistogram => "macdHistogram",
        }
    }
}

impl fmt::Display for ScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraction of the chart height left empty above and below a scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMargins {
    pub top: f64,
    pub bottom: f64,
}

impl ScaleMargins {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

const PRICE_ALONE: ScaleMargins = ScaleMargins::new(0.0, 0.05);
const PRICE_WITH_OSCILLATOR: ScaleMargins = ScaleMargins::new(0.0, 0.3);
const VOLUME_ALONE: ScaleMargins = ScaleMargins::new(0.7, 0.0);
const VOLUME_WITH_OSCILLATOR: ScaleMargins = ScaleMargins::new(0.6, 0.3);
const RSI_ALONE: ScaleMargins = ScaleMargins::new(0.7, 0.05);
const RSI_WITH_MACD: ScaleMargins = ScaleMargins::new(0.7, 0.15);
const MACD_ALONE: ScaleMargins = ScaleMargins::new(0.7, 0.05);
const MACD_WITH_RSI: ScaleMargins = ScaleMargins::new(0.85, 0.0);

/// Margins for every scale that should currently be laid out.
/// Derived from the active family set, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleAllocation {
    entries: Vec<(ScaleId, ScaleMargins)>,
}

impl ScaleAllocation {
    pub fn compute<I>(families: I) -> Self
    where
        I: IntoIterator<Item = IndicatorFamily>,
    {
        let (mut has_rsi, mut has_macd, mut has_ma, mut has_volume) = (false, false, false, false);
        for family in families {
            match family {
                IndicatorFamily::Rsi => has_rsi = true,
                IndicatorFamily::Macd => has_macd = true,
                IndicatorFamily::Sma | IndicatorFamily::Ema => has_ma = true,
                IndicatorFamily::Volume => has_volume = true,
            }
        }
        let has_oscillator = has_rsi || has_macd;

        let price = if has_oscillator { PRICE_WITH_OSCILLATOR } else { PRICE_ALONE };
        let mut entries = vec![(ScaleId::Price, price)];

        if has_ma {
            entries.push((ScaleId::Ma, price));
        }
        if has_volume {
            let volume = if has_oscillator { VOLUME_WITH_OSCILLATOR } else { VOLUME_ALONE };
            entries.push((ScaleId::Volume, volume));
        }
        if has_rsi {
            entries.push((ScaleId::Rsi, if has_macd { RSI_WITH_MACD } else { RSI_ALONE }));
        }
        if has_macd {
            let macd = if has_rsi { MACD_WITH_RSI } else { MACD_ALONE };
            entries.push((ScaleId::MacdLine, macd));
            entries.push((ScaleId::MacdHistogram, macd));
            entries.push((ScaleId::SignalLine, macd));
        }

        Self { entries }
    }

    pub fn margins(&self, scale: ScaleId) -> Option<ScaleMargins> {
        self.entries
            .iter()
            .find(|(id, _)| *id == scale)
            .map(|(_, margins)| *margins)
    }

    pub fn entries(&self) -> &[(ScaleId, ScaleMargins)] {
        &self.entries
    }

    pub fn apply<S: ChartSurface + ?Sized>(&self, surface: &mut S) {
        for (scale, margins) in &self.entries {
            surface.apply_scale_margins(*scale, *margins);
        }
    }
}
