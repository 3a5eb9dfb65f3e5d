// Indicator variants and the "<FAMILY> [params...]" key codec.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorFamily {
    Sma,
    Ema,
    Rsi,
    Macd,
    Volume,
}

impl IndicatorFamily {
    pub const ALL: [IndicatorFamily; 5] = [
        IndicatorFamily::Sma,
        IndicatorFamily::Ema,
        IndicatorFamily::Rsi,
        IndicatorFamily::Macd,
        IndicatorFamily::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorFamily::Sma => "SMA",
            IndicatorFamily::Ema => "EMA",
            IndicatorFamily::Rsi => "RSI",
            IndicatorFamily::Macd => "MACD",
            IndicatorFamily::Volume => "VOLUME",
        }
    }

    /// Number of integer parameters a key of this family carries.
    pub fn param_count(&self) -> usize {
        match self {
            IndicatorFamily::Sma | IndicatorFamily::Ema | IndicatorFamily::Rsi => 1,
            IndicatorFamily::Macd => 3,
            IndicatorFamily::Volume => 0,
        }
    }

    pub fn is_oscillator(&self) -> bool {
        matches!(self, IndicatorFamily::Rsi | IndicatorFamily::Macd)
    }

    pub fn is_moving_average(&self) -> bool {
        matches!(self, IndicatorFamily::Sma | IndicatorFamily::Ema)
    }
}

impl fmt::Display for IndicatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorFamily::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownFamily(s.to_string()))
    }
}

/// A concrete indicator instance. Its `Display` form is the indicator key,
/// so two equal values always render the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Sma(u32),
    Ema(u32),
    Rsi(u32),
    Macd { short: u32, long: u32, signal: u32 },
    Volume,
}

impl Indicator {
    /// Builds an indicator from a family and its period list, the shape the
    /// command boundary uses (`variant`, `lengths`).
    pub fn from_parts(family: IndicatorFamily, lengths: &[u32]) -> Result<Self, ParseError> {
        if lengths.len() != family.param_count() {
            return Err(ParseError::ParamCount {
                family,
                expected: family.param_count(),
                found: lengths.len(),
            });
        }
        if let Some(&zero) = lengths.iter().find(|&&length| length == 0) {
            return Err(ParseError::InvalidParam(zero.to_string()));
        }
        Ok(match family {
            IndicatorFamily::Sma => Indicator::Sma(lengths[0]),
            IndicatorFamily::Ema => Indicator::Ema(lengths[0]),
            IndicatorFamily::Rsi => Indicator::Rsi(lengths[0]),
            IndicatorFamily::Macd => Indicator::Macd {
                short: lengths[0],
                long: lengths[1],
                signal: lengths[2],
            },
            IndicatorFamily::Volume => Indicator::Volume,
        })
    }

    pub fn family(&self) -> IndicatorFamily {
        match self {
            Indicator::Sma(_) => IndicatorFamily::Sma,
            Indicator::Ema(_) => IndicatorFamily::Ema,
            Indicator::Rsi(_) => IndicatorFamily::Rsi,
            Indicator::Macd { .. } => IndicatorFamily::Macd,
            Indicator::Volume => IndicatorFamily::Volume,
        }
    }

    pub fn series_count(&self) -> usize {
        match self {
            Indicator::Macd { .. } => 3,
            _ => 1,
        }
    }

    pub fn lengths(&self) -> Vec<u32> {
        match *self {
            Indicator::Sma(period) | Indicator::Ema(period) | Indicator::Rsi(period) => vec![period],
            Indicator::Macd { short, long, signal } => vec![short, long, signal],
            Indicator::Volume => Vec::new(),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family().as_str())?;
        for length in self.lengths() {
            write!(f, " {}", length)?;
        }
        Ok(())
    }
}

impl FromStr for Indicator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let family: IndicatorFamily = parts
            .next()
            .ok_or(ParseError::EmptyKey)?
            .parse()?;
        let lengths = parts
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| ParseError::InvalidParam(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Indicator::from_parts(family, &lengths)
    }
}

pub struct IndicatorGroup {
    pub family: IndicatorFamily,
    pub variants: &'static [&'static str],
}

/// The indicator menu offered by the front-end.
pub const PREDEFINED_INDICATORS: &[IndicatorGroup] = &[
    IndicatorGroup {
        family: IndicatorFamily::Sma,
        variants: &["SMA 5", "SMA 8", "SMA 13", "SMA 21", "SMA 50", "SMA 100", "SMA 200"],
    },
    IndicatorGroup {
        family: IndicatorFamily::Ema,
        variants: &["EMA 5", "EMA 8", "EMA 13", "EMA 21", "EMA 50", "EMA 100", "EMA 200"],
    },
    IndicatorGroup {
        family: IndicatorFamily::Rsi,
        variants: &["RSI 7", "RSI 14", "RSI 21"],
    },
    IndicatorGroup {
        family: IndicatorFamily::Macd,
        variants: &["MACD 12 26 9"],
    },
    IndicatorGroup {
        family: IndicatorFamily::Volume,
        variants: &["VOLUME"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_into_variants() {
        assert_eq!("EMA 21".parse::<Indicator>().unwrap(), Indicator::Ema(21));
        assert_eq!(
            "MACD 12 26 9".parse::<Indicator>().unwrap(),
            Indicator::Macd { short: 12, long: 26, signal: 9 }
        );
        assert_eq!("VOLUME".parse::<Indicator>().unwrap(), Indicator::Volume);
        assert_eq!("rsi  14".parse::<Indicator>().unwrap(), Indicator::Rsi(14));
    }

    #[test]
    fn display_renders_canonical_key() {
        assert_eq!(Indicator::Sma(200).to_string(), "SMA 200");
        assert_eq!(Indicator::Macd { short: 12, long: 26, signal: 9 }.to_string(), "MACD 12 26 9");
        assert_eq!(Indicator::Volume.to_string(), "VOLUME");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!("".parse::<Indicator>(), Err(ParseError::EmptyKey)));
        assert!(matches!("WMA 10".parse::<Indicator>(), Err(ParseError::UnknownFamily(_))));
        assert!(matches!("SMA".parse::<Indicator>(), Err(ParseError::ParamCount { .. })));
        assert!(matches!("MACD 12 26".parse::<Indicator>(), Err(ParseError::ParamCount { .. })));
        assert!(matches!("VOLUME 3".parse::<Indicator>(), Err(ParseError::ParamCount { .. })));
        assert!(matches!("EMA -3".parse::<Indicator>(), Err(ParseError::InvalidParam(_))));
        assert!(matches!("EMA 0".parse::<Indicator>(), Err(ParseError::InvalidParam(_))));
    }

    #[test]
    fn series_count_per_family() {
        assert_eq!(Indicator::Rsi(14).series_count(), 1);
        assert_eq!(Indicator::Volume.series_count(), 1);
        assert_eq!(Indicator::Macd { short: 12, long: 26, signal: 9 }.series_count(), 3);
    }

    #[test]
    fn every_predefined_variant_parses_into_its_group() {
        for group in PREDEFINED_INDICATORS {
            for variant in group.variants {
                let indicator: Indicator = variant.parse().unwrap();
                assert_eq!(indicator.family(), group.family);
                assert_eq!(indicator.to_string(), *variant);
            }
        }
    }
}
