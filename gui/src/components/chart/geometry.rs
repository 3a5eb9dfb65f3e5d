// Pixel mapping for the SVG chart.
use chart::{ScaleMargins, VisibleRange};

/// Smallest span (seconds) a zoom may shrink the viewport to.
pub const MIN_SPAN_SECS: i64 = 3_600;

/// Vertical band of the chart a scale draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    pub fn from_margins(margins: ScaleMargins, height: f64) -> Self {
        Self {
            top: margins.top * height,
            bottom: height - margins.bottom * height,
        }
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub range: VisibleRange,
    pub width: f64,
}

impl TimeAxis {
    pub fn span(&self) -> i64 {
        (self.range.to - self.range.from).max(1)
    }

    pub fn x(&self, time: i64) -> f64 {
        (time - self.range.from) as f64 / self.span() as f64 * self.width
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.range.from && time <= self.range.to
    }

    /// Seconds represented by one pixel.
    pub fn secs_per_px(&self) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        self.span() as f64 / self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub min: f64,
    pub max: f64,
    pub band: Band,
}

impl ValueAxis {
    /// Fits the axis to `values`. None when there is nothing finite to show.
    pub fn fit<I>(values: I, band: Band) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;
        Some(Self { min, max, band })
    }

    pub fn y(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= f64::EPSILON {
            return self.band.top + self.band.height() / 2.0;
        }
        self.band.bottom - (value - self.min) / span * self.band.height()
    }
}

/// Viewport after dragging `dx` pixels to the right.
pub fn pan_range(range: VisibleRange, dx: f64, width: f64) -> VisibleRange {
    let axis = TimeAxis { range, width };
    let shift = (dx * axis.secs_per_px()).round() as i64;
    VisibleRange {
        from: range.from - shift,
        to: range.to - shift,
    }
}

/// Zooms around the right edge. `steps > 0` zooms out.
pub fn zoom_range(range: VisibleRange, steps: f64, step: f64) -> VisibleRange {
    let span = (range.to - range.from) as f64;
    let scaled = (span * (1.0 + step).powf(steps)).round() as i64;
    VisibleRange {
        from: range.to - scaled.max(MIN_SPAN_SECS),
        to: range.to,
    }
}

/// Body width for `count` evenly spaced candles, with a gap between them.
pub fn candle_width(count: usize, width: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (width / count as f64 * 0.7).clamp(1.0, 24.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn range(days: i64) -> VisibleRange {
        VisibleRange { from: 0, to: days * DAY }
    }

    #[test]
    fn band_honours_margins() {
        let band = Band::from_margins(ScaleMargins::new(0.7, 0.05), 400.0);
        assert_eq!(band.top, 280.0);
        assert_eq!(band.bottom, 380.0);
        assert_eq!(band.height(), 100.0);
    }

    #[test]
    fn time_axis_maps_edges_to_the_frame() {
        let axis = TimeAxis { range: range(10), width: 500.0 };
        assert_eq!(axis.x(0), 0.0);
        assert_eq!(axis.x(10 * DAY), 500.0);
        assert_eq!(axis.x(5 * DAY), 250.0);
        assert!(!axis.contains(11 * DAY));
    }

    #[test]
    fn value_axis_puts_the_maximum_on_top() {
        let band = Band { top: 0.0, bottom: 100.0 };
        let axis = ValueAxis::fit([10.0, 20.0, f64::NAN], band).unwrap();
        assert_eq!(axis.y(20.0), 0.0);
        assert_eq!(axis.y(10.0), 100.0);
        assert_eq!(axis.y(15.0), 50.0);
    }

    #[test]
    fn flat_values_sit_mid_band() {
        let axis = ValueAxis::fit([5.0, 5.0], Band { top: 0.0, bottom: 80.0 }).unwrap();
        assert_eq!(axis.y(5.0), 40.0);
        assert!(ValueAxis::fit(Vec::new(), Band { top: 0.0, bottom: 80.0 }).is_none());
    }

    #[test]
    fn dragging_right_moves_into_the_past() {
        let panned = pan_range(range(10), 50.0, 500.0);
        assert_eq!(panned, VisibleRange { from: -DAY, to: 9 * DAY });
    }

    #[test]
    fn zoom_keeps_the_right_edge() {
        let zoomed_out = zoom_range(range(10), 1.0, 0.1);
        assert_eq!(zoomed_out.to, 10 * DAY);
        assert_eq!(zoomed_out.from, 10 * DAY - 11 * DAY);

        let tiny = zoom_range(VisibleRange { from: 0, to: 10 }, -1.0, 0.1);
        assert_eq!(tiny.to - tiny.from, MIN_SPAN_SECS);
    }

    #[test]
    fn candle_width_is_clamped() {
        assert_eq!(candle_width(0, 500.0), 0.0);
        assert_eq!(candle_width(10, 100.0), 7.0);
        assert_eq!(candle_width(1, 1000.0), 24.0);
        assert_eq!(candle_width(10_000, 100.0), 1.0);
    }
}
