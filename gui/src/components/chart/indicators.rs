// Indicator overlays: one line or histogram per chart layer, each autoscaled
// inside the band its scale margins leave free.
#![allow(non_snake_case)]
use dioxus::prelude::*;

use chart::{ChartPoint, ScaleMargins, SeriesKind, SeriesLayer};

use super::geometry::{candle_width, Band, TimeAxis, ValueAxis};

/// Polyline `points` attribute for the samples inside the time axis.
pub fn polyline_points(points: &[ChartPoint], time_axis: &TimeAxis, value_axis: &ValueAxis) -> String {
    points
        .iter()
        .filter(|p| time_axis.contains(p.time) && p.value.is_finite())
        .map(|p| format!("{:.2},{:.2}", time_axis.x(p.time), value_axis.y(p.value)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[component]
pub fn IndicatorLayer(layer: SeriesLayer, margins: ScaleMargins, time_axis: TimeAxis, height: f64) -> Element {
    let visible: Vec<ChartPoint> = layer
        .points
        .iter()
        .copied()
        .filter(|p| time_axis.contains(p.time))
        .collect();
    let band = Band::from_margins(margins, height);
    let baseline = matches!(layer.kind, SeriesKind::Histogram).then_some(0.0);
    let value_axis = ValueAxis::fit(visible.iter().map(|p| p.value).chain(baseline), band)?;

    match layer.kind {
        SeriesKind::Line => {
            let points = polyline_points(&visible, &time_axis, &value_axis);
            rsx! {
                polyline {
                    points: "{points}",
                    fill: "none",
                    stroke: "{layer.color}",
                    stroke_width: "1.5",
                }
            }
        }
        SeriesKind::Histogram => {
            let bar = candle_width(visible.len(), time_axis.width);
            let zero = value_axis.y(0.0);
            rsx! {
                g {
                    opacity: "0.6",
                    for point in visible.iter() {
                        {
                            let y = value_axis.y(point.value);
                            rsx! {
                                rect {
                                    key: "{point.time}",
                                    x: "{time_axis.x(point.time) - bar / 2.0}",
                                    y: "{y.min(zero)}",
                                    width: "{bar}",
                                    height: "{(zero - y).abs().max(1.0)}",
                                    fill: "{layer.color}",
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
