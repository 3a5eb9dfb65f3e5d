// Chart pane: candles, overlays, drag-to-pan and wheel zoom.
#![allow(non_snake_case)]
pub mod candlestick;
pub mod geometry;
pub mod indicators;

use chrono::DateTime;
use dioxus::prelude::*;

use chart::{CandlePoint, ScaleId, ScaleMargins, VisibleRange};

use crate::config::theme::ThemePalette;
use crate::config::AppConfig;
use crate::state::app_state::{AppState, ChartCommand};

use candlestick::Candles;
use geometry::{pan_range, zoom_range, Band, TimeAxis, ValueAxis};
use indicators::IndicatorLayer;

const PRICE_DEFAULT: ScaleMargins = ScaleMargins::new(0.0, 0.05);
const GRID_LINES: usize = 5;

/// A viewport shown ahead of the controller, valid while the scene still
/// reports `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Preview {
    base: Option<VisibleRange>,
    shown: VisibleRange,
}

#[component]
pub fn ChartView() -> Element {
    let state = use_context::<AppState>();
    let config = use_context::<AppConfig>();
    let theme = use_context::<ThemePalette>();
    let mut size = use_signal(|| (960.0_f64, 560.0_f64));
    let mut drag = use_signal(|| None::<(f64, VisibleRange)>);
    let mut preview = use_signal(|| None::<Preview>);

    let snapshot = state.snapshot.read();
    let scene = &snapshot.scene;
    let scene_range = scene.visible_range();
    let displayed = match preview() {
        Some(p) if p.base == scene_range => Some(p.shown),
        _ => scene_range,
    };
    let (width, height) = size();
    let zoom_step = config.chart.wheel_zoom_step;

    let Some(range) = displayed else {
        return rsx! {
            div {
                class: "chart-empty",
                style: "flex: 1; display: flex; align-items: center; justify-content: center; color: {theme.foreground};",
                "No data"
            }
        };
    };

    let time_axis = TimeAxis { range, width };
    let candles: Vec<CandlePoint> = scene
        .candles()
        .iter()
        .filter(|c| time_axis.contains(c.time))
        .copied()
        .collect();
    let price_band = Band::from_margins(scene.margins(ScaleId::Price).unwrap_or(PRICE_DEFAULT), height);
    let price_axis = ValueAxis::fit(candles.iter().flat_map(|c| [c.low, c.high]), price_band);
    let layers: Vec<_> = scene
        .layers()
        .iter()
        .filter_map(|layer| scene.margins(layer.scale).map(|margins| (layer.clone(), margins)))
        .collect();

    rsx! {
        div {
            class: "chart-view",
            style: "flex: 1; position: relative; overflow: hidden; background: {theme.chart_background}; cursor: crosshair;",
            onmounted: move |evt| async move {
                if let Ok(rect) = evt.get_client_rect().await {
                    size.set((rect.size.width, rect.size.height));
                }
            },
            onmousedown: move |evt| {
                drag.set(Some((evt.client_coordinates().x, range)));
            },
            onmousemove: move |evt| {
                if let Some((start_x, start)) = drag() {
                    let shown = pan_range(start, evt.client_coordinates().x - start_x, width);
                    preview.set(Some(Preview { base: scene_range, shown }));
                }
            },
            onmouseup: move |_| {
                if drag().is_some() {
                    drag.set(None);
                    if displayed != scene_range {
                        state.send(ChartCommand::Pan(range));
                    }
                }
            },
            onmouseleave: move |_| {
                if drag().is_some() {
                    drag.set(None);
                    if displayed != scene_range {
                        state.send(ChartCommand::Pan(range));
                    }
                }
            },
            onwheel: move |evt| {
                let steps = evt.delta().strip_units().y.signum();
                if steps == 0.0 {
                    return;
                }
                let shown = zoom_range(range, steps, zoom_step);
                preview.set(Some(Preview { base: scene_range, shown }));
                state.send(ChartCommand::Pan(shown));
            },
            svg {
                width: "{width}",
                height: "{height}",
                if let Some(axis) = price_axis {
                    for i in 0..GRID_LINES {
                        {
                            let y = price_band.top + price_band.height() * i as f64 / (GRID_LINES - 1) as f64;
                            let price = axis.max - (axis.max - axis.min) * i as f64 / (GRID_LINES - 1) as f64;
                            rsx! {
                                g {
                                    key: "h{i}",
                                    line {
                                        x1: "0",
                                        x2: "{width}",
                                        y1: "{y}",
                                        y2: "{y}",
                                        stroke: "{theme.chart_grid}",
                                        stroke_width: "1",
                                    }
                                    text {
                                        x: "{width - 4.0}",
                                        y: "{y - 3.0}",
                                        fill: "{theme.foreground}",
                                        font_size: "11",
                                        text_anchor: "end",
                                        "{price:.2}"
                                    }
                                }
                            }
                        }
                    }
                    Candles {
                        candles: candles.clone(),
                        time_axis,
                        value_axis: axis,
                        bullish: theme.chart_bullish.clone(),
                        bearish: theme.chart_bearish.clone(),
                    }
                }
                for i in 1..GRID_LINES {
                    {
                        let x = width * i as f64 / GRID_LINES as f64;
                        let time = range.from + time_axis.span() * i as i64 / GRID_LINES as i64;
                        let label = DateTime::from_timestamp(time, 0)
                            .map(|t| t.format("%Y-%m-%d").to_string())
                            .unwrap_or_default();
                        rsx! {
                            text {
                                key: "v{i}",
                                x: "{x}",
                                y: "{height - 4.0}",
                                fill: "{theme.foreground}",
                                font_size: "11",
                                text_anchor: "middle",
                                "{label}"
                            }
                        }
                    }
                }
                for (layer, margins) in layers {
                    IndicatorLayer {
                        key: "{layer.handle.0}",
                        layer: layer.clone(),
                        margins,
                        time_axis,
                        height,
                    }
                }
            }
            Legend {}
        }
    }
}

/// Active overlays, each with a remove button.
#[component]
fn Legend() -> Element {
    let state = use_context::<AppState>();
    let theme = use_context::<ThemePalette>();
    let active = state.snapshot.read().active_indicators.clone();
    if active.is_empty() {
        return None;
    }

    rsx! {
        div {
            class: "chart-legend",
            style: "position: absolute; top: 8px; left: 8px; display: flex; flex-direction: column; gap: 2px; font-size: 12px; color: {theme.foreground};",
            for indicator in active {
                div {
                    key: "{indicator}",
                    span { "{indicator}" }
                    button {
                        style: "margin-left: 6px; background: none; border: none; color: inherit; cursor: pointer;",
                        onmousedown: move |evt| evt.stop_propagation(),
                        onclick: move |_| state.send(ChartCommand::RemoveIndicator(indicator)),
                        "×"
                    }
                }
            }
        }
    }
}
