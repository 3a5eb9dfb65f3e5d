// Candlestick series
#![allow(non_snake_case)]
use dioxus::prelude::*;

use chart::CandlePoint;

use super::geometry::{candle_width, TimeAxis, ValueAxis};

#[component]
pub fn Candles(
    candles: Vec<CandlePoint>,
    time_axis: TimeAxis,
    value_axis: ValueAxis,
    bullish: String,
    bearish: String,
) -> Element {
    let body = candle_width(candles.len(), time_axis.width);

    rsx! {
        g {
            class: "candles",
            for candle in candles.iter() {
                {
                    let x = time_axis.x(candle.time);
                    let color = if candle.close >= candle.open { bullish.as_str() } else { bearish.as_str() };
                    let top = value_axis.y(candle.open.max(candle.close));
                    let bottom = value_axis.y(candle.open.min(candle.close));
                    let height = (bottom - top).max(1.0);
                    rsx! {
                        g {
                            key: "{candle.time}",
                            line {
                                x1: "{x}",
                                x2: "{x}",
                                y1: "{value_axis.y(candle.high)}",
                                y2: "{value_axis.y(candle.low)}",
                                stroke: "{color}",
                                stroke_width: "1",
                            }
                            rect {
                                x: "{x - body / 2.0}",
                                y: "{top}",
                                width: "{body}",
                                height: "{height}",
                                fill: "{color}",
                            }
                        }
                    }
                }
            }
        }
    }
}
