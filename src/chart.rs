//! Maps a price history plus a short forecast onto plot coordinates.
//!
//! Coordinates are in an abstract pixel space with the origin at the top left,
//! so higher prices map to smaller `y`. Renderers flip or scale as needed.

use crate::format::usd_whole;
use crate::types::HistoryPoint;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const MAX_FORECAST: usize = 7;
pub const GRID_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self::new(500.0, 250.0).with_padding(40.0)
    }
}

impl ChartFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.left = padding;
        self.right = padding;
        self.top = padding;
        self.bottom = padding;
        self
    }
}

/// Linear map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// A collapsed domain maps every value to the range's baseline.
    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<PlotPoint>,
}

impl Polyline {
    pub fn first(&self) -> Option<PlotPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<PlotPoint> {
        self.points.last().copied()
    }

    /// Consecutive point pairs, one per drawn segment.
    pub fn segments(&self) -> impl Iterator<Item = (PlotPoint, PlotPoint)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// SVG path data: `M x,y L x,y ...`.
    pub fn to_svg_path(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {},{}", if i == 0 { 'M' } else { 'L' }, p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub frame: ChartFrame,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub history: Polyline,
    /// Starts at the last history point, then one point per forecast day.
    pub forecast: Polyline,
    pub forecast_timestamps: Vec<i64>,
    pub grid: Vec<GridLine>,
}

/// Lays out `history` (solid) and `forecast` (projected) in `frame`.
///
/// Returns `None` for an empty history. Forecast entries past
/// [`MAX_FORECAST`] are ignored.
pub fn map_prediction(
    history: &[HistoryPoint],
    forecast: &[f64],
    frame: ChartFrame,
) -> Option<ChartGeometry> {
    let first = history.first()?;
    let last = history.last()?;
    let forecast = &forecast[..forecast.len().min(MAX_FORECAST)];

    let forecast_timestamps: Vec<i64> = (1..=forecast.len() as i64)
        .map(|i| last.timestamp_ms + i * DAY_MS)
        .collect();
    let max_ts = forecast_timestamps.last().copied().unwrap_or(last.timestamp_ms);

    let prices = history.iter().map(|p| p.price).chain(forecast.iter().copied());
    let (min_price, max_price) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p), hi.max(p))
    });

    let x_scale = LinearScale::new(
        (first.timestamp_ms as f64, max_ts as f64),
        (frame.left, frame.width - frame.right),
    );
    let y_scale = LinearScale::new(
        (min_price, max_price),
        (frame.height - frame.bottom, frame.top),
    );

    let project = |ts: i64, price: f64| PlotPoint {
        x: x_scale.map(ts as f64),
        y: y_scale.map(price),
    };

    let history_line = Polyline {
        points: history.iter().map(|p| project(p.timestamp_ms, p.price)).collect(),
    };

    let anchor = project(last.timestamp_ms, last.price);
    let mut forecast_points = Vec::with_capacity(forecast.len() + 1);
    forecast_points.push(anchor);
    forecast_points.extend(
        forecast_timestamps
            .iter()
            .zip(forecast)
            .map(|(&ts, &price)| project(ts, price)),
    );

    let grid = (0..GRID_LINES)
        .map(|i| {
            let price = min_price + (i as f64 / (GRID_LINES - 1) as f64) * (max_price - min_price);
            GridLine {
                y: y_scale.map(price),
                price,
                label: usd_whole(price),
            }
        })
        .collect();

    Some(ChartGeometry {
        frame,
        x_scale,
        y_scale,
        history: history_line,
        forecast: Polyline {
            points: forecast_points,
        },
        forecast_timestamps,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn hist(prices: &[f64]) -> Vec<HistoryPoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| HistoryPoint {
                timestamp_ms: T0 + i as i64 * DAY_MS,
                price,
            })
            .collect()
    }

    #[test]
    fn empty_history_has_no_geometry() {
        assert!(map_prediction(&[], &[1.0], ChartFrame::default()).is_none());
    }

    #[test]
    fn forecast_starts_at_last_history_point() {
        let g = map_prediction(&hist(&[100.0, 110.0]), &[120.0, 130.0], ChartFrame::default()).unwrap();
        assert_eq!(g.forecast.first(), g.history.last());
        assert_eq!(g.forecast.points.len(), 3);
    }

    #[test]
    fn scales_span_the_padded_frame() {
        let g = map_prediction(&hist(&[100.0, 110.0]), &[120.0, 130.0], ChartFrame::default()).unwrap();
        let first = g.history.first().unwrap();
        let end = g.forecast.last().unwrap();
        assert_eq!(first.x, 40.0);
        assert_eq!(first.y, 210.0);
        assert_eq!(end.x, 460.0);
        assert_eq!(end.y, 40.0);
        // Three days in total: one of history, two of forecast.
        assert!((g.history.last().unwrap().x - 180.0).abs() < 1e-9);
    }

    #[test]
    fn forecast_days_follow_last_history_point() {
        let g = map_prediction(&hist(&[1.0, 2.0, 3.0]), &[4.0, 5.0], ChartFrame::default()).unwrap();
        assert_eq!(g.forecast_timestamps, vec![T0 + 3 * DAY_MS, T0 + 4 * DAY_MS]);
    }

    #[test]
    fn flat_prices_map_to_constant_y() {
        let g = map_prediction(&hist(&[100.0, 100.0, 100.0]), &[100.0], ChartFrame::default()).unwrap();
        for p in g.history.points.iter().chain(&g.forecast.points) {
            assert_eq!(p.y, 210.0);
        }
        assert!(g.grid.iter().all(|l| l.y == 210.0 && l.label == "$100"));
    }

    #[test]
    fn single_point_without_forecast() {
        let g = map_prediction(&hist(&[42.0]), &[], ChartFrame::default()).unwrap();
        assert_eq!(g.history.points, vec![PlotPoint { x: 40.0, y: 210.0 }]);
        assert_eq!(g.forecast.points, g.history.points);
    }

    #[test]
    fn forecast_is_capped_at_a_week() {
        let g = map_prediction(&hist(&[1.0, 2.0]), &[3.0; 10], ChartFrame::default()).unwrap();
        assert_eq!(g.forecast_timestamps.len(), MAX_FORECAST);
        assert_eq!(g.forecast.points.len(), MAX_FORECAST + 1);
    }

    #[test]
    fn five_gridlines_from_min_to_max() {
        let g = map_prediction(&hist(&[1000.0, 1500.0]), &[2000.0], ChartFrame::default()).unwrap();
        let labels: Vec<_> = g.grid.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["$1,000", "$1,250", "$1,500", "$1,750", "$2,000"]);
        assert_eq!(g.grid[0].y, 210.0);
        assert_eq!(g.grid[4].y, 40.0);
    }

    #[test]
    fn svg_path_uses_move_then_line() {
        let line = Polyline {
            points: vec![PlotPoint { x: 1.0, y: 2.0 }, PlotPoint { x: 3.5, y: 4.0 }],
        };
        assert_eq!(line.to_svg_path(), "M 1,2 L 3.5,4");
        assert_eq!(line.segments().count(), 1);
    }
}
