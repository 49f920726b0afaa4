//! Point sampling of `f(x)` for the graph pane.

use crate::calc_engine::compile;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_DOMAIN: (f64, f64) = (-10.0, 10.0);
pub const DEFAULT_STEPS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Samples `steps + 1` evenly spaced x-values across `domain`, both ends
/// included, and keeps every point where the expression has a finite value.
///
/// Never fails: invalid samples are dropped and an expression that does not
/// parse gives an empty set. Points come out in ascending x whichever way
/// round the bounds are given; a non-finite bound gives an empty set.
pub fn sample_points(expression: &str, domain: (f64, f64), steps: usize) -> Vec<PlotPoint> {
    let expr = match compile(expression) {
        Ok(expr) => expr,
        Err(e) => {
            debug!("nothing to plot for {:?}: {}", expression, e);
            return Vec::new();
        }
    };

    let (min, max) = match domain {
        (a, b) if !a.is_finite() || !b.is_finite() => {
            debug!("nothing to plot over non-finite domain {:?}", domain);
            return Vec::new();
        }
        (a, b) if a > b => (b, a),
        bounds => bounds,
    };
    if steps == 0 {
        return expr
            .eval(Some(min))
            .map(|y| vec![PlotPoint { x: min, y }])
            .unwrap_or_default();
    }

    let step = (max - min) / steps as f64;
    let points: Vec<PlotPoint> = (0..=steps)
        .filter_map(|i| {
            let x = if i == steps { max } else { min + i as f64 * step };
            match expr.eval(Some(x)) {
                Ok(y) => Some(PlotPoint { x, y }),
                Err(_) => None,
            }
        })
        .collect();

    debug!(
        "sampled {:?}: {} of {} points kept",
        expression,
        points.len(),
        steps + 1
    );
    points
}

/// `(min, max)` of the sampled y-values, `None` for an empty set.
pub fn y_extent(points: &[PlotPoint]) -> Option<(f64, f64)> {
    points.iter().fold(None, |acc, p| match acc {
        None => Some((p.y, p.y)),
        Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
    })
}
