//! Accessibility figures derived from a generated [`Surface`].

use hashbrown::HashMap;

use super::surface::{Case, Surface};
use crate::model::Grid;

/// Opportunities of `grid` reachable within the surface's cutoff, averaged
/// over departure minutes.
///
/// Uses the per-pixel access counts, so any grid works, registered at
/// generation time or not. A different cutoff needs a new surface.
pub fn accessibility_for_grid(surface: &Surface, grid: &Grid) -> f64 {
    if surface.n_minutes == 0 {
        return 0.0;
    }
    let n_minutes = surface.n_minutes as f64;
    let extent = &surface.extent;

    let mut accessibility = 0.0;
    for y in 0..extent.height {
        for x in 0..extent.width {
            let count = surface.access_counts[y * extent.width + x];
            // unreached
            if count == 0 {
                continue;
            }
            let value = grid.value_at_query_pixel(extent, x as i64, y as i64);
            accessibility += value * f64::from(count) / n_minutes;
        }
    }
    accessibility
}

/// Reduces each grid's accessibility-by-minute to one figure, truncated to
/// whole opportunities: the best minute, the worst minute, the mean or the
/// median.
pub fn accessibility_for_cutoff(surface: &Surface, which: Case) -> HashMap<String, i64> {
    surface
        .accessibility
        .iter()
        .map(|(name, by_minute)| (name.clone(), reduce(which, by_minute).trunc() as i64))
        .collect()
}

fn reduce(which: Case, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match which {
        Case::BestCase => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Case::WorstCase => values.iter().copied().fold(f64::INFINITY, f64::min),
        Case::Average => values.iter().sum::<f64>() / values.len() as f64,
        Case::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_unstable_by(f64::total_cmp);
            let n = sorted.len();
            if n % 2 == 1 {
                sorted[n / 2]
            } else {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            }
        }
    }
}
