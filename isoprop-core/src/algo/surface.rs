//! Reduction of per-minute travel times into surfaces.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{Extent, Grid, Session};
use crate::propagation::{CancellationToken, PixelTimes, Propagator};
use crate::{DEFAULT_CUTOFF_MINUTES, Error, MAX_TRIP_LENGTH_MINUTES, Minutes, UNREACHABLE};

/// Statistic used to summarize the departure minutes of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Case {
    BestCase,
    WorstCase,
    Average,
    #[default]
    Median,
}

impl Case {
    pub fn as_str(self) -> &'static str {
        match self {
            Case::BestCase => "BEST_CASE",
            Case::WorstCase => "WORST_CASE",
            Case::Average => "AVERAGE",
            Case::Median => "MEDIAN",
        }
    }

    /// Reduces `values` to one minute value. `scratch` is reused for sorting.
    #[inline]
    pub fn reduce(self, values: &[Minutes], scratch: &mut Vec<Minutes>) -> Minutes {
        match self {
            Case::BestCase => values.iter().copied().fold(UNREACHABLE, Minutes::min),
            Case::WorstCase => values.iter().copied().fold(0, Minutes::max),
            Case::Average => average(values),
            Case::Median => {
                scratch.clear();
                scratch.extend_from_slice(values);
                scratch.sort_unstable();
                median(scratch)
            }
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Case {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEST_CASE" => Ok(Case::BestCase),
            "WORST_CASE" => Ok(Case::WorstCase),
            "AVERAGE" => Ok(Case::Average),
            "MEDIAN" => Ok(Case::Median),
            other => Err(Error::Configuration(format!(
                "unknown case '{other}', expected BEST_CASE, WORST_CASE, AVERAGE or MEDIAN"
            ))),
        }
    }
}

/// Mean of the reachable entries, truncated; unreachable if none is reachable
fn average(values: &[Minutes]) -> Minutes {
    let (sum, count) = values
        .iter()
        .filter(|&&v| v != UNREACHABLE)
        .fold((0u64, 0u64), |(sum, count), &v| {
            (sum + u64::from(v), count + 1)
        });

    if count == 0 {
        UNREACHABLE
    } else {
        // the mean of values below 255 is below 255
        (sum / count) as Minutes
    }
}

/// Median of sorted values; unreachable entries sort last
fn median(sorted: &[Minutes]) -> Minutes {
    let n = sorted.len();
    if n == 0 {
        return UNREACHABLE;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        ((u16::from(sorted[n / 2 - 1]) + u16::from(sorted[n / 2])) / 2) as Minutes
    }
}

/// One-shot form of [`Case::reduce`]
pub fn compute_pixel_value(which: Case, values: &[Minutes]) -> Minutes {
    which.reduce(values, &mut Vec::new())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub which: Case,
    /// Accessibility cutoff in minutes
    pub cutoff: Minutes,
    /// Grid to build the spectrogram against
    pub spectrogram_grid: Option<String>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            which: Case::default(),
            cutoff: DEFAULT_CUTOFF_MINUTES,
            spectrogram_grid: None,
        }
    }
}

/// Opportunities newly reached at each trip length, per departure minute.
///
/// `data[minute][t - 1]` holds the opportunities reached in `t` minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrogram {
    pub grid: String,
    pub data: Vec<Vec<f64>>,
}

/// Aggregated times for every pixel of the query, plus the accessibility
/// accumulated at the cutoff the surface was generated with
#[derive(Debug, Clone)]
pub struct Surface {
    pub extent: Extent,
    pub n_minutes: usize,
    pub which: Case,
    pub cutoff: Minutes,
    pub travel_times: Vec<Minutes>,
    pub wait_times: Vec<Minutes>,
    pub walk_times: Vec<Minutes>,
    pub in_vehicle_travel_times: Vec<Minutes>,
    /// Departure minutes at which each pixel is reached within the cutoff
    pub access_counts: Vec<u32>,
    /// Opportunities reached within the cutoff, per grid and departure minute
    pub accessibility: HashMap<String, Vec<f64>>,
    pub spectrogram: Option<Spectrogram>,
}

impl Surface {
    /// Row-major index of a query pixel
    pub fn index(&self, x: i64, y: i64) -> Option<usize> {
        self.extent.pixel_index(x, y)
    }

    pub fn travel_time(&self, x: i64, y: i64) -> Minutes {
        self.index(x, y)
            .map_or(UNREACHABLE, |index| self.travel_times[index])
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PixelValues {
    travel: Minutes,
    wait: Minutes,
    walk: Minutes,
    in_vehicle: Minutes,
    access_count: u32,
}

/// Running sums over all pixels, one per worker, merged at the end
#[derive(Debug, Clone)]
struct Accumulator {
    /// `[grid][minute]`
    access: Vec<Vec<f64>>,
    /// `[minute][trip length]`
    spectrogram: Option<Vec<Vec<f64>>>,
}

impl Accumulator {
    fn new(n_grids: usize, n_minutes: usize, spectrogram: bool) -> Self {
        Self {
            access: vec![vec![0.0; n_minutes]; n_grids],
            spectrogram: spectrogram.then(|| vec![vec![0.0; MAX_TRIP_LENGTH_MINUTES]; n_minutes]),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.access.iter_mut().zip(other.access) {
            add_assign(mine, &theirs);
        }
        if let (Some(mine), Some(theirs)) = (self.spectrogram.as_mut(), other.spectrogram) {
            for (row, other_row) in mine.iter_mut().zip(theirs) {
                add_assign(row, &other_row);
            }
        }
        self
    }
}

/// Spectrogram column for a travel time: `t` minutes lands in `t - 1`, with
/// time 0 sharing the first column. Trips of `MAX_TRIP_LENGTH_MINUTES` or
/// more are left out.
fn spectrogram_bucket(t: Minutes) -> Option<usize> {
    let t = usize::from(t);
    (t < MAX_TRIP_LENGTH_MINUTES).then(|| t.saturating_sub(1))
}

fn add_assign(target: &mut [f64], source: &[f64]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t += s;
    }
}

/// Generates the surface of `session` for `options`.
///
/// Rows are propagated in parallel; `cancel` is checked before each row.
///
/// # Errors
///
/// [`Error::Configuration`] for a zero cutoff or an unknown spectrogram grid,
/// [`Error::Cancelled`] if `cancel` fires.
pub fn generate_surface(
    session: &Session,
    options: &SurfaceOptions,
    cancel: &CancellationToken,
) -> Result<Surface, Error> {
    if options.cutoff == 0 {
        return Err(Error::Configuration(
            "cutoff must be at least one minute".to_string(),
        ));
    }

    let network = session.network();
    let extent = network.query().extent;
    let names: Vec<&str> = network.grids().names().collect();
    let grids: Vec<&Grid> = network.grids().iter().map(|(_, grid)| grid).collect();

    let spectrogram_grid = match &options.spectrogram_grid {
        Some(name) => Some(
            names
                .iter()
                .position(|n| *n == name.as_str())
                .ok_or_else(|| Error::Configuration(format!("no grid named '{name}'")))?,
        ),
        None => None,
    };

    let propagator = Propagator::new(session);
    let n_minutes = propagator.n_minutes();
    let cutoff = options.cutoff;
    let which = options.which;

    info!(
        "Generating {which} surface for origin ({}, {}): {}x{} pixels, {n_minutes} minutes, \
         cutoff {cutoff} minutes",
        session.origin().point().x,
        session.origin().point().y,
        extent.width,
        extent.height
    );

    let mut pixels = vec![PixelValues::default(); extent.pixel_count()];
    let new_accumulator = || Accumulator::new(grids.len(), n_minutes, spectrogram_grid.is_some());

    let totals = pixels
        .par_chunks_mut(extent.width)
        .enumerate()
        .try_fold(new_accumulator, |mut acc, (y, row)| {
            cancel.check()?;
            let mut times = PixelTimes::new(n_minutes);
            let mut scratch = Vec::with_capacity(n_minutes);

            propagator.propagate_row(y, &mut times, |x, times| {
                row[x] = PixelValues {
                    travel: which.reduce(&times.travel_times, &mut scratch),
                    wait: which.reduce(&times.wait_times, &mut scratch),
                    walk: which.reduce(&times.walk_times, &mut scratch),
                    in_vehicle: which.reduce(&times.in_vehicle_times, &mut scratch),
                    access_count: times.travel_times.iter().filter(|&&t| t < cutoff).count() as u32,
                };

                for (g, grid) in grids.iter().enumerate() {
                    let value = grid.value_at_query_pixel(&extent, x as i64, y as i64);
                    if value == 0.0 {
                        continue;
                    }

                    for (minute, &t) in times.travel_times.iter().enumerate() {
                        if t < cutoff {
                            acc.access[g][minute] += value;
                        }
                    }

                    if spectrogram_grid == Some(g) {
                        if let Some(spectrogram) = acc.spectrogram.as_mut() {
                            for (minute, &t) in times.travel_times.iter().enumerate() {
                                if let Some(bucket) = spectrogram_bucket(t) {
                                    spectrogram[minute][bucket] += value;
                                }
                            }
                        }
                    }
                }
            });

            Ok::<_, Error>(acc)
        })
        .try_reduce(new_accumulator, |a, b| Ok(a.merge(b)))?;

    let accessibility = names
        .iter()
        .zip(totals.access)
        .map(|(name, by_minute)| ((*name).to_string(), by_minute))
        .collect::<HashMap<_, _>>();

    let spectrogram = spectrogram_grid
        .zip(totals.spectrogram)
        .map(|(g, data)| Spectrogram {
            grid: names[g].to_string(),
            data,
        });

    let reached = pixels.iter().filter(|p| p.travel != UNREACHABLE).count();
    debug!("{reached} of {} pixels reachable", pixels.len());
    info!("Surface generation complete");

    Ok(Surface {
        extent,
        n_minutes,
        which,
        cutoff,
        travel_times: pixels.iter().map(|p| p.travel).collect(),
        wait_times: pixels.iter().map(|p| p.wait).collect(),
        walk_times: pixels.iter().map(|p| p.walk).collect(),
        in_vehicle_travel_times: pixels.iter().map(|p| p.in_vehicle).collect(),
        access_counts: pixels.iter().map(|p| p.access_count).collect(),
        accessibility,
        spectrogram,
    })
}
