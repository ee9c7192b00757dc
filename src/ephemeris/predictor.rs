use std::collections::BTreeMap;

use hifitime::Unit;
use itertools::Itertools;
use log::{debug, warn};
use polyfit_rs::polyfit_rs::polyfit;

use crate::{
    cfg::Config,
    ephemeris::{join_clock, sv_series, ClockSample, OrbitSample, SatelliteState},
    prelude::{Epoch, Error, TimeSeries, Vector3, SV},
};

/// One fitting window of the day boundary sweep.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FitWindow {
    /// Fitting span start
    pub start: Epoch,
    /// Fitting span end (inclusive)
    pub stop: Epoch,
    /// First output epoch this window is responsible for
    pub slab_start: Epoch,
    /// End of the output slab (exclusive): the next window's slab start
    pub slab_end: Epoch,
}

/// Finite sequence of 4h fitting windows stepping by 3h across the
/// target day, from yesterday 23:00 until a window would start at
/// tomorrow 02:00. Each window owns a central output slab, trimmed by 30'
/// on both ends, so consecutive slabs tile without gap nor overlap.
pub(crate) struct FitWindows {
    next_start: Epoch,
    end: Epoch,
}

impl FitWindows {
    pub fn new(day: Epoch) -> Self {
        Self {
            next_start: day - 1.0 * Unit::Hour,
            end: day + 1.0 * Unit::Day + 2.0 * Unit::Hour,
        }
    }
}

impl Iterator for FitWindows {
    type Item = FitWindow;
    fn next(&mut self) -> Option<FitWindow> {
        if self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let stop = start + 4.0 * Unit::Hour;
        self.next_start = start + 3.0 * Unit::Hour;
        Some(FitWindow {
            start,
            stop,
            slab_start: start + 30.0 * Unit::Minute,
            slab_end: stop - 30.0 * Unit::Minute,
        })
    }
}

/// Windowed polynomial prediction across the day boundary: the legacy
/// strategy, kept where spline resampling is not applicable and for cross
/// validation.
#[derive(Debug, Clone)]
pub struct Predictor {
    cfg: Config,
}

impl Predictor {
    /// Builds a [Predictor], rejecting degrees above
    /// [crate::cfg::MAX_POLY_DEGREE] right away.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Builds the uniform ephemeris + clock table around `day` (midnight
    /// of the target day, UTC), from that day's orbit records and both
    /// neighbor days. Output spans yesterday 23:30 up to (excluded)
    /// tomorrow 02:30.
    ///
    /// Satellites with too few samples in a given window lose that
    /// window's slab only: remaining windows and satellites are not
    /// affected.
    pub fn predict(
        &self,
        day: Epoch,
        yesterday: &[OrbitSample],
        today: &[OrbitSample],
        tomorrow: &[OrbitSample],
        clock: &[ClockSample],
    ) -> Result<Vec<SatelliteState>, Error> {
        let day_after = day + 1.0 * Unit::Day;

        // late night, full day, early morning
        let table = yesterday
            .iter()
            .filter(|rec| rec.epoch >= day - 1.0 * Unit::Hour && rec.epoch < day)
            .chain(
                today
                    .iter()
                    .filter(|rec| rec.epoch >= day && rec.epoch < day_after),
            )
            .chain(tomorrow.iter().filter(|rec| {
                rec.epoch >= day_after && rec.epoch <= day_after + 3.0 * Unit::Hour
            }))
            .filter(|rec| rec.clock_us.is_some())
            .collect::<Vec<_>>();

        let epochs = table
            .iter()
            .map(|rec| rec.epoch)
            .sorted()
            .dedup()
            .collect::<Vec<_>>();

        if epochs.len() < 2 {
            return Err(Error::InsufficientEpochs);
        }

        let spacing = epochs[1] - epochs[0];
        debug!("nominal product spacing: {}", spacing);

        let svs = sv_series(
            table
                .iter()
                .map(|rec| (rec.sv, rec.epoch, rec.position_km)),
        );

        let mut states = Vec::new();
        for window in FitWindows::new(day) {
            for (sv, series) in &svs {
                self.fit_window(*sv, series, &window, &mut states)?;
            }
        }

        let mut clocks = BTreeMap::new();
        for rec in clock {
            clocks
                .entry((rec.epoch, rec.sv))
                .or_insert((rec.bias_s, rec.drift_s_s, rec.drift_rate_s_s2));
        }

        Ok(join_clock(states, &clocks))
    }

    /// Polynomial fit of one satellite over one window, writing this
    /// window's slab. Fitting runs in kilometers against elapsed seconds
    /// since the satellite's first sample in the window; evaluated
    /// coordinates scale to meters. Velocity is the forward difference
    /// over the interval, null at the evaluation boundary (unlike the
    /// resampler's NaN, both conventions are deliberately kept).
    fn fit_window(
        &self,
        sv: SV,
        series: &[(Epoch, Vector3<f64>)],
        window: &FitWindow,
        states: &mut Vec<(Epoch, SV, Vector3<f64>, Vector3<f64>)>,
    ) -> Result<(), Error> {
        let degree = self.cfg.poly_degree;

        let samples = series
            .iter()
            .filter(|(epoch, _)| *epoch >= window.start && *epoch <= window.stop)
            .collect::<Vec<_>>();

        if samples.len() <= degree {
            warn!(
                "{} not predictable over {} - {}: {} epochs for degree {}",
                sv,
                window.start,
                window.stop,
                samples.len(),
                degree,
            );
            return Ok(());
        }

        let t_ref = samples[0].0;
        let elapsed = samples
            .iter()
            .map(|(epoch, _)| (*epoch - t_ref).to_seconds())
            .collect::<Vec<f64>>();

        let mut fits = Vec::with_capacity(3);
        for axis in 0..3 {
            let values = samples
                .iter()
                .map(|(_, position)| position[axis])
                .collect::<Vec<f64>>();

            fits.push(polyfit(&elapsed, &values, degree).or(Err(Error::PolynomialFit))?);
        }

        let grid = TimeSeries::inclusive(window.slab_start, window.slab_end, self.cfg.interval)
            .collect::<Vec<Epoch>>();

        let positions = grid
            .iter()
            .map(|epoch| {
                let dt = (*epoch - t_ref).to_seconds();
                Vector3::new(
                    eval_poly(&fits[0], dt),
                    eval_poly(&fits[1], dt),
                    eval_poly(&fits[2], dt),
                ) * 1.0E3
            })
            .collect::<Vec<_>>();

        let dt = self.cfg.interval.to_seconds();
        for (i, epoch) in grid.iter().enumerate() {
            // the slab end point belongs to the next window
            if *epoch >= window.slab_end {
                continue;
            }
            let velocity = if i + 1 < positions.len() {
                (positions[i + 1] - positions[i]) / dt
            } else {
                Vector3::zeros()
            };
            states.push((*epoch, sv, positions[i], velocity));
        }

        Ok(())
    }
}

/// Polynomial evaluation, coefficients by increasing power.
fn eval_poly(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}
