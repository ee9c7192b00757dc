use std::collections::BTreeMap;

use log::{debug, warn};

use crate::{
    cfg::Config,
    ephemeris::{
        join_clock, spline::CubicSpline, sv_series, ClockFields, ClockSample, OrbitSample,
        SatelliteState,
    },
    prelude::{Epoch, Error, TimeSeries, Vector3, SV},
};

/// Minimum deduplicated samples per satellite: below this a cubic fit
/// is not defined.
pub const MIN_SAMPLES: usize = 4;

/// Reason why one satellite did not make it into the output table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Fewer than [MIN_SAMPLES] orbit records after deduplication
    NotEnoughOrbitSamples { found: usize },
    /// Fewer than [MIN_SAMPLES] clock records after deduplication
    NotEnoughClockSamples { found: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::NotEnoughOrbitSamples { found } => {
                write!(f, "only {} orbit samples ({} needed)", found, MIN_SAMPLES)
            },
            Self::NotEnoughClockSamples { found } => {
                write!(f, "only {} clock samples ({} needed)", found, MIN_SAMPLES)
            },
        }
    }
}

/// Per-satellite fitting outcome. Skipped satellites never abort the
/// processing of others: the caller aggregates [SvFit::Fitted] series and
/// reports the rest.
#[derive(Debug, Clone)]
pub enum SvFit<T> {
    /// Resampled series for this satellite
    Fitted(T),
    /// Satellite left out of the output table
    Skipped(SkipReason),
}

type PositionRow = (Epoch, SV, Vector3<f64>, Vector3<f64>);

/// Cubic spline resampling of orbit and clock products onto a uniform
/// grid: the preferred strategy.
#[derive(Debug, Clone)]
pub struct Resampler {
    cfg: Config,
}

impl Resampler {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Builds the uniform ephemeris + clock table for the [start, stop]
    /// time window, from (possibly multi day) orbit and clock records.
    /// Records are consumed over the window padded by the configured
    /// buffer on both ends: callers must request raw products at least
    /// that wide, so interpolation near the window edges keeps enough
    /// surrounding samples.
    ///
    /// Satellites with fewer than [MIN_SAMPLES] orbit or clock records,
    /// and (epoch, satellite) pairs covered by only one of the two
    /// products, drop out silently.
    pub fn resample(
        &self,
        orbit: &[OrbitSample],
        clock: &[ClockSample],
        start: Epoch,
        stop: Epoch,
    ) -> Result<Vec<SatelliteState>, Error> {
        let buff_start = start - self.cfg.buffer;
        let buff_stop = stop + self.cfg.buffer;

        // records missing the SP3 clock placeholder do not contribute
        let orbits = sv_series(
            orbit
                .iter()
                .filter(|rec| {
                    rec.epoch >= buff_start && rec.epoch <= buff_stop && rec.clock_us.is_some()
                })
                .map(|rec| (rec.sv, rec.epoch, rec.position_km * 1.0E3)),
        );

        debug!(
            "resampling {} satellites over {} - {}",
            orbits.len(),
            buff_start,
            buff_stop
        );

        let mut states = Vec::<PositionRow>::new();
        for (sv, series) in orbits {
            match self.resample_position(sv, &series)? {
                SvFit::Fitted(rows) => states.extend(rows),
                SvFit::Skipped(reason) => warn!("{} skipped: {}", sv, reason),
            }
        }

        let clocks = sv_series(
            clock
                .iter()
                .filter(|rec| rec.epoch >= buff_start && rec.epoch <= buff_stop)
                .map(|rec| {
                    (
                        rec.sv,
                        rec.epoch,
                        (rec.bias_s, rec.drift_s_s, rec.drift_rate_s_s2),
                    )
                }),
        );

        let mut resampled = BTreeMap::<(Epoch, SV), ClockFields>::new();
        for (sv, series) in clocks {
            match self.resample_clock(&series)? {
                SvFit::Fitted(rows) => {
                    for (epoch, fields) in rows {
                        resampled.insert((epoch, sv), fields);
                    }
                },
                SvFit::Skipped(reason) => warn!("{} skipped: {}", sv, reason),
            }
        }

        Ok(join_clock(states, &resampled))
    }

    /// Position series resampling for one satellite. The grid is anchored
    /// at the first deduplicated sample and never extrapolates past the
    /// last one. Velocity is the forward difference towards the next grid
    /// point, which leaves the terminal point with NaN components.
    fn resample_position(
        &self,
        sv: SV,
        series: &[(Epoch, Vector3<f64>)],
    ) -> Result<SvFit<Vec<PositionRow>>, Error> {
        if series.len() < MIN_SAMPLES {
            return Ok(SvFit::Skipped(SkipReason::NotEnoughOrbitSamples {
                found: series.len(),
            }));
        }

        let t_ref = series[0].0;
        let elapsed = series
            .iter()
            .map(|(epoch, _)| (*epoch - t_ref).to_seconds())
            .collect::<Vec<f64>>();

        let mut splines = Vec::with_capacity(3);
        for axis in 0..3 {
            let values = series
                .iter()
                .map(|(_, position)| position[axis])
                .collect::<Vec<f64>>();
            splines.push(CubicSpline::fit(&elapsed, &values)?);
        }

        let grid = TimeSeries::inclusive(t_ref, series[series.len() - 1].0, self.cfg.interval)
            .collect::<Vec<Epoch>>();

        let positions = grid
            .iter()
            .map(|epoch| {
                let dt = (*epoch - t_ref).to_seconds();
                Vector3::new(splines[0].eval(dt), splines[1].eval(dt), splines[2].eval(dt))
            })
            .collect::<Vec<_>>();

        let dt = self.cfg.interval.to_seconds();
        let rows = grid
            .iter()
            .enumerate()
            .map(|(i, epoch)| {
                let velocity = if i + 1 < positions.len() {
                    (positions[i + 1] - positions[i]) / dt
                } else {
                    Vector3::repeat(f64::NAN)
                };
                (*epoch, sv, positions[i], velocity)
            })
            .collect();

        Ok(SvFit::Fitted(rows))
    }

    /// Clock series resampling for one satellite: bias, drift and drift
    /// rate interpolate independently, no derivation involved.
    fn resample_clock(
        &self,
        series: &[(Epoch, ClockFields)],
    ) -> Result<SvFit<Vec<(Epoch, ClockFields)>>, Error> {
        if series.len() < MIN_SAMPLES {
            return Ok(SvFit::Skipped(SkipReason::NotEnoughClockSamples {
                found: series.len(),
            }));
        }

        let t_ref = series[0].0;
        let elapsed = series
            .iter()
            .map(|(epoch, _)| (*epoch - t_ref).to_seconds())
            .collect::<Vec<f64>>();

        let bias = CubicSpline::fit(
            &elapsed,
            &series.iter().map(|(_, f)| f.0).collect::<Vec<f64>>(),
        )?;
        let drift = CubicSpline::fit(
            &elapsed,
            &series.iter().map(|(_, f)| f.1).collect::<Vec<f64>>(),
        )?;
        let drift_rate = CubicSpline::fit(
            &elapsed,
            &series.iter().map(|(_, f)| f.2).collect::<Vec<f64>>(),
        )?;

        let rows = TimeSeries::inclusive(t_ref, series[series.len() - 1].0, self.cfg.interval)
            .map(|epoch| {
                let dt = (epoch - t_ref).to_seconds();
                (
                    epoch,
                    (bias.eval(dt), drift.eval(dt), drift_rate.eval(dt)),
                )
            })
            .collect();

        Ok(SvFit::Fitted(rows))
    }
}
