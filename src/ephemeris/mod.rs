use std::collections::BTreeMap;

use crate::prelude::{Epoch, Vector3, SV};

pub(crate) mod spline;

pub mod predictor;
pub mod resampler;

/// One SP3 orbit record, as parsed by the loading layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSample {
    /// [Epoch] of this record
    pub epoch: Epoch,
    /// [SV] this record applies to
    pub sv: SV,
    /// Antenna phase center coordinates, in kilometers as published
    pub position_km: Vector3<f64>,
    /// SP3 clock offset placeholder in microseconds. Products flag
    /// unavailable values, which discards the record from resampling.
    pub clock_us: Option<f64>,
}

impl OrbitSample {
    pub fn new(epoch: Epoch, sv: SV, position_km: Vector3<f64>, clock_us: Option<f64>) -> Self {
        Self {
            epoch,
            sv,
            position_km,
            clock_us,
        }
    }
}

/// One precise clock record, as parsed by the loading layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockSample {
    /// [Epoch] of this record
    pub epoch: Epoch,
    /// [SV] this record applies to
    pub sv: SV,
    /// Onboard clock bias in seconds
    pub bias_s: f64,
    /// Onboard clock drift in s.s⁻¹
    pub drift_s_s: f64,
    /// Onboard clock drift rate in s.s⁻²
    pub drift_rate_s_s2: f64,
}

impl ClockSample {
    pub fn new(epoch: Epoch, sv: SV, bias_s: f64, drift_s_s: f64, drift_rate_s_s2: f64) -> Self {
        Self {
            epoch,
            sv,
            bias_s,
            drift_s_s,
            drift_rate_s_s2,
        }
    }
}

/// Interpolated satellite state on the uniform output grid, where both an
/// orbital and a clock solution exist.
#[derive(Debug, Copy, Clone)]
pub struct SatelliteState {
    /// [Epoch] on the uniform grid
    pub epoch: Epoch,
    /// [SV] this state applies to
    pub sv: SV,
    /// Interpolated antenna phase center coordinates, in meters
    pub position_m: Vector3<f64>,
    /// Velocity derived by finite differences, in m.s⁻¹.
    /// The terminal grid point holds NaN ([resampler::Resampler]) or
    /// null ([predictor::Predictor]) components, see each strategy.
    pub velocity_m_s: Vector3<f64>,
    /// Onboard clock bias in seconds
    pub clock_bias_s: f64,
    /// Onboard clock drift in s.s⁻¹
    pub clock_drift_s_s: f64,
    /// Onboard clock drift rate in s.s⁻²
    pub clock_drift_rate_s_s2: f64,
}

/// Drops all but the first occurrence of any repeated timestamp in a
/// chronological series. Adjacent daily products both publish midnight,
/// which would break the fit otherwise. Preserves order, repeated
/// application returns the same series.
pub(crate) fn dedup_by_epoch<T>(series: &mut Vec<(Epoch, T)>) {
    series.dedup_by_key(|(epoch, _)| *epoch);
}

/// Splits records into chronological, duplicate-free per-satellite series.
pub(crate) fn sv_series<T>(
    rows: impl IntoIterator<Item = (SV, Epoch, T)>,
) -> BTreeMap<SV, Vec<(Epoch, T)>> {
    let mut map = BTreeMap::<SV, Vec<(Epoch, T)>>::new();
    for (sv, epoch, value) in rows {
        map.entry(sv).or_default().push((epoch, value));
    }
    for series in map.values_mut() {
        // stable: first published record wins on duplicated timestamps
        series.sort_by_key(|(epoch, _)| *epoch);
        dedup_by_epoch(series);
    }
    map
}

pub(crate) type ClockFields = (f64, f64, f64);

/// Inner join on (epoch, satellite): orbital states without a clock
/// solution drop out, and vice versa. Output is sorted by (epoch, sv) so
/// downstream joins behave deterministically.
pub(crate) fn join_clock(
    states: Vec<(Epoch, SV, Vector3<f64>, Vector3<f64>)>,
    clocks: &BTreeMap<(Epoch, SV), ClockFields>,
) -> Vec<SatelliteState> {
    let mut table = states
        .into_iter()
        .filter_map(|(epoch, sv, position_m, velocity_m_s)| {
            let (bias_s, drift_s_s, drift_rate_s_s2) = clocks.get(&(epoch, sv))?;
            Some(SatelliteState {
                epoch,
                sv,
                position_m,
                velocity_m_s,
                clock_bias_s: *bias_s,
                clock_drift_s_s: *drift_s_s,
                clock_drift_rate_s_s2: *drift_rate_s_s2,
            })
        })
        .collect::<Vec<_>>();

    table.sort_by_key(|state| (state.epoch, state.sv));
    table
}
