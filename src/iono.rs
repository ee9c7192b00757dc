use hifitime::Unit;

use crate::{constants::TECU_DELAY_FACTOR_M, prelude::{Epoch, Error}};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2h time slices covering one UTC day. The 13th slice is the next day's
/// first map and closes the last bin.
pub const TEC_TIME_SLICES: usize = 13;

/// Latitude bands, +87.5° down to -87.5° by 2.5° steps
pub const TEC_LATITUDE_BANDS: usize = 71;

/// Longitude bands, -180° up to +180° by 5° steps
pub const TEC_LONGITUDE_BANDS: usize = 72;

const LATITUDE_NORTH_DEG: f64 = 87.5;
const LATITUDE_STEP_DEG: f64 = 2.5;
const LONGITUDE_WEST_DEG: f64 = -180.0;
const LONGITUDE_STEP_DEG: f64 = 5.0;

/// Ionospheric delay output unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DelayUnit {
    /// Total Electron Content units (10¹⁶ electrons.m⁻²)
    Tecu,
    /// Meters of propagation delay at the carrier frequency
    #[default]
    Meters,
}

impl std::fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Tecu => write!(f, "tecu"),
            Self::Meters => write!(f, "meter"),
        }
    }
}

impl std::str::FromStr for DelayUnit {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tecu" => Ok(Self::Tecu),
            "meter" | "meters" | "m" => Ok(Self::Meters),
            _ => Err(Error::UnknownDelayUnit),
        }
    }
}

impl DelayUnit {
    /// Converts one raw grid value (0.1 TECU) observed at the given
    /// carrier frequency.
    fn delay(&self, raw: f64, frequency_hz: f64) -> f64 {
        let tecu = 0.1 * raw;
        match self {
            Self::Tecu => tecu,
            Self::Meters => tecu * TECU_DELAY_FACTOR_M / frequency_hz.powi(2),
        }
    }
}

/// Global ionosphere map for one UTC day: vertical TEC in 0.1 TECU over
/// [TEC_TIME_SLICES] x [TEC_LATITUDE_BANDS] x [TEC_LONGITUDE_BANDS].
#[derive(Debug, Clone)]
pub struct TecGrid {
    /// Midnight (UTC) opening the day this map describes
    pub day: Epoch,
    values: Vec<f64>,
}

impl TecGrid {
    /// Builds a [TecGrid] from a flat buffer, time slice major, then
    /// latitude band (north first), then longitude band (west first).
    pub fn new(day: Epoch, values: Vec<f64>) -> Result<Self, Error> {
        let expected = TEC_TIME_SLICES * TEC_LATITUDE_BANDS * TEC_LONGITUDE_BANDS;
        if values.len() != expected {
            return Err(Error::TecGridDimensions {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { day, values })
    }

    /// Raw grid node in 0.1 TECU. Panics above the published dimensions.
    pub fn value(&self, time_slice: usize, lat_band: usize, lon_band: usize) -> f64 {
        self.values[(time_slice * TEC_LATITUDE_BANDS + lat_band) * TEC_LONGITUDE_BANDS + lon_band]
    }

    /// Interpolates the slant-free (vertical) ionospheric delay at each
    /// requested epoch, for a station at the given geocentric coordinates
    /// (resolved externally from its approximate position) observing at
    /// the given carrier frequency.
    ///
    /// The epoch list must be sorted ascending and fall within the grid
    /// day (its last 2h bin closes exactly 24h after [TecGrid::day]).
    pub fn delays(
        &self,
        geocentric_lat_deg: f64,
        lon_deg: f64,
        epochs: &[Epoch],
        unit: DelayUnit,
        frequency_hz: f64,
    ) -> Result<Vec<f64>, Error> {
        if !epochs.windows(2).all(|pair| pair[0] <= pair[1]) {
            return Err(Error::UnsortedEpochs);
        }

        let day_end = self.day + 24.0 * Unit::Hour;
        for epoch in epochs {
            if *epoch < self.day || *epoch > day_end {
                return Err(Error::EpochOutsideGridDay(*epoch));
            }
        }

        let profile = self.horizontal_profile(geocentric_lat_deg, lon_deg)?;

        let mut raw = vec![0.0; epochs.len()];
        let mut cursor = 0;

        for slice in 0..TEC_TIME_SLICES - 1 {
            let bin_start = self.day + (slice as f64) * 2.0 * Unit::Hour;
            let bin_end = bin_start + 2.0 * Unit::Hour;
            while cursor < epochs.len() && epochs[cursor] < bin_end {
                let weight = (bin_end - epochs[cursor]).to_seconds() / 7200.0;
                raw[cursor] = weight * profile[slice] + (1.0 - weight) * profile[slice + 1];
                cursor += 1;
            }
        }

        // exactly 24h in: the next day alias slice
        while cursor < epochs.len() {
            raw[cursor] = profile[TEC_TIME_SLICES - 1];
            cursor += 1;
        }

        Ok(raw
            .into_iter()
            .map(|value| unit.delay(value, frequency_hz))
            .collect())
    }

    /// Bilinear interpolation at the station coordinates, one value per
    /// time slice.
    fn horizontal_profile(
        &self,
        lat_deg: f64,
        lon_deg: f64,
    ) -> Result<[f64; TEC_TIME_SLICES], Error> {
        let (north, q) = latitude_band(lat_deg)?;
        let (west, p) = longitude_band(lon_deg)?;

        let mut profile = [0.0; TEC_TIME_SLICES];
        for (slice, value) in profile.iter_mut().enumerate() {
            *value = (1.0 - p) * (1.0 - q) * self.value(slice, north + 1, west)
                + p * (1.0 - q) * self.value(slice, north + 1, west + 1)
                + q * (1.0 - p) * self.value(slice, north, west)
                + p * q * self.value(slice, north, west + 1);
        }

        Ok(profile)
    }
}

/// Bucket lookup over the uniform latitude bands. Returns the northern
/// band index of the enclosing cell, and the fractional offset from its
/// southern edge. Band edge hits collapse onto the edge exactly.
fn latitude_band(lat_deg: f64) -> Result<(usize, f64), Error> {
    if !(-LATITUDE_NORTH_DEG..=LATITUDE_NORTH_DEG).contains(&lat_deg) {
        return Err(Error::LatitudeOutsideGrid(lat_deg));
    }
    let offset = (LATITUDE_NORTH_DEG - lat_deg) / LATITUDE_STEP_DEG;
    let index = (offset.floor() as usize).min(TEC_LATITUDE_BANDS - 2);
    let south_deg = LATITUDE_NORTH_DEG - LATITUDE_STEP_DEG * (index + 1) as f64;
    Ok((index, (lat_deg - south_deg) / LATITUDE_STEP_DEG))
}

/// Same lookup over the longitude bands: western band index of the
/// enclosing cell and fractional offset from it.
fn longitude_band(lon_deg: f64) -> Result<(usize, f64), Error> {
    if !(LONGITUDE_WEST_DEG..=-LONGITUDE_WEST_DEG).contains(&lon_deg) {
        return Err(Error::LongitudeOutsideGrid(lon_deg));
    }
    let offset = (lon_deg - LONGITUDE_WEST_DEG) / LONGITUDE_STEP_DEG;
    let index = (offset.floor() as usize).min(TEC_LONGITUDE_BANDS - 2);
    let west_deg = LONGITUDE_WEST_DEG + LONGITUDE_STEP_DEG * index as f64;
    Ok((index, (lon_deg - west_deg) / LONGITUDE_STEP_DEG))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    /// value = 100 slice + lat band + 0.01 lon band
    fn synthetic_grid(day: Epoch) -> TecGrid {
        let mut values =
            Vec::with_capacity(TEC_TIME_SLICES * TEC_LATITUDE_BANDS * TEC_LONGITUDE_BANDS);
        for slice in 0..TEC_TIME_SLICES {
            for lat in 0..TEC_LATITUDE_BANDS {
                for lon in 0..TEC_LONGITUDE_BANDS {
                    values.push(slice as f64 * 100.0 + lat as f64 + lon as f64 * 0.01);
                }
            }
        }
        TecGrid::new(day, values).unwrap()
    }

    #[test]
    fn dimensions() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let error = TecGrid::new(day, vec![0.0; 12]).err().unwrap();
        assert_eq!(
            error,
            Error::TecGridDimensions {
                expected: 66456,
                found: 12,
            },
        );
    }

    #[test]
    fn exact_at_grid_nodes() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let grid = synthetic_grid(day);

        // (85.0, -175.0) is the (1, 1) node
        let delays = grid
            .delays(85.0, -175.0, &[day], DelayUnit::Tecu, 1575.42E6)
            .unwrap();
        assert_eq!(delays.len(), 1);
        assert!((delays[0] - 0.1 * grid.value(0, 1, 1)).abs() < 1.0E-9);
    }

    #[test]
    fn bilinear_cell_center() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let grid = synthetic_grid(day);

        // center of the (0..1, 0..1) cell: plain average of 4 corners
        let expected = 0.1
            * (grid.value(0, 0, 0)
                + grid.value(0, 0, 1)
                + grid.value(0, 1, 0)
                + grid.value(0, 1, 1))
            / 4.0;
        let delays = grid
            .delays(86.25, -177.5, &[day], DelayUnit::Tecu, 1575.42E6)
            .unwrap();
        assert!((delays[0] - expected).abs() < 1.0E-9);
    }

    #[test]
    fn exact_at_bin_boundaries() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let grid = synthetic_grid(day);

        // sits exactly on time slice 1: no contribution from slices 0/2
        let at_2h = day + 2.0 * Unit::Hour;
        let delays = grid
            .delays(85.0, -175.0, &[at_2h], DelayUnit::Tecu, 1575.42E6)
            .unwrap();
        assert!((delays[0] - 0.1 * grid.value(1, 1, 1)).abs() < 1.0E-9);

        // midway through a bin: even blend
        let at_1h = day + 1.0 * Unit::Hour;
        let delays = grid
            .delays(85.0, -175.0, &[at_1h], DelayUnit::Tecu, 1575.42E6)
            .unwrap();
        let expected = 0.1 * (grid.value(0, 1, 1) + grid.value(1, 1, 1)) / 2.0;
        assert!((delays[0] - expected).abs() < 1.0E-9);

        // day closure: the alias slice
        let at_24h = day + 24.0 * Unit::Hour;
        let delays = grid
            .delays(85.0, -175.0, &[at_24h], DelayUnit::Tecu, 1575.42E6)
            .unwrap();
        assert!((delays[0] - 0.1 * grid.value(12, 1, 1)).abs() < 1.0E-9);
    }

    #[test]
    fn unit_conversion() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let grid = synthetic_grid(day);
        let frequency_hz = 1575.42E6;
        let epochs = [day, day + 1.0 * Unit::Hour, day + 5.0 * Unit::Hour];

        let tecu = grid
            .delays(45.0, 7.5, &epochs, DelayUnit::Tecu, frequency_hz)
            .unwrap();
        let meters = grid
            .delays(45.0, 7.5, &epochs, DelayUnit::Meters, frequency_hz)
            .unwrap();

        for (tecu, meters) in tecu.iter().zip(meters.iter()) {
            let rebuilt = meters / (TECU_DELAY_FACTOR_M / frequency_hz.powi(2));
            assert!((rebuilt - tecu).abs() < 1.0E-9);
        }
    }

    #[test]
    fn rejected_preconditions() {
        let day = Epoch::from_gregorian_utc_at_midnight(2020, 6, 25);
        let grid = synthetic_grid(day);
        let f = 1575.42E6;

        assert_eq!(
            grid.delays(90.1, 0.0, &[day], DelayUnit::Tecu, f),
            Err(Error::LatitudeOutsideGrid(90.1)),
        );
        assert_eq!(
            grid.delays(45.0, -181.0, &[day], DelayUnit::Tecu, f),
            Err(Error::LongitudeOutsideGrid(-181.0)),
        );
        assert_eq!(
            grid.delays(
                45.0,
                0.0,
                &[day + 1.0 * Unit::Hour, day],
                DelayUnit::Tecu,
                f
            ),
            Err(Error::UnsortedEpochs),
        );

        let outside = day + 25.0 * Unit::Hour;
        assert_eq!(
            grid.delays(45.0, 0.0, &[day, outside], DelayUnit::Tecu, f),
            Err(Error::EpochOutsideGridDay(outside)),
        );
        let before = day - 1.0 * Unit::Hour;
        assert_eq!(
            grid.delays(45.0, 0.0, &[before, day], DelayUnit::Tecu, f),
            Err(Error::EpochOutsideGridDay(before)),
        );
    }

    #[rstest]
    #[case("tecu", DelayUnit::Tecu)]
    #[case("TECU", DelayUnit::Tecu)]
    #[case("meter", DelayUnit::Meters)]
    #[case("meters", DelayUnit::Meters)]
    #[case("m", DelayUnit::Meters)]
    fn unit_parsing(#[case] descriptor: &str, #[case] expected: DelayUnit) {
        assert_eq!(DelayUnit::from_str(descriptor), Ok(expected));
    }

    #[test]
    fn unknown_unit() {
        assert!(DelayUnit::from_str("feet").is_err());
    }
}
