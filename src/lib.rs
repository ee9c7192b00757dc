#![doc = include_str!("../README.md")]

extern crate gnss_rs as gnss;

// private modules
mod carrier;
mod cfg;
mod constants;
mod ephemeris;
mod error;
mod iono;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::carrier::Carrier;
    pub use crate::cfg::{Config, MAX_POLY_DEGREE, RECOMMENDED_MIN_POLY_DEGREE};
    pub use crate::ephemeris::predictor::Predictor;
    pub use crate::ephemeris::resampler::{Resampler, SkipReason, SvFit, MIN_SAMPLES};
    pub use crate::ephemeris::{ClockSample, OrbitSample, SatelliteState};
    pub use crate::error::Error;
    pub use crate::iono::{
        DelayUnit, TecGrid, TEC_LATITUDE_BANDS, TEC_LONGITUDE_BANDS, TEC_TIME_SLICES,
    };
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale, TimeSeries, Unit};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
