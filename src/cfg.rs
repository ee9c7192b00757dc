use crate::{
    iono::DelayUnit,
    prelude::{Duration, Error},
};

use log::warn;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Highest applicable fitting degree for SP3 products: one order below the
/// 17 samples a 4 hour window holds at the nominal 15' product rate.
pub const MAX_POLY_DEGREE: usize = 16;

/// Degrees below this bound remain applicable but degrade the prediction.
pub const RECOMMENDED_MIN_POLY_DEGREE: usize = 11;

fn default_interval() -> Duration {
    Duration::from_seconds(30.0)
}

fn default_poly_degree() -> usize {
    MAX_POLY_DEGREE
}

fn default_buffer() -> Duration {
    Duration::from_seconds(2.1 * 3600.0)
}

fn default_product() -> String {
    "gfz".to_string()
}

fn default_unit() -> DelayUnit {
    DelayUnit::Meters
}

/// Interpolation setup, shared by both resampling strategies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Output sampling interval, 30s by default.
    /// Both strategies resample the products onto this uniform grid.
    #[cfg_attr(feature = "serde", serde(default = "default_interval"))]
    pub interval: Duration,

    /// Fitting degree of the windowed [Predictor], 16 by default,
    /// see [MAX_POLY_DEGREE] and [RECOMMENDED_MIN_POLY_DEGREE].
    /// The [Resampler] does not use it.
    #[cfg_attr(feature = "serde", serde(default = "default_poly_degree"))]
    pub poly_degree: usize,

    /// Raw product margin requested around the [Resampler] time window,
    /// on both ends, so interpolation near the window edges keeps enough
    /// surrounding samples. 2.1 hours by default.
    #[cfg_attr(feature = "serde", serde(default = "default_buffer"))]
    pub buffer: Duration,

    /// Identifier of the orbit (SP3) product source to request from the
    /// loading layer, "gfz" by default.
    #[cfg_attr(feature = "serde", serde(default = "default_product"))]
    pub sp3_product: String,

    /// Identifier of the clock product source to request from the loading
    /// layer, "gfz" by default.
    #[cfg_attr(feature = "serde", serde(default = "default_product"))]
    pub clock_product: String,

    /// Default ionospheric delay output unit, meters by default.
    #[cfg_attr(feature = "serde", serde(default = "default_unit"))]
    pub unit: DelayUnit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            poly_degree: default_poly_degree(),
            buffer: default_buffer(),
            sp3_product: default_product(),
            clock_product: default_product(),
            unit: default_unit(),
        }
    }
}

impl Config {
    /// Rejects degrees the windowed fit cannot honor. Low degrees pass
    /// with a warning.
    pub fn validate(&self) -> Result<(), Error> {
        if self.poly_degree > MAX_POLY_DEGREE {
            return Err(Error::InvalidPolynomialDegree(self.poly_degree));
        }
        if self.poly_degree < RECOMMENDED_MIN_POLY_DEGREE {
            warn!(
                "polynomial degree {} below {} is not recommended",
                self.poly_degree, RECOMMENDED_MIN_POLY_DEGREE
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.interval, Duration::from_seconds(30.0));
        assert_eq!(cfg.poly_degree, 16);
        assert!((cfg.buffer.to_seconds() - 7560.0).abs() < 1.0E-6);
        assert_eq!(cfg.sp3_product, "gfz");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn degree_validation() {
        let cfg = Config {
            poly_degree: 17,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(Error::InvalidPolynomialDegree(17)));

        // not recommended, still applicable
        let cfg = Config {
            poly_degree: 10,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn deserialize_partial() {
        let cfg: Config = serde_json::from_str(r#"{"poly_degree": 12}"#).unwrap();
        assert_eq!(cfg.poly_degree, 12);
        assert_eq!(cfg.interval, Duration::from_seconds(30.0));
    }
}
