use thiserror::Error;

use crate::prelude::Epoch;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Polynomial fitting above degree 16 is not applicable to SP3 products.
    /// Requests below degree 11 are accepted but logged as not recommended.
    #[error("polynomial degree {0} above 16 is not applicable")]
    InvalidPolynomialDegree(usize),

    /// Windowed prediction requires at least two distinct epochs in the
    /// concatenated orbit tables, to determine the product sampling.
    #[error("not enough distinct epochs in orbit products")]
    InsufficientEpochs,

    /// Least squares failure while fitting one coordinate axis.
    /// Extreme values or data gaps in the orbit products may cause this.
    #[error("polynomial fit failure")]
    PolynomialFit,

    /// The cubic spline system could not be solved. Should not happen on
    /// deduplicated chronological series.
    #[error("cubic spline system is singular")]
    SplineSolve,

    /// TEC grid construction from a buffer of unexpected size.
    #[error("TEC grid dimensions: expected {expected} values, found {found}")]
    TecGridDimensions { expected: usize, found: usize },

    /// Requested latitude is outside the modeled +87.5°..-87.5° bands.
    #[error("latitude {0}° outside TEC grid bands")]
    LatitudeOutsideGrid(f64),

    /// Requested longitude is outside the modeled -180°..+180° bands.
    #[error("longitude {0}° outside TEC grid bands")]
    LongitudeOutsideGrid(f64),

    /// Delay interpolation consumes the epoch list with a single forward
    /// pointer: it must be sorted ascending.
    #[error("delay epochs are not sorted ascending")]
    UnsortedEpochs,

    /// Requested epoch cannot be bracketed by the 2h time slices of the
    /// grid day.
    #[error("epoch {0} outside TEC grid day")]
    EpochOutsideGridDay(Epoch),

    /// Failed to parse a delay output unit
    #[error("unknown delay unit")]
    UnknownDelayUnit,

    /// Failed to parse a carrier signal
    #[error("unknown carrier signal")]
    UnknownCarrier,
}
