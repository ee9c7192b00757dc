use crate::{constants::SPEED_OF_LIGHT_M_S, prelude::Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Carrier signal, resolved externally from a (satellite system, band)
/// pair. The TEC interpolator only consumes its [Carrier::frequency].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS/QZSS/SBAS) same frequency as E1
    #[default]
    L1,
    /// L2 (GPS/QZSS)
    L2,
    /// L5 (GPS/QZSS/SBAS) same frequency as E5A and B2A
    L5,
    /// E1 (Galileo)
    E1,
    /// E5 (Galileo) same frequency as B2
    E5,
    /// E5B (Galileo) same frequency as B2I/B2B
    E5B,
    /// E6 (Galileo)
    E6,
    /// B1I (BDS)
    B1I,
    /// B2 (BDS)
    B2,
    /// B3 (BDS)
    B3,
    /// G1 (Glonass FDMA center)
    G1,
    /// G2 (Glonass FDMA center)
    G2,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
            Self::E1 => write!(f, "E1"),
            Self::E5 => write!(f, "E5"),
            Self::E5B => write!(f, "E5B"),
            Self::E6 => write!(f, "E6"),
            Self::B1I => write!(f, "B1I"),
            Self::B2 => write!(f, "B2"),
            Self::B3 => write!(f, "B3"),
            Self::G1 => write!(f, "G1"),
            Self::G2 => write!(f, "G2"),
        }
    }
}

impl std::str::FromStr for Carrier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l1" => Ok(Self::L1),
            "l2" => Ok(Self::L2),
            "l5" => Ok(Self::L5),
            "e1" => Ok(Self::E1),
            "e5" => Ok(Self::E5),
            "e5b" => Ok(Self::E5B),
            "e6" => Ok(Self::E6),
            "b1i" => Ok(Self::B1I),
            "b2" => Ok(Self::B2),
            "b3" => Ok(Self::B3),
            "g1" => Ok(Self::G1),
            "g2" => Ok(Self::G2),
            _ => Err(Error::UnknownCarrier),
        }
    }
}

impl Carrier {
    /// Returns the carrier frequency in Hz
    pub fn frequency(&self) -> f64 {
        match self {
            Self::L1 | Self::E1 => 1575.42E6_f64,
            Self::L2 => 1227.60E6_f64,
            Self::L5 => 1176.45E6_f64,
            Self::E5 | Self::B2 => 1191.795E6_f64,
            Self::E5B => 1207.14E6_f64,
            Self::E6 => 1278.750E6_f64,
            Self::B1I => 1561.098E6_f64,
            Self::B3 => 1268.52E6_f64,
            Self::G1 => 1602.0E6_f64,
            Self::G2 => 1246.0E6_f64,
        }
    }

    /// Returns the carrier wavelength in meters
    pub fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT_M_S / self.frequency()
    }
}
