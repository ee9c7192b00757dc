/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// First order ionospheric delay numerator, for TEC expressed in
/// electrons.m⁻² and carrier frequency in Hz: delay [m] = K * TEC / f².
/// One TECU is 10¹⁶ electrons.m⁻², hence the 10¹⁶ scaling.
pub const TECU_DELAY_FACTOR_M: f64 = 40.3 * 1.0E16;
