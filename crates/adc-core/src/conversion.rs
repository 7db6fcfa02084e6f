//! Raw sample to voltage conversion.

/// Largest raw value at `resolution_bits` (`2^bits - 1`).
pub fn max_raw(resolution_bits: u8) -> u32 {
    (1u32 << resolution_bits.min(31)) - 1
}

/// Convert a raw sample to volts.
///
/// `voltage = raw * (full_scale / (2^bits - 1))`, so a 10-bit reading of 1023
/// with a 3.6 V full scale converts to 3.6 V. Negative raw values (possible
/// with a single-ended input slightly below ground) convert to negative
/// voltages.
pub fn raw_to_voltage(raw: i16, resolution_bits: u8, full_scale_voltage: f64) -> f64 {
    f64::from(raw) * (full_scale_voltage / f64::from(max_raw(resolution_bits)))
}
