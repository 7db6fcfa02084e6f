//! Per-channel ADC settings.
//!
//! A [`ChannelConfig`] is created once at startup and never changes. The
//! hardware settings are identical for every channel; only the channel index
//! and the positive input pin differ.
//!
//! The enumerations follow the successive-approximation ADC found on nRF52
//! parts: the input is scaled by [`Gain`] and compared against a
//! [`Reference`], so the input range mapped onto the full raw scale is
//! `reference / gain` (0.6 V / (1/6) = 3.6 V for the standard table).

use std::fmt;

/// Highest number of channels a single sequence can select.
pub const MAX_CHANNELS: usize = 8;

/// Input gain applied before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    Gain1_6,
    Gain1_5,
    Gain1_4,
    Gain1_3,
    Gain1_2,
    Gain1,
    Gain2,
    Gain4,
}

impl Gain {
    /// Multiplicative factor applied to the input voltage.
    pub fn factor(&self) -> f64 {
        match self {
            Gain::Gain1_6 => 1.0 / 6.0,
            Gain::Gain1_5 => 1.0 / 5.0,
            Gain::Gain1_4 => 1.0 / 4.0,
            Gain::Gain1_3 => 1.0 / 3.0,
            Gain::Gain1_2 => 1.0 / 2.0,
            Gain::Gain1 => 1.0,
            Gain::Gain2 => 2.0,
            Gain::Gain4 => 4.0,
        }
    }
}

/// Conversion reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Internal 0.6 V bandgap reference.
    Internal,
}

impl Reference {
    /// Reference voltage in volts.
    pub fn voltage(&self) -> f64 {
        match self {
            Reference::Internal => 0.6,
        }
    }
}

/// Sample-and-hold acquisition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionTime {
    /// Whatever the driver picks.
    Default,
    Microseconds(u16),
}

impl AcquisitionTime {
    /// Acquisition time in microseconds, if one is specified.
    pub fn as_micros(&self) -> Option<u64> {
        match self {
            AcquisitionTime::Default => None,
            AcquisitionTime::Microseconds(us) => Some(u64::from(*us)),
        }
    }
}

/// Analog input pin (`AIN0`..`AIN7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalogInput(u8);

impl AnalogInput {
    /// Input pin `AIN{index}`. Returns `None` for indices without a pin.
    pub fn ain(index: u8) -> Option<Self> {
        ((index as usize) < MAX_CHANNELS).then_some(Self(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for AnalogInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AIN{}", self.0)
    }
}

/// Configuration of one ADC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Logical channel index, also its bit in the channel mask.
    pub channel_id: u8,
    pub gain: Gain,
    pub reference: Reference,
    pub acquisition_time: AcquisitionTime,
    /// Positive input pin. Ignored by drivers without input muxing.
    pub input_positive: Option<AnalogInput>,
}

impl ChannelConfig {
    /// Gain 1/6, internal reference, 10 µs acquisition, input `AIN{channel_id}`.
    pub fn standard(channel_id: u8) -> Self {
        Self {
            channel_id,
            gain: Gain::Gain1_6,
            reference: Reference::Internal,
            acquisition_time: AcquisitionTime::Microseconds(10),
            input_positive: AnalogInput::ain(channel_id),
        }
    }

    /// Standard configuration for channels `0..count`.
    ///
    /// The ids are dense and start at zero, so they can be used directly as
    /// mask bits. `count` is capped at [`MAX_CHANNELS`].
    pub fn standard_table(count: usize) -> Vec<Self> {
        (0..count.min(MAX_CHANNELS) as u8)
            .map(Self::standard)
            .collect()
    }

    /// Input voltage mapped onto the full raw scale.
    pub fn input_range(&self) -> f64 {
        self.reference.voltage() / self.gain.factor()
    }
}
