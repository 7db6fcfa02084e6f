//! Sample sequence descriptor.
//!
//! A [`SampleSequence`] tells a driver which channels to convert and where to
//! put the results. The sampler allocates one at startup and reuses it for the
//! lifetime of the process: each cycle the driver fills it, the sampler drains
//! it and then zeroes the slots it reported.

use crate::channel::MAX_CHANNELS;

/// Bitset of channels selected for one read. Bit `n` selects channel `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelMask(u32);

impl ChannelMask {
    /// Mask selecting channels `0..count`.
    pub fn first(count: usize) -> Self {
        let count = count.min(MAX_CHANNELS);
        Self(((1u64 << count) - 1) as u32)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, channel: u8) -> bool {
        channel < 32 && self.0 & (1 << channel) != 0
    }

    /// Number of selected channels.
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected channel ids in ascending order.
    pub fn channels(self) -> impl Iterator<Item = u8> {
        (0..32u8).filter(move |ch| self.contains(*ch))
    }
}

/// Channels to read, the buffer to read them into and the conversion
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSequence {
    channels: ChannelMask,
    buffer: Vec<i16>,
    resolution_bits: u8,
}

impl SampleSequence {
    /// Sequence over channels `0..channel_count` with a zeroed buffer of the
    /// same length.
    pub fn new(channel_count: usize, resolution_bits: u8) -> Self {
        let channels = ChannelMask::first(channel_count);
        Self {
            buffer: vec![0; channels.count()],
            channels,
            resolution_bits,
        }
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }

    /// Raw samples in channel-index order.
    pub fn buffer(&self) -> &[i16] {
        &self.buffer
    }

    /// Mutable access for drivers filling the sequence.
    pub fn buffer_mut(&mut self) -> &mut [i16] {
        &mut self.buffer
    }

    /// Zero one slot after it has been reported.
    pub fn clear_slot(&mut self, index: usize) {
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot = 0;
        }
    }

    /// Whether every slot is zero.
    pub fn is_cleared(&self) -> bool {
        self.buffer.iter().all(|s| *s == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_first_four() {
        let mask = ChannelMask::first(4);
        assert_eq!(mask.bits(), 0b1111);
        assert_eq!(mask.count(), 4);
        assert_eq!(mask.channels().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(mask.contains(3));
        assert!(!mask.contains(4));
    }

    #[test]
    fn test_mask_full_and_empty() {
        assert_eq!(ChannelMask::first(MAX_CHANNELS).bits(), 0xFF);
        assert_eq!(ChannelMask::first(100).bits(), 0xFF);
        assert_eq!(ChannelMask::first(0).count(), 0);
    }

    #[test]
    fn test_sparse_mask_channels() {
        let mask = ChannelMask::from_bits(0b1010_0001);
        assert_eq!(mask.channels().collect::<Vec<_>>(), vec![0, 5, 7]);
        assert!(!mask.contains(40));
    }

    #[test]
    fn test_sequence_buffer_matches_mask() {
        let seq = SampleSequence::new(4, 10);
        assert_eq!(seq.buffer().len(), 4);
        assert_eq!(seq.resolution_bits(), 10);
        assert!(seq.is_cleared());
    }

    #[test]
    fn test_clear_slot() {
        let mut seq = SampleSequence::new(2, 10);
        seq.buffer_mut().copy_from_slice(&[100, 200]);
        seq.clear_slot(0);
        assert_eq!(seq.buffer(), &[0, 200]);
        seq.clear_slot(1);
        seq.clear_slot(9);
        assert!(seq.is_cleared());
    }
}
