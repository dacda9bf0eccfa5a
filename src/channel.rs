//! Sensor channel — bounded FIFO between monitors and the consolidator
//!
//! Multi-producer, single-consumer. Sends never block: a full channel
//! rejects the state and counts the drop. Receives are non-blocking here;
//! the kernel parks the consumer while the channel is empty.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::{BrakeError, Result};
use crate::sensor::SensorState;

/// Storage slots reserved for the channel
pub const MAX_CHANNEL_SLOTS: usize = 8;

/// Default channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 2;

/// Channel counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// States accepted by `try_send`
    pub sent: u32,
    /// States rejected because the channel was full
    pub dropped: u32,
    /// States handed to the consumer
    pub received: u32,
    /// Highest depth observed
    pub peak_depth: usize,
}

/// Ring of raw state tags
struct TagRing {
    buffer: [u8; MAX_CHANNEL_SLOTS],
    /// Index of the oldest item
    head: usize,
    /// Items currently queued
    len: usize,
    /// Usable slots (≤ MAX_CHANNEL_SLOTS)
    capacity: usize,
    stats: ChannelStats,
}

impl TagRing {
    fn push(&mut self, tag: u8) -> bool {
        if self.len >= self.capacity {
            self.stats.dropped += 1;
            return false;
        }
        let tail = (self.head + self.len) % self.capacity;
        self.buffer[tail] = tag;
        self.len += 1;
        self.stats.sent += 1;
        self.stats.peak_depth = self.stats.peak_depth.max(self.len);
        true
    }

    fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let tag = self.buffer[self.head];
        self.head = (self.head + 1) % self.capacity;
        self.len -= 1;
        self.stats.received += 1;
        Some(tag)
    }
}

/// Bounded sensor-state channel
pub struct SensorChannel {
    ring: Mutex<RefCell<TagRing>>,
}

impl SensorChannel {
    /// Allocate a channel with `capacity` slots
    ///
    /// Fails if `capacity` is zero or exceeds [`MAX_CHANNEL_SLOTS`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BrakeError::ResourceAllocation {
                resource: "sensor channel",
                reason: "capacity must be at least 1",
            });
        }
        if capacity > MAX_CHANNEL_SLOTS {
            return Err(BrakeError::ResourceAllocation {
                resource: "sensor channel",
                reason: "capacity exceeds reserved slots",
            });
        }
        Ok(Self {
            ring: Mutex::new(RefCell::new(TagRing {
                buffer: [0u8; MAX_CHANNEL_SLOTS],
                head: 0,
                len: 0,
                capacity,
                stats: ChannelStats::default(),
            })),
        })
    }

    /// Enqueue a state without blocking
    pub fn try_send(&self, state: SensorState) -> Result<()> {
        self.try_send_tag(state.tag())
    }

    /// Enqueue a raw tag without blocking
    pub fn try_send_tag(&self, tag: u8) -> Result<()> {
        let accepted = critical_section::with(|cs| self.ring.borrow_ref_mut(cs).push(tag));
        if accepted {
            Ok(())
        } else {
            Err(BrakeError::ChannelFull { tag })
        }
    }

    /// Dequeue the oldest tag, if any
    pub fn try_receive(&self) -> Option<u8> {
        critical_section::with(|cs| self.ring.borrow_ref_mut(cs).pop())
    }

    /// Number of queued states
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.ring.borrow_ref(cs).len)
    }

    /// No state waiting for the consolidator
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The next send would be rejected
    pub fn is_full(&self) -> bool {
        critical_section::with(|cs| {
            let ring = self.ring.borrow_ref(cs);
            ring.len >= ring.capacity
        })
    }

    /// Slots allocated at bootstrap
    pub fn capacity(&self) -> usize {
        critical_section::with(|cs| self.ring.borrow_ref(cs).capacity)
    }

    /// Snapshot of the channel counters
    pub fn stats(&self) -> ChannelStats {
        critical_section::with(|cs| self.ring.borrow_ref(cs).stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_receive() {
        let ch = SensorChannel::new(2).unwrap();
        assert!(ch.is_empty());

        ch.try_send(SensorState::TemperatureStable).unwrap();
        assert_eq!(ch.len(), 1);

        assert_eq!(ch.try_receive(), Some(SensorState::TemperatureStable.tag()));
        assert!(ch.is_empty());
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn test_third_send_reports_full() {
        let ch = SensorChannel::new(DEFAULT_CHANNEL_CAPACITY).unwrap();
        assert!(ch.try_send(SensorState::TemperatureStable).is_ok());
        assert!(ch.try_send(SensorState::PressureStable).is_ok());
        assert_eq!(
            ch.try_send(SensorState::TemperatureStable),
            Err(BrakeError::ChannelFull { tag: 0 })
        );
        assert!(ch.is_full());
        assert_eq!(ch.len(), 2);

        let stats = ch.stats();
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.peak_depth, 2);
    }

    #[test]
    fn test_fifo_order() {
        let ch = SensorChannel::new(4).unwrap();
        let order = [
            SensorState::PressureStable,
            SensorState::TemperatureOver,
            SensorState::PressureUnder,
            SensorState::TemperatureStable,
        ];
        for s in order {
            ch.try_send(s).unwrap();
        }
        for s in order {
            assert_eq!(ch.try_receive(), Some(s.tag()));
        }
    }

    #[test]
    fn test_wraparound() {
        let ch = SensorChannel::new(2).unwrap();
        // Interleave to walk the head around the ring several times
        for round in 0..5u8 {
            ch.try_send_tag(round).unwrap();
            ch.try_send_tag(round + 100).unwrap();
            assert!(ch.try_send_tag(200).is_err());
            assert_eq!(ch.try_receive(), Some(round));
            ch.try_send_tag(round + 50).unwrap();
            assert_eq!(ch.try_receive(), Some(round + 100));
            assert_eq!(ch.try_receive(), Some(round + 50));
        }
        let stats = ch.stats();
        assert_eq!(stats.sent, 15);
        assert_eq!(stats.received, 15);
        assert_eq!(stats.dropped, 5);
    }

    #[test]
    fn test_raw_unknown_tag_is_transported() {
        let ch = SensorChannel::new(2).unwrap();
        ch.try_send_tag(42).unwrap();
        assert_eq!(ch.try_receive(), Some(42));
    }

    #[test]
    fn test_allocation_limits() {
        assert!(matches!(
            SensorChannel::new(0),
            Err(BrakeError::ResourceAllocation { .. })
        ));
        assert!(matches!(
            SensorChannel::new(MAX_CHANNEL_SLOTS + 1),
            Err(BrakeError::ResourceAllocation { .. })
        ));
        assert_eq!(SensorChannel::new(MAX_CHANNEL_SLOTS).unwrap().capacity(), 8);
    }
}
