//! Sensor states — the values carried on the sensor channel
//!
//! Six tagged states covering brake temperature and brake fluid pressure.
//! The channel transports the raw `u8` tag, so decoding is fallible.
//!
//! Author: Moroya Sakamoto

use core::fmt;

use crate::error::BrakeError;

/// Which physical quantity a state describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Brake temperature
    Temperature,
    /// Brake fluid pressure
    Pressure,
}

/// Sensor state reported by a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorState {
    TemperatureStable = 0,
    TemperatureOver = 1,
    TemperatureUnder = 2,
    PressureStable = 3,
    PressureOver = 4,
    PressureUnder = 5,
}

impl SensorState {
    /// Every state, in tag order
    pub const ALL: [SensorState; 6] = [
        SensorState::TemperatureStable,
        SensorState::TemperatureOver,
        SensorState::TemperatureUnder,
        SensorState::PressureStable,
        SensorState::PressureOver,
        SensorState::PressureUnder,
    ];

    /// Wire tag
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Console name, e.g. `TEMP_STABLE`
    pub const fn name(self) -> &'static str {
        match self {
            SensorState::TemperatureStable => "TEMP_STABLE",
            SensorState::TemperatureOver => "TEMP_OVER",
            SensorState::TemperatureUnder => "TEMP_UNDER",
            SensorState::PressureStable => "PRESS_STABLE",
            SensorState::PressureOver => "PRESS_OVER",
            SensorState::PressureUnder => "PRESS_UNDER",
        }
    }

    /// Quantity the state describes
    pub const fn kind(self) -> SensorKind {
        match self {
            SensorState::TemperatureStable
            | SensorState::TemperatureOver
            | SensorState::TemperatureUnder => SensorKind::Temperature,
            _ => SensorKind::Pressure,
        }
    }

    /// Stable readings are nominal; over/under readings are not
    pub const fn is_nominal(self) -> bool {
        matches!(
            self,
            SensorState::TemperatureStable | SensorState::PressureStable
        )
    }

    /// The nominal state for a sensor kind
    pub const fn stable(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Temperature => SensorState::TemperatureStable,
            SensorKind::Pressure => SensorState::PressureStable,
        }
    }
}

impl TryFrom<u8> for SensorState {
    type Error = BrakeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        SensorState::ALL
            .get(tag as usize)
            .copied()
            .ok_or(BrakeError::UnrecognizedState { tag })
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_wire_constants() {
        assert_eq!(SensorState::TemperatureStable.tag(), 0);
        assert_eq!(SensorState::PressureStable.tag(), 3);
        assert_eq!(SensorState::PressureUnder.tag(), 5);
    }

    #[test]
    fn test_decode_all_known_tags() {
        for state in SensorState::ALL {
            assert_eq!(SensorState::try_from(state.tag()), Ok(state));
        }
    }

    #[test]
    fn test_decode_unknown_tag() {
        assert_eq!(
            SensorState::try_from(6),
            Err(BrakeError::UnrecognizedState { tag: 6 })
        );
        assert!(SensorState::try_from(255).is_err());
    }

    #[test]
    fn test_kind_and_nominal() {
        assert_eq!(SensorState::TemperatureUnder.kind(), SensorKind::Temperature);
        assert_eq!(SensorState::PressureOver.kind(), SensorKind::Pressure);
        assert!(SensorState::PressureStable.is_nominal());
        assert!(!SensorState::TemperatureOver.is_nominal());
        assert_eq!(
            SensorState::stable(SensorKind::Pressure),
            SensorState::PressureStable
        );
    }

    #[test]
    fn test_display_uses_console_name() {
        assert_eq!(SensorState::TemperatureStable.to_string(), "TEMP_STABLE");
        assert_eq!(SensorState::PressureOver.to_string(), "PRESS_OVER");
    }
}
