//! Error catalogue shared by both processors
//!
//! Codes are stable on the wire. Each one records which processor detects
//! it; only that processor announces it to the peer.

/// Processor that detects an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Origin {
    /// Power-management MCU
    Device,
    /// Linux camera host
    Host,
}

/// Known error conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    LowBattery,
    InsufficientSpace,
    ChargerFault,
    BatteryOverVoltage,
    /// Host never sent a heartbeat, or its watchdog expired
    NoCommRpi,
    /// Host did not acknowledge a shutdown request
    RpiShutdownReqTimeout,
    /// Host TX line never settled LOW after shutdown started
    RpiShutdownTimeout,
    StorageCheckFailed,
    InvalidResolution,
    PipeCreationFailed,
    MonitorThreadFailed,
    CameraNotFound,
    RecordStartFailed,
    TranscodeFailed,
    /// Code outside the catalogue, kept as received
    Other(u8),
}

impl ErrorCode {
    /// Parse from wire code
    pub fn from_u8(code: u8) -> Self {
        match code {
            2 => ErrorCode::LowBattery,
            3 => ErrorCode::InsufficientSpace,
            4 => ErrorCode::ChargerFault,
            6 => ErrorCode::BatteryOverVoltage,
            7 => ErrorCode::NoCommRpi,
            8 => ErrorCode::RpiShutdownReqTimeout,
            9 => ErrorCode::RpiShutdownTimeout,
            10 => ErrorCode::StorageCheckFailed,
            12 => ErrorCode::InvalidResolution,
            13 => ErrorCode::PipeCreationFailed,
            14 => ErrorCode::MonitorThreadFailed,
            15 => ErrorCode::CameraNotFound,
            16 => ErrorCode::RecordStartFailed,
            17 => ErrorCode::TranscodeFailed,
            other => ErrorCode::Other(other),
        }
    }

    /// Wire code; also the number of blinks shown on the LED
    pub fn code(self) -> u8 {
        match self {
            ErrorCode::LowBattery => 2,
            ErrorCode::InsufficientSpace => 3,
            ErrorCode::ChargerFault => 4,
            ErrorCode::BatteryOverVoltage => 6,
            ErrorCode::NoCommRpi => 7,
            ErrorCode::RpiShutdownReqTimeout => 8,
            ErrorCode::RpiShutdownTimeout => 9,
            ErrorCode::StorageCheckFailed => 10,
            ErrorCode::InvalidResolution => 12,
            ErrorCode::PipeCreationFailed => 13,
            ErrorCode::MonitorThreadFailed => 14,
            ErrorCode::CameraNotFound => 15,
            ErrorCode::RecordStartFailed => 16,
            ErrorCode::TranscodeFailed => 17,
            ErrorCode::Other(code) => code,
        }
    }

    /// Human-readable description
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::LowBattery => "Low Battery",
            ErrorCode::InsufficientSpace => "Insufficient storage space!",
            ErrorCode::ChargerFault => "Charger error",
            ErrorCode::BatteryOverVoltage => "Battery over-voltage detected",
            ErrorCode::NoCommRpi => "No contact with RPI!",
            ErrorCode::RpiShutdownReqTimeout => "RPI did not acknowledge shutdown!",
            ErrorCode::RpiShutdownTimeout => "Could not kill RPI - no serial hangup!",
            ErrorCode::StorageCheckFailed => "Failed to check available storage.",
            ErrorCode::InvalidResolution => "Invalid resolution format.",
            ErrorCode::PipeCreationFailed => "Failed to create pipe.",
            ErrorCode::MonitorThreadFailed => "Failed to create monitor thread.",
            ErrorCode::CameraNotFound => "No camera detected.",
            ErrorCode::RecordStartFailed => "Recording failed to start.",
            ErrorCode::TranscodeFailed => "Transcoding process failed.",
            ErrorCode::Other(_) => "Unknown error",
        }
    }

    /// Detecting processor, `None` for codes outside the catalogue
    pub fn origin(self) -> Option<Origin> {
        match self {
            ErrorCode::LowBattery
            | ErrorCode::ChargerFault
            | ErrorCode::BatteryOverVoltage
            | ErrorCode::NoCommRpi
            | ErrorCode::RpiShutdownReqTimeout
            | ErrorCode::RpiShutdownTimeout => Some(Origin::Device),
            ErrorCode::Other(_) => None,
            _ => Some(Origin::Host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in 0..=u8::MAX {
            assert_eq!(ErrorCode::from_u8(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_codes_are_other() {
        assert_eq!(ErrorCode::from_u8(0), ErrorCode::Other(0));
        assert_eq!(ErrorCode::from_u8(5), ErrorCode::Other(5));
        assert_eq!(ErrorCode::from_u8(11), ErrorCode::Other(11));
        assert_eq!(ErrorCode::Other(5).origin(), None);
    }

    #[test]
    fn test_origins() {
        assert_eq!(ErrorCode::NoCommRpi.origin(), Some(Origin::Device));
        assert_eq!(ErrorCode::RpiShutdownTimeout.origin(), Some(Origin::Device));
        assert_eq!(ErrorCode::CameraNotFound.origin(), Some(Origin::Host));
        assert_eq!(ErrorCode::InsufficientSpace.origin(), Some(Origin::Host));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ErrorCode::NoCommRpi.message(), "No contact with RPI!");
        assert_eq!(ErrorCode::TranscodeFailed.message(), "Transcoding process failed.");
    }
}
