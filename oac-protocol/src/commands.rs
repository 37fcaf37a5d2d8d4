//! COMMAND opcodes
//!
//! Opcodes are 16-bit and travel little-endian in a 2-byte COMMAND payload.
//! The high nibble groups them: 0xF recording start, 0xE recording end,
//! 0xD shutdown, 0xC boot/heartbeat, 0xB watchdog, 0xA button.

/// Known COMMAND opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Device asks the host to start recording
    RecordReqStart,
    /// Host reports recording has started
    RecordStarted,
    /// Device asks the host to stop recording
    RecordReqEnd,
    /// Host reports recording has ended
    RecordEnded,
    /// Device asks the host to shut down
    ShutdownReq,
    /// Host reports it is shutting down
    ShutdownStarted,
    /// Host booted / periodic heartbeat
    Heartbeat,
    /// Arm the host watchdog
    WdStart,
    /// Disarm the host watchdog
    WdStop,
    /// Reset the host watchdog timer
    WdKick,
    /// Parameter id for watchdog timeout get/set RESPONSE messages
    WdSetTimeout,
    /// Short button press, forwarded to the host
    BtnShort,
    /// Long button press, forwarded to the host
    BtnLong,
}

impl Command {
    /// Parse a command from its opcode
    pub fn from_u16(opcode: u16) -> Option<Self> {
        match opcode {
            0xF000 => Some(Command::RecordReqStart),
            0xF001 => Some(Command::RecordStarted),
            0xE000 => Some(Command::RecordReqEnd),
            0xE001 => Some(Command::RecordEnded),
            0xD000 => Some(Command::ShutdownReq),
            0xD001 => Some(Command::ShutdownStarted),
            0xC000 => Some(Command::Heartbeat),
            0xB000 => Some(Command::WdStart),
            0xB001 => Some(Command::WdStop),
            0xB002 => Some(Command::WdKick),
            0xB003 => Some(Command::WdSetTimeout),
            0xA001 => Some(Command::BtnShort),
            0xA002 => Some(Command::BtnLong),
            _ => None,
        }
    }

    /// Convert to opcode
    pub fn to_u16(self) -> u16 {
        match self {
            Command::RecordReqStart => 0xF000,
            Command::RecordStarted => 0xF001,
            Command::RecordReqEnd => 0xE000,
            Command::RecordEnded => 0xE001,
            Command::ShutdownReq => 0xD000,
            Command::ShutdownStarted => 0xD001,
            Command::Heartbeat => 0xC000,
            Command::WdStart => 0xB000,
            Command::WdStop => 0xB001,
            Command::WdKick => 0xB002,
            Command::WdSetTimeout => 0xB003,
            Command::BtnShort => 0xA001,
            Command::BtnLong => 0xA002,
        }
    }

    /// Returns true if this command proves the host is alive
    pub fn is_keepalive(self) -> bool {
        matches!(self, Command::Heartbeat | Command::WdKick)
    }
}
