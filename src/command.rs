//! Commands and the two-byte packet carrying them over the radio link.
//!
//! Every packet is exactly [`PACKET_LEN`] bytes:
//!
//! | Byte | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | command code, see [`Command`]             |
//! | 1    | speed magnitude `0..=255`                 |
//!
//! The speed is a magnitude only. The direction of travel comes from the
//! command. Codes outside the [`Command`] set are rejected by
//! [`Packet::from_bytes`]; code `0xA9` sits between two valid codes but is
//! not assigned.

use crate::consts::PACKET_LEN;
use thiserror::Error;

/// Errors produced while decoding a packet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PacketError {
    /// The command byte is not part of the command set.
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),
    /// The payload is not exactly two bytes long.
    #[error("packet must be 2 bytes, got {0}")]
    WrongLength(usize),
}

/// The closed set of robot actions, each bound to a fixed wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Restore all lives, only honoured once the robot has none left.
    ResetLives = 0xA1,
    /// Flip auxiliary indicator A.
    ToggleA = 0xA2,
    /// Flip auxiliary indicator B.
    ToggleB = 0xA3,
    /// Flip auxiliary indicator C.
    ToggleC = 0xA4,
    /// Drive backwards, ignored while the robot is driving forward.
    Reverse = 0xA5,
    /// Stop both motors.
    Stop = 0xA6,
    /// Drive forward.
    Forward = 0xA7,
    /// Pivot left.
    Left = 0xA8,
    /// Pivot right.
    Right = 0xAA,
    /// Curve forward and to the left.
    ForwardLeft = 0xAB,
    /// Curve forward and to the right.
    ForwardRight = 0xAC,
    /// Curve backwards and to the left.
    ReverseLeft = 0xAD,
    /// Curve backwards and to the right.
    ReverseRight = 0xAE,
}

impl Command {
    /// Every command, in wire-code order.
    pub const ALL: [Command; 13] = [
        Command::ResetLives,
        Command::ToggleA,
        Command::ToggleB,
        Command::ToggleC,
        Command::Reverse,
        Command::Stop,
        Command::Forward,
        Command::Left,
        Command::Right,
        Command::ForwardLeft,
        Command::ForwardRight,
        Command::ReverseLeft,
        Command::ReverseRight,
    ];

    /// The wire code of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = PacketError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0xA1 => Ok(Command::ResetLives),
            0xA2 => Ok(Command::ToggleA),
            0xA3 => Ok(Command::ToggleB),
            0xA4 => Ok(Command::ToggleC),
            0xA5 => Ok(Command::Reverse),
            0xA6 => Ok(Command::Stop),
            0xA7 => Ok(Command::Forward),
            0xA8 => Ok(Command::Left),
            0xAA => Ok(Command::Right),
            0xAB => Ok(Command::ForwardLeft),
            0xAC => Ok(Command::ForwardRight),
            0xAD => Ok(Command::ReverseLeft),
            0xAE => Ok(Command::ReverseRight),
            other => Err(PacketError::UnknownCommand(other)),
        }
    }
}

/// One command with its speed magnitude, as exchanged over the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Packet {
    /// What the robot should do.
    pub command: Command,
    /// How hard to do it, `0..=255`.
    pub speed: u8,
}

impl Packet {
    /// Creates a packet.
    pub const fn new(command: Command, speed: u8) -> Self {
        Self { command, speed }
    }

    /// Encodes the packet into its wire form.
    pub const fn to_bytes(&self) -> [u8; PACKET_LEN] {
        [self.command.code(), self.speed]
    }

    /// Decodes a packet from its wire form.
    ///
    /// # Errors
    /// [`PacketError::UnknownCommand`] if the first byte is not a [`Command`] code.
    pub fn from_bytes(bytes: [u8; PACKET_LEN]) -> Result<Self, PacketError> {
        let command = Command::try_from(bytes[0])?;
        Ok(Self::new(command, bytes[1]))
    }
}

impl TryFrom<&[u8]> for Packet {
    type Error = PacketError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; PACKET_LEN] = bytes
            .try_into()
            .map_err(|_| PacketError::WrongLength(bytes.len()))?;
        Self::from_bytes(raw)
    }
}
