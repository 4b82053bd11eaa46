//! The radio transport seen by the application.
//!
//! [`RadioLink`] mirrors the subset of an nRF24L01-style driver the robot
//! uses: configure channel, payload size and pipe address, then poll for
//! packets or fire packets off without waiting for an acknowledgement.
//! The SPI-level driver lives outside this crate; wrap it in an
//! implementation of this trait.
//!
//! [`LoopbackLink`] is an in-memory implementation over a bounded queue. It
//! behaves like a real transport that is busy once its queue is full, and is
//! used for simulation and tests.

use crate::consts::{LINK_ADDRESS, PACKET_LEN, RADIO_CHANNEL};
use heapless::Deque;
use thiserror::Error;

/// A 5-byte pipe address.
pub type Address = [u8; 5];

/// Radio settings shared by both ends of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LinkConfig {
    /// RF channel
    pub channel: u8,
    /// Fixed payload size, in bytes
    pub payload_size: u8,
    /// Pipe address, identical on both nodes
    pub address: Address,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    /// The reference configuration: channel 76, 2-byte payloads, address `NODE1`.
    pub const fn new() -> Self {
        Self {
            channel: RADIO_CHANNEL,
            payload_size: PACKET_LEN as u8,
            address: LINK_ADDRESS,
        }
    }

    /// Returns a copy using `channel`.
    pub const fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Returns a copy using `address`.
    pub const fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }
}

/// A packet radio.
///
/// Delivery and ordering are not guaranteed. [`write`](RadioLink::write)
/// reports a busy transport as `nb::Error::WouldBlock`; callers drop the
/// packet rather than retry.
pub trait RadioLink {
    /// Transport error.
    type Error: core::fmt::Debug;

    /// Powers up and initializes the radio.
    fn begin(&mut self) -> Result<(), Self::Error>;
    /// Selects the RF channel.
    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;
    /// Sets the fixed payload size.
    fn set_payload_size(&mut self, size: u8) -> Result<(), Self::Error>;
    /// Opens the receive pipe on `address`.
    fn open_reading_pipe(&mut self, address: &Address) -> Result<(), Self::Error>;
    /// Opens the transmit pipe to `address`.
    fn open_writing_pipe(&mut self, address: &Address) -> Result<(), Self::Error>;
    /// Switches to receive mode.
    fn start_listening(&mut self) -> Result<(), Self::Error>;
    /// Whether a packet is waiting.
    fn available(&mut self) -> bool;
    /// Reads the next waiting packet into `buf`.
    fn read(&mut self, buf: &mut [u8; PACKET_LEN]) -> Result<(), Self::Error>;
    /// Sends `buf` without waiting for delivery.
    fn write(&mut self, buf: &[u8; PACKET_LEN]) -> nb::Result<(), Self::Error>;

    /// Reads a packet if one is waiting.
    fn try_read(&mut self) -> nb::Result<[u8; PACKET_LEN], Self::Error> {
        if !self.available() {
            return Err(nb::Error::WouldBlock);
        }
        let mut buf = [0u8; PACKET_LEN];
        self.read(&mut buf).map_err(nb::Error::Other)?;
        Ok(buf)
    }
}

/// Configures `link` as the receiving end and starts listening.
pub fn setup_receiver<R: RadioLink>(link: &mut R, config: &LinkConfig) -> Result<(), R::Error> {
    link.begin()?;
    link.set_channel(config.channel)?;
    link.set_payload_size(config.payload_size)?;
    link.open_reading_pipe(&config.address)?;
    link.start_listening()
}

/// Configures `link` as the sending end.
pub fn setup_transmitter<R: RadioLink>(
    link: &mut R,
    config: &LinkConfig,
) -> Result<(), R::Error> {
    link.begin()?;
    link.set_channel(config.channel)?;
    link.set_payload_size(config.payload_size)?;
    link.open_writing_pipe(&config.address)
}

/// Errors returned by [`LoopbackLink`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkError {
    /// The link was used before [`RadioLink::begin`].
    #[error("radio not started")]
    NotStarted,
    /// Only [`PACKET_LEN`]-byte payloads are supported.
    #[error("unsupported payload size {0}")]
    PayloadSize(u8),
    /// [`RadioLink::read`] was called with no packet waiting.
    #[error("no packet waiting")]
    Empty,
}

/// An in-memory [`RadioLink`] holding up to `N` packets.
///
/// Writes go to the back of the queue and reads come from the front, so a
/// single instance loops packets from a transmitter back to a receiver.
#[derive(Debug)]
pub struct LoopbackLink<const N: usize> {
    queue: Deque<[u8; PACKET_LEN], N>,
    started: bool,
    listening: bool,
    /// Channel set by the last [`RadioLink::set_channel`]
    pub channel: Option<u8>,
    /// Address of the open reading pipe
    pub reading_pipe: Option<Address>,
    /// Address of the open writing pipe
    pub writing_pipe: Option<Address>,
}

impl<const N: usize> Default for LoopbackLink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LoopbackLink<N> {
    /// An empty, unstarted link.
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            started: false,
            listening: false,
            channel: None,
            reading_pipe: None,
            writing_pipe: None,
        }
    }

    /// Whether [`RadioLink::start_listening`] was called.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of queued packets.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no packets are queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues raw bytes as if they had arrived over the air.
    ///
    /// Returns `false` when the queue is full and the packet was lost.
    pub fn inject(&mut self, bytes: [u8; PACKET_LEN]) -> bool {
        self.queue.push_back(bytes).is_ok()
    }

    /// Removes the oldest queued packet.
    pub fn take(&mut self) -> Option<[u8; PACKET_LEN]> {
        self.queue.pop_front()
    }
}

impl<const N: usize> RadioLink for LoopbackLink<N> {
    type Error = LinkError;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.started = true;
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        if !self.started {
            return Err(LinkError::NotStarted);
        }
        self.channel = Some(channel);
        Ok(())
    }

    fn set_payload_size(&mut self, size: u8) -> Result<(), Self::Error> {
        if !self.started {
            return Err(LinkError::NotStarted);
        }
        if usize::from(size) != PACKET_LEN {
            return Err(LinkError::PayloadSize(size));
        }
        Ok(())
    }

    fn open_reading_pipe(&mut self, address: &Address) -> Result<(), Self::Error> {
        self.reading_pipe = Some(*address);
        Ok(())
    }

    fn open_writing_pipe(&mut self, address: &Address) -> Result<(), Self::Error> {
        self.writing_pipe = Some(*address);
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), Self::Error> {
        if !self.started {
            return Err(LinkError::NotStarted);
        }
        self.listening = true;
        Ok(())
    }

    fn available(&mut self) -> bool {
        !self.queue.is_empty()
    }

    fn read(&mut self, buf: &mut [u8; PACKET_LEN]) -> Result<(), Self::Error> {
        *buf = self.queue.pop_front().ok_or(LinkError::Empty)?;
        Ok(())
    }

    fn write(&mut self, buf: &[u8; PACKET_LEN]) -> nb::Result<(), Self::Error> {
        if !self.started {
            return Err(nb::Error::Other(LinkError::NotStarted));
        }
        self.queue.push_back(*buf).map_err(|_| nb::Error::WouldBlock)
    }
}
