//! Link UART adapters
//!
//! The buffered UART halves speak `embedded-io`; these wrappers expose them
//! as the blocking `oac-hal` link traits the dispatcher and RX loop use.

use embassy_rp::uart::{Config, Parity, StopBits};
use embedded_io::{Read, ReadReady, Write};

/// Map the link settings onto an embassy-rp UART config
pub fn link_config(config: &oac_hal::UartConfig) -> Config {
    let mut cfg = Config::default();
    cfg.baudrate = config.baudrate;
    cfg.parity = match config.parity {
        oac_hal::uart::Parity::None => Parity::ParityNone,
        oac_hal::uart::Parity::Even => Parity::ParityEven,
        oac_hal::uart::Parity::Odd => Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        oac_hal::uart::StopBits::One => StopBits::STOP1,
        oac_hal::uart::StopBits::Two => StopBits::STOP2,
    };
    cfg
}

/// Transmit half of the link
pub struct LinkTx<W>(W);

impl<W: Write> LinkTx<W> {
    pub fn new(tx: W) -> Self {
        Self(tx)
    }
}

impl<W: Write> oac_hal::UartTx for LinkTx<W> {
    type Error = W::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

/// Receive half of the link
pub struct LinkRx<R>(R);

impl<R: Read + ReadReady> LinkRx<R> {
    pub fn new(rx: R) -> Self {
        Self(rx)
    }
}

impl<R: Read + ReadReady> oac_hal::UartRx for LinkRx<R> {
    type Error = R::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.0.read_ready()? {
            return Ok(0);
        }
        self.0.read(buf)
    }
}
