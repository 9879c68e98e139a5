use std::collections::VecDeque;

use log::{debug, warn};

use crate::pins;
use crate::registry::PinRegistry;

/// Phase of the 8N1 receive state machine sampling the design's TX line.
enum TxSample {
    /// Waiting for a start bit (line low).
    Idle,
    /// Shifting in data bits, LSB first.
    Data { remaining: u8, shift: u8 },
    /// Expecting the stop bit.
    Stop { byte: u8 },
}

/// Host-to-design transmit state.
enum RxDrive {
    Idle,
    /// Frame bits still to put on the line, LSB-most next.
    Shifting { bits: u16, remaining: u8 },
}

/// UART line emulation.
///
/// The board invokes [`Uart::tx_poll`] once per divided step, so one call
/// corresponds to one bit time on the line. The TX side deserializes bytes
/// the design shifts out on `UART_TX`; the RX side serializes host-queued
/// bytes onto `UART_RX` (idle high).
pub struct Uart {
    tx: TxSample,
    rx: RxDrive,
    out_buf: Vec<u8>,
    rx_queue: VecDeque<u8>,
}

impl Uart {
    pub fn new() -> Self {
        Self {
            tx: TxSample::Idle,
            rx: RxDrive::Idle,
            out_buf: Vec::new(),
            rx_queue: VecDeque::new(),
        }
    }

    /// Sample the design's TX pin for one bit time.
    pub fn tx_poll(&mut self, pins: &PinRegistry) {
        let line = pins.read(pins::UART_TX);
        self.tx = match std::mem::replace(&mut self.tx, TxSample::Idle) {
            TxSample::Idle => {
                if line == 0 {
                    TxSample::Data {
                        remaining: 8,
                        shift: 0,
                    }
                } else {
                    TxSample::Idle
                }
            }
            TxSample::Data { remaining, shift } => {
                let shift = (shift >> 1) | (line << 7);
                if remaining == 1 {
                    TxSample::Stop { byte: shift }
                } else {
                    TxSample::Data {
                        remaining: remaining - 1,
                        shift,
                    }
                }
            }
            TxSample::Stop { byte } => {
                if line == 0 {
                    warn!("uart framing error, stop bit low (byte {byte:#04x})");
                }
                debug!("uart received {byte:#04x} from design");
                self.out_buf.push(byte);
                TxSample::Idle
            }
        };
    }

    /// Queue a byte for transmission to the design.
    pub fn queue_input(&mut self, byte: u8) {
        self.rx_queue.push_back(byte);
    }

    /// True when no host byte is queued or in flight on the RX line.
    pub fn rx_idle(&self) -> bool {
        matches!(self.rx, RxDrive::Idle) && self.rx_queue.is_empty()
    }

    /// Drive the next bit of the current host byte onto the RX pin.
    pub fn rx_step(&mut self, pins: &PinRegistry) {
        if let RxDrive::Idle = self.rx {
            let Some(byte) = self.rx_queue.pop_front() else {
                return;
            };
            // start(0) + 8 data bits LSB first + stop(1), shifted out low
            // bit first.
            let bits = (u16::from(byte) << 1) | (1 << 9);
            self.rx = RxDrive::Shifting {
                bits,
                remaining: 10,
            };
        }

        if let RxDrive::Shifting { bits, remaining } = &mut self.rx {
            pins.write(pins::UART_RX, (*bits & 1) as u8);
            *bits >>= 1;
            *remaining -= 1;
            if *remaining == 0 {
                self.rx = RxDrive::Idle;
            }
        }
    }

    /// Bytes received from the design since the last call.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.out_buf)
    }

    pub fn peek_output(&self) -> &[u8] {
        &self.out_buf
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}
