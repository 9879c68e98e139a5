use std::cell::Cell;
use std::rc::Rc;

use crate::pins::{NR_PINS, PinId};

/// Shared handle to a simulated signal value.
///
/// The simulated design owns the cell and advances it between board steps;
/// the registry only reads and writes through the handle and never replaces
/// the storage. The core is single-threaded (the simulator drives it one
/// step at a time), so plain `Cell` interior mutability is sufficient.
pub type SignalRef = Rc<Cell<u64>>;

/// Create a fresh signal cell, typically owned by the simulated design.
pub fn signal(initial: u64) -> SignalRef {
    Rc::new(Cell::new(initial))
}

/// One registry slot: which bit of which signal this pin observes.
struct Pin {
    signal: SignalRef,
    vector_len: u8,
    bit_offset: u8,
}

impl Pin {
    fn unbound() -> Self {
        // Every pin gets a private fallback cell so it is readable before
        // (or without ever) being bound.
        Self {
            signal: signal(0),
            vector_len: 1,
            bit_offset: 0,
        }
    }
}

/// Fixed-capacity table mapping pin ids to bit positions inside signal cells.
///
/// Bindings assign offsets MSB first: the first id of a binding call maps to
/// the highest bit of the signal vector. Rebinding a pin simply overwrites
/// its slot; the previous signal cell is untouched.
pub struct PinRegistry {
    pins: Vec<Pin>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self {
            pins: (0..NR_PINS).map(|_| Pin::unbound()).collect(),
        }
    }

    /// Wire the bits of `signal` to `ids`, MSB first.
    ///
    /// The signal vector is `ids.len()` bits wide. Panics on a vector wider
    /// than 63 bits or an id outside the registry; both are wiring mistakes
    /// in simulation setup and cannot be continued past.
    pub fn bind(&mut self, signal: &SignalRef, ids: &[PinId]) {
        let len = ids.len();
        assert!(len < 64, "signal vector too wide: {len} bits");
        for (i, &id) in ids.iter().enumerate() {
            assert!((id as usize) < NR_PINS, "pin id {id} out of range");
            let pin = &mut self.pins[id as usize];
            pin.signal = Rc::clone(signal);
            pin.vector_len = len as u8;
            pin.bit_offset = (len - 1 - i) as u8;
        }
    }

    /// Current value of the bit this pin is wired to (0 or 1).
    pub fn read(&self, id: PinId) -> u8 {
        let pin = &self.pins[id as usize];
        ((pin.signal.get() >> pin.bit_offset) & 1) as u8
    }

    /// Set or clear the bit this pin is wired to, in place in the shared
    /// signal cell. Used by interactive widgets to drive design inputs.
    pub fn write(&self, id: PinId, bit: u8) {
        let pin = &self.pins[id as usize];
        let mask = 1u64 << pin.bit_offset;
        let value = pin.signal.get();
        pin.signal.set(if bit != 0 {
            value | mask
        } else {
            value & !mask
        });
    }

    /// Assemble a multi-bit value from a pin list, MSB first.
    pub fn read_vec(&self, ids: &[PinId]) -> u64 {
        ids.iter()
            .fold(0, |acc, &id| (acc << 1) | u64::from(self.read(id)))
    }

    /// Width of the signal vector this pin was last bound to.
    pub fn vector_len(&self, id: PinId) -> u8 {
        self.pins[id as usize].vector_len
    }

    /// Bit index this pin observes inside its signal vector.
    pub fn bit_offset(&self, id: PinId) -> u8 {
        self.pins[id as usize].bit_offset
    }
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}
