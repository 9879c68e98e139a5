//! Virtual development board core.
//!
//! This crate contains the platform-agnostic board logic: the pin registry
//! that wires bits of simulated signals to visual pins, the per-step update
//! dispatcher, and the peripheral emulators (VGA, PS/2 keyboard, UART).
//! Frontends (desktop UI, headless harnesses) live in separate crates and
//! drive the core via the [`board`] facade.

/// Board facade: per-step dispatch, frame pacing hookup, and the `View` seam.
pub mod board;

/// PS/2 keyboard device emulation.
pub mod keyboard;

/// Self-calibrating frame pacer.
pub mod pacer;

/// Named pin map of the board.
pub mod pins;

/// Pin registry: signal-to-pin bit bindings.
pub mod registry;

/// UART line emulation (design TX sampling, host RX injection).
pub mod uart;

/// VGA raster emulation.
pub mod vga;
