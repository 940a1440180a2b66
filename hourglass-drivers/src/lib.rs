//! Hardware driver implementations
//!
//! Concrete implementations of the traits and message types defined in
//! hourglass-core, written against the `embedded-hal` 1.0 traits so they run
//! unchanged on the board and against mocks on the host:
//!
//! - JQ8900 voice module on a bit-banged one-wire line, with blocking and
//!   stepped command sequences
//! - Audio request dispatch
//! - MPU6886 accelerometer

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod sensor;
