//! RenderingControl service operations
//!
//! Operations for controlling audio rendering on Sonos devices.

mod set_eq;

pub use set_eq::{EqCommand, EqType, SetEqOperation, SetEqRequest};
