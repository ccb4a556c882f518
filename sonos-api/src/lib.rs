//! High-level Sonos API for device control
//!
//! This crate provides typed UPnP operations on top of the private
//! `soap-client` crate. The only action the bridge needs is the
//! RenderingControl `SetEQ` call that toggles Night Sound and Speech
//! Enhancement on home-theater speakers.
//!
//! ```rust,no_run
//! use sonos_api::{EqCommand, EqType, SonosClient};
//!
//! let client = SonosClient::new();
//! client.set_eq("192.168.1.100", EqCommand::new(EqType::NightMode, true))?;
//! # Ok::<(), sonos_api::ControlError>(())
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod operations;
pub mod retry;
pub mod service;

pub use client::SonosClient;
pub use error::{ControlError, Result};
pub use operation::SonosOperation;
pub use operations::rendering_control::{EqCommand, EqType, SetEqOperation, SetEqRequest};
pub use retry::RetryPolicy;
pub use service::{Service, ServiceInfo};
pub use soap_client::SoapClientConfig;
