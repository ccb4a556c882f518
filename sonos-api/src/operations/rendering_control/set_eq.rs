//! SetEQ operation for RenderingControl service

use serde::Serialize;
use std::fmt;

use crate::{Service, SonosOperation};

/// EQ settings that `SetEQ` can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EqType {
    /// Night Sound: compresses dynamic range for quiet listening
    NightMode,
    /// Speech Enhancement: boosts dialog frequencies
    DialogLevel,
}

impl EqType {
    /// Name used for the `EQType` argument on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            EqType::NightMode => "NightMode",
            EqType::DialogLevel => "DialogLevel",
        }
    }
}

impl fmt::Display for EqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single on/off EQ change for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqCommand {
    pub kind: EqType,
    pub desired_value: bool,
}

impl EqCommand {
    pub fn new(kind: EqType, desired_value: bool) -> Self {
        Self { kind, desired_value }
    }
}

/// SetEQ operation
pub struct SetEqOperation;

/// Request for SetEQ operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetEqRequest {
    pub instance_id: u32,
    pub eq_type: EqType,
    pub desired_value: bool,
}

impl From<EqCommand> for SetEqRequest {
    fn from(command: EqCommand) -> Self {
        Self {
            instance_id: 0,
            eq_type: command.kind,
            desired_value: command.desired_value,
        }
    }
}

impl SonosOperation for SetEqOperation {
    type Request = SetEqRequest;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetEQ";

    fn build_payload(request: &Self::Request) -> String {
        // Firmware wants the boolean as a literal 1/0, not true/false
        format!(
            "<InstanceID>{}</InstanceID><EQType>{}</EQType><DesiredValue>{}</DesiredValue>",
            request.instance_id,
            request.eq_type.as_str(),
            if request.desired_value { 1 } else { 0 }
        )
    }
}
