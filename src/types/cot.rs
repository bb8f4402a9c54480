//! Cause of transmission (COT).
//!
//! The low six bits of the cause octet say why an ASDU was sent; bit 6 is
//! the negative-confirmation flag and bit 7 the test flag, both carried
//! separately in the ASDU header. Interrogation and counter-request
//! responses encode their group in the value itself (20 + group,
//! 37 + group), modelled here as variant payload rather than as one
//! variant per group.

use crate::error::{Iec104Error, Result};

/// Cause of transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cot {
    Periodic,              // 1: cyclic
    Background,            // 2: background scan
    Spontaneous,           // 3
    Initialized,           // 4
    Request,               // 5: request or requested
    Activation,            // 6
    ActivationCon,         // 7
    Deactivation,          // 8
    DeactivationCon,       // 9
    ActivationTermination, // 10
    ReturnInfoRemote,      // 11: return information, remote command
    ReturnInfoLocal,       // 12: return information, local command
    FileTransfer,          // 13
    /// Response to the station interrogation (20)
    InterrogatedStation,
    /// Response to group interrogation 1..=16 (21..=36)
    InterrogatedGroup(u8),
    /// Response to the general counter request (37)
    CounterRequestGeneral,
    /// Response to counter request group 1..=4 (38..=41)
    CounterRequestGroup(u8),
    UnknownType,          // 44
    UnknownCause,         // 45
    UnknownCommonAddress, // 46
    UnknownObjectAddress, // 47
}

impl Cot {
    /// Decode the low six bits of the cause octet. The test and negative
    /// bits are the header's business and are ignored here.
    pub fn from_u8(octet: u8) -> Result<Self> {
        let cause = match octet & 0x3F {
            1 => Self::Periodic,
            2 => Self::Background,
            3 => Self::Spontaneous,
            4 => Self::Initialized,
            5 => Self::Request,
            6 => Self::Activation,
            7 => Self::ActivationCon,
            8 => Self::Deactivation,
            9 => Self::DeactivationCon,
            10 => Self::ActivationTermination,
            11 => Self::ReturnInfoRemote,
            12 => Self::ReturnInfoLocal,
            13 => Self::FileTransfer,
            20 => Self::InterrogatedStation,
            value @ 21..=36 => Self::InterrogatedGroup(value - 20),
            37 => Self::CounterRequestGeneral,
            value @ 38..=41 => Self::CounterRequestGroup(value - 37),
            44 => Self::UnknownType,
            45 => Self::UnknownCause,
            46 => Self::UnknownCommonAddress,
            47 => Self::UnknownObjectAddress,
            reserved => {
                return Err(Iec104Error::invalid_asdu(format!(
                    "Reserved cause of transmission: {reserved}"
                )))
            }
        };
        Ok(cause)
    }

    /// The wire value (low six bits of the cause octet).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Periodic => 1,
            Self::Background => 2,
            Self::Spontaneous => 3,
            Self::Initialized => 4,
            Self::Request => 5,
            Self::Activation => 6,
            Self::ActivationCon => 7,
            Self::Deactivation => 8,
            Self::DeactivationCon => 9,
            Self::ActivationTermination => 10,
            Self::ReturnInfoRemote => 11,
            Self::ReturnInfoLocal => 12,
            Self::FileTransfer => 13,
            Self::InterrogatedStation => 20,
            Self::InterrogatedGroup(group) => 20 + group,
            Self::CounterRequestGeneral => 37,
            Self::CounterRequestGroup(group) => 37 + group,
            Self::UnknownType => 44,
            Self::UnknownCause => 45,
            Self::UnknownCommonAddress => 46,
            Self::UnknownObjectAddress => 47,
        }
    }
}

impl std::fmt::Display for Cot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Periodic => f.write_str("per/cyc"),
            Self::Background => f.write_str("back"),
            Self::Spontaneous => f.write_str("spont"),
            Self::Initialized => f.write_str("init"),
            Self::Request => f.write_str("req"),
            Self::Activation => f.write_str("act"),
            Self::ActivationCon => f.write_str("actcon"),
            Self::Deactivation => f.write_str("deact"),
            Self::DeactivationCon => f.write_str("deactcon"),
            Self::ActivationTermination => f.write_str("actterm"),
            Self::ReturnInfoRemote => f.write_str("retrem"),
            Self::ReturnInfoLocal => f.write_str("retloc"),
            Self::FileTransfer => f.write_str("file"),
            Self::InterrogatedStation => f.write_str("inrogen"),
            Self::InterrogatedGroup(group) => write!(f, "inro{group}"),
            Self::CounterRequestGeneral => f.write_str("reqcogen"),
            Self::CounterRequestGroup(group) => write!(f, "reqco{group}"),
            Self::UnknownType => f.write_str("unknown type"),
            Self::UnknownCause => f.write_str("unknown cause"),
            Self::UnknownCommonAddress => f.write_str("unknown CA"),
            Self::UnknownObjectAddress => f.write_str("unknown IOA"),
        }
    }
}
