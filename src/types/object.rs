//! Typed information objects.
//!
//! Every catalogued type identification maps to one variant of
//! [`InformationObject`]: the polymorphic payload layer of the ASDU. Each
//! variant carries its information object address, its typed values and its
//! time tag where the type declares one, and knows its own fixed octet
//! width from the [`TypeId`] width table.
//!
//! File-transfer objects (type ids 120..127) are catalogued but not decoded.

use bytes::{BufMut, BytesMut};

use crate::error::{Iec104Error, Result};
use crate::types::{Cp16Time2a, Cp24Time2a, Cp56Time2a, Ioa, TypeId};

/// Quality descriptor for single- and double-point information.
///
/// Wire layout (SIQ/DIQ upper nibble): BL=0x10, SB=0x20, NT=0x40, IV=0x80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QualityDescriptor {
    /// Blocked (BL)
    pub blocked: bool,
    /// Substituted (SB)
    pub substituted: bool,
    /// Not topical (NT)
    pub not_topical: bool,
    /// Invalid (IV)
    pub invalid: bool,
}

impl QualityDescriptor {
    /// All flags clear.
    pub const GOOD: Self = Self {
        blocked: false,
        substituted: false,
        not_topical: false,
        invalid: false,
    };

    /// Extract the quality bits from an SIQ or DIQ octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            blocked: (value & 0x10) != 0,
            substituted: (value & 0x20) != 0,
            not_topical: (value & 0x40) != 0,
            invalid: (value & 0x80) != 0,
        }
    }

    /// Encode the quality bits (value bits left clear).
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.blocked as u8) << 4
            | (self.substituted as u8) << 5
            | (self.not_topical as u8) << 6
            | (self.invalid as u8) << 7
    }

    /// Check if the quality is good (all flags clear).
    #[inline]
    pub const fn is_good(&self) -> bool {
        !self.blocked && !self.substituted && !self.not_topical && !self.invalid
    }
}

/// Quality descriptor for measured values (QDS octet).
///
/// Wire layout: OV=0x01, BL=0x10, SB=0x20, NT=0x40, IV=0x80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasuredQuality {
    /// Overflow (OV)
    pub overflow: bool,
    /// Blocked (BL)
    pub blocked: bool,
    /// Substituted (SB)
    pub substituted: bool,
    /// Not topical (NT)
    pub not_topical: bool,
    /// Invalid (IV)
    pub invalid: bool,
}

impl MeasuredQuality {
    /// All flags clear.
    pub const GOOD: Self = Self {
        overflow: false,
        blocked: false,
        substituted: false,
        not_topical: false,
        invalid: false,
    };

    /// Parse from a QDS octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            overflow: (value & 0x01) != 0,
            blocked: (value & 0x10) != 0,
            substituted: (value & 0x20) != 0,
            not_topical: (value & 0x40) != 0,
            invalid: (value & 0x80) != 0,
        }
    }

    /// Encode to a QDS octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.overflow as u8
            | (self.blocked as u8) << 4
            | (self.substituted as u8) << 5
            | (self.not_topical as u8) << 6
            | (self.invalid as u8) << 7
    }

    /// Check if the quality is good (all flags clear).
    #[inline]
    pub const fn is_good(&self) -> bool {
        !self.overflow && !self.blocked && !self.substituted && !self.not_topical && !self.invalid
    }
}

/// Double-point information value (2 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DoublePointValue {
    /// Indeterminate or intermediate (00)
    Indeterminate = 0,
    /// Determined OFF (01)
    Off = 1,
    /// Determined ON (10)
    On = 2,
    /// Indeterminate or faulty (11)
    IndeterminateOrFaulty = 3,
}

impl DoublePointValue {
    /// Parse from the lower 2 bits.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::Indeterminate,
            1 => Self::Off,
            2 => Self::On,
            _ => Self::IndeterminateOrFaulty,
        }
    }
}

/// Regulating step command state (RCS, 2 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegulatingStepValue {
    /// Not permitted (00)
    NotPermitted0 = 0,
    /// Next step lower (01)
    Lower = 1,
    /// Next step higher (10)
    Higher = 2,
    /// Not permitted (11)
    NotPermitted3 = 3,
}

impl RegulatingStepValue {
    /// Parse from the lower 2 bits.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::NotPermitted0,
            1 => Self::Lower,
            2 => Self::Higher,
            _ => Self::NotPermitted3,
        }
    }
}

/// Normalized value: 16-bit two's complement where the full scale maps to
/// [-1, 1 - 2^-15]. The raw word is carried exactly; `value = raw / 32768`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalized(pub i16);

impl Normalized {
    /// Convert to the nominal floating point value in [-1, 1).
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 32768.0
    }

    /// Build from a floating point value, clamping to the representable
    /// range.
    pub fn from_f32(value: f32) -> Self {
        let raw = (value * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32);
        Self(raw as i16)
    }
}

/// Single-point information with quality (SIQ octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinglePointInfo {
    /// Point state
    pub on: bool,
    /// Quality descriptor
    pub quality: QualityDescriptor,
}

impl SinglePointInfo {
    /// Parse from an SIQ octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            on: (value & 0x01) != 0,
            quality: QualityDescriptor::from_u8(value),
        }
    }

    /// Encode to an SIQ octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.on as u8 | self.quality.as_u8()
    }
}

/// Double-point information with quality (DIQ octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoublePointInfo {
    /// Point state
    pub value: DoublePointValue,
    /// Quality descriptor
    pub quality: QualityDescriptor,
}

impl DoublePointInfo {
    /// Parse from a DIQ octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            value: DoublePointValue::from_u8(value),
            quality: QualityDescriptor::from_u8(value),
        }
    }

    /// Encode to a DIQ octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.value as u8 | self.quality.as_u8()
    }
}

/// Step position with transient indicator (VTI octet) and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepPositionInfo {
    /// Position (-64..63, 7-bit two's complement on the wire)
    pub value: i8,
    /// Equipment is in transient state
    pub transient: bool,
    /// Quality descriptor
    pub quality: MeasuredQuality,
}

impl StepPositionInfo {
    fn from_bytes(data: &[u8]) -> Self {
        let vti = data[0];
        Self {
            // sign-extend the 7-bit field
            value: ((vti << 1) as i8) >> 1,
            transient: (vti & 0x80) != 0,
            quality: MeasuredQuality::from_u8(data[1]),
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        let vti = (self.value as u8 & 0x7F) | if self.transient { 0x80 } else { 0 };
        buf.put_u8(vti);
        buf.put_u8(self.quality.as_u8());
    }
}

/// Binary counter reading (BCR, 5 octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryCounterInfo {
    /// Counter reading
    pub value: i32,
    /// Sequence number (0-31)
    pub sequence: u8,
    /// Carry (CY): counter overflowed in the period
    pub carry: bool,
    /// Adjusted (CA): counter was adjusted in the period
    pub adjusted: bool,
    /// Invalid (IV)
    pub invalid: bool,
}

impl BinaryCounterInfo {
    fn from_bytes(data: &[u8]) -> Self {
        let flags = data[4];
        Self {
            value: i32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            sequence: flags & 0x1F,
            carry: (flags & 0x20) != 0,
            adjusted: (flags & 0x40) != 0,
            invalid: (flags & 0x80) != 0,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.value);
        let flags = (self.sequence & 0x1F)
            | if self.carry { 0x20 } else { 0 }
            | if self.adjusted { 0x40 } else { 0 }
            | if self.invalid { 0x80 } else { 0 };
        buf.put_u8(flags);
    }
}

/// Status and status change detection (SCD, 4 octets) with quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusChangeInfo {
    /// Status of 16 points
    pub status: u16,
    /// Change-detected flags for the 16 points
    pub change: u16,
    /// Quality descriptor
    pub quality: MeasuredQuality,
}

impl StatusChangeInfo {
    fn from_bytes(data: &[u8]) -> Self {
        Self {
            status: u16::from_le_bytes([data[0], data[1]]),
            change: u16::from_le_bytes([data[2], data[3]]),
            quality: MeasuredQuality::from_u8(data[4]),
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.status);
        buf.put_u16_le(self.change);
        buf.put_u8(self.quality.as_u8());
    }
}

/// Single event of protection equipment (SEP octet plus elapsed time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtectionEventInfo {
    /// Raw SEP octet: event state plus quality bits, preserved verbatim
    pub event: u8,
    /// Elapsed time
    pub elapsed: Cp16Time2a,
}

/// Packed start events of protection equipment (SPE + QDP + relay time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtectionStartInfo {
    /// Raw SPE octet, preserved verbatim
    pub events: u8,
    /// Raw QDP quality octet, preserved verbatim
    pub quality: u8,
    /// Relay duration time
    pub relay_duration: Cp16Time2a,
}

/// Packed output circuit information of protection equipment (OCI + QDP +
/// relay operating time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtectionOutputInfo {
    /// Raw OCI octet, preserved verbatim
    pub output: u8,
    /// Raw QDP quality octet, preserved verbatim
    pub quality: u8,
    /// Relay operating time
    pub relay_operating: Cp16Time2a,
}

/// Single command state (SCO octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingleCommandInfo {
    /// Commanded state
    pub on: bool,
    /// Qualifier of command (QU, 0-31)
    pub qualifier: u8,
    /// Select (true) or execute (false)
    pub select: bool,
}

impl SingleCommandInfo {
    /// Execute command for the given state, no qualifier.
    pub const fn execute(on: bool) -> Self {
        Self {
            on,
            qualifier: 0,
            select: false,
        }
    }

    /// Parse from an SCO octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            on: (value & 0x01) != 0,
            qualifier: (value >> 2) & 0x1F,
            select: (value & 0x80) != 0,
        }
    }

    /// Encode to an SCO octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.on as u8 | (self.qualifier & 0x1F) << 2 | (self.select as u8) << 7
    }
}

/// Double command state (DCO octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleCommandInfo {
    /// Commanded state
    pub value: DoublePointValue,
    /// Qualifier of command (QU, 0-31)
    pub qualifier: u8,
    /// Select (true) or execute (false)
    pub select: bool,
}

impl DoubleCommandInfo {
    /// Execute command for the given state, no qualifier.
    pub const fn execute(value: DoublePointValue) -> Self {
        Self {
            value,
            qualifier: 0,
            select: false,
        }
    }

    /// Parse from a DCO octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            value: DoublePointValue::from_u8(value),
            qualifier: (value >> 2) & 0x1F,
            select: (value & 0x80) != 0,
        }
    }

    /// Encode to a DCO octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.value as u8 | (self.qualifier & 0x1F) << 2 | (self.select as u8) << 7
    }
}

/// Regulating step command state (RCO octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulatingStepInfo {
    /// Commanded step
    pub step: RegulatingStepValue,
    /// Qualifier of command (QU, 0-31)
    pub qualifier: u8,
    /// Select (true) or execute (false)
    pub select: bool,
}

impl RegulatingStepInfo {
    /// Parse from an RCO octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            step: RegulatingStepValue::from_u8(value),
            qualifier: (value >> 2) & 0x1F,
            select: (value & 0x80) != 0,
        }
    }

    /// Encode to an RCO octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.step as u8 | (self.qualifier & 0x1F) << 2 | (self.select as u8) << 7
    }
}

/// Qualifier of set-point command (QOS octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetpointQualifier {
    /// Qualifier value (QL, 0-127)
    pub ql: u8,
    /// Select (true) or execute (false)
    pub select: bool,
}

impl SetpointQualifier {
    /// Parse from a QOS octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            ql: value & 0x7F,
            select: (value & 0x80) != 0,
        }
    }

    /// Encode to a QOS octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.ql & 0x7F) | (self.select as u8) << 7
    }
}

/// Cause of initialization (COI octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CauseOfInit {
    /// Cause value (0 = local power on, 1 = local manual reset, 2 = remote
    /// reset; 3-127 reserved/private)
    pub cause: u8,
    /// Initialization after change of local parameters
    pub local_change: bool,
}

impl CauseOfInit {
    /// Parse from a COI octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            cause: value & 0x7F,
            local_change: (value & 0x80) != 0,
        }
    }

    /// Encode to a COI octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.cause & 0x7F) | (self.local_change as u8) << 7
    }
}

/// Fixed test bit pattern of the C_TS_NA_1 telegram.
pub const TEST_PATTERN: [u8; 2] = [0xCC, 0x55];

/// A typed information object: one variant per catalogued type id.
///
/// The first field of every variant is the information object address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InformationObject {
    /// M_SP_NA_1 (1)
    SinglePoint(Ioa, SinglePointInfo),
    /// M_SP_TA_1 (2)
    SinglePointTime24(Ioa, SinglePointInfo, Cp24Time2a),
    /// M_DP_NA_1 (3)
    DoublePoint(Ioa, DoublePointInfo),
    /// M_DP_TA_1 (4)
    DoublePointTime24(Ioa, DoublePointInfo, Cp24Time2a),
    /// M_ST_NA_1 (5)
    StepPosition(Ioa, StepPositionInfo),
    /// M_ST_TA_1 (6)
    StepPositionTime24(Ioa, StepPositionInfo, Cp24Time2a),
    /// M_BO_NA_1 (7): bitstring of 32 bit with quality
    Bitstring32(Ioa, u32, MeasuredQuality),
    /// M_BO_TA_1 (8)
    Bitstring32Time24(Ioa, u32, MeasuredQuality, Cp24Time2a),
    /// M_ME_NA_1 (9)
    MeasuredNormalized(Ioa, Normalized, MeasuredQuality),
    /// M_ME_TA_1 (10)
    MeasuredNormalizedTime24(Ioa, Normalized, MeasuredQuality, Cp24Time2a),
    /// M_ME_NB_1 (11)
    MeasuredScaled(Ioa, i16, MeasuredQuality),
    /// M_ME_TB_1 (12)
    MeasuredScaledTime24(Ioa, i16, MeasuredQuality, Cp24Time2a),
    /// M_ME_NC_1 (13)
    MeasuredFloat(Ioa, f32, MeasuredQuality),
    /// M_ME_TC_1 (14)
    MeasuredFloatTime24(Ioa, f32, MeasuredQuality, Cp24Time2a),
    /// M_IT_NA_1 (15)
    IntegratedTotals(Ioa, BinaryCounterInfo),
    /// M_IT_TA_1 (16)
    IntegratedTotalsTime24(Ioa, BinaryCounterInfo, Cp24Time2a),
    /// M_EP_TA_1 (17)
    ProtectionEventTime24(Ioa, ProtectionEventInfo, Cp24Time2a),
    /// M_EP_TB_1 (18)
    ProtectionStartEventsTime24(Ioa, ProtectionStartInfo, Cp24Time2a),
    /// M_EP_TC_1 (19)
    ProtectionOutputCircuitTime24(Ioa, ProtectionOutputInfo, Cp24Time2a),
    /// M_PS_NA_1 (20)
    PackedSinglePoint(Ioa, StatusChangeInfo),
    /// M_ME_ND_1 (21)
    MeasuredNormalizedNoQuality(Ioa, Normalized),
    /// M_SP_TB_1 (30)
    SinglePointTime56(Ioa, SinglePointInfo, Cp56Time2a),
    /// M_DP_TB_1 (31)
    DoublePointTime56(Ioa, DoublePointInfo, Cp56Time2a),
    /// M_ST_TB_1 (32)
    StepPositionTime56(Ioa, StepPositionInfo, Cp56Time2a),
    /// M_BO_TB_1 (33)
    Bitstring32Time56(Ioa, u32, MeasuredQuality, Cp56Time2a),
    /// M_ME_TD_1 (34)
    MeasuredNormalizedTime56(Ioa, Normalized, MeasuredQuality, Cp56Time2a),
    /// M_ME_TE_1 (35)
    MeasuredScaledTime56(Ioa, i16, MeasuredQuality, Cp56Time2a),
    /// M_ME_TF_1 (36)
    MeasuredFloatTime56(Ioa, f32, MeasuredQuality, Cp56Time2a),
    /// M_IT_TB_1 (37)
    IntegratedTotalsTime56(Ioa, BinaryCounterInfo, Cp56Time2a),
    /// M_EP_TD_1 (38)
    ProtectionEventTime56(Ioa, ProtectionEventInfo, Cp56Time2a),
    /// M_EP_TE_1 (39)
    ProtectionStartEventsTime56(Ioa, ProtectionStartInfo, Cp56Time2a),
    /// M_EP_TF_1 (40)
    ProtectionOutputCircuitTime56(Ioa, ProtectionOutputInfo, Cp56Time2a),
    /// C_SC_NA_1 (45)
    SingleCommand(Ioa, SingleCommandInfo),
    /// C_DC_NA_1 (46)
    DoubleCommand(Ioa, DoubleCommandInfo),
    /// C_RC_NA_1 (47)
    RegulatingStep(Ioa, RegulatingStepInfo),
    /// C_SE_NA_1 (48)
    SetpointNormalized(Ioa, Normalized, SetpointQualifier),
    /// C_SE_NB_1 (49)
    SetpointScaled(Ioa, i16, SetpointQualifier),
    /// C_SE_NC_1 (50)
    SetpointFloat(Ioa, f32, SetpointQualifier),
    /// C_BO_NA_1 (51)
    Bitstring32Command(Ioa, u32),
    /// C_SC_TA_1 (58)
    SingleCommandTime56(Ioa, SingleCommandInfo, Cp56Time2a),
    /// C_DC_TA_1 (59)
    DoubleCommandTime56(Ioa, DoubleCommandInfo, Cp56Time2a),
    /// C_RC_TA_1 (60)
    RegulatingStepTime56(Ioa, RegulatingStepInfo, Cp56Time2a),
    /// C_SE_TA_1 (61)
    SetpointNormalizedTime56(Ioa, Normalized, SetpointQualifier, Cp56Time2a),
    /// C_SE_TB_1 (62)
    SetpointScaledTime56(Ioa, i16, SetpointQualifier, Cp56Time2a),
    /// C_SE_TC_1 (63)
    SetpointFloatTime56(Ioa, f32, SetpointQualifier, Cp56Time2a),
    /// C_BO_TA_1 (64)
    Bitstring32CommandTime56(Ioa, u32, Cp56Time2a),
    /// M_EI_NA_1 (70)
    EndOfInit(Ioa, CauseOfInit),
    /// C_IC_NA_1 (100): qualifier of interrogation (QOI; 20 = station)
    Interrogation(Ioa, u8),
    /// C_CI_NA_1 (101): qualifier of counter interrogation (QCC)
    CounterInterrogation(Ioa, u8),
    /// C_RD_NA_1 (102): address only
    Read(Ioa),
    /// C_CS_NA_1 (103)
    ClockSync(Ioa, Cp56Time2a),
    /// C_TS_NA_1 (104): fixed test bit pattern
    TestCommand(Ioa),
    /// C_RP_NA_1 (105): qualifier of reset process (QRP)
    ResetProcess(Ioa, u8),
    /// C_CD_NA_1 (106)
    DelayAcquisition(Ioa, Cp16Time2a),
    /// C_TS_TA_1 (107): test sequence counter plus time
    TestCommandTime56(Ioa, u16, Cp56Time2a),
    /// P_ME_NA_1 (110): normalized parameter with qualifier (QPM)
    ParameterNormalized(Ioa, Normalized, u8),
    /// P_ME_NB_1 (111): scaled parameter with qualifier (QPM)
    ParameterScaled(Ioa, i16, u8),
    /// P_ME_NC_1 (112): float parameter with qualifier (QPM)
    ParameterFloat(Ioa, f32, u8),
    /// P_AC_NA_1 (113): qualifier of parameter activation (QPA)
    ParameterActivation(Ioa, u8),
}

impl InformationObject {
    /// The type identification this object declares.
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::SinglePoint(..) => TypeId::SinglePoint,
            Self::SinglePointTime24(..) => TypeId::SinglePointTime24,
            Self::DoublePoint(..) => TypeId::DoublePoint,
            Self::DoublePointTime24(..) => TypeId::DoublePointTime24,
            Self::StepPosition(..) => TypeId::StepPosition,
            Self::StepPositionTime24(..) => TypeId::StepPositionTime24,
            Self::Bitstring32(..) => TypeId::Bitstring32,
            Self::Bitstring32Time24(..) => TypeId::Bitstring32Time24,
            Self::MeasuredNormalized(..) => TypeId::MeasuredNormalized,
            Self::MeasuredNormalizedTime24(..) => TypeId::MeasuredNormalizedTime24,
            Self::MeasuredScaled(..) => TypeId::MeasuredScaled,
            Self::MeasuredScaledTime24(..) => TypeId::MeasuredScaledTime24,
            Self::MeasuredFloat(..) => TypeId::MeasuredFloat,
            Self::MeasuredFloatTime24(..) => TypeId::MeasuredFloatTime24,
            Self::IntegratedTotals(..) => TypeId::IntegratedTotals,
            Self::IntegratedTotalsTime24(..) => TypeId::IntegratedTotalsTime24,
            Self::ProtectionEventTime24(..) => TypeId::ProtectionEventTime24,
            Self::ProtectionStartEventsTime24(..) => TypeId::ProtectionStartEventsTime24,
            Self::ProtectionOutputCircuitTime24(..) => TypeId::ProtectionOutputCircuitTime24,
            Self::PackedSinglePoint(..) => TypeId::PackedSinglePoint,
            Self::MeasuredNormalizedNoQuality(..) => TypeId::MeasuredNormalizedNoQuality,
            Self::SinglePointTime56(..) => TypeId::SinglePointTime56,
            Self::DoublePointTime56(..) => TypeId::DoublePointTime56,
            Self::StepPositionTime56(..) => TypeId::StepPositionTime56,
            Self::Bitstring32Time56(..) => TypeId::Bitstring32Time56,
            Self::MeasuredNormalizedTime56(..) => TypeId::MeasuredNormalizedTime56,
            Self::MeasuredScaledTime56(..) => TypeId::MeasuredScaledTime56,
            Self::MeasuredFloatTime56(..) => TypeId::MeasuredFloatTime56,
            Self::IntegratedTotalsTime56(..) => TypeId::IntegratedTotalsTime56,
            Self::ProtectionEventTime56(..) => TypeId::ProtectionEventTime56,
            Self::ProtectionStartEventsTime56(..) => TypeId::ProtectionStartEventsTime56,
            Self::ProtectionOutputCircuitTime56(..) => TypeId::ProtectionOutputCircuitTime56,
            Self::SingleCommand(..) => TypeId::SingleCommand,
            Self::DoubleCommand(..) => TypeId::DoubleCommand,
            Self::RegulatingStep(..) => TypeId::RegulatingStep,
            Self::SetpointNormalized(..) => TypeId::SetpointNormalized,
            Self::SetpointScaled(..) => TypeId::SetpointScaled,
            Self::SetpointFloat(..) => TypeId::SetpointFloat,
            Self::Bitstring32Command(..) => TypeId::Bitstring32Command,
            Self::SingleCommandTime56(..) => TypeId::SingleCommandTime56,
            Self::DoubleCommandTime56(..) => TypeId::DoubleCommandTime56,
            Self::RegulatingStepTime56(..) => TypeId::RegulatingStepTime56,
            Self::SetpointNormalizedTime56(..) => TypeId::SetpointNormalizedTime56,
            Self::SetpointScaledTime56(..) => TypeId::SetpointScaledTime56,
            Self::SetpointFloatTime56(..) => TypeId::SetpointFloatTime56,
            Self::Bitstring32CommandTime56(..) => TypeId::Bitstring32CommandTime56,
            Self::EndOfInit(..) => TypeId::EndOfInit,
            Self::Interrogation(..) => TypeId::Interrogation,
            Self::CounterInterrogation(..) => TypeId::CounterInterrogation,
            Self::Read(..) => TypeId::Read,
            Self::ClockSync(..) => TypeId::ClockSync,
            Self::TestCommand(..) => TypeId::TestCommand,
            Self::ResetProcess(..) => TypeId::ResetProcess,
            Self::DelayAcquisition(..) => TypeId::DelayAcquisition,
            Self::TestCommandTime56(..) => TypeId::TestCommandTime56,
            Self::ParameterNormalized(..) => TypeId::ParameterNormalized,
            Self::ParameterScaled(..) => TypeId::ParameterScaled,
            Self::ParameterFloat(..) => TypeId::ParameterFloat,
            Self::ParameterActivation(..) => TypeId::ParameterActivation,
        }
    }

    /// The information object address.
    pub const fn ioa(&self) -> Ioa {
        match self {
            Self::SinglePoint(ioa, ..)
            | Self::SinglePointTime24(ioa, ..)
            | Self::DoublePoint(ioa, ..)
            | Self::DoublePointTime24(ioa, ..)
            | Self::StepPosition(ioa, ..)
            | Self::StepPositionTime24(ioa, ..)
            | Self::Bitstring32(ioa, ..)
            | Self::Bitstring32Time24(ioa, ..)
            | Self::MeasuredNormalized(ioa, ..)
            | Self::MeasuredNormalizedTime24(ioa, ..)
            | Self::MeasuredScaled(ioa, ..)
            | Self::MeasuredScaledTime24(ioa, ..)
            | Self::MeasuredFloat(ioa, ..)
            | Self::MeasuredFloatTime24(ioa, ..)
            | Self::IntegratedTotals(ioa, ..)
            | Self::IntegratedTotalsTime24(ioa, ..)
            | Self::ProtectionEventTime24(ioa, ..)
            | Self::ProtectionStartEventsTime24(ioa, ..)
            | Self::ProtectionOutputCircuitTime24(ioa, ..)
            | Self::PackedSinglePoint(ioa, ..)
            | Self::MeasuredNormalizedNoQuality(ioa, ..)
            | Self::SinglePointTime56(ioa, ..)
            | Self::DoublePointTime56(ioa, ..)
            | Self::StepPositionTime56(ioa, ..)
            | Self::Bitstring32Time56(ioa, ..)
            | Self::MeasuredNormalizedTime56(ioa, ..)
            | Self::MeasuredScaledTime56(ioa, ..)
            | Self::MeasuredFloatTime56(ioa, ..)
            | Self::IntegratedTotalsTime56(ioa, ..)
            | Self::ProtectionEventTime56(ioa, ..)
            | Self::ProtectionStartEventsTime56(ioa, ..)
            | Self::ProtectionOutputCircuitTime56(ioa, ..)
            | Self::SingleCommand(ioa, ..)
            | Self::DoubleCommand(ioa, ..)
            | Self::RegulatingStep(ioa, ..)
            | Self::SetpointNormalized(ioa, ..)
            | Self::SetpointScaled(ioa, ..)
            | Self::SetpointFloat(ioa, ..)
            | Self::Bitstring32Command(ioa, ..)
            | Self::SingleCommandTime56(ioa, ..)
            | Self::DoubleCommandTime56(ioa, ..)
            | Self::RegulatingStepTime56(ioa, ..)
            | Self::SetpointNormalizedTime56(ioa, ..)
            | Self::SetpointScaledTime56(ioa, ..)
            | Self::SetpointFloatTime56(ioa, ..)
            | Self::Bitstring32CommandTime56(ioa, ..)
            | Self::EndOfInit(ioa, ..)
            | Self::Interrogation(ioa, ..)
            | Self::CounterInterrogation(ioa, ..)
            | Self::Read(ioa)
            | Self::ClockSync(ioa, ..)
            | Self::TestCommand(ioa)
            | Self::ResetProcess(ioa, ..)
            | Self::DelayAcquisition(ioa, ..)
            | Self::TestCommandTime56(ioa, ..)
            | Self::ParameterNormalized(ioa, ..)
            | Self::ParameterScaled(ioa, ..)
            | Self::ParameterFloat(ioa, ..)
            | Self::ParameterActivation(ioa, ..) => *ioa,
        }
    }

    /// Encode the element payload (the octets after the address).
    pub fn encode_payload(&self, buf: &mut BytesMut) {
        match self {
            Self::SinglePoint(_, sp) => buf.put_u8(sp.as_u8()),
            Self::SinglePointTime24(_, sp, t) => {
                buf.put_u8(sp.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::DoublePoint(_, dp) => buf.put_u8(dp.as_u8()),
            Self::DoublePointTime24(_, dp, t) => {
                buf.put_u8(dp.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::StepPosition(_, st) => st.encode(buf),
            Self::StepPositionTime24(_, st, t) => {
                st.encode(buf);
                buf.put_slice(&t.to_bytes());
            }
            Self::Bitstring32(_, v, q) => {
                buf.put_u32_le(*v);
                buf.put_u8(q.as_u8());
            }
            Self::Bitstring32Time24(_, v, q, t) => {
                buf.put_u32_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredNormalized(_, v, q) => {
                buf.put_i16_le(v.0);
                buf.put_u8(q.as_u8());
            }
            Self::MeasuredNormalizedTime24(_, v, q, t) => {
                buf.put_i16_le(v.0);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredScaled(_, v, q) => {
                buf.put_i16_le(*v);
                buf.put_u8(q.as_u8());
            }
            Self::MeasuredScaledTime24(_, v, q, t) => {
                buf.put_i16_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredFloat(_, v, q) => {
                buf.put_f32_le(*v);
                buf.put_u8(q.as_u8());
            }
            Self::MeasuredFloatTime24(_, v, q, t) => {
                buf.put_f32_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::IntegratedTotals(_, c) => c.encode(buf),
            Self::IntegratedTotalsTime24(_, c, t) => {
                c.encode(buf);
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionEventTime24(_, p, t) => {
                buf.put_u8(p.event);
                buf.put_slice(&p.elapsed.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionStartEventsTime24(_, p, t) => {
                buf.put_u8(p.events);
                buf.put_u8(p.quality);
                buf.put_slice(&p.relay_duration.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionOutputCircuitTime24(_, p, t) => {
                buf.put_u8(p.output);
                buf.put_u8(p.quality);
                buf.put_slice(&p.relay_operating.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::PackedSinglePoint(_, s) => s.encode(buf),
            Self::MeasuredNormalizedNoQuality(_, v) => buf.put_i16_le(v.0),
            Self::SinglePointTime56(_, sp, t) => {
                buf.put_u8(sp.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::DoublePointTime56(_, dp, t) => {
                buf.put_u8(dp.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::StepPositionTime56(_, st, t) => {
                st.encode(buf);
                buf.put_slice(&t.to_bytes());
            }
            Self::Bitstring32Time56(_, v, q, t) => {
                buf.put_u32_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredNormalizedTime56(_, v, q, t) => {
                buf.put_i16_le(v.0);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredScaledTime56(_, v, q, t) => {
                buf.put_i16_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::MeasuredFloatTime56(_, v, q, t) => {
                buf.put_f32_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::IntegratedTotalsTime56(_, c, t) => {
                c.encode(buf);
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionEventTime56(_, p, t) => {
                buf.put_u8(p.event);
                buf.put_slice(&p.elapsed.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionStartEventsTime56(_, p, t) => {
                buf.put_u8(p.events);
                buf.put_u8(p.quality);
                buf.put_slice(&p.relay_duration.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::ProtectionOutputCircuitTime56(_, p, t) => {
                buf.put_u8(p.output);
                buf.put_u8(p.quality);
                buf.put_slice(&p.relay_operating.to_bytes());
                buf.put_slice(&t.to_bytes());
            }
            Self::SingleCommand(_, c) => buf.put_u8(c.as_u8()),
            Self::DoubleCommand(_, c) => buf.put_u8(c.as_u8()),
            Self::RegulatingStep(_, c) => buf.put_u8(c.as_u8()),
            Self::SetpointNormalized(_, v, q) => {
                buf.put_i16_le(v.0);
                buf.put_u8(q.as_u8());
            }
            Self::SetpointScaled(_, v, q) => {
                buf.put_i16_le(*v);
                buf.put_u8(q.as_u8());
            }
            Self::SetpointFloat(_, v, q) => {
                buf.put_f32_le(*v);
                buf.put_u8(q.as_u8());
            }
            Self::Bitstring32Command(_, v) => buf.put_u32_le(*v),
            Self::SingleCommandTime56(_, c, t) => {
                buf.put_u8(c.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::DoubleCommandTime56(_, c, t) => {
                buf.put_u8(c.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::RegulatingStepTime56(_, c, t) => {
                buf.put_u8(c.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::SetpointNormalizedTime56(_, v, q, t) => {
                buf.put_i16_le(v.0);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::SetpointScaledTime56(_, v, q, t) => {
                buf.put_i16_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::SetpointFloatTime56(_, v, q, t) => {
                buf.put_f32_le(*v);
                buf.put_u8(q.as_u8());
                buf.put_slice(&t.to_bytes());
            }
            Self::Bitstring32CommandTime56(_, v, t) => {
                buf.put_u32_le(*v);
                buf.put_slice(&t.to_bytes());
            }
            Self::EndOfInit(_, coi) => buf.put_u8(coi.as_u8()),
            Self::Interrogation(_, qoi) => buf.put_u8(*qoi),
            Self::CounterInterrogation(_, qcc) => buf.put_u8(*qcc),
            Self::Read(_) => {}
            Self::ClockSync(_, t) => buf.put_slice(&t.to_bytes()),
            Self::TestCommand(_) => buf.put_slice(&TEST_PATTERN),
            Self::ResetProcess(_, qrp) => buf.put_u8(*qrp),
            Self::DelayAcquisition(_, t) => buf.put_slice(&t.to_bytes()),
            Self::TestCommandTime56(_, counter, t) => {
                buf.put_u16_le(*counter);
                buf.put_slice(&t.to_bytes());
            }
            Self::ParameterNormalized(_, v, qpm) => {
                buf.put_i16_le(v.0);
                buf.put_u8(*qpm);
            }
            Self::ParameterScaled(_, v, qpm) => {
                buf.put_i16_le(*v);
                buf.put_u8(*qpm);
            }
            Self::ParameterFloat(_, v, qpm) => {
                buf.put_f32_le(*v);
                buf.put_u8(*qpm);
            }
            Self::ParameterActivation(_, qpa) => buf.put_u8(*qpa),
        }
    }

    /// Decode an element payload of the given type at the given address.
    ///
    /// `data` must hold at least the type's declared element width.
    pub fn decode(type_id: TypeId, ioa: Ioa, data: &[u8]) -> Result<Self> {
        let width = type_id.element_width().ok_or_else(|| {
            Iec104Error::invalid_asdu(format!(
                "{} objects are not decoded",
                type_id.standard_name()
            ))
        })?;
        if data.len() < width {
            return Err(Iec104Error::invalid_asdu_static(
                "Truncated information object",
            ));
        }

        let obj = match type_id {
            TypeId::SinglePoint => Self::SinglePoint(ioa, SinglePointInfo::from_u8(data[0])),
            TypeId::SinglePointTime24 => Self::SinglePointTime24(
                ioa,
                SinglePointInfo::from_u8(data[0]),
                Cp24Time2a::from_bytes(&data[1..4])?,
            ),
            TypeId::DoublePoint => Self::DoublePoint(ioa, DoublePointInfo::from_u8(data[0])),
            TypeId::DoublePointTime24 => Self::DoublePointTime24(
                ioa,
                DoublePointInfo::from_u8(data[0]),
                Cp24Time2a::from_bytes(&data[1..4])?,
            ),
            TypeId::StepPosition => Self::StepPosition(ioa, StepPositionInfo::from_bytes(data)),
            TypeId::StepPositionTime24 => Self::StepPositionTime24(
                ioa,
                StepPositionInfo::from_bytes(data),
                Cp24Time2a::from_bytes(&data[2..5])?,
            ),
            TypeId::Bitstring32 => Self::Bitstring32(
                ioa,
                u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
            ),
            TypeId::Bitstring32Time24 => Self::Bitstring32Time24(
                ioa,
                u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
                Cp24Time2a::from_bytes(&data[5..8])?,
            ),
            TypeId::MeasuredNormalized => Self::MeasuredNormalized(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                MeasuredQuality::from_u8(data[2]),
            ),
            TypeId::MeasuredNormalizedTime24 => Self::MeasuredNormalizedTime24(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                MeasuredQuality::from_u8(data[2]),
                Cp24Time2a::from_bytes(&data[3..6])?,
            ),
            TypeId::MeasuredScaled => Self::MeasuredScaled(
                ioa,
                i16::from_le_bytes([data[0], data[1]]),
                MeasuredQuality::from_u8(data[2]),
            ),
            TypeId::MeasuredScaledTime24 => Self::MeasuredScaledTime24(
                ioa,
                i16::from_le_bytes([data[0], data[1]]),
                MeasuredQuality::from_u8(data[2]),
                Cp24Time2a::from_bytes(&data[3..6])?,
            ),
            TypeId::MeasuredFloat => Self::MeasuredFloat(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
            ),
            TypeId::MeasuredFloatTime24 => Self::MeasuredFloatTime24(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
                Cp24Time2a::from_bytes(&data[5..8])?,
            ),
            TypeId::IntegratedTotals => {
                Self::IntegratedTotals(ioa, BinaryCounterInfo::from_bytes(data))
            }
            TypeId::IntegratedTotalsTime24 => Self::IntegratedTotalsTime24(
                ioa,
                BinaryCounterInfo::from_bytes(data),
                Cp24Time2a::from_bytes(&data[5..8])?,
            ),
            TypeId::ProtectionEventTime24 => Self::ProtectionEventTime24(
                ioa,
                ProtectionEventInfo {
                    event: data[0],
                    elapsed: Cp16Time2a::from_bytes(&data[1..3])?,
                },
                Cp24Time2a::from_bytes(&data[3..6])?,
            ),
            TypeId::ProtectionStartEventsTime24 => Self::ProtectionStartEventsTime24(
                ioa,
                ProtectionStartInfo {
                    events: data[0],
                    quality: data[1],
                    relay_duration: Cp16Time2a::from_bytes(&data[2..4])?,
                },
                Cp24Time2a::from_bytes(&data[4..7])?,
            ),
            TypeId::ProtectionOutputCircuitTime24 => Self::ProtectionOutputCircuitTime24(
                ioa,
                ProtectionOutputInfo {
                    output: data[0],
                    quality: data[1],
                    relay_operating: Cp16Time2a::from_bytes(&data[2..4])?,
                },
                Cp24Time2a::from_bytes(&data[4..7])?,
            ),
            TypeId::PackedSinglePoint => {
                Self::PackedSinglePoint(ioa, StatusChangeInfo::from_bytes(data))
            }
            TypeId::MeasuredNormalizedNoQuality => Self::MeasuredNormalizedNoQuality(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
            ),
            TypeId::SinglePointTime56 => Self::SinglePointTime56(
                ioa,
                SinglePointInfo::from_u8(data[0]),
                Cp56Time2a::from_bytes(&data[1..8])?,
            ),
            TypeId::DoublePointTime56 => Self::DoublePointTime56(
                ioa,
                DoublePointInfo::from_u8(data[0]),
                Cp56Time2a::from_bytes(&data[1..8])?,
            ),
            TypeId::StepPositionTime56 => Self::StepPositionTime56(
                ioa,
                StepPositionInfo::from_bytes(data),
                Cp56Time2a::from_bytes(&data[2..9])?,
            ),
            TypeId::Bitstring32Time56 => Self::Bitstring32Time56(
                ioa,
                u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
                Cp56Time2a::from_bytes(&data[5..12])?,
            ),
            TypeId::MeasuredNormalizedTime56 => Self::MeasuredNormalizedTime56(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                MeasuredQuality::from_u8(data[2]),
                Cp56Time2a::from_bytes(&data[3..10])?,
            ),
            TypeId::MeasuredScaledTime56 => Self::MeasuredScaledTime56(
                ioa,
                i16::from_le_bytes([data[0], data[1]]),
                MeasuredQuality::from_u8(data[2]),
                Cp56Time2a::from_bytes(&data[3..10])?,
            ),
            TypeId::MeasuredFloatTime56 => Self::MeasuredFloatTime56(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                MeasuredQuality::from_u8(data[4]),
                Cp56Time2a::from_bytes(&data[5..12])?,
            ),
            TypeId::IntegratedTotalsTime56 => Self::IntegratedTotalsTime56(
                ioa,
                BinaryCounterInfo::from_bytes(data),
                Cp56Time2a::from_bytes(&data[5..12])?,
            ),
            TypeId::ProtectionEventTime56 => Self::ProtectionEventTime56(
                ioa,
                ProtectionEventInfo {
                    event: data[0],
                    elapsed: Cp16Time2a::from_bytes(&data[1..3])?,
                },
                Cp56Time2a::from_bytes(&data[3..10])?,
            ),
            TypeId::ProtectionStartEventsTime56 => Self::ProtectionStartEventsTime56(
                ioa,
                ProtectionStartInfo {
                    events: data[0],
                    quality: data[1],
                    relay_duration: Cp16Time2a::from_bytes(&data[2..4])?,
                },
                Cp56Time2a::from_bytes(&data[4..11])?,
            ),
            TypeId::ProtectionOutputCircuitTime56 => Self::ProtectionOutputCircuitTime56(
                ioa,
                ProtectionOutputInfo {
                    output: data[0],
                    quality: data[1],
                    relay_operating: Cp16Time2a::from_bytes(&data[2..4])?,
                },
                Cp56Time2a::from_bytes(&data[4..11])?,
            ),
            TypeId::SingleCommand => Self::SingleCommand(ioa, SingleCommandInfo::from_u8(data[0])),
            TypeId::DoubleCommand => Self::DoubleCommand(ioa, DoubleCommandInfo::from_u8(data[0])),
            TypeId::RegulatingStep => {
                Self::RegulatingStep(ioa, RegulatingStepInfo::from_u8(data[0]))
            }
            TypeId::SetpointNormalized => Self::SetpointNormalized(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                SetpointQualifier::from_u8(data[2]),
            ),
            TypeId::SetpointScaled => Self::SetpointScaled(
                ioa,
                i16::from_le_bytes([data[0], data[1]]),
                SetpointQualifier::from_u8(data[2]),
            ),
            TypeId::SetpointFloat => Self::SetpointFloat(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                SetpointQualifier::from_u8(data[4]),
            ),
            TypeId::Bitstring32Command => Self::Bitstring32Command(
                ioa,
                u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            ),
            TypeId::SingleCommandTime56 => Self::SingleCommandTime56(
                ioa,
                SingleCommandInfo::from_u8(data[0]),
                Cp56Time2a::from_bytes(&data[1..8])?,
            ),
            TypeId::DoubleCommandTime56 => Self::DoubleCommandTime56(
                ioa,
                DoubleCommandInfo::from_u8(data[0]),
                Cp56Time2a::from_bytes(&data[1..8])?,
            ),
            TypeId::RegulatingStepTime56 => Self::RegulatingStepTime56(
                ioa,
                RegulatingStepInfo::from_u8(data[0]),
                Cp56Time2a::from_bytes(&data[1..8])?,
            ),
            TypeId::SetpointNormalizedTime56 => Self::SetpointNormalizedTime56(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                SetpointQualifier::from_u8(data[2]),
                Cp56Time2a::from_bytes(&data[3..10])?,
            ),
            TypeId::SetpointScaledTime56 => Self::SetpointScaledTime56(
                ioa,
                i16::from_le_bytes([data[0], data[1]]),
                SetpointQualifier::from_u8(data[2]),
                Cp56Time2a::from_bytes(&data[3..10])?,
            ),
            TypeId::SetpointFloatTime56 => Self::SetpointFloatTime56(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                SetpointQualifier::from_u8(data[4]),
                Cp56Time2a::from_bytes(&data[5..12])?,
            ),
            TypeId::Bitstring32CommandTime56 => Self::Bitstring32CommandTime56(
                ioa,
                u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                Cp56Time2a::from_bytes(&data[4..11])?,
            ),
            TypeId::EndOfInit => Self::EndOfInit(ioa, CauseOfInit::from_u8(data[0])),
            TypeId::Interrogation => Self::Interrogation(ioa, data[0]),
            TypeId::CounterInterrogation => Self::CounterInterrogation(ioa, data[0]),
            TypeId::Read => Self::Read(ioa),
            TypeId::ClockSync => Self::ClockSync(ioa, Cp56Time2a::from_bytes(&data[0..7])?),
            TypeId::TestCommand => Self::TestCommand(ioa),
            TypeId::ResetProcess => Self::ResetProcess(ioa, data[0]),
            TypeId::DelayAcquisition => {
                Self::DelayAcquisition(ioa, Cp16Time2a::from_bytes(&data[0..2])?)
            }
            TypeId::TestCommandTime56 => Self::TestCommandTime56(
                ioa,
                u16::from_le_bytes([data[0], data[1]]),
                Cp56Time2a::from_bytes(&data[2..9])?,
            ),
            TypeId::ParameterNormalized => Self::ParameterNormalized(
                ioa,
                Normalized(i16::from_le_bytes([data[0], data[1]])),
                data[2],
            ),
            TypeId::ParameterScaled => {
                Self::ParameterScaled(ioa, i16::from_le_bytes([data[0], data[1]]), data[2])
            }
            TypeId::ParameterFloat => Self::ParameterFloat(
                ioa,
                f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
                data[4],
            ),
            TypeId::ParameterActivation => Self::ParameterActivation(ioa, data[0]),
            TypeId::FileReady
            | TypeId::SectionReady
            | TypeId::CallDirectory
            | TypeId::LastSection
            | TypeId::AckFile
            | TypeId::Segment
            | TypeId::Directory
            | TypeId::QueryLog => unreachable!("file transfer types have no element width"),
        };

        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(obj: InformationObject) {
        let mut buf = BytesMut::new();
        obj.encode_payload(&mut buf);
        assert_eq!(
            buf.len(),
            obj.type_id().element_width().unwrap(),
            "encoded width mismatch for {:?}",
            obj.type_id()
        );
        let decoded = InformationObject::decode(obj.type_id(), obj.ioa(), &buf).unwrap();
        assert_eq!(decoded, obj);
    }

    fn sample_time24() -> Cp24Time2a {
        Cp24Time2a {
            milliseconds: 45123,
            minutes: 17,
            invalid: false,
        }
    }

    fn sample_time56() -> Cp56Time2a {
        Cp56Time2a {
            milliseconds: 30000,
            minutes: 30,
            hours: 12,
            day: 15,
            day_of_week: 3,
            month: 6,
            year: 24,
            invalid: false,
            summer_time: true,
        }
    }

    #[test]
    fn test_quality_descriptor_bits() {
        let qd = QualityDescriptor::from_u8(0x90);
        assert!(qd.blocked);
        assert!(qd.invalid);
        assert!(!qd.substituted);
        assert!(!qd.not_topical);
        assert_eq!(qd.as_u8(), 0x90);
        assert!(QualityDescriptor::GOOD.is_good());
    }

    #[test]
    fn test_measured_quality_bits() {
        let q = MeasuredQuality::from_u8(0x81);
        assert!(q.invalid);
        assert!(q.overflow);
        assert!(!q.blocked);
        assert_eq!(q.as_u8(), 0x81);
        assert!(!q.is_good());
        assert!(MeasuredQuality::GOOD.is_good());
    }

    #[test]
    fn test_normalized_scaling() {
        assert_eq!(Normalized(16384).as_f32(), 0.5);
        assert_eq!(Normalized(-32768).as_f32(), -1.0);
        assert_eq!(Normalized::from_f32(0.5), Normalized(16384));
        // clamps instead of wrapping
        assert_eq!(Normalized::from_f32(2.0), Normalized(i16::MAX));
        assert_eq!(Normalized::from_f32(-2.0), Normalized(i16::MIN));
    }

    #[test]
    fn test_single_point_roundtrip() {
        roundtrip(InformationObject::SinglePoint(
            Ioa::new(1001),
            SinglePointInfo {
                on: true,
                quality: QualityDescriptor {
                    blocked: true,
                    ..Default::default()
                },
            },
        ));
        roundtrip(InformationObject::SinglePointTime24(
            Ioa::new(1002),
            SinglePointInfo::from_u8(0x81),
            sample_time24(),
        ));
        roundtrip(InformationObject::SinglePointTime56(
            Ioa::new(1003),
            SinglePointInfo::from_u8(0x01),
            sample_time56(),
        ));
    }

    #[test]
    fn test_double_point_roundtrip() {
        roundtrip(InformationObject::DoublePoint(
            Ioa::new(2000),
            DoublePointInfo {
                value: DoublePointValue::On,
                quality: QualityDescriptor::GOOD,
            },
        ));
        roundtrip(InformationObject::DoublePointTime24(
            Ioa::new(2001),
            DoublePointInfo::from_u8(0x41),
            sample_time24(),
        ));
        roundtrip(InformationObject::DoublePointTime56(
            Ioa::new(2002),
            DoublePointInfo::from_u8(0x02),
            sample_time56(),
        ));
    }

    #[test]
    fn test_step_position_roundtrip() {
        for value in [-64i8, -1, 0, 1, 63] {
            roundtrip(InformationObject::StepPosition(
                Ioa::new(3000),
                StepPositionInfo {
                    value,
                    transient: value < 0,
                    quality: MeasuredQuality::GOOD,
                },
            ));
        }
        roundtrip(InformationObject::StepPositionTime56(
            Ioa::new(3001),
            StepPositionInfo {
                value: -10,
                transient: true,
                quality: MeasuredQuality::from_u8(0x80),
            },
            sample_time56(),
        ));
    }

    #[test]
    fn test_step_position_sign_extension() {
        // 7-bit two's complement: 0x7F encodes -1
        let info = StepPositionInfo::from_bytes(&[0x7F, 0x00]);
        assert_eq!(info.value, -1);
        assert!(!info.transient);

        let info = StepPositionInfo::from_bytes(&[0x40, 0x00]);
        assert_eq!(info.value, -64);

        let info = StepPositionInfo::from_bytes(&[0xBF, 0x00]);
        assert_eq!(info.value, 63);
        assert!(info.transient);
    }

    #[test]
    fn test_bitstring_roundtrip() {
        roundtrip(InformationObject::Bitstring32(
            Ioa::new(4000),
            0xDEAD_BEEF,
            MeasuredQuality::GOOD,
        ));
        roundtrip(InformationObject::Bitstring32Time24(
            Ioa::new(4001),
            0x0000_0001,
            MeasuredQuality::from_u8(0x10),
            sample_time24(),
        ));
        roundtrip(InformationObject::Bitstring32Time56(
            Ioa::new(4002),
            u32::MAX,
            MeasuredQuality::GOOD,
            sample_time56(),
        ));
    }

    #[test]
    fn test_measured_values_roundtrip() {
        roundtrip(InformationObject::MeasuredNormalized(
            Ioa::new(5000),
            Normalized(16384),
            MeasuredQuality::GOOD,
        ));
        roundtrip(InformationObject::MeasuredNormalizedTime24(
            Ioa::new(5001),
            Normalized(-32768),
            MeasuredQuality::from_u8(0x01),
            sample_time24(),
        ));
        roundtrip(InformationObject::MeasuredNormalizedTime56(
            Ioa::new(5002),
            Normalized(1),
            MeasuredQuality::GOOD,
            sample_time56(),
        ));
        roundtrip(InformationObject::MeasuredScaled(
            Ioa::new(5003),
            -1000,
            MeasuredQuality::GOOD,
        ));
        roundtrip(InformationObject::MeasuredScaledTime24(
            Ioa::new(5004),
            i16::MAX,
            MeasuredQuality::GOOD,
            sample_time24(),
        ));
        roundtrip(InformationObject::MeasuredScaledTime56(
            Ioa::new(5005),
            i16::MIN,
            MeasuredQuality::from_u8(0x40),
            sample_time56(),
        ));
        roundtrip(InformationObject::MeasuredFloat(
            Ioa::new(5006),
            23.5,
            MeasuredQuality::GOOD,
        ));
        roundtrip(InformationObject::MeasuredFloatTime24(
            Ioa::new(5007),
            -0.25,
            MeasuredQuality::GOOD,
            sample_time24(),
        ));
        roundtrip(InformationObject::MeasuredFloatTime56(
            Ioa::new(5008),
            f32::MAX,
            MeasuredQuality::GOOD,
            sample_time56(),
        ));
        roundtrip(InformationObject::MeasuredNormalizedNoQuality(
            Ioa::new(5009),
            Normalized(-1),
        ));
    }

    #[test]
    fn test_integrated_totals_roundtrip() {
        roundtrip(InformationObject::IntegratedTotals(
            Ioa::new(6000),
            BinaryCounterInfo {
                value: 123456,
                sequence: 5,
                carry: false,
                adjusted: true,
                invalid: false,
            },
        ));
        roundtrip(InformationObject::IntegratedTotalsTime24(
            Ioa::new(6001),
            BinaryCounterInfo {
                value: -1,
                sequence: 31,
                carry: true,
                adjusted: false,
                invalid: true,
            },
            sample_time24(),
        ));
        roundtrip(InformationObject::IntegratedTotalsTime56(
            Ioa::new(6002),
            BinaryCounterInfo::default(),
            sample_time56(),
        ));
    }

    #[test]
    fn test_counter_flag_bits() {
        let mut buf = BytesMut::new();
        InformationObject::IntegratedTotals(
            Ioa::new(1),
            BinaryCounterInfo {
                value: 0,
                sequence: 0x1F,
                carry: true,
                adjusted: true,
                invalid: true,
            },
        )
        .encode_payload(&mut buf);
        assert_eq!(buf[4], 0xFF);
    }

    #[test]
    fn test_protection_roundtrip() {
        roundtrip(InformationObject::ProtectionEventTime24(
            Ioa::new(7000),
            ProtectionEventInfo {
                event: 0x01,
                elapsed: Cp16Time2a::new(1500),
            },
            sample_time24(),
        ));
        roundtrip(InformationObject::ProtectionStartEventsTime24(
            Ioa::new(7001),
            ProtectionStartInfo {
                events: 0x15,
                quality: 0x08,
                relay_duration: Cp16Time2a::new(20),
            },
            sample_time24(),
        ));
        roundtrip(InformationObject::ProtectionOutputCircuitTime24(
            Ioa::new(7002),
            ProtectionOutputInfo {
                output: 0x0F,
                quality: 0x00,
                relay_operating: Cp16Time2a::new(35),
            },
            sample_time24(),
        ));
        roundtrip(InformationObject::ProtectionEventTime56(
            Ioa::new(7003),
            ProtectionEventInfo {
                event: 0x42,
                elapsed: Cp16Time2a::new(0),
            },
            sample_time56(),
        ));
        roundtrip(InformationObject::ProtectionStartEventsTime56(
            Ioa::new(7004),
            ProtectionStartInfo::default(),
            sample_time56(),
        ));
        roundtrip(InformationObject::ProtectionOutputCircuitTime56(
            Ioa::new(7005),
            ProtectionOutputInfo::default(),
            sample_time56(),
        ));
    }

    #[test]
    fn test_packed_single_point_roundtrip() {
        roundtrip(InformationObject::PackedSinglePoint(
            Ioa::new(8000),
            StatusChangeInfo {
                status: 0xAAAA,
                change: 0x0001,
                quality: MeasuredQuality::GOOD,
            },
        ));
    }

    #[test]
    fn test_command_roundtrip() {
        roundtrip(InformationObject::SingleCommand(
            Ioa::new(9000),
            SingleCommandInfo {
                on: true,
                qualifier: 1,
                select: true,
            },
        ));
        roundtrip(InformationObject::DoubleCommand(
            Ioa::new(9001),
            DoubleCommandInfo::execute(DoublePointValue::Off),
        ));
        roundtrip(InformationObject::RegulatingStep(
            Ioa::new(9002),
            RegulatingStepInfo {
                step: RegulatingStepValue::Higher,
                qualifier: 0,
                select: false,
            },
        ));
        roundtrip(InformationObject::SetpointNormalized(
            Ioa::new(9003),
            Normalized(-100),
            SetpointQualifier {
                ql: 0,
                select: true,
            },
        ));
        roundtrip(InformationObject::SetpointScaled(
            Ioa::new(9004),
            1000,
            SetpointQualifier::default(),
        ));
        roundtrip(InformationObject::SetpointFloat(
            Ioa::new(9005),
            3.25,
            SetpointQualifier::default(),
        ));
        roundtrip(InformationObject::Bitstring32Command(
            Ioa::new(9006),
            0x1234_5678,
        ));
        roundtrip(InformationObject::SingleCommandTime56(
            Ioa::new(9007),
            SingleCommandInfo::execute(false),
            sample_time56(),
        ));
        roundtrip(InformationObject::DoubleCommandTime56(
            Ioa::new(9008),
            DoubleCommandInfo::from_u8(0x82),
            sample_time56(),
        ));
        roundtrip(InformationObject::RegulatingStepTime56(
            Ioa::new(9009),
            RegulatingStepInfo::from_u8(0x01),
            sample_time56(),
        ));
        roundtrip(InformationObject::SetpointNormalizedTime56(
            Ioa::new(9010),
            Normalized(42),
            SetpointQualifier::default(),
            sample_time56(),
        ));
        roundtrip(InformationObject::SetpointScaledTime56(
            Ioa::new(9011),
            -42,
            SetpointQualifier::default(),
            sample_time56(),
        ));
        roundtrip(InformationObject::SetpointFloatTime56(
            Ioa::new(9012),
            -1.5,
            SetpointQualifier {
                ql: 127,
                select: false,
            },
            sample_time56(),
        ));
        roundtrip(InformationObject::Bitstring32CommandTime56(
            Ioa::new(9013),
            0,
            sample_time56(),
        ));
    }

    #[test]
    fn test_sco_bit_layout() {
        // ON + select, no qualifier: bit0 | bit7
        let sco = SingleCommandInfo {
            on: true,
            qualifier: 0,
            select: true,
        };
        assert_eq!(sco.as_u8(), 0x81);

        // qualifier 1 (short pulse) occupies bits 2-6
        let sco = SingleCommandInfo {
            on: false,
            qualifier: 1,
            select: false,
        };
        assert_eq!(sco.as_u8(), 0x04);
    }

    #[test]
    fn test_system_roundtrip() {
        roundtrip(InformationObject::EndOfInit(
            Ioa::new(0),
            CauseOfInit {
                cause: 2,
                local_change: true,
            },
        ));
        roundtrip(InformationObject::Interrogation(Ioa::new(0), 20));
        roundtrip(InformationObject::CounterInterrogation(Ioa::new(0), 0x45));
        roundtrip(InformationObject::Read(Ioa::new(1234)));
        roundtrip(InformationObject::ClockSync(Ioa::new(0), sample_time56()));
        roundtrip(InformationObject::TestCommand(Ioa::new(0)));
        roundtrip(InformationObject::ResetProcess(Ioa::new(0), 1));
        roundtrip(InformationObject::DelayAcquisition(
            Ioa::new(0),
            Cp16Time2a::new(250),
        ));
        roundtrip(InformationObject::TestCommandTime56(
            Ioa::new(0),
            0x1234,
            sample_time56(),
        ));
    }

    #[test]
    fn test_test_command_pattern() {
        let mut buf = BytesMut::new();
        InformationObject::TestCommand(Ioa::new(0)).encode_payload(&mut buf);
        assert_eq!(&buf[..], &TEST_PATTERN);
    }

    #[test]
    fn test_parameter_roundtrip() {
        roundtrip(InformationObject::ParameterNormalized(
            Ioa::new(100),
            Normalized(200),
            0x01,
        ));
        roundtrip(InformationObject::ParameterScaled(Ioa::new(101), -5, 0x02));
        roundtrip(InformationObject::ParameterFloat(Ioa::new(102), 9.5, 0x03));
        roundtrip(InformationObject::ParameterActivation(Ioa::new(103), 0x01));
    }

    #[test]
    fn test_decode_truncated() {
        let err =
            InformationObject::decode(TypeId::MeasuredFloat, Ioa::new(1), &[0x00, 0x01]).unwrap_err();
        assert!(err.to_string().contains("Truncated"));
    }

    #[test]
    fn test_decode_file_transfer_unsupported() {
        let err = InformationObject::decode(TypeId::Segment, Ioa::new(1), &[0; 16]).unwrap_err();
        assert!(err.to_string().contains("F_SG_NA_1"));
    }
}
