//! Type identification catalogue.
//!
//! The first octet of every ASDU selects the information object structure.
//! The catalogue here is authoritative for the codec:
//! [`element_width`](TypeId::element_width) gives the fixed payload width
//! of one element (the octets after its address) and
//! [`supports_sequence`](TypeId::supports_sequence) whether the compact
//! SQ=1 layout is legal for the type. File-transfer telegrams (120..=127)
//! are catalogued but their objects are not decoded.

use crate::error::{Iec104Error, Result};

/// IEC 60870-5-104 type identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    // process information, monitor direction
    /// M_SP_NA_1
    SinglePoint = 1,
    /// M_SP_TA_1
    SinglePointTime24 = 2,
    /// M_DP_NA_1
    DoublePoint = 3,
    /// M_DP_TA_1
    DoublePointTime24 = 4,
    /// M_ST_NA_1
    StepPosition = 5,
    /// M_ST_TA_1
    StepPositionTime24 = 6,
    /// M_BO_NA_1
    Bitstring32 = 7,
    /// M_BO_TA_1
    Bitstring32Time24 = 8,
    /// M_ME_NA_1
    MeasuredNormalized = 9,
    /// M_ME_TA_1
    MeasuredNormalizedTime24 = 10,
    /// M_ME_NB_1
    MeasuredScaled = 11,
    /// M_ME_TB_1
    MeasuredScaledTime24 = 12,
    /// M_ME_NC_1
    MeasuredFloat = 13,
    /// M_ME_TC_1
    MeasuredFloatTime24 = 14,
    /// M_IT_NA_1
    IntegratedTotals = 15,
    /// M_IT_TA_1
    IntegratedTotalsTime24 = 16,
    /// M_EP_TA_1
    ProtectionEventTime24 = 17,
    /// M_EP_TB_1
    ProtectionStartEventsTime24 = 18,
    /// M_EP_TC_1
    ProtectionOutputCircuitTime24 = 19,
    /// M_PS_NA_1
    PackedSinglePoint = 20,
    /// M_ME_ND_1
    MeasuredNormalizedNoQuality = 21,
    /// M_SP_TB_1
    SinglePointTime56 = 30,
    /// M_DP_TB_1
    DoublePointTime56 = 31,
    /// M_ST_TB_1
    StepPositionTime56 = 32,
    /// M_BO_TB_1
    Bitstring32Time56 = 33,
    /// M_ME_TD_1
    MeasuredNormalizedTime56 = 34,
    /// M_ME_TE_1
    MeasuredScaledTime56 = 35,
    /// M_ME_TF_1
    MeasuredFloatTime56 = 36,
    /// M_IT_TB_1
    IntegratedTotalsTime56 = 37,
    /// M_EP_TD_1
    ProtectionEventTime56 = 38,
    /// M_EP_TE_1
    ProtectionStartEventsTime56 = 39,
    /// M_EP_TF_1
    ProtectionOutputCircuitTime56 = 40,

    // process control commands
    /// C_SC_NA_1
    SingleCommand = 45,
    /// C_DC_NA_1
    DoubleCommand = 46,
    /// C_RC_NA_1
    RegulatingStep = 47,
    /// C_SE_NA_1
    SetpointNormalized = 48,
    /// C_SE_NB_1
    SetpointScaled = 49,
    /// C_SE_NC_1
    SetpointFloat = 50,
    /// C_BO_NA_1
    Bitstring32Command = 51,
    /// C_SC_TA_1
    SingleCommandTime56 = 58,
    /// C_DC_TA_1
    DoubleCommandTime56 = 59,
    /// C_RC_TA_1
    RegulatingStepTime56 = 60,
    /// C_SE_TA_1
    SetpointNormalizedTime56 = 61,
    /// C_SE_TB_1
    SetpointScaledTime56 = 62,
    /// C_SE_TC_1
    SetpointFloatTime56 = 63,
    /// C_BO_TA_1
    Bitstring32CommandTime56 = 64,

    // system information
    /// M_EI_NA_1
    EndOfInit = 70,
    /// C_IC_NA_1
    Interrogation = 100,
    /// C_CI_NA_1
    CounterInterrogation = 101,
    /// C_RD_NA_1
    Read = 102,
    /// C_CS_NA_1
    ClockSync = 103,
    /// C_TS_NA_1
    TestCommand = 104,
    /// C_RP_NA_1
    ResetProcess = 105,
    /// C_CD_NA_1
    DelayAcquisition = 106,
    /// C_TS_TA_1
    TestCommandTime56 = 107,

    // parameter loading
    /// P_ME_NA_1
    ParameterNormalized = 110,
    /// P_ME_NB_1
    ParameterScaled = 111,
    /// P_ME_NC_1
    ParameterFloat = 112,
    /// P_AC_NA_1
    ParameterActivation = 113,

    // file transfer (catalogued, not decoded)
    /// F_FR_NA_1
    FileReady = 120,
    /// F_SR_NA_1
    SectionReady = 121,
    /// F_SC_NA_1
    CallDirectory = 122,
    /// F_LS_NA_1
    LastSection = 123,
    /// F_AF_NA_1
    AckFile = 124,
    /// F_SG_NA_1
    Segment = 125,
    /// F_DR_TA_1
    Directory = 126,
    /// F_SC_NB_1
    QueryLog = 127,
}

impl TypeId {
    /// Every catalogued type id, in numeric order. This table drives
    /// [`from_u8`](Self::from_u8).
    pub const ALL: [TypeId; 67] = [
        Self::SinglePoint,
        Self::SinglePointTime24,
        Self::DoublePoint,
        Self::DoublePointTime24,
        Self::StepPosition,
        Self::StepPositionTime24,
        Self::Bitstring32,
        Self::Bitstring32Time24,
        Self::MeasuredNormalized,
        Self::MeasuredNormalizedTime24,
        Self::MeasuredScaled,
        Self::MeasuredScaledTime24,
        Self::MeasuredFloat,
        Self::MeasuredFloatTime24,
        Self::IntegratedTotals,
        Self::IntegratedTotalsTime24,
        Self::ProtectionEventTime24,
        Self::ProtectionStartEventsTime24,
        Self::ProtectionOutputCircuitTime24,
        Self::PackedSinglePoint,
        Self::MeasuredNormalizedNoQuality,
        Self::SinglePointTime56,
        Self::DoublePointTime56,
        Self::StepPositionTime56,
        Self::Bitstring32Time56,
        Self::MeasuredNormalizedTime56,
        Self::MeasuredScaledTime56,
        Self::MeasuredFloatTime56,
        Self::IntegratedTotalsTime56,
        Self::ProtectionEventTime56,
        Self::ProtectionStartEventsTime56,
        Self::ProtectionOutputCircuitTime56,
        Self::SingleCommand,
        Self::DoubleCommand,
        Self::RegulatingStep,
        Self::SetpointNormalized,
        Self::SetpointScaled,
        Self::SetpointFloat,
        Self::Bitstring32Command,
        Self::SingleCommandTime56,
        Self::DoubleCommandTime56,
        Self::RegulatingStepTime56,
        Self::SetpointNormalizedTime56,
        Self::SetpointScaledTime56,
        Self::SetpointFloatTime56,
        Self::Bitstring32CommandTime56,
        Self::EndOfInit,
        Self::Interrogation,
        Self::CounterInterrogation,
        Self::Read,
        Self::ClockSync,
        Self::TestCommand,
        Self::ResetProcess,
        Self::DelayAcquisition,
        Self::TestCommandTime56,
        Self::ParameterNormalized,
        Self::ParameterScaled,
        Self::ParameterFloat,
        Self::ParameterActivation,
        Self::FileReady,
        Self::SectionReady,
        Self::CallDirectory,
        Self::LastSection,
        Self::AckFile,
        Self::Segment,
        Self::Directory,
        Self::QueryLog,
    ];

    /// Look a raw octet up in the catalogue.
    pub fn from_u8(value: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|type_id| type_id.as_u8() == value)
            .ok_or(Iec104Error::UnknownTypeId(value))
    }

    /// The raw octet.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Fixed octet width of one element payload (the octets after the
    /// information object address). `None` for file-transfer types, whose
    /// objects are not decoded by this crate.
    pub const fn element_width(self) -> Option<usize> {
        let width = match self {
            Self::SinglePoint => 1,
            Self::SinglePointTime24 => 4,
            Self::DoublePoint => 1,
            Self::DoublePointTime24 => 4,
            Self::StepPosition => 2,
            Self::StepPositionTime24 => 5,
            Self::Bitstring32 => 5,
            Self::Bitstring32Time24 => 8,
            Self::MeasuredNormalized => 3,
            Self::MeasuredNormalizedTime24 => 6,
            Self::MeasuredScaled => 3,
            Self::MeasuredScaledTime24 => 6,
            Self::MeasuredFloat => 5,
            Self::MeasuredFloatTime24 => 8,
            Self::IntegratedTotals => 5,
            Self::IntegratedTotalsTime24 => 8,
            Self::ProtectionEventTime24 => 6,
            Self::ProtectionStartEventsTime24 => 7,
            Self::ProtectionOutputCircuitTime24 => 7,
            Self::PackedSinglePoint => 5,
            Self::MeasuredNormalizedNoQuality => 2,
            Self::SinglePointTime56 => 8,
            Self::DoublePointTime56 => 8,
            Self::StepPositionTime56 => 9,
            Self::Bitstring32Time56 => 12,
            Self::MeasuredNormalizedTime56 => 10,
            Self::MeasuredScaledTime56 => 10,
            Self::MeasuredFloatTime56 => 12,
            Self::IntegratedTotalsTime56 => 12,
            Self::ProtectionEventTime56 => 10,
            Self::ProtectionStartEventsTime56 => 11,
            Self::ProtectionOutputCircuitTime56 => 11,
            Self::SingleCommand => 1,
            Self::DoubleCommand => 1,
            Self::RegulatingStep => 1,
            Self::SetpointNormalized => 3,
            Self::SetpointScaled => 3,
            Self::SetpointFloat => 5,
            Self::Bitstring32Command => 4,
            Self::SingleCommandTime56 => 8,
            Self::DoubleCommandTime56 => 8,
            Self::RegulatingStepTime56 => 8,
            Self::SetpointNormalizedTime56 => 10,
            Self::SetpointScaledTime56 => 10,
            Self::SetpointFloatTime56 => 12,
            Self::Bitstring32CommandTime56 => 11,
            Self::EndOfInit => 1,
            Self::Interrogation => 1,
            Self::CounterInterrogation => 1,
            Self::Read => 0,
            Self::ClockSync => 7,
            Self::TestCommand => 2,
            Self::ResetProcess => 1,
            Self::DelayAcquisition => 2,
            Self::TestCommandTime56 => 9,
            Self::ParameterNormalized => 3,
            Self::ParameterScaled => 3,
            Self::ParameterFloat => 5,
            Self::ParameterActivation => 1,
            Self::FileReady
            | Self::SectionReady
            | Self::CallDirectory
            | Self::LastSection
            | Self::AckFile
            | Self::Segment
            | Self::Directory
            | Self::QueryLog => return None,
        };
        Some(width)
    }

    /// Whether the compact sequence layout (SQ=1, one address for all
    /// elements) is legal for this type. Control, parameter and time-tagged
    /// telegrams are always individually addressed.
    pub const fn supports_sequence(self) -> bool {
        matches!(
            self,
            Self::SinglePoint
                | Self::DoublePoint
                | Self::StepPosition
                | Self::Bitstring32
                | Self::MeasuredNormalized
                | Self::MeasuredScaled
                | Self::MeasuredFloat
                | Self::IntegratedTotals
                | Self::PackedSinglePoint
                | Self::MeasuredNormalizedNoQuality
        )
    }

    /// Whether this is a process control command (type ids 45..=64).
    #[inline]
    pub const fn is_command(self) -> bool {
        matches!(self.as_u8(), 45..=64)
    }

    /// The companion standard's mnemonic, e.g. `M_SP_NA_1`.
    pub const fn standard_name(self) -> &'static str {
        match self {
            Self::SinglePoint => "M_SP_NA_1",
            Self::SinglePointTime24 => "M_SP_TA_1",
            Self::DoublePoint => "M_DP_NA_1",
            Self::DoublePointTime24 => "M_DP_TA_1",
            Self::StepPosition => "M_ST_NA_1",
            Self::StepPositionTime24 => "M_ST_TA_1",
            Self::Bitstring32 => "M_BO_NA_1",
            Self::Bitstring32Time24 => "M_BO_TA_1",
            Self::MeasuredNormalized => "M_ME_NA_1",
            Self::MeasuredNormalizedTime24 => "M_ME_TA_1",
            Self::MeasuredScaled => "M_ME_NB_1",
            Self::MeasuredScaledTime24 => "M_ME_TB_1",
            Self::MeasuredFloat => "M_ME_NC_1",
            Self::MeasuredFloatTime24 => "M_ME_TC_1",
            Self::IntegratedTotals => "M_IT_NA_1",
            Self::IntegratedTotalsTime24 => "M_IT_TA_1",
            Self::ProtectionEventTime24 => "M_EP_TA_1",
            Self::ProtectionStartEventsTime24 => "M_EP_TB_1",
            Self::ProtectionOutputCircuitTime24 => "M_EP_TC_1",
            Self::PackedSinglePoint => "M_PS_NA_1",
            Self::MeasuredNormalizedNoQuality => "M_ME_ND_1",
            Self::SinglePointTime56 => "M_SP_TB_1",
            Self::DoublePointTime56 => "M_DP_TB_1",
            Self::StepPositionTime56 => "M_ST_TB_1",
            Self::Bitstring32Time56 => "M_BO_TB_1",
            Self::MeasuredNormalizedTime56 => "M_ME_TD_1",
            Self::MeasuredScaledTime56 => "M_ME_TE_1",
            Self::MeasuredFloatTime56 => "M_ME_TF_1",
            Self::IntegratedTotalsTime56 => "M_IT_TB_1",
            Self::ProtectionEventTime56 => "M_EP_TD_1",
            Self::ProtectionStartEventsTime56 => "M_EP_TE_1",
            Self::ProtectionOutputCircuitTime56 => "M_EP_TF_1",
            Self::SingleCommand => "C_SC_NA_1",
            Self::DoubleCommand => "C_DC_NA_1",
            Self::RegulatingStep => "C_RC_NA_1",
            Self::SetpointNormalized => "C_SE_NA_1",
            Self::SetpointScaled => "C_SE_NB_1",
            Self::SetpointFloat => "C_SE_NC_1",
            Self::Bitstring32Command => "C_BO_NA_1",
            Self::SingleCommandTime56 => "C_SC_TA_1",
            Self::DoubleCommandTime56 => "C_DC_TA_1",
            Self::RegulatingStepTime56 => "C_RC_TA_1",
            Self::SetpointNormalizedTime56 => "C_SE_TA_1",
            Self::SetpointScaledTime56 => "C_SE_TB_1",
            Self::SetpointFloatTime56 => "C_SE_TC_1",
            Self::Bitstring32CommandTime56 => "C_BO_TA_1",
            Self::EndOfInit => "M_EI_NA_1",
            Self::Interrogation => "C_IC_NA_1",
            Self::CounterInterrogation => "C_CI_NA_1",
            Self::Read => "C_RD_NA_1",
            Self::ClockSync => "C_CS_NA_1",
            Self::TestCommand => "C_TS_NA_1",
            Self::ResetProcess => "C_RP_NA_1",
            Self::DelayAcquisition => "C_CD_NA_1",
            Self::TestCommandTime56 => "C_TS_TA_1",
            Self::ParameterNormalized => "P_ME_NA_1",
            Self::ParameterScaled => "P_ME_NB_1",
            Self::ParameterFloat => "P_ME_NC_1",
            Self::ParameterActivation => "P_AC_NA_1",
            Self::FileReady => "F_FR_NA_1",
            Self::SectionReady => "F_SR_NA_1",
            Self::CallDirectory => "F_SC_NA_1",
            Self::LastSection => "F_LS_NA_1",
            Self::AckFile => "F_AF_NA_1",
            Self::Segment => "F_SG_NA_1",
            Self::Directory => "F_DR_TA_1",
            Self::QueryLog => "F_SC_NB_1",
        }
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.standard_name())
    }
}
