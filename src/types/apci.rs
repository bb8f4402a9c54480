//! APCI: the six-octet control header in front of every APDU.
//!
//! Layout on the wire:
//!
//! ```text
//! 0x68 | LEN | C1 | C2 | C3 | C4
//! ```
//!
//! `LEN` counts the four control octets plus the ASDU body. The two low
//! bits of C1 select the format: `..0` numbered information transfer,
//! `.01` supervisory, `.11` unnumbered. A sequence number occupies the
//! upper 15 bits of its two control octets, read as one little-endian
//! word, so the format marker stays in the low bit.

use crate::error::{Iec104Error, Result};

/// Start octet of every APDU.
pub const START_OCTET: u8 = 0x68;

/// Smallest legal value of the length octet (control field only).
pub const APDU_LENGTH_MIN: usize = 4;

/// Largest legal value of the length octet.
pub const APDU_LENGTH_MAX: usize = 253;

/// Largest ASDU body that still fits behind the control field.
pub const MAX_ASDU_SIZE: usize = APDU_LENGTH_MAX - APDU_LENGTH_MIN;

/// Send and receive counters are 15-bit modular.
pub const SEQ_MODULO: u16 = 1 << 15;

/// Marker bits of an unnumbered control octet.
const UNNUMBERED_MARKER: u8 = 0x03;

/// Link control functions of the unnumbered format.
///
/// The discriminant is the function's bit position within the first
/// control octet; a valid frame sets exactly one of the six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UFunction {
    /// Activate data transfer on an open connection
    StartDtAct = 0x04,
    /// Peer confirms data transfer is active
    StartDtCon = 0x08,
    /// Deactivate data transfer, leaving the connection open
    StopDtAct = 0x10,
    /// Peer confirms data transfer has stopped
    StopDtCon = 0x20,
    /// Probe an idle link
    TestFrAct = 0x40,
    /// Reply to a link probe
    TestFrCon = 0x80,
}

impl UFunction {
    /// The complete first control octet: function bit plus format marker.
    pub const fn control_octet(self) -> u8 {
        self as u8 | UNNUMBERED_MARKER
    }

    fn from_control_octet(octet: u8) -> Result<Self> {
        let function = match octet & !UNNUMBERED_MARKER {
            0x04 => Self::StartDtAct,
            0x08 => Self::StartDtCon,
            0x10 => Self::StopDtAct,
            0x20 => Self::StopDtCon,
            0x40 => Self::TestFrAct,
            0x80 => Self::TestFrCon,
            _ => {
                return Err(Iec104Error::framing(format!(
                    "U-frame control octet 0x{octet:02X} must set exactly one function bit"
                )))
            }
        };
        Ok(function)
    }
}

impl std::fmt::Display for UFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StartDtAct => "STARTDT act",
            Self::StartDtCon => "STARTDT con",
            Self::StopDtAct => "STOPDT act",
            Self::StopDtCon => "STOPDT con",
            Self::TestFrAct => "TESTFR act",
            Self::TestFrCon => "TESTFR con",
        })
    }
}

/// Spread a sequence number over its two control octets, leaving the low
/// format bit clear.
const fn seq_to_octets(seq: u16) -> [u8; 2] {
    (seq << 1).to_le_bytes()
}

/// Recover a sequence number from its two control octets.
const fn seq_from_octets(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi]) >> 1
}

/// Control field of one APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apci {
    /// Numbered information transfer; the only format carrying an ASDU.
    Information {
        /// Send sequence number of this frame (NS)
        ns: u16,
        /// Receive sequence number: the next NS expected from the peer (NR)
        nr: u16,
    },
    /// Supervisory acknowledgement of received I-frames.
    Supervisory {
        /// Receive sequence number (NR)
        nr: u16,
    },
    /// Unnumbered link control.
    Unnumbered(UFunction),
}

impl Apci {
    /// Decode the four control octets.
    pub fn decode(control: [u8; 4]) -> Result<Self> {
        let [c1, c2, c3, c4] = control;
        if c1 & 0x01 == 0 {
            Ok(Self::Information {
                ns: seq_from_octets(c1, c2),
                nr: seq_from_octets(c3, c4),
            })
        } else if c1 & 0x02 == 0 {
            Ok(Self::Supervisory {
                nr: seq_from_octets(c3, c4),
            })
        } else {
            Ok(Self::Unnumbered(UFunction::from_control_octet(c1)?))
        }
    }

    /// Encode the four control octets.
    pub const fn encode(self) -> [u8; 4] {
        match self {
            Self::Information { ns, nr } => {
                let [c1, c2] = seq_to_octets(ns);
                let [c3, c4] = seq_to_octets(nr);
                [c1, c2, c3, c4]
            }
            Self::Supervisory { nr } => {
                let [c3, c4] = seq_to_octets(nr);
                [0x01, 0x00, c3, c4]
            }
            Self::Unnumbered(function) => [function.control_octet(), 0x00, 0x00, 0x00],
        }
    }

    /// The complete six-octet header for a frame whose ASDU body is
    /// `body_len` octets long.
    pub fn header_bytes(self, body_len: usize) -> [u8; 6] {
        let [c1, c2, c3, c4] = self.encode();
        [
            START_OCTET,
            (APDU_LENGTH_MIN + body_len) as u8,
            c1,
            c2,
            c3,
            c4,
        ]
    }

    /// Whether this format carries an ASDU.
    pub const fn carries_asdu(self) -> bool {
        matches!(self, Self::Information { .. })
    }
}

impl std::fmt::Display for Apci {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Information { ns, nr } => write!(f, "I ns={ns} nr={nr}"),
            Self::Supervisory { nr } => write!(f, "S nr={nr}"),
            Self::Unnumbered(function) => write!(f, "U {function}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn information_control_field_layout() {
        // sequence numbers shifted left once, format bits clear
        assert_eq!(
            Apci::Information { ns: 8, nr: 8 }.encode(),
            [0x10, 0x00, 0x10, 0x00]
        );
        assert_eq!(
            Apci::Information { ns: 1, nr: 0 }.encode(),
            [0x02, 0x00, 0x00, 0x00]
        );
        // the 15-bit maximum fills both octets
        assert_eq!(
            Apci::Information { ns: 32767, nr: 32767 }.encode(),
            [0xFE, 0xFF, 0xFE, 0xFF]
        );
    }

    #[test]
    fn supervisory_control_field_layout() {
        assert_eq!(
            Apci::Supervisory { nr: 8 }.encode(),
            [0x01, 0x00, 0x10, 0x00]
        );
    }

    #[test]
    fn unnumbered_control_octets() {
        let expected = [
            (UFunction::StartDtAct, 0x07),
            (UFunction::StartDtCon, 0x0B),
            (UFunction::StopDtAct, 0x13),
            (UFunction::StopDtCon, 0x23),
            (UFunction::TestFrAct, 0x43),
            (UFunction::TestFrCon, 0x83),
        ];
        for (function, octet) in expected {
            assert_eq!(function.control_octet(), octet);
            assert_eq!(Apci::Unnumbered(function).encode(), [octet, 0, 0, 0]);
            assert_eq!(
                Apci::decode([octet, 0, 0, 0]).unwrap(),
                Apci::Unnumbered(function)
            );
        }
    }

    #[test]
    fn decode_classifies_by_low_bits() {
        assert_eq!(
            Apci::decode([0x02, 0x00, 0x04, 0x00]).unwrap(),
            Apci::Information { ns: 1, nr: 2 }
        );
        assert_eq!(
            Apci::decode([0x01, 0x00, 0x04, 0x00]).unwrap(),
            Apci::Supervisory { nr: 2 }
        );
        assert_eq!(
            Apci::decode([0x07, 0x00, 0x00, 0x00]).unwrap(),
            Apci::Unnumbered(UFunction::StartDtAct)
        );
    }

    #[test]
    fn sequence_numbers_survive_roundtrip() {
        for seq in [0u16, 1, 127, 128, 4095, 16384, 32767] {
            let apci = Apci::Information {
                ns: seq,
                nr: 32767 - seq,
            };
            assert_eq!(Apci::decode(apci.encode()).unwrap(), apci);
        }
    }

    #[test]
    fn u_frame_needs_exactly_one_function_bit() {
        // no function bit, two of them, or all of them
        for octet in [0x03u8, 0x0F, 0x33, 0xFF] {
            assert!(Apci::decode([octet, 0, 0, 0]).is_err(), "octet {octet:02X}");
        }
    }

    #[test]
    fn header_counts_control_field_and_body() {
        let header = Apci::Unnumbered(UFunction::TestFrAct).header_bytes(0);
        assert_eq!(header, [0x68, 0x04, 0x43, 0x00, 0x00, 0x00]);

        let header = Apci::Information { ns: 0, nr: 0 }.header_bytes(10);
        assert_eq!(header[..2], [START_OCTET, 14]);
    }

    #[test]
    fn carries_asdu_only_for_information() {
        assert!(Apci::Information { ns: 0, nr: 0 }.carries_asdu());
        assert!(!Apci::Supervisory { nr: 0 }.carries_asdu());
        assert!(!Apci::Unnumbered(UFunction::TestFrCon).carries_asdu());
    }

    #[test]
    fn display_formats() {
        assert_eq!(
            Apci::Information { ns: 10, nr: 5 }.to_string(),
            "I ns=10 nr=5"
        );
        assert_eq!(Apci::Supervisory { nr: 20 }.to_string(), "S nr=20");
        assert_eq!(
            Apci::Unnumbered(UFunction::StopDtCon).to_string(),
            "U STOPDT con"
        );
    }
}
