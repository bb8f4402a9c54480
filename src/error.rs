//! Error types for the IEC 60870-5-104 client.

use std::borrow::Cow;
use thiserror::Error;

use crate::types::TypeId;

/// Result type alias for IEC 104 operations.
pub type Result<T> = std::result::Result<T, Iec104Error>;

/// IEC 60870-5-104 protocol error types.
///
/// Uses `Cow<'static, str>` to avoid allocations for static error messages.
///
/// Errors fall into three groups:
///
/// - **Fatal to the link**: [`Framing`](Self::Framing),
///   [`SequenceMismatch`](Self::SequenceMismatch), [`T1Timeout`](Self::T1Timeout)
///   and I/O failures. The link engine closes the connection and emits
///   [`Iec104Event::Closed`](crate::connection::Iec104Event::Closed).
/// - **Non-fatal parse errors**: [`UnknownTypeId`](Self::UnknownTypeId) and
///   [`InvalidAsdu`](Self::InvalidAsdu), raised when an ASDU payload is
///   inspected. The link stays up; the caller decides.
/// - **Local mistakes**: [`NotConnected`](Self::NotConnected),
///   [`AlreadyConnected`](Self::AlreadyConnected),
///   [`AlreadyConnecting`](Self::AlreadyConnecting),
///   [`TypeMismatch`](Self::TypeMismatch). Reported synchronously, nothing is
///   sent on the wire.
#[derive(Debug, Error)]
pub enum Iec104Error {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(Cow<'static, str>),

    /// Not connected or data transfer not active
    #[error("Not connected")]
    NotConnected,

    /// `connect()` called while a connection is established
    #[error("Already connected")]
    AlreadyConnected,

    /// `connect()` called while a connection attempt is in progress
    #[error("Already connecting")]
    AlreadyConnecting,

    /// TCP connect did not complete within t0
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// I/O error, carries the OS error verbatim
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid frame format: bad start octet, impossible length, short read
    /// or undefined U-frame bit pattern. Fatal to the link.
    #[error("Framing error: {0}")]
    Framing(Cow<'static, str>),

    /// ASDU payload could not be parsed. Non-fatal.
    #[error("Invalid ASDU: {0}")]
    InvalidAsdu(Cow<'static, str>),

    /// Type identification octet is not in the catalogue. Non-fatal.
    #[error("Unknown ASDU type id:{0}")]
    UnknownTypeId(u8),

    /// Received I-frame send sequence does not match our receive counter.
    /// Fatal to the link.
    #[error("Sequence number mismatch: expected {expected}, got {actual}")]
    SequenceMismatch {
        /// Our receive counter at the time of the mismatch
        expected: u16,
        /// The send sequence carried by the offending I-frame
        actual: u16,
    },

    /// t1 expired on an unacknowledged I-frame or unanswered U-frame.
    /// Fatal to the link.
    #[error("T1 timeout: no acknowledgement received")]
    T1Timeout,

    /// The information object handed to `control` does not declare the
    /// requested type identification. Local, synchronous.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The type id requested by the caller
        expected: TypeId,
        /// The type the supplied object actually declares
        actual: TypeId,
    },
}

impl Iec104Error {
    /// Create a framing error with a static message (zero allocation).
    #[inline]
    pub const fn framing_static(msg: &'static str) -> Self {
        Self::Framing(Cow::Borrowed(msg))
    }

    /// Create a framing error with a dynamic message.
    #[inline]
    pub fn framing(msg: impl Into<String>) -> Self {
        Self::Framing(Cow::Owned(msg.into()))
    }

    /// Create an invalid ASDU error with a static message (zero allocation).
    #[inline]
    pub const fn invalid_asdu_static(msg: &'static str) -> Self {
        Self::InvalidAsdu(Cow::Borrowed(msg))
    }

    /// Create an invalid ASDU error with a dynamic message.
    #[inline]
    pub fn invalid_asdu(msg: impl Into<String>) -> Self {
        Self::InvalidAsdu(Cow::Owned(msg.into()))
    }

    /// Create a connection error with a static message (zero allocation).
    #[inline]
    pub const fn connection_static(msg: &'static str) -> Self {
        Self::Connection(Cow::Borrowed(msg))
    }

    /// Check if this error closes the link when raised by the engine.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Framing(_)
                | Self::SequenceMismatch { .. }
                | Self::T1Timeout
                | Self::Connection(_)
        )
    }

    /// Check if this error is an application-layer parse error that leaves
    /// the link up.
    #[inline]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::InvalidAsdu(_) | Self::UnknownTypeId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Iec104Error::NotConnected.to_string(), "Not connected");
        assert_eq!(
            Iec104Error::UnknownTypeId(200).to_string(),
            "Unknown ASDU type id:200"
        );
        assert_eq!(
            Iec104Error::SequenceMismatch {
                expected: 10,
                actual: 5
            }
            .to_string(),
            "Sequence number mismatch: expected 10, got 5"
        );
        assert_eq!(
            Iec104Error::T1Timeout.to_string(),
            "T1 timeout: no acknowledgement received"
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = Iec104Error::TypeMismatch {
            expected: TypeId::SingleCommand,
            actual: TypeId::DoubleCommand,
        };
        let display = err.to_string();
        assert!(display.contains("C_SC_NA_1"));
        assert!(display.contains("C_DC_NA_1"));
    }

    #[test]
    fn test_fatality_classes() {
        assert!(Iec104Error::framing_static("bad start").is_fatal());
        assert!(Iec104Error::T1Timeout.is_fatal());
        assert!(Iec104Error::SequenceMismatch {
            expected: 0,
            actual: 1
        }
        .is_fatal());

        assert!(!Iec104Error::UnknownTypeId(200).is_fatal());
        assert!(!Iec104Error::invalid_asdu_static("short").is_fatal());
        assert!(Iec104Error::UnknownTypeId(200).is_parse_error());
        assert!(Iec104Error::invalid_asdu_static("short").is_parse_error());

        assert!(!Iec104Error::NotConnected.is_fatal());
        assert!(!Iec104Error::AlreadyConnected.is_parse_error());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io::{Error as IoError, ErrorKind};
        let io_err = IoError::new(ErrorKind::ConnectionRefused, "connection refused");
        let err: Iec104Error = io_err.into();

        if let Iec104Error::Io(e) = err {
            assert_eq!(e.kind(), ErrorKind::ConnectionRefused);
        } else {
            panic!("Expected Io variant");
        }
    }

    #[test]
    fn test_helper_constructors() {
        assert!(Iec104Error::framing("len 254").to_string().contains("254"));
        assert!(Iec104Error::invalid_asdu("truncated payload")
            .to_string()
            .contains("truncated payload"));
        assert!(Iec104Error::connection_static("peer closed")
            .to_string()
            .contains("peer closed"));
    }
}
