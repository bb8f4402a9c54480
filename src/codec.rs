//! IEC 60870-5-104 frame codec for tokio.
//!
//! [`Iec104Codec`] assembles length-prefixed APDUs out of the TCP byte
//! stream and writes outbound frames, using the tokio-util codec framework.
//! It deals in APCI framing only: the ASDU body of an I-frame is carried as
//! raw octets and parsed by the link engine, so an application-layer parse
//! failure never tears down the framing layer.
//!
//! The decoder is strict. A start octet other than `0x68`, a length octet
//! outside `4..=253`, an I-frame without an ASDU body, or an undefined
//! U-frame bit pattern is a [`Framing`](Iec104Error::Framing) error, which
//! the link engine treats as fatal.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Iec104Error;
use crate::types::{
    Apci, UFunction, APDU_LENGTH_MAX, APDU_LENGTH_MIN, MAX_ASDU_SIZE, START_OCTET,
};

/// An IEC 104 APDU: the APCI control information plus the raw ASDU body
/// (empty for S- and U-frames).
#[derive(Debug, Clone, PartialEq)]
pub struct Apdu {
    /// APCI (Application Protocol Control Information)
    pub apci: Apci,
    /// Raw ASDU body octets; only I-frames carry one
    pub body: Bytes,
}

impl Apdu {
    /// Create an I-frame APDU around a pre-encoded ASDU body.
    pub fn i_frame(ns: u16, nr: u16, body: Bytes) -> Self {
        Self {
            apci: Apci::Information { ns, nr },
            body,
        }
    }

    /// Create an S-frame APDU.
    pub fn s_frame(nr: u16) -> Self {
        Self {
            apci: Apci::Supervisory { nr },
            body: Bytes::new(),
        }
    }

    /// Create a U-frame APDU.
    pub fn u_frame(function: UFunction) -> Self {
        Self {
            apci: Apci::Unnumbered(function),
            body: Bytes::new(),
        }
    }
}

impl std::fmt::Display for Apdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.apci)?;
        if !self.body.is_empty() {
            write!(f, " +{}B", self.body.len())?;
        }
        Ok(())
    }
}

/// IEC 60870-5-104 frame codec.
///
/// # Example
///
/// ```rust,ignore
/// use tokio_util::codec::Framed;
/// use voltage_iec60870::codec::{Apdu, Iec104Codec};
///
/// let stream = TcpStream::connect("192.168.1.100:2404").await?;
/// let mut framed = Framed::new(stream, Iec104Codec::new());
///
/// framed.send(Apdu::u_frame(UFunction::StartDtAct)).await?;
/// while let Some(apdu) = framed.next().await {
///     println!("Received: {}", apdu?);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Iec104Codec;

impl Iec104Codec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Iec104Codec {
    type Item = Apdu;
    type Error = Iec104Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // start octet + length octet first
        if src.len() < 2 {
            return Ok(None);
        }

        if src[0] != START_OCTET {
            return Err(Iec104Error::framing(format!(
                "Invalid start octet: 0x{:02X}",
                src[0]
            )));
        }

        let length = src[1] as usize;
        if !(APDU_LENGTH_MIN..=APDU_LENGTH_MAX).contains(&length) {
            return Err(Iec104Error::framing(format!(
                "Invalid APDU length: {}",
                length
            )));
        }

        let total = 2 + length;
        if src.len() < total {
            // loop in the caller until the full frame has arrived
            src.reserve(total - src.len());
            return Ok(None);
        }

        let frame = src.split_to(total).freeze();
        let apci = Apci::decode([frame[2], frame[3], frame[4], frame[5]])?;

        if apci.carries_asdu() && frame.len() <= 6 {
            return Err(Iec104Error::framing_static("I-frame without ASDU body"));
        }
        if !apci.carries_asdu() && frame.len() > 6 {
            return Err(Iec104Error::framing_static(
                "Unexpected payload on S/U frame",
            ));
        }

        Ok(Some(Apdu {
            apci,
            body: frame.slice(6..),
        }))
    }
}

impl Encoder<Apdu> for Iec104Codec {
    type Error = Iec104Error;

    fn encode(&mut self, item: Apdu, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.body.len() > MAX_ASDU_SIZE {
            return Err(Iec104Error::framing_static("ASDU too large"));
        }

        dst.reserve(6 + item.body.len());
        dst.extend_from_slice(&item.apci.header_bytes(item.body.len()));
        dst.extend_from_slice(&item.body);
        Ok(())
    }
}
