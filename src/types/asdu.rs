//! IEC 60870-5-104 ASDU (Application Service Data Unit).
//!
//! An ASDU is the application-layer message inside an I-frame: a header
//! (type identification, variable structure qualifier, cause of
//! transmission, originator and common address) followed by one or more
//! information objects of uniform type.
//!
//! Field widths for the cause, the common address and the information
//! object address are governed by [`ConnectionParameters`]; a decoded ASDU
//! remembers the address width it was parsed under so elements can be
//! extracted later without the parameters at hand.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Iec104Error, Result};
use crate::params::{ConnectionParameters, CotSize, IoaSize};
use crate::types::{Cot, InformationObject, TypeId, MAX_ASDU_SIZE};

/// Variable Structure Qualifier (VSQ).
///
/// Bit 7 (SQ) selects the compact sequence layout; bits 0-6 hold the
/// element count (0..127).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vsq {
    /// Number of information objects (0-127)
    pub count: u8,
    /// If true, addresses are sequential (SQ=1)
    pub sequence: bool,
}

impl Vsq {
    /// Create a new VSQ.
    #[inline]
    pub const fn new(count: u8, sequence: bool) -> Self {
        Self {
            count: count & 0x7F,
            sequence,
        }
    }

    /// Parse VSQ from its octet.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            count: value & 0x7F,
            sequence: (value & 0x80) != 0,
        }
    }

    /// Encode VSQ to its octet.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.count & 0x7F) | if self.sequence { 0x80 } else { 0 }
    }
}

/// Information Object Address (IOA).
///
/// At most 24 bits; the on-wire width (1, 2 or 3 octets) is a link
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ioa(pub u32);

impl Ioa {
    /// Create an IOA from the lower 24 bits of `value`.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Parse an IOA of the given width (little-endian).
    pub(crate) fn decode(bytes: &[u8], size: IoaSize) -> Result<Self> {
        let width = size as usize;
        if bytes.len() < width {
            return Err(Iec104Error::invalid_asdu_static("IOA too short"));
        }
        let mut value = 0u32;
        for (i, b) in bytes[..width].iter().enumerate() {
            value |= (*b as u32) << (8 * i);
        }
        Ok(Self(value))
    }

    /// Encode this IOA at the given width (little-endian). Fails when the
    /// address does not fit the width.
    pub(crate) fn encode(&self, buf: &mut BytesMut, size: IoaSize) -> Result<()> {
        if self.0 > size.max_address() {
            return Err(Iec104Error::invalid_asdu(format!(
                "IOA {} does not fit in {} octet(s)",
                self.0, size as usize
            )));
        }
        for i in 0..size as usize {
            buf.put_u8((self.0 >> (8 * i)) as u8);
        }
        Ok(())
    }
}

impl std::fmt::Display for Ioa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ASDU header (the fixed prefix before the information objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsduHeader {
    /// Raw type identification octet. Kept raw so telegrams with an
    /// uncatalogued type survive until element access; use
    /// [`Asdu::type_id`] for the decoded catalogue entry.
    pub type_id: u8,
    /// Variable structure qualifier
    pub vsq: Vsq,
    /// Cause of transmission
    pub cot: Cot,
    /// Test flag (bit 7 of the cause octet)
    pub test: bool,
    /// Negative confirmation flag (bit 6 of the cause octet)
    pub negative: bool,
    /// Originator address (0 when the COT field is a single octet)
    pub originator: u8,
    /// Common address of ASDU (station address)
    pub common_address: u16,
}

impl AsduHeader {
    /// Create a new header for `count` discretely addressed objects.
    pub fn new(type_id: TypeId, count: u8, cot: Cot, common_address: u16) -> Self {
        Self {
            type_id: type_id.as_u8(),
            vsq: Vsq::new(count, false),
            cot,
            test: false,
            negative: false,
            originator: 0,
            common_address,
        }
    }

    /// Parse a header under the given parameters.
    ///
    /// Returns the header and the number of octets consumed.
    pub fn parse(data: &[u8], params: &ConnectionParameters) -> Result<(Self, usize)> {
        let header_size = params.header_size();
        if data.len() < header_size {
            return Err(Iec104Error::invalid_asdu_static("ASDU header too short"));
        }

        let type_id = data[0];
        let vsq = Vsq::from_u8(data[1]);
        let cot = Cot::from_u8(data[2])?;
        let test = (data[2] & 0x80) != 0;
        let negative = (data[2] & 0x40) != 0;

        let mut offset = 3;
        let originator = if params.cot_size == CotSize::Two {
            offset += 1;
            data[3]
        } else {
            0
        };

        let common_address = match params.ca_size {
            crate::params::CaSize::One => data[offset] as u16,
            crate::params::CaSize::Two => {
                u16::from_le_bytes([data[offset], data[offset + 1]])
            }
        };

        Ok((
            Self {
                type_id,
                vsq,
                cot,
                test,
                negative,
                originator,
                common_address,
            },
            header_size,
        ))
    }

    /// Encode the header under the given parameters.
    pub fn encode(&self, buf: &mut BytesMut, params: &ConnectionParameters) {
        buf.put_u8(self.type_id);
        buf.put_u8(self.vsq.as_u8());

        let mut cot_byte = self.cot.as_u8();
        if self.negative {
            cot_byte |= 0x40;
        }
        if self.test {
            cot_byte |= 0x80;
        }
        buf.put_u8(cot_byte);

        if params.cot_size == CotSize::Two {
            buf.put_u8(self.originator);
        }

        match params.ca_size {
            crate::params::CaSize::One => buf.put_u8(self.common_address as u8),
            crate::params::CaSize::Two => buf.put_u16_le(self.common_address),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    /// Built locally from typed objects
    Objects(Vec<InformationObject>),
    /// Received from the wire, parsed on demand
    Raw(Bytes),
}

/// Complete ASDU: header plus either typed information objects (outbound)
/// or a raw payload slice parsed on demand (inbound).
#[derive(Debug, Clone, PartialEq)]
pub struct Asdu {
    /// ASDU header
    pub header: AsduHeader,
    payload: Payload,
    /// Address width the raw payload was parsed under
    ioa_size: IoaSize,
}

impl Asdu {
    /// Create an empty ASDU (a pure confirmation has zero elements).
    pub fn new(header: AsduHeader) -> Self {
        Self {
            header,
            payload: Payload::Objects(Vec::new()),
            ioa_size: IoaSize::default(),
        }
    }

    /// Create an ASDU carrying a single information object.
    pub fn with_object(mut header: AsduHeader, object: InformationObject) -> Self {
        header.vsq = Vsq::new(1, false);
        Self {
            header,
            payload: Payload::Objects(vec![object]),
            ioa_size: IoaSize::default(),
        }
    }

    /// Append an information object, keeping the VSQ count in step.
    pub fn push_object(&mut self, object: InformationObject) {
        match &mut self.payload {
            Payload::Objects(objects) => {
                objects.push(object);
                self.header.vsq = Vsq::new(objects.len() as u8, self.header.vsq.sequence);
            }
            Payload::Raw(_) => {
                self.payload = Payload::Objects(vec![object]);
                self.header.vsq = Vsq::new(1, self.header.vsq.sequence);
            }
        }
    }

    /// The catalogued type identification, or `UnknownTypeId` for telegrams
    /// outside the catalogue.
    #[inline]
    pub fn type_id(&self) -> Result<TypeId> {
        TypeId::from_u8(self.header.type_id)
    }

    /// Number of information objects announced by the VSQ.
    #[inline]
    pub fn len(&self) -> usize {
        self.header.vsq.count as usize
    }

    /// Whether the ASDU announces zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.vsq.count == 0
    }

    /// Parse an ASDU body (the octets after the APCI) under the given
    /// parameters.
    ///
    /// The header is decoded eagerly; the information objects are kept as a
    /// raw slice and decoded on demand by [`element`](Self::element). When
    /// the type is in the catalogue the total payload length is checked
    /// against the announced element count, so a peer sending with
    /// mismatched address widths is rejected instead of misread.
    pub fn parse(data: &[u8], params: &ConnectionParameters) -> Result<Self> {
        let (header, header_len) = AsduHeader::parse(data, params)?;
        let raw = Bytes::copy_from_slice(&data[header_len..]);

        if let Ok(type_id) = TypeId::from_u8(header.type_id) {
            if let Some(width) = type_id.element_width() {
                let n = header.vsq.count as usize;
                if header.vsq.sequence && !type_id.supports_sequence() {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "Sequence layout not allowed for {}",
                        type_id.standard_name()
                    )));
                }
                let ioa_width = params.ioa_size as usize;
                let expected = if header.vsq.sequence && n > 0 {
                    ioa_width + n * width
                } else {
                    n * (ioa_width + width)
                };
                if raw.len() != expected {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "Payload length {} does not match {} element(s) of {}",
                        raw.len(),
                        n,
                        type_id.standard_name()
                    )));
                }
            }
        }

        Ok(Self {
            header,
            payload: Payload::Raw(raw),
            ioa_size: params.ioa_size,
        })
    }

    /// Decode the information object at index `i`.
    ///
    /// Dispatches on the type identification through the width table. Fails
    /// with a parse error when the type is not in the catalogue, when `i` is
    /// out of range, or when the payload is too short.
    pub fn element(&self, i: usize) -> Result<InformationObject> {
        let n = self.header.vsq.count as usize;
        if i >= n {
            return Err(Iec104Error::invalid_asdu(format!(
                "Element index {} out of range ({} elements)",
                i, n
            )));
        }

        let raw = match &self.payload {
            Payload::Objects(objects) => {
                return objects.get(i).copied().ok_or_else(|| {
                    Iec104Error::invalid_asdu_static("Element count exceeds stored objects")
                });
            }
            Payload::Raw(raw) => raw,
        };

        let type_id = self.type_id()?;
        let width = type_id.element_width().ok_or_else(|| {
            Iec104Error::invalid_asdu(format!(
                "{} objects are not decoded",
                type_id.standard_name()
            ))
        })?;
        let ioa_width = self.ioa_size as usize;

        if self.header.vsq.sequence {
            if !type_id.supports_sequence() {
                return Err(Iec104Error::invalid_asdu(format!(
                    "Sequence layout not allowed for {}",
                    type_id.standard_name()
                )));
            }
            let base = Ioa::decode(raw, self.ioa_size)?;
            let offset = ioa_width + i * width;
            if raw.len() < offset + width {
                return Err(Iec104Error::invalid_asdu_static("Truncated ASDU payload"));
            }
            InformationObject::decode(
                type_id,
                Ioa::new(base.value() + i as u32),
                &raw[offset..offset + width],
            )
        } else {
            let offset = i * (ioa_width + width);
            if raw.len() < offset + ioa_width + width {
                return Err(Iec104Error::invalid_asdu_static("Truncated ASDU payload"));
            }
            let ioa = Ioa::decode(&raw[offset..], self.ioa_size)?;
            InformationObject::decode(type_id, ioa, &raw[offset + ioa_width..offset + ioa_width + width])
        }
    }

    /// Decode all information objects.
    pub fn elements(&self) -> Result<Vec<InformationObject>> {
        (0..self.len()).map(|i| self.element(i)).collect()
    }

    /// Encode the ASDU body under the given parameters.
    pub fn encode_to(&self, buf: &mut BytesMut, params: &ConnectionParameters) -> Result<()> {
        let start = buf.len();
        self.header.encode(buf, params);

        match &self.payload {
            Payload::Objects(objects) => {
                if self.header.vsq.sequence {
                    // one address at the head, elements implicitly addressed
                    if let Some(first) = objects.first() {
                        first.ioa().encode(buf, params.ioa_size)?;
                    }
                    for object in objects {
                        object.encode_payload(buf);
                    }
                } else {
                    for object in objects {
                        object.ioa().encode(buf, params.ioa_size)?;
                        object.encode_payload(buf);
                    }
                }
            }
            Payload::Raw(raw) => buf.put_slice(raw),
        }

        if buf.len() - start > MAX_ASDU_SIZE {
            return Err(Iec104Error::invalid_asdu_static("ASDU too large"));
        }
        Ok(())
    }

    /// Encode the ASDU body to a freshly allocated buffer.
    pub fn to_bytes(&self, params: &ConnectionParameters) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_to(&mut buf, params)?;
        Ok(buf.freeze())
    }
}

impl std::fmt::Display for Asdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.type_id() {
            Ok(type_id) => write!(f, "[{}]", type_id)?,
            Err(_) => write!(f, "[TI={}]", self.header.type_id)?,
        }
        write!(
            f,
            " COT={} CA={} n={}",
            self.header.cot, self.header.common_address, self.header.vsq.count
        )?;
        if self.header.negative {
            f.write_str(" NEG")?;
        }
        if self.header.test {
            f.write_str(" TEST")?;
        }
        Ok(())
    }
}
