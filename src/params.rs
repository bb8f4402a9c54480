//! Connection parameters and client configuration.
//!
//! `ConnectionParameters` carries the wire-format sizing and the protocol
//! timing/flow constants defined by IEC 60870-5-104 (k, w, t0..t3). The
//! parameters are cloned into a connection when it is created and never
//! change for the life of the link.

use std::time::Duration;

/// Default IEC 104 port.
pub const DEFAULT_PORT: u16 = 2404;

/// Default t0 (TCP connect timeout) in seconds.
pub const DEFAULT_T0_TIMEOUT: u64 = 30;

/// Default t1 (acknowledgement timeout for sent I- and U-frames) in seconds.
pub const DEFAULT_T1_TIMEOUT: u64 = 15;

/// Default t2 (acknowledgement delay for received I-frames) in seconds.
pub const DEFAULT_T2_TIMEOUT: u64 = 10;

/// Default t3 (idle period before a TESTFR is issued) in seconds.
pub const DEFAULT_T3_TIMEOUT: u64 = 20;

/// Default k parameter (max unacknowledged I-frames in flight).
pub const DEFAULT_K: u16 = 12;

/// Default w parameter (received I-frames before an S-frame is due).
pub const DEFAULT_W: u16 = 8;

/// Width of the cause-of-transmission field.
///
/// With two octets the second octet carries the originator address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CotSize {
    /// Cause octet only, no originator address
    One = 1,
    /// Cause octet plus originator address octet
    #[default]
    Two = 2,
}

/// Width of the common address of ASDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaSize {
    /// 1 octet
    One = 1,
    /// 2 octets
    #[default]
    Two = 2,
}

impl CaSize {
    /// The all-ones broadcast common address for this width.
    #[inline]
    pub const fn broadcast(self) -> u16 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
        }
    }
}

/// Width of the information object address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoaSize {
    /// 1 octet
    One = 1,
    /// 2 octets
    Two = 2,
    /// 3 octets
    #[default]
    Three = 3,
}

impl IoaSize {
    /// Largest address representable at this width.
    #[inline]
    pub const fn max_address(self) -> u32 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
            Self::Three => 0x00FF_FFFF,
        }
    }
}

/// Wire-format sizing and protocol constants governing one link.
#[derive(Debug, Clone)]
pub struct ConnectionParameters {
    /// Cause-of-transmission width; two octets adds the originator address
    pub cot_size: CotSize,
    /// Common address width
    pub ca_size: CaSize,
    /// Information object address width
    pub ioa_size: IoaSize,
    /// Originator address, emitted when `cot_size` is two octets
    pub originator: u8,
    /// Max unacknowledged I-frames in flight (1..32767)
    pub k: u16,
    /// Received I-frames before an S-frame acknowledgement is due (1..k)
    pub w: u16,
    /// t0: TCP connect timeout
    pub t0: Duration,
    /// t1: acknowledgement timeout for sent I- and U-frames
    pub t1: Duration,
    /// t2: max delay before acknowledging received I-frames (t2 < t1)
    pub t2: Duration,
    /// t3: idle period after which a TESTFR is issued
    pub t3: Duration,
    /// Send STARTDT act immediately after the TCP connection opens
    pub autostart: bool,
    /// Log every frame sent and received at debug level
    pub trace: bool,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            cot_size: CotSize::Two,
            ca_size: CaSize::Two,
            ioa_size: IoaSize::Three,
            originator: 0,
            k: DEFAULT_K,
            w: DEFAULT_W,
            t0: Duration::from_secs(DEFAULT_T0_TIMEOUT),
            t1: Duration::from_secs(DEFAULT_T1_TIMEOUT),
            t2: Duration::from_secs(DEFAULT_T2_TIMEOUT),
            t3: Duration::from_secs(DEFAULT_T3_TIMEOUT),
            autostart: true,
            trace: false,
        }
    }
}

impl ConnectionParameters {
    /// Create parameters with the standard defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Width in octets of an ASDU header under these parameters.
    #[inline]
    pub(crate) fn header_size(&self) -> usize {
        // type id + vsq + cause [+ originator] + common address
        2 + self.cot_size as usize + self.ca_size as usize
    }

    /// The effective w, never above k.
    #[inline]
    pub(crate) fn effective_w(&self) -> u16 {
        self.w.min(self.k)
    }
}

/// Client configuration: server address plus connection parameters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (host:port)
    pub address: String,
    /// Wire-format sizing and protocol constants
    pub parameters: ConnectionParameters,
}

impl ClientConfig {
    /// Create a new configuration with the given address and default
    /// parameters.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            parameters: ConnectionParameters::default(),
        }
    }

    /// Replace the connection parameters wholesale.
    pub fn parameters(mut self, parameters: ConnectionParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set t0 (TCP connect timeout).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.parameters.t0 = timeout;
        self
    }

    /// Set t1 (acknowledgement timeout).
    pub fn t1_timeout(mut self, timeout: Duration) -> Self {
        self.parameters.t1 = timeout;
        self
    }

    /// Set t2 (acknowledgement delay).
    pub fn t2_timeout(mut self, timeout: Duration) -> Self {
        self.parameters.t2 = timeout;
        self
    }

    /// Set t3 (idle test-frame period).
    pub fn t3_timeout(mut self, timeout: Duration) -> Self {
        self.parameters.t3 = timeout;
        self
    }

    /// Set the k parameter.
    pub fn k(mut self, k: u16) -> Self {
        self.parameters.k = k.clamp(1, 32767);
        self
    }

    /// Set the w parameter.
    pub fn w(mut self, w: u16) -> Self {
        self.parameters.w = w.max(1);
        self
    }

    /// Set whether STARTDT act is sent automatically after connect.
    pub fn autostart(mut self, autostart: bool) -> Self {
        self.parameters.autostart = autostart;
        self
    }

    /// Set the originator address (emitted when the COT field is two octets).
    pub fn originator(mut self, originator: u8) -> Self {
        self.parameters.originator = originator;
        self
    }
}
