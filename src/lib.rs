//! # voltage_iec60870
//!
//! IEC 60870-5-104 telecontrol protocol for Rust: the client (controlling
//! station) side of the TCP profile used between SCADA masters and
//! substations.
//!
//! ## Features
//!
//! - **Full APCI link layer**: I/S/U frames, 15-bit sequence counters, the
//!   k/w flow-control window and the t0..t3 protocol timers
//! - **Typed ASDU catalogue**: every monitor, control, system and parameter
//!   telegram of the companion standard as a closed variant set, with
//!   sequence and discrete information object layouts
//! - **Configurable field widths**: cause of transmission, common address
//!   and information object address sizing per link
//! - **Event-driven**: received ASDUs and lifecycle changes are delivered
//!   through a channel in wire order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voltage_iec60870::{ClientConfig, Iec104Client, Iec104Event};
//!
//! #[tokio::main]
//! async fn main() -> voltage_iec60870::Result<()> {
//!     let mut client = Iec104Client::new(ClientConfig::new("192.168.1.100:2404"));
//!     let mut events = client.subscribe().expect("first subscription");
//!
//!     // opens the TCP connection and (with autostart) starts data transfer
//!     client.connect().await?;
//!
//!     // request a station interrogation
//!     client.general_interrogation(1).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             Iec104Event::AsduReceived(asdu) => {
//!                 for object in asdu.elements()? {
//!                     println!("{}: {:?}", object.ioa(), object);
//!                 }
//!             }
//!             Iec104Event::Closed => break,
//!             other => println!("{:?}", other),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol Overview
//!
//! IEC 60870-5-104 runs over TCP (default port 2404). Every unit on the
//! wire is an APDU:
//!
//! ```text
//! +--------+--------+--------+--------+--------+--------+----------------+
//! | 0x68   | Length | Control Field (4 bytes)           | ASDU (0..249B) |
//! +--------+--------+--------+--------+--------+--------+----------------+
//! ```
//!
//! - **I-frame**: numbered information transfer, carries one ASDU
//! - **S-frame**: supervisory acknowledgement of received I-frames
//! - **U-frame**: unnumbered link control (STARTDT, STOPDT, TESTFR)

pub mod client;
pub mod codec;
pub mod connection;
pub mod error;
pub mod params;
pub mod types;

// Re-export main types
pub use client::Iec104Client;
pub use codec::{Apdu, Iec104Codec};
pub use connection::{Connection, ConnectionState, Iec104Event};
pub use error::{Iec104Error, Result};
pub use params::{CaSize, ClientConfig, ConnectionParameters, CotSize, IoaSize, DEFAULT_PORT};
pub use types::*;
