//! IEC 60870-5-104 client (controlling station).
//!
//! [`Iec104Client`] wraps the APCI link engine with the IEC-104 command
//! set: interrogation, counter interrogation, read, clock synchronization,
//! test, reset process, delay acquisition and the 45..64 control commands.
//! Every command builds a one-element ASDU and hands it to the engine;
//! commands fail synchronously with [`Iec104Error::NotConnected`] unless
//! the link is active.

use tokio::sync::mpsc;

use crate::connection::{Connection, ConnectionState, Iec104Event};
use crate::error::{Iec104Error, Result};
use crate::params::ClientConfig;
use crate::types::{
    Asdu, AsduHeader, Cot, Cp16Time2a, Cp56Time2a, DoublePointValue, DoubleCommandInfo,
    InformationObject, Ioa, SetpointQualifier, SingleCommandInfo, TypeId,
};

/// Capacity of the event channel between the link engine and the consumer.
const EVENT_CHANNEL_SIZE: usize = 100;

/// IEC 60870-5-104 client.
///
/// # Example
///
/// ```rust,ignore
/// use voltage_iec60870::{ClientConfig, Iec104Client};
///
/// #[tokio::main]
/// async fn main() -> voltage_iec60870::Result<()> {
///     let mut client = Iec104Client::new(ClientConfig::new("192.168.1.100:2404"));
///     let mut events = client.subscribe().expect("first subscription");
///
///     client.connect().await?;
///     client.interrogation(Cot::Activation, 1, 20).await?;
///
///     while let Some(event) = events.recv().await {
///         println!("{:?}", event);
///     }
///     Ok(())
/// }
/// ```
pub struct Iec104Client {
    config: ClientConfig,
    connection: Connection,
    event_rx: Option<mpsc::Receiver<Iec104Event>>,
}

impl Iec104Client {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let connection = Connection::new(config.parameters.clone(), event_tx);
        Self {
            config,
            connection,
            event_rx: Some(event_rx),
        }
    }

    /// Take the event receiver. Can only be taken once.
    pub fn subscribe(&mut self) -> Option<mpsc::Receiver<Iec104Event>> {
        self.event_rx.take()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The underlying link engine.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Connect to the server, honouring the t0 deadline.
    pub async fn connect(&mut self) -> Result<()> {
        self.connection.connect(&self.config.address).await
    }

    /// Disconnect. Stops data transfer first when it is active.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.state() == ConnectionState::Active {
            self.connection.send_stop_dt().await.ok();
        }
        self.connection.close().await
    }

    /// Start data transfer (STARTDT act) and wait for the confirmation.
    ///
    /// Only needed with `autostart` disabled.
    pub async fn start_dt(&mut self) -> Result<()> {
        self.connection.send_start_dt().await
    }

    /// Stop data transfer (STOPDT act) and wait for the confirmation.
    pub async fn stop_dt(&mut self) -> Result<()> {
        self.connection.send_stop_dt().await
    }

    /// Send an interrogation command (C_IC_NA_1).
    ///
    /// `qoi` selects the scope: 20 is the station interrogation, 21..36 the
    /// interrogation groups.
    pub async fn interrogation(&self, cot: Cot, common_address: u16, qoi: u8) -> Result<()> {
        self.send_command(
            TypeId::Interrogation,
            cot,
            common_address,
            InformationObject::Interrogation(Ioa::new(0), qoi),
        )
        .await
    }

    /// Send a general (station) interrogation with COT activation.
    pub async fn general_interrogation(&self, common_address: u16) -> Result<()> {
        self.interrogation(Cot::Activation, common_address, 20).await
    }

    /// Send a counter interrogation command (C_CI_NA_1).
    ///
    /// `qcc` combines the request type (RQT) and freeze variant (FRZ).
    pub async fn counter_interrogation(&self, cot: Cot, common_address: u16, qcc: u8) -> Result<()> {
        self.send_command(
            TypeId::CounterInterrogation,
            cot,
            common_address,
            InformationObject::CounterInterrogation(Ioa::new(0), qcc),
        )
        .await
    }

    /// Send a read command (C_RD_NA_1) for one information object.
    pub async fn read_command(&self, common_address: u16, ioa: u32) -> Result<()> {
        self.send_command(
            TypeId::Read,
            Cot::Request,
            common_address,
            InformationObject::Read(Ioa::new(ioa)),
        )
        .await
    }

    /// Send a clock synchronization command (C_CS_NA_1).
    pub async fn clock_sync(&self, common_address: u16, time: Cp56Time2a) -> Result<()> {
        self.send_command(
            TypeId::ClockSync,
            Cot::Activation,
            common_address,
            InformationObject::ClockSync(Ioa::new(0), time),
        )
        .await
    }

    /// Send a test command (C_TS_NA_1) with the fixed test bit pattern.
    pub async fn test_command(&self, common_address: u16) -> Result<()> {
        self.send_command(
            TypeId::TestCommand,
            Cot::Activation,
            common_address,
            InformationObject::TestCommand(Ioa::new(0)),
        )
        .await
    }

    /// Send a reset process command (C_RP_NA_1).
    pub async fn reset_process(&self, cot: Cot, common_address: u16, qrp: u8) -> Result<()> {
        self.send_command(
            TypeId::ResetProcess,
            cot,
            common_address,
            InformationObject::ResetProcess(Ioa::new(0), qrp),
        )
        .await
    }

    /// Send a delay acquisition command (C_CD_NA_1).
    pub async fn delay_acquisition(
        &self,
        cot: Cot,
        common_address: u16,
        delay: Cp16Time2a,
    ) -> Result<()> {
        self.send_command(
            TypeId::DelayAcquisition,
            cot,
            common_address,
            InformationObject::DelayAcquisition(Ioa::new(0), delay),
        )
        .await
    }

    /// Send a process control command (type ids 45..64).
    ///
    /// The requested `type_id` must match the type the supplied object
    /// declares; a mismatch fails locally with
    /// [`Iec104Error::TypeMismatch`] before anything is sent.
    pub async fn control(
        &self,
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        object: InformationObject,
    ) -> Result<()> {
        if !type_id.is_command() {
            return Err(Iec104Error::TypeMismatch {
                expected: type_id,
                actual: object.type_id(),
            });
        }
        self.send_command(type_id, cot, common_address, object).await
    }

    /// Send a single command (C_SC_NA_1).
    pub async fn single_command(
        &self,
        common_address: u16,
        ioa: u32,
        value: bool,
        select: bool,
    ) -> Result<()> {
        let info = SingleCommandInfo {
            on: value,
            qualifier: 0,
            select,
        };
        self.control(
            TypeId::SingleCommand,
            Cot::Activation,
            common_address,
            InformationObject::SingleCommand(Ioa::new(ioa), info),
        )
        .await
    }

    /// Send a double command (C_DC_NA_1).
    pub async fn double_command(
        &self,
        common_address: u16,
        ioa: u32,
        value: DoublePointValue,
        select: bool,
    ) -> Result<()> {
        let info = DoubleCommandInfo {
            value,
            qualifier: 0,
            select,
        };
        self.control(
            TypeId::DoubleCommand,
            Cot::Activation,
            common_address,
            InformationObject::DoubleCommand(Ioa::new(ioa), info),
        )
        .await
    }

    /// Send a set-point command, short floating point (C_SE_NC_1).
    pub async fn setpoint_float(
        &self,
        common_address: u16,
        ioa: u32,
        value: f32,
        select: bool,
    ) -> Result<()> {
        let qualifier = SetpointQualifier { ql: 0, select };
        self.control(
            TypeId::SetpointFloat,
            Cot::Activation,
            common_address,
            InformationObject::SetpointFloat(Ioa::new(ioa), value, qualifier),
        )
        .await
    }

    /// Send an already assembled ASDU as an I-frame.
    pub async fn send_asdu(&self, asdu: &Asdu) -> Result<()> {
        self.connection.send_asdu(asdu).await
    }

    /// Build and send a one-element ASDU.
    async fn send_command(
        &self,
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        object: InformationObject,
    ) -> Result<()> {
        if object.type_id() != type_id {
            return Err(Iec104Error::TypeMismatch {
                expected: type_id,
                actual: object.type_id(),
            });
        }

        let mut header = AsduHeader::new(type_id, 1, cot, common_address);
        header.originator = self.config.parameters.originator;
        let asdu = Asdu::with_object(header, object);
        self.connection.send_asdu(&asdu).await
    }
}
