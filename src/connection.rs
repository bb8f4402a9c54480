//! APCI link engine.
//!
//! One [`Connection`] owns a TCP endpoint, the send/receive sequence
//! counters, the U-frame handshakes, the S-frame acknowledgement cadence
//! and the I-frame pipeline. A dedicated receive task per connection drives
//! the framed stream together with the four protocol timers; received ASDUs
//! and lifecycle transitions are delivered to the user as [`Iec104Event`]s
//! in wire order.
//!
//! Shared link state is guarded by a single mutex per connection. Senders
//! and the receive task both take it; the event channel is the only path
//! out. Consumers of the event channel must not block for long and must not
//! call [`Connection::close`] from the task draining events while the
//! channel is full, as the engine applies backpressure through it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::{Apdu, Iec104Codec};
use crate::error::{Iec104Error, Result};
use crate::params::ConnectionParameters;
use crate::types::{Apci, Asdu, Cot, TypeId, UFunction, SEQ_MODULO};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No TCP connection
    Disconnected,
    /// TCP connect in progress
    Connecting,
    /// TCP open, data transfer not started
    Connected,
    /// Data transfer active (STARTDT confirmed)
    Active,
    /// Link shutting down
    Closing,
}

impl ConnectionState {
    /// Whether I-frames may be sent in this state.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Events emitted by the link engine, delivered in wire order.
#[derive(Debug, Clone)]
pub enum Iec104Event {
    /// TCP connection established
    Opened,
    /// Connection closed (after an error event when the close was not
    /// user-requested)
    Closed,
    /// STARTDT confirmed by the peer; the link is active
    DataTransferStarted,
    /// STOPDT confirmed or requested by the peer; the link is open but idle
    DataTransferStopped,
    /// An ASDU arrived
    AsduReceived(Asdu),
    /// A non-fatal application parse error, or the cause of a close
    Error(String),
}

type FrameSink = SplitSink<Framed<TcpStream, Iec104Codec>, Apdu>;
type FrameStream = SplitStream<Framed<TcpStream, Iec104Codec>>;

/// Mutable link state, all guarded by the connection mutex.
struct LinkState {
    sink: FrameSink,
    /// Send counter (NS of the next outbound I-frame)
    send_seq: u16,
    /// Receive counter (expected NS of the next inbound I-frame)
    recv_seq: u16,
    /// Received I-frames since our last acknowledgement
    unconfirmed_recvs: u16,
    /// When we last acknowledged (S-frame or piggybacked on an I-frame)
    last_ack: Instant,
    /// When a frame was last sent or received; arms t3
    last_activity: Instant,
    /// Outbound I-frames awaiting the peer's acknowledgement: (NS, sent at)
    pending_acks: VecDeque<(u16, Instant)>,
    /// U-frame activation awaiting its confirmation
    pending_u: Option<(UFunction, Instant)>,
    /// TESTFR act awaiting TESTFR con
    pending_test: Option<Instant>,
}

impl LinkState {
    fn new(sink: FrameSink) -> Self {
        let now = Instant::now();
        Self {
            sink,
            send_seq: 0,
            recv_seq: 0,
            unconfirmed_recvs: 0,
            last_ack: now,
            last_activity: now,
            pending_acks: VecDeque::new(),
            pending_u: None,
            pending_test: None,
        }
    }

    /// Stamp and send an I-frame, updating counters and the ack FIFO.
    async fn send_i_frame(&mut self, body: Bytes) -> Result<()> {
        let apdu = Apdu::i_frame(self.send_seq, self.recv_seq, body);
        self.sink.send(apdu).await?;
        let now = Instant::now();
        self.pending_acks.push_back((self.send_seq, now));
        self.send_seq = (self.send_seq + 1) % SEQ_MODULO;
        // the embedded receive count acknowledges everything received so far
        self.unconfirmed_recvs = 0;
        self.last_ack = now;
        self.last_activity = now;
        Ok(())
    }

    /// Send an S-frame carrying the current receive count.
    async fn send_s_frame(&mut self) -> Result<()> {
        self.sink.send(Apdu::s_frame(self.recv_seq)).await?;
        let now = Instant::now();
        self.unconfirmed_recvs = 0;
        self.last_ack = now;
        self.last_activity = now;
        Ok(())
    }

    /// Send a U-frame, optionally arming t1 for the expected confirmation.
    async fn send_u_frame(&mut self, function: UFunction, expect: Option<UFunction>) -> Result<()> {
        self.sink.send(Apdu::u_frame(function)).await?;
        let now = Instant::now();
        self.last_activity = now;
        if let Some(con) = expect {
            self.pending_u = Some((con, now));
        }
        Ok(())
    }

    /// Drop every pending entry acknowledged by the peer's receive count.
    /// Returns true when at least one entry was released.
    fn ack_up_to(&mut self, nr: u16, k: u16) -> bool {
        let mut any = false;
        while let Some(&(ns, _)) = self.pending_acks.front() {
            if seq_acked(ns, nr, k) {
                self.pending_acks.pop_front();
                any = true;
            } else {
                break;
            }
        }
        any
    }
}

/// Whether an I-frame with send count `ns` is acknowledged by receive count
/// `nr`, given a window of at most `k` outstanding frames.
fn seq_acked(ns: u16, nr: u16, k: u16) -> bool {
    ((nr.wrapping_sub(ns).wrapping_sub(1)) & 0x7FFF) < k
}

struct Inner {
    state: ConnectionState,
    /// Bumped on every connect cycle so a lingering receive task from a
    /// previous cycle cannot touch the new link
    generation: u64,
    link: Option<LinkState>,
}

struct Shared {
    params: ConnectionParameters,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ConnectionState>,
    events: mpsc::Sender<Iec104Event>,
    /// Signalled when the ack FIFO shrinks
    acked: Notify,
    /// Nudges the receive task to recompute its timer deadline after a
    /// caller armed t1 by sending
    kick: Notify,
}

impl Shared {
    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    async fn emit(&self, event: Iec104Event) {
        let _ = self.events.send(event).await;
    }
}

/// An IEC 60870-5-104 connection: the APCI link engine.
///
/// Created with an event channel; all received ASDUs and lifecycle changes
/// arrive there. Cloning is cheap and all clones drive the same link.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Create a new connection in the disconnected state.
    pub fn new(params: ConnectionParameters, events: mpsc::Sender<Iec104Event>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                params,
                inner: Mutex::new(Inner {
                    state: ConnectionState::Disconnected,
                    generation: 0,
                    link: None,
                }),
                state_tx,
                events,
                acked: Notify::new(),
                kick: Notify::new(),
            }),
        }
    }

    /// The connection parameters this link was created with.
    pub fn parameters(&self) -> &ConnectionParameters {
        &self.shared.params
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Open the TCP connection, honouring the t0 deadline.
    ///
    /// Blocks until the connection is open (or failed). With `autostart`
    /// set, STARTDT act is sent immediately after the socket opens; the
    /// transition to [`ConnectionState::Active`] is reported through
    /// [`Iec104Event::DataTransferStarted`].
    pub async fn connect(&self, address: &str) -> Result<()> {
        let shared = &self.shared;
        {
            let mut inner = shared.inner.lock().await;
            match inner.state {
                ConnectionState::Disconnected => {}
                ConnectionState::Connecting => return Err(Iec104Error::AlreadyConnecting),
                _ => return Err(Iec104Error::AlreadyConnected),
            }
            inner.generation += 1;
            shared.set_state(&mut inner, ConnectionState::Connecting);
        }

        let stream = match timeout(shared.params.t0, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.abort_connect().await;
                return Err(Iec104Error::Io(e));
            }
            Err(_) => {
                self.abort_connect().await;
                return Err(Iec104Error::ConnectionTimeout);
            }
        };
        // low latency matters more than throughput on a telecontrol link
        stream.set_nodelay(true).ok();

        let (sink, stream) = Framed::new(stream, Iec104Codec::new()).split();
        let generation = {
            let mut inner = shared.inner.lock().await;
            inner.link = Some(LinkState::new(sink));
            shared.set_state(&mut inner, ConnectionState::Connected);
            inner.generation
        };

        debug!(address, "connected");
        shared.emit(Iec104Event::Opened).await;

        let task_shared = Arc::clone(shared);
        tokio::spawn(run_link(task_shared, stream, generation));

        if shared.params.autostart {
            let mut inner = shared.inner.lock().await;
            if let Some(link) = inner.link.as_mut() {
                link.send_u_frame(UFunction::StartDtAct, Some(UFunction::StartDtCon))
                    .await?;
            }
            shared.kick.notify_one();
        }
        Ok(())
    }

    async fn abort_connect(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.shared
            .set_state(&mut inner, ConnectionState::Disconnected);
    }

    /// Close the link and block until the receive task has wound down.
    ///
    /// Safe to call in any state. Pending senders fail with
    /// [`Iec104Error::NotConnected`].
    pub async fn close(&self) -> Result<()> {
        let mut rx = self.shared.state_tx.subscribe();
        if *rx.borrow() == ConnectionState::Disconnected {
            return Ok(());
        }
        // wait out a connect attempt in progress
        let _ = rx
            .wait_for(|s| *s != ConnectionState::Connecting)
            .await
            .map_err(|_| Iec104Error::NotConnected)?;

        {
            let mut inner = self.shared.inner.lock().await;
            if inner.state == ConnectionState::Disconnected {
                return Ok(());
            }
            // the receive task watches for this transition and winds down
            self.shared.set_state(&mut inner, ConnectionState::Closing);
        }

        let _ = rx
            .wait_for(|s| *s == ConnectionState::Disconnected)
            .await
            .map_err(|_| Iec104Error::NotConnected)?;
        Ok(())
    }

    /// Send STARTDT act and wait for the peer's confirmation.
    pub async fn send_start_dt(&self) -> Result<()> {
        match self.state() {
            ConnectionState::Connected => {}
            ConnectionState::Active => return Err(Iec104Error::AlreadyConnected),
            _ => return Err(Iec104Error::NotConnected),
        }

        {
            let mut inner = self.shared.inner.lock().await;
            let link = inner.link.as_mut().ok_or(Iec104Error::NotConnected)?;
            link.send_u_frame(UFunction::StartDtAct, Some(UFunction::StartDtCon))
                .await?;
        }
        self.shared.kick.notify_one();
        self.wait_state(ConnectionState::Active).await
    }

    /// Send STOPDT act and wait for the peer's confirmation.
    pub async fn send_stop_dt(&self) -> Result<()> {
        if self.state() != ConnectionState::Active {
            return Err(Iec104Error::NotConnected);
        }

        {
            let mut inner = self.shared.inner.lock().await;
            let link = inner.link.as_mut().ok_or(Iec104Error::NotConnected)?;
            link.send_u_frame(UFunction::StopDtAct, Some(UFunction::StopDtCon))
                .await?;
        }
        self.shared.kick.notify_one();
        self.wait_state(ConnectionState::Connected).await
    }

    async fn wait_state(&self, wanted: ConnectionState) -> Result<()> {
        let mut rx = self.shared.state_tx.subscribe();
        let reached = timeout(
            self.shared.params.t1,
            rx.wait_for(|s| *s == wanted || *s == ConnectionState::Disconnected),
        )
        .await;
        match reached {
            Ok(Ok(state)) if *state == wanted => Ok(()),
            Ok(_) => Err(Iec104Error::NotConnected),
            Err(_) => Err(Iec104Error::T1Timeout),
        }
    }

    /// Send an ASDU as an I-frame. Legal only while the link is active.
    ///
    /// When k I-frames are already awaiting acknowledgement the call blocks
    /// until the peer drains the window; if nothing is acknowledged within
    /// t1 the call fails with [`Iec104Error::T1Timeout`].
    pub async fn send_asdu(&self, asdu: &Asdu) -> Result<()> {
        let body = asdu.to_bytes(&self.shared.params)?;
        let deadline = Instant::now() + self.shared.params.t1;

        loop {
            {
                let mut inner = self.shared.inner.lock().await;
                if inner.state != ConnectionState::Active {
                    return Err(Iec104Error::NotConnected);
                }
                let link = inner.link.as_mut().ok_or(Iec104Error::NotConnected)?;
                if (link.pending_acks.len() as u16) < self.shared.params.k {
                    if self.shared.params.trace {
                        debug!(asdu = %asdu, ns = link.send_seq, "sending I-frame");
                    }
                    link.send_i_frame(body).await?;
                    self.shared.kick.notify_one();
                    return Ok(());
                }
            }

            // window full: wait for an acknowledgement to free a slot
            let now = Instant::now();
            if now >= deadline {
                return Err(Iec104Error::T1Timeout);
            }
            let wait = (deadline - now).min(Duration::from_millis(100));
            tokio::select! {
                _ = self.shared.acked.notified() => {}
                _ = sleep(wait) => {}
            }
        }
    }
}

/// Waits until `state_rx` observes `Closing` or `Disconnected`, without
/// holding the `watch::Ref` guard across an `.await` point (that guard is
/// not `Send`, which would otherwise make the enclosing `tokio::select!` in
/// [`run_link`] non-`Send` and unusable with `tokio::spawn`).
async fn wait_for_closing_or_disconnected(state_rx: &mut watch::Receiver<ConnectionState>) {
    loop {
        let done = matches!(
            *state_rx.borrow(),
            ConnectionState::Closing | ConnectionState::Disconnected
        );
        if done {
            return;
        }
        if state_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Receive task: drives the inbound stream and the t1/t2/t3 timers.
async fn run_link(shared: Arc<Shared>, mut stream: FrameStream, generation: u64) {
    let mut state_rx = shared.state_tx.subscribe();

    let fatal = loop {
        let Some(deadline) = next_deadline(&shared, generation).await else {
            // superseded by a newer connect cycle or already torn down
            break None;
        };

        tokio::select! {
            biased;
            _ = wait_for_closing_or_disconnected(&mut state_rx) => break None,
            _ = shared.kick.notified() => {}
            frame = stream.next() => match frame {
                Some(Ok(apdu)) => match handle_frame(&shared, generation, apdu).await {
                    Ok(()) => {}
                    Err(e) => break Some(e),
                },
                Some(Err(e)) => break Some(e),
                None => break Some(Iec104Error::connection_static("Connection closed by peer")),
            },
            () = sleep_until(deadline) => {
                if let Err(e) = handle_timers(&shared, generation).await {
                    break Some(e);
                }
            }
        }
    };

    teardown(&shared, generation, fatal).await;
}

/// The next instant at which a timer may fire.
async fn next_deadline(shared: &Shared, generation: u64) -> Option<Instant> {
    let inner = shared.inner.lock().await;
    if inner.generation != generation {
        return None;
    }
    let link = inner.link.as_ref()?;
    let p = &shared.params;

    let mut deadline = link.last_activity + p.t3;
    if let Some(&(_, at)) = link.pending_acks.front() {
        deadline = deadline.min(at + p.t1);
    }
    if let Some((_, at)) = link.pending_u {
        deadline = deadline.min(at + p.t1);
    }
    if let Some(at) = link.pending_test {
        deadline = deadline.min(at + p.t1);
    }
    if link.unconfirmed_recvs > 0 {
        deadline = deadline.min(link.last_ack + p.t2);
    }
    Some(deadline)
}

async fn handle_timers(shared: &Shared, generation: u64) -> Result<()> {
    let mut inner = shared.inner.lock().await;
    if inner.generation != generation {
        return Ok(());
    }
    let Some(link) = inner.link.as_mut() else {
        return Ok(());
    };
    let p = &shared.params;
    let now = Instant::now();

    // t1: an unacknowledged I-frame or unanswered U-frame is fatal
    let t1_expired = link
        .pending_acks
        .front()
        .is_some_and(|&(_, at)| now >= at + p.t1)
        || link.pending_u.is_some_and(|(_, at)| now >= at + p.t1)
        || link.pending_test.is_some_and(|at| now >= at + p.t1);
    if t1_expired {
        return Err(Iec104Error::T1Timeout);
    }

    // t2: acknowledge received I-frames before the peer times out
    if link.unconfirmed_recvs > 0 && now >= link.last_ack + p.t2 {
        if shared.params.trace {
            debug!(nr = link.recv_seq, "t2 acknowledgement");
        }
        link.send_s_frame().await?;
    }

    // t3: idle watchdog; never more than one test frame outstanding
    if link.pending_test.is_none() && now >= link.last_activity + p.t3 {
        debug!("link idle, sending TESTFR act");
        link.sink.send(Apdu::u_frame(UFunction::TestFrAct)).await?;
        let now = Instant::now();
        link.pending_test = Some(now);
        link.last_activity = now;
    }

    Ok(())
}

async fn handle_frame(shared: &Shared, generation: u64, apdu: Apdu) -> Result<()> {
    let mut inner = shared.inner.lock().await;
    if inner.generation != generation || inner.link.is_none() {
        return Ok(());
    }
    if shared.params.trace {
        debug!(frame = %apdu, "received");
    }

    match apdu.apci {
        Apci::Information { ns, nr } => {
            let Some(link) = inner.link.as_mut() else {
                return Ok(());
            };
            if link.ack_up_to(nr, shared.params.k) {
                shared.acked.notify_waiters();
            }

            if ns != link.recv_seq {
                return Err(Iec104Error::SequenceMismatch {
                    expected: link.recv_seq,
                    actual: ns,
                });
            }
            link.recv_seq = (link.recv_seq + 1) % SEQ_MODULO;
            link.unconfirmed_recvs += 1;
            link.last_activity = Instant::now();

            let event = match Asdu::parse(&apdu.body, &shared.params) {
                Ok(asdu) => {
                    confirm_test_telegram(shared, link, &asdu).await?;
                    Iec104Event::AsduReceived(asdu)
                }
                Err(e) => Iec104Event::Error(format!("ASDU parse error: {}", e)),
            };

            // S-frame cadence: W received frames or the t2 deadline
            if link.unconfirmed_recvs >= shared.params.effective_w()
                || (link.unconfirmed_recvs > 0
                    && Instant::now() >= link.last_ack + shared.params.t2)
            {
                link.send_s_frame().await?;
            }

            drop(inner);
            shared.emit(event).await;
        }

        Apci::Supervisory { nr } => {
            let Some(link) = inner.link.as_mut() else {
                return Ok(());
            };
            link.last_activity = Instant::now();
            if link.ack_up_to(nr, shared.params.k) {
                shared.acked.notify_waiters();
            }
        }

        Apci::Unnumbered(function) => {
            handle_u_frame(shared, &mut inner, function).await?;
        }
    }

    Ok(())
}

/// U-frame response policy.
async fn handle_u_frame(shared: &Shared, inner: &mut Inner, function: UFunction) -> Result<()> {
    let Some(link) = inner.link.as_mut() else {
        return Ok(());
    };
    link.last_activity = Instant::now();

    match function {
        UFunction::StartDtAct => {
            link.send_u_frame(UFunction::StartDtCon, None).await?;
        }
        UFunction::StartDtCon => {
            if matches!(link.pending_u, Some((UFunction::StartDtCon, _))) {
                link.pending_u = None;
            }
            shared.set_state(inner, ConnectionState::Active);
            debug!("data transfer started");
            shared.emit(Iec104Event::DataTransferStarted).await;
        }
        UFunction::StopDtAct => {
            // the peer stops the transfer: nothing in flight will be
            // acknowledged any more
            if link.unconfirmed_recvs > 0 {
                link.send_s_frame().await?;
            }
            link.pending_acks.clear();
            shared.acked.notify_waiters();
            link.send_u_frame(UFunction::StopDtCon, None).await?;
            shared.set_state(inner, ConnectionState::Connected);
            shared.emit(Iec104Event::DataTransferStopped).await;
        }
        UFunction::StopDtCon => {
            if matches!(link.pending_u, Some((UFunction::StopDtCon, _))) {
                link.pending_u = None;
            }
            shared.set_state(inner, ConnectionState::Connected);
            debug!("data transfer stopped");
            shared.emit(Iec104Event::DataTransferStopped).await;
        }
        UFunction::TestFrAct => {
            link.send_u_frame(UFunction::TestFrCon, None).await?;
        }
        UFunction::TestFrCon => {
            link.pending_test = None;
        }
    }
    Ok(())
}

/// The peer's test telegram (C_TS_TA_1 activation) is confirmed by the
/// engine itself, in addition to normal delivery.
async fn confirm_test_telegram(shared: &Shared, link: &mut LinkState, asdu: &Asdu) -> Result<()> {
    if asdu.header.type_id != TypeId::TestCommandTime56.as_u8()
        || asdu.header.cot != Cot::Activation
        || asdu.header.negative
    {
        return Ok(());
    }
    if (link.pending_acks.len() as u16) >= shared.params.k {
        debug!("window full, test telegram confirmation dropped");
        return Ok(());
    }

    let mut con = asdu.clone();
    con.header.cot = Cot::ActivationCon;
    let body = con.to_bytes(&shared.params)?;
    link.send_i_frame(body).await
}

async fn teardown(shared: &Arc<Shared>, generation: u64, fatal: Option<Iec104Error>) {
    {
        let mut inner = shared.inner.lock().await;
        if inner.generation != generation {
            return;
        }
        inner.link = None;
        shared.set_state(&mut inner, ConnectionState::Closing);
        shared.set_state(&mut inner, ConnectionState::Disconnected);
    }
    // wake senders blocked on the window; they observe the state change
    shared.acked.notify_waiters();

    if let Some(e) = fatal {
        warn!(error = %e, "link closed");
        shared.emit(Iec104Event::Error(e.to_string())).await;
    } else {
        debug!("link closed");
    }
    shared.emit(Iec104Event::Closed).await;
}
