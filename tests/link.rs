//! End-to-end link scenarios against an in-process mock outstation.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use voltage_iec60870::{
    ClientConfig, Cot, Cp56Time2a, Iec104Client, Iec104Event, TypeId,
};

const STARTDT_ACT: [u8; 6] = [0x68, 0x04, 0x07, 0x00, 0x00, 0x00];
const STARTDT_CON: [u8; 6] = [0x68, 0x04, 0x0B, 0x00, 0x00, 0x00];
const TESTFR_ACT: [u8; 6] = [0x68, 0x04, 0x43, 0x00, 0x00, 0x00];
const TESTFR_CON: [u8; 6] = [0x68, 0x04, 0x83, 0x00, 0x00, 0x00];

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

fn config(addr: &str) -> ClientConfig {
    ClientConfig::new(addr)
        .connect_timeout(Duration::from_secs(2))
        .t1_timeout(Duration::from_secs(2))
        .t2_timeout(Duration::from_secs(5))
        .t3_timeout(Duration::from_secs(10))
}

/// Read one APDU off the socket.
async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await.unwrap();
    assert_eq!(header[0], 0x68, "bad start octet from client");
    let mut rest = vec![0u8; header[1] as usize];
    stream.read_exact(&mut rest).await.unwrap();
    let mut frame = header.to_vec();
    frame.extend_from_slice(&rest);
    frame
}

/// Accept a connection and complete the STARTDT handshake.
async fn accept_started(listener: &TcpListener) -> TcpStream {
    let (mut stream, _) = listener.accept().await.unwrap();
    let act = read_frame(&mut stream).await;
    assert_eq!(act, STARTDT_ACT);
    stream.write_all(&STARTDT_CON).await.unwrap();
    stream
}

/// Assemble an I-frame around an ASDU body.
fn i_frame(ns: u16, nr: u16, body: &[u8]) -> Vec<u8> {
    let mut frame = vec![
        0x68,
        (4 + body.len()) as u8,
        ((ns & 0x7F) << 1) as u8,
        (ns >> 7) as u8,
        ((nr & 0x7F) << 1) as u8,
        (nr >> 7) as u8,
    ];
    frame.extend_from_slice(body);
    frame
}

async fn next_event(events: &mut mpsc::Receiver<Iec104Event>) -> Iec104Event {
    timeout(Duration::from_secs(3), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn wait_started(events: &mut mpsc::Receiver<Iec104Event>) {
    loop {
        match next_event(events).await {
            Iec104Event::DataTransferStarted => return,
            Iec104Event::Opened => continue,
            other => panic!("unexpected event before start: {:?}", other),
        }
    }
}

#[tokio::test]
async fn s1_startdt_handshake() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move { accept_started(&listener).await });

    client.connect().await.unwrap();

    assert!(matches!(next_event(&mut events).await, Iec104Event::Opened));
    assert!(matches!(
        next_event(&mut events).await,
        Iec104Event::DataTransferStarted
    ));
    assert!(client.state().is_active());

    let _stream = server.await.unwrap();
}

#[tokio::test]
async fn s2_interrogation_wire_bytes() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;
        read_frame(&mut stream).await
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    client.interrogation(Cot::Activation, 1, 20).await.unwrap();

    let frame = server.await.unwrap();
    assert_eq!(
        frame,
        vec![
            0x68, 0x0E, 0x00, 0x00, 0x00, 0x00, // APCI, NS=0 NR=0
            0x64, 0x01, 0x06, 0x00, 0x01, 0x00, // C_IC_NA_1, activation, CA=1
            0x00, 0x00, 0x00, // IOA=0
            0x14, // QOI=20
        ]
    );
}

#[tokio::test]
async fn s3_s_frame_cadence_at_w() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr).w(8));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;

        // eight single-point indications, NS 0..7
        let body = [
            0x01, 0x01, 0x03, 0x00, 0x01, 0x00, // M_SP_NA_1, spontaneous, CA=1
            0xE9, 0x03, 0x00, // IOA=1001
            0x01, // ON
        ];
        for ns in 0..8u16 {
            stream.write_all(&i_frame(ns, 0, &body)).await.unwrap();
        }

        // the eighth receipt must trigger the supervisory acknowledgement
        read_frame(&mut stream).await
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    for _ in 0..8 {
        match next_event(&mut events).await {
            Iec104Event::AsduReceived(asdu) => {
                assert_eq!(asdu.type_id().unwrap(), TypeId::SinglePoint);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    let s = server.await.unwrap();
    // NR=8 encodes as (8%128)*2 = 0x10
    assert_eq!(s, vec![0x68, 0x04, 0x01, 0x00, 0x10, 0x00]);
}

#[tokio::test]
async fn s4_testfr_keeps_link_active() {
    let (listener, addr) = bind().await;
    // short t3 so the idle watchdog fires inside the test
    let mut client = Iec104Client::new(config(&addr).t3_timeout(Duration::from_millis(300)));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;

        // idle link: the watchdog must send exactly a TESTFR act
        let frame = read_frame(&mut stream).await;
        assert_eq!(frame, TESTFR_ACT);
        stream.write_all(&TESTFR_CON).await.unwrap();

        // after another idle period the watchdog re-arms
        let frame = read_frame(&mut stream).await;
        assert_eq!(frame, TESTFR_ACT);
        stream.write_all(&TESTFR_CON).await.unwrap();
        stream
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    let _stream = server.await.unwrap();
    assert!(client.state().is_active());
}

#[tokio::test]
async fn s5_unknown_type_id_is_not_fatal() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr).t2_timeout(Duration::from_millis(300)));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;

        // type id 200 is not in the catalogue
        let unknown = [200, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        stream.write_all(&i_frame(0, 0, &unknown)).await.unwrap();

        // a valid telegram right behind it
        let valid = [
            0x01, 0x01, 0x03, 0x00, 0x01, 0x00, 0xE9, 0x03, 0x00, 0x01,
        ];
        stream.write_all(&i_frame(1, 0, &valid)).await.unwrap();

        // both receipts were counted: the acknowledgement settles at NR=2
        let frame = loop {
            let frame = read_frame(&mut stream).await;
            if frame == [0x68, 0x04, 0x01, 0x00, 0x04, 0x00] {
                break frame;
            }
        };
        (frame, stream)
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    // the unknown telegram is delivered; enumeration fails at element access
    match next_event(&mut events).await {
        Iec104Event::AsduReceived(asdu) => {
            assert_eq!(asdu.header.type_id, 200);
            let err = asdu.element(0).unwrap_err();
            assert_eq!(err.to_string(), "Unknown ASDU type id:200");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // the link stayed up and keeps delivering
    match next_event(&mut events).await {
        Iec104Event::AsduReceived(asdu) => {
            assert_eq!(asdu.type_id().unwrap(), TypeId::SinglePoint);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let (s, _stream) = server.await.unwrap();
    assert_eq!(s, vec![0x68, 0x04, 0x01, 0x00, 0x04, 0x00]);
    assert!(client.state().is_active());
}

#[tokio::test]
async fn s6_clock_sync_wire_bytes() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;
        read_frame(&mut stream).await
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    let time = Cp56Time2a {
        milliseconds: 500,
        minutes: 30,
        hours: 10,
        day: 4,
        day_of_week: 3,
        month: 6,
        year: 24,
        invalid: false,
        summer_time: false,
    };
    client.clock_sync(1, time).await.unwrap();

    let frame = server.await.unwrap();
    assert_eq!(
        frame,
        vec![
            0x68, 0x14, 0x00, 0x00, 0x00, 0x00, // APCI
            0x67, 0x01, 0x06, 0x00, 0x01, 0x00, // C_CS_NA_1, activation, CA=1
            0x00, 0x00, 0x00, // IOA=0
            0xF4, 0x01, 0x1E, 0x0A, 0x64, 0x06, 0x18, // CP56Time2a
        ]
    );
}

#[tokio::test]
async fn k_window_backpressure() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr).k(2));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;
        // two frames fill the window
        read_frame(&mut stream).await;
        read_frame(&mut stream).await;
        // hold the acknowledgement back for a while
        tokio::time::sleep(Duration::from_millis(400)).await;
        // S-frame with NR=2 releases both
        stream
            .write_all(&[0x68, 0x04, 0x01, 0x00, 0x04, 0x00])
            .await
            .unwrap();
        read_frame(&mut stream).await
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    client.general_interrogation(1).await.unwrap();
    client.general_interrogation(1).await.unwrap();

    // the third send blocks until the peer acknowledges
    let started = std::time::Instant::now();
    client.general_interrogation(1).await.unwrap();
    assert!(
        started.elapsed() >= Duration::from_millis(300),
        "third send should have waited for the window"
    );

    let third = server.await.unwrap();
    // NS=2 after two acknowledged frames
    assert_eq!(third[2], 0x04);
}

#[tokio::test]
async fn no_startdt_without_autostart() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr).autostart(false));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // nothing may arrive until the user explicitly starts data transfer
        let mut byte = [0u8; 1];
        assert!(
            timeout(Duration::from_millis(300), stream.read_exact(&mut byte))
                .await
                .is_err(),
            "client sent data before start_dt"
        );

        let act = read_frame(&mut stream).await;
        assert_eq!(act, STARTDT_ACT);
        stream.write_all(&STARTDT_CON).await.unwrap();
        stream
    });

    client.connect().await.unwrap();
    assert!(matches!(next_event(&mut events).await, Iec104Event::Opened));
    assert!(!client.state().is_active());

    // stay quiet past the server's silence check
    tokio::time::sleep(Duration::from_millis(400)).await;
    client.start_dt().await.unwrap();
    assert!(client.state().is_active());

    let _stream = server.await.unwrap();
}

#[tokio::test]
async fn test_telegram_is_auto_confirmed() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;

        // C_TS_TA_1 activation with counter 0x1234
        let mut body = vec![
            107, 0x01, 0x06, 0x00, 0x01, 0x00, // header, activation, CA=1
            0x00, 0x00, 0x00, // IOA=0
            0x34, 0x12, // TSC
        ];
        body.extend_from_slice(&[0xF4, 0x01, 0x1E, 0x0A, 0x64, 0x06, 0x18]);
        stream.write_all(&i_frame(0, 0, &body)).await.unwrap();

        read_frame(&mut stream).await
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    // the telegram is still delivered to the user
    match next_event(&mut events).await {
        Iec104Event::AsduReceived(asdu) => {
            assert_eq!(asdu.type_id().unwrap(), TypeId::TestCommandTime56);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let reply = server.await.unwrap();
    // I-frame NS=0 NR=1 mirroring the telegram with COT activation-confirm
    assert_eq!(reply[2], 0x00);
    assert_eq!(reply[4], 0x02);
    assert_eq!(reply[6], 107);
    assert_eq!(reply[8], 0x07);
    // payload echoed verbatim
    assert_eq!(reply[15..17], [0x34, 0x12]);
}

#[tokio::test]
async fn sequence_mismatch_closes_link() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept_started(&listener).await;
        let body = [
            0x01, 0x01, 0x03, 0x00, 0x01, 0x00, 0xE9, 0x03, 0x00, 0x01,
        ];
        // NS=5 while the client expects 0
        stream.write_all(&i_frame(5, 0, &body)).await.unwrap();
        stream
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;

    match next_event(&mut events).await {
        Iec104Event::Error(msg) => assert!(msg.contains("Sequence number mismatch")),
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(next_event(&mut events).await, Iec104Event::Closed));

    let _stream = server.await.unwrap();
    assert!(!client.state().is_active());
}

#[tokio::test]
async fn peer_close_emits_closed() {
    let (listener, addr) = bind().await;
    let mut client = Iec104Client::new(config(&addr));
    let mut events = client.subscribe().unwrap();

    let server = tokio::spawn(async move {
        let stream = accept_started(&listener).await;
        drop(stream);
    });

    client.connect().await.unwrap();
    wait_started(&mut events).await;
    server.await.unwrap();

    loop {
        match next_event(&mut events).await {
            Iec104Event::Closed => break,
            Iec104Event::Error(_) => continue,
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert!(!client.state().is_active());

    // senders now fail synchronously
    assert!(client.general_interrogation(1).await.is_err());
}
