//! KaleidoClient against an in-process fake device on a local TCP socket

use std::collections::HashMap;
use std::time::Duration;

use kaleido_api::{Command, RoomId, Scope, StatusLevel};
use kaleido_session::{ClientConfig, DeviceStatus, KaleidoClient, SessionEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

/// Answers the control protocol for a device with one room, "A".
///
/// Every line the device receives is forwarded on `seen`.
async fn run_fake_device(listener: TcpListener, seen: mpsc::UnboundedSender<String>) {
    let (stream, _) = listener.accept().await.expect("accept");
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    let mut room: Option<String> = None;
    let mut current: HashMap<Option<String>, String> = HashMap::new();
    current.insert(None, "Main.kg2".to_string());
    current.insert(Some("A".to_string()), "Quad.kg2".to_string());

    while let Ok(Some(line)) = lines.next_line().await {
        let _ = seen.send(line.clone());

        let reply = match line.as_str() {
            "<openID>A</openID>" => {
                room = Some("A".to_string());
                "<ack/>".to_string()
            }
            "<closeID/>" => {
                room = None;
                "<ack/>".to_string()
            }
            "<getKRoomList/>" => "<kRoomList><room>A</room></kRoomList>".to_string(),
            "<getKCurrentLayout/>" => format!(
                "<kCurrentLayout>name=\"{}\"</kCurrentLayout>",
                current.get(&room).cloned().unwrap_or_default()
            ),
            "<getKLayoutList/>" => {
                // Deliver in two pieces to exercise reassembly
                write.write_all(b"<kLayoutList>A/Quad.kg2 A/Dual.kg2 ").await.unwrap();
                write.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
                "Main.kg2</kLayoutList>".to_string()
            }
            l if l.starts_with("<openID>") => "<ack/>".to_string(),
            l if l.contains(r#"key="softwareVersion""#) => {
                r#"<kParameterInfo>softwareVersion="8.40"</kParameterInfo>"#.to_string()
            }
            l if l.contains(r#"key="systemName""#) => {
                r#"<kParameterInfo>systemName="Fake"</kParameterInfo>"#.to_string()
            }
            l if l.starts_with("<setKCurrentLayout>set ") => {
                let layout = l
                    .trim_start_matches("<setKCurrentLayout>set ")
                    .trim_end_matches("</setKCurrentLayout>");
                current.insert(room.clone(), layout.to_string());
                "<ack/>".to_string()
            }
            l if l.starts_with("<setKStatusMessage>") => "<ack/>".to_string(),
            _ => "<nack/>".to_string(),
        };

        if write.write_all(reply.as_bytes()).await.is_err() {
            break;
        }
        let _ = write.write_all(b"\r\n").await;
    }
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

async fn wait_for_status(events: &mut broadcast::Receiver<SessionEvent>, wanted: DeviceStatus) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Status { status, .. }) if status == wanted => return,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("status not reported in time");
}

#[tokio::test]
async fn test_client_discovers_and_recalls_layouts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let device = tokio::spawn(run_fake_device(listener, seen_tx));

    let config = ClientConfig::new("127.0.0.1")
        .with_port(port)
        .with_reconnect_interval(None);
    let client = KaleidoClient::start(config).unwrap();
    let mut events = client.subscribe();

    wait_for_status(&mut events, DeviceStatus::Ok).await;
    tokio::time::timeout(Duration::from_secs(1), client.wait_for_status(DeviceStatus::Ok))
        .await
        .unwrap()
        .unwrap();

    let room_a = Scope::Room(RoomId::new("A"));
    let state = client.state().clone();
    wait_for(|| state.known_current_layout(&room_a).is_some()).await;

    let snapshot = state.snapshot();
    assert_eq!(snapshot.software_version.as_deref(), Some("8.40"));
    assert_eq!(snapshot.system_name.as_deref(), Some("Fake"));
    assert_eq!(snapshot.layouts.len(), 3);
    assert_eq!(snapshot.current_layouts.root.as_deref(), Some("Main.kg2"));
    assert_eq!(state.current_layout(&room_a), "Quad.kg2");

    client
        .enqueue(Command::set_layout("A/Dual.kg2").unwrap())
        .unwrap();
    client.enqueue(Command::alarm(StatusLevel::Error)).unwrap();
    tokio::time::timeout(Duration::from_secs(5), client.wait_until_idle())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.current_layout(&room_a), "Dual.kg2");
    assert_eq!(state.current_layout(&Scope::Root), "Main.kg2");

    client.shutdown().await.unwrap();
    device.await.unwrap();

    let mut seen = Vec::new();
    while let Ok(line) = seen_rx.try_recv() {
        seen.push(line);
    }
    assert_eq!(seen.first().map(String::as_str), Some("<openID>127.0.0.1_0_4_0_0</openID>"));
    assert_eq!(seen.last().map(String::as_str), Some("<closeID/>"));
    assert!(seen.contains(&"<setKCurrentLayout>set Dual.kg2</setKCurrentLayout>".to_string()));
}

#[tokio::test]
async fn test_connection_failure_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClientConfig::new("127.0.0.1")
        .with_port(port)
        .with_connect_timeout(Duration::from_secs(1))
        .with_reconnect_interval(None);
    let client = KaleidoClient::start(config).unwrap();

    tokio::time::timeout(
        Duration::from_secs(5),
        client.wait_for_status(DeviceStatus::ConnectionFailure),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(client.status(), DeviceStatus::ConnectionFailure);
    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    assert!(KaleidoClient::start(ClientConfig::default()).is_err());
}
