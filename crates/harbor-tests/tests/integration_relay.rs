// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Relay Integration Tests
//!
//! The reference engine under a real supervisor.

use std::sync::Arc;

use harbor_core::{Supervisor, StartRequest};
use harbor_relay::RelayEngineFactory;
use harbor_tests::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn echo_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = stream.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_reload_keeps_serving() {
    init_test_logging();
    let ws = Workspace::new();
    let target = echo_server().await;
    let port = free_port().await;
    let config = ws.write("config.json", ConfigFixtures::relay_forward(port, target));
    let supervisor = Supervisor::new(Arc::new(RelayEngineFactory::new()));

    supervisor.start(StartRequest::new(&config)).await.unwrap();
    for round in 0..2u8 {
        let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        client.write_all(&[round; 16]).await.unwrap();
        let mut reply = [0u8; 16];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [round; 16]);
        drop(client);

        // The old listener is closed before the new one binds the same port.
        supervisor.reload().await.unwrap();
    }

    supervisor.stop().await.unwrap();
    assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
}
