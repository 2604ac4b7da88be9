//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Redirection and session lifetime tests for telshell-service

use telshell_service::{ConnectionId, Destination, ShellConfig, ShellSession};
use tokio::io::{AsyncReadExt, DuplexStream, duplex};

fn create_session() -> (ShellSession, DuplexStream) {
    let (client, server) = duplex(8192);
    let session =
        ShellSession::new(ConnectionId::new(1), server, &ShellConfig::default()).unwrap();
    (session, client)
}

async fn read_exactly(client: &mut DuplexStream, len: usize) -> Vec<u8> {
    let mut received = vec![0u8; len];
    client.read_exact(&mut received).await.unwrap();
    received
}

#[tokio::test]
async fn test_saved_redirect_writes_file_then_restores_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listing.txt");
    let (mut session, mut client) = create_session();

    let snapshot = session
        .redirect_saving(Destination::create(&path).await.unwrap())
        .await
        .unwrap();
    assert!(session.is_redirected());
    session.write_str("file contents\n").await.unwrap();
    session.undirect(snapshot).await.unwrap();
    assert!(!session.is_redirected());

    session.write_str("back on the wire\n").await.unwrap();
    session.flush().await.unwrap();

    assert_eq!(read_exactly(&mut client, 18).await, b"back on the wire\r\n");
    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "file contents\n"
    );
}

#[tokio::test]
async fn test_nested_redirects_restore_outer_stream() {
    let dir = tempfile::tempdir().unwrap();
    let outer_path = dir.path().join("outer.txt");
    let inner_path = dir.path().join("inner.txt");
    let (mut session, _client) = create_session();

    let outer = session
        .redirect_saving(Destination::create(&outer_path).await.unwrap())
        .await
        .unwrap();
    session.write_str("one\n").await.unwrap();

    let inner = session
        .redirect_saving(Destination::create(&inner_path).await.unwrap())
        .await
        .unwrap();
    assert!(inner.is_redirected());
    session.write_str("two\n").await.unwrap();
    session.undirect(inner).await.unwrap();

    session.write_str("three\n").await.unwrap();
    session.undirect(outer).await.unwrap();
    assert!(!session.is_redirected());
    assert_eq!(session.output().depth(), 0);

    assert_eq!(
        tokio::fs::read_to_string(&outer_path).await.unwrap(),
        "one\nthree\n"
    );
    assert_eq!(tokio::fs::read_to_string(&inner_path).await.unwrap(), "two\n");
}

#[tokio::test]
async fn test_append_destination_keeps_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    tokio::fs::write(&path, "old\n").await.unwrap();
    let (mut session, _client) = create_session();

    let snapshot = session
        .redirect_saving(Destination::append(&path).await.unwrap())
        .await
        .unwrap();
    session.write_str("new\n").await.unwrap();
    session.undirect(snapshot).await.unwrap();

    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "old\nnew\n");
}

#[tokio::test]
async fn test_clone_shares_redirect_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.txt");
    let (mut session, _client) = create_session();

    let destination = Destination::create(&path).await.unwrap();
    let snapshot = session.redirect_saving(destination.clone()).await.unwrap();

    let mut clone = session.clone_session();
    assert_eq!(clone.id(), session.id());
    assert_eq!(clone.output().destination(), Some(&destination));
    assert_eq!(clone.output().ref_count(), 1);

    clone.write_str("from clone\n").await.unwrap();
    assert!(clone.release().await.unwrap().is_none());

    session.write_str("from parent\n").await.unwrap();
    session.undirect(snapshot).await.unwrap();

    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "from clone\nfrom parent\n"
    );
}

#[tokio::test]
async fn test_clone_of_network_session_targets_console() {
    let (session, _client) = create_session();
    let clone = session.clone_session();
    assert!(clone.is_redirected());
    assert_eq!(clone.output().destination(), Some(&Destination::Console));
}

#[tokio::test]
async fn test_shared_session_released_once_per_reference() {
    let (session, _client) = create_session();
    let mut clone = session.clone_session();
    clone.add_ref();
    clone.add_ref();
    assert_eq!(clone.output().ref_count(), 3);

    let clone = clone.release().await.unwrap().expect("two references left");
    let clone = clone.release().await.unwrap().expect("one reference left");
    assert_eq!(clone.output().ref_count(), 1);
    assert!(clone.release().await.unwrap().is_none());
}

#[tokio::test]
#[should_panic]
async fn test_releasing_unredirected_session_panics() {
    let (session, _client) = create_session();
    let _ = session.release().await;
}

#[tokio::test]
async fn test_long_output_is_truncated_and_flushed() {
    let (mut client, server) = duplex(8192);
    let config = ShellConfig::default()
        .with_io_buffer_size(32)
        .with_line_len(8);
    let mut session = ShellSession::new(ConnectionId::new(2), server, &config).unwrap();

    let accepted = session.write_str(&"x".repeat(64)).await.unwrap();
    assert_eq!(accepted, 31);
    assert_eq!(read_exactly(&mut client, 31).await, vec![b'x'; 31]);
}

#[tokio::test]
async fn test_full_line_after_partial_fill_keeps_crlf() {
    let (mut client, server) = duplex(8192);
    let mut session =
        ShellSession::new(ConnectionId::new(3), server, &ShellConfig::default()).unwrap();

    for _ in 0..5 {
        session.write_str(&"a".repeat(80)).await.unwrap();
    }
    session.write_str(&"b".repeat(32)).await.unwrap();
    let line = format!("{}\n", "c".repeat(79));
    assert_eq!(session.write_str(&line).await.unwrap(), 80);
    session.flush().await.unwrap();

    let received = read_exactly(&mut client, 432 + 81).await;
    assert!(received.ends_with(b"c\r\n"));
}
