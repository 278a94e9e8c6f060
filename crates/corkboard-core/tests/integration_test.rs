// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::Duration;

use corkboard_core::{BoardConfig, BoardServices, ServicesError, ServicesHandle};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

// Each test gets its own port pair so the tests can run in parallel.
const BASE_HTTP_PORT: u16 = 13100;
const BASE_UDP_PORT: u16 = 15100;

struct TestBoard {
    handle: ServicesHandle,
    http_port: u16,
    udp_port: u16,
    journal_path: PathBuf,
    _dir: TempDir,
}

async fn start_board(port_offset: u16, use_udp: bool) -> TestBoard {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let http_port = BASE_HTTP_PORT + port_offset;
    let udp_port = BASE_UDP_PORT + port_offset;
    let journal_path = dir.path().join("storage").join("data.json");

    let config = BoardConfig {
        http_port,
        udp_host: "127.0.0.1".to_string(),
        udp_port,
        use_udp,
        journal_path: journal_path.clone(),
        asset_dir: dir.path().to_path_buf(),
        log_level: "error".to_string(),
    };

    let handle = BoardServices::new(config)
        .start()
        .await
        .expect("failed to start board services");
    assert!(handle.is_running().await);

    TestBoard {
        handle,
        http_port,
        udp_port,
        journal_path,
        _dir: dir,
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

fn read_journal(path: &Path) -> Vec<Value> {
    if !path.exists() {
        return Vec::new();
    }
    let contents = std::fs::read_to_string(path).expect("failed to read journal");
    serde_json::Deserializer::from_str(&contents)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .expect("journal contains a malformed entry")
}

async fn wait_for_records(path: &Path, count: usize) -> Vec<Value> {
    let poll = async {
        loop {
            let records = read_journal(path);
            if records.len() >= count {
                return records;
            }
            sleep(Duration::from_millis(50)).await;
        }
    };
    timeout(Duration::from_secs(5), poll)
        .await
        .expect("timed out waiting for journal records")
}

fn record_fields(entry: &Value) -> (&String, &Value) {
    entry
        .as_object()
        .expect("journal entry is not an object")
        .iter()
        .next()
        .expect("journal entry is empty")
}

#[tokio::test]
async fn test_form_submission_redirects_and_appends_record() {
    let board = start_board(0, true).await;

    let response = http_client()
        .post(format!("http://127.0.0.1:{}/submit", board.http_port))
        .form(&[("username", "alice"), ("message", "hello")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), reqwest::StatusCode::FOUND);
    assert_eq!(
        response.headers()[reqwest::header::LOCATION]
            .to_str()
            .expect("bad location header"),
        "/message?success"
    );

    let records = read_journal(&board.journal_path);
    assert_eq!(records.len(), 1);
    let (timestamp, fields) = record_fields(&records[0]);
    assert!(!timestamp.is_empty());
    assert_eq!(fields["username"], "alice");
    assert_eq!(fields["message"], "hello");

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_form_submission_missing_field_is_rejected() {
    let board = start_board(1, true).await;

    let response = http_client()
        .post(format!("http://127.0.0.1:{}/submit", board.http_port))
        .form(&[("username", "alice")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(read_journal(&board.journal_path).is_empty());

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_post_to_unknown_path_is_not_found() {
    let board = start_board(2, true).await;

    let response = http_client()
        .post(format!("http://127.0.0.1:{}/nonexistent", board.http_port))
        .form(&[("username", "alice"), ("message", "hello")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(read_journal(&board.journal_path).is_empty());

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_udp_datagram_is_journaled_without_response() {
    let board = start_board(3, true).await;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .expect("unable to bind UDP socket");
    socket
        .send_to(
            br#"{"username":"bob","message":"hi"}"#,
            format!("127.0.0.1:{}", board.udp_port),
        )
        .await
        .expect("unable to send datagram");

    let records = wait_for_records(&board.journal_path, 1).await;
    let (_, fields) = record_fields(&records[0]);
    assert_eq!(fields["username"], "bob");
    assert_eq!(fields["message"], "hi");

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_udp_datagram_missing_field_is_dropped() {
    let board = start_board(4, true).await;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .expect("unable to bind UDP socket");
    let target = format!("127.0.0.1:{}", board.udp_port);

    socket
        .send_to(br#"{"username":"bob"}"#, &target)
        .await
        .expect("unable to send datagram");
    // follow with a valid datagram to know the first was processed
    socket
        .send_to(br#"{"username":"carol","message":"ok"}"#, &target)
        .await
        .expect("unable to send datagram");

    let records = wait_for_records(&board.journal_path, 1).await;
    assert_eq!(records.len(), 1);
    let (_, fields) = record_fields(&records[0]);
    assert_eq!(fields["username"], "carol");

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_concurrent_http_and_udp_ingestion() {
    const HTTP_SUBMISSIONS: usize = 8;
    const UDP_SUBMISSIONS: usize = 8;

    let board = start_board(5, true).await;
    let udp_target = format!("127.0.0.1:{}", board.udp_port);

    let mut tasks = Vec::new();
    for i in 0..HTTP_SUBMISSIONS {
        let url = format!("http://127.0.0.1:{}/submit", board.http_port);
        tasks.push(tokio::spawn(async move {
            let response = http_client()
                .post(url)
                .form(&[
                    ("username", format!("http-user-{i}")),
                    ("message", "from http".to_string()),
                ])
                .send()
                .await
                .expect("request failed");
            assert_eq!(response.status(), reqwest::StatusCode::FOUND);
        }));
    }
    for i in 0..UDP_SUBMISSIONS {
        let target = udp_target.clone();
        tasks.push(tokio::spawn(async move {
            let socket = UdpSocket::bind("0.0.0.0:0")
                .await
                .expect("unable to bind UDP socket");
            let payload = format!(r#"{{"username":"udp-user-{i}","message":"from udp"}}"#);
            socket
                .send_to(payload.as_bytes(), target)
                .await
                .expect("unable to send datagram");
        }));
    }
    for task in tasks {
        task.await.expect("submission task failed");
    }

    // every record parses; none truncated or interleaved
    let records = wait_for_records(&board.journal_path, HTTP_SUBMISSIONS + UDP_SUBMISSIONS).await;
    assert_eq!(records.len(), HTTP_SUBMISSIONS + UDP_SUBMISSIONS);

    let usernames: Vec<&str> = records
        .iter()
        .map(|entry| record_fields(entry).1["username"].as_str().expect("no username"))
        .collect();
    for i in 0..HTTP_SUBMISSIONS {
        assert!(usernames.contains(&format!("http-user-{i}").as_str()));
    }
    for i in 0..UDP_SUBMISSIONS {
        assert!(usernames.contains(&format!("udp-user-{i}").as_str()));
    }

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_sequential_submissions_have_monotonic_timestamps() {
    let board = start_board(6, true).await;
    let client = http_client();

    for i in 0..3 {
        let message = format!("m{i}");
        client
            .post(format!("http://127.0.0.1:{}/submit", board.http_port))
            .form(&[("username", "alice"), ("message", message.as_str())])
            .send()
            .await
            .expect("request failed");
    }

    let records = read_journal(&board.journal_path);
    assert_eq!(records.len(), 3);
    let timestamps: Vec<&String> = records.iter().map(|e| record_fields(e).0).collect();
    // zero-padded local timestamps order lexicographically
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_get_routes_serve_assets() {
    let board = start_board(7, true).await;
    std::fs::write(board._dir.path().join("index.html"), "<h1>board</h1>").expect("write failed");
    std::fs::write(board._dir.path().join("error.html"), "<h1>oops</h1>").expect("write failed");

    let client = http_client();
    let base = format!("http://127.0.0.1:{}", board.http_port);

    let response = client.get(format!("{base}/")).send().await.expect("request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .expect("bad content type"),
        "text/html"
    );
    assert_eq!(response.text().await.expect("no body"), "<h1>board</h1>");

    // unknown GET paths serve the error page and keep the 200 status
    let response = client
        .get(format!("{base}/no-such-page"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("no body"), "<h1>oops</h1>");

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_http_only_deployment_still_serves() {
    let board = start_board(8, false).await;

    let response = http_client()
        .post(format!("http://127.0.0.1:{}/submit", board.http_port))
        .form(&[("username", "alice"), ("message", "no udp here")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), reqwest::StatusCode::FOUND);
    assert_eq!(read_journal(&board.journal_path).len(), 1);

    board.handle.stop().await.expect("stop failed");
}

#[tokio::test]
async fn test_stop_transitions_to_stopped() {
    let board = start_board(9, true).await;

    board.handle.stop().await.expect("stop failed");
    assert!(!board.handle.is_running().await);

    // once the services task reaches Stopped, stop() reports NotRunning
    let stopped = async {
        loop {
            match board.handle.stop().await {
                Err(ServicesError::NotRunning) => break,
                _ => sleep(Duration::from_millis(50)).await,
            }
        }
    };
    timeout(Duration::from_secs(5), stopped)
        .await
        .expect("services never reached the Stopped state");
}
