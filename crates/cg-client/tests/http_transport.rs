//! Runs the real HTTP transport against a local stub service.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cg_client::{request, ClientConfig, ExchangeClient};
use cg_types::{CgError, ExchangeError, Table};
use serde_json::{json, Value};

/// What the stub saw for one request.
struct Captured {
    request_line: String,
    content_type: Option<String>,
    body: Value,
}

/// Serve each scripted `(status, body)` to one connection, in order.
fn spawn_stub(script: Vec<(u16, String)>) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in script {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0usize;
            let mut content_type = None;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    match key.trim().to_ascii_lowercase().as_str() {
                        "content-length" => content_length = value.trim().parse().unwrap(),
                        "content-type" => content_type = Some(value.trim().to_string()),
                        _ => {}
                    }
                }
            }

            let mut raw = vec![0u8; content_length];
            reader.read_exact(&mut raw).unwrap();
            tx.send(Captured {
                request_line: request_line.trim_end().to_string(),
                content_type,
                body: serde_json::from_slice(&raw).unwrap(),
            })
            .unwrap();

            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    (url, rx)
}

fn ok_body() -> String {
    let mut design = Table::new(vec!["x:[0,1]".into(), "y:{0,1,2}".into()]);
    design.push_row(vec![json!(0.3), json!(2)]).unwrap();
    let mut analysis = Table::new(vec!["x:[0,1]".into(), "y:{0,1,2}".into(), "metric_est".into()]);
    analysis.push_row(vec![json!(0.9), json!(0), json!(19.5)]).unwrap();

    json!({
        "message": "Ok",
        "analysis": analysis.to_json_string().unwrap(),
        "design": design.to_json_string().unwrap(),
    })
    .to_string()
}

fn empty_measurements() -> Table {
    Table::new(vec![
        "x:[0,1]".into(),
        "y:{0,1,2}".into(),
        "metric:mean".into(),
        "metric:se".into(),
    ])
}

#[test]
fn posts_json_envelope_and_decodes_response() {
    let (url, seen) = spawn_stub(vec![(200, ok_body())]);

    let response = request(&empty_measurements(), 4, Some(&url), 3).unwrap();
    assert_eq!(response.message, "Ok");
    assert_eq!(response.design.len(), 1);
    assert_eq!(response.analysis.get(0, "metric_est"), Some(&json!(19.5)));

    let captured = seen.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.request_line, "POST /api HTTP/1.1");
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    assert_eq!(captured.body["number_of_arms"], json!(4));
    assert_eq!(
        captured.body["measurements"],
        json!(r#"{"x:[0,1]":{},"y:{0,1,2}":{},"metric:mean":{},"metric:se":{}}"#)
    );
}

#[test]
fn retries_non_200_over_http() {
    let (url, seen) = spawn_stub(vec![(500, String::new()), (502, String::new()), (200, ok_body())]);
    let config = ClientConfig::default()
        .with_endpoint(url)
        .with_retry_delay(Duration::from_millis(5));

    let response = ExchangeClient::new(config)
        .unwrap()
        .request(&empty_measurements(), 1)
        .unwrap();
    assert_eq!(response.design.len(), 1);
    assert_eq!(seen.try_iter().count(), 3);
}

#[test]
fn reports_last_status_when_exhausted() {
    let (url, _seen) = spawn_stub(vec![(500, String::new()), (503, String::new())]);
    let config = ClientConfig::default()
        .with_endpoint(url)
        .with_num_retries(2)
        .with_retry_delay(Duration::from_millis(5));

    let err = ExchangeClient::new(config)
        .unwrap()
        .request(&empty_measurements(), 1)
        .unwrap_err();
    assert!(matches!(
        err,
        CgError::Exchange(ExchangeError::RetriesExhausted {
            attempts: 2,
            last_status: 503
        })
    ));
}

#[test]
fn server_reported_error_over_http() {
    let body = json!({"message": "Bad input: too many arms"}).to_string();
    let (url, _seen) = spawn_stub(vec![(200, body)]);

    let err = request(&empty_measurements(), 500, Some(&url), 1).unwrap_err();
    assert_eq!(err.to_string(), "Bad input: too many arms");
}

#[test]
fn refused_connection_is_an_http_error() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{port}/api");

    let err = request(&empty_measurements(), 1, Some(&url), 3).unwrap_err();
    assert!(matches!(err, CgError::Exchange(ExchangeError::Http(_))));
}
