use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::integration::init_tracing;
use crate::utils::start_test_server;

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("Failed to connect");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_health_endpoint() {
    init_tracing();

    let addr = start_test_server().await.expect("Server failed to start");
    let response = http_get(addr, "/health").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(r#"{"status":"ok","message":"Random Video Chat Server"}"#));
}

#[tokio::test]
async fn test_stats_endpoint_starts_empty() {
    init_tracing();

    let addr = start_test_server().await.expect("Server failed to start");
    let response = http_get(addr, "/stats").await;

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(r#"{"waiting":0,"activePairs":0}"#));
}
