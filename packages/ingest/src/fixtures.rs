//! Stand-in upstream feed for tests.

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpListener;

/// Starts a listener on an ephemeral local port that answers exactly one
/// HTTP request with `status` and `body`, then returns the feed URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn serve_once(status: u16, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind feed listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read feed listener address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let response = format!(
            "HTTP/1.1 {status} Fixture\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );

        if let Err(e) = socket.write_all(response.as_bytes()).await {
            log::warn!("Feed fixture failed to respond: {e}");
        }
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/api/crimes")
}
