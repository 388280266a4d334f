//! Stand-in for the TheSkyX TCP script server.
//!
//! Accepts one framed script per connection, records it, answers with
//! `<reply>|No error. Error = 0.` and closes the socket.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const HEADER: &str = "/* Java Script */\n/* Socket Start Packet */\n";
pub const FOOTER: &str = "\n/* Socket End Packet */\n";

type Responder = dyn Fn(&str) -> String + Send + Sync;

pub struct StubHost {
    addr: SocketAddr,
    payloads: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubHost {
    /// Start a stub on an ephemeral port; `reply` maps each unframed script
    /// to the text placed before the `|` trailer.
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let reply: Arc<Responder> = Arc::new(reply);

        let recorded = payloads.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !String::from_utf8_lossy(&request).ends_with(FOOTER) {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let payload = String::from_utf8_lossy(&request).into_owned();
                let answer = reply(unframe(&payload));
                recorded.lock().unwrap().push(payload);

                let response = format!("{answer}|No error. Error = 0.");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            addr,
            payloads,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Raw framed payloads, in arrival order.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    /// Scripts with the packet header and footer removed.
    pub fn scripts(&self) -> Vec<String> {
        self.payloads()
            .iter()
            .map(|payload| unframe(payload).to_string())
            .collect()
    }
}

impl Drop for StubHost {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn unframe(payload: &str) -> &str {
    payload
        .strip_prefix(HEADER)
        .and_then(|rest| rest.strip_suffix(FOOTER))
        .unwrap_or(payload)
}

/// Replies like a host with a connected mount: `1` for connection-state
/// scripts, `undefined` for everything else.
pub fn mount_host(script: &str) -> String {
    if script.contains("IsConnected") {
        "1".to_string()
    } else {
        "undefined".to_string()
    }
}
