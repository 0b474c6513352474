//! Test helpers shared across modules

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::credentials::{fixed_expiry, AccessToken, MockCredentialFactory, MockMode};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ExecError, ExecResult};
use crate::logging::MemoryLogger;

/// Serve one canned HTTP response on a random local port
///
/// Returns the base URL and a handle resolving to the raw request text.
pub async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (format!("http://{}", addr), handle)
}

/// Accept one connection and never answer
pub async fn serve_silence() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });
    (format!("http://{}", addr), handle)
}

/// A URL nothing listens on
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            break;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

pub fn token_factory(token: &str) -> Arc<MockCredentialFactory> {
    Arc::new(MockCredentialFactory::new(MockMode::Token(AccessToken::new(
        token,
        fixed_expiry(),
    ))))
}

pub fn memory_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

/// Command runner answering every call with the same canned result
pub struct FakeCommandRunner {
    answer: Box<dyn Fn() -> ExecResult<CommandOutput> + Send + Sync>,
    calls: parking_lot::Mutex<Vec<CommandSpec>>,
}

impl FakeCommandRunner {
    pub fn stdout(stdout: &'static str) -> Self {
        Self::answering(move || {
            Ok(CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
        })
    }

    pub fn stderr(stderr: &'static str) -> Self {
        Self::answering(move || {
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
            })
        })
    }

    pub fn io_error(message: &'static str) -> Self {
        Self::answering(move || {
            Err(ExecError::Io {
                program: "az".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
            })
        })
    }

    fn answering(answer: impl Fn() -> ExecResult<CommandOutput> + Send + Sync + 'static) -> Self {
        Self {
            answer: Box::new(answer),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> ExecResult<CommandOutput> {
        self.calls.lock().push(spec.clone());
        (self.answer)()
    }
}
