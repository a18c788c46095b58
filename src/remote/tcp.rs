// ABOUTME: Newline-delimited JSON transport over TCP for the remote control surface.
// ABOUTME: One request per line in each direction; the client opens a connection per request.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snafu::ResultExt;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{TcpListener, TcpStream};

use super::error::{ConnectSnafu, IoSnafu, RemoteError};
use super::server::ContainerServer;
use super::transport::{Invoker, Request, Response};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest request line the server reads, newline excluded.
pub const MAX_REQUEST_LEN: usize = 1024 * 1024;

/// Accept connections on `listener` until `shutdown` resolves, closing
/// connections that stay silent for [`DEFAULT_TIMEOUT`].
pub async fn serve<F>(
    listener: TcpListener,
    server: Arc<ContainerServer>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    serve_with_timeout(listener, server, DEFAULT_TIMEOUT, shutdown).await
}

/// Like [`serve`], with an explicit idle timeout per connection.
pub async fn serve_with_timeout<F>(
    listener: TcpListener,
    server: Arc<ContainerServer>,
    idle_timeout: Duration,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, namespace = server.namespace(), "serving container operations");
    }

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => break,
        };

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &server, idle_timeout).await {
                tracing::debug!(%peer, "connection error: {}", e);
            }
        });
    }

    tracing::info!("remote surface shut down");
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    server: &ContainerServer,
    idle_timeout: Duration,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let limit = MAX_REQUEST_LEN as u64 + 1;
        let mut limited = (&mut reader).take(limit);
        let read = limited.read_line(&mut line);
        let read = match tokio::time::timeout(idle_timeout, read).await {
            Ok(read) => read?,
            Err(_) => {
                tracing::debug!("closing idle connection");
                return Ok(());
            }
        };
        if read == 0 {
            return Ok(());
        }
        if !line.ends_with('\n') && line.len() > MAX_REQUEST_LEN {
            let response =
                Response::Error(format!("request exceeds {MAX_REQUEST_LEN} bytes"));
            write_response(&mut writer, &response).await?;
            match tokio::time::timeout(idle_timeout, skip_line(&mut reader)).await {
                Ok(Ok(true)) => continue,
                Ok(Ok(false)) | Err(_) => return Ok(()),
                Ok(Err(e)) => return Err(e),
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => server.handle(request).await,
            Err(e) => Response::Error(format!("malformed request: {e}")),
        };
        write_response(&mut writer, &response).await?;
    }
}

/// Discard input up to and including the next newline. Returns false at EOF.
async fn skip_line<R>(reader: &mut R) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(false);
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut out = serde_json::to_string(response).map_err(std::io::Error::other)?;
    out.push('\n');
    writer.write_all(out.as_bytes()).await
}

/// Client side of the TCP transport.
#[derive(Debug, Clone)]
pub struct TcpInvoker {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpInvoker {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn request(&self, request: &Request) -> Result<Option<String>, RemoteError> {
        let addr = self.addr;
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(response) => response?.into_result(),
            Err(_) => Err(RemoteError::Timeout { addr }),
        }
    }

    async fn exchange(&self, request: &Request) -> Result<Response, RemoteError> {
        let addr = self.addr;
        let stream = TcpStream::connect(addr).await.context(ConnectSnafu { addr })?;
        let (reader, mut writer) = stream.into_split();

        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context(IoSnafu { addr })?;

        let mut lines = BufReader::new(reader).lines();
        let reply = lines
            .next_line()
            .await
            .context(IoSnafu { addr })?
            .ok_or(RemoteError::Closed { addr })?;
        Ok(serde_json::from_str(&reply)?)
    }
}

#[async_trait]
impl Invoker for TcpInvoker {
    async fn invoke(&self, operation: &str, args: Vec<String>) -> Result<String, RemoteError> {
        let request = Request::Invoke {
            operation: operation.to_string(),
            args,
        };
        // A null payload on an invocation is an empty-result envelope.
        Ok(self
            .request(&request)
            .await?
            .unwrap_or_else(|| "{}".to_string()))
    }

    async fn read_property(
        &self,
        collection: &str,
        key: &str,
        property: &str,
    ) -> Result<Option<String>, RemoteError> {
        self.request(&Request::Property {
            collection: collection.to_string(),
            key: key.to_string(),
            property: property.to_string(),
        })
        .await
    }
}
