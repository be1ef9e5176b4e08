use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::client::Session;
use crate::protocol::responses::{SERVICE_UNAVAILABLE, SYNTAX_ERROR, format_response};
use crate::protocol::{CommandStatus, Dispatcher};
use crate::server::ServerContext;

const GREETING: &str = "220 Welcome to ftpjail\r\n";

/// Drives one control connection.
///
/// - Greets the client, then reads CRLF terminated lines. No more than
///   `max_command_length + 1` bytes of a line are ever buffered.
/// - Each line is dispatched on a blocking worker; the session moves there
///   and back, so a slow disk never stalls the runtime.
/// - Closes on QUIT, on EOF, on read errors and after `idle_timeout`.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    context: Arc<ServerContext>,
    dispatcher: Arc<Dispatcher>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    if let Err(e) = send(&mut write_half, GREETING).await {
        warn!("Failed to greet {}: {}", client_addr, e);
        return;
    }

    let idle = context.config().idle_timeout();
    let max_len = context.config().max_command_length;
    let mut session = Session::new(Arc::clone(&context), Some(client_addr));
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let limit = max_len as u64 + 1;
        let read = match timeout(idle, (&mut reader).take(limit).read_until(b'\n', &mut buf)).await {
            Ok(read) => read,
            Err(_) => {
                info!("Client {} idle for {:?}, closing", client_addr, idle);
                let reply = format_response(SERVICE_UNAVAILABLE, "Idle timeout, closing control connection");
                let _ = send(&mut write_half, &reply).await;
                break;
            }
        };

        match read {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }

        if buf.len() > max_len {
            warn!("Client {} sent a line over {} bytes", client_addr, max_len);
            if send(&mut write_half, &format_response(SYNTAX_ERROR, "Command too long")).await.is_err() {
                break;
            }
            if buf.last() != Some(&b'\n') {
                match timeout(idle, discard_line(&mut reader)).await {
                    Ok(Ok(true)) => {}
                    Ok(Ok(false)) => break,
                    Ok(Err(e)) => {
                        error!("Failed to read from {}: {}", client_addr, e);
                        break;
                    }
                    Err(_) => {
                        info!("Client {} idle for {:?}, closing", client_addr, idle);
                        break;
                    }
                }
            }
            continue;
        }

        let line = String::from_utf8_lossy(&buf).into_owned();
        let worker = Arc::clone(&dispatcher);
        let joined = tokio::task::spawn_blocking(move || {
            let result = worker.dispatch(&mut session, &line);
            (session, result)
        })
        .await;

        let result = match joined {
            Ok((returned, result)) => {
                session = returned;
                result
            }
            Err(e) => {
                error!("Command worker for {} failed: {}", client_addr, e);
                let reply = format_response(SERVICE_UNAVAILABLE, "Internal error, closing control connection");
                let _ = send(&mut write_half, &reply).await;
                return;
            }
        };

        if let Err(e) = send(&mut write_half, &result.message).await {
            error!("Failed to write to {}: {}", client_addr, e);
            break;
        }
        if result.status == CommandStatus::CloseConnection {
            break;
        }
    }

    info!("Client {} disconnected", client_addr);
}

/// Skips input up to and including the next `\n`, one buffer at a time.
/// Returns `false` if the connection ends first.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<bool> {
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(false);
        }
        match chunk.iter().position(|&byte| byte == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, reply: &str) -> std::io::Result<()> {
    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await
}
