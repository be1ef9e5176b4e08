mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::test_config;
use ftpjail::config::ServerConfig;
use ftpjail::protocol::{Dispatcher, standard_registry};
use ftpjail::server::{Server, ServerContext};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

async fn start(config: ServerConfig) -> SocketAddr {
    let context = Arc::new(ServerContext::new(config));
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(standard_registry().unwrap())));
    let server = Server::bind(context, dispatcher).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.start().await });
    addr
}

fn server_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        control_port: 0,
        ..test_config(root)
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let (read, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn line(&mut self) -> String {
        let mut line = String::new();
        timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .unwrap()
            .unwrap();
        line
    }

    async fn send(&mut self, command: &str) -> String {
        self.writer
            .write_all(format!("{}\r\n", command).as_bytes())
            .await
            .unwrap();
        self.line().await
    }
}

#[tokio::test]
async fn test_control_connection_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    let addr = start(server_config(&root)).await;
    assert!(root.is_dir());

    let mut client = Client::connect(addr).await;
    assert!(client.line().await.starts_with("220 "));

    assert_eq!(client.send("PWD").await, "530 Login first with USER and PASS, or QUIT\r\n");
    assert_eq!(client.send("FOO bar").await, "502 Command not recognized\r\n");
    assert_eq!(client.send("USER alice").await, "331 Password required for alice\r\n");
    assert_eq!(client.send("PASS secret").await, "230 Login successful\r\n");
    assert_eq!(client.send("MKD inbox").await, "257 \"/inbox\" directory created\r\n");
    assert_eq!(
        client.send("CWD inbox").await,
        "250 CWD successful. \"/inbox\" is current directory\r\n"
    );
    assert_eq!(client.send("CWD ../..").await, "550 Permission denied\r\n");
    assert_eq!(client.send("PWD").await, "257 \"/inbox\" is current directory\r\n");
    assert_eq!(client.send("QUIT").await, "221 Goodbye\r\n");

    let mut rest = Vec::new();
    client.reader.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert!(root.join("inbox").is_dir());
}

#[tokio::test]
async fn test_client_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = server_config(dir.path());
    config.max_clients = 1;
    let addr = start(config).await;

    let mut first = Client::connect(addr).await;
    assert!(first.line().await.starts_with("220 "));

    let mut second = Client::connect(addr).await;
    assert_eq!(
        second.line().await,
        "421 Too many connections. Try again later.\r\n"
    );

    assert_eq!(first.send("NOOP").await, "530 Login first with USER and PASS, or QUIT\r\n");
    assert_eq!(first.send("QUIT").await, "221 Goodbye\r\n");
}

#[tokio::test]
async fn test_oversized_line_and_idle_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = server_config(dir.path());
    config.max_command_length = 16;
    config.idle_timeout_secs = 1;
    let addr = start(config).await;

    let mut client = Client::connect(addr).await;
    assert!(client.line().await.starts_with("220 "));
    let long = format!("USER {}", "a".repeat(40));
    assert_eq!(client.send(&long).await, "500 Command too long\r\n");
    // The session survives an oversized line.
    assert_eq!(client.send("USER alice").await, "331 Password required for alice\r\n");

    assert!(client.line().await.starts_with("421 "));
}

#[tokio::test]
async fn test_line_without_newline_is_cut_off_at_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = server_config(dir.path());
    config.max_command_length = 512;
    config.idle_timeout_secs = 30;
    let addr = start(config).await;

    let mut client = Client::connect(addr).await;
    assert!(client.line().await.starts_with("220 "));

    // The reply comes before the line ends.
    client.writer.write_all(&vec![b'A'; 1024 * 1024]).await.unwrap();
    assert_eq!(client.line().await, "500 Command too long\r\n");

    // The rest of the line is dropped and the session carries on.
    client.writer.write_all(b"AAAA\r\n").await.unwrap();
    assert_eq!(client.send("USER alice").await, "331 Password required for alice\r\n");
    assert_eq!(client.send("QUIT").await, "221 Goodbye\r\n");
}
