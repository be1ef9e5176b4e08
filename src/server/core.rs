use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::client::handle_client;
use crate::protocol::Dispatcher;
use crate::protocol::responses::{SERVICE_UNAVAILABLE, format_response};
use crate::server::ServerContext;

pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
    dispatcher: Arc<Dispatcher>,
    slots: Arc<Semaphore>,
}

impl Server {
    /// Binds the control socket and makes sure the server root exists.
    pub async fn bind(context: Arc<ServerContext>, dispatcher: Arc<Dispatcher>) -> io::Result<Self> {
        let config = context.config();
        let root = config.server_root_path();
        std::fs::create_dir_all(&root)?;
        info!("Server root directory: {}", root.display());

        let socket = config.control_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            e
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        let slots = Arc::new(Semaphore::new(config.max_clients));
        Ok(Self {
            listener,
            context,
            dispatcher,
            slots,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the task is dropped.
    pub async fn start(&self) {
        info!(
            "Starting ftpjail on {} (max {} clients, {:?} storage)",
            self.context.config().control_socket(),
            self.context.config().max_clients,
            self.context.config().storage_mode
        );

        loop {
            let (mut stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    continue;
                }
            };

            let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                warn!("Rejecting {}: client limit reached", addr);
                let reply = format_response(SERVICE_UNAVAILABLE, "Too many connections. Try again later.");
                tokio::spawn(async move {
                    let _ = stream.write_all(reply.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
                continue;
            };

            info!("Accepted connection from {}", addr);
            let context = Arc::clone(&self.context);
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                handle_client(stream, addr, context, dispatcher).await;
                drop(permit);
            });
        }
    }
}
