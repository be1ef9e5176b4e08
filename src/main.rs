//! ftpjail - Entry Point
//!
//! FTP server with a registry-driven command layer and a chroot jail around
//! every path a client names.

use log::info;
use std::process;
use std::sync::Arc;

use ftpjail::config::ServerConfig;
use ftpjail::error::FtpServerError;
use ftpjail::error::handlers::handle_error;
use ftpjail::protocol::{Dispatcher, standard_registry};
use ftpjail::server::{Server, ServerContext};

#[tokio::main]
async fn main() {
    // env_logger picks up RUST_LOG
    env_logger::init();

    if let Err(e) = run().await {
        handle_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<(), FtpServerError> {
    let config = ServerConfig::load()?;

    let registry = standard_registry()?;
    info!("Registered {} FTP verbs", registry.len());

    let context = Arc::new(ServerContext::new(config));
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));

    let server = Server::bind(context, dispatcher).await?;
    server.start().await;
    Ok(())
}
