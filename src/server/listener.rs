use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::Connection;

/// Accepting server: one detached task per connection.
///
/// Connections share nothing with each other; the only cross-task state
/// is the listener itself and its closed flag.
pub struct Server {
    listener: TcpListener,
    closed: Arc<AtomicBool>,
    config: Arc<Config>,
}

/// Cloneable handle that flips the server's closed flag, turning
/// subsequent accept failures into an orderly stop.
#[derive(Clone)]
pub struct ShutdownHandle {
    closed: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Server {
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.server.listen_addr).await?;
        info!("Listening on {}", config.server.listen_addr);

        Ok(Self {
            listener,
            closed: Arc::new(AtomicBool::new(false)),
            config: Arc::new(config),
        })
    }

    /// The bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            closed: Arc::clone(&self.closed),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((socket, peer)) => {
                    info!("Accepted connection from {}", peer);

                    let config = Arc::clone(&self.config);
                    tokio::spawn(async move {
                        if let Err(e) = Connection::new(socket, config).run().await {
                            error!("Connection error from {}: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    // expected during shutdown, a failure otherwise
                    if self.closed.load(Ordering::SeqCst) {
                        info!("Listener closed, stopping accept loop");
                        return Ok(());
                    }
                    error!("Accept failed: {}", e);
                }
            }
        }
    }
}
