//! TCP accept loop feeding connections into the connection layer.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::connection::HttpConnection;
use crate::handler::Handler;
use crate::limits::Limits;
use crate::metrics::ServerMetrics;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("server address is missing")]
    MissingAddress,

    #[error("invalid server address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

/// Builder for a [`Server`].
#[derive(Debug)]
pub struct ServerBuilder {
    addresses: Option<Vec<SocketAddr>>,
    address_error: Option<io::Error>,
    limits: Limits,
    idle_timeout: Duration,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { addresses: None, address_error: None, limits: Limits::default(), idle_timeout: DEFAULT_IDLE_TIMEOUT }
    }

    /// The address to listen on. Resolution happens here; a name that fails
    /// to resolve surfaces from [`build`](Self::build).
    pub fn address(mut self, address: impl ToSocketAddrs) -> Self {
        match address.to_socket_addrs() {
            Ok(addresses) => self.addresses = Some(addresses.collect()),
            Err(e) => self.address_error = Some(e),
        }
        self
    }

    /// Parse limits applied to every connection.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// How long a connection may sit without a complete request.
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        if let Some(e) = self.address_error {
            return Err(e.into());
        }
        let addresses = self.addresses.filter(|addresses| !addresses.is_empty()).ok_or(ServerBuildError::MissingAddress)?;

        Ok(Server {
            addresses,
            limits: Arc::new(self.limits),
            idle_timeout: self.idle_timeout,
            metrics: Arc::new(ServerMetrics::new()),
        })
    }
}

/// Accepts connections and spawns one task per connection.
#[derive(Debug)]
pub struct Server {
    addresses: Vec<SocketAddr>,
    limits: Arc<Limits>,
    idle_timeout: Duration,
    metrics: Arc<ServerMetrics>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Handle to the shared counters, e.g. for a metrics endpoint.
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Binds and serves until the listener fails.
    pub async fn run<H>(self, handler: Arc<H>) -> io::Result<()>
    where
        H: Handler + 'static,
    {
        let listener = TcpListener::bind(&self.addresses[..]).await?;
        info!(address = %listener.local_addr()?, "server started");

        loop {
            let (stream, peer) = listener.accept().await?;
            self.metrics.connection_opened();

            let handler = Arc::clone(&handler);
            let limits = Arc::clone(&self.limits);
            let metrics = Arc::clone(&self.metrics);
            let idle_timeout = self.idle_timeout;

            tokio::spawn(async move {
                debug!(%peer, "accepted connection");
                let (reader, writer) = stream.into_split();
                let connection =
                    HttpConnection::new(reader, writer, limits, Arc::clone(&metrics)).with_idle_timeout(idle_timeout);

                if let Err(e) = connection.process(handler).await {
                    warn!(%peer, error = %e, "connection closed with error");
                } else {
                    debug!(%peer, "connection closed");
                }
                metrics.connection_closed();
            });
        }
    }
}
