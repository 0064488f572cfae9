// Network host lifecycle: the websocket hub host and a no-op stand-in.

use async_trait::async_trait;
use axum::{Router, routing::get};
use std::{
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::interface_adapters::net::hub::{Hub, hub_ws_handler};
use crate::interface_adapters::transport::Transport;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait NetworkHost: Send + Sync {
    async fn start(&mut self, port: u16) -> io::Result<()>;
    async fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// The transport to publish through while running.
    fn publisher(&self) -> Option<Arc<dyn Transport>>;
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<io::Result<()>>,
}

pub struct WsHubHost {
    bind: IpAddr,
    hub: Arc<Hub>,
    running: Option<RunningServer>,
}

impl WsHubHost {
    pub fn new(bind: IpAddr, hub: Arc<Hub>) -> Self {
        Self {
            bind,
            hub,
            running: None,
        }
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Bound address while running; port 0 resolves to the OS-assigned port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }
}

#[async_trait]
impl NetworkHost for WsHubHost {
    async fn start(&mut self, port: u16) -> io::Result<()> {
        if let Some(running) = &self.running {
            warn!(address = %running.local_addr, "hub host already running");
            return Ok(());
        }

        let address = SocketAddr::new(self.bind, port);
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .inspect_err(|e| {
                error!(%address, error = %e, "failed to bind");
            })?;
        let local_addr = listener.local_addr()?;

        let app = Router::new()
            .route("/hub", get(hub_ws_handler))
            .with_state(self.hub.clone());
        self.hub.open();

        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await
                .inspect_err(|e| {
                    error!(error = %e, "hub server error");
                })
        });

        info!(address = %local_addr, "hub listening");
        self.running = Some(RunningServer {
            local_addr,
            shutdown,
            task,
        });
        Ok(())
    }

    async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        // Close sockets first; graceful shutdown does not wait for upgraded connections.
        self.hub.close();
        running.shutdown.notify_one();
        match timeout(STOP_TIMEOUT, running.task).await {
            Ok(Ok(Ok(()))) => info!(address = %running.local_addr, "hub stopped"),
            Ok(Ok(Err(e))) => error!(error = %e, "hub stopped with error"),
            Ok(Err(e)) => error!(error = %e, "hub task failed"),
            Err(_) => warn!("hub did not stop in time"),
        }
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn publisher(&self) -> Option<Arc<dyn Transport>> {
        self.running.as_ref().map(|_| self.hub.clone() as Arc<dyn Transport>)
    }
}

/// Host for games without networking.
#[derive(Debug, Default)]
pub struct DummyHost;

#[async_trait]
impl NetworkHost for DummyHost {
    async fn start(&mut self, _port: u16) -> io::Result<()> {
        Ok(())
    }

    async fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }

    fn publisher(&self) -> Option<Arc<dyn Transport>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn dummy_host_never_runs() {
        let mut host = DummyHost;
        host.start(2439).await.expect("start is a no-op");
        assert!(!host.is_running());
        assert!(host.publisher().is_none());
        host.stop().await;
    }

    #[tokio::test]
    async fn hub_host_exposes_publisher_only_while_running() {
        let mut host = WsHubHost::new(IpAddr::V4(Ipv4Addr::LOCALHOST), Hub::new(8));
        assert!(host.publisher().is_none());

        host.start(0).await.expect("binds an ephemeral port");
        assert!(host.is_running());
        assert!(host.publisher().is_some());
        assert_ne!(host.local_addr().map(|a| a.port()), Some(0));

        host.stop().await;
        assert!(!host.is_running());
        assert!(host.local_addr().is_none());
    }
}
