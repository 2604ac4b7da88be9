//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Telnet shell server
//!
//! The TelnetServer owns the TCP listener, accepts connections, and runs a
//! [`ConnectionWorker`] for each one on its own task.

use crate::{
    CommandInterpreter, ConnectionId, ConnectionWorker, Result, ShellConfig, TelnetError,
};
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Telnet shell server
///
/// # Example
///
/// ```no_run
/// use telshell_service::{CommandInterpreter, Result, ShellConfig, ShellSession, TelnetServer};
/// use async_trait::async_trait;
///
/// struct Nothing;
///
/// #[async_trait]
/// impl CommandInterpreter for Nothing {
///     async fn execute(&self, _line: &str, _session: &mut ShellSession) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
///     let server = TelnetServer::new(ShellConfig::default()).await?;
///     server.start(std::sync::Arc::new(Nothing)).await?;
///
///     tokio::signal::ctrl_c().await?;
///     server.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct TelnetServer {
    /// Server configuration
    config: Arc<ShellConfig>,
    /// TCP listener (wrapped in Arc<Mutex> for sharing with accept loop)
    listener: Arc<tokio::sync::Mutex<TcpListener>>,
    /// Actual bind address
    bind_address: SocketAddr,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Workers still running
    active: Arc<AtomicUsize>,
    /// Next connection ID to hand out
    next_id: Arc<AtomicU64>,
    /// Shutdown notification
    shutdown_notify: Arc<Notify>,
    /// Accept loop task handle
    accept_handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

/// Decrements the active worker count when a worker task ends
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TelnetServer {
    /// Validate `config` and bind its address without accepting yet.
    ///
    /// Call `start()` to begin accepting connections.
    pub async fn new(config: ShellConfig) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(config.bind_address).await?;
        let actual_addr = listener.local_addr()?;

        tracing::info!("Telnet shell bound to {}", actual_addr);

        Ok(Self {
            config: Arc::new(config),
            listener: Arc::new(tokio::sync::Mutex::new(listener)),
            bind_address: actual_addr,
            running: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown_notify: Arc::new(Notify::new()),
            accept_handle: tokio::sync::Mutex::new(None),
        })
    }

    /// Start accepting connections, running `interpreter` for each session
    pub async fn start(&self, interpreter: Arc<dyn CommandInterpreter>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TelnetError::Other("Server already running".to_string()));
        }

        tracing::info!("Starting Telnet shell on {}", self.bind_address);

        let handle = self.spawn_accept_loop(interpreter);
        *self.accept_handle.lock().await = Some(handle);

        Ok(())
    }

    fn spawn_accept_loop(&self, interpreter: Arc<dyn CommandInterpreter>) -> JoinHandle<()> {
        let listener = self.listener.clone();
        let config = self.config.clone();
        let running = self.running.clone();
        let active = self.active.clone();
        let next_id = self.next_id.clone();
        let shutdown_notify = self.shutdown_notify.clone();

        tokio::spawn(async move {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let accept_result = tokio::select! {
                    result = async {
                        listener.lock().await.accept().await
                    } => result,
                    _ = shutdown_notify.notified() => break,
                };

                match accept_result {
                    Ok((socket, peer_addr)) => {
                        if active.load(Ordering::SeqCst) >= config.max_connections {
                            let e = TelnetError::MaxConnectionsReached(config.max_connections);
                            tracing::warn!("Rejecting connection from {}: {}", peer_addr, e);
                            drop(socket);
                            continue;
                        }

                        let id = ConnectionId::new(next_id.fetch_add(1, Ordering::SeqCst));
                        tracing::info!("Connection {} established from {}", id, peer_addr);
                        counter!("telshell.connections.total").increment(1);

                        let worker = match ConnectionWorker::new(
                            id,
                            socket,
                            interpreter.clone(),
                            config.clone(),
                        ) {
                            Ok(worker) => worker,
                            Err(e) => {
                                tracing::error!("Failed to start connection {}: {}", id, e);
                                continue;
                            }
                        };
                        active.fetch_add(1, Ordering::SeqCst);
                        let guard = ActiveGuard(active.clone());
                        tokio::spawn(
                            async move {
                                let _guard = guard;
                                if let Err(e) = worker.run().await {
                                    tracing::debug!("Connection {} ended: {}", id, e);
                                }
                            }
                            .in_current_span(),
                        );
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);

                        // Back off on errors to avoid tight loop
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }

            tracing::info!("Accept loop terminated");
        })
    }

    /// Stop accepting connections.
    ///
    /// Sessions already running continue until their peers disconnect.
    pub async fn shutdown(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(TelnetError::ServerNotRunning);
        }

        tracing::info!("Shutting down Telnet shell");

        self.shutdown_notify.notify_waiters();

        if let Some(handle) = self.accept_handle.lock().await.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        tracing::info!("Telnet shell shutdown complete");

        Ok(())
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the server's bind address
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Get the number of sessions still running
    pub fn connection_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Get the server configuration
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}

impl std::fmt::Debug for TelnetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetServer")
            .field("bind_address", &self.bind_address())
            .field("running", &self.is_running())
            .field("connection_count", &self.connection_count())
            .finish()
    }
}

impl Drop for TelnetServer {
    fn drop(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("TelnetServer dropped while still running");
            self.running.store(false, Ordering::SeqCst);
            self.shutdown_notify.notify_waiters();
        }
    }
}
