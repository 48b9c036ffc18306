//! Shutdown coordination for the pipeline tasks
//!
//! One [`ShutdownCoordinator`] owns the broadcast channel. Each task holds a
//! [`ShutdownSignal`] and checks it between queue operations, so a stop
//! request never interrupts a queue call halfway.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when a second interrupt forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

/// Coordinates graceful shutdown across the pipeline
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle for one task to observe the stop request
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.shutdown_tx.subscribe(),
            requested: Arc::clone(&self.shutdown_requested),
        }
    }

    /// Ask every task to stop
    pub fn trigger_shutdown(&self) {
        if !self.shutdown_requested.swap(true, Ordering::AcqRel) {
            log::debug!("Shutdown requested");
        }
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Run `future_fn` with OS signal handlers wired to this coordinator
    pub async fn guard<F, Fut, R>(future_fn: F) -> R
    where
        F: FnOnce(ShutdownCoordinator) -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let coordinator = Self::new();
        install_signal_handlers(&coordinator);
        future_fn(coordinator).await
    }
}

/// Receiving side of a shutdown request
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Non-blocking check
    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&mut self) {
        if self.is_triggered() {
            return;
        }
        // Lagged or closed both mean the sender has spoken or gone away
        let _ = self.rx.recv().await;
    }
}

fn install_signal_handlers(coordinator: &ShutdownCoordinator) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        // Writing to a closed pipe should end the process quietly
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use tokio::signal::unix::{signal, SignalKind};
        for kind in [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
        ] {
            let coordinator = coordinator.clone();
            let counter = Arc::clone(&signal_count);
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&coordinator, &counter);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                on_signal(&coordinator, &signal_count);
            }
        });
    }
}

fn on_signal(coordinator: &ShutdownCoordinator, counter: &AtomicUsize) {
    let previous = counter.fetch_add(1, Ordering::AcqRel);
    if previous >= 1 {
        log::warn!("Second interrupt received; exiting");
        std::process::exit(FORCED_EXIT_CODE);
    }
    log::info!("Interrupt received; draining queue (repeat to force exit)");
    coordinator.trigger_shutdown();
}
