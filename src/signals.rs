//! Process signal handling
//!
//! Signals never interrupt the daemon directly. They only set flags in
//! [`SignalFlags`], which the daemon loop checks once per iteration.
//!
//! - `SIGTERM`, `SIGINT` - request termination
//! - `SIGHUP` - request a configuration reread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::info;

/// Termination and reread requests
///
/// The two flags are independent: consuming a reread request never clears a
/// pending termination and vice versa.
#[derive(Debug, Default)]
pub struct SignalFlags {
    terminate: AtomicBool,
    reread: AtomicBool,
}

impl SignalFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_terminate(&self) {
        self.terminate.store(true, Ordering::SeqCst);
    }

    pub fn request_reread(&self) {
        self.reread.store(true, Ordering::SeqCst);
    }

    pub fn terminate_requested(&self) -> bool {
        self.terminate.load(Ordering::SeqCst)
    }

    pub fn reread_requested(&self) -> bool {
        self.reread.load(Ordering::SeqCst)
    }

    pub fn clear_terminate(&self) {
        self.terminate.store(false, Ordering::SeqCst);
    }

    pub fn clear_reread(&self) {
        self.reread.store(false, Ordering::SeqCst);
    }

    /// Consume a pending reread request
    pub fn take_reread(&self) -> bool {
        self.reread.swap(false, Ordering::SeqCst)
    }
}

/// Install the signal handlers and update `flags` from a background task
pub fn spawn_listener(flags: Arc<SignalFlags>) -> std::io::Result<JoinHandle<()>> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut hup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(()) = term.recv() => {
                    info!("SIGTERM received, stopping after the current cycle");
                    flags.request_terminate();
                }
                Some(()) = int.recv() => {
                    info!("SIGINT received, stopping after the current cycle");
                    flags.request_terminate();
                }
                Some(()) = hup.recv() => {
                    info!("SIGHUP received, configuration reread requested");
                    flags.request_reread();
                }
                else => break,
            }
        }
    }))
}
