use std::{
    any::Any,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{
        mpsc,
        Arc,
    },
    time::Duration,
};

use futures::FutureExt;
use tokio::{
    runtime::{
        Builder,
        Runtime,
    },
    task::JoinHandle,
};

use crate::core::LanguageToolsError;

const WORKER_THREADS: usize = 2;

/// Runs work on a background runtime and hands each result back through a
/// queue that the owning thread drains. Results are never applied from the
/// worker side, so whoever owns the manager also owns every mutation that
/// follows from a result.
pub struct TaskManager<T> {
    runtime: Arc<Runtime>,
    receiver: mpsc::Receiver<T>,
    sender: mpsc::Sender<T>,
}

impl<T: Send + 'static> TaskManager<T> {
    pub fn new() -> Result<Self, LanguageToolsError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("languagetools-worker")
            .enable_all()
            .build()
            .map_err(|e| {
                LanguageToolsError::Custom(format!("Failed to create TaskManager runtime: {e}"))
            })?;

        Ok(Self::with_runtime(Arc::new(runtime)))
    }

    pub fn with_runtime(runtime: Arc<Runtime>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { runtime, receiver, sender }
    }

    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }

    /// Runs `work` in the background. If it panics, `on_panic` turns the panic
    /// message into the result instead, so every submission yields exactly one
    /// result.
    pub fn submit<F, P>(&self, work: F, on_panic: P) -> JoinHandle<()>
    where
        F: Future<Output = T> + Send + 'static,
        P: FnOnce(String) -> T + Send + 'static,
    {
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(%message, "Background task panicked");
                    on_panic(message)
                }
            };
            let _ = sender.send(result);
        })
    }

    pub fn poll_results(&mut self) -> Vec<T> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }

        results
    }

    /// Blocks the calling thread until one result arrives or the timeout passes.
    pub fn wait_result(&mut self, timeout: Duration) -> Option<T> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
