//! Blocking bridge over the async cluster driver.

use std::fmt;
use std::future::Future;
use tokio::runtime::RuntimeFlavor;

/// Async runtime bridge for the blocking client surface.
///
/// The cluster driver is async while connections and statements block the
/// calling thread. This enum reuses the ambient Tokio runtime when it is
/// multi-threaded (`block_in_place` needs worker threads to hand off to).
/// Otherwise it owns a multi-threaded runtime. When that owned runtime is
/// driven from inside another runtime, such as a current-thread
/// `#[tokio::main]`, the future runs on a scoped helper thread.
pub enum Runtime {
    Handle(tokio::runtime::Handle),
    TokioRuntime(Option<tokio::runtime::Runtime>),
}

impl Runtime {
    /// Creates a new runtime instance.
    pub fn new() -> std::io::Result<Self> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                Ok(Self::Handle(handle))
            }
            _ => {
                let rt = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .thread_name("cassandra-dbc")
                    .build()?;

                Ok(Self::TokioRuntime(Some(rt)))
            }
        }
    }

    /// Blocks the calling thread until `fut` completes.
    pub fn block_on<F>(&self, fut: F) -> F::Output
    where
        F: Future + Send,
        F::Output: Send,
    {
        match self {
            Runtime::Handle(handle) => tokio::task::block_in_place(|| handle.block_on(fut)),
            Runtime::TokioRuntime(Some(runtime)) => {
                if tokio::runtime::Handle::try_current().is_err() {
                    return runtime.block_on(fut);
                }
                // A runtime already drives this thread and cannot be re-entered.
                std::thread::scope(|scope| {
                    match scope.spawn(|| runtime.block_on(fut)).join() {
                        Ok(output) => output,
                        Err(panic) => std::panic::resume_unwind(panic),
                    }
                })
            }
            Runtime::TokioRuntime(None) => unreachable!("runtime is only taken on drop"),
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Dropping a runtime normally blocks, which panics inside async code.
        if let Runtime::TokioRuntime(runtime) = self {
            if let Some(runtime) = runtime.take() {
                runtime.shutdown_background();
            }
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runtime::Handle(_) => f.write_str("Runtime::Handle(...)"),
            Runtime::TokioRuntime(_) => f.write_str("Runtime::TokioRuntime(...)"),
        }
    }
}
