//! Detached background work.
//!
//! Stale-while-revalidate answers from cache and leaves the network refresh
//! running behind the response. The request that scheduled the refresh never
//! sees its outcome; the `RefreshMonitor` does.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::{Cmd, Error};

pub trait RefreshMonitor: Send + Sync {
    fn on_success(&self, task: &str) {
        debug!("Background task {task} done");
    }
    fn on_failure(&self, task: &str, err: &Error);
}

/// Reports failures through the logger.
pub struct LogMonitor;

impl RefreshMonitor for LogMonitor {
    fn on_failure(&self, task: &str, err: &Error) {
        warn!("Background task {task} failed: {err:#}");
    }
}

/// Executor for fire-and-forget tasks.
pub trait Spawner: Send + Sync {
    fn spawn(&self, task_name: String, task: Cmd<()>);
}

/// Runs every task on its own thread. Join handles are kept so the host can
/// wait for outstanding refreshes before shutting down.
pub struct ThreadSpawner {
    monitor: Arc<dyn RefreshMonitor>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        ThreadSpawner::new(Arc::new(LogMonitor))
    }
}

impl ThreadSpawner {
    pub fn new(monitor: Arc<dyn RefreshMonitor>) -> Self {
        ThreadSpawner {
            monitor,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Blocks until every task spawned so far has finished. Returns the
    /// number of tasks waited on.
    pub fn wait(&self) -> usize {
        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => return 0,
        };
        let count = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                error!("Background task panicked");
            }
        }
        count
    }
}

impl Spawner for ThreadSpawner {
    fn spawn(&self, task_name: String, task: Cmd<()>) {
        let monitor = self.monitor.clone();
        let handle = thread::spawn(move || match task() {
            Ok(()) => monitor.on_success(&task_name),
            Err(err) => monitor.on_failure(&task_name, &err),
        });
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|handle| !handle.is_finished());
                handles.push(handle);
            }
            Err(_) => error!("Cannot track background task, it will run detached"),
        }
    }
}
