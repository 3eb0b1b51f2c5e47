//! Server module
//!
//! Holds the captive portal DNS responder and the handle type used to keep
//! spawned server tasks alive.

use futures::Future;
use tokio::task::JoinHandle;

mod dns;
pub use dns::bind as bind_dns;

/// Handle to a spawned server task
///
/// The task is aborted when the handle is dropped.
pub struct ServerHandle {
    join_handle: JoinHandle<()>,
}

impl ServerHandle {
    pub fn spawn(future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            join_handle: tokio::spawn(future),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}
