//! Process-wide shared state and message channels

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use parse_display::Display;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

mod event;
pub use event::*;

mod input_message;
pub use input_message::*;

mod input_source;
pub use input_source::*;

mod state;
pub use state::*;

use crate::models::Config;

/// Cheap shareable handle to the daemon-wide data
#[derive(Clone)]
pub struct Global(Arc<RwLock<GlobalData>>);

#[derive(Display, Debug)]
pub enum InputSourceName {
    #[display("WebSocket({peer_addr})")]
    WebSocket { peer_addr: SocketAddr },
    #[display("Local({name})")]
    Local { name: &'static str },
}

impl Global {
    pub async fn register_input_source(
        &self,
        name: InputSourceName,
    ) -> InputSourceHandle {
        InputSourceHandle::new(
            self.0.write().await.register_input_source(name),
            self.clone(),
        )
    }

    pub async fn subscribe_input(&self) -> broadcast::Receiver<InputMessage> {
        self.0.read().await.input_tx.subscribe()
    }

    pub async fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.0.read().await.event_tx.subscribe()
    }

    pub async fn read_config<T>(&self, f: impl FnOnce(&Config) -> T) -> T {
        let data = self.0.read().await;
        f(&data.config)
    }

    pub async fn read_state<T>(&self, f: impl FnOnce(&ColorState) -> T) -> T {
        let data = self.0.read().await;
        f(&data.state)
    }

    /// Apply a decoded command to the shared color/mode state
    ///
    /// Returns what the protocol boundary should do next with the command.
    /// Once the state is shut down every frame is dropped, no matter its
    /// content.
    pub async fn apply_command(&self, command: &crate::api::Command) -> CommandDisposition {
        let mut data = self.0.write().await;

        if data.state.shut_down() {
            return CommandDisposition::Drop;
        }

        let disposition = data.state.apply(command);

        if let crate::api::Command::Shutdown = command {
            // ok: nobody listening means nothing left to tear down
            data.event_tx.send(Event::Shutdown).ok();
        }

        disposition
    }

    pub(crate) fn unregister_input_source(&self, source: Arc<InputSource>) {
        let global = self.clone();
        let unregister = async move {
            global.0.write().await.unregister_input_source(&source);
        };

        // The handle may be dropped on a runtime worker thread, which must
        // not block on the write lock
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(unregister);
            }
            Err(_) => futures::executor::block_on(unregister),
        }
    }
}

pub struct GlobalData {
    input_tx: broadcast::Sender<InputMessage>,
    event_tx: broadcast::Sender<Event>,
    input_sources: HashMap<usize, Arc<InputSource>>,
    next_input_source_id: usize,
    config: Config,
    state: ColorState,
}

impl GlobalData {
    pub fn new(config: &Config) -> Self {
        let (input_tx, _) = broadcast::channel(16);
        let (event_tx, _) = broadcast::channel(4);

        Self {
            input_tx,
            event_tx,
            input_sources: Default::default(),
            next_input_source_id: 1,
            config: config.clone(),
            state: ColorState::new(config),
        }
    }

    pub fn wrap(self) -> Global {
        Global(Arc::new(RwLock::new(self)))
    }

    fn register_input_source(&mut self, name: InputSourceName) -> Arc<InputSource> {
        let id = self.next_input_source_id;
        self.next_input_source_id += 1;

        let input_source = Arc::new(InputSource::new(id, name, self.input_tx.clone()));

        info!("registered new input source {}", *input_source);

        self.input_sources.insert(id, input_source.clone());

        input_source
    }

    fn unregister_input_source(&mut self, source: &InputSource) {
        if let Some(is) = self.input_sources.remove(&source.id()) {
            info!("unregistered input source {}", *is);
        }
    }
}
