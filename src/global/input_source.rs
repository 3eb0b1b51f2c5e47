use std::sync::Arc;

use parse_display::Display;
use tokio::sync::broadcast;

use super::{Global, InputMessage, InputSourceName};
use crate::api::Command;

/// A registered producer of command frames
#[derive(Display)]
#[display("`{name}` (id = {id})")]
pub struct InputSource {
    id: usize,
    name: InputSourceName,
    tx: broadcast::Sender<InputMessage>,
}

impl InputSource {
    pub fn new(id: usize, name: InputSourceName, tx: broadcast::Sender<InputMessage>) -> Self {
        Self { id, name, tx }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &InputSourceName {
        &self.name
    }

    /// Broadcast a command to the group runtimes
    ///
    /// A send error only means no runtime is listening anymore, which the
    /// boundary treats as the command having nowhere to go.
    pub fn send(&self, command: Command) -> Result<usize, broadcast::error::SendError<InputMessage>> {
        self.tx.send(InputMessage::new(self.id, command))
    }
}

/// Handle unregistering its [InputSource] when dropped
pub struct InputSourceHandle {
    input_source: Arc<InputSource>,
    global: Global,
}

impl InputSourceHandle {
    pub fn new(input_source: Arc<InputSource>, global: Global) -> Self {
        Self {
            input_source,
            global,
        }
    }
}

impl std::ops::Deref for InputSourceHandle {
    type Target = InputSource;

    fn deref(&self) -> &Self::Target {
        &self.input_source
    }
}

impl Drop for InputSourceHandle {
    fn drop(&mut self) {
        self.global
            .unregister_input_source(self.input_source.clone());
    }
}
