use crate::api::Command;

/// A decoded command frame tagged with the source that produced it
#[derive(Debug, Clone)]
pub struct InputMessage {
    source_id: usize,
    data: Command,
}

impl InputMessage {
    pub fn new(source_id: usize, data: Command) -> Self {
        Self { source_id, data }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn data(&self) -> &Command {
        &self.data
    }
}
