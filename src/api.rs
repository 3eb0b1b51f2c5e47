//! Protocol boundary: decodes control frames into state mutations

use crate::global::{CommandDisposition, Global, InputSourceHandle};

mod command;
pub use command::Command;

/// One connected control client
///
/// Frames are decoded here, applied to the shared state, then broadcast to
/// the group runtimes. No frame ever produces a reply or an error to the
/// client; the current state is reported through page template tokens
/// instead.
pub struct ClientConnection {
    handle: InputSourceHandle,
    global: Global,
}

impl ClientConnection {
    pub fn new(handle: InputSourceHandle, global: Global) -> Self {
        Self { handle, global }
    }

    #[instrument(skip(frame))]
    pub async fn handle_frame(&self, frame: &[u8]) {
        let command = Command::decode(frame);

        trace!(command = ?command, "decoded frame");

        match self.global.apply_command(&command).await {
            CommandDisposition::Forward => {
                if let Err(error) = self.handle.send(command) {
                    debug!(error = %error, "no runtime listening");
                }
            }
            CommandDisposition::Drop => {}
        }
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("source", &format!("{}", &*self.handle))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorChannel;
    use crate::global::{GlobalData, InputSourceName};
    use crate::models::{Config, GroupId};

    async fn connection(global: &Global) -> ClientConnection {
        let handle = global
            .register_input_source(InputSourceName::Local { name: "test" })
            .await;
        ClientConnection::new(handle, global.clone())
    }

    #[tokio::test]
    async fn frames_mutate_state_and_broadcast() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut rx = global.subscribe_input().await;
        let connection = connection(&global).await;

        connection.handle_frame(b"sr255").await;

        assert_eq!(
            global.read_state(|state| state.target(GroupId::Square)).await.red,
            255
        );
        assert_eq!(
            *rx.recv().await.unwrap().data(),
            Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 255,
            }
        );
    }

    #[tokio::test]
    async fn unrecognized_frames_are_not_broadcast() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut rx = global.subscribe_input().await;
        let connection = connection(&global).await;

        connection.handle_frame(b"zz").await;
        connection.handle_frame(b"arq").await;

        // The next accepted frame is the first one on the channel
        connection.handle_frame(b"art").await;
        assert_eq!(*rx.recv().await.unwrap().data(), Command::SetAmbient(true));
    }

    #[tokio::test]
    async fn no_state_change_after_shutdown() {
        let global = GlobalData::new(&Config::default()).wrap();
        let connection = connection(&global).await;

        connection.handle_frame(b"kw").await;
        assert!(global.read_state(|state| state.shut_down()).await);

        connection.handle_frame(b"sg123").await;
        connection.handle_frame(b"art").await;

        let (green, ambient) = global
            .read_state(|state| (state.target(GroupId::Square).green, state.ambient()))
            .await;
        assert_eq!(green, 0);
        assert!(!ambient);
    }
}
