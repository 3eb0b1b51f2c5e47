use std::collections::HashMap;

use crate::api::Command;
use crate::color::RgbwColor;
use crate::models::{Config, GroupId};

/// What the protocol boundary should do with a command it just applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDisposition {
    /// Broadcast the command to the group runtimes
    Forward,
    /// Silent no-op, nothing to broadcast
    Drop,
}

/// Current color and mode state, as reported to display clients
///
/// This is the single shared-state object behind the global lock: the
/// protocol boundary is its only writer, the page renderer its main reader.
/// Group runtimes keep their own copies, fed by the broadcast channel.
#[derive(Debug, Clone)]
pub struct ColorState {
    targets: HashMap<GroupId, RgbwColor>,
    ambient: bool,
    brightness: f32,
    shut_down: bool,
}

impl ColorState {
    pub fn new(config: &Config) -> Self {
        Self {
            targets: config
                .groups
                .iter()
                .map(|group| (group.id, group.color))
                .collect(),
            ambient: false,
            brightness: config.global.ambient.brightness,
            shut_down: false,
        }
    }

    pub fn target(&self, group: GroupId) -> RgbwColor {
        self.targets.get(&group).copied().unwrap_or_default()
    }

    pub fn ambient(&self) -> bool {
        self.ambient
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn apply(&mut self, command: &Command) -> CommandDisposition {
        match *command {
            Command::SetChannel {
                group,
                channel,
                value,
            } => {
                let target = self.target(group).with_channel(channel, value);
                self.targets.insert(group, target);
                CommandDisposition::Forward
            }
            Command::SetAmbient(enable) => {
                self.ambient = enable;
                CommandDisposition::Forward
            }
            Command::SetBrightness(value) => {
                self.brightness = value as f32 / 100.0;
                CommandDisposition::Forward
            }
            Command::Shutdown => {
                self.shut_down = true;
                CommandDisposition::Forward
            }
            Command::Unrecognized => CommandDisposition::Drop,
        }
    }
}
