//! Per-group runtime: animation scheduling and command handling

use std::time::{Duration, Instant};

use rand::{rngs::SmallRng, SeedableRng};
use thiserror::Error;
use tokio::{select, sync::broadcast};

use crate::{
    api::Command,
    color::RgbwColor,
    global::{Global, InputMessage},
    models::{AmbientConfig, GroupConfig},
};

mod ambient;
pub use ambient::{AmbientDriver, AmbientUpdate};

mod animator;
pub use animator::{GroupAnimator, PixelAnimation};

mod device;
pub use device::DeviceError;
use device::*;

/// Duration of the boot fade-in from black to the configured color
const STARTUP_FADE: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
    #[error("recv error: {0}")]
    Recv(#[from] broadcast::error::RecvError),
}

/// One group's runtime task
///
/// Owns the group's animator, output buffer and device, and keeps its own
/// copy of the ambient flag, brightness and target color, fed exclusively
/// by the broadcast command channel. All animation state is therefore
/// mutated on this task only.
pub struct Instance {
    config: GroupConfig,
    ambient_config: AmbientConfig,
    device: InstanceDevice,
    receiver: broadcast::Receiver<InputMessage>,
    animator: GroupAnimator,
    ambient: AmbientDriver<SmallRng>,
    buffer: Vec<RgbwColor>,
    target_color: RgbwColor,
    ambient_enabled: bool,
    ambient_brightness: f32,
}

impl Instance {
    pub async fn new(global: Global, config: GroupConfig) -> Self {
        let ambient_config = global.read_config(|c| c.global.ambient.clone()).await;

        let device: InstanceDevice = Device::new(
            &config.id.to_string(),
            config.device.clone(),
            config.pixel_count,
        )
        .into();

        if let Err(error) = &device.inner {
            error!(
                group = %config.id,
                error = %error,
                "initializing group device failed"
            );
        }

        let receiver = global.subscribe_input().await;

        let (ambient_enabled, ambient_brightness, target_color) = global
            .read_state(|state| (state.ambient(), state.brightness(), state.target(config.id)))
            .await;

        let mut animator = GroupAnimator::new(config.pixel_count);
        let buffer = vec![RgbwColor::BLACK; config.pixel_count];

        // Boot fade-in from black towards the configured color
        let now = Instant::now();
        for pixel in 0..config.pixel_count {
            animator.start_transition(pixel, STARTUP_FADE, RgbwColor::BLACK, target_color, now);
        }

        let ambient = AmbientDriver::new(SmallRng::from_entropy(), &ambient_config);

        Self {
            config,
            ambient_config,
            device,
            receiver,
            animator,
            ambient,
            buffer,
            target_color,
            ambient_enabled,
            ambient_brightness,
        }
    }

    /// One scheduler tick
    ///
    /// In ambient mode the driver decides between advancing and arming; a
    /// flush happens once per tick at most. Outside ambient mode, running
    /// transitions (the boot fade-in) still advance until they retire.
    async fn on_tick(&mut self, now: Instant) -> Result<(), InstanceError> {
        if self.ambient_enabled {
            match self.ambient.tick(
                now,
                self.ambient_brightness,
                &mut self.animator,
                &mut self.buffer,
            ) {
                AmbientUpdate::Advanced => {
                    self.device.flush(&self.buffer).await?;
                }
                AmbientUpdate::Armed(count) => {
                    if count > 0 {
                        trace!(group = %self.config.id, count, "armed ambient transitions");
                    }
                }
            }
        } else if self.animator.is_animating() {
            self.animator.tick(now, &mut self.buffer);
            self.device.flush(&self.buffer).await?;
        }

        Ok(())
    }

    async fn on_input_message(
        &mut self,
        message: InputMessage,
    ) -> Result<InstanceControl, InstanceError> {
        match *message.data() {
            Command::SetChannel {
                group,
                channel,
                value,
            } => {
                if group == self.config.id {
                    // One-shot static set: the whole group shows the target
                    // color right away, bypassing the animator. Running
                    // transitions are not cancelled; in ambient mode their
                    // next tick simply overwrites this.
                    self.target_color = self.target_color.with_channel(channel, value);
                    self.buffer.fill(self.target_color);
                    self.device.flush(&self.buffer).await?;
                }
            }
            Command::SetAmbient(enable) => {
                self.ambient_enabled = enable;
                debug!(group = %self.config.id, enable, "ambient mode");
            }
            Command::SetBrightness(value) => {
                self.ambient_brightness = value as f32 / 100.0;
            }
            Command::Shutdown => {
                return Ok(InstanceControl::Break);
            }
            Command::Unrecognized => {}
        }

        Ok(InstanceControl::Continue)
    }

    #[instrument(skip(self), fields(group = %self.config.id))]
    pub async fn run(mut self) -> Result<(), InstanceError> {
        let mut tick = tokio::time::interval(Duration::from_millis(self.ambient_config.tick_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            select! {
                _ = tick.tick() => {
                    self.on_tick(Instant::now()).await?;
                },
                message = self.receiver.recv() => {
                    trace!(message = ?message, "global msg");

                    match message {
                        Ok(message) => {
                            if InstanceControl::Break == self.on_input_message(message).await? {
                                break Ok(());
                            }
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            // No more input messages
                            break Ok(());
                        },
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped = %skipped, "skipped input messages");
                        },
                    }
                },
            }
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("group", &self.config.id)
            .finish()
    }
}

/// A wrapper for a device that may have failed initializing
struct InstanceDevice {
    inner: Result<Device, DeviceError>,
}

impl InstanceDevice {
    async fn flush(&mut self, led_data: &[RgbwColor]) -> Result<(), DeviceError> {
        if let Ok(device) = &mut self.inner {
            device.flush(led_data).await
        } else {
            Ok(())
        }
    }
}

impl From<Result<Device, DeviceError>> for InstanceDevice {
    fn from(inner: Result<Device, DeviceError>) -> Self {
        Self { inner }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InstanceControl {
    Continue,
    Break,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorChannel;
    use crate::global::GlobalData;
    use crate::models::{Config, GroupId};

    async fn instance(global: &Global, id: GroupId) -> Instance {
        let config = global.read_config(|c| c.group(id).unwrap().clone()).await;
        Instance::new(global.clone(), config).await
    }

    fn message(command: Command) -> InputMessage {
        InputMessage::new(0, command)
    }

    #[tokio::test]
    async fn boot_fade_reaches_the_configured_color() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Circle).await;

        assert!(instance.animator.is_animating());

        instance
            .on_tick(Instant::now() + STARTUP_FADE)
            .await
            .unwrap();

        assert!(!instance.animator.is_animating());
        for pixel in &instance.buffer {
            assert_eq!(*pixel, RgbwColor::new(255, 0, 0, 32));
        }
    }

    #[tokio::test]
    async fn set_channel_is_a_one_shot_static_set() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Square).await;

        let control = instance
            .on_input_message(message(Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Green,
                value: 77,
            }))
            .await
            .unwrap();

        assert_eq!(control, InstanceControl::Continue);
        for pixel in &instance.buffer {
            assert_eq!(*pixel, RgbwColor::new(255, 77, 255, 64));
        }
    }

    #[tokio::test]
    async fn other_groups_commands_are_ignored() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Triangle).await;
        let before = instance.buffer.clone();

        instance
            .on_input_message(message(Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 1,
            }))
            .await
            .unwrap();

        assert_eq!(instance.buffer, before);
    }

    #[tokio::test]
    async fn ambient_flag_and_brightness_follow_commands() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Cross).await;

        instance
            .on_input_message(message(Command::SetAmbient(true)))
            .await
            .unwrap();
        assert!(instance.ambient_enabled);

        instance
            .on_input_message(message(Command::SetBrightness(25)))
            .await
            .unwrap();
        assert!((instance.ambient_brightness - 0.25).abs() < f32::EPSILON);

        instance
            .on_input_message(message(Command::SetAmbient(false)))
            .await
            .unwrap();
        assert!(!instance.ambient_enabled);
    }

    #[tokio::test]
    async fn shutdown_breaks_the_loop() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Square).await;

        assert_eq!(
            instance
                .on_input_message(message(Command::Shutdown))
                .await
                .unwrap(),
            InstanceControl::Break
        );
    }

    #[tokio::test]
    async fn idle_group_outside_ambient_mode_does_not_arm() {
        let global = GlobalData::new(&Config::default()).wrap();
        let mut instance = instance(&global, GroupId::Square).await;

        // Retire the boot fade, then tick again: nothing new may start
        let fade_end = Instant::now() + STARTUP_FADE;
        instance.on_tick(fade_end).await.unwrap();
        instance
            .on_tick(fade_end + Duration::from_millis(100))
            .await
            .unwrap();

        assert!(!instance.animator.is_animating());
    }
}
