use std::fmt::Write;

use async_trait::async_trait;

use super::{DeviceError, DeviceImpl};
use crate::color::RgbwColor;
use crate::models;

/// Log-only output for development and tests
pub struct DummyDevice {
    mode: models::DummyDeviceMode,
    ansi_buf: String,
}

impl DummyDevice {
    pub fn new(config: models::Dummy, _pixel_count: usize) -> Self {
        Self {
            mode: config.mode,
            ansi_buf: String::new(),
        }
    }
}

#[async_trait]
impl DeviceImpl for DummyDevice {
    async fn write(&mut self, led_data: &[RgbwColor]) -> Result<(), DeviceError> {
        match self.mode {
            models::DummyDeviceMode::Text => {
                for (i, led) in led_data.iter().enumerate() {
                    info!(
                        led = %format_args!("{:3}", i),
                        red = %format_args!("{:3}", led.red),
                        green = %format_args!("{:3}", led.green),
                        blue = %format_args!("{:3}", led.blue),
                        white = %format_args!("{:3}", led.white),
                    );
                }
            }

            models::DummyDeviceMode::Ansi => {
                // Rebuild a truecolor ANSI sequence for all pixels; the white
                // channel is folded in additively for the preview
                self.ansi_buf.clear();

                for led in led_data {
                    write!(
                        &mut self.ansi_buf,
                        "\x1B[38;2;{red};{green};{blue}m█",
                        red = led.red.saturating_add(led.white),
                        green = led.green.saturating_add(led.white),
                        blue = led.blue.saturating_add(led.white),
                    )?;
                }

                write!(&mut self.ansi_buf, "\x1B[0m")?;

                info!("{}", &self.ansi_buf);
            }
        }

        Ok(())
    }
}
