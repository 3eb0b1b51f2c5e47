use async_trait::async_trait;
use thiserror::Error;

use crate::color::RgbwColor;
use crate::models;

// Device implementation modules

mod dummy;
mod file;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("format error: {0}")]
    Format(#[from] std::fmt::Error),
}

#[async_trait]
trait DeviceImpl: Send {
    /// Push the given colors to the physical output
    ///
    /// Implementations may assume `led_data.len()` equals the group's pixel
    /// count; the [Device] wrapper guarantees it.
    async fn write(&mut self, led_data: &[RgbwColor]) -> Result<(), DeviceError>;
}

/// One group's physical output channel
pub struct Device {
    name: String,
    inner: Box<dyn DeviceImpl>,
}

impl Device {
    fn build_inner(
        config: models::Device,
        pixel_count: usize,
    ) -> Result<Box<dyn DeviceImpl>, DeviceError> {
        let inner: Box<dyn DeviceImpl> = match config {
            models::Device::Dummy(dummy) => Box::new(dummy::DummyDevice::new(dummy, pixel_count)),
            models::Device::File(file) => Box::new(file::FileDevice::new(&file)?),
        };

        Ok(inner)
    }

    pub fn new(
        name: &str,
        config: models::Device,
        pixel_count: usize,
    ) -> Result<Self, DeviceError> {
        let inner = Self::build_inner(config, pixel_count)?;

        Ok(Self {
            name: name.to_owned(),
            inner,
        })
    }

    /// Flush the group's output buffer to the hardware
    #[instrument(skip(led_data))]
    pub async fn flush(&mut self, led_data: &[RgbwColor]) -> Result<(), DeviceError> {
        self.inner.write(led_data).await
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("name", &self.name).finish()
    }
}
