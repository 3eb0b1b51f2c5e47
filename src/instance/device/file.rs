use std::{fmt::Write, time};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs::File, io::AsyncWriteExt};

use super::{DeviceError, DeviceImpl};
use crate::color::RgbwColor;
use crate::models;

/// Appends one line per flush to a file, for tracing what the hardware saw
pub struct FileDevice {
    print_timestamp: bool,
    file_handle: File,
    last_write_time: time::Instant,
    str_buf: String,
}

impl FileDevice {
    pub fn new(config: &models::File) -> Result<Self, DeviceError> {
        let file_handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.output)?;

        Ok(Self {
            print_timestamp: config.print_time_stamp,
            file_handle: File::from_std(file_handle),
            last_write_time: time::Instant::now(),
            str_buf: String::new(),
        })
    }
}

#[async_trait]
impl DeviceImpl for FileDevice {
    async fn write(&mut self, led_data: &[RgbwColor]) -> Result<(), DeviceError> {
        self.str_buf.clear();

        if self.print_timestamp {
            // Prepend timestamp
            let now = Utc::now();
            let elapsed_time_ms = self.last_write_time.elapsed().as_millis();
            self.last_write_time = time::Instant::now();

            write!(self.str_buf, "{} | +{}", now, elapsed_time_ms)?;
        }

        write!(self.str_buf, " [")?;
        for led in led_data {
            write!(
                self.str_buf,
                "{{{},{},{},{}}}",
                led.red, led.green, led.blue, led.white
            )?;
        }
        writeln!(self.str_buf, "]")?;

        self.file_handle.write_all(self.str_buf.as_bytes()).await?;
        self.file_handle.flush().await?;

        Ok(())
    }
}
