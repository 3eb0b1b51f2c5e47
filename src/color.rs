//! Color value types for the RGBW pixel groups

use palette::{FromColor, Hsl, Srgb};
use serde_derive::{Deserialize, Serialize};

/// Additive 4-channel color as sent to the pixel hardware
///
/// Channels are independent: the white channel is not derived from the RGB
/// channels and survives blending unchanged like any other channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RgbwColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl RgbwColor {
    pub const BLACK: Self = Self::new(0, 0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Interpolate between `a` and `b` at `progress` in [0, 1]
    ///
    /// Each channel is computed as `a + (b - a) * progress`, rounded to the
    /// nearest integer and clamped to the channel range. `progress == 0.0`
    /// returns `a` exactly and `progress == 1.0` returns `b` exactly.
    pub fn linear_blend(a: Self, b: Self, progress: f32) -> Self {
        fn channel(a: u8, b: u8, progress: f32) -> u8 {
            (a as f32 + (b as f32 - a as f32) * progress)
                .round()
                .clamp(0.0, 255.0) as u8
        }

        Self {
            red: channel(a.red, b.red, progress),
            green: channel(a.green, b.green, progress),
            blue: channel(a.blue, b.blue, progress),
            white: channel(a.white, b.white, progress),
        }
    }

    /// Update one channel, leaving the others untouched
    pub fn with_channel(self, channel: ColorChannel, value: u8) -> Self {
        let mut color = self;
        match channel {
            ColorChannel::Red => color.red = value,
            ColorChannel::Green => color.green = value,
            ColorChannel::Blue => color.blue = value,
            ColorChannel::White => color.white = value,
        }
        color
    }

    pub fn channel(self, channel: ColorChannel) -> u8 {
        match channel {
            ColorChannel::Red => self.red,
            ColorChannel::Green => self.green,
            ColorChannel::Blue => self.blue,
            ColorChannel::White => self.white,
        }
    }
}

/// One of the four channels of an [RgbwColor]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    White,
}

/// Hue/saturation/lightness color, hue normalized to [0, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HslColor {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

impl From<HslColor> for RgbwColor {
    /// Lossy conversion: the white channel of the result is always 0, since
    /// HSL carries no information about it.
    fn from(hsl: HslColor) -> Self {
        let rgb = Srgb::from_color(Hsl::new_srgb(
            hsl.hue * 360.0,
            hsl.saturation,
            hsl.lightness,
        ));

        let (red, green, blue) = rgb.into_format::<u8>().into_components();
        Self::new(red, green, blue, 0)
    }
}
