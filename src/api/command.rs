use crate::color::ColorChannel;
use crate::models::GroupId;

/// A decoded control frame
///
/// The wire grammar is positional ASCII: byte 0 picks the target, byte 1 a
/// sub-selector, the rest is a base-10 value where the command takes one.
/// The byte-0 table is part of the page contract and must not be
/// "simplified": `a` (ambient toggle) addresses with three bytes while `r`
/// (brightness) takes a two-byte selector plus a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set one channel of a group's target color and redisplay it statically
    SetChannel {
        group: GroupId,
        channel: ColorChannel,
        value: u8,
    },
    /// Enable or disable the ambient animation mode
    SetAmbient(bool),
    /// Set the ambient brightness as a 0-100 percentage
    SetBrightness(u8),
    /// Tear down the control link; terminal for the process
    Shutdown,
    /// Anything else, including frames too short for their shape
    Unrecognized,
}

/// Parse a run of ASCII digits, stopping at the first non-digit
///
/// An empty run is 0, like the original `strtol` on a non-numeric tail.
/// Values wider than a channel saturate at 255.
fn parse_value(bytes: &[u8]) -> u8 {
    let mut value: u32 = 0;

    for byte in bytes {
        if !byte.is_ascii_digit() {
            break;
        }

        value = value.saturating_mul(10) + (byte - b'0') as u32;
    }

    value.min(255) as u8
}

fn channel(byte: u8) -> Option<ColorChannel> {
    match byte {
        b'r' => Some(ColorChannel::Red),
        b'g' => Some(ColorChannel::Green),
        b'b' => Some(ColorChannel::Blue),
        b'w' => Some(ColorChannel::White),
        _ => None,
    }
}

fn group(byte: u8) -> Option<GroupId> {
    GroupId::ALL
        .iter()
        .copied()
        .find(|id| id.command_byte() == byte)
}

impl Command {
    /// Decode a raw frame; never fails, unknown shapes are [Unrecognized](Self::Unrecognized)
    pub fn decode(frame: &[u8]) -> Self {
        match *frame {
            // Shutdown is the only two-byte frame
            [b'k', b'w', ..] => Self::Shutdown,
            // Ambient toggle addresses with three bytes; value digits ignored
            [b'a', b'r', b't', ..] => Self::SetAmbient(true),
            [b'a', b'r', b'f', ..] => Self::SetAmbient(false),
            // Brightness percentage
            [b'r', b'b', ref value @ ..] if !value.is_empty() => {
                Self::SetBrightness(parse_value(value))
            }
            // Per-group channel set
            [group_byte, channel_byte, ref value @ ..] if !value.is_empty() => {
                match (group(group_byte), channel(channel_byte)) {
                    (Some(group), Some(channel)) => Self::SetChannel {
                        group,
                        channel,
                        value: parse_value(value),
                    },
                    _ => Self::Unrecognized,
                }
            }
            _ => Self::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_set_frames() {
        assert_eq!(
            Command::decode(b"sr255"),
            Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 255,
            }
        );
        assert_eq!(
            Command::decode(b"cg0"),
            Command::SetChannel {
                group: GroupId::Circle,
                channel: ColorChannel::Green,
                value: 0,
            }
        );
        assert_eq!(
            Command::decode(b"xb100"),
            Command::SetChannel {
                group: GroupId::Cross,
                channel: ColorChannel::Blue,
                value: 100,
            }
        );
        assert_eq!(
            Command::decode(b"tw32"),
            Command::SetChannel {
                group: GroupId::Triangle,
                channel: ColorChannel::White,
                value: 32,
            }
        );
    }

    #[test]
    fn value_parse_stops_at_first_non_digit() {
        assert_eq!(
            Command::decode(b"sr12x9"),
            Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 12,
            }
        );
        // Non-numeric value reads as 0, like strtol did
        assert_eq!(
            Command::decode(b"srFF"),
            Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 0,
            }
        );
    }

    #[test]
    fn wide_values_saturate() {
        assert_eq!(
            Command::decode(b"sr999999999999"),
            Command::SetChannel {
                group: GroupId::Square,
                channel: ColorChannel::Red,
                value: 255,
            }
        );
    }

    #[test]
    fn ambient_toggle_uses_byte_two() {
        assert_eq!(Command::decode(b"art"), Command::SetAmbient(true));
        assert_eq!(Command::decode(b"arf"), Command::SetAmbient(false));
        // Trailing bytes are ignored for the toggle
        assert_eq!(Command::decode(b"art123"), Command::SetAmbient(true));
        assert_eq!(Command::decode(b"arx"), Command::Unrecognized);
    }

    #[test]
    fn brightness_frame() {
        assert_eq!(Command::decode(b"rb50"), Command::SetBrightness(50));
        assert_eq!(Command::decode(b"rb0"), Command::SetBrightness(0));
    }

    #[test]
    fn shutdown_frame() {
        assert_eq!(Command::decode(b"kw"), Command::Shutdown);
        // The original shutdown frame carries no value but longer frames
        // still address the same command
        assert_eq!(Command::decode(b"kw0"), Command::Shutdown);
    }

    #[test]
    fn short_frames_are_unrecognized() {
        assert_eq!(Command::decode(b""), Command::Unrecognized);
        assert_eq!(Command::decode(b"s"), Command::Unrecognized);
        assert_eq!(Command::decode(b"sr"), Command::Unrecognized);
        assert_eq!(Command::decode(b"ar"), Command::Unrecognized);
        assert_eq!(Command::decode(b"rb"), Command::Unrecognized);
        assert_eq!(Command::decode(b"k"), Command::Unrecognized);
    }

    #[test]
    fn unknown_selectors_are_unrecognized() {
        assert_eq!(Command::decode(b"zz12"), Command::Unrecognized);
        assert_eq!(Command::decode(b"sq12"), Command::Unrecognized);
        assert_eq!(Command::decode(b"kq"), Command::Unrecognized);
    }
}
