//! Control page token substitution
//!
//! The page carries `%XY%` tokens standing for current state values. `X`
//! selects a group (or a global setting), `Y` a channel.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::color::ColorChannel;
use crate::global::ColorState;
use crate::models::GroupId;

lazy_static! {
    static ref TOKEN: Regex = Regex::new("%([A-Z]{2})%").unwrap();
}

/// Substitute all state tokens in `page`, leaving the rest untouched
pub fn substitute(page: &str, state: &ColorState) -> String {
    TOKEN
        .replace_all(page, |caps: &Captures| {
            token_value(&caps[1], state).unwrap_or_default()
        })
        .into_owned()
}

fn token_value(token: &str, state: &ColorState) -> Option<String> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let second = chars.next()?;

    match (first, second) {
        ('A', 'R') => Some(if state.ambient() {
            "checked".to_owned()
        } else {
            " ".to_owned()
        }),
        ('R', 'B') => Some(((state.brightness() * 100.0).round() as u32).to_string()),
        _ => {
            let group = *GroupId::ALL
                .iter()
                .find(|group| group.token_prefix() == first)?;
            let channel = match second {
                'R' => ColorChannel::Red,
                'G' => ColorChannel::Green,
                'B' => ColorChannel::Blue,
                'W' => ColorChannel::White,
                _ => return None,
            };

            Some(state.target(group).channel(channel).to_string())
        }
    }
}
