//! `iconlamp` is the Rust crate implementing the core features of a
//! four-icon RGBW lamp controller: per-icon pixel groups driven from a
//! websocket command protocol, an ambient random-hue mode, and a captive
//! portal for standalone operation.

#[macro_use]
extern crate tracing;

pub mod api;
pub mod color;
pub mod global;
pub mod instance;
pub mod models;
pub mod servers;
pub mod status;
pub mod web;
