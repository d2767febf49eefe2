//! Rendering and highlighting pipeline for live memcache debug traces.
//!
//! The crate takes decoded protocol events, renders each into a colorized
//! text block, optionally filters/highlights it against a search pattern,
//! and streams the result to a terminal. Channel discovery and wire-level
//! decoding live in the `mctail` binary; this crate only consumes the
//! decoded [`event::MessageEvent`]s it is handed.

pub mod color;
pub mod config;
pub mod event;
pub mod highlight;
pub mod pattern;
pub mod pipeline;
pub mod render;
pub mod sink;
pub mod styled;
pub mod util;
pub mod value;
