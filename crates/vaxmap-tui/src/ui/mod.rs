//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes, text styling and marker glyphs
//! - `splash`: Startup screen with the refresh progress gauge
//! - `centers`: Center list and detail panel

pub mod centers;
pub mod input;
pub mod render;
pub mod splash;
pub mod styles;
