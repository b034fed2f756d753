//! Core of the strain viewer: parsing of distributed strain-sensing exports,
//! the tare / zeroing / range transform pipeline, locked comparison curves,
//! playback, the point overlay join and spreadsheet export.
//!
//! Rendering lives in the binary and only consumes [`state::PlotFrame`] and
//! [`data::points::OverlayPoint`] values produced here.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod playback;
pub mod state;
