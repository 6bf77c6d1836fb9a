//! Timebar - Zoomable time-series bar chart with an overview strip
//!
//! The chart logic lives in `charts` and draws into a retained `scene`; the
//! `gui` module hosts it in an eframe window.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod scene;
