//! SPECTRE - multi-view coordination engine
//!
//! A projection scatter, ranked bar charts and a confusion heatmap share
//! one category registry (stable colors), one highlight coordinator
//! (hover and per-dataset selection) and one layout scheduler (coalesced
//! resize passes, persisted split pane). [`state::Dashboard`] wires them
//! together; [`gui`] draws the result with egui.

pub mod catalog;
pub mod config;
pub mod gui;
pub mod heuristics;
pub mod highlight;
pub mod ingest;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod state;
pub mod views;
