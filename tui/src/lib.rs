//! maposter TUI - Terminal surface for the poster studio
//!
//! A full-screen terminal UI over `studio-core`: an input form for city,
//! country, theme, and radius; a live transcript of the engine's progress;
//! and a half-block preview of the finished poster.
//!
//! # Architecture
//!
//! - **StudioClient**: embeds the headless studio, no network involved
//! - **DisplayState**: pure render model folded from `StudioMessage`s
//! - **FormState**: the request form's focus/editing state machine
//! - **Widgets**: bottom-anchored transcript block, half-block image block

pub mod app;
pub mod display;
pub mod form;
pub mod palette;
pub mod studio_client;
pub mod widgets;

pub use app::App;
