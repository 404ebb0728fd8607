//! Export fast buffer compression files for the sequence cameras of a
//! matchmove scene.
//!
//! The [`engine`] plans and runs the exports against any [`host::Host`];
//! [`host::scene::SceneHost`] reads scenes from JSON and [`ui`] renders the
//! interactive dialogs in the terminal.

pub mod config;
pub mod engine;
pub mod host;
pub mod ui;
