//! Showroom - a native glTF viewer with clickable area drawers.
//!
//! Loads one textured model, lights it with a procedural room environment,
//! and opens a drawer panel for whichever named area the user clicks.

mod app;
mod assets;
mod config;
mod render;
mod scene;
mod ui;

fn main() {
    app::run();
}
