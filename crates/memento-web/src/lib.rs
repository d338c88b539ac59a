//! Memento Web Frontend
//!
//! Leptos-based WASM frontend: landing page, pricing, the gated dashboard
//! and the Marcus chat.

mod app;
mod pages;
mod components;
mod api;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
