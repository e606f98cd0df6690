pub mod api;
pub mod app;
pub mod collab;
mod components;
pub mod error;
pub mod flows;
pub mod logging;
pub mod models;
pub mod navigation;
mod pages;
pub mod sensor;
pub mod session;
pub mod state;
mod storage;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(app::App);
}
