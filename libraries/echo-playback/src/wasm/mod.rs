//! WASM bindings for echo-playback
//!
//! Drives a browser `HTMLAudioElement` from the playback controller and
//! exposes the controller to JavaScript.

#[cfg(feature = "wasm")]
pub mod media;

#[cfg(feature = "wasm")]
pub mod controller;

#[cfg(feature = "wasm")]
pub use controller::WasmPlaybackController;

#[cfg(feature = "wasm")]
pub use media::HtmlMediaElement;
