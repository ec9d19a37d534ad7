//! "The Second Opinion" — an advice-column web service.
//!
//! A small axum application that forwards reader questions to a hosted
//! language model under a fixed columnist persona and relays the answer
//! back, either whole or as a server-sent event stream, with an optional
//! spoken rendition via the `tts` crate.

pub mod logging;
pub mod persona;
pub mod web;

pub use logging::init_logging;
pub use persona::Persona;
pub use web::{AppState, app};
