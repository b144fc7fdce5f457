// Gemini mapper module
// Antigravity v1internal wrapping and the contents leak check

pub mod leak_guard;
pub mod models;
pub mod wrapper;

pub use wrapper::*;
