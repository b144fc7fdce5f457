pub mod gemini;
pub mod responses;
