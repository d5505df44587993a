pub mod api;
pub mod cli;
pub mod conversation;
pub mod core;
pub mod gemini;
pub mod prompt;
pub mod roles;
