//! Minimal Gemini `generateContent` client for "look at this screenshot"
//! prompts.
//!
//! Only the single-turn, text + one inline PNG shape is supported. The
//! answer is returned as plain text; interpreting it is the caller's job.

mod client;
mod config;
mod message;

pub use client::{GeminiClient, encode_png, parse_answer};
pub use config::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GeminiConfig};
pub use message::{GenerateRequest, GenerateResponse};

/// Crate-wide result type.
pub type GeminiResult<T> = anyhow::Result<T>;
