//! Generative-language client and quiz prompt

pub mod client;
pub mod prompt;

pub use client::{ContentGenerator, GeminiClient, StructuredRequest};
