//! OpenAI-compatible chat completions provider.

mod client;
mod types;

pub use client::OpenAiCompatProvider;
