//! Infrastructure implementations for Confab.
//!
//! Concrete adapters behind the ports defined in confab-core: the HTTP
//! persistence gateway, LLM provider clients, attachment ingestion, and
//! configuration loading.

pub mod attachments;
pub mod config;
pub mod http;
pub mod llm;
