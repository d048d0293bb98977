//! Shared domain types for Confab.
//!
//! This crate contains the core domain types used across the Confab client:
//! chat sessions, messages, attachments, LLM request/response shapes, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod attachment;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod message;
