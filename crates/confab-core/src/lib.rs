//! Business logic and port definitions for Confab.
//!
//! This crate defines the "ports" (the [`gateway::ChatGateway`] persistence
//! trait and the [`llm::provider::LlmProvider`] completion trait) that the
//! infrastructure layer implements, plus the components built on them: the
//! chat synchronization engine, the send flow controller, and the title
//! orchestrator. It depends only on `confab-types` -- never on
//! `confab-infra` or any HTTP/IO crate.

pub mod gateway;
pub mod llm;
pub mod send;
pub mod sync;
pub mod title;
