//! nexuslearn-core: quiz catalog, session engine, scores and AI flow contracts.
//!
//! This crate holds everything that does not touch the network or the terminal:
//! the static subject/quiz catalog, the quiz session state machine, the score
//! persistence port, and the schema-validated contracts the CLI uses to talk
//! to an LLM through the [`traits::LlmProvider`] seam.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod explain;
pub mod model;
pub mod recommend;
pub mod scores;
pub mod session;
pub mod traits;
