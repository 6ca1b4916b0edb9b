//! Controlled-substance compliance decisions and regulatory knowledge retrieval.
//!
//! [`decisions`] evaluates evidence against versioned rule tables and explains the
//! outcome; [`knowledge`] answers regulatory questions from an embedded knowledge
//! base and escalates low-confidence lookups to human review.

pub mod config;
pub mod decisions;
pub mod error;
pub mod knowledge;
