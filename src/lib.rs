//! Vaani - Voice/Text Translation Front-End
//!
//! Orchestrates external speech recognition, machine translation, sentiment
//! classification and text-to-speech into one pipeline, with regex-based
//! dialect rewriting on top.

pub mod cli;
pub mod config;
pub mod detect;
pub mod dialect;
pub mod error;
pub mod history;
pub mod languages;
pub mod pipeline;
pub mod recorder;
pub mod sentiment;
pub mod speech;
pub mod translate;
