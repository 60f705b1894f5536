//! ReplyWise: email reply drafting service.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
