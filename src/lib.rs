//! draftpilot — an unattended drafting engine for AI-assisted novel
//! writing.
//!
//! The crate drives a remote LLM chat endpoint (`POST <base>/chat/message`)
//! toward a chapter word-count target. Two pieces carry the weight:
//!
//! - [`normalize::normalize`] — best-effort extraction of generated text
//!   from a variably-shaped upstream response;
//! - [`autopilot::AutoPilot`] — the timer-driven loop that repeatedly
//!   generates, filters, and appends prose until the target is reached
//!   or the caller's [`autopilot::StopHandle`] fires.
//!
//! Everything else is supporting cast: prompt templates ([`prompt`]),
//! the HTTP client ([`client`]), the manuscript text ([`document`]),
//! project persistence ([`project`]), and layered configuration
//! ([`config`]).

pub mod autopilot;
pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod project;
pub mod prompt;

pub use autopilot::{AutoPilot, AutoPilotConfig, ProgressEvent, RunOutcome, RunSummary};
pub use client::{ChatClient, ChatClientConfig, ChatRequest, Generate};
pub use document::{count_words, Document};
pub use error::DraftError;
pub use normalize::normalize;
pub use project::{Chapter, Project};
pub use prompt::{build_prompt, Genre, Language, PromptInput, WritingMode};
