//! Schedules meetings from free-text requests: a local model extracts
//! the meeting fields, Google Calendar gets the event and Gmail sends
//! the invitations.

pub mod ai;
pub mod api;
pub mod cli;
pub mod core;
pub mod google;
pub mod meeting;
pub mod ollama;
