//! Minimal client for Ollama's non-streaming chat endpoint

mod client;
pub use client::*;
