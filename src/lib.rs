//! pocket-assist — context-aware Python coding assistant.
//!
//! ARCHITECTURE
//! ============
//! `settings` persists the API key and behavior flags, `context` turns an
//! editor buffer into a [`context::CodeContext`] snapshot, `ai` builds the
//! prompt, calls Gemini and parses the reply, and `session` keeps the
//! conversation transcript the user sees.

pub mod ai;
pub mod context;
pub mod error;
pub mod session;
pub mod settings;
