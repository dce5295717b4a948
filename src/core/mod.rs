//! Core orchestration components
//!
//! This module contains the chat engine, the notes knowledge store, and
//! reply synthesis.

mod engine;
mod notes;
pub mod reply;

pub use engine::{ChatEngine, ChatError, ChatRequest};
pub use notes::{NewNote, NoteRecord, NoteStore};
