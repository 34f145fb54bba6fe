//! All AI/LLM functionality

pub mod classifier;
pub mod client;

// Re-export main types for convenience
pub use classifier::{Classifier, HttpClassifier};
pub use client::{Completer, Completion, CompletionRequest, OpenAiCompleter, estimate_tokens};
