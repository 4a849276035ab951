//! Language-model backed implementations.

pub mod profile;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use profile::LlmProfileSummarizer;

#[cfg(feature = "gemini")]
pub use gemini::GeminiModel;
