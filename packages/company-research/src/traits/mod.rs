//! Core trait abstractions.
//!
//! These traits define the seams the pipeline is assembled from: model
//! access, HTTP fetching, artifact caching and profile summarization.

pub mod fetcher;
pub mod llm;
pub mod store;
pub mod summarizer;
