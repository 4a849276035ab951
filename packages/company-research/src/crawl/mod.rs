//! Site crawling.

pub mod engine;
pub mod frontier;

pub use engine::CrawlEngine;
pub use frontier::{depth_purpose, parse_indices, FrontierSelector};
