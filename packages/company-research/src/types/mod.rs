//! Data types passed between pipeline stages.

pub mod config;
pub mod page;
pub mod research;
