//! HTML parsing and URL normalization.

pub mod html;
pub mod normalize;

pub use html::{classify_section, parse_page, ParsedPage};
pub use normalize::{normalize_url, same_site, seed_url, site_host, within_site};
