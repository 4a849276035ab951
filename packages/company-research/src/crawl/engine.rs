//! Depth-bounded, AI-guided breadth-first crawl of one company site.

use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::frontier::{depth_purpose, FrontierSelector};
use crate::parse::{normalize_url, parse_page, same_site, seed_url, site_host};
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::store::{load_artifact, save_artifact, ArtifactKind, CacheStore};
use crate::types::config::CrawlConfig;
use crate::types::page::{CrawlResult, LinkCandidate};

/// Crawl engine.
///
/// Depth 0 is the seed page. Each following depth offers the not yet
/// visited links of the previous depth to the [`FrontierSelector`] and
/// fetches its choice in parallel batches. Only the seed page's links carry
/// section context.
///
/// The crawl never fails: an unreachable seed yields an empty result with
/// `error` set and every other page failure is dropped. Pages that redirect
/// away from the site are dropped too.
pub struct CrawlEngine {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn CacheStore>,
    selector: FrontierSelector,
    config: CrawlConfig,
}

impl CrawlEngine {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        llm: Arc<dyn LanguageModel>,
        cache: Arc<dyn CacheStore>,
        config: CrawlConfig,
    ) -> Self {
        Self {
            selector: FrontierSelector::new(llm, &config),
            fetcher,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl `domain`, serving a fresh cached result unless `bypass_cache`.
    pub async fn crawl(&self, domain: &str, bypass_cache: bool) -> CrawlResult {
        if !bypass_cache {
            if let Some(cached) =
                load_artifact::<CrawlResult>(self.cache.as_ref(), domain, ArtifactKind::Crawl)
                    .await
            {
                info!(domain = %domain, pages = cached.page_count, "Using cached crawl");
                return cached.into_cached();
            }
        }

        let result = self.run(domain).await;
        save_artifact(self.cache.as_ref(), domain, ArtifactKind::Crawl, &result).await;
        result
    }

    async fn run(&self, domain: &str) -> CrawlResult {
        let started = Instant::now();
        let seed = seed_url(domain);
        info!(
            domain = %domain,
            seed = %seed,
            max_depth = self.config.max_depth,
            timeout_secs = self.config.timeout.as_secs(),
            "Starting crawl"
        );

        let seed_doc = match self.fetcher.fetch(&seed).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Seed fetch failed");
                return CrawlResult::failed(domain, e.to_string());
            }
        };

        // Same-site checks follow wherever the seed redirected to.
        let Some(site) = site_host(&seed_doc.final_url).or_else(|| site_host(&seed)) else {
            return CrawlResult::failed(domain, format!("invalid domain: {}", domain));
        };

        let mut result = CrawlResult::new(domain);
        let mut visited: HashSet<String> = HashSet::new();
        let mut page_keys: HashSet<String> = HashSet::new();

        visited.insert(normalize_url(&seed));
        let seed_key = normalize_url(&seed_doc.final_url);
        visited.insert(seed_key.clone());
        page_keys.insert(seed_key);

        let parsed = parse_page(
            &seed_doc.body,
            &seed_doc.final_url,
            0,
            &site,
            self.config.max_text_chars,
            true,
        );
        result.push_page(parsed.page);

        let mut candidates = parsed.links;
        let mut has_sections = true;

        for depth in 1..=self.config.max_depth {
            let frontier = unvisited(candidates, &visited);
            if frontier.is_empty() {
                info!(depth, "No new links, stopping crawl");
                break;
            }
            if started.elapsed() >= self.config.timeout {
                info!(
                    depth,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Crawl timeout reached"
                );
                break;
            }

            let chosen = self
                .selector
                .select(&frontier, depth_purpose(depth), has_sections)
                .await;
            let to_fetch = unvisited(chosen, &visited);
            if to_fetch.is_empty() {
                info!(depth, "Selector chose no new links, stopping crawl");
                break;
            }
            if started.elapsed() >= self.config.timeout {
                info!(
                    depth,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Crawl timeout reached"
                );
                break;
            }

            info!(
                depth,
                candidates = frontier.len(),
                selected = to_fetch.len(),
                pages_so_far = result.page_count,
                "Processing depth"
            );

            let mut next_links: Vec<LinkCandidate> = Vec::new();

            for batch in to_fetch.chunks(self.config.batch_size.max(1)) {
                for candidate in batch {
                    visited.insert(normalize_url(&candidate.url));
                }

                let fetched = join_all(batch.iter().map(|c| self.fetcher.fetch(&c.url))).await;

                for (candidate, outcome) in batch.iter().zip(fetched) {
                    let doc = match outcome {
                        Ok(doc) => doc,
                        Err(e) => {
                            debug!(
                                url = %candidate.url,
                                error = %e,
                                "Page fetch failed, skipping"
                            );
                            continue;
                        }
                    };

                    let key = normalize_url(&doc.final_url);
                    visited.insert(key.clone());
                    let on_site = Url::parse(&doc.final_url)
                        .map(|u| same_site(&u, &site))
                        .unwrap_or(false);
                    if !on_site {
                        debug!(
                            url = %candidate.url,
                            final_url = %doc.final_url,
                            "Redirected off site, skipping"
                        );
                        continue;
                    }
                    if !page_keys.insert(key) {
                        debug!(url = %doc.final_url, "Redirected to an already crawled page");
                        continue;
                    }

                    let parsed = parse_page(
                        &doc.body,
                        &doc.final_url,
                        depth,
                        &site,
                        self.config.max_text_chars,
                        false,
                    );
                    next_links.extend(parsed.links);
                    result.push_page(parsed.page);
                }
            }

            candidates = next_links;
            has_sections = false;
        }

        info!(
            domain = %domain,
            pages = result.page_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Crawl complete"
        );
        result
    }
}

/// Drop visited links and duplicates (by normalized URL), keeping order.
fn unvisited(links: Vec<LinkCandidate>, visited: &HashSet<String>) -> Vec<LinkCandidate> {
    let mut unique: IndexMap<String, LinkCandidate> = IndexMap::new();
    for link in links {
        let key = normalize_url(&link.url);
        if !visited.contains(&key) {
            unique.entry(key).or_insert(link);
        }
    }
    unique.into_values().collect()
}
