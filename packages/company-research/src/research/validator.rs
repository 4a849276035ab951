//! Research validator.
//!
//! Resolves each citation's redirect target, then asks the model which
//! citations really concern the target company and to restate the findings
//! from the kept ones. Two rules are enforced on top of the model's answer:
//! citations on the company's own site are always removed, and only URLs
//! that were actually offered can be kept.

use futures::future::join_all;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::prompts::VALIDATE_PROMPT;
use crate::error::Result;
use crate::parse::{normalize_url, seed_url, site_host, within_site};
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::{generate_structured, LanguageModel, LlmRequest, LlmTask};
use crate::types::research::{
    CompanyProfile, Confidence, ResearchResult, UrlAnalysis, UrlVerdict, ValidatedFinding,
    ValidatedUrl,
};

/// Reason recorded when a citation points at the company's own site.
const OWN_SITE_REASON: &str = "Company's own website, not an independent source";

/// Structured answer of the validation call.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationAnswer {
    /// Findings restated from kept sources only
    pub validated_financials: String,

    pub confidence_level: Confidence,

    /// Kept citations
    #[serde(rename = "validatedURLs", default)]
    pub validated_urls: Vec<ValidatedUrl>,

    /// Verdict and reason for every cited URL
    #[serde(default)]
    pub url_analysis: Vec<UrlAnalysis>,
}

/// A citation offered to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCitation {
    /// URI as returned by the search
    pub original: String,

    /// Redirect target, or the original when unresolved
    pub url: String,

    pub title: String,
}

pub struct Validator {
    llm: Arc<dyn LanguageModel>,
    fetcher: Arc<dyn Fetcher>,
    model: String,
    temperature: f32,
}

impl Validator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        fetcher: Arc<dyn Fetcher>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            llm,
            fetcher,
            model: model.into(),
            temperature,
        }
    }

    /// Resolve every citation of a result concurrently.
    pub async fn resolve_citations(&self, result: &ResearchResult) -> Vec<ResolvedCitation> {
        let mut cited: IndexMap<String, String> = IndexMap::new();
        for chunk in &result.grounding_chunks {
            if let Some(web) = &chunk.web {
                cited
                    .entry(web.uri.clone())
                    .or_insert_with(|| web.title.clone().unwrap_or_default());
            }
        }
        for source in &result.sources {
            cited.entry(source.url.clone()).or_insert_with(|| source.title.clone());
        }

        let resolved = join_all(cited.keys().map(|uri| self.fetcher.resolve_redirect(uri))).await;

        cited
            .into_iter()
            .zip(resolved)
            .map(|((original, title), target)| {
                let url = target.unwrap_or_else(|| original.clone());
                if url != original {
                    debug!(from = %original, to = %url, "Citation resolved");
                }
                ResolvedCitation { original, url, title }
            })
            .collect()
    }

    /// Validate one research result against the company's identity.
    pub async fn validate(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        result: &ResearchResult,
    ) -> Result<ValidatedFinding> {
        let citations = self.resolve_citations(result).await;

        let urls = if citations.is_empty() {
            "(none)".to_string()
        } else {
            citations
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    if c.title.is_empty() {
                        format!("{}. {}", i + 1, c.url)
                    } else {
                        format!("{}. {} ({})", i + 1, c.url, c.title)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let prompt = VALIDATE_PROMPT
            .replace("{company_name}", &profile.company_name)
            .replace("{domain}", domain)
            .replace("{short_description}", &profile.short_description)
            .replace("{topic}", &result.topic)
            .replace("{findings}", &result.findings)
            .replace("{urls}", &urls);

        let request = LlmRequest::new(LlmTask::ValidateFinding, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature);
        let answer: ValidationAnswer = generate_structured(self.llm.as_ref(), request).await?;

        let finding = apply_identity_rules(domain, &result.topic, answer, &citations);
        info!(
            topic = %finding.topic,
            confidence = %finding.confidence_level,
            kept = finding.validated_urls.len(),
            analysed = finding.url_analysis.len(),
            "Finding validated"
        );
        Ok(finding)
    }
}

/// Enforce the deterministic identity rules on a model answer.
///
/// Every offered citation on the target's own site or one of its
/// subdomains ends up in `url_analysis` as `remove`. `validated_urls` keeps
/// only offered URLs that are neither on the target's site nor marked
/// `remove`.
pub fn apply_identity_rules(
    domain: &str,
    topic: &str,
    answer: ValidationAnswer,
    citations: &[ResolvedCitation],
) -> ValidatedFinding {
    let target = site_host(&seed_url(domain)).unwrap_or_else(|| domain.to_lowercase());
    let is_own_site = |url: &str| {
        Url::parse(url)
            .map(|u| within_site(&u, &target))
            .unwrap_or(false)
    };

    let offered: HashSet<String> = citations
        .iter()
        .flat_map(|c| [normalize_url(&c.url), normalize_url(&c.original)])
        .collect();

    let mut url_analysis = answer.url_analysis;
    for analysis in &mut url_analysis {
        if is_own_site(&analysis.url) {
            analysis.verdict = UrlVerdict::Remove;
            analysis.reason = OWN_SITE_REASON.to_string();
        }
    }

    let analysed: HashSet<String> = url_analysis.iter().map(|a| normalize_url(&a.url)).collect();
    for citation in citations {
        if is_own_site(&citation.url) && !analysed.contains(&normalize_url(&citation.url)) {
            url_analysis.push(UrlAnalysis {
                url: citation.url.clone(),
                verdict: UrlVerdict::Remove,
                reason: OWN_SITE_REASON.to_string(),
            });
        }
    }

    let removed: HashSet<String> = url_analysis
        .iter()
        .filter(|a| a.verdict == UrlVerdict::Remove)
        .map(|a| normalize_url(&a.url))
        .collect();

    let mut kept = HashSet::new();
    let validated_urls = answer
        .validated_urls
        .into_iter()
        .filter(|v| {
            let key = normalize_url(&v.url);
            offered.contains(&key)
                && !removed.contains(&key)
                && !is_own_site(&v.url)
                && kept.insert(key)
        })
        .collect();

    ValidatedFinding {
        topic: topic.to_string(),
        validated_financials: answer.validated_financials,
        confidence_level: answer.confidence_level,
        validated_urls,
        url_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(url: &str) -> ResolvedCitation {
        ResolvedCitation {
            original: format!("https://redirect.example/{}", url.len()),
            url: url.to_string(),
            title: String::new(),
        }
    }

    fn answer(keep: &[&str], analysis: &[(&str, UrlVerdict)]) -> ValidationAnswer {
        ValidationAnswer {
            validated_financials: "Revenue 12M (2023)".into(),
            confidence_level: Confidence::Medium,
            validated_urls: keep
                .iter()
                .map(|u| ValidatedUrl {
                    url: u.to_string(),
                    title: "t".into(),
                })
                .collect(),
            url_analysis: analysis
                .iter()
                .map(|(u, v)| UrlAnalysis {
                    url: u.to_string(),
                    verdict: *v,
                    reason: "model".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_own_site_forced_to_remove() {
        let citations = vec![
            citation("https://www.acme.com/about"),
            citation("https://news.example/acme"),
        ];
        let finding = apply_identity_rules(
            "acme.com",
            "Revenue",
            answer(
                &["https://www.acme.com/about", "https://news.example/acme"],
                &[
                    ("https://www.acme.com/about", UrlVerdict::Keep),
                    ("https://news.example/acme", UrlVerdict::Keep),
                ],
            ),
            &citations,
        );

        assert_eq!(finding.topic, "Revenue");
        assert_eq!(finding.validated_urls.len(), 1);
        assert_eq!(finding.validated_urls[0].url, "https://news.example/acme");
        let own = finding
            .url_analysis
            .iter()
            .find(|a| a.url.contains("acme.com"))
            .unwrap();
        assert_eq!(own.verdict, UrlVerdict::Remove);
    }

    #[test]
    fn test_unanalysed_own_site_citation_is_added_as_remove() {
        let citations = vec![citation("https://acme.com/")];
        let finding = apply_identity_rules("acme.com", "t", answer(&[], &[]), &citations);
        assert_eq!(finding.url_analysis.len(), 1);
        assert_eq!(finding.url_analysis[0].verdict, UrlVerdict::Remove);
    }

    #[test]
    fn test_company_subdomains_count_as_own_site() {
        let citations = vec![
            citation("https://ir.acme.com/annual-report"),
            citation("https://investors.acme.com/q3"),
            citation("https://news.example/acme"),
        ];
        let finding = apply_identity_rules(
            "acme.com",
            "Revenue",
            answer(
                &[
                    "https://ir.acme.com/annual-report",
                    "https://investors.acme.com/q3",
                    "https://news.example/acme",
                ],
                &[("https://ir.acme.com/annual-report", UrlVerdict::Keep)],
            ),
            &citations,
        );

        let urls: Vec<_> = finding.validated_urls.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["https://news.example/acme"]);
        assert_eq!(finding.url_analysis.len(), 2);
        assert!(finding
            .url_analysis
            .iter()
            .all(|a| a.verdict == UrlVerdict::Remove && a.reason == OWN_SITE_REASON));
    }

    #[test]
    fn test_only_offered_and_kept_urls_survive() {
        let citations = vec![
            citation("https://news.example/a"),
            citation("https://news.example/b"),
        ];
        let finding = apply_identity_rules(
            "acme.com",
            "t",
            answer(
                &[
                    "https://news.example/a",
                    "https://news.example/b",
                    "https://invented.example/x",
                    "https://news.example/a/",
                ],
                &[("https://news.example/b", UrlVerdict::Remove)],
            ),
            &citations,
        );
        let urls: Vec<_> = finding.validated_urls.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["https://news.example/a"]);
    }
}
