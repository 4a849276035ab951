//! Research types - topics, raw results, validated findings, and the
//! aggregate research bundle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of a research topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// A topic the loop should investigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchTopic {
    /// What to find out
    pub topic: String,

    /// How much it matters for the report
    pub priority: Priority,

    /// Why it is needed
    pub reason: String,
}

impl ResearchTopic {
    /// Create a new topic.
    pub fn new(topic: impl Into<String>, priority: Priority, reason: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            priority,
            reason: reason.into(),
        }
    }
}

/// A cited source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Web citation attached to a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebSource {
    /// Citation URL, usually an unresolved search-provider redirect
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One grounding chunk of a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

impl GroundingChunk {
    /// Create a web chunk.
    pub fn web(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            web: Some(WebSource {
                uri: uri.into(),
                title,
            }),
        }
    }
}

/// Raw output of one topic investigation, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub topic: String,
    pub findings: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// Confidence the validator places in a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// Keep or remove decision for one citation URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UrlVerdict {
    Keep,
    Remove,
}

/// A citation URL that survived identity validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidatedUrl {
    pub url: String,
    pub title: String,
}

/// Per-URL rationale from identity validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UrlAnalysis {
    pub url: String,
    pub verdict: UrlVerdict,
    pub reason: String,
}

/// A research result after identity validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedFinding {
    /// Topic the finding answers
    #[serde(default)]
    pub topic: String,

    /// Consolidated financial / reputation facts
    pub validated_financials: String,

    pub confidence_level: Confidence,

    /// Citations attributed to the target company
    #[serde(rename = "validatedURLs", default)]
    pub validated_urls: Vec<ValidatedUrl>,

    /// Keep/remove rationale for every citation considered
    #[serde(default)]
    pub url_analysis: Vec<UrlAnalysis>,
}

/// Final deliverable of the research loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenticResearchData {
    pub domain: String,

    /// Topics of the last round
    #[serde(default)]
    pub topics: Vec<ResearchTopic>,

    /// Findings of every round, in order
    #[serde(default)]
    pub validated_findings: Vec<ValidatedFinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

/// Company profile produced by the summarizer from a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Legal or trading name
    pub company_name: String,

    /// One or two sentences on what the company does
    pub short_description: String,

    /// Longer overview of the business
    #[serde(default)]
    pub overview: String,

    /// Concrete facts stated on the company's own site
    #[serde(default)]
    pub key_facts: Vec<String>,
}

impl CompanyProfile {
    /// Create a profile with a name and short description.
    pub fn new(company_name: impl Into<String>, short_description: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            short_description: short_description.into(),
            ..Default::default()
        }
    }

    /// Set the overview.
    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    /// Add a key fact.
    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.key_facts.push(fact.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_finding_wire_names() {
        let finding = ValidatedFinding {
            topic: "revenue".into(),
            validated_financials: "Revenue 10M".into(),
            confidence_level: Confidence::Medium,
            validated_urls: vec![ValidatedUrl {
                url: "https://news.example/acme".into(),
                title: "Acme news".into(),
            }],
            url_analysis: vec![UrlAnalysis {
                url: "https://news.example/acme".into(),
                verdict: UrlVerdict::Keep,
                reason: "About Acme".into(),
            }],
        };

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["validatedFinancials"], "Revenue 10M");
        assert_eq!(json["confidenceLevel"], "medium");
        assert_eq!(json["validatedURLs"][0]["url"], "https://news.example/acme");
        assert_eq!(json["urlAnalysis"][0]["verdict"], "keep");
    }

    #[test]
    fn test_grounding_chunk_without_web() {
        let chunk: GroundingChunk = serde_json::from_str("{}").unwrap();
        assert!(chunk.web.is_none());

        let chunk: GroundingChunk =
            serde_json::from_str(r#"{"web": {"uri": "https://r.example/x"}}"#).unwrap();
        assert_eq!(chunk.web.unwrap().uri, "https://r.example/x");
    }

    #[test]
    fn test_topic_parses_priority() {
        let topic: ResearchTopic = serde_json::from_str(
            r#"{"topic": "Headcount", "priority": "high", "reason": "Needed for size section"}"#,
        )
        .unwrap();
        assert_eq!(topic.priority, Priority::High);
        assert_eq!(topic.priority.to_string(), "high");
    }
}
