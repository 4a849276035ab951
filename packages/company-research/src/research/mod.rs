//! Agentic research loop.
//!
//! Plan once, then up to `max_iterations` rounds of
//! investigate -> validate -> check completeness. Findings accumulate across
//! rounds and are never rewritten. Failures of one topic or one finding are
//! logged and skipped; a missing credential, a failed plan or cancellation
//! ends the call with no research at all.

pub mod checker;
pub mod coordinator;
pub mod investigator;
pub mod prompts;
pub mod validator;

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{ResearchError, Result};
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::store::{load_artifact, save_artifact, ArtifactKind, CacheStore};
use crate::types::config::ResearchConfig;
use crate::types::research::{AgenticResearchData, CompanyProfile, ResearchTopic, ValidatedFinding};

pub use checker::{CompletenessChecker, CompletenessVerdict};
pub use coordinator::{Coordinator, TopicPlan};
pub use investigator::Investigator;
pub use validator::{ResolvedCitation, ValidationAnswer, Validator};

pub struct Researcher {
    llm: Arc<dyn LanguageModel>,
    cache: Arc<dyn CacheStore>,
    coordinator: Coordinator,
    investigator: Investigator,
    validator: Validator,
    checker: CompletenessChecker,
    config: ResearchConfig,
}

impl Researcher {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<dyn CacheStore>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            coordinator: Coordinator::new(llm.clone(), &config.model, config.planning_temperature),
            investigator: Investigator::new(
                llm.clone(),
                &config.model,
                config.investigation_temperature,
            ),
            validator: Validator::new(
                llm.clone(),
                fetcher,
                &config.model,
                config.validation_temperature,
            ),
            checker: CompletenessChecker::new(
                llm.clone(),
                &config.model,
                config.validation_temperature,
                config.preview_chars,
            ),
            llm,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Research `domain`. `None` means no research is available.
    pub async fn research(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        bypass_cache: bool,
    ) -> Option<AgenticResearchData> {
        self.research_until(domain, profile, bypass_cache, &CancellationToken::new())
            .await
    }

    /// Like [`Self::research`], aborting when `cancel` fires.
    pub async fn research_until(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        bypass_cache: bool,
        cancel: &CancellationToken,
    ) -> Option<AgenticResearchData> {
        if !bypass_cache {
            if let Some(mut cached) = load_artifact::<AgenticResearchData>(
                self.cache.as_ref(),
                domain,
                ArtifactKind::Research,
            )
            .await
            {
                info!(
                    domain = %domain,
                    findings = cached.validated_findings.len(),
                    "Using cached research"
                );
                cached.cached = Some(true);
                return Some(cached);
            }
        }

        if !self.llm.is_configured() {
            warn!(domain = %domain, "No model credential, skipping research");
            return None;
        }

        match self.run(domain, profile, cancel).await {
            Ok(data) => {
                save_artifact(self.cache.as_ref(), domain, ArtifactKind::Research, &data).await;
                Some(data)
            }
            Err(e) => {
                error!(domain = %domain, error = %e, "Research aborted");
                None
            }
        }
    }

    async fn run(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        cancel: &CancellationToken,
    ) -> Result<AgenticResearchData> {
        let mut topics = cancellable(cancel, self.coordinator.plan(domain, profile)).await?;
        let mut findings: Vec<ValidatedFinding> = Vec::new();
        let max_iterations = self.config.max_iterations.max(1);

        for iteration in 1..=max_iterations {
            info!(domain = %domain, iteration, topics = topics.len(), "Research round starting");

            let round = self.round(domain, profile, &topics, cancel).await?;
            info!(iteration, new_findings = round.len(), "Research round complete");
            findings.extend(round);

            let check = self.checker.check(domain, profile, &findings);
            let verdict = match cancellable(cancel, check).await {
                Ok(verdict) => verdict,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Completeness check failed, finishing with current findings");
                    break;
                }
            };

            if verdict.is_complete {
                info!(iteration, "Research judged complete");
                break;
            }
            if iteration == max_iterations {
                info!(iteration, "Research iteration cap reached");
                break;
            }
            if verdict.next_topics.is_empty() {
                info!(iteration, "No further topics proposed");
                break;
            }
            topics = verdict.next_topics;
        }

        Ok(AgenticResearchData {
            domain: domain.to_string(),
            topics,
            validated_findings: findings,
            cached: None,
        })
    }

    /// Investigate every topic in order, then validate each result.
    async fn round(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        topics: &[ResearchTopic],
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidatedFinding>> {
        let mut results = Vec::new();
        for topic in topics {
            match cancellable(cancel, self.investigator.investigate(domain, profile, topic)).await {
                Ok(result) => results.push(result),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(
                    topic = %topic.topic,
                    error = %e,
                    "Investigation failed, skipping topic"
                ),
            }
        }

        let mut validated = Vec::new();
        for result in &results {
            match cancellable(cancel, self.validator.validate(domain, profile, result)).await {
                Ok(finding) => validated.push(finding),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(
                    topic = %result.topic,
                    error = %e,
                    "Validation failed, dropping finding"
                ),
            }
        }

        Ok(validated)
    }
}

/// Run `fut` unless `cancel` fires first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ResearchError::Cancelled),
        outcome = fut => outcome,
    }
}
