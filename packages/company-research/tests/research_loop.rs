//! Research loop behaviour with scripted model answers.

use company_research::testing::{MockFetcher, MockLanguageModel};
use company_research::traits::store::CacheStore;
use company_research::types::research::GroundingChunk;
use company_research::{
    AgenticResearchData, ArtifactKind, CompanyProfile, LlmResponse, LlmTask, MemoryCacheStore,
    ResearchConfig, Researcher, UrlVerdict,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const PLAN: &str = r#"{"topics": [
    {"topic": "Annual revenue", "priority": "high", "reason": "Financials section"},
    {"topic": "Headcount", "priority": "medium", "reason": "Size section"}
]}"#;

const VALIDATION: &str = r#"{
    "validatedFinancials": "Revenue of 12M USD in 2023.",
    "confidenceLevel": "high",
    "validatedURLs": [
        {"url": "https://news.example/acme", "title": "Acme posts record year"},
        {"url": "https://www.acme.com/about", "title": "About Acme"}
    ],
    "urlAnalysis": [
        {"url": "https://news.example/acme", "verdict": "keep", "reason": "Reports on Acme"},
        {"url": "https://www.acme.com/about", "verdict": "keep", "reason": "Official page"}
    ]
}"#;

const INCOMPLETE: &str = r#"{"isComplete": false, "reasoning": "Credit data missing",
    "nextTopics": [{"topic": "Credit rating", "priority": "high", "reason": "Risk section"}]}"#;

const COMPLETE: &str = r#"{"isComplete": true, "reasoning": "Enough for the report", "nextTopics": []}"#;

fn profile() -> CompanyProfile {
    CompanyProfile::new("Acme Corp", "Acme builds steel bridges.")
}

fn grounded_answer() -> LlmResponse {
    LlmResponse::text("Acme reported revenue of 12M USD in 2023.").with_grounding(vec![
        GroundingChunk::web("https://search.example/redirect/1", Some("news.example".into())),
        GroundingChunk::web("https://search.example/redirect/2", Some("acme.com".into())),
    ])
}

fn fetcher() -> Arc<MockFetcher> {
    Arc::new(
        MockFetcher::new()
            .with_redirect("https://search.example/redirect/1", "https://news.example/acme")
            .with_redirect("https://search.example/redirect/2", "https://www.acme.com/about"),
    )
}

/// A model that answers every stage; the checker says `checker`.
fn model(checker: &str) -> MockLanguageModel {
    MockLanguageModel::new()
        .with_response(LlmTask::PlanTopics, PLAN)
        .with_default(LlmTask::Investigate, grounded_answer())
        .with_default(LlmTask::ValidateFinding, LlmResponse::text(VALIDATION))
        .with_default(LlmTask::CheckCompleteness, LlmResponse::text(checker))
}

fn researcher(
    llm: Arc<MockLanguageModel>,
    cache: Arc<MemoryCacheStore>,
    config: ResearchConfig,
) -> Researcher {
    Researcher::new(llm, fetcher(), cache, config)
}

#[tokio::test]
async fn test_loop_stops_at_iteration_cap() {
    let llm = Arc::new(model(INCOMPLETE));
    let cache = Arc::new(MemoryCacheStore::new());
    let researcher = researcher(llm.clone(), cache.clone(), ResearchConfig::default());

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    // Two planned topics, then the checker's one
    assert_eq!(llm.call_count(LlmTask::PlanTopics), 1);
    assert_eq!(llm.call_count(LlmTask::Investigate), 3);
    assert_eq!(llm.call_count(LlmTask::ValidateFinding), 3);
    assert_eq!(llm.call_count(LlmTask::CheckCompleteness), 2);

    assert_eq!(data.domain, "acme.com");
    assert_eq!(data.validated_findings.len(), 3);
    assert_eq!(data.topics.len(), 1);
    assert_eq!(data.topics[0].topic, "Credit rating");
    assert_eq!(data.cached, None);
    assert!(cache.contains("acme.com", ArtifactKind::Research));
}

#[tokio::test]
async fn test_findings_are_append_only() {
    let one_round = researcher(
        Arc::new(model(INCOMPLETE)),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default().with_max_iterations(1),
    )
    .research("acme.com", &profile(), false)
    .await
    .unwrap();

    let two_rounds = researcher(
        Arc::new(model(INCOMPLETE)),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    )
    .research("acme.com", &profile(), false)
    .await
    .unwrap();

    let first = &one_round.validated_findings;
    assert_eq!(first.len(), 2);
    assert!(two_rounds.validated_findings.len() > first.len());
    assert_eq!(&two_rounds.validated_findings[..first.len()], first.as_slice());
    assert_eq!(first[0].topic, "Annual revenue");
    assert_eq!(first[1].topic, "Headcount");
}

#[tokio::test]
async fn test_complete_verdict_ends_after_one_round() {
    let llm = Arc::new(model(COMPLETE));
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    assert_eq!(llm.call_count(LlmTask::Investigate), 2);
    assert_eq!(llm.call_count(LlmTask::CheckCompleteness), 1);
    assert_eq!(data.topics.len(), 2);
    assert_eq!(data.validated_findings.len(), 2);
}

#[tokio::test]
async fn test_target_domain_citations_are_removed() {
    let fetcher = fetcher();
    let llm = Arc::new(model(COMPLETE));
    let researcher = Researcher::new(
        llm,
        fetcher.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    for finding in &data.validated_findings {
        let own = finding
            .url_analysis
            .iter()
            .find(|a| a.url == "https://www.acme.com/about")
            .expect("own-site citation analysed");
        assert_eq!(own.verdict, UrlVerdict::Remove);

        let kept: Vec<&str> = finding.validated_urls.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(kept, vec!["https://news.example/acme"]);
    }

    // Both citations of both results were resolved
    assert_eq!(fetcher.resolve_calls().len(), 4);
}

#[tokio::test]
async fn test_validator_sees_resolved_urls() {
    let llm = Arc::new(model(COMPLETE));
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    researcher.research("acme.com", &profile(), false).await.unwrap();

    let prompt = &llm.calls_for(LlmTask::ValidateFinding)[0].prompt;
    assert!(prompt.contains("https://news.example/acme"));
    assert!(!prompt.contains("search.example/redirect"));
}

#[tokio::test]
async fn test_failed_topic_is_skipped() {
    let llm = Arc::new(
        MockLanguageModel::new()
            .with_response(LlmTask::PlanTopics, PLAN)
            .with_llm_response(LlmTask::Investigate, grounded_answer())
            .with_default(LlmTask::ValidateFinding, LlmResponse::text(VALIDATION))
            .with_default(LlmTask::CheckCompleteness, LlmResponse::text(COMPLETE)),
    );
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    assert_eq!(llm.call_count(LlmTask::Investigate), 2);
    assert_eq!(llm.call_count(LlmTask::ValidateFinding), 1);
    assert_eq!(data.validated_findings.len(), 1);
}

#[tokio::test]
async fn test_failed_validation_drops_finding() {
    let llm = Arc::new(
        MockLanguageModel::new()
            .with_response(LlmTask::PlanTopics, PLAN)
            .with_default(LlmTask::Investigate, grounded_answer())
            .with_response(LlmTask::ValidateFinding, "not json at all")
            .with_response(LlmTask::ValidateFinding, VALIDATION)
            .with_default(LlmTask::CheckCompleteness, LlmResponse::text(COMPLETE)),
    );
    let researcher = researcher(llm, Arc::new(MemoryCacheStore::new()), ResearchConfig::default());

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    assert_eq!(data.validated_findings.len(), 1);
    assert_eq!(data.validated_findings[0].topic, "Headcount");
}

#[tokio::test]
async fn test_checker_failure_finishes_with_findings() {
    let llm = Arc::new(
        MockLanguageModel::new()
            .with_response(LlmTask::PlanTopics, PLAN)
            .with_default(LlmTask::Investigate, grounded_answer())
            .with_default(LlmTask::ValidateFinding, LlmResponse::text(VALIDATION))
            .fail_task(LlmTask::CheckCompleteness),
    );
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();

    assert_eq!(data.validated_findings.len(), 2);
    assert_eq!(llm.call_count(LlmTask::Investigate), 2);
}

#[tokio::test]
async fn test_empty_next_topics_ends_loop() {
    let llm = Arc::new(model(r#"{"isComplete": false, "reasoning": "unsure", "nextTopics": []}"#));
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    researcher.research("acme.com", &profile(), false).await.unwrap();

    assert_eq!(llm.call_count(LlmTask::CheckCompleteness), 1);
    assert_eq!(llm.call_count(LlmTask::Investigate), 2);
}

#[tokio::test]
async fn test_missing_credential_returns_none() {
    let llm = Arc::new(MockLanguageModel::unconfigured());
    let cache = Arc::new(MemoryCacheStore::new());
    let researcher = researcher(llm.clone(), cache.clone(), ResearchConfig::default());

    assert!(researcher.research("acme.com", &profile(), false).await.is_none());
    assert!(llm.calls().is_empty());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_planning_failure_returns_none() {
    let llm =
        Arc::new(MockLanguageModel::new().with_response(LlmTask::PlanTopics, "I cannot help"));
    let cache = Arc::new(MemoryCacheStore::new());
    let researcher = researcher(llm.clone(), cache.clone(), ResearchConfig::default());

    assert!(researcher.research("acme.com", &profile(), false).await.is_none());
    assert_eq!(llm.call_count(LlmTask::Investigate), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_cached_research_is_returned_without_model_calls() {
    let cache = Arc::new(MemoryCacheStore::new());
    let stored = AgenticResearchData {
        domain: "acme.com".into(),
        ..Default::default()
    };
    cache
        .save("acme.com", ArtifactKind::Research, &serde_json::to_value(&stored).unwrap())
        .await
        .unwrap();

    let llm = Arc::new(model(COMPLETE));
    let researcher = researcher(llm.clone(), cache, ResearchConfig::default());

    let data = researcher.research("acme.com", &profile(), false).await.unwrap();
    assert_eq!(data.cached, Some(true));
    assert!(llm.calls().is_empty());

    let fresh = researcher.research("acme.com", &profile(), true).await.unwrap();
    assert_eq!(fresh.cached, None);
    assert_eq!(llm.call_count(LlmTask::PlanTopics), 1);
}

#[tokio::test]
async fn test_cancelled_research_returns_none() {
    let llm = Arc::new(model(INCOMPLETE));
    let researcher = researcher(
        llm.clone(),
        Arc::new(MemoryCacheStore::new()),
        ResearchConfig::default(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(researcher
        .research_until("acme.com", &profile(), false, &cancel)
        .await
        .is_none());
    assert_eq!(llm.call_count(LlmTask::Investigate), 0);
}
