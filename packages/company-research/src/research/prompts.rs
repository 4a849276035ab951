//! LLM prompts for the research loop.
//!
//! Placeholders in `{braces}` are filled with `str::replace` by the stage
//! that owns the prompt.

/// Sections every final report must cover.
pub const REPORT_OUTLINE: &str = r#"1. Company overview (name, founding year, headquarters, representative)
2. Business areas (products, services, markets)
3. Major projects and references
4. Contacts (address, phone, email, website)
5. Size and credibility (headcount, certifications, awards, rankings, major clients)
6. Financials (revenue, operating profit, growth, credit rating, funding)
7. Overall assessment (strengths, risks, reputation)"#;

/// Coordinator: plan research topics from the company profile.
pub const PLAN_TOPICS_PROMPT: &str = r#"You are planning research on a company for a due-diligence report.

Company: {company_name}
Website: {domain}

What the company's own website says:
{profile}

The final report has these sections:
{outline}

List the research topics needed to fill the gaps the website leaves in this report. Prefer topics that can only be answered from third-party sources: financial statements, headcount, industry rankings, certifications, major clients, news coverage and reputation. Do not list topics the website already answers.

Give each topic a priority (high, medium or low) and a one-sentence reason. Return at most 6 topics, most important first."#;

/// Investigator: grounded search for one topic.
pub const INVESTIGATE_PROMPT: &str = r#"Research the following topic about the company {company_name} (website: {domain}) using web search.

Topic: {topic}
Why it matters: {reason}

Report concrete facts with figures, dates and the source of each fact. Only report information about this specific company; if a search result concerns a different company with a similar name, ignore it. If nothing reliable is found, say so plainly."#;

/// Validator: identity check and consolidation of one result.
pub const VALIDATE_PROMPT: &str = r#"You are checking research results about the company {company_name} (website: {domain}).

About the company: {short_description}

Topic: {topic}

Findings:
{findings}

Cited URLs:
{urls}

For every cited URL decide:
- "keep" if the page is a third-party source about this exact company
- "remove" if it is the company's own website ({domain}), concerns a different company (for example one with a similar name), or is irrelevant to the topic

Then write validatedFinancials: the findings restated using only facts supported by kept sources, with figures and dates. Set confidenceLevel to high, medium or low according to how well the kept sources support them. validatedURLs lists the kept URLs with a short title each. urlAnalysis gives a verdict and a one-sentence reason for every cited URL."#;

/// Completeness checker: decide whether another round is needed.
pub const COMPLETENESS_PROMPT: &str = r#"You are reviewing research gathered about a company before the final report is written.

Website: {domain}
About the company: {short_description}

Findings so far:
{findings}

Is there now enough financial, reputation and competitive information to write the report? If yes, set isComplete to true. If not, set isComplete to false and list in nextTopics the research topics (with priority and reason) that would close the most important gaps. Do not repeat topics that are already covered. Explain your decision briefly in reasoning."#;
