//! Turning four form fields into a research report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use curie_common::{CurieError, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::team::Orchestrator;

/// What the user asked for. Fields are free text and passed through
/// unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchRequest {
    pub topic: String,
    pub scope: String,
    pub depth: String,
    pub focus_areas: String,
}

impl ResearchRequest {
    pub fn new(
        topic: impl Into<String>,
        scope: impl Into<String>,
        depth: impl Into<String>,
        focus_areas: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            scope: scope.into(),
            depth: depth.into(),
            focus_areas: focus_areas.into(),
        }
    }
}

/// Which query and header a report uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStyle {
    /// The full four-part report prompt.
    #[default]
    Full,
    /// A single question, for quick command-line lookups.
    Quick,
}

/// The instruction handed to the agent team.
pub fn research_query(req: &ResearchRequest) -> String {
    format!(
        "Create a comprehensive research report on {} within the scope of {}.\n\
         Technical Depth: {}\n\
         Focus Areas: {}\n\
         \n\
         Include:\n\
         1. Current state of research and key findings\n\
         2. Major methodological approaches\n\
         3. Data analysis techniques and findings\n\
         4. Synthesis of results and future research directions",
        req.topic, req.scope, req.depth, req.focus_areas
    )
}

pub fn quick_query(req: &ResearchRequest) -> String {
    format!(
        "What are the latest findings on {} within {} at a {} level focusing on {}?",
        req.topic, req.scope, req.depth, req.focus_areas
    )
}

/// Wrap the team's answer in the report template.
pub fn format_report(req: &ResearchRequest, result: &str) -> String {
    format!(
        "\n=== SCIENCE RESEARCH REPORT: {} ===\n\nScope: {}\nTechnical Depth: {}\nFocus Areas: {}\n\n{}\n",
        req.topic, req.scope, req.depth, req.focus_areas, result
    )
}

fn format_quick_report(req: &ResearchRequest, result: &str) -> String {
    format!("\n=== RESEARCH REPORT: {} ===\n\n{}\n", req.topic, result)
}

/// Prefix of every report that failed to generate.
pub const ERROR_PREFIX: &str = "Error generating research report:";

/// Runs requests through an orchestrator and always produces text.
#[derive(Clone)]
pub struct ReportGenerator {
    orchestrator: Arc<dyn Orchestrator>,
    timeout: Option<Duration>,
}

impl ReportGenerator {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            orchestrator,
            timeout: None,
        }
    }

    /// Give up on a report after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn agent_count(&self) -> usize {
        self.orchestrator.agent_count()
    }

    /// Stop the tool servers behind the orchestrator.
    pub async fn shutdown(&self) {
        self.orchestrator.shutdown().await;
    }

    /// Generate a full report. Errors are returned as report text.
    pub async fn generate(&self, req: &ResearchRequest) -> String {
        self.generate_with(req, ReportStyle::Full).await
    }

    pub async fn generate_with(&self, req: &ResearchRequest, style: ReportStyle) -> String {
        let started = Instant::now();
        info!(topic = %req.topic, style = ?style, "Generating research report");

        match self.run(req, style).await {
            Ok(report) => {
                info!(
                    topic = %req.topic,
                    duration_ms = started.elapsed().as_millis() as u64,
                    report_len = report.len(),
                    "Research report generated"
                );
                report
            }
            Err(e) => {
                error!(topic = %req.topic, error = %e, "Research report failed");
                format!("{ERROR_PREFIX} {e}")
            }
        }
    }

    async fn run(&self, req: &ResearchRequest, style: ReportStyle) -> Result<String> {
        let query = match style {
            ReportStyle::Full => research_query(req),
            ReportStyle::Quick => quick_query(req),
        };

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.orchestrator.start(&query))
                .await
                .map_err(|_| CurieError::Timeout(limit))??,
            None => self.orchestrator.start(&query).await?,
        };

        Ok(match style {
            ReportStyle::Full => format_report(req, &result),
            ReportStyle::Quick => format_quick_report(req, &result),
        })
    }
}
