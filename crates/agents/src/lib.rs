//! Research agents and the pipeline that turns a topic into a report.
//!
//! - **Literature Research Agent**: papers and research findings
//! - **Methodology Agent**: experimental designs and data collection
//! - **Data Analysis Agent**: statistical methods and interpretation
//! - **Summary & Implications Agent**: synthesis and future directions
//!
//! # Architecture
//!
//! Each agent pairs role instructions with an LLM client and, optionally, a
//! tool server reached over MCP. `AgentTeam` runs the agents through a
//! workflow and `ReportGenerator` wraps the team's answer in the report
//! template.
//!
//! ```text
//!   ResearchRequest ──► research_query() ──► AgentTeam::start()
//!                                               │
//!        ┌───────────────┬──────────────────────┼───────────────┐
//!        ▼               ▼                      ▼               ▼
//!  ┌────────────┐ ┌─────────────┐ ┌───────────────┐ ┌──────────────┐
//!  │ Literature │►│ Methodology │►│ Data Analysis │►│   Summary    │
//!  └─────┬──────┘ └──────┬──────┘ └───────┬───────┘ └──────┬───────┘
//!        └───────────────┴───── web search (MCP) ───────────┘
//!                                               │
//!                          format_report() ◄────┘
//! ```

pub mod config;
pub mod presets;
pub mod report;
pub mod research;
pub mod team;
pub mod traits;
pub mod workflow;

pub use config::{LlmSettings, TeamConfig, build_team, build_team_with};
pub use report::{
    ERROR_PREFIX, ReportGenerator, ReportStyle, ResearchRequest, format_report, quick_query,
    research_query,
};
pub use research::ResearchAgent;
pub use team::{AgentTeam, Orchestrator, ProcessMode};
pub use traits::{Agent, AgentProfile};
pub use workflow::{ConcurrentWorkflow, SequentialWorkflow, StepResult, Workflow, WorkflowResult};
