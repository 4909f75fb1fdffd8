//! The four preset research agents.

use curie_mcp::ToolServerSpec;

use crate::traits::AgentProfile;

pub const LITERATURE_INSTRUCTIONS: &str =
    "Research scientific literature, academic papers, and research findings on specific topics";

pub const METHODOLOGY_INSTRUCTIONS: &str =
    "Analyze scientific methodologies, experimental designs, and data collection techniques";

pub const DATA_ANALYSIS_INSTRUCTIONS: &str =
    "Evaluate data analysis approaches, statistical methods, and results interpretation";

pub const SUMMARY_INSTRUCTIONS: &str =
    "Synthesize research findings, explain significance, and suggest future research directions";

/// Finds relevant scientific papers and research.
pub fn literature() -> AgentProfile {
    AgentProfile::new("literature", "Literature Research Agent", LITERATURE_INSTRUCTIONS)
        .with_tool(ToolServerSpec::brave_search())
}

/// Analyzes research methodologies and experimental designs.
pub fn methodology() -> AgentProfile {
    AgentProfile::new("methodology", "Methodology Agent", METHODOLOGY_INSTRUCTIONS)
        .with_tool(ToolServerSpec::brave_search())
}

/// Evaluates statistical methods and results interpretation.
pub fn data_analysis() -> AgentProfile {
    AgentProfile::new("data_analysis", "Data Analysis Agent", DATA_ANALYSIS_INSTRUCTIONS)
        .with_tool(ToolServerSpec::brave_search())
}

/// Synthesizes research and explains significance.
pub fn summary() -> AgentProfile {
    AgentProfile::new("summary", "Summary & Implications Agent", SUMMARY_INSTRUCTIONS)
        .with_tool(ToolServerSpec::brave_search())
}

/// All four presets in pipeline order.
pub fn default_profiles() -> Vec<AgentProfile> {
    vec![literature(), methodology(), data_analysis(), summary()]
}
