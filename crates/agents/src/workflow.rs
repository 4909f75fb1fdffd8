//! Workflow patterns for running a list of agents against one task.
//!
//! - Sequential: agents run in order, each seeing the previous agent's output
//! - Concurrent: agents run in parallel on the same task
//!
//! # Example
//!
//! ```ignore
//! let workflow = SequentialWorkflow::new("research")
//!     .add_agent(literature)
//!     .add_agent(methodology)
//!     .add_agent(summary);
//!
//! let result = workflow.run(Task::new(query)).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use curie_common::{AgentMessage, Result, Task};
use tracing::{debug, error, info, warn};

use crate::traits::Agent;

/// A workflow that runs agents against a task.
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Execute the workflow with the given initial task.
    async fn run(&self, task: Task) -> Result<WorkflowResult>;

    /// Get the workflow name.
    fn name(&self) -> &str;
}

/// Result of a workflow execution.
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub workflow_name: String,
    /// Results from each step, in agent order.
    pub step_results: Vec<StepResult>,
    /// Final output message.
    pub final_output: AgentMessage,
    pub success: bool,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

impl WorkflowResult {
    fn empty(name: &str, started: Instant) -> Self {
        Self {
            workflow_name: name.to_string(),
            step_results: Vec::new(),
            final_output: AgentMessage::system("Workflow has no agents"),
            success: false,
            duration_ms: elapsed_ms(started),
        }
    }

    /// The first step that did not succeed.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.step_results.iter().find(|s| !s.success)
    }
}

/// Result of a single workflow step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub agent_name: String,
    pub agent_id: String,
    /// Agent output, or a system message describing the failure.
    pub output: AgentMessage,
    pub success: bool,
    pub duration_ms: u64,
}

impl StepResult {
    fn failed(agent: &dyn Agent, reason: String, started: Instant) -> Self {
        Self {
            agent_name: agent.name().to_string(),
            agent_id: agent.id().to_string(),
            output: AgentMessage::system(reason),
            success: false,
            duration_ms: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Runs one agent, turning unavailability and errors into a failed step.
async fn run_step(agent: &dyn Agent, task: &Task) -> StepResult {
    let started = Instant::now();

    if !agent.is_available() {
        warn!(agent = %agent.id(), "Agent is not available");
        return StepResult::failed(agent, format!("{} is not available", agent.id()), started);
    }

    match agent.process_task(task).await {
        Ok(output) => StepResult {
            agent_name: agent.name().to_string(),
            agent_id: agent.id().to_string(),
            output,
            success: true,
            duration_ms: elapsed_ms(started),
        },
        Err(e) => {
            error!(agent = %agent.id(), error = %e, "Step failed");
            StepResult::failed(agent, format!("{} failed: {}", agent.id(), e), started)
        }
    }
}

/// Sequential workflow that executes agents one after another.
///
/// Each agent receives the output from the previous agent as context.
/// The workflow stops at the first failure.
pub struct SequentialWorkflow {
    name: String,
    agents: Vec<Arc<dyn Agent>>,
}

impl SequentialWorkflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
        }
    }

    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// The task for the next step: the original task, with the previous
    /// step's output appended to its context.
    fn build_next_task(original: &Task, previous: &StepResult) -> Task {
        let section = format!("--- {} ---\n{}", previous.agent_name, previous.output.content);
        let context = match original.context {
            Some(ref existing) => format!("{existing}\n\n{section}"),
            None => section,
        };
        original.clone().with_context(context)
    }
}

#[async_trait]
impl Workflow for SequentialWorkflow {
    async fn run(&self, task: Task) -> Result<WorkflowResult> {
        let started = Instant::now();

        info!(
            workflow = %self.name,
            agent_count = self.agents.len(),
            task_id = %task.id,
            "Starting sequential workflow"
        );

        if self.agents.is_empty() {
            warn!(workflow = %self.name, "Workflow has no agents");
            return Ok(WorkflowResult::empty(&self.name, started));
        }

        let mut step_results: Vec<StepResult> = Vec::with_capacity(self.agents.len());
        let mut current_task = task.clone();
        let mut last_output: Option<AgentMessage> = None;

        for (i, agent) in self.agents.iter().enumerate() {
            info!(
                workflow = %self.name,
                step = i + 1,
                agent = %agent.id(),
                "Executing workflow step"
            );

            let step = run_step(agent.as_ref(), &current_task).await;

            if step.success {
                debug!(
                    workflow = %self.name,
                    step = i + 1,
                    agent = %agent.id(),
                    output_len = step.output.content.len(),
                    duration_ms = step.duration_ms,
                    "Step completed"
                );
                current_task = Self::build_next_task(&task, &step);
                last_output = Some(step.output.clone());
                step_results.push(step);
                continue;
            }

            let failure = step.output.clone();
            step_results.push(step);
            return Ok(WorkflowResult {
                workflow_name: self.name.clone(),
                step_results,
                final_output: failure,
                success: false,
                duration_ms: elapsed_ms(started),
            });
        }

        let final_output =
            last_output.unwrap_or_else(|| AgentMessage::system("No output produced"));

        info!(
            workflow = %self.name,
            steps = step_results.len(),
            duration_ms = elapsed_ms(started),
            "Workflow completed"
        );

        Ok(WorkflowResult {
            workflow_name: self.name.clone(),
            step_results,
            final_output,
            success: true,
            duration_ms: elapsed_ms(started),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Concurrent workflow that executes agents in parallel.
///
/// All agents receive the same task. The final output joins the successful
/// outputs as one section per agent, in agent order.
pub struct ConcurrentWorkflow {
    name: String,
    agents: Vec<Arc<dyn Agent>>,
}

impl ConcurrentWorkflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
        }
    }

    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }
}

#[async_trait]
impl Workflow for ConcurrentWorkflow {
    async fn run(&self, task: Task) -> Result<WorkflowResult> {
        let started = Instant::now();

        info!(
            workflow = %self.name,
            agent_count = self.agents.len(),
            task_id = %task.id,
            "Starting concurrent workflow"
        );

        if self.agents.is_empty() {
            warn!(workflow = %self.name, "Workflow has no agents");
            return Ok(WorkflowResult::empty(&self.name, started));
        }

        let handles: Vec<_> = self
            .agents
            .iter()
            .map(|agent| {
                let agent = agent.clone();
                let task = task.clone();
                tokio::spawn(async move { run_step(agent.as_ref(), &task).await })
            })
            .collect();

        let mut step_results = Vec::with_capacity(handles.len());
        for (agent, handle) in self.agents.iter().zip(handles) {
            match handle.await {
                Ok(step) => step_results.push(step),
                Err(e) => {
                    error!(
                        workflow = %self.name,
                        agent = %agent.id(),
                        error = %e,
                        "Task join error"
                    );
                    step_results.push(StepResult::failed(
                        agent.as_ref(),
                        format!("{} panicked: {}", agent.id(), e),
                        started,
                    ));
                }
            }
        }

        let all_success = step_results.iter().all(|s| s.success);
        let combined = step_results
            .iter()
            .filter(|s| s.success)
            .map(|s| format!("--- {} ---\n{}", s.agent_name, s.output.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let final_output = if combined.is_empty() {
            AgentMessage::system("No successful outputs")
        } else {
            AgentMessage::system(combined)
        };

        info!(
            workflow = %self.name,
            steps = step_results.len(),
            duration_ms = elapsed_ms(started),
            "Workflow completed"
        );

        Ok(WorkflowResult {
            workflow_name: self.name.clone(),
            step_results,
            final_output,
            success: true,
            duration_ms: elapsed_ms(started),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
