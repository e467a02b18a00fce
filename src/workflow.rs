//! The combined pipeline: design, build, optional sample data, analyze.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::agents::{AgentSystem, AnalysisOutcome, BuildOutcome};
use crate::db::StepOutcome;
use crate::error::AgentError;

const SAMPLE_DATA_SKIPPED: &str = "Sample data not included";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    pub requirements: String,
    pub request: String,
    pub include_sample_data: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    Design,
    Build,
    SampleData,
    Analyze,
}

impl WorkflowStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::Design => "design",
            WorkflowStep::Build => "build",
            WorkflowStep::SampleData => "sample-data",
            WorkflowStep::Analyze => "analyze",
        }
    }

    /// Progress line shown when the step starts.
    pub fn banner(self) -> &'static str {
        match self {
            WorkflowStep::Design => "Step 1: Designing schema...",
            WorkflowStep::Build => "Step 2: Building database...",
            WorkflowStep::SampleData => "Step 3: Adding sample data...",
            WorkflowStep::Analyze => "Step 4: Analyzing data...",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline produced, in step order.
///
/// On failure `step` and `error` name the step that stopped the run, and only the results
/// of steps that actually ran are present.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<WorkflowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_result: Option<BuildOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_data_result: Option<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<AnalysisOutcome>,
}

impl WorkflowOutcome {
    fn stopped_at(mut self, step: WorkflowStep, error: String) -> Self {
        warn!(%step, error = %error, "Workflow stopped");
        self.success = false;
        self.step = Some(step);
        self.error = Some(error);
        self
    }
}

fn begin(progress: Option<&UnboundedSender<WorkflowStep>>, step: WorkflowStep) {
    info!(%step, "{}", step.banner());
    if let Some(tx) = progress {
        // The receiver may be gone; the run carries on regardless.
        let _ = tx.send(step);
    }
}

/// Runs the pipeline, stopping at the first step that reports failure.
///
/// Provider errors from the design step and database errors from schema introspection
/// are returned as `Err`; every other failure is reported inside the outcome.
pub async fn run_workflow(
    system: &AgentSystem,
    req: &WorkflowRequest,
) -> Result<WorkflowOutcome, AgentError> {
    run_workflow_with_progress(system, req, None).await
}

/// [`run_workflow`], also sending each step on `progress` just before it starts.
///
/// The sender is dropped when the run returns, which ends the receiving stream.
pub async fn run_workflow_with_progress(
    system: &AgentSystem,
    req: &WorkflowRequest,
    progress: Option<UnboundedSender<WorkflowStep>>,
) -> Result<WorkflowOutcome, AgentError> {
    let progress = progress.as_ref();
    begin(progress, WorkflowStep::Design);
    let schema = system.designer.design_schema(&req.requirements).await?;

    let mut outcome = WorkflowOutcome {
        success: true,
        step: None,
        error: None,
        schema,
        build_result: None,
        sample_data_result: None,
        analysis_result: None,
    };

    begin(progress, WorkflowStep::Build);
    let build = system.engineer.build_database(&outcome.schema).await;
    let build_failed = (!build.success).then(|| build.message.clone());
    outcome.build_result = Some(build);
    if let Some(error) = build_failed {
        return Ok(outcome.stopped_at(WorkflowStep::Build, error));
    }

    let sample_data = if req.include_sample_data {
        begin(progress, WorkflowStep::SampleData);
        system.add_sample_data().await
    } else {
        StepOutcome::ok(SAMPLE_DATA_SKIPPED)
    };
    let sample_data_failed = (!sample_data.success).then(|| sample_data.message.clone());
    outcome.sample_data_result = Some(sample_data);
    if let Some(error) = sample_data_failed {
        return Ok(outcome.stopped_at(WorkflowStep::SampleData, error));
    }

    begin(progress, WorkflowStep::Analyze);
    let schema_info = system.analyst.schema_info().await?;
    let analysis = system.analyst.analyze_data(&req.request, &schema_info).await;
    let analysis_failed = (!analysis.success).then(|| analysis.message.clone().unwrap_or_default());
    outcome.analysis_result = Some(analysis);
    if let Some(error) = analysis_failed {
        return Ok(outcome.stopped_at(WorkflowStep::Analyze, error));
    }

    info!("Workflow complete");
    Ok(outcome)
}
