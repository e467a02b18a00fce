use super::extract::{AnalyzeInput, BuildInput, DesignInput, WorkflowInput};
use crate::agents::{AnalysisOutcome, BuildOutcome};
use crate::db::StepOutcome;
use crate::error::ApiError;
use crate::server::router::AppState;
use crate::workflow::{WorkflowOutcome, run_workflow};
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DesignResponse {
    pub success: bool,
    pub schema: String,
}

pub async fn design_handler(
    State(state): State<AppState>,
    DesignInput(requirements): DesignInput,
) -> Result<Json<DesignResponse>, ApiError> {
    let schema = state.system.designer.design_schema(&requirements).await?;
    Ok(Json(DesignResponse {
        success: true,
        schema,
    }))
}

pub async fn build_handler(
    State(state): State<AppState>,
    BuildInput(schema): BuildInput,
) -> Json<BuildOutcome> {
    Json(state.system.engineer.build_database(&schema).await)
}

pub async fn sample_data_handler(State(state): State<AppState>) -> Json<StepOutcome> {
    Json(state.system.add_sample_data().await)
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    AnalyzeInput(request): AnalyzeInput,
) -> Result<Json<AnalysisOutcome>, ApiError> {
    let analyst = &state.system.analyst;
    let schema_info = analyst.schema_info().await?;
    Ok(Json(analyst.analyze_data(&request, &schema_info).await))
}

pub async fn workflow_handler(
    State(state): State<AppState>,
    WorkflowInput(req): WorkflowInput,
) -> Result<Json<WorkflowOutcome>, ApiError> {
    let outcome = run_workflow(&state.system, &req).await?;
    Ok(Json(outcome))
}
