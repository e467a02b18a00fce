use crate::error::ApiError;
use crate::utils::logging::with_pretty_json_debug;
use crate::workflow::WorkflowRequest;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const REQUIREMENTS_REQUIRED: &str = "Requirements are required";
const SCHEMA_REQUIRED: &str = "Schema is required";
const REQUEST_REQUIRED: &str = "Request is required";

/// Request body shared by every route; each route picks the fields it needs.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentRequestBody {
    requirements: Option<String>,
    schema: Option<String>,
    request: Option<String>,
    #[serde(default)]
    include_sample_data: bool,
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<AgentRequestBody, ApiError> {
    let Json(body) = Json::<AgentRequestBody>::from_request(req, state).await?;
    with_pretty_json_debug(&body, |pretty_body| {
        debug!(body = %pretty_body, "Extracted request body");
    });
    Ok(body)
}

/// Absent, empty and whitespace-only values are all treated as missing.
fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApiError::MissingField(message))
}

/// Body of `POST /design`.
pub(crate) struct DesignInput(pub(crate) String);

impl<S> FromRequest<S> for DesignInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req, state).await?;
        Ok(Self(required(body.requirements, REQUIREMENTS_REQUIRED)?))
    }
}

/// Body of `POST /build`.
pub(crate) struct BuildInput(pub(crate) String);

impl<S> FromRequest<S> for BuildInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req, state).await?;
        Ok(Self(required(body.schema, SCHEMA_REQUIRED)?))
    }
}

/// Body of `POST /analyze`.
pub(crate) struct AnalyzeInput(pub(crate) String);

impl<S> FromRequest<S> for AnalyzeInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req, state).await?;
        Ok(Self(required(body.request, REQUEST_REQUIRED)?))
    }
}

/// Body of `POST /workflow`; requirements are checked before the request.
pub(crate) struct WorkflowInput(pub(crate) WorkflowRequest);

impl<S> FromRequest<S> for WorkflowInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req, state).await?;
        let requirements = required(body.requirements, REQUIREMENTS_REQUIRED)?;
        let request = required(body.request, REQUEST_REQUIRED)?;
        Ok(Self(WorkflowRequest {
            requirements,
            request,
            include_sample_data: body.include_sample_data,
        }))
    }
}
