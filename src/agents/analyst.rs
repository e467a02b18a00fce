use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::sql_text::extract_sql_query;
use crate::db::{Database, Row};
use crate::error::{AgentError, DbError};
use crate::llm::CompletionClient;

const SYSTEM_PROMPT: &str = "You are a Database Analyst Agent specialized in querying databases and providing insights.
Your task is to:
1. Analyze stakeholder requests for data
2. Create optimal SQL queries to retrieve the requested data
3. Execute the queries against the database
4. Analyze the results and provide insights
5. Format the results in a clear and understandable way

You should ensure:
- Queries are optimized for performance
- Results are presented clearly
- Insights are actionable and valuable
- Complex data is explained in simple terms

Your output should include:
1. The SQL query you created
2. The results of the query
3. Your analysis and insights based on the data";

const NO_QUERY_MESSAGE: &str = "Could not extract a valid SQL query from the agent response";

fn query_prompt(request: &str, schema_info: &str) -> String {
    format!(
        "Please analyze the following request and provide insights based on the database schema:

Request: {request}

Database Schema:
{schema_info}

Create an SQL query to retrieve the requested data, execute it, and provide insights based on the results."
    )
}

fn insights_prompt(rows: &[Row]) -> String {
    let rows = Value::Array(rows.iter().cloned().map(Value::Object).collect());
    format!(
        "I executed the SQL query and got the following results:

{rows:#}

Based on these results, please provide insights and analysis."
    )
}

/// Result of one analysis request; failures are reported here, never raised.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_response: Option<String>,
    /// The model reply when no query could be extracted from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Answers natural-language requests with a query, its rows and a narrative.
#[derive(Clone)]
pub struct AnalystAgent {
    llm: Arc<dyn CompletionClient>,
    db: Database,
}

impl AnalystAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, db: Database) -> Self {
        Self { llm, db }
    }

    /// Plain-text summary of every user table and its columns, used as prompt context.
    pub async fn schema_info(&self) -> Result<String, DbError> {
        let mut info = String::new();
        for table in self.db.list_tables().await? {
            let columns = self.db.table_columns(&table).await?;
            let _ = write!(info, "Table: {table}\nColumns:\n");
            for col in columns {
                let _ = writeln!(
                    info,
                    "  - {} ({}){}{}",
                    col.name,
                    col.data_type,
                    if col.primary_key { " PRIMARY KEY" } else { "" },
                    if col.not_null { " NOT NULL" } else { "" },
                );
            }
            info.push('\n');
        }
        Ok(info)
    }

    pub async fn analyze_data(&self, request: &str, schema_info: &str) -> AnalysisOutcome {
        let prompt = query_prompt(request, schema_info);
        let reply = match self.llm.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => return Self::analysis_error(&AgentError::from(e)),
        };

        let Some(query) = extract_sql_query(&reply) else {
            warn!(step = "analyze", reply_chars = reply.len(), "{NO_QUERY_MESSAGE}");
            return AnalysisOutcome {
                agent_response: Some(reply),
                ..AnalysisOutcome::failed(NO_QUERY_MESSAGE)
            };
        };

        match self.run_and_narrate(&query).await {
            Ok((rows, insights)) => {
                info!(step = "analyze", rows = rows.len(), "Analysis complete");
                AnalysisOutcome {
                    success: true,
                    query: Some(query),
                    results: Some(rows),
                    insights: Some(insights),
                    full_response: Some(reply),
                    ..AnalysisOutcome::default()
                }
            }
            Err(e) => Self::analysis_error(&e),
        }
    }

    async fn run_and_narrate(&self, query: &str) -> Result<(Vec<Row>, String), AgentError> {
        let rows = self.db.query(query, &[]).await?;
        let insights = self.llm.complete(SYSTEM_PROMPT, &insights_prompt(&rows)).await?;
        Ok((rows, insights))
    }

    fn analysis_error(e: &AgentError) -> AnalysisOutcome {
        error!(step = "analyze", error = %e, "Error analyzing data");
        AnalysisOutcome::failed(format!("Error analyzing data: {e}"))
    }
}
