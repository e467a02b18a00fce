use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::sql_text::extract_sql_statements;
use crate::db::Database;
use crate::error::AgentError;
use crate::llm::CompletionClient;

const SYSTEM_PROMPT: &str = "You are a Data Engineer Agent specialized in implementing database schemas.
Your task is to:
1. Analyze SQL schema definitions
2. Verify they follow best practices
3. Identify and fix any issues
4. Execute the schema to build the database
5. Verify the database was built correctly

You should ensure:
- All SQL statements are valid and can be executed
- The schema follows best practices
- Tables are properly related
- Constraints are properly defined
- Indexes are properly created

Your output should be the final SQL statements to be executed, with any necessary corrections or improvements.";

fn user_prompt(schema: &str) -> String {
    format!(
        "Please analyze and implement the following database schema:

{schema}

If there are any issues or improvements needed, please fix them and provide the final SQL statements to be executed."
    )
}

/// Result of building the database; failures are reported here, never raised.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BuildOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<String>>,
}

/// Reviews schema text through the model and executes the reviewed statements.
#[derive(Clone)]
pub struct EngineerAgent {
    llm: Arc<dyn CompletionClient>,
    db: Database,
}

impl EngineerAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, db: Database) -> Self {
        Self { llm, db }
    }

    pub async fn build_database(&self, schema: &str) -> BuildOutcome {
        match self.review_and_execute(schema).await {
            Ok(statements) => {
                info!(step = "build", statements = statements.len(), "Database built");
                BuildOutcome {
                    success: true,
                    message: "Database built successfully".to_string(),
                    statements: Some(statements),
                }
            }
            Err(e) => {
                error!(step = "build", error = %e, "Error building database");
                BuildOutcome {
                    success: false,
                    message: format!("Error building database: {e}"),
                    statements: None,
                }
            }
        }
    }

    async fn review_and_execute(&self, schema: &str) -> Result<Vec<String>, AgentError> {
        let reviewed = self.llm.complete(SYSTEM_PROMPT, &user_prompt(schema)).await?;
        let statements = extract_sql_statements(&reviewed);
        self.db.run_in_transaction(&statements).await?;
        Ok(statements)
    }
}
