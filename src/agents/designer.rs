use std::sync::Arc;
use tracing::{error, info};

use crate::error::LlmError;
use crate::llm::CompletionClient;

const SYSTEM_PROMPT: &str = "You are a Database Designer Agent specialized in creating optimal database schemas.
Your task is to analyze requirements and create a well-structured database schema with proper:
- Tables and relationships
- Primary and foreign keys
- Data types
- Constraints
- Indexes for performance
- Normalization to reduce redundancy

Always follow these best practices:
1. Use appropriate naming conventions
2. Ensure proper normalization (typically 3NF)
3. Design for performance and scalability
4. Include appropriate indexes
5. Use appropriate data types
6. Consider referential integrity

Your output should be a complete SQL schema definition that can be executed directly.";

fn user_prompt(requirements: &str) -> String {
    format!(
        "Please design a database schema based on the following requirements:

{requirements}

Provide the complete SQL schema with CREATE TABLE statements, including all necessary constraints, indexes, and relationships."
    )
}

/// Turns free-text requirements into schema text.
#[derive(Clone)]
pub struct DesignerAgent {
    llm: Arc<dyn CompletionClient>,
}

impl DesignerAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Returns the model's reply unchanged; provider errors propagate.
    pub async fn design_schema(&self, requirements: &str) -> Result<String, LlmError> {
        match self.llm.complete(SYSTEM_PROMPT, &user_prompt(requirements)).await {
            Ok(schema) => {
                info!(step = "design", schema_chars = schema.len(), "Schema designed");
                Ok(schema)
            }
            Err(e) => {
                error!(step = "design", error = %e, "Error designing schema");
                Err(e)
            }
        }
    }
}
