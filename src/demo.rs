//! The bundled e-commerce walkthrough run by `dbagent example`.

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::agents::AgentSystem;
use crate::repl::{run_workflow_showing_steps, write_workflow_report};
use crate::workflow::WorkflowRequest;

pub const EXAMPLE_REQUIREMENTS: &str = "
Create a database for an e-commerce platform with the following requirements:

1. Store information about users, including:
   - User ID, name, email, password, address, phone number, registration date

2. Store information about products, including:
   - Product ID, name, description, price, stock quantity, category

3. Store information about orders, including:
   - Order ID, user ID, order date, total amount, status

4. Store information about order items, including:
   - Order item ID, order ID, product ID, quantity, price

5. Store information about product categories, including:
   - Category ID, name, description

6. Store information about product reviews, including:
   - Review ID, product ID, user ID, rating, comment, date

7. Ensure proper relationships between tables
8. Include appropriate indexes for performance
9. Ensure data integrity with constraints
";

pub const EXAMPLE_REQUEST: &str = "
Show me the top 5 products by sales volume, including their category and average rating.
";

pub fn example_request() -> WorkflowRequest {
    WorkflowRequest {
        requirements: EXAMPLE_REQUIREMENTS.to_string(),
        request: EXAMPLE_REQUEST.to_string(),
        include_sample_data: true,
    }
}

/// Runs the example through the full workflow with sample data and writes the report.
pub async fn run_example<W>(system: &AgentSystem, out: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match run_workflow_showing_steps(system, &example_request(), out).await? {
        Ok(outcome) => write_workflow_report(out, &outcome).await,
        Err(e) => {
            out.write_all(format!("Error in workflow: {e}\n").as_bytes())
                .await?;
            out.flush().await
        }
    }
}
