//! The three prompt-driven agents and the bundle the HTTP and CLI surfaces share.
//!
//! Layout:
//! - `designer.rs`: requirements -> schema text
//! - `engineer.rs`: schema text -> executed statements
//! - `analyst.rs`: schema summary and request -> query, rows, insights
//! - `sql_text.rs`: pulling statements and queries out of model replies

mod analyst;
mod designer;
mod engineer;
pub mod sql_text;

pub use analyst::{AnalysisOutcome, AnalystAgent};
pub use designer::DesignerAgent;
pub use engineer::{BuildOutcome, EngineerAgent};

use std::sync::Arc;

use crate::db::{Database, StepOutcome, load_sample_data};
use crate::llm::CompletionClient;

/// Agents wired to one completion client and one database handle.
#[derive(Clone)]
pub struct AgentSystem {
    pub designer: DesignerAgent,
    pub engineer: EngineerAgent,
    pub analyst: AnalystAgent,
    db: Database,
}

impl AgentSystem {
    pub fn new(llm: Arc<dyn CompletionClient>, db: Database) -> Self {
        Self {
            designer: DesignerAgent::new(llm.clone()),
            engineer: EngineerAgent::new(llm.clone(), db.clone()),
            analyst: AnalystAgent::new(llm, db.clone()),
            db,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Loads the bundled e-commerce rows; never raises.
    pub async fn add_sample_data(&self) -> StepOutcome {
        load_sample_data(&self.db).await
    }
}
