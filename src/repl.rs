//! Interactive numbered menu over the same operations the HTTP routes expose.

use serde::Serialize;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc;

use crate::agents::AgentSystem;
use crate::error::AgentError;
use crate::workflow::{WorkflowOutcome, WorkflowRequest, run_workflow_with_progress};

const MENU: &str = "\
Database Agent System CLI
------------------------
1. Design a database schema
2. Build a database from a schema
3. Add sample data
4. Analyze data
5. Run the entire workflow
6. Exit
";

/// Menu loop over line-oriented input; returns on `6` or end of input.
pub struct Repl<'a, R, W> {
    system: &'a AgentSystem,
    lines: Lines<R>,
    out: W,
}

impl<'a, R, W> Repl<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(system: &'a AgentSystem, input: R, out: W) -> Self {
        Self {
            system,
            lines: input.lines(),
            out,
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        loop {
            self.out.write_all(MENU.as_bytes()).await?;
            let Some(option) = self.ask("Select an option: ").await? else {
                break;
            };

            let keep_going = match option.trim() {
                "1" => self.design().await?,
                "2" => self.build().await?,
                "3" => self.sample_data().await?,
                "4" => self.analyze().await?,
                "5" => self.workflow().await?,
                "6" => {
                    self.say("Exiting...").await?;
                    false
                }
                _ => {
                    self.say("Invalid option").await?;
                    true
                }
            };
            if !keep_going {
                break;
            }
            self.say("").await?;
        }
        self.out.flush().await
    }

    async fn design(&mut self) -> io::Result<bool> {
        let Some(requirements) = self.ask("Enter requirements: ").await? else {
            return Ok(false);
        };
        self.say("Designing schema...").await?;
        match self.system.designer.design_schema(&requirements).await {
            Ok(schema) => self.say(&format!("Schema:\n{schema}")).await?,
            Err(e) => self.say(&format!("Error: {e}")).await?,
        }
        Ok(true)
    }

    async fn build(&mut self) -> io::Result<bool> {
        let Some(schema) = self.ask("Enter schema: ").await? else {
            return Ok(false);
        };
        self.say("Building database...").await?;
        let result = self.system.engineer.build_database(&schema).await;
        self.say_json("Result:", &result).await?;
        Ok(true)
    }

    async fn sample_data(&mut self) -> io::Result<bool> {
        self.say("Adding sample data...").await?;
        let result = self.system.add_sample_data().await;
        self.say_json("Result:", &result).await?;
        Ok(true)
    }

    async fn analyze(&mut self) -> io::Result<bool> {
        let Some(request) = self.ask("Enter request: ").await? else {
            return Ok(false);
        };
        self.say("Getting schema info...").await?;
        let schema_info = match self.system.analyst.schema_info().await {
            Ok(info) => info,
            Err(e) => {
                self.say(&format!("Error: {e}")).await?;
                return Ok(true);
            }
        };
        self.say("Analyzing data...").await?;
        let result = self.system.analyst.analyze_data(&request, &schema_info).await;
        self.say_json("Result:", &result).await?;
        Ok(true)
    }

    async fn workflow(&mut self) -> io::Result<bool> {
        let Some(requirements) = self.ask("Enter requirements: ").await? else {
            return Ok(false);
        };
        let Some(request) = self.ask("Enter request: ").await? else {
            return Ok(false);
        };
        let Some(include) = self.ask("Include sample data? (y/n): ").await? else {
            return Ok(false);
        };

        let req = WorkflowRequest {
            requirements,
            request,
            include_sample_data: include.trim().eq_ignore_ascii_case("y"),
        };
        self.say("Running workflow...").await?;
        match run_workflow_showing_steps(self.system, &req, &mut self.out).await? {
            Ok(outcome) => write_workflow_report(&mut self.out, &outcome).await?,
            Err(e) => self.say(&format!("Error: {e}")).await?,
        }
        Ok(true)
    }

    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.out.write_all(prompt.as_bytes()).await?;
        self.out.flush().await?;
        self.lines.next_line().await
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await
    }

    async fn say_json<T: Serialize>(&mut self, label: &str, value: &T) -> io::Result<()> {
        let pretty = serde_json::to_string_pretty(value)?;
        self.say(&format!("{label}\n{pretty}")).await
    }
}

/// Runs the workflow, writing each step's banner to `out` as that step starts.
///
/// The outer error is a failed write; the inner result is the workflow's own.
pub async fn run_workflow_showing_steps<W>(
    system: &AgentSystem,
    req: &WorkflowRequest,
    out: &mut W,
) -> io::Result<Result<WorkflowOutcome, AgentError>>
where
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let run = run_workflow_with_progress(system, req, Some(tx));
    let show = async {
        while let Some(step) = rx.recv().await {
            out.write_all(step.banner().as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
        Ok::<_, io::Error>(())
    };

    let (outcome, shown) = tokio::join!(run, show);
    shown?;
    Ok(outcome)
}

/// Human-readable report of a workflow run, step by step.
pub async fn write_workflow_report<W>(out: &mut W, outcome: &WorkflowOutcome) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut report = format!("Schema:\n{}\n", outcome.schema);

    if let Some(build) = &outcome.build_result {
        let status = if build.success { "Success" } else { "Failed" };
        report.push_str(&format!("\nBuild result: {status}\n"));
        if !build.success {
            report.push_str(&format!("{}\n", build.message));
        }
    }

    if let Some(sample) = &outcome.sample_data_result {
        let status = if sample.success { "Success" } else { "Failed" };
        report.push_str(&format!("\nSample data result: {status} ({})\n", sample.message));
    }

    if let Some(analysis) = &outcome.analysis_result {
        report.push_str("\nAnalysis result:\n");
        if analysis.success {
            let rows = serde_json::to_string_pretty(&analysis.results)?;
            report.push_str(&format!(
                "Query:\n{}\n\nResults:\n{rows}\n\nInsights:\n{}\n",
                analysis.query.as_deref().unwrap_or_default(),
                analysis.insights.as_deref().unwrap_or_default(),
            ));
        } else {
            report.push_str(&format!(
                "{}\n",
                analysis.message.as_deref().unwrap_or_default()
            ));
        }
    }

    out.write_all(report.as_bytes()).await?;
    out.flush().await
}
