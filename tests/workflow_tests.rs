mod common;

use common::{ECOMMERCE_SCHEMA, ScriptedClient, TOP_PRODUCTS_REPLY, temp_database};
use dbagent::agents::AgentSystem;
use dbagent::error::{AgentError, LlmError};
use dbagent::repl::Repl;
use dbagent::workflow::{WorkflowRequest, WorkflowStep, run_workflow};
use serde_json::{Value, json};
use std::{fs, sync::Arc};

fn request(include_sample_data: bool) -> WorkflowRequest {
    WorkflowRequest {
        requirements: "An online shop with products, orders and reviews.".to_string(),
        request: "Top 5 products by units sold".to_string(),
        include_sample_data,
    }
}

#[tokio::test]
async fn workflow_with_sample_data_returns_every_step_in_order() {
    let db = temp_database("workflow-ok");
    let design_reply = "Proposed schema:\n\nCREATE TABLE categories (...);";
    let client = Arc::new(ScriptedClient::new([
        design_reply,
        ECOMMERCE_SCHEMA,
        TOP_PRODUCTS_REPLY,
        "T-shirts lead unit sales.",
    ]));
    let system = AgentSystem::new(client.clone(), db.clone());

    let outcome = run_workflow(&system, &request(true))
        .await
        .expect("workflow");
    assert!(outcome.success);
    assert_eq!(outcome.step, None);
    assert_eq!(outcome.schema, design_reply);

    let value = serde_json::to_value(&outcome).expect("serialize");
    let keys: Vec<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        ["success", "schema", "buildResult", "sampleDataResult", "analysisResult"]
    );
    assert_eq!(value["buildResult"]["success"], json!(true));
    assert_eq!(
        value["sampleDataResult"],
        json!({ "success": true, "message": "Sample data added successfully" })
    );

    let analysis = &value["analysisResult"];
    assert_eq!(analysis["success"], json!(true));
    assert!(analysis["query"].as_str().unwrap().starts_with("SELECT p.name"));
    assert_eq!(analysis["fullResponse"], json!(TOP_PRODUCTS_REPLY));
    assert_eq!(analysis["insights"], json!("T-shirts lead unit sales."));
    let names: Vec<&Value> = analysis["results"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|row| &row["name"])
        .collect();
    assert_eq!(
        names,
        [
            &json!("T-shirt"),
            &json!("Novel"),
            &json!("Basketball"),
            &json!("Coffee Table"),
            &json!("Tennis Racket"),
        ]
    );

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[0].0.starts_with("You are a Database Designer Agent"));
    assert!(prompts[1].0.starts_with("You are a Data Engineer Agent"));
    assert!(prompts[1].1.contains(design_reply));
    assert!(prompts[2].1.contains("Request: Top 5 products by units sold"));
    assert!(prompts[2].1.contains("Table: order_items\nColumns:\n"));
    assert!(prompts[3].1.contains("\"name\": \"T-shirt\""));

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn failed_build_stops_the_workflow() {
    let db = temp_database("workflow-build-fail");
    let client = Arc::new(ScriptedClient::new([
        "CREATE TABLE a (id INTEGER);",
        "CREATE TABLE a (id INTEGER);\nCREAT TABLE b (id INTEGER);",
    ]));
    let system = AgentSystem::new(client.clone(), db.clone());

    let outcome = run_workflow(&system, &request(true))
        .await
        .expect("workflow");
    assert!(!outcome.success);
    assert_eq!(outcome.step, Some(WorkflowStep::Build));
    assert!(outcome.analysis_result.is_none());
    assert!(outcome.sample_data_result.is_none());

    let value = serde_json::to_value(&outcome).expect("serialize");
    assert_eq!(value["step"], json!("build"));
    assert!(
        value["error"]
            .as_str()
            .unwrap()
            .starts_with("Error building database: ")
    );
    assert_eq!(value["buildResult"]["success"], json!(false));
    assert!(value["buildResult"].get("statements").is_none());
    assert!(value.get("analysisResult").is_none());

    // The first statement was rolled back with the second.
    let tables = db.list_tables().await.expect("tables");
    assert!(tables.is_empty(), "{tables:?}");
    assert_eq!(client.prompts().len(), 2);

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn skipped_sample_data_and_failed_extraction_are_reported() {
    let db = temp_database("workflow-no-query");
    let client = Arc::new(ScriptedClient::new([
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);",
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);",
        "I would need more information to answer that.",
    ]));
    let system = AgentSystem::new(client, db.clone());

    let outcome = run_workflow(&system, &request(false))
        .await
        .expect("workflow");
    assert!(!outcome.success);
    assert_eq!(outcome.step, Some(WorkflowStep::Analyze));

    let value = serde_json::to_value(&outcome).expect("serialize");
    assert_eq!(
        value["sampleDataResult"],
        json!({ "success": true, "message": "Sample data not included" })
    );
    assert_eq!(
        value["analysisResult"],
        json!({
            "success": false,
            "agentResponse": "I would need more information to answer that.",
            "message": "Could not extract a valid SQL query from the agent response",
        })
    );
    assert_eq!(
        value["error"],
        json!("Could not extract a valid SQL query from the agent response")
    );

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn provider_failure_during_design_propagates() {
    let db = temp_database("workflow-design-fail");
    let client = ScriptedClient::default();
    client.push_error(LlmError::EmptyCompletion);
    let system = AgentSystem::new(Arc::new(client), db.clone());

    let err = run_workflow(&system, &request(true))
        .await
        .expect_err("design must fail");
    assert!(matches!(err, AgentError::Llm(LlmError::EmptyCompletion)));

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn analysis_reports_query_errors_without_raising() {
    let db = temp_database("analyze-missing-table");
    let client = Arc::new(ScriptedClient::new(["```sql\nSELECT * FROM missing_table;\n```"]));
    let system = AgentSystem::new(client.clone(), db.clone());

    let outcome = system
        .analyst
        .analyze_data("Everything in the missing table", "")
        .await;
    assert!(!outcome.success);
    let message = outcome.message.as_deref().expect("message");
    assert!(message.starts_with("Error analyzing data: "), "{message}");
    assert!(message.contains("no such table"), "{message}");
    assert!(outcome.query.is_none());
    assert!(outcome.results.is_none());
    // Insights are never requested for a query that did not run.
    assert_eq!(client.prompts().len(), 1);

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn analysis_reports_provider_failure_while_narrating() {
    let db = temp_database("analyze-insights-fail");
    let client = ScriptedClient::new(["```sql\nSELECT 1 AS one;\n```"]);
    client.push_error(LlmError::EmptyCompletion);
    let system = AgentSystem::new(Arc::new(client), db.clone());

    let outcome = system.analyst.analyze_data("One", "").await;
    assert_eq!(
        serde_json::to_value(&outcome).expect("serialize"),
        json!({
            "success": false,
            "message": "Error analyzing data: Completion contained no content",
        })
    );

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn analysis_reports_provider_failure_before_any_query() {
    let db = temp_database("analyze-query-fail");
    let client = ScriptedClient::default();
    client.push_error(LlmError::EmptyCompletion);
    let system = AgentSystem::new(Arc::new(client), db.clone());

    let outcome = system.analyst.analyze_data("Anything", "").await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Error analyzing data: Completion contained no content")
    );

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn repl_runs_menu_choices_until_exit() {
    let db = temp_database("repl");
    let client = Arc::new(ScriptedClient::new(["CREATE TABLE pets (id INTEGER PRIMARY KEY);"]));
    let system = AgentSystem::new(client, db.clone());

    let input: &[u8] = b"1\nA table of pets\n9\n3\n6\n";
    let mut output = Vec::new();
    Repl::new(&system, input, &mut output)
        .run()
        .await
        .expect("repl");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.starts_with("Database Agent System CLI\n"));
    assert!(output.contains("Enter requirements: Designing schema...\n"));
    assert!(output.contains("Schema:\nCREATE TABLE pets (id INTEGER PRIMARY KEY);\n"));
    assert!(output.contains("Invalid option\n"));
    assert!(output.contains("\"success\": false"));
    assert!(output.contains("Error adding sample data: "));
    assert!(output.trim_end().ends_with("Exiting..."));

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn repl_stops_at_end_of_input() {
    let db = temp_database("repl-eof");
    let system = AgentSystem::new(Arc::new(ScriptedClient::default()), db.clone());

    let input: &[u8] = b"4\n";
    let mut output = Vec::new();
    Repl::new(&system, input, &mut output)
        .run()
        .await
        .expect("repl");
    let output = String::from_utf8(output).expect("utf8");
    assert!(output.ends_with("Enter request: "));

    let _ = fs::remove_file(db.path());
}

#[tokio::test]
async fn repl_workflow_shows_each_step_before_the_report() {
    let db = temp_database("repl-workflow");
    let client = Arc::new(ScriptedClient::new([
        "A notes table.",
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);",
        "```sql\nSELECT COUNT(*) AS n FROM notes;\n```",
        "There are no notes yet.",
    ]));
    let system = AgentSystem::new(client, db.clone());

    let input: &[u8] = b"5\nA place for notes\nHow many notes?\nn\n6\n";
    let mut output = Vec::new();
    Repl::new(&system, input, &mut output)
        .run()
        .await
        .expect("repl");
    let output = String::from_utf8(output).expect("utf8");

    let at = |needle: &str| {
        output
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} missing from:\n{output}"))
    };
    let running = at("Running workflow...\n");
    let design = at("Step 1: Designing schema...\n");
    let build = at("Step 2: Building database...\n");
    let analyze = at("Step 4: Analyzing data...\n");
    let report = at("Analysis result:\n");
    assert!(running < design && design < build && build < analyze && analyze < report);
    assert!(!output.contains("Step 3:"), "sample data was not requested");
    assert!(output.contains("Insights:\nThere are no notes yet.\n"));

    let _ = fs::remove_file(db.path());
}
