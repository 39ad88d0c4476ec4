use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::config::AdminConfig;
use crate::console::Console;
use crate::git;
use crate::session::Session;

/// Result of one health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    Up,
    UnexpectedStatus(u16),
    /// Transport error text, including its causes.
    Unreachable(String),
}

pub fn classify(status: Result<u16, String>) -> HealthOutcome {
    match status {
        Ok(200) => HealthOutcome::Up,
        Ok(code) => HealthOutcome::UnexpectedStatus(code),
        Err(err) => HealthOutcome::Unreachable(err),
    }
}

pub fn http_client(config: &AdminConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("build http client")
}

async fn probe(client: &reqwest::Client, url: &str) -> (HealthOutcome, Option<reqwest::Response>) {
    debug!(url, "probe");
    match client.get(url).send().await {
        Ok(response) => (classify(Ok(response.status().as_u16())), Some(response)),
        Err(err) => (classify(Err(format!("{:#}", anyhow::Error::from(err)))), None),
    }
}

fn report(console: &Console, name: &str, outcome: &HealthOutcome) {
    match outcome {
        HealthOutcome::Up => console.success(&format!("{name} is up and running")),
        HealthOutcome::UnexpectedStatus(code) => {
            console.warning(&format!("{name} returned status code: {code}"))
        }
        HealthOutcome::Unreachable(err) => {
            console.error(&format!("Could not connect to {name}: {err}"))
        }
    }
}

/// Pretty JSON for a health body, or nothing if it is not JSON.
async fn pretty_body(response: reqwest::Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Probes both deployments and reports git cleanliness. Network problems are only printed.
pub async fn check_status(session: &Session<'_>, client: &reqwest::Client) -> Result<()> {
    let console = session.console;
    let config = session.config;
    console.header("Checking Deployment Status");

    console.info("Checking GitHub Pages status...");
    let (outcome, _) = probe(client, &config.frontend.pages_url).await;
    report(console, "GitHub Pages", &outcome);

    console.info("Checking Heroku status...");
    let (outcome, response) = probe(client, &config.backend.health_url()).await;
    report(console, "Heroku API", &outcome);
    if let (HealthOutcome::Up, Some(response)) = (&outcome, response) {
        if let Some(body) = pretty_body(response).await {
            console.info(&format!("API Status: {body}"));
        }
    }

    let changes = git::short_status(session)?;
    if changes.is_empty() {
        console.success("Git repository is clean");
    } else {
        console.warning("You have uncommitted changes:");
        console.plain(&changes);
    }
    Ok(())
}
