use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::backup;
use crate::config;
use crate::console::Console;
use crate::deploy;
use crate::deps;
use crate::process::SystemRunner;
use crate::project;
use crate::prompt::TerminalPrompt;
use crate::session::Session;
use crate::status;

#[derive(Debug, Parser)]
#[command(
    name = "rit-admin",
    about = "Resume Improvement Tool admin script",
    disable_help_flag = true
)]
pub struct RootCmd {
    /// Override project root (defaults to the nearest directory with `admin.yaml` or `.git`)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Print version (long form only; `-V` is treated as a command token)
    #[arg(long)]
    pub version: bool,

    /// Command to run; `help` lists them
    #[arg(allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Anything after the command is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    DeployFrontend,
    DeployBackend,
    DeployAll,
    Status,
    UpdateDeps,
    Backup,
    Help,
}

impl AdminCommand {
    /// Order shown in the help table.
    pub const ALL: [AdminCommand; 7] = [
        AdminCommand::DeployFrontend,
        AdminCommand::DeployBackend,
        AdminCommand::DeployAll,
        AdminCommand::Status,
        AdminCommand::UpdateDeps,
        AdminCommand::Backup,
        AdminCommand::Help,
    ];

    /// Case-insensitive lookup of a command token.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "deploy-frontend" => Some(Self::DeployFrontend),
            "deploy-backend" => Some(Self::DeployBackend),
            "deploy-all" => Some(Self::DeployAll),
            "status" => Some(Self::Status),
            "update-deps" => Some(Self::UpdateDeps),
            "backup" => Some(Self::Backup),
            "help" | "--help" | "-h" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DeployFrontend => "deploy-frontend",
            Self::DeployBackend => "deploy-backend",
            Self::DeployAll => "deploy-all",
            Self::Status => "status",
            Self::UpdateDeps => "update-deps",
            Self::Backup => "backup",
            Self::Help => "help",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::DeployFrontend => "Deploy frontend to GitHub Pages",
            Self::DeployBackend => "Deploy backend to Heroku",
            Self::DeployAll => "Deploy both frontend and backend",
            Self::Status => "Check status of deployments",
            Self::UpdateDeps => "Update npm dependencies",
            Self::Backup => "Create a project backup",
            Self::Help => "Show this help information",
        }
    }
}

/// Resolves the positional token. Unknown tokens are reported and fall back to help.
fn resolve(token: Option<&str>, console: &Console) -> AdminCommand {
    let Some(token) = token else {
        return AdminCommand::Help;
    };
    AdminCommand::parse(token).unwrap_or_else(|| {
        console.error(&format!("Unknown command: {}", token.to_lowercase()));
        AdminCommand::Help
    })
}

pub fn print_help(console: &Console) {
    console.header("Resume Improvement Tool Admin Script");
    console.plain("Available commands:");
    for cmd in AdminCommand::ALL {
        console.plain(&format!("  {:<17} - {}", cmd.name(), cmd.summary()));
    }
    console.plain("\nUsage: rit-admin [command]");
}

pub async fn dispatch(session: &Session<'_>, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::DeployFrontend => {
            deploy::deploy_frontend(session)?;
        }
        AdminCommand::DeployBackend => {
            deploy::deploy_backend(session)?;
        }
        AdminCommand::DeployAll => {
            deploy::deploy_all(session)?;
        }
        AdminCommand::Status => {
            let client = status::http_client(session.config)?;
            status::check_status(session, &client).await?;
        }
        AdminCommand::UpdateDeps => deps::update_dependencies(session)?,
        AdminCommand::Backup => backup::create_backup(session)?,
        AdminCommand::Help => print_help(session.console),
    }
    Ok(())
}

pub async fn run(root: RootCmd) -> Result<()> {
    let console = Console::stdout();
    if root.version {
        console.plain(&format!("rit-admin {}", env!("CARGO_PKG_VERSION")));
        return Ok(());
    }
    let command = resolve(root.command.as_deref(), &console);
    if !root.rest.is_empty() {
        tracing::debug!(ignored = ?root.rest, "extra arguments ignored");
    }

    // Help needs no project, so it works from anywhere.
    if command == AdminCommand::Help {
        print_help(&console);
        return Ok(());
    }

    let layout = project::load_layout(root.project)?;
    let config = config::load(&layout)?;
    tracing::debug!(root = %layout.root.display(), command = command.name(), "dispatch");

    let session = Session {
        config: &config,
        layout: &layout,
        runner: &SystemRunner,
        prompt: &TerminalPrompt,
        console: &console,
    };
    dispatch(&session, command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{failed, FakeRunner};
    use crate::prompt::scripted::ScriptedPrompt;
    use crate::session::testing::Harness;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        RootCmd::command().debug_assert();
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!(
            AdminCommand::parse("Deploy-Frontend"),
            Some(AdminCommand::DeployFrontend)
        );
        assert_eq!(AdminCommand::parse("STATUS"), Some(AdminCommand::Status));
        assert_eq!(AdminCommand::parse("--HELP"), Some(AdminCommand::Help));
        assert_eq!(AdminCommand::parse("-h"), Some(AdminCommand::Help));
        assert_eq!(AdminCommand::parse("deploy"), None);
        assert_eq!(AdminCommand::parse(""), None);
    }

    #[test]
    fn every_listed_command_parses_back() {
        for cmd in AdminCommand::ALL {
            assert_eq!(AdminCommand::parse(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn unknown_token_is_named_and_falls_back_to_help() {
        let console = Console::capture();
        assert_eq!(resolve(Some("Publish"), &console), AdminCommand::Help);
        assert!(console.captured().contains("Unknown command: publish"));

        let quiet = Console::capture();
        assert_eq!(resolve(None, &quiet), AdminCommand::Help);
        assert!(quiet.captured().is_empty());
    }

    #[test]
    fn positional_accepts_help_flags() {
        let parsed = RootCmd::try_parse_from(["rit-admin", "--help"]).unwrap();
        assert_eq!(parsed.command.as_deref(), Some("--help"));
        let parsed = RootCmd::try_parse_from(["rit-admin", "-h"]).unwrap();
        assert_eq!(parsed.command.as_deref(), Some("-h"));
    }

    #[test]
    fn short_version_is_just_another_token() {
        let parsed = RootCmd::try_parse_from(["rit-admin", "-V"]).unwrap();
        assert!(!parsed.version);
        assert_eq!(parsed.command.as_deref(), Some("-V"));

        let parsed = RootCmd::try_parse_from(["rit-admin", "--version"]).unwrap();
        assert!(parsed.version);
        assert_eq!(parsed.command, None);
    }

    #[test]
    fn help_lists_every_command() {
        let console = Console::capture();
        print_help(&console);
        let out = console.captured();
        for cmd in AdminCommand::ALL {
            assert!(out.contains(cmd.name()), "missing {}", cmd.name());
        }
        assert!(out.contains("  update-deps       - Update npm dependencies"));
        assert!(out.ends_with("Usage: rit-admin [command]\n"));
    }

    #[tokio::test]
    async fn dispatch_deploy_all_runs_both_sides() {
        let h = Harness::new(
            FakeRunner::new().respond(&["npx"], failed(1, "publish refused")),
            ScriptedPrompt::default(),
        );
        dispatch(&h.session(), AdminCommand::DeployAll).await.unwrap();

        let lines = h.runner.command_lines();
        assert!(lines.iter().any(|l| l.starts_with("npx gh-pages")));
        assert_eq!(lines.last().unwrap(), "git push heroku main");
    }
}
