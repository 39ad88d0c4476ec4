use anyhow::Result;

use crate::process::{Invocation, Strictness};
use crate::session::Session;

/// Runs the package-manager update for the frontend (project root) and the backend directory.
/// A failure in one does not stop the other.
pub fn update_dependencies(session: &Session) -> Result<()> {
    let console = session.console;
    console.header("Updating Dependencies");

    let update = Invocation::from_argv(&session.config.update_command)?;
    let targets = [
        ("Frontend", update.clone()),
        (
            "Backend",
            update.current_dir(session.layout.backend_dir(session.config)),
        ),
    ];

    for (label, invocation) in targets {
        console.info(&format!("Updating {} dependencies...", label.to_lowercase()));
        let out = session.run(&invocation, Strictness::Lenient)?;
        if out.success() {
            console.success(&format!("{label} dependencies updated"));
        } else {
            console.error(&format!("{label} dependency update failed:"));
            console.plain(&out.stderr);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{failed, FakeRunner};
    use crate::prompt::scripted::ScriptedPrompt;
    use crate::session::testing::Harness;

    #[test]
    fn updates_root_then_backend_dir() {
        let h = Harness::new(FakeRunner::new(), ScriptedPrompt::default());
        update_dependencies(&h.session()).unwrap();

        let calls = h.runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].cwd.as_deref(), Some(h.layout.root.as_path()));
        assert_eq!(
            calls[1].cwd.as_deref(),
            Some(h.layout.root.join("server").as_path())
        );
        assert!(calls.iter().all(|c| c.to_string() == "npm update"));
        assert!(h.output().contains("Frontend dependencies updated"));
        assert!(h.output().contains("Backend dependencies updated"));
    }

    #[test]
    fn each_directory_is_attempted_despite_failures() {
        let h = Harness::new(
            FakeRunner::new().respond(&["npm", "update"], failed(1, "ERESOLVE")),
            ScriptedPrompt::default(),
        );
        update_dependencies(&h.session()).unwrap();

        assert_eq!(h.runner.calls().len(), 2);
        assert!(h.output().contains("Frontend dependency update failed:"));
        assert!(h.output().contains("Backend dependency update failed:"));
        assert!(h.output().contains("ERESOLVE"));
    }
}
