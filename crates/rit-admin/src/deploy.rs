use anyhow::Result;

use crate::git;
use crate::process::{Invocation, Strictness};
use crate::session::Session;

/// Builds the frontend and publishes it to GitHub Pages. Returns whether it got published.
pub fn deploy_frontend(session: &Session) -> Result<bool> {
    let console = session.console;
    let frontend = &session.config.frontend;
    console.header("Deploying Frontend to GitHub Pages");

    if git::is_dirty(session)? {
        console.warning("There are uncommitted changes in the repository.");
        if !session.prompt.confirm("Do you want to continue anyway?")? {
            console.info("Deployment cancelled.");
            return Ok(false);
        }
    }

    console.info("Building frontend...");
    let build = session.run(
        &Invocation::from_argv(&frontend.build_command)?,
        Strictness::Lenient,
    )?;
    if !build.success() {
        console.error("Frontend build failed:");
        console.plain(&build.stderr);
        return Ok(false);
    }
    console.success("Frontend built successfully");

    console.info("Deploying to GitHub Pages...");
    let publish = Invocation::from_argv(&frontend.publish_command)?.args([
        "-d",
        frontend.build_dir.as_str(),
        "-r",
        frontend.pages_repo_url.as_str(),
    ]);
    let publish = session.run(&publish, Strictness::Lenient)?;
    if !publish.success() {
        console.error("GitHub Pages deployment failed:");
        console.plain(&publish.stderr);
        return Ok(false);
    }

    console.success("Frontend deployed to GitHub Pages");
    console.info(&format!("Frontend URL: {}", frontend.pages_url));
    Ok(true)
}

/// Optionally commits pending work, then pushes to the Heroku remote.
pub fn deploy_backend(session: &Session) -> Result<bool> {
    let console = session.console;
    let backend = &session.config.backend;
    console.header("Deploying Backend to Heroku");

    if git::is_dirty(session)? {
        console.warning("There are uncommitted changes in the repository.");
        if session
            .prompt
            .confirm("Do you want to commit them before deployment?")?
        {
            let message = session.prompt.input("Enter commit message")?;
            git::stage_all(session)?;
            git::commit(session, &message)?;
            console.success("Changes committed");
        }
    }

    console.info("Deploying to Heroku...");
    let push = git::push(session, &backend.remote, &backend.branch)?;
    if !push.success() {
        console.error("Heroku deployment failed:");
        console.plain(&push.stderr);
        return Ok(false);
    }

    console.success("Backend deployed to Heroku");
    console.info(&format!("Backend API URL: {}", backend.url));
    Ok(true)
}

/// Runs both deploys; the backend goes out even when the frontend failed.
pub fn deploy_all(session: &Session) -> Result<bool> {
    let frontend_ok = deploy_frontend(session)?;
    let backend_ok = deploy_backend(session)?;

    let all_ok = frontend_ok && backend_ok;
    if all_ok {
        session
            .console
            .success("Both frontend and backend deployed successfully!");
    } else {
        session
            .console
            .warning("There were issues with the deployment. Check the logs above.");
    }
    Ok(all_ok)
}
