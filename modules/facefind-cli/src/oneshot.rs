//! Non-interactive subcommands: one search, print the outcome, exit.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use facefind_media::SelectedFile;
use facefind_workflow::{WorkflowController, WorkflowState};

use crate::render;

/// `facefind search --image <path>`
pub async fn search(controller: &mut WorkflowController, image: &Path) -> Result<ExitCode> {
    let file = SelectedFile::from_path(image)
        .await
        .with_context(|| format!("Cannot use {}", image.display()))?;

    controller.select_file(file).await?;
    finish(controller).await
}

/// `facefind snap`: open the camera and take the still as soon as it is ready.
pub async fn snap(controller: &mut WorkflowController) -> Result<ExitCode> {
    controller.start_camera().await?;
    if controller.state() != WorkflowState::CapturingMedia {
        render::print(&controller.screen());
        return Ok(ExitCode::from(1));
    }

    controller.capture().await?;
    if controller.state() != WorkflowState::Processing {
        render::print(&controller.screen());
        return Ok(ExitCode::from(1));
    }
    finish(controller).await
}

async fn finish(controller: &mut WorkflowController) -> Result<ExitCode> {
    let outcome = crate::interactive::follow_progress(controller).await?;
    render::print(&controller.screen());
    Ok(match outcome {
        WorkflowState::Error => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    })
}
