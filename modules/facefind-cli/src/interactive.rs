//! Interactive workflow: menus between views, a progress bar while searching.

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use facefind_media::SelectedFile;
use facefind_workflow::{DismissVia, View, WorkflowController, WorkflowState};
use indicatif::{ProgressBar, ProgressStyle};

use crate::render;

pub async fn run(controller: &mut WorkflowController) -> Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        let screen = controller.screen();
        render::print(&screen);
        if screen.notice.is_some() {
            controller.dismiss_notice().await?;
        }

        let keep_going = match controller.state() {
            WorkflowState::Idle => landing(controller, &theme).await?,
            WorkflowState::CapturingMedia => camera(controller, &theme).await?,
            WorkflowState::Processing => {
                follow_progress(controller).await?;
                true
            }
            WorkflowState::Results => results(controller, &theme).await?,
            WorkflowState::NoMatches | WorkflowState::Error => retry(controller, &theme).await?,
        };

        if !keep_going {
            break;
        }
    }

    Ok(())
}

/// Show a progress bar until the search has an outcome.
pub async fn follow_progress(controller: &mut WorkflowController) -> Result<WorkflowState> {
    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}%")?);
    bar.set_message("Finding Your Photos...");

    while controller.state() == WorkflowState::Processing {
        if !controller.pump().await? {
            bar.abandon();
            bail!("Search stopped without an outcome");
        }
        bar.set_position(controller.record().progress.into());
    }

    bar.finish_and_clear();
    Ok(controller.state())
}

async fn landing(controller: &mut WorkflowController, theme: &ColorfulTheme) -> Result<bool> {
    let items = ["Take a selfie", "Upload a photo", "Exit"];
    let choice = Select::with_theme(theme)
        .with_prompt("How would you like to search?")
        .items(&items)
        .default(0)
        .interact()?;

    match choice {
        0 => controller.start_camera().await?,
        1 => upload(controller, theme).await?,
        _ => return Ok(false),
    }
    Ok(true)
}

async fn upload(controller: &mut WorkflowController, theme: &ColorfulTheme) -> Result<()> {
    let path: String = Input::with_theme(theme)
        .with_prompt("Path to photo")
        .interact_text()?;

    let file = match SelectedFile::from_path(PathBuf::from(path.trim())).await {
        Ok(file) => file,
        Err(e) => {
            println!("{}", style(e).red());
            return Ok(());
        }
    };

    // Oversized files are turned away here and never enter the workflow.
    if let Err(e) = controller.select_file(file).await {
        println!("{}", style(format!("! {e}")).red().bold());
    }
    Ok(())
}

async fn camera(controller: &mut WorkflowController, theme: &ColorfulTheme) -> Result<bool> {
    let items = ["Capture", "Cancel"];
    let choice = Select::with_theme(theme)
        .with_prompt("Camera")
        .items(&items)
        .default(0)
        .interact()?;

    match choice {
        0 => controller.capture().await?,
        _ => controller.cancel_camera().await?,
    }
    Ok(true)
}

async fn results(controller: &mut WorkflowController, theme: &ColorfulTheme) -> Result<bool> {
    let screen = controller.screen();
    let View::Results(ref view) = screen.view else {
        return Ok(true);
    };

    let mut items: Vec<String> = view.photos.iter().map(|p| format!("View {}", p.label)).collect();
    items.push(view.action.clone());
    items.push("Exit".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt("Your photos")
        .items(&items)
        .default(0)
        .interact()?;

    let photos = view.photos.len();
    if choice < photos {
        controller.open_photo(choice).await?;
        render::print(&controller.screen());
        Select::with_theme(theme)
            .items(&["Close"])
            .default(0)
            .interact()?;
        controller.close_photo(DismissVia::CloseButton).await?;
        Ok(true)
    } else if choice == photos {
        controller.reset().await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn retry(controller: &mut WorkflowController, theme: &ColorfulTheme) -> Result<bool> {
    let screen = controller.screen();
    let action = render::reset_action(&screen.view).unwrap_or("Try Again");
    let items = [action, "Exit"];

    let choice = Select::with_theme(theme)
        .items(&items)
        .default(0)
        .interact()?;

    if choice == 0 {
        controller.reset().await?;
        Ok(true)
    } else {
        Ok(false)
    }
}
