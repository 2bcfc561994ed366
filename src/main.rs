//! dubdesk - Client for the dubbing studio dashboard API
//!
//! Entry point for the dubdesk CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dubdesk::cli::{
    Cli, Commands, ProjectsCommand, SourceCommand, UploadCommand, WorkspaceCommand,
};
use dubdesk::config::Settings;

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Local-only commands run without reading the config file.
    let needs_config = !matches!(
        cli.command,
        Commands::Completions { .. } | Commands::Workspace(_)
    );
    let settings = if needs_config {
        Settings::load()?
    } else {
        Settings::default()
    };

    let level = if cli.verbose {
        "debug"
    } else if needs_config {
        settings.general.log_level.as_str()
    } else {
        "warn"
    };
    init_logging(level);

    match cli.command {
        Commands::Completions { shell } => {
            dubdesk::cli::completions::print(shell);
        }
        Commands::Workspace(WorkspaceCommand::Resolve {
            location,
            open,
            step,
            close,
        }) => {
            dubdesk::cli::commands::resolve_workspace(&location, open, step, close)?;
        }
        Commands::Projects(ProjectsCommand::List { json }) => {
            dubdesk::cli::commands::list_projects(&settings, json).await?;
        }
        Commands::Projects(ProjectsCommand::Show { id, json }) => {
            dubdesk::cli::commands::show_project(&settings, &id, json).await?;
        }
        Commands::Projects(ProjectsCommand::Create(args)) => {
            dubdesk::cli::commands::create_project(&settings, args).await?;
        }
        Commands::Upload(UploadCommand::Prepare {
            project,
            file,
            content_type,
            owner_code,
        }) => {
            dubdesk::cli::commands::prepare_upload(
                &settings,
                &project,
                &file,
                content_type,
                owner_code,
            )
            .await?;
        }
        Commands::Source(SourceCommand::Youtube { project, url }) => {
            dubdesk::cli::commands::register_youtube(&settings, &project, &url).await?;
        }
        Commands::Config(config_cmd) => {
            dubdesk::cli::commands::config_command(&settings, config_cmd)?;
        }
    }

    Ok(())
}
