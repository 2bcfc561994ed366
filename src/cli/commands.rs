//! CLI command implementations

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;

use crate::api::{ApiTransport, HttpTransport};
use crate::cli::args::{ConfigCommand, CreateArgs, StepArg};
use crate::config::Settings;
use crate::projects::{
    due_day, editor_route, PrepareUploadPayload, ProjectDetail, ProjectMutations, ProjectPayload,
    ProjectQueries, ProjectSummary, RegisterYoutubeSourcePayload, SourceType,
};
use crate::workspace::{SearchParams, UiAction, UiState, WorkspaceController, WorkspaceView};

fn build_transport(settings: &Settings) -> Result<Arc<dyn ApiTransport>> {
    let transport = HttpTransport::from_settings(settings)
        .with_context(|| format!("Failed to set up API client for {}", settings.api.base_url))?;
    Ok(Arc::new(transport))
}

fn owner_code(settings: &Settings, explicit: Option<String>) -> String {
    explicit
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| settings.api.owner_code.clone())
}

/// List projects in the workspace
pub async fn list_projects(settings: &Settings, json: bool) -> Result<()> {
    let queries = ProjectQueries::from_settings(build_transport(settings)?, settings);
    let projects = queries.projects().await.context("Failed to load projects")?;

    if json {
        println!("{}", serde_json::to_string_pretty(projects.as_ref())?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!(
        "{:<12} {:<30} {:<11} {:>8} {:<12} {}",
        "ID", "Title", "Status", "Progress", "Due", "Languages"
    );
    println!("{}", "-".repeat(90));

    for project in projects.iter() {
        print_summary_row(project);
    }

    Ok(())
}

fn print_summary_row(project: &ProjectSummary) {
    println!(
        "{:<12} {:<30} {:<11} {:>7.0}% {:<12} {}",
        truncate(&project.id, 12),
        truncate(&project.title, 28),
        project.status,
        project.progress,
        format_due(&project.due_date),
        format_languages(&project.source_language, &project.target_languages)
    );
}

/// Show one project with its assets
pub async fn show_project(settings: &Settings, id: &str, json: bool) -> Result<()> {
    let queries = ProjectQueries::from_settings(build_transport(settings)?, settings);
    let project = queries
        .project(id.trim())
        .await
        .with_context(|| format!("Failed to load project {}", id))?
        .context("A project ID is required")?;

    if json {
        println!("{}", serde_json::to_string_pretty(project.as_ref())?);
        return Ok(());
    }

    print_detail(&project);
    Ok(())
}

fn print_detail(project: &ProjectDetail) {
    println!("Title: {}", project.title);
    println!("ID: {}", project.id);
    println!(
        "Languages: {}",
        format_languages(&project.source_language, &project.target_languages)
    );
    println!("Status: {} ({:.0}%)", project.status, project.progress);
    println!("Due: {}", format_due(&project.due_date));
    println!("Created: {}", project.created_at.format("%Y-%m-%d %H:%M"));
    println!("Speakers: {}", project.speaker_count);
    if let Some(editor) = project.assigned_editor.as_deref() {
        println!("Editor: {}", editor);
    }
    println!("Studio: {}", editor_route(&project.id));

    if let Some(description) = project.description.as_deref() {
        println!();
        println!("{}", description);
    }

    println!();
    if project.assets.is_empty() {
        println!("(No assets yet)");
        return;
    }

    println!("Assets:");
    for asset in &project.assets {
        println!(
            "  {:<10} {:<9} {:>8} {:<8} {:<10} {:>8.1} MB  {}",
            truncate(&asset.language, 10),
            format!("{:?}", asset.kind).to_lowercase(),
            format_duration(asset.duration),
            asset.codec,
            asset.resolution,
            asset.size_mb,
            asset.url
        );
    }
}

/// Create a project from a file or a YouTube video
pub async fn create_project(settings: &Settings, args: CreateArgs) -> Result<()> {
    let (source_type, youtube_url, file_name, file_size) = match (&args.youtube, &args.file) {
        (Some(url), _) => (SourceType::Youtube, Some(url.clone()), None, None),
        (None, Some(path)) => {
            let metadata = tokio::fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (
                SourceType::File,
                None,
                Some(file_name(path)?),
                Some(metadata.len()),
            )
        }
        (None, None) => anyhow::bail!("Either --youtube or --file is required"),
    };

    let payload = ProjectPayload {
        title: args.title,
        source_type,
        detect_automatically: args.detect,
        source_language: args.source_language,
        target_languages: args.target_languages,
        speaker_count: args.speakers,
        youtube_url,
        file_name,
        file_size,
        owner_code: owner_code(settings, args.owner_code),
    };

    let mutations = ProjectMutations::new(build_transport(settings)?);
    let response = mutations
        .create_project(&payload)
        .await
        .context("Failed to create project")?;

    println!("Project created: {} ({})", response.project.title, response.project_id);
    println!("Status: {}", response.project.status);
    if source_type == SourceType::File {
        println!(
            "Next: dubdesk upload prepare --project {} --file <path>",
            response.project_id
        );
    }

    Ok(())
}

/// Request an upload target for a local file
pub async fn prepare_upload(
    settings: &Settings,
    project: &str,
    file: &Path,
    content_type: Option<String>,
    owner: Option<String>,
) -> Result<()> {
    let payload = PrepareUploadPayload {
        project_id: project.trim().to_string(),
        file_name: file_name(file)?,
        content_type: content_type.unwrap_or_else(|| guess_content_type(file).to_string()),
        owner_code: owner_code(settings, owner),
    };

    let mutations = ProjectMutations::new(build_transport(settings)?);
    let response = mutations
        .prepare_upload(&payload)
        .await
        .context("Failed to prepare upload")?;

    println!("Upload URL: {}", response.upload_url);
    println!("Object key: {}", response.object_key);
    if let Some(fields) = response.fields.as_ref().filter(|f| !f.is_empty()) {
        println!("Form fields:");
        for (name, value) in fields {
            println!("  {}={}", name, value);
        }
    }

    Ok(())
}

/// Use a YouTube video as the project source
pub async fn register_youtube(settings: &Settings, project: &str, url: &str) -> Result<()> {
    let mutations = ProjectMutations::new(build_transport(settings)?);
    let response = mutations
        .register_youtube_source(&RegisterYoutubeSourcePayload {
            project_id: project.trim().to_string(),
            youtube_url: url.trim().to_string(),
        })
        .await
        .context("Failed to register YouTube source")?;

    println!(
        "Source registered for {} (status: {})",
        response.project_id, response.status
    );

    Ok(())
}

/// Resolve and print the workspace view for a URL or query string
pub fn resolve_workspace(
    location: &str,
    open: Option<StepArg>,
    step: Option<StepArg>,
    close: bool,
) -> Result<()> {
    let action = match (open, step, close) {
        (Some(step), _, _) => Some(UiAction::OpenProjectCreation(step.into())),
        (None, Some(step), _) => Some(UiAction::SetProjectCreationStep(step.into())),
        (None, None, true) => Some(UiAction::CloseProjectCreation),
        (None, None, false) => None,
    };

    print!("{}", render_workspace(location, action)?);
    Ok(())
}

/// Mount the workspace at `location`, apply `action`, and describe the result.
pub fn render_workspace(location: &str, action: Option<UiAction>) -> Result<String> {
    let mut url = if location.contains("://") {
        Some(Url::parse(location.trim()).with_context(|| format!("Invalid URL: {}", location))?)
    } else {
        None
    };

    let params = match &url {
        Some(url) => SearchParams::from_url(url),
        None => SearchParams::parse(location)?,
    };

    let mut workspace = WorkspaceController::mount(params, UiState::default());
    let view = match action {
        Some(action) => workspace.ui(action),
        None => workspace.view(),
    };

    let location = match url.as_mut() {
        Some(url) => {
            workspace.params().apply_to(url);
            url.to_string()
        }
        None => format!("?{}", workspace.params()),
    };

    Ok(format!(
        "Section: {} ({})\nCreation modal: {}\nLocation: {}\n",
        view.section,
        view.section.title(),
        describe_modal(&view),
        location
    ))
}

fn describe_modal(view: &WorkspaceView) -> String {
    match view.step {
        Some(step) if view.step_requested => format!("open at {} (requested by URL)", step),
        Some(step) => format!("open at {}", step),
        None => "closed".to_string(),
    }
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Not a file path: {}", path.display()))
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "srt" => "application/x-subrip",
        "vtt" => "text/vtt",
        _ => "application/octet-stream",
    }
}

fn format_languages(source: &str, targets: &[String]) -> String {
    format!("{} -> {}", source, targets.join(", "))
}

// Unparseable due dates are shown as sent.
fn format_due(raw: &str) -> String {
    due_day(raw)
        .map(|day| day.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
