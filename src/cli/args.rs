//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::workspace::CreationStep;

/// dubdesk - Client for the dubbing studio dashboard API
#[derive(Parser, Debug)]
#[command(name = "dubdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse and create projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Direct-to-storage uploads
    #[command(subcommand)]
    Upload(UploadCommand),

    /// Register a project source
    #[command(subcommand)]
    Source(SourceCommand),

    /// Workspace navigation state
    #[command(subcommand)]
    Workspace(WorkspaceCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects in the workspace
    List {
        /// Print the raw JSON list
        #[arg(long)]
        json: bool,
    },

    /// Show one project with its assets
    Show {
        /// Project ID
        id: String,

        /// Print the raw JSON detail
        #[arg(long)]
        json: bool,
    },

    /// Create a project from a file or a YouTube video
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project title
    #[arg(short, long)]
    pub title: String,

    /// Target language (repeat for several)
    #[arg(short = 'l', long = "target-language", required = true)]
    pub target_languages: Vec<String>,

    /// Source language (omit with --detect)
    #[arg(short, long, conflicts_with = "detect")]
    pub source_language: Option<String>,

    /// Detect the source language automatically
    #[arg(long)]
    pub detect: bool,

    /// Number of speakers in the source
    #[arg(long, default_value = "1")]
    pub speakers: u32,

    /// YouTube video to dub
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub youtube: Option<String>,

    /// Local video file to dub
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Owner code (defaults to api.owner_code)
    #[arg(long)]
    pub owner_code: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum UploadCommand {
    /// Request an upload target for a local file
    Prepare {
        /// Project ID
        #[arg(short, long)]
        project: String,

        /// File to upload
        #[arg(short, long)]
        file: PathBuf,

        /// Media type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,

        /// Owner code (defaults to api.owner_code)
        #[arg(long)]
        owner_code: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Use a YouTube video as the project source
    Youtube {
        /// Project ID
        #[arg(short, long)]
        project: String,

        /// Video URL
        #[arg(short, long)]
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// Resolve the workspace view for a URL or query string
    Resolve {
        /// Workspace URL or query string (e.g. "?section=projects&create=upload")
        location: String,

        /// Open the creation modal at a step after loading
        #[arg(long, value_enum, conflicts_with_all = ["step", "close"])]
        open: Option<StepArg>,

        /// Move the creation modal to a step after loading
        #[arg(long, value_enum, conflicts_with = "close")]
        step: Option<StepArg>,

        /// Close the creation modal after loading
        #[arg(long)]
        close: bool,
    },
}

/// Creation modal step as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepArg {
    Upload,
    SettingsA,
    SettingsB,
}

impl From<StepArg> for CreationStep {
    fn from(arg: StepArg) -> Self {
        match arg {
            StepArg::Upload => CreationStep::Upload,
            StepArg::SettingsA => CreationStep::SettingsA,
            StepArg::SettingsB => CreationStep::SettingsB,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
