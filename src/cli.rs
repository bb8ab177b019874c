// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the shared target flags.

use clap::{Args, Parser, Subcommand};
use ferry::config::{DEFAULT_LIST_ITEMS, Options};
use ferry::output::OutputMode;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Build, push and roll out container images to a managed orchestration service")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: ferry.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and push the image for the checked-out commit
    Build {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Build, push and roll out the checked-out commit
    Deploy {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Redeploy an earlier commit, then restore the working tree
    Rollback {
        #[command(flatten)]
        target: TargetArgs,

        /// Commit, tag or branch to redeploy
        #[arg(long)]
        target_commit: Option<String>,
    },

    /// List recent task definition revisions of the family
    List {
        #[command(flatten)]
        target: TargetArgs,

        /// Number of revisions to show
        #[arg(long, default_value_t = DEFAULT_LIST_ITEMS)]
        max_items: usize,
    },
}

/// Where to build from and deploy to. Overrides the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Cloud region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Registry repository name
    #[arg(long)]
    pub repository: Option<String>,

    /// Cluster running the service
    #[arg(long)]
    pub cluster: Option<String>,

    /// Service to update
    #[arg(long)]
    pub service: Option<String>,

    /// Task definition family
    #[arg(long)]
    pub family: Option<String>,

    /// Build context directory [default: .]
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Dockerfile path relative to the context [default: Dockerfile]
    #[arg(long)]
    pub dockerfile: Option<String>,

    /// How long to wait for the service to stabilize, e.g. "10m" [default: 15m]
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub wait_timeout: Option<Duration>,

    /// Named credentials profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

impl TargetArgs {
    pub fn into_options(self) -> Options {
        Options {
            region: self.region,
            repository: self.repository,
            cluster: self.cluster,
            service: self.service,
            family: self.family,
            context: self.context,
            dockerfile: self.dockerfile,
            profile: self.profile,
            wait_timeout: self.wait_timeout,
            defaults: Default::default(),
        }
    }
}
