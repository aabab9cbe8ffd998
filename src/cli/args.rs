//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::{Backend, RawSettings};

/// AWS CodeBuild utility tool
#[derive(Parser, Debug)]
#[command(name = "cb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend to use
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// AWS profile name
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// AWS region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Give up after this many seconds
    #[arg(
        long,
        value_name = "SECS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Config file (default: $XDG_CONFIG_HOME/cb/cb.toml)
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings given on the command line, as the topmost config layer.
    pub fn settings_overrides(&self) -> RawSettings {
        RawSettings {
            backend: self.backend,
            profile: self.profile.clone(),
            region: self.region.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List CodeBuild projects or recent builds
    #[command(visible_alias = "ls")]
    List {
        /// CodeBuild project name
        project: Option<String>,
    },

    /// Display build log
    Less {
        /// CodeBuild build ID
        build_id: String,
    },

    /// Rerun build
    Rerun {
        /// CodeBuild build ID
        build_id: String,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
