//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for huddle
#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(author, version, about = "Group chat where AI workers answer, mention and hand off to each other")]
#[command(long_about = r#"
Huddle posts a message into a group of AI workers and runs the turn loop:

1. Mentioned workers must respond; everyone else may respond or reply SKIP
2. Replies that mention other workers trigger a follow-up turn
3. The chain stops when nobody is mentioned or the depth limit is reached

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./huddle.toml       Project-level config (or ./.huddle.toml)
3. ~/.config/huddle/config.toml   Global config

Example:
  huddle --group backend "@reviewer can you check the migration plan?"
  huddle --group backend "@everyone standup: what are you working on?"
  huddle --group backend --chat --as alice
"#)]
pub struct Cli {
    /// The message to post (not required in chat mode)
    pub message: Option<String>,

    /// Group to post into (defaults to the first configured group)
    #[arg(short, long, value_name = "ID")]
    pub group: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Human member id to post as
    #[arg(long = "as", value_name = "MEMBER", default_value = "you")]
    pub author: String,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for a daily rolling diagnostic log file
    #[arg(long, value_name = "DIR")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Tracing filter directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
