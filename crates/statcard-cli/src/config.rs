//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use statcard_core::domain::Blueprint;
use thiserror::Error;

/// Render GitHub statistics cards for usernames.
#[derive(Debug, Parser)]
#[command(name = "statcard", version, about)]
pub struct Args {
    /// Usernames to render. Read one per line from stdin when none are given.
    pub usernames: Vec<String>,

    /// GitHub token; raises the API rate limit.
    #[arg(long, env = "STATCARD_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "STATCARD_API_BASE", default_value = "https://api.github.com")]
    pub api_base: String,

    /// Directory the rendered cards are written to.
    #[arg(long, env = "STATCARD_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// HTML blueprint replacing the built-in card template.
    #[arg(long, env = "STATCARD_BLUEPRINT")]
    pub blueprint: Option<PathBuf>,

    /// Retries per GitHub request on rate limits and transient failures.
    #[arg(long, env = "STATCARD_RETRIES", default_value_t = 2)]
    pub retries: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api base must be an http(s) URL, got {0:?}")]
    InvalidApiBase(String),

    #[error("github token is set but empty")]
    EmptyToken,

    #[error("cannot read blueprint {}: {source}", .path.display())]
    Blueprint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory {} does not exist", .0.display())]
    MissingOutputDir(PathBuf),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub usernames: Vec<String>,
    pub github_token: Option<String>,
    /// Without trailing slash.
    pub api_base: String,
    pub output_dir: PathBuf,
    pub blueprint: Blueprint,
    pub retries: u32,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let api_base = args.api_base.trim().trim_end_matches('/').to_string();
        if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
            return Err(ConfigError::InvalidApiBase(args.api_base));
        }

        let github_token = match args.github_token {
            Some(token) if token.trim().is_empty() => return Err(ConfigError::EmptyToken),
            Some(token) => Some(token.trim().to_string()),
            None => None,
        };

        if !args.output_dir.is_dir() {
            return Err(ConfigError::MissingOutputDir(args.output_dir));
        }

        let blueprint = match args.blueprint {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(html) => Blueprint::new(html),
                Err(source) => return Err(ConfigError::Blueprint { path, source }),
            },
            None => Blueprint::default(),
        };

        Ok(Self {
            usernames: args.usernames,
            github_token,
            api_base,
            output_dir: args.output_dir,
            blueprint,
            retries: args.retries,
        })
    }
}
