//! Command-line arguments for `router-sync`.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "router-sync",
    version,
    about = "Replay router actions against a router tree and print the resulting location",
    long_about = "Builds a router tree, applies each step in order and prints the \
                  serialized location together with every router's derived state.\n\n\
                  Steps: `router.action[=data]`, `back`, `forward`, `go:<n>`."
)]
pub struct Cli {
    /// Config file (default: platform config dir, `router-sync/config.toml`).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Router tree declaration (TOML, or JSON with a `.json` extension).
    /// Overrides the `[tree]` table of the config.
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Initial serialized location.
    #[arg(long, value_name = "LOCATION", default_value = "/")]
    pub location: String,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Steps to apply, in order.
    #[arg(value_name = "STEP")]
    pub steps: Vec<Step>,
}

/// One replayed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Action {
        router: String,
        action: String,
        data: Option<String>,
    },
    Back,
    Forward,
    Go(i64),
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back" => return Ok(Step::Back),
            "forward" => return Ok(Step::Forward),
            _ => {}
        }
        if let Some(offset) = s.strip_prefix("go:") {
            return offset
                .parse()
                .map(Step::Go)
                .map_err(|_| format!("invalid history offset '{offset}'"));
        }

        let (target, data) = match s.split_once('=') {
            Some((target, data)) => (target, Some(data.to_string())),
            None => (s, None),
        };
        let Some((router, action)) = target.rsplit_once('.') else {
            return Err(format!(
                "invalid step '{s}': expected router.action[=data], back, forward or go:<n>"
            ));
        };
        if router.is_empty() || action.is_empty() {
            return Err(format!("invalid step '{s}': empty router or action"));
        }
        Ok(Step::Action {
            router: router.to_string(),
            action: action.to_string(),
            data,
        })
    }
}
