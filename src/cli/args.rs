//! Command line argument parsing for the Verbena CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Verbena - hybrid product recommendation engine
#[derive(Parser, Debug, Clone)]
#[command(name = "verbena")]
#[command(about = "A hybrid product recommendation engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct VerbenaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl VerbenaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend products for a user
    Recommend(RecommendArgs),

    /// Find products similar to a product
    Similar(SimilarArgs),

    /// Show site-wide trending products
    Trending(TrendingArgs),

    /// Precompute and cache recommendations (batch refresh)
    Refresh(RefreshArgs),

    /// Show corpus statistics
    Stats(StatsArgs),
}

/// Arguments for the recommend command
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Path to the dataset file (JSON)
    #[arg(value_name = "DATASET_FILE")]
    pub dataset: PathBuf,

    /// User to recommend for
    #[arg(value_name = "USER_ID")]
    pub user: u64,

    /// Maximum number of recommendations
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for the similar command
#[derive(Parser, Debug, Clone)]
pub struct SimilarArgs {
    /// Path to the dataset file (JSON)
    #[arg(value_name = "DATASET_FILE")]
    pub dataset: PathBuf,

    /// Reference product
    #[arg(value_name = "PRODUCT_ID")]
    pub product: u64,

    /// Maximum number of similar products
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for the trending command
#[derive(Parser, Debug, Clone)]
pub struct TrendingArgs {
    /// Path to the dataset file (JSON)
    #[arg(value_name = "DATASET_FILE")]
    pub dataset: PathBuf,

    /// Trailing window in days
    #[arg(long, default_value_t = 7)]
    pub days: i64,

    /// Maximum number of trending products
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for the refresh command
#[derive(Parser, Debug, Clone)]
pub struct RefreshArgs {
    /// Path to the dataset file (JSON)
    #[arg(value_name = "DATASET_FILE")]
    pub dataset: PathBuf,

    /// Number of most active users to process (default: all)
    #[arg(long)]
    pub users: Option<usize>,

    /// Number of most popular products to process (default: 100)
    #[arg(long)]
    pub products: Option<usize>,

    /// Rebuild product feature vectors before caching
    #[arg(long)]
    pub rebuild_vectors: bool,
}

/// Arguments for the stats command
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the dataset file (JSON)
    #[arg(value_name = "DATASET_FILE")]
    pub dataset: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_recommend_args_parse() {
        let args =
            VerbenaArgs::parse_from(["verbena", "recommend", "data.json", "42", "-n", "10"]);
        match args.command {
            Command::Recommend(recommend) => {
                assert_eq!(recommend.user, 42);
                assert_eq!(recommend.limit, 10);
            }
            _ => panic!("expected recommend command"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = VerbenaArgs::parse_from(["verbena", "stats", "data.json"]);
        assert_eq!(args.verbosity(), 1);

        let args = VerbenaArgs::parse_from(["verbena", "-vv", "stats", "data.json"]);
        assert_eq!(args.verbosity(), 2);

        let args = VerbenaArgs::parse_from(["verbena", "-q", "stats", "data.json"]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_refresh_flags() {
        let args = VerbenaArgs::parse_from([
            "verbena",
            "refresh",
            "data.json",
            "--users",
            "100",
            "--rebuild-vectors",
        ]);
        match args.command {
            Command::Refresh(refresh) => {
                assert_eq!(refresh.users, Some(100));
                assert!(refresh.rebuild_vectors);
                assert_eq!(refresh.products, None);
            }
            _ => panic!("expected refresh command"),
        }
    }
}
