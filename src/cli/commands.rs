//! Command implementations for the Verbena CLI.

use std::path::Path;
use std::sync::Arc;

use crate::batch::{RefreshJob, RefreshOptions};
use crate::cache::MemoryCache;
use crate::catalog::dataset::Dataset;
use crate::catalog::memory::MemoryCatalog;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::engine::Recommender;
use crate::error::Result;

/// Execute a CLI command.
pub fn execute_command(args: VerbenaArgs) -> Result<()> {
    match &args.command {
        Command::Recommend(recommend_args) => recommend(recommend_args.clone(), &args),
        Command::Similar(similar_args) => similar(similar_args.clone(), &args),
        Command::Trending(trending_args) => trending(trending_args.clone(), &args),
        Command::Refresh(refresh_args) => refresh(refresh_args.clone(), &args),
        Command::Stats(stats_args) => stats(stats_args.clone(), &args),
    }
}

/// Load a dataset file into an in-memory recommender.
fn load_recommender(dataset_path: &Path, cli_args: &VerbenaArgs) -> Result<Recommender> {
    if cli_args.verbosity() > 1 {
        println!("Loading dataset from: {}", dataset_path.display());
    }
    let dataset = Dataset::from_path(dataset_path)?;
    let catalog = MemoryCatalog::from_dataset(dataset)?;
    Ok(Recommender::new(
        Arc::new(catalog),
        Arc::new(MemoryCache::new()),
    ))
}

/// Recommend products for a user.
fn recommend(args: RecommendArgs, cli_args: &VerbenaArgs) -> Result<()> {
    let recommender = load_recommender(&args.dataset, cli_args)?;
    let recommendations = recommender.recommend(args.user, args.limit)?;

    if cli_args.verbosity() > 0 && cli_args.output_format == OutputFormat::Human {
        println!(
            "Top {} recommendations for user {}:",
            recommendations.items.len(),
            args.user
        );
    }
    print_recommendations(&recommendations, cli_args)
}

/// Find products similar to a reference product.
fn similar(args: SimilarArgs, cli_args: &VerbenaArgs) -> Result<()> {
    let recommender = load_recommender(&args.dataset, cli_args)?;
    let similar = recommender.similar_products(args.product, args.limit)?;

    if cli_args.verbosity() > 0 && cli_args.output_format == OutputFormat::Human {
        println!("Products similar to product {}:", args.product);
    }
    print_similar_products(&similar, cli_args)
}

/// Show site-wide trending products.
fn trending(args: TrendingArgs, cli_args: &VerbenaArgs) -> Result<()> {
    let recommender = load_recommender(&args.dataset, cli_args)?;
    let trending = recommender.trending_products(args.days, args.limit)?;

    if cli_args.verbosity() > 0 && cli_args.output_format == OutputFormat::Human {
        println!("Trending over the last {} days:", args.days);
    }
    print_trending(&trending, cli_args)
}

/// Run the batch cache refresh.
fn refresh(args: RefreshArgs, cli_args: &VerbenaArgs) -> Result<()> {
    let recommender = load_recommender(&args.dataset, cli_args)?;
    let options = RefreshOptions {
        max_users: args.users,
        max_products: args.products,
        rebuild_vectors: args.rebuild_vectors,
    };
    let summary = RefreshJob::new(&recommender, options).run()?;

    print_refresh_summary(&summary, cli_args)
}

/// Show corpus statistics.
fn stats(args: StatsArgs, cli_args: &VerbenaArgs) -> Result<()> {
    let recommender = load_recommender(&args.dataset, cli_args)?;
    let stats = recommender.stats()?;

    print_stats(&stats, cli_args)
}
