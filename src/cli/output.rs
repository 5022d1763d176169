//! Output formatting for CLI commands.

use serde::Serialize;

use crate::batch::RefreshSummary;
use crate::catalog::ProductId;
use crate::cli::args::{OutputFormat, VerbenaArgs};
use crate::error::Result;
use crate::stats::RecommendationStats;
use crate::types::{Recommendations, SimilarProduct};

/// Output a serializable result as JSON.
pub fn output_json<T: Serialize>(result: &T, args: &VerbenaArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Render a recommendation list for humans.
pub fn print_recommendations(recommendations: &Recommendations, args: &VerbenaArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(recommendations, args);
    }

    if recommendations.items.is_empty() {
        println!("No recommendations.");
        return Ok(());
    }

    for (rank, item) in recommendations.items.iter().enumerate() {
        let sources: Vec<&str> = item.sources.iter().map(|s| s.as_str()).collect();
        println!(
            "{:>2}. {} (score {:.3}, sources: {})",
            rank + 1,
            item.product.title,
            item.score,
            sources.join(", ")
        );
    }
    if recommendations.dropped > 0 && args.verbosity() > 0 {
        println!(
            "({} products no longer resolve and were dropped)",
            recommendations.dropped
        );
    }
    Ok(())
}

/// Render a similar-products list for humans.
pub fn print_similar_products(
    similar: &[SimilarProduct],
    args: &VerbenaArgs,
) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(&similar, args);
    }

    if similar.is_empty() {
        println!("No similar products.");
        return Ok(());
    }
    for (rank, item) in similar.iter().enumerate() {
        println!(
            "{:>2}. product {} (similarity {:.3})",
            rank + 1,
            item.product_id,
            item.similarity
        );
    }
    Ok(())
}

/// Render a trending list for humans.
pub fn print_trending(trending: &[(ProductId, f64)], args: &VerbenaArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(&trending, args);
    }

    if trending.is_empty() {
        println!("Nothing is trending in this window.");
        return Ok(());
    }
    for (rank, (product_id, score)) in trending.iter().enumerate() {
        println!("{:>2}. product {product_id} (score {score:.1})", rank + 1);
    }
    Ok(())
}

/// Render corpus statistics for humans.
pub fn print_stats(stats: &RecommendationStats, args: &VerbenaArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(stats, args);
    }

    println!("Users:      {}", stats.total_users);
    println!("Products:   {}", stats.total_products);
    println!("Likes:      {}", stats.total_likes);
    println!("Purchases:  {}", stats.total_purchases);
    println!("Reviews:    {}", stats.total_reviews);
    println!("Follows:    {}", stats.total_follows);
    println!(
        "Avg interactions per user: {:.2}",
        stats.avg_interactions_per_user
    );
    Ok(())
}

/// Render a refresh summary for humans.
pub fn print_refresh_summary(summary: &RefreshSummary, args: &VerbenaArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(summary, args);
    }

    if summary.vectors_rebuilt {
        println!("Feature vectors rebuilt");
    }
    println!(
        "Cold start cached: {}",
        if summary.cold_start_cached { "yes" } else { "no" }
    );
    println!(
        "Users warmed:    {} ({} failed)",
        summary.users_warmed, summary.users_failed
    );
    println!(
        "Products cached: {} ({} failed)",
        summary.products_cached, summary.products_failed
    );
    println!("Elapsed: {} ms", summary.elapsed_ms);
    Ok(())
}
