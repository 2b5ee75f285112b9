//! Console statistics for a finished crawl

use crate::crawler::{CrawlResult, MatchRecord};
use crate::output::traits::CrawlSummary;

/// Prints the crawl summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Pages listed in sitemaps: {}", summary.pages_found);
    if summary.pages_dropped() > 0 {
        println!(
            "  Pages dropped (duplicates or page limit): {}",
            summary.pages_dropped()
        );
    }
    println!("  Pages crawled: {}", summary.pages_processed);
    println!(
        "  Pages with <article> tag: {}/{}",
        summary.pages_with_article, summary.pages_processed
    );
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Outcomes:");
    println!("  Matched: {}", summary.pages_matched);
    println!(
        "  Skipped (already links to target): {}",
        summary.skipped_contains_target
    );
    println!("  No match: {}", summary.no_match);
    println!(
        "  Fetch errors: {} ({:.1}%)",
        summary.fetch_errors,
        summary.error_rate()
    );
    if summary.cancelled > 0 {
        println!("  Cancelled by deadline: {}", summary.cancelled);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} matches in total)",
        summary.success_rate(),
        summary.total_matches
    );
}

/// Prints the matches grouped by target
pub fn print_matches(result: &CrawlResult) {
    for (target, records) in &result.matches {
        println!("\n{} ({} matches)", target, records.len());

        for record in records {
            match record {
                MatchRecord::Link(link) => {
                    println!("  - {} [{}]", link.source, link.anchor_text);
                }
                MatchRecord::Keyword(found) => {
                    println!("  - {}", found.source);
                    for keyword in &found.keywords {
                        for sentence in &keyword.sentences {
                            println!("      {}: {}", keyword.keyword, sentence);
                        }
                    }
                }
            }
        }
    }
}
