//! Enrich commands

use crate::app::{EnrichArgs, OutputFormat};
use crate::progress::report_enrich;
use anyhow::Result;
use catalog_core::{
    enrich_csv, enrich_json, Config, EnrichOptions, EnrichReport, HttpLLMClient, RetryPolicy,
};
use std::time::Duration;

fn options(args: &EnrichArgs, config: &Config) -> EnrichOptions {
    let retry = config.retry.policy();
    EnrichOptions {
        retry: RetryPolicy::new(
            args.max_attempts.unwrap_or(retry.max_attempts),
            args.retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(retry.delay),
        ),
        force: args.force,
    }
}

pub async fn run_csv(args: EnrichArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = HttpLLMClient::new(config.llm.clone())?;
    let report = enrich_csv(
        &client,
        &args.input,
        args.output.as_deref(),
        options(&args, config),
        Some(&report_enrich),
    )
    .await?;

    print_report(&report, format)
}

pub async fn run_json(args: EnrichArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = HttpLLMClient::new(config.llm.clone())?;
    let report = enrich_json(
        &client,
        &args.input,
        args.output.as_deref(),
        options(&args, config),
        Some(&report_enrich),
    )
    .await?;

    print_report(&report, format)
}

fn print_report(report: &EnrichReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        _ => {
            if report.total == 0 {
                println!("Nothing to process");
                return Ok(());
            }
            println!("Enrichment complete:");
            println!("  Records:          {}", report.total);
            println!("  Enriched:         {}", report.enriched);
            if report.partial > 0 {
                println!("  Partial:          {}", report.partial);
            }
            println!("  Already enriched: {}", report.already_enriched);
            println!("  Failed:           {}", report.failed);
            if report.warnings > 0 {
                println!("  Warnings:         {}", report.warnings);
            }
        }
    }
    Ok(())
}
