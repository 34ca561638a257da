//! Assist command

use crate::app::{AssistArgs, OutputFormat};
use anyhow::Result;
use catalog_core::{run_assist, Config, FileOps, HttpLLMClient};

pub async fn run(args: AssistArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = HttpLLMClient::new(config.llm.clone())?;
    let file_ops = FileOps::new(&args.dir)?;
    let instruction = args.instruction.join(" ");

    let outcome = run_assist(&client, &file_ops, &instruction, args.max_steps).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        _ => {
            for op in &outcome.operations {
                let status = if op.success { "ok" } else { "error" };
                eprintln!("  {} {} [{}]", op.tool, op.arguments, status);
            }
            match &outcome.reply {
                Some(reply) => println!("{}", reply),
                None if outcome.operations.is_empty() => println!("(no reply)"),
                None => {}
            }
            if !outcome.finished {
                eprintln!(
                    "Stopped after {} steps; raise --max-steps to let the model continue.",
                    outcome.steps
                );
            }
        }
    }
    Ok(())
}
