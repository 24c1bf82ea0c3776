pub mod commands;
pub mod parser;

use anyhow::Context;
use std::path::PathBuf;

use crate::config::ConfigLoader;
use crate::logging::OperationTimer;

pub use commands::{check_definitions, describe, describe_definitions, EntryReport};
pub use parser::{Args, Command, OutputFormat};

/// 执行子命令；返回 `false` 表示检查发现了错误
pub fn run(args: &Args) -> anyhow::Result<bool> {
    match &args.command {
        Command::Check { files, format } => {
            let files = if files.is_empty() {
                configured_definitions(&args.config)?
            } else {
                files.clone()
            };

            let timer = OperationTimer::new("check");
            let mut reports = Vec::new();
            for file in &files {
                let checked = check_definitions(file)
                    .with_context(|| format!("checking {}", file.display()))?;
                reports.extend(checked);
            }
            timer.finish();

            print_reports(&reports, *format)?;
            Ok(reports.iter().all(EntryReport::is_ok))
        }
        Command::Show { file } => {
            let lines = describe_definitions(file)
                .with_context(|| format!("reading {}", file.display()))?;
            for line in lines {
                println!("{}", line);
            }
            Ok(true)
        }
    }
}

fn configured_definitions(config_path: &str) -> anyhow::Result<Vec<PathBuf>> {
    let config = ConfigLoader::new()
        .load(config_path)
        .with_context(|| format!("no definition files given and unable to load {}", config_path))?;
    Ok(config.container.definitions)
}

fn print_reports(reports: &[EntryReport], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            for report in reports {
                match &report.error {
                    None => println!("ok      {} ({})", report.id, report.file.display()),
                    Some(error) => {
                        println!("invalid {} ({}): {}", report.id, report.file.display(), error)
                    }
                }
            }
            let failed = reports.iter().filter(|report| !report.is_ok()).count();
            println!("{} entries checked, {} invalid", reports.len(), failed);
        }
    }
    Ok(())
}
