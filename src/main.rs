use clap::Parser;
use std::process::ExitCode;

use ioc_wire::cli::{run, Args};
use ioc_wire::config::ConfigLoader;
use ioc_wire::error_ext::ErrorChainExt;
use ioc_wire::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    let args = Args::parse();

    // 配置文件可选；缺失时使用默认日志配置
    let logging = ConfigLoader::new()
        .load(&args.config)
        .map(|config| config.logging.to_logging_config())
        .unwrap_or_else(|_| LoggingConfig::default());
    let logging = if args.verbose {
        logging.with_level_name("debug")
    } else {
        logging
    };
    if let Err(e) = init_logging(logging) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            e.log_error();
            eprintln!("error: {}", e.summary());
            if let Some(action) = e.suggested_action() {
                eprintln!("hint: {}", action);
            }
            ExitCode::from(2)
        }
    }
}
