use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// ioc-wire - 服务定义检查工具
#[derive(Parser, Debug)]
#[command(name = "ioc-wire")]
#[command(about = "检查并展示 IoC 容器的服务定义文件")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件路径
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: String,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 解析定义文件并报告每个条目的配置错误
    Check {
        /// 定义文件（TOML 或 JSON）；省略时使用配置文件中的 `container.definitions`
        files: Vec<PathBuf>,
        /// 输出格式
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// 打印每个定义的摘要
    Show {
        /// 定义文件（TOML 或 JSON）
        file: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let args = Args::try_parse_from(["ioc-wire", "check", "a.toml", "b.json", "--format", "json"]).unwrap();
        match args.command {
            Command::Check { files, format } => {
                assert_eq!(files, vec![PathBuf::from("a.toml"), PathBuf::from("b.json")]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.config, CONFIG_FILE_NAME);
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_show_with_globals() {
        let args = Args::try_parse_from(["ioc-wire", "show", "services.toml", "-v", "--config", "alt.toml"]).unwrap();
        assert!(matches!(args.command, Command::Show { .. }));
        assert!(args.verbose);
        assert_eq!(args.config, "alt.toml");
    }

    #[test]
    fn test_show_requires_file() {
        assert!(Args::try_parse_from(["ioc-wire", "show"]).is_err());
    }
}
