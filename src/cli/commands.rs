use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::load_definitions;
use crate::definition::{Definition, RawArgument};
use crate::errors::ConfigError;
use crate::reflection::ClassCatalog;

/// 单个条目的检查结果
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryReport {
    pub file: PathBuf,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 解析文件中的每个定义；文件本身无法读取或解析时整体失败
pub fn check_definitions(path: &Path) -> Result<Vec<EntryReport>, ConfigError> {
    let catalog = ClassCatalog::new();
    let reports = load_definitions(path)?
        .into_iter()
        .map(|(id, raw)| {
            let error = Definition::parse(&id, raw, &catalog).err().map(|e| e.to_string());
            EntryReport {
                file: path.to_path_buf(),
                id,
                error,
            }
        })
        .collect();
    Ok(reports)
}

/// 每个定义一行摘要
pub fn describe_definitions(path: &Path) -> Result<Vec<String>, ConfigError> {
    let catalog = ClassCatalog::new();
    let lines = load_definitions(path)?
        .into_iter()
        .map(|(id, raw)| match Definition::parse(&id, raw, &catalog) {
            Ok(definition) => describe(&definition),
            Err(e) => format!("{}: invalid ({})", id, e),
        })
        .collect();
    Ok(lines)
}

/// 定义摘要，例如 `Bar: class=Bar args=[#0=Foo] methods=[setFoo(1)] singleton lazy`
pub fn describe(definition: &Definition) -> String {
    let mut parts = vec![format!("{}:", definition.name)];

    match (&definition.class_name, definition.is_factory()) {
        (_, true) => parts.push("factory".to_string()),
        (Some(class_name), false) => parts.push(format!("class={}", class_name)),
        (None, false) => parts.push("class=<none>".to_string()),
    }

    let arguments: Vec<String> = definition
        .arguments
        .iter()
        .map(|(key, raw)| format!("{}={}", key, raw_label(raw)))
        .collect();
    parts.push(format!("args=[{}]", arguments.join(", ")));

    if !definition.methods.is_empty() {
        let methods: Vec<String> = definition
            .methods
            .iter()
            .map(|(name, args)| format!("{}({})", name, args.len()))
            .collect();
        parts.push(format!("methods=[{}]", methods.join(", ")));
    }

    parts.push(if definition.is_singleton { "singleton" } else { "transient" }.to_string());
    if definition.is_lazy {
        parts.push("lazy".to_string());
    }
    parts.join(" ")
}

fn raw_label(raw: &RawArgument) -> String {
    match raw {
        RawArgument::Literal(serde_json::Value::String(text)) => text.clone(),
        RawArgument::Literal(value) => value.to_string(),
        RawArgument::Closure(closure) => closure.path().unwrap_or("<closure>").to_string(),
    }
}
