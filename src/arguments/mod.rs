//! 参数
//!
//! [`Argument`] 是一次解析调用中某个参数的绑定结果。每个变体都支持两种操作：
//! 给定容器产生运行时值，以及产生等价的源代码片段（仅编译器使用）。

pub mod resolver;

use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::errors::{ContainerError, Result};
use crate::value::{BoxError, Value};

pub use resolver::{bind, bind_dynamic, resolve_values};

pub type ClosureFn = dyn Fn(&Container) -> std::result::Result<Value, BoxError> + Send + Sync;

/// 延迟计算的参数，接收容器作为唯一参数
#[derive(Clone)]
pub struct Closure {
    func: Arc<ClosureFn>,
    path: Option<String>,
}

impl Closure {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Container) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            path: None,
        }
    }

    /// 具名函数，可被编译器引用
    pub fn named<F>(path: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Container) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn call(&self, container: &Container) -> std::result::Result<Value, BoxError> {
        (self.func)(container)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure").field("path", &self.path).finish()
    }
}

/// 已绑定的参数
#[derive(Debug, Clone)]
pub enum Argument {
    /// 字面量
    Value(serde_json::Value),
    /// 对另一个注册表条目的引用，使用时通过容器解析
    ServiceReference(String),
    /// 延迟计算
    Closure(Closure),
}

impl Argument {
    /// 产生运行时值
    pub fn resolve(&self, container: &Container) -> Result<Value> {
        match self {
            Argument::Value(value) => Ok(Value::Literal(value.clone())),
            Argument::ServiceReference(id) => container.get(id).map(Value::Instance),
            Argument::Closure(closure) => closure
                .call(container)
                .map_err(|e| ContainerError::callback("closure argument", e)),
        }
    }

    /// 产生等价的 Rust 源代码表达式，表达式中容器名为 `container`
    pub fn source_code(&self) -> Result<String> {
        match self {
            Argument::Value(value) => Ok(format!(
                "ioc_wire::Value::Literal({})",
                literal_source(value)
            )),
            Argument::ServiceReference(id) => Ok(format!(
                "ioc_wire::Value::from(container.get({:?})?)",
                id
            )),
            Argument::Closure(closure) => closure
                .path()
                .map(|path| format!("{}(container)?", path))
                .ok_or_else(|| ContainerError::NotCompilable("anonymous closure argument".to_string())),
        }
    }
}

/// 绑定到某个参数的 [`Argument`]
#[derive(Debug, Clone)]
pub struct BoundArgument {
    pub parameter: String,
    pub argument: Argument,
}

/// 将 JSON 值渲染为构造同一 `serde_json::Value` 的表达式
pub fn literal_source(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "serde_json::Value::Null".to_string(),
        serde_json::Value::Bool(flag) => format!("serde_json::Value::Bool({})", flag),
        serde_json::Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                format!("serde_json::Value::from({}_u64)", n)
            } else if let Some(n) = number.as_i64() {
                format!("serde_json::Value::from({}_i64)", n)
            } else {
                let n = number.as_f64().unwrap_or_default();
                format!("serde_json::Value::from({:?}_f64)", n)
            }
        }
        serde_json::Value::String(text) => format!("serde_json::Value::from({:?})", text),
        serde_json::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal_source).collect();
            format!("serde_json::Value::Array(vec![{}])", items.join(", "))
        }
        serde_json::Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, item)| format!("({:?}.to_string(), {})", key, literal_source(item)))
                .collect();
            format!(
                "serde_json::Value::Object(serde_json::Map::from_iter([{}]))",
                entries.join(", ")
            )
        }
    }
}
