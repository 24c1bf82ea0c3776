//! 运行时值类型
//!
//! 容器解析出的实例统一以 `Arc<dyn Any + Send + Sync>` 表示，
//! 构造参数则可能是字面量，也可能是另一个已解析的服务。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::proxy::LazyProxy;

/// 已解析的服务实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 刚构造完成、仍可进行 setter 注入的实例
pub type Object = Box<dyn Any + Send + Sync>;

/// 用户回调的错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 传递给构造函数或方法的单个运行时参数
#[derive(Clone)]
pub enum Value {
    /// 字面量（标量、字符串、数组、映射或 null）
    Literal(serde_json::Value),
    /// 容器中的另一个服务
    Instance(Instance),
}

impl Value {
    pub fn null() -> Self {
        Value::Literal(serde_json::Value::Null)
    }

    pub fn as_literal(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Literal(value) => Some(value),
            Value::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            Value::Literal(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_literal().and_then(serde_json::Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_literal().and_then(serde_json::Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_literal().and_then(serde_json::Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Literal(serde_json::Value::Null))
    }

    /// 安全的类型转换；字面量或类型不符时返回 `None`
    ///
    /// 延迟代理会在这里被初始化并转换为目标实例；初始化失败同样返回 `None`。
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let instance = self.as_instance()?.clone();
        match instance.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(other) => other
                .downcast::<LazyProxy>()
                .ok()
                .and_then(|proxy| proxy.downcast::<T>().ok()),
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Literal(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Value::Instance(instance) => f
                .debug_tuple("Instance")
                .field(&Arc::as_ptr(instance))
                .finish(),
        }
    }
}
