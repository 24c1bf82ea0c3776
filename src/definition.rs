//! 服务定义
//!
//! 注册表中每个条目的原始配置（数据映射、类型化构建器或工厂闭包）
//! 在首次访问时被解析为 [`Definition`]，之后由容器缓存复用。

use std::fmt;
use std::sync::Arc;

use crate::arguments::Closure;
use crate::container::Container;
use crate::errors::{ContainerError, Result};
use crate::reflection::Reflector;
use crate::value::{BoxError, Instance};

const CONFIG_CLASS: &str = "class";
const CONFIG_ARGS: &str = "args";
const CONFIG_METHODS: &str = "methods";
const CONFIG_FACTORY: &str = "factory";
const CONFIG_SINGLETON: &str = "singleton";
const CONFIG_LAZY: &str = "lazy";

/// 原始参数的键：位置或名称
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgumentKey {
    Position(usize),
    Name(String),
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKey::Position(position) => write!(f, "#{}", position),
            ArgumentKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// 原始参数值
#[derive(Clone)]
pub enum RawArgument {
    Literal(serde_json::Value),
    Closure(Closure),
}

impl fmt::Debug for RawArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawArgument::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            RawArgument::Closure(closure) => f.debug_tuple("Closure").field(closure).finish(),
        }
    }
}

/// 按位置或名称索引的有序原始参数表
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    entries: Vec<(ArgumentKey, RawArgument)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个位置参数（位置 = 当前最大位置 + 1）
    pub fn arg(mut self, value: impl Into<serde_json::Value>) -> Self {
        let position = self.next_position();
        self.insert(ArgumentKey::Position(position), RawArgument::Literal(value.into()));
        self
    }

    /// 追加一个闭包位置参数
    pub fn closure(mut self, closure: Closure) -> Self {
        let position = self.next_position();
        self.insert(ArgumentKey::Position(position), RawArgument::Closure(closure));
        self
    }

    pub fn at(mut self, position: usize, value: impl Into<serde_json::Value>) -> Self {
        self.insert(ArgumentKey::Position(position), RawArgument::Literal(value.into()));
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(ArgumentKey::Name(name.into()), RawArgument::Literal(value.into()));
        self
    }

    pub fn named_closure(mut self, name: impl Into<String>, closure: Closure) -> Self {
        self.insert(ArgumentKey::Name(name.into()), RawArgument::Closure(closure));
        self
    }

    /// 插入参数；已存在的键原位替换
    pub fn insert(&mut self, key: ArgumentKey, value: RawArgument) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &ArgumentKey) -> Option<&RawArgument> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArgumentKey, &RawArgument)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// 从 JSON 数组或对象构建；对象中形如整数的键视为位置
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let mut arguments = Arguments::new();
        match value {
            serde_json::Value::Array(items) => {
                for (position, item) in items.iter().enumerate() {
                    arguments.insert(ArgumentKey::Position(position), RawArgument::Literal(item.clone()));
                }
            }
            serde_json::Value::Object(map) => {
                for (key, item) in map {
                    let key = match key.parse::<usize>() {
                        Ok(position) => ArgumentKey::Position(position),
                        Err(_) => ArgumentKey::Name(key.clone()),
                    };
                    arguments.insert(key, RawArgument::Literal(item.clone()));
                }
            }
            _ => return None,
        }
        Some(arguments)
    }

    fn next_position(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(key, _)| match key {
                ArgumentKey::Position(position) => Some(position + 1),
                ArgumentKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

pub type FactoryFn = dyn Fn(&Container) -> std::result::Result<Instance, BoxError> + Send + Sync;

/// 工厂闭包：直接产生实例，绕过构造函数反射
#[derive(Clone)]
pub struct Factory {
    func: Arc<FactoryFn>,
    path: Option<String>,
}

impl Factory {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Container) -> std::result::Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            path: None,
        }
    }

    /// 具名工厂函数，可被编译器引用
    pub fn named<F>(path: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Container) -> std::result::Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn call(&self, container: &Container) -> std::result::Result<Instance, BoxError> {
        (self.func)(container)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("path", &self.path).finish()
    }
}

/// 类型化的定义构建器，与数据映射的键一一对应
#[derive(Debug, Clone, Default)]
pub struct DefinitionSpec {
    class: Option<String>,
    args: Arguments,
    methods: Vec<(String, Arguments)>,
    factory: Option<Factory>,
    singleton: Option<bool>,
    lazy: Option<bool>,
}

impl DefinitionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class = Some(class_name.into());
        self
    }

    pub fn args(mut self, args: Arguments) -> Self {
        self.args = args;
        self
    }

    pub fn method(mut self, name: impl Into<String>, args: Arguments) -> Self {
        push_method(&mut self.methods, name.into(), args);
        self
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = Some(singleton);
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }
}

/// 注册表槽位中的原始配置
#[derive(Debug, Clone)]
pub enum RawDefinition {
    /// 数据映射（来自 TOML/JSON 或 `json!`）
    Data(serde_json::Value),
    /// 类型化构建器
    Spec(DefinitionSpec),
    /// 纯工厂
    Factory(Factory),
}

impl From<serde_json::Value> for RawDefinition {
    fn from(value: serde_json::Value) -> Self {
        RawDefinition::Data(value)
    }
}

impl From<DefinitionSpec> for RawDefinition {
    fn from(spec: DefinitionSpec) -> Self {
        RawDefinition::Spec(spec)
    }
}

impl From<Factory> for RawDefinition {
    fn from(factory: Factory) -> Self {
        RawDefinition::Factory(factory)
    }
}

/// 解析并校验后的定义
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub class_name: Option<String>,
    pub arguments: Arguments,
    pub methods: Vec<(String, Arguments)>,
    pub factory: Option<Factory>,
    pub is_singleton: bool,
    pub is_lazy: bool,
}

impl Definition {
    /// 解析原始配置
    ///
    /// 名称为空、配置既不是映射也不是闭包、方法块格式错误时返回配置错误。
    /// 类名默认取条目名称，但仅当反射能力中存在同名类时。
    pub fn parse(name: &str, raw: RawDefinition, reflector: &dyn Reflector) -> Result<Self> {
        if name.is_empty() {
            return Err(ContainerError::configuration("Name cannot be empty"));
        }
        let derived_class = reflector.has_class(name).then(|| name.to_string());

        let mut definition = Definition {
            name: name.to_string(),
            class_name: derived_class,
            arguments: Arguments::new(),
            methods: Vec::new(),
            factory: None,
            is_singleton: true,
            is_lazy: false,
        };

        match raw {
            RawDefinition::Factory(factory) => {
                definition.factory = Some(factory);
            }
            RawDefinition::Spec(spec) => {
                for (method, _) in &spec.methods {
                    ensure_method_name(method)?;
                }
                if let Some(class_name) = spec.class {
                    definition.class_name = Some(class_name);
                }
                definition.arguments = spec.args;
                definition.methods = spec.methods;
                definition.factory = spec.factory;
                definition.is_singleton = spec.singleton.unwrap_or(true);
                definition.is_lazy = spec.lazy.unwrap_or(false);
            }
            RawDefinition::Data(value) => definition.apply_data(value)?,
        }

        Ok(definition)
    }

    fn apply_data(&mut self, value: serde_json::Value) -> Result<()> {
        let serde_json::Value::Object(config) = value else {
            return Err(ContainerError::configuration(
                "Definition config must be closure or array",
            ));
        };

        match config.get(CONFIG_CLASS) {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::String(class_name)) if class_name.is_empty() => {
                self.class_name = None;
            }
            Some(serde_json::Value::String(class_name)) => {
                self.class_name = Some(class_name.clone());
            }
            Some(_) => {
                return Err(ContainerError::configuration(format!(
                    "Class of entry `{}` should be string",
                    self.name
                )))
            }
        }

        self.arguments = match config.get(CONFIG_ARGS) {
            None | Some(serde_json::Value::Null) => Arguments::new(),
            Some(args) => Arguments::from_json(args)
                .unwrap_or_else(|| Arguments::new().arg(args.clone())),
        };

        self.methods = parse_methods(config.get(CONFIG_METHODS))?;
        self.is_singleton = parse_flag(&self.name, CONFIG_SINGLETON, config.get(CONFIG_SINGLETON), true)?;
        self.is_lazy = parse_flag(&self.name, CONFIG_LAZY, config.get(CONFIG_LAZY), false)?;

        match config.get(CONFIG_FACTORY) {
            None | Some(serde_json::Value::Null) => Ok(()),
            Some(_) => Err(ContainerError::configuration(format!(
                "Factory of entry `{}` must be registered as a callable",
                self.name
            ))),
        }
    }

    pub fn is_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// 编译容器中对应的函数名
    pub fn compiled_method(&self) -> String {
        crate::compiler::compiled_method_name(&self.name)
    }
}

fn parse_methods(value: Option<&serde_json::Value>) -> Result<Vec<(String, Arguments)>> {
    let methods = match value {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Object(methods)) => methods,
        Some(_) => {
            return Err(ContainerError::configuration(
                "Methods definition should be array",
            ))
        }
    };

    let mut result = Vec::with_capacity(methods.len());
    for (name, args) in methods {
        ensure_method_name(name)?;
        let args = match args {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Arguments::from_json(args),
            _ => None,
        }
        .ok_or_else(|| {
            ContainerError::configuration(format!("Arguments of method {} should be array", name))
        })?;
        push_method(&mut result, name.clone(), args);
    }
    Ok(result)
}

fn parse_flag(
    entry: &str,
    key: &str,
    value: Option<&serde_json::Value>,
    default: bool,
) -> Result<bool> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(serde_json::Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(ContainerError::configuration(format!(
            "Option `{}` of entry `{}` should be boolean",
            key, entry
        ))),
    }
}

fn ensure_method_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ContainerError::configuration("Name of method cannot be empty"));
    }
    Ok(())
}

fn push_method(methods: &mut Vec<(String, Arguments)>, name: String, args: Arguments) {
    match methods.iter_mut().find(|(existing, _)| *existing == name) {
        Some(slot) => slot.1 = args,
        None => methods.push((name, args)),
    }
}
