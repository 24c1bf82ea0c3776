//! 容器编译器
//!
//! 对每个定义执行与运行时相同的绑定，但向每个参数索取源码形式而不是运行时值，
//! 最终得到一个包含全部条目构造函数的 Rust 源文件。生成的文件在构建期通过
//! `include!` 或 `mod` 引入，再交给 [`ContainerBuilder::compiled`]。
//!
//! [`ContainerBuilder::compiled`]: crate::ContainerBuilder::compiled

pub mod source;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::arguments::BoundArgument;
use crate::container::{Blueprint, CallTarget, Container};
use crate::definition::Definition;
use crate::errors::{ContainerError, Result};
use source::GeneratedMethod;

/// 默认的生成结构体名称
pub const DEFAULT_STRUCT_NAME: &str = "CompiledContainer";

/// 条目标识符对应的生成函数名：非标识符字符替换为 `_`，加 `create_` 前缀
pub fn compiled_method_name(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("create_{}", sanitized)
}

/// 容器编译器
#[derive(Debug)]
pub struct ContainerCompiler {
    struct_name: String,
    methods: BTreeMap<String, GeneratedMethod>,
}

impl ContainerCompiler {
    pub fn new() -> Self {
        Self {
            struct_name: DEFAULT_STRUCT_NAME.to_string(),
            methods: BTreeMap::new(),
        }
    }

    pub fn with_struct_name(mut self, struct_name: impl Into<String>) -> Self {
        self.struct_name = struct_name.into();
        self
    }

    /// 编译一个定义；失败时错误带上定义名称
    pub fn add_definition(&mut self, definition: &Definition, container: &Container) -> Result<()> {
        let id = definition.name.clone();
        let name = definition.compiled_method();

        let compiled = self
            .ensure_unique(&id, &name)
            .and_then(|_| definition_source(definition, container));
        let body = compiled.map_err(|e| ContainerError::Compilation {
            id: id.clone(),
            source: Box::new(e),
        })?;

        debug!(id = %id, method = %name, "definition compiled");
        self.methods.insert(id.clone(), GeneratedMethod { id, name, body });
        Ok(())
    }

    /// 已编译的条目数
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn compile(&self) -> String {
        source::render(&self.struct_name, self.methods.values())
    }

    pub fn compile_and_save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ContainerError::Io(format!("creating directory '{}'", parent.display()), e)
            })?;
        }
        fs::write(path, self.compile())
            .map_err(|e| ContainerError::Io(format!("writing '{}'", path.display()), e))
    }

    fn ensure_unique(&self, id: &str, name: &str) -> Result<()> {
        match self
            .methods
            .values()
            .find(|method| method.name == name && method.id != id)
        {
            Some(existing) => Err(ContainerError::configuration(format!(
                "Generated method `{}` is already used by entry `{}`",
                name, existing.id
            ))),
            None => Ok(()),
        }
    }
}

impl Default for ContainerCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn definition_source(definition: &Definition, container: &Container) -> Result<Vec<String>> {
    if let Some(factory) = &definition.factory {
        let path = factory
            .path()
            .ok_or_else(|| ContainerError::NotCompilable("anonymous factory".to_string()))?;
        return Ok(vec![format!("{}(container)", path)]);
    }

    let blueprint = Blueprint::plan(container, definition)?;
    class_source(&blueprint)
}

fn class_source(blueprint: &Blueprint) -> Result<Vec<String>> {
    let class = blueprint.class();
    let constructor = class.constructor().path().ok_or_else(|| {
        ContainerError::NotCompilable(format!("constructor of `{}`", class.name()))
    })?;
    let arguments = arguments_source(blueprint.constructor_arguments())
        .map_err(|e| invocation("constructor", e))?;

    let mut lines = vec![format!(
        "let mut instance = {}(vec![{}])?;",
        constructor, arguments
    )];

    for call in blueprint.calls() {
        let target = format!("method {}", call.name);
        let arguments = arguments_source(&call.arguments).map_err(|e| invocation(&target, e))?;
        let line = match &call.target {
            CallTarget::Declared(method) => {
                let path = method.path().ok_or_else(|| {
                    ContainerError::NotCompilable(format!("method `{}::{}`", class.name(), call.name))
                })?;
                format!("{}(&mut *instance, vec![{}])?;", path, arguments)
            }
            CallTarget::Dynamic(dynamic) => {
                let path = dynamic.path().ok_or_else(|| {
                    ContainerError::NotCompilable(format!("dynamic dispatch of `{}`", class.name()))
                })?;
                format!("{}(&mut *instance, {:?}, vec![{}])?;", path, call.name, arguments)
            }
        };
        lines.push(line);
    }

    if class.is_container_aware() {
        let type_path = class.type_path().ok_or_else(|| {
            ContainerError::NotCompilable(format!("type of container-aware class `{}`", class.name()))
        })?;
        lines.push(format!(
            "ioc_wire::inject_container::<{}>(&mut *instance, container.downgrade());",
            type_path
        ));
    }

    lines.push("Ok(ioc_wire::Instance::from(instance))".to_string());
    Ok(lines)
}

fn arguments_source(arguments: &[BoundArgument]) -> Result<String> {
    let mut sources = Vec::with_capacity(arguments.len());
    for bound in arguments {
        let code = bound
            .argument
            .source_code()
            .map_err(|e| ContainerError::Argument {
                parameter: bound.parameter.clone(),
                source: Box::new(e),
            })?;
        sources.push(code);
    }
    Ok(source::join_arguments(&sources))
}

fn invocation(target: &str, source: ContainerError) -> ContainerError {
    ContainerError::Invocation {
        target: target.to_string(),
        source: Box::new(source),
    }
}
