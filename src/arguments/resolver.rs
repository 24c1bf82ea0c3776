//! 参数解析器
//!
//! 将定义中的原始参数（位置/名称映射、标量、闭包、`$name` 别名）
//! 按目标参数列表绑定为有序的 [`Argument`] 序列。

use crate::arguments::{Argument, BoundArgument};
use crate::container::Container;
use crate::definition::{ArgumentKey, Arguments, RawArgument};
use crate::errors::{ContainerError, Result};
use crate::reflection::{ParamType, Parameter};
use crate::value::Value;

/// 显式别名前缀
pub const ALIAS_SIGIL: char = '$';

/// 按参数声明顺序绑定原始参数
///
/// 每个参数依次尝试：位置匹配、名称匹配、按声明类型自动装配、默认值；
/// 全部失败时返回解析错误。原始参数多于目标参数时报错。
pub fn bind(
    container: &Container,
    target: &str,
    parameters: Option<&[Parameter]>,
    arguments: &Arguments,
) -> Result<Vec<BoundArgument>> {
    let expected = parameters.map_or(0, <[Parameter]>::len);
    if arguments.len() > expected {
        return Err(ContainerError::RedundantArguments {
            target: target.to_string(),
            expected,
            given: arguments.len(),
        });
    }

    let Some(parameters) = parameters else {
        return Ok(Vec::new());
    };

    let mut bound = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let argument = match lookup(arguments, parameter) {
            Some(raw) => classify(container, raw, parameter.ty()),
            None => autowire_or_default(container, target, parameter)?,
        };
        bound.push(BoundArgument {
            parameter: parameter.name().to_string(),
            argument,
        });
    }
    Ok(bound)
}

/// 无参数元数据时（动态分派）按原始顺序绑定
pub fn bind_dynamic(container: &Container, arguments: &Arguments) -> Vec<BoundArgument> {
    arguments
        .iter()
        .map(|(key, raw)| BoundArgument {
            parameter: key.to_string(),
            argument: classify(container, raw, &ParamType::Untyped),
        })
        .collect()
}

/// 依次求值；失败时附带出错参数的名称
pub fn resolve_values(container: &Container, bound: &[BoundArgument]) -> Result<Vec<Value>> {
    bound
        .iter()
        .map(|bound| {
            bound
                .argument
                .resolve(container)
                .map_err(|e| ContainerError::Argument {
                    parameter: bound.parameter.clone(),
                    source: Box::new(e),
                })
        })
        .collect()
}

fn lookup<'a>(arguments: &'a Arguments, parameter: &Parameter) -> Option<&'a RawArgument> {
    arguments
        .get(&ArgumentKey::Position(parameter.position()))
        .or_else(|| {
            arguments
                .iter()
                .find(|(key, _)| matches!(key, ArgumentKey::Name(name) if name == parameter.name()))
                .map(|(_, raw)| raw)
        })
}

fn autowire_or_default(container: &Container, target: &str, parameter: &Parameter) -> Result<Argument> {
    if let Some(class_name) = parameter.ty().class_name() {
        if container.contains(class_name) {
            return Ok(Argument::ServiceReference(class_name.to_string()));
        }
    }
    if let Some(default) = parameter.default_value() {
        return Ok(Argument::Value(default.clone()));
    }
    Err(ContainerError::UnresolvableParameter {
        parameter: parameter.name().to_string(),
        target: target.to_string(),
    })
}

/// 字符串的判定规则：`$` 开头总是引用去掉前缀后的条目；
/// 其余字符串仅当注册表中存在同名条目且参数不是内建类型时才视为引用。
fn classify(container: &Container, raw: &RawArgument, ty: &ParamType) -> Argument {
    match raw {
        RawArgument::Closure(closure) => Argument::Closure(closure.clone()),
        RawArgument::Literal(serde_json::Value::String(text)) => {
            if let Some(alias) = text.strip_prefix(ALIAS_SIGIL) {
                Argument::ServiceReference(alias.to_string())
            } else if !ty.is_builtin() && container.contains(text) {
                Argument::ServiceReference(text.clone())
            } else {
                Argument::Value(serde_json::Value::String(text.clone()))
            }
        }
        RawArgument::Literal(value) => Argument::Value(value.clone()),
    }
}
