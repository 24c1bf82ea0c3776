//! 构造计划
//!
//! [`Blueprint`] 是一个类定义在绑定阶段的全部结果：类描述、构造函数参数
//! 以及依次调用的方法。运行时构造、`validate` 和编译器共用同一份计划，
//! 因此三者的绑定规则完全一致。

use std::any::Any;
use std::sync::Arc;

use crate::arguments::{bind, bind_dynamic, resolve_values, BoundArgument};
use crate::container::Container;
use crate::definition::Definition;
use crate::errors::{ContainerError, Result};
use crate::reflection::{ClassDescriptor, DynamicDispatch, Method};
use crate::value::{Object, Value};

const CONSTRUCTOR: &str = "constructor";

/// 方法调用的目标
#[derive(Clone)]
pub enum CallTarget {
    /// 类中声明的方法
    Declared(Method),
    /// 未声明的方法，交给动态分派处理
    Dynamic(DynamicDispatch),
}

/// 一次已绑定参数的方法调用
#[derive(Clone)]
pub struct MethodCall {
    pub name: String,
    pub target: CallTarget,
    pub arguments: Vec<BoundArgument>,
}

impl MethodCall {
    fn invoke(&self, instance: &mut (dyn Any + Send + Sync), values: Vec<Value>) -> Result<()> {
        let outcome = match &self.target {
            CallTarget::Declared(method) => method.invoke(instance, values),
            CallTarget::Dynamic(dynamic) => dynamic.dispatch(instance, &self.name, values),
        };
        outcome.map_err(|e| ContainerError::callback(format!("method {}", self.name), e))
    }
}

/// 类定义的构造计划
#[derive(Clone)]
pub struct Blueprint {
    class: Arc<ClassDescriptor>,
    constructor: Vec<BoundArgument>,
    calls: Vec<MethodCall>,
}

impl Blueprint {
    /// 绑定构造函数与方法参数，不产生任何实例
    pub fn plan(container: &Container, definition: &Definition) -> Result<Self> {
        let class_name = definition
            .class_name
            .as_deref()
            .filter(|class_name| !class_name.is_empty())
            .ok_or_else(|| ContainerError::EmptyClassName(definition.name.clone()))?;
        let class = container
            .reflector()
            .class(class_name)
            .ok_or_else(|| ContainerError::UnknownClass {
                id: definition.name.clone(),
                class: class_name.to_string(),
            })?;

        let constructor = bind(
            container,
            CONSTRUCTOR,
            Some(class.constructor().parameters()),
            &definition.arguments,
        )
        .map_err(|e| invocation(CONSTRUCTOR, e))?;

        let mut calls = Vec::with_capacity(definition.methods.len());
        for (name, arguments) in &definition.methods {
            let target = format!("method {}", name);
            let call = match class.get_method(name) {
                Some(method) if method.is_private() => {
                    return Err(ContainerError::PrivateMethod {
                        id: definition.name.clone(),
                        class: class.name().to_string(),
                        method: name.clone(),
                    })
                }
                Some(method) => MethodCall {
                    name: name.clone(),
                    arguments: bind(container, &target, Some(method.parameters()), arguments)
                        .map_err(|e| invocation(&target, e))?,
                    target: CallTarget::Declared(method.clone()),
                },
                None => {
                    let dynamic = class.dynamic().ok_or_else(|| ContainerError::UndefinedMethod {
                        id: definition.name.clone(),
                        class: class.name().to_string(),
                        method: name.clone(),
                    })?;
                    MethodCall {
                        name: name.clone(),
                        arguments: bind_dynamic(container, arguments),
                        target: CallTarget::Dynamic(dynamic.clone()),
                    }
                }
            };
            calls.push(call);
        }

        Ok(Self {
            class,
            constructor,
            calls,
        })
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    pub fn constructor_arguments(&self) -> &[BoundArgument] {
        &self.constructor
    }

    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    /// 按计划构造实例：解析构造参数、构造、依次调用方法、注入容器句柄
    pub fn build(&self, container: &Container) -> Result<Object> {
        let values = resolve_values(container, &self.constructor)
            .map_err(|e| invocation(CONSTRUCTOR, e))?;
        let mut instance = self.class.constructor().construct(values).map_err(|e| {
            ContainerError::callback(format!("constructor of `{}`", self.class.name()), e)
        })?;

        for call in &self.calls {
            let target = format!("method {}", call.name);
            let values =
                resolve_values(container, &call.arguments).map_err(|e| invocation(&target, e))?;
            call.invoke(&mut *instance, values)?;
        }

        self.class.inject_container(&mut *instance, container.downgrade());
        Ok(instance)
    }
}

fn invocation(target: &str, source: ContainerError) -> ContainerError {
    ContainerError::Invocation {
        target: target.to_string(),
        source: Box::new(source),
    }
}
