//! 集成测试共用的类型与类目录
//!
//! 构造函数和方法都是具名函数，`compiled.rs` 中的生成代码按路径引用它们。

#![allow(dead_code)]

pub mod compiled;

use ioc_wire::{
    BoxError, ClassCatalog, ClassDescriptor, Constructor, Container, ContainerAware, ContainerRef,
    DynamicDispatch, Factory, Instance, Method, Object, Parameter, RawDefinition, Value, Visibility,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

#[derive(Debug)]
pub struct Foo {
    pub label: String,
}

pub struct Bar {
    pub foo: Arc<Foo>,
    pub label: Option<String>,
}

/// 第一个参数可选，第二个必填
pub struct Pair {
    pub foo: Option<Arc<Foo>>,
    pub label: String,
}

pub struct InterfaceDependency {
    pub foo: Arc<Foo>,
}

pub struct ScalarDependency {
    pub number: i64,
}

pub struct StringDependency {
    pub value: String,
}

/// 未声明类型的参数，原样保存收到的值
pub struct Holder {
    pub value: Value,
}

/// 支持动态分派，记录每次未声明方法的调用
#[derive(Default)]
pub struct MagicMethod {
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct Widget {
    pub container: Option<ContainerRef>,
}

impl ContainerAware for Widget {
    fn set_container(&mut self, container: ContainerRef) {
        self.container = Some(container);
    }
}

fn downcast_mut<T: Any>(target: &mut (dyn Any + Send + Sync)) -> Result<&mut T, BoxError> {
    target
        .downcast_mut::<T>()
        .ok_or_else(|| format!("target is not a {}", std::any::type_name::<T>()).into())
}

fn foo_argument(args: &[Value], position: usize) -> Option<Arc<Foo>> {
    args.get(position).and_then(Value::downcast::<Foo>)
}

pub fn new_foo(args: Vec<Value>) -> Result<Object, BoxError> {
    let label = args.first().and_then(Value::as_str).unwrap_or("foo").to_string();
    Ok(Box::new(Foo { label }))
}

pub fn new_bar(args: Vec<Value>) -> Result<Object, BoxError> {
    let foo = foo_argument(&args, 0).ok_or("Bar requires a Foo")?;
    Ok(Box::new(Bar { foo, label: None }))
}

pub fn bar_set_label(target: &mut (dyn Any + Send + Sync), args: Vec<Value>) -> Result<(), BoxError> {
    let bar = downcast_mut::<Bar>(target)?;
    bar.label = args.first().and_then(Value::as_str).map(str::to_string);
    Ok(())
}

pub fn new_pair(args: Vec<Value>) -> Result<Object, BoxError> {
    let label = args.get(1).and_then(Value::as_str).ok_or("label must be a string")?;
    Ok(Box::new(Pair {
        foo: foo_argument(&args, 0),
        label: label.to_string(),
    }))
}

pub fn new_interface_dependency(args: Vec<Value>) -> Result<Object, BoxError> {
    let foo = foo_argument(&args, 0).ok_or("InterfaceDependency requires a Foo")?;
    Ok(Box::new(InterfaceDependency { foo }))
}

pub fn new_scalar_dependency(args: Vec<Value>) -> Result<Object, BoxError> {
    let number = args.first().and_then(Value::as_i64).ok_or("number must be an integer")?;
    Ok(Box::new(ScalarDependency { number }))
}

pub fn new_string_dependency(args: Vec<Value>) -> Result<Object, BoxError> {
    let value = args.first().and_then(Value::as_str).ok_or("value must be a string")?;
    Ok(Box::new(StringDependency {
        value: value.to_string(),
    }))
}

pub fn new_holder(mut args: Vec<Value>) -> Result<Object, BoxError> {
    let value = args.pop().unwrap_or_else(Value::null);
    Ok(Box::new(Holder { value }))
}

pub fn new_magic_method(_: Vec<Value>) -> Result<Object, BoxError> {
    Ok(Box::new(MagicMethod::default()))
}

pub fn magic_dispatch(
    target: &mut (dyn Any + Send + Sync),
    method: &str,
    args: Vec<Value>,
) -> Result<(), BoxError> {
    let magic = downcast_mut::<MagicMethod>(target)?;
    let args: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Value::Literal(value) => value.to_string(),
            Value::Instance(_) => "<instance>".to_string(),
        })
        .collect();
    magic.calls.push(format!("{}({})", method, args.join(", ")));
    Ok(())
}

pub fn new_widget(_: Vec<Value>) -> Result<Object, BoxError> {
    Ok(Box::new(Widget::default()))
}

pub fn make_answer(_: &Container) -> Result<Instance, BoxError> {
    Ok(Arc::new(42_u64))
}

/// 测试用的类目录
pub fn catalog() -> ClassCatalog {
    ClassCatalog::new()
        .with(
            ClassDescriptor::new(
                "Foo",
                Constructor::new(
                    vec![Parameter::new("label", 0).builtin("string").optional(json!("foo"))],
                    new_foo,
                )
                .with_path("crate::fixtures::new_foo"),
            )
            .with_type_path("crate::fixtures::Foo"),
        )
        .with(
            ClassDescriptor::new(
                "Bar",
                Constructor::new(vec![Parameter::new("foo", 0).class("Foo")], new_bar)
                    .with_path("crate::fixtures::new_bar"),
            )
            .method(
                Method::new(
                    "setLabel",
                    vec![Parameter::new("label", 0).builtin("string")],
                    bar_set_label,
                )
                .with_path("crate::fixtures::bar_set_label"),
            ),
        )
        .with(ClassDescriptor::new(
            "Pair",
            Constructor::new(
                vec![
                    Parameter::new("foo", 0).class("Foo").optional(json!(null)),
                    Parameter::new("label", 1).builtin("string"),
                ],
                new_pair,
            )
            .with_path("crate::fixtures::new_pair"),
        ))
        .with(ClassDescriptor::new(
            "InterfaceDependency",
            Constructor::new(
                vec![Parameter::new("foo", 0).class("FooInterface")],
                new_interface_dependency,
            )
            .with_path("crate::fixtures::new_interface_dependency"),
        ))
        .with(ClassDescriptor::new(
            "ScalarDependency",
            Constructor::new(vec![Parameter::new("number", 0)], new_scalar_dependency)
                .with_path("crate::fixtures::new_scalar_dependency"),
        ))
        .with(ClassDescriptor::new(
            "StringDependency",
            Constructor::new(
                vec![Parameter::new("value", 0).builtin("string")],
                new_string_dependency,
            )
            .with_path("crate::fixtures::new_string_dependency"),
        ))
        .with(ClassDescriptor::new(
            "Holder",
            Constructor::new(vec![Parameter::new("value", 0)], new_holder)
                .with_path("crate::fixtures::new_holder"),
        ))
        .with(
            ClassDescriptor::new(
                "MagicMethod",
                Constructor::new(vec![], new_magic_method)
                    .with_path("crate::fixtures::new_magic_method"),
            )
            .method(
                Method::new("secret", vec![], |_, _| Ok(())).with_visibility(Visibility::Private),
            )
            .dynamic_dispatch(
                DynamicDispatch::new(magic_dispatch).with_path("crate::fixtures::magic_dispatch"),
            ),
        )
        .with(
            ClassDescriptor::new(
                "Widget",
                Constructor::new(vec![], new_widget).with_path("crate::fixtures::new_widget"),
            )
            .with_type_path("crate::fixtures::Widget")
            .container_aware::<Widget>(),
        )
}

/// `compiled.rs` 由这组定义生成
pub fn compiled_definitions() -> Vec<(&'static str, RawDefinition)> {
    vec![
        ("Foo", json!({"args": ["primary"]}).into()),
        ("Bar", json!({"args": ["Foo"], "methods": {"setLabel": ["bar"]}}).into()),
        ("MagicMethod", json!({"methods": {"anything": [1, "$Foo"]}}).into()),
        ("Widget", json!({}).into()),
        ("Scalar", json!({"class": "ScalarDependency", "args": {"number": 7}}).into()),
        (
            "answer",
            Factory::named("crate::fixtures::make_answer", make_answer).into(),
        ),
    ]
}
