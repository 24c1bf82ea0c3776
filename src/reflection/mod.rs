//! 反射能力
//!
//! Rust 没有运行时反射，所以类的构造函数、方法及其参数元数据由调用方以
//! [`ClassDescriptor`] 的形式登记到 [`Reflector`] 中。容器只通过这个接口
//! 枚举参数（名称、位置、类型、默认值）并调用目标。
//!
//! 每个可调用对象都可以附带一个 *路径*，即签名相同的具名函数的 Rust 路径；
//! 运行时使用存储的函数，编译器则输出该路径。

use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::container::{ContainerAware, ContainerRef};
use crate::value::{BoxError, Object, Value};

/// 参数声明的类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// 未声明类型
    Untyped,
    /// 内建类型，例如 `string`、`int`
    Builtin(String),
    /// 类或接口类型，可参与自动装配
    Class(String),
}

impl ParamType {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ParamType::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, ParamType::Builtin(_))
    }
}

/// 构造函数或方法的单个参数
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    position: usize,
    ty: ParamType,
    default: Option<serde_json::Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            ty: ParamType::Untyped,
            default: None,
        }
    }

    pub fn typed(mut self, ty: ParamType) -> Self {
        self.ty = ty;
        self
    }

    /// 声明为类/接口类型
    pub fn class(self, class_name: impl Into<String>) -> Self {
        self.typed(ParamType::Class(class_name.into()))
    }

    /// 声明为内建类型
    pub fn builtin(self, type_name: impl Into<String>) -> Self {
        self.typed(ParamType::Builtin(type_name.into()))
    }

    /// 可选参数及其默认值
    pub fn optional(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }
}

/// 方法可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

pub type ConstructFn = dyn Fn(Vec<Value>) -> Result<Object, BoxError> + Send + Sync;
pub type InvokeFn =
    dyn Fn(&mut (dyn Any + Send + Sync), Vec<Value>) -> Result<(), BoxError> + Send + Sync;
pub type DispatchFn =
    dyn Fn(&mut (dyn Any + Send + Sync), &str, Vec<Value>) -> Result<(), BoxError> + Send + Sync;
pub type InjectFn = dyn Fn(&mut (dyn Any + Send + Sync), ContainerRef) + Send + Sync;

/// 构造函数
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<Parameter>,
    build: Arc<ConstructFn>,
    path: Option<String>,
}

impl Constructor {
    pub fn new<F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Object, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            build: Arc::new(build),
            path: None,
        }
    }

    /// 具名函数路径，签名为 `fn(Vec<Value>) -> Result<Object, BoxError>`
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn construct(&self, arguments: Vec<Value>) -> Result<Object, BoxError> {
        (self.build)(arguments)
    }
}

/// 实例方法（用于 setter 注入）
#[derive(Clone)]
pub struct Method {
    name: String,
    parameters: Vec<Parameter>,
    visibility: Visibility,
    invoke: Arc<InvokeFn>,
    path: Option<String>,
}

impl Method {
    pub fn new<F>(name: impl Into<String>, parameters: Vec<Parameter>, invoke: F) -> Self
    where
        F: Fn(&mut (dyn Any + Send + Sync), Vec<Value>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            parameters,
            visibility: Visibility::Public,
            invoke: Arc::new(invoke),
            path: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 具名函数路径，签名为 `fn(&mut (dyn Any + Send + Sync), Vec<Value>) -> Result<(), BoxError>`
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn invoke(
        &self,
        target: &mut (dyn Any + Send + Sync),
        arguments: Vec<Value>,
    ) -> Result<(), BoxError> {
        (self.invoke)(target, arguments)
    }
}

/// 动态分派能力：类型可以接收未声明方法的调用
#[derive(Clone)]
pub struct DynamicDispatch {
    dispatch: Arc<DispatchFn>,
    path: Option<String>,
}

impl DynamicDispatch {
    pub fn new<F>(dispatch: F) -> Self
    where
        F: Fn(&mut (dyn Any + Send + Sync), &str, Vec<Value>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            dispatch: Arc::new(dispatch),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn dispatch(
        &self,
        target: &mut (dyn Any + Send + Sync),
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<(), BoxError> {
        (self.dispatch)(target, method, arguments)
    }
}

/// 类描述：反射能力向容器暴露的全部信息
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    type_path: Option<String>,
    constructor: Constructor,
    methods: HashMap<String, Method>,
    dynamic: Option<DynamicDispatch>,
    inject: Option<Arc<InjectFn>>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, constructor: Constructor) -> Self {
        Self {
            name: name.into(),
            type_path: None,
            constructor,
            methods: HashMap::new(),
            dynamic: None,
            inject: None,
        }
    }

    /// 具体类型的 Rust 路径（编译容器注入时使用）
    pub fn with_type_path(mut self, path: impl Into<String>) -> Self {
        self.type_path = Some(path.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn dynamic_dispatch(mut self, dynamic: DynamicDispatch) -> Self {
        self.dynamic = Some(dynamic);
        self
    }

    /// 声明该类实现了 [`ContainerAware`]，构造完成后会注入容器句柄
    pub fn container_aware<T>(mut self) -> Self
    where
        T: ContainerAware + Any + Send + Sync,
    {
        self.inject = Some(Arc::new(crate::container::inject_container::<T>));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_path(&self) -> Option<&str> {
        self.type_path.as_deref()
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn get_method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn dynamic(&self) -> Option<&DynamicDispatch> {
        self.dynamic.as_ref()
    }

    pub fn is_container_aware(&self) -> bool {
        self.inject.is_some()
    }

    pub(crate) fn inject_container(&self, target: &mut (dyn Any + Send + Sync), container: ContainerRef) {
        if let Some(inject) = &self.inject {
            inject(target, container);
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("constructor", &self.constructor.parameters)
            .field("methods", &methods)
            .field("dynamic", &self.dynamic.is_some())
            .field("container_aware", &self.inject.is_some())
            .finish()
    }
}

/// 反射能力接口
pub trait Reflector: Send + Sync {
    /// 按类名获取类描述
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>>;

    /// 类是否存在
    fn has_class(&self, name: &str) -> bool {
        self.class(name).is_some()
    }
}

/// 默认的类目录实现
#[derive(Default)]
pub struct ClassCatalog {
    classes: DashMap<String, Arc<ClassDescriptor>>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记类描述；同名类会被替换
    pub fn register(&self, descriptor: ClassDescriptor) {
        self.classes
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    pub fn with(self, descriptor: ClassDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Reflector for ClassCatalog {
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }
}
