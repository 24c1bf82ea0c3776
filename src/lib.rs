//! ioc-wire: 依赖注入容器
//!
//! 条目以原始定义注册，首次访问时解析、绑定参数并构造；
//! 同一组定义也可以编译为 Rust 源码，在构建期引入以跳过运行时绑定。

// 生成的源码以 `ioc_wire::` 路径引用本 crate，crate 内测试也需要能解析这些路径
extern crate self as ioc_wire;

pub mod arguments;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod container;
pub mod definition;
pub mod error_ext;
pub mod errors;
pub mod logging;
pub mod proxy;
pub mod reflection;
pub mod value;

// Re-export commonly used items for convenience
pub use arguments::{Argument, Closure};
pub use compiler::ContainerCompiler;
pub use config::ContainerConfig;
pub use container::{
    inject_container, Blueprint, CompiledFactories, CompiledFactory, Container, ContainerAware,
    ContainerBuilder, ContainerRef, ContainerStats, Entry,
};
pub use definition::{Arguments, Definition, DefinitionSpec, Factory, RawDefinition};
pub use errors::{ConfigError, ContainerError, Result};
pub use proxy::{Initializer, LazyProxy, LazyProxyFactory, ProxyFactory};
pub use reflection::{
    ClassCatalog, ClassDescriptor, Constructor, DynamicDispatch, Method, ParamType, Parameter,
    Reflector, Visibility,
};
pub use value::{BoxError, Instance, Object, Value};
