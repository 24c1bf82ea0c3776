use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{CompiledFactories, Container, Inner, InnerStats, Slot};
use crate::config::{load_definitions, ContainerConfig};
use crate::definition::RawDefinition;
use crate::errors::ConfigError;
use crate::proxy::{LazyProxyFactory, ProxyFactory};
use crate::reflection::{ClassCatalog, Reflector};

/// 容器构建器
///
/// 未指定反射能力时使用空的 [`ClassCatalog`]；未指定代理工厂时延迟定义会被立即构造。
#[derive(Default)]
pub struct ContainerBuilder {
    definitions: Vec<(String, RawDefinition)>,
    reflector: Option<Arc<dyn Reflector>>,
    proxy_factory: Option<Arc<dyn ProxyFactory>>,
    compiled: Option<Arc<dyn CompiledFactories>>,
    compiled_output: Option<PathBuf>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(mut self, id: impl Into<String>, definition: impl Into<RawDefinition>) -> Self {
        self.definitions.push((id.into(), definition.into()));
        self
    }

    pub fn definitions<I, K, D>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<RawDefinition>,
    {
        self.definitions
            .extend(definitions.into_iter().map(|(id, raw)| (id.into(), raw.into())));
        self
    }

    pub fn reflector(self, reflector: impl Reflector + 'static) -> Self {
        self.shared_reflector(Arc::new(reflector))
    }

    pub fn shared_reflector(mut self, reflector: Arc<dyn Reflector>) -> Self {
        self.reflector = Some(reflector);
        self
    }

    pub fn proxy_factory(mut self, proxy_factory: impl ProxyFactory + 'static) -> Self {
        self.proxy_factory = Some(Arc::new(proxy_factory));
        self
    }

    /// 预编译的构造逻辑，优先于反射构造
    pub fn compiled(mut self, compiled: impl CompiledFactories + 'static) -> Self {
        self.compiled = Some(Arc::new(compiled));
        self
    }

    /// `compile_container` 写入的文件路径
    pub fn compiled_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiled_output = Some(path.into());
        self
    }

    pub fn build(self) -> Container {
        let definitions = DashMap::with_capacity(self.definitions.len());
        for (id, raw) in self.definitions {
            definitions.insert(id, Slot::Raw(raw));
        }

        Container {
            inner: Arc::new(Inner {
                definitions,
                singletons: DashMap::new(),
                reflector: self
                    .reflector
                    .unwrap_or_else(|| Arc::new(ClassCatalog::new())),
                proxy_factory: self.proxy_factory,
                compiled: self.compiled,
                compiled_output: self.compiled_output,
                stats: InnerStats::default(),
            }),
        }
    }
}

impl Container {
    /// 按配置文件构建：加载定义文件、输出路径以及是否启用延迟代理
    pub fn from_config(
        config: &ContainerConfig,
        reflector: impl Reflector + 'static,
    ) -> Result<Container, ConfigError> {
        let mut builder = ContainerBuilder::new().reflector(reflector);
        for path in &config.container.definitions {
            builder = builder.definitions(load_definitions(path)?);
        }
        if let Some(path) = &config.container.compiled_output {
            builder = builder.compiled_output(path);
        }
        if config.container.lazy_proxies {
            builder = builder.proxy_factory(LazyProxyFactory::new());
        }
        Ok(builder.build())
    }
}
