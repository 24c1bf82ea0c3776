//! 依赖注入容器
//!
//! 注册表 + 单例缓存。条目的原始配置在首次访问时解析为 [`Definition`]
//! 并写回槽位；实例通过 [`Blueprint`] 构造，或由工厂/编译容器直接产生。
//!
//! 容器句柄可以廉价克隆，所有克隆共享同一份状态。

mod blueprint;
mod builder;

use dashmap::DashMap;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use crate::compiler::ContainerCompiler;
use crate::definition::{Definition, Factory, RawDefinition};
use crate::errors::{ContainerError, Result};
use crate::proxy::{Initializer, LazyProxy, ProxyFactory};
use crate::reflection::Reflector;
use crate::value::{BoxError, Instance};

pub use blueprint::{Blueprint, CallTarget, MethodCall};
pub use builder::ContainerBuilder;

/// 编译容器中单个条目的构造函数
pub type CompiledFactory = fn(&Container) -> std::result::Result<Instance, BoxError>;

/// 预编译的构造逻辑，通常由生成的 `CompiledContainer` 实现
pub trait CompiledFactories: Send + Sync {
    fn factory(&self, id: &str) -> Option<CompiledFactory>;
}

/// 需要持有容器引用的组件
///
/// 构造完成后容器会把一个弱引用句柄注入进来。
pub trait ContainerAware {
    fn set_container(&mut self, container: ContainerRef);
}

/// 把容器句柄注入到具体类型 `T` 的新实例中；类型不符时什么也不做
pub fn inject_container<T>(target: &mut (dyn Any + Send + Sync), container: ContainerRef)
where
    T: ContainerAware + Any + Send + Sync,
{
    if let Some(target) = target.downcast_mut::<T>() {
        target.set_container(container);
    }
}

/// `set` 接受的值
pub enum Entry {
    /// 已构造好的实例，直接作为单例缓存
    Instance(Instance),
    /// 工厂，注册为定义并清除同名缓存
    Factory(Factory),
}

impl From<Instance> for Entry {
    fn from(instance: Instance) -> Self {
        Entry::Instance(instance)
    }
}

impl From<Factory> for Entry {
    fn from(factory: Factory) -> Self {
        Entry::Factory(factory)
    }
}

#[derive(Clone)]
enum Slot {
    Raw(RawDefinition),
    Parsed(Arc<Definition>),
}

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

struct Inner {
    definitions: DashMap<String, Slot>,
    singletons: DashMap<String, Instance>,
    reflector: Arc<dyn Reflector>,
    proxy_factory: Option<Arc<dyn ProxyFactory>>,
    compiled: Option<Arc<dyn CompiledFactories>>,
    compiled_output: Option<PathBuf>,
    stats: InnerStats,
}

/// IoC 容器
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// 总是解析为容器自身的标识符（每次 `get` 返回共享状态的新句柄，`set` 拒绝覆盖）
    pub const SELF_ID: &'static str = "container";
    /// 容器自身的类型名，同样解析为容器自身
    pub const TYPE_NAME: &'static str = "ioc_wire::Container";

    /// 使用给定的反射能力创建空容器
    pub fn new(reflector: impl Reflector + 'static) -> Self {
        Self::builder().reflector(reflector).build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 是否存在该条目（已缓存的单例或已注册的定义）
    pub fn has(&self, id: &str) -> Result<bool> {
        ensure_identifier(id)?;
        Ok(self.contains(id))
    }

    /// 获取条目实例
    ///
    /// 未注册时返回 [`ContainerError::NotFound`]；构造期间的任何失败都被包装为
    /// [`ContainerError::Creation`]，且不会写入缓存。
    ///
    /// 容器自身的标识符每次返回一个新的句柄（`Arc<Container>`），它与当前容器共享状态；
    /// 用 [`Container::ptr_eq`] 判断是否为同一容器。
    pub fn get(&self, id: &str) -> Result<Instance> {
        ensure_identifier(id)?;
        self.inner.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        if is_self_id(id) {
            self.inner.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(self.clone()));
        }

        if let Some(instance) = self.cached(id) {
            self.inner.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(id, "singleton cache hit");
            return Ok(instance);
        }

        if !self.inner.definitions.contains_key(id) {
            return Err(ContainerError::NotFound(id.to_string()));
        }

        self.inner.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.definition(id)
            .and_then(|definition| self.resolve(&definition))
            .map_err(|e| {
                debug!(id, error = %e, "unable to create instance");
                ContainerError::Creation {
                    id: id.to_string(),
                    source: Box::new(e),
                }
            })
    }

    /// 获取条目并转换为具体类型；延迟代理会先被初始化
    pub fn get_as<T>(&self, id: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let instance = self.get(id)?;
        let instance = match instance.downcast::<T>() {
            Ok(typed) => return Ok(typed),
            Err(other) => other,
        };

        let instance = match instance.downcast::<LazyProxy>() {
            Ok(proxy) => proxy.instance().map_err(|e| {
                ContainerError::callback(format!("lazy initialization of entry `{}`", id), e)
            })?,
            Err(other) => other,
        };

        let actual = (*instance).type_id();
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeCastFailed {
                expected: std::any::type_name::<T>().to_string(),
                actual: format!("{:?}", actual),
            })
    }

    /// 设置条目：工厂注册为定义并清除缓存，实例直接缓存为单例
    ///
    /// 容器自身的标识符是保留的，不能被覆盖。
    pub fn set(&self, id: impl Into<String>, entry: impl Into<Entry>) -> Result<()> {
        let id = id.into();
        ensure_identifier(&id)?;
        if is_self_id(&id) {
            return Err(ContainerError::configuration(format!(
                "Entry `{}` is reserved for the container itself",
                id
            )));
        }
        match entry.into() {
            Entry::Instance(instance) => {
                self.inner.singletons.insert(id, instance);
            }
            Entry::Factory(factory) => {
                self.inner.singletons.remove(&id);
                self.inner
                    .definitions
                    .insert(id, Slot::Raw(RawDefinition::Factory(factory)));
            }
        }
        Ok(())
    }

    /// 注册（或替换）一个原始定义，同名缓存被清除
    pub fn register(&self, id: impl Into<String>, definition: impl Into<RawDefinition>) {
        let id = id.into();
        self.inner.singletons.remove(&id);
        self.inner.definitions.insert(id, Slot::Raw(definition.into()));
    }

    /// 清空所有定义和单例；容器自身的标识符不受影响
    pub fn reset(&self) {
        self.inner.definitions.clear();
        self.inner.singletons.clear();
        debug!("container reset");
    }

    /// 条目是否已经有缓存的实例
    pub fn initialized(&self, id: &str) -> bool {
        is_self_id(id) || self.inner.singletons.contains_key(id)
    }

    /// 对每个定义做一次不构造实例的绑定检查，返回出错的条目
    pub fn validate(&self) -> BTreeMap<String, ContainerError> {
        let mut failures = BTreeMap::new();
        for id in self.ids() {
            let checked = self.definition(&id).and_then(|definition| {
                if definition.is_factory() || self.compiled_factory(&id).is_some() {
                    return Ok(());
                }
                Blueprint::plan(self, &definition).map(|_| ())
            });
            if let Err(e) = checked {
                warn!(id = %id, error = %e, "invalid definition");
                failures.insert(id, e);
            }
        }
        failures
    }

    /// 为所有延迟定义预先生成代理；未配置代理工厂时不做任何事
    pub fn generate_proxies(&self) -> Result<()> {
        let Some(proxy_factory) = self.inner.proxy_factory.clone() else {
            return Ok(());
        };
        for id in self.ids() {
            let definition = self.definition(&id)?;
            if !definition.is_lazy {
                continue;
            }
            let class_name = proxy_class_name(&definition);
            proxy_factory
                .generate_proxy(class_name)
                .map_err(|e| ContainerError::callback(format!("proxy generation for `{}`", class_name), e))?;
            debug!(id = %id, class = class_name, "proxy generated");
        }
        Ok(())
    }

    /// 把所有定义编译为 Rust 源码
    pub fn compile(&self) -> Result<String> {
        Ok(self.compiler()?.compile())
    }

    /// 编译并写入构建时配置的输出路径
    pub fn compile_container(&self) -> Result<PathBuf> {
        let path = self.inner.compiled_output.clone().ok_or_else(|| {
            ContainerError::configuration("Compiled container output path is not configured")
        })?;
        self.compiler()?.compile_and_save(&path)?;
        debug!(path = %path.display(), "compiled container written");
        Ok(path)
    }

    fn compiler(&self) -> Result<ContainerCompiler> {
        let mut compiler = ContainerCompiler::new();
        for id in self.ids() {
            let definition = self.definition(&id)?;
            compiler.add_definition(&definition, self)?;
        }
        Ok(compiler)
    }

    /// 已注册定义的标识符（排序）
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .definitions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// 获取解析后的定义；首次访问时解析并写回槽位
    pub fn definition(&self, id: &str) -> Result<Arc<Definition>> {
        let mut slot = self
            .inner
            .definitions
            .get_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        let definition = match &*slot {
            Slot::Parsed(definition) => return Ok(definition.clone()),
            Slot::Raw(raw) => Arc::new(Definition::parse(id, raw.clone(), self.reflector())?),
        };
        *slot = Slot::Parsed(definition.clone());
        Ok(definition)
    }

    pub fn reflector(&self) -> &dyn Reflector {
        self.inner.reflector.as_ref()
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.inner.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.inner.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.inner.stats.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn downgrade(&self) -> ContainerRef {
        ContainerRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// 两个句柄是否指向同一个容器
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 不校验标识符的存在性检查，供参数解析使用
    pub(crate) fn contains(&self, id: &str) -> bool {
        is_self_id(id)
            || self.inner.singletons.contains_key(id)
            || self.inner.definitions.contains_key(id)
    }

    fn cached(&self, id: &str) -> Option<Instance> {
        self.inner
            .singletons
            .get(id)
            .map(|entry| entry.value().clone())
    }

    fn compiled_factory(&self, id: &str) -> Option<CompiledFactory> {
        self.inner
            .compiled
            .as_ref()
            .and_then(|compiled| compiled.factory(id))
    }

    fn resolve(&self, definition: &Arc<Definition>) -> Result<Instance> {
        let instance = match &self.inner.proxy_factory {
            Some(proxy_factory) if definition.is_lazy => {
                self.create_proxy(proxy_factory.as_ref(), definition)?
            }
            _ => self.create_instance(definition)?,
        };
        if definition.is_singleton {
            self.inner
                .singletons
                .insert(definition.name.clone(), instance.clone());
        }
        Ok(instance)
    }

    fn create_proxy(
        &self,
        proxy_factory: &dyn ProxyFactory,
        definition: &Arc<Definition>,
    ) -> Result<Instance> {
        let class_name = proxy_class_name(definition);
        let container = self.downgrade();
        let target = definition.clone();
        let initializer: Initializer = Arc::new(move || -> std::result::Result<Instance, BoxError> {
            let container = container.upgrade()?;
            debug!(id = %target.name, "initializing lazy proxy");
            container.create_instance(&target).map_err(BoxError::from)
        });

        debug!(id = %definition.name, class = class_name, "creating lazy proxy");
        proxy_factory
            .create_proxy(class_name, initializer)
            .map_err(|e| ContainerError::callback(format!("proxy factory for `{}`", class_name), e))
    }

    /// 构造实例：编译容器 → 工厂 → 反射构造
    pub(crate) fn create_instance(&self, definition: &Definition) -> Result<Instance> {
        let id = definition.name.as_str();
        if let Some(factory) = self.compiled_factory(id) {
            debug!(id, "using compiled factory");
            return factory(self).map_err(|e| {
                ContainerError::callback(format!("compiled factory of entry `{}`", id), e)
            });
        }

        if let Some(factory) = &definition.factory {
            debug!(id, "invoking factory");
            return factory
                .call(self)
                .map_err(|e| ContainerError::callback(format!("factory of entry `{}`", id), e));
        }

        debug!(id, class = ?definition.class_name, "constructing instance");
        let object = Blueprint::plan(self, definition)?.build(self)?;
        Ok(Instance::from(object))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.inner.definitions.len())
            .field("singletons", &self.inner.singletons.len())
            .field("lazy_proxies", &self.inner.proxy_factory.is_some())
            .field("compiled", &self.inner.compiled.is_some())
            .finish()
    }
}

/// 容器的弱引用句柄，不会延长容器的生命周期
#[derive(Clone)]
pub struct ContainerRef {
    inner: Weak<Inner>,
}

impl ContainerRef {
    pub fn upgrade(&self) -> Result<Container> {
        self.inner
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or(ContainerError::ContainerDropped)
    }

    pub fn get(&self, id: &str) -> Result<Instance> {
        self.upgrade()?.get(id)
    }

    pub fn get_as<T>(&self, id: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.upgrade()?.get_as(id)
    }

    pub fn has(&self, id: &str) -> Result<bool> {
        self.upgrade()?.has(id)
    }
}

impl fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerRef")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// 容器统计信息
#[derive(Debug, Clone)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total() as f64
        }
    }
}

fn ensure_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ContainerError::EmptyIdentifier);
    }
    Ok(())
}

fn is_self_id(id: &str) -> bool {
    id == Container::SELF_ID || id == Container::TYPE_NAME
}

fn proxy_class_name(definition: &Definition) -> &str {
    definition
        .class_name
        .as_deref()
        .unwrap_or(definition.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ClassCatalog;
    use serde_json::json;

    #[derive(Debug)]
    struct TestService {
        id: usize,
    }

    fn container() -> Container {
        Container::new(ClassCatalog::new())
    }

    #[test]
    fn test_identifier_validation() {
        let container = container();
        assert!(matches!(container.has(""), Err(ContainerError::EmptyIdentifier)));
        assert!(matches!(container.get(""), Err(ContainerError::EmptyIdentifier)));
        assert!(!container.has("missing").unwrap());
    }

    #[test]
    fn test_self_identifiers() {
        let container = container();
        assert!(container.has(Container::SELF_ID).unwrap());
        assert!(container.has(Container::TYPE_NAME).unwrap());
        assert!(container.initialized(Container::SELF_ID));

        let resolved = container.get_as::<Container>(Container::SELF_ID).unwrap();
        assert!(resolved.ptr_eq(&container));
        let resolved = container.get_as::<Container>(Container::TYPE_NAME).unwrap();
        assert!(resolved.ptr_eq(&container));

        container.reset();
        assert!(container.has(Container::SELF_ID).unwrap());
    }

    #[test]
    fn test_self_identifiers_are_reserved() {
        let container = container();
        for id in [Container::SELF_ID, Container::TYPE_NAME] {
            let err = container.set(id, Arc::new(1_u8) as Instance).unwrap_err();
            assert!(err.is_configuration());
        }
        assert!(matches!(
            container.set("", Arc::new(1_u8) as Instance),
            Err(ContainerError::EmptyIdentifier)
        ));
        assert!(container.get_as::<Container>(Container::SELF_ID).unwrap().ptr_eq(&container));
    }

    #[test]
    fn test_set_instance_and_factory() {
        let container = container();
        container.set("service", Arc::new(TestService { id: 1 }) as Instance).unwrap();
        assert!(container.initialized("service"));
        assert_eq!(container.get_as::<TestService>("service").unwrap().id, 1);

        container
            .set(
                "service",
                Factory::new(|_| Ok(Arc::new(TestService { id: 2 }) as Instance)),
            )
            .unwrap();
        assert!(!container.initialized("service"));
        assert_eq!(container.get_as::<TestService>("service").unwrap().id, 2);
        assert!(container.initialized("service"));
    }

    #[test]
    fn test_transient_factory_runs_per_call() {
        let container = container();
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        container.register(
            "num",
            crate::definition::DefinitionSpec::new()
                .singleton(false)
                .factory(Factory::new(move |_| {
                    let id = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(Arc::new(TestService { id }) as Instance)
                })),
        );

        assert_eq!(container.get_as::<TestService>("num").unwrap().id, 1);
        assert_eq!(container.get_as::<TestService>("num").unwrap().id, 2);
        assert!(!container.initialized("num"));
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let container = container();
        container.set("broken", Factory::new(|_| Err("boom".into()))).unwrap();

        let err = container.get("broken").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to create instance of entry `broken`: factory of entry `broken` failed: boom"
        );
        assert!(!container.initialized("broken"));
    }

    #[test]
    fn test_configuration_error_is_wrapped() {
        let container = container();
        container.register("foobar", json!("not a mapping"));

        let err = container.get("foobar").unwrap_err();
        assert!(matches!(err, ContainerError::Creation { .. }));
        assert!(err.root_cause().is_configuration());
    }

    #[test]
    fn test_type_cast_failure() {
        let container = container();
        container.set("service", Arc::new(TestService { id: 1 }) as Instance).unwrap();

        let err = container.get_as::<String>("service").unwrap_err();
        assert!(matches!(err, ContainerError::TypeCastFailed { .. }));
    }

    #[test]
    fn test_container_stats() {
        let container = container();
        container
            .set("service", Factory::new(|_| Ok(Arc::new(TestService { id: 42 }) as Instance)))
            .unwrap();

        for _ in 0..10 {
            container.get("service").unwrap();
        }

        let stats = container.stats();
        assert_eq!(stats.total(), 10);
        assert_eq!(stats.cache_hits, 9);
        assert_eq!(stats.cache_misses, 1);
        assert!(stats.hit_rate() > 0.8);
    }

    #[test]
    fn test_container_ref_does_not_keep_container_alive() {
        let container = container();
        let handle = container.downgrade();
        assert!(handle.has(Container::SELF_ID).unwrap());

        drop(container);
        assert!(matches!(handle.upgrade(), Err(ContainerError::ContainerDropped)));
    }

    #[test]
    fn test_compile_container_requires_output_path() {
        let err = container().compile_container().unwrap_err();
        assert!(err.is_configuration());
    }
}
