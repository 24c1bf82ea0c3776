//! 延迟代理
//!
//! 代理在首次真正使用时才调用初始化器构造目标实例，之后一直返回同一个实例。

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::value::{BoxError, Instance};

/// 代理初始化器，只持有容器的弱引用
pub type Initializer = Arc<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

/// 代理创建能力
pub trait ProxyFactory: Send + Sync {
    /// 为 `class_name` 创建一个延迟初始化的替身
    fn create_proxy(&self, class_name: &str, initializer: Initializer) -> Result<Instance, BoxError>;

    /// 预先准备 `class_name` 的代理（构建期调用）
    fn generate_proxy(&self, class_name: &str) -> Result<(), BoxError>;
}

enum ProxyState {
    Pending(Initializer),
    Ready(Instance),
}

/// 默认的代理实现
pub struct LazyProxy {
    class_name: String,
    state: Mutex<ProxyState>,
}

impl LazyProxy {
    pub fn new(class_name: impl Into<String>, initializer: Initializer) -> Self {
        Self {
            class_name: class_name.into(),
            state: Mutex::new(ProxyState::Pending(initializer)),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.lock(), ProxyState::Ready(_))
    }

    /// 获取目标实例，必要时运行初始化器
    ///
    /// 初始化器运行期间不持有锁。初始化失败时代理保持未初始化状态，下次访问会重试；
    /// 并发初始化时保留最先完成的实例。
    pub fn instance(&self) -> Result<Instance, BoxError> {
        let initializer = match &*self.state.lock() {
            ProxyState::Ready(instance) => return Ok(instance.clone()),
            ProxyState::Pending(initializer) => initializer.clone(),
        };

        let instance = initializer()?;
        let mut state = self.state.lock();
        if let ProxyState::Ready(existing) = &*state {
            return Ok(existing.clone());
        }
        debug!(class = %self.class_name, "lazy proxy initialized");
        *state = ProxyState::Ready(instance.clone());
        Ok(instance)
    }

    /// 获取目标实例并转换为具体类型
    pub fn downcast<T>(&self) -> Result<Arc<T>, BoxError>
    where
        T: std::any::Any + Send + Sync,
    {
        self.instance()?.downcast::<T>().map_err(|_| {
            format!(
                "lazy proxy for `{}` does not wrap a {}",
                self.class_name,
                std::any::type_name::<T>()
            )
            .into()
        })
    }
}

impl fmt::Debug for LazyProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProxy")
            .field("class_name", &self.class_name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// 产生 [`LazyProxy`] 的代理工厂
#[derive(Default)]
pub struct LazyProxyFactory {
    generated: Mutex<BTreeSet<String>>,
}

impl LazyProxyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已经预生成代理的类
    pub fn generated_classes(&self) -> Vec<String> {
        self.generated.lock().iter().cloned().collect()
    }
}

impl ProxyFactory for LazyProxyFactory {
    fn create_proxy(&self, class_name: &str, initializer: Initializer) -> Result<Instance, BoxError> {
        Ok(Arc::new(LazyProxy::new(class_name, initializer)))
    }

    fn generate_proxy(&self, class_name: &str) -> Result<(), BoxError> {
        if self.generated.lock().insert(class_name.to_string()) {
            debug!(class = class_name, "proxy prepared");
        }
        Ok(())
    }
}

impl<P: ProxyFactory + ?Sized> ProxyFactory for Arc<P> {
    fn create_proxy(&self, class_name: &str, initializer: Initializer) -> Result<Instance, BoxError> {
        (**self).create_proxy(class_name, initializer)
    }

    fn generate_proxy(&self, class_name: &str) -> Result<(), BoxError> {
        (**self).generate_proxy(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};

    fn counting_initializer(counter: Arc<AtomicUsize>) -> Initializer {
        Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(n) as Instance)
        })
    }

    #[test]
    fn test_initializer_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let proxy = LazyProxy::new("Foo", counting_initializer(counter.clone()));
        assert!(!proxy.is_initialized());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let first = proxy.instance().unwrap();
        let second = proxy.instance().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(*proxy.downcast::<usize>().unwrap(), 1);
        assert!(proxy.is_initialized());
    }

    #[test]
    fn test_failed_initialization_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let proxy = LazyProxy::new(
            "Foo",
            Arc::new(move || {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("not yet".into())
                } else {
                    Ok(Arc::new("ready") as Instance)
                }
            }),
        );

        assert!(proxy.instance().is_err());
        assert!(!proxy.is_initialized());
        assert!(proxy.instance().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_proxy_is_usable_from_its_own_initializer() {
        let slot: Arc<OnceLock<Weak<LazyProxy>>> = Arc::new(OnceLock::new());
        let seen = slot.clone();
        let proxy = Arc::new(LazyProxy::new(
            "Foo",
            Arc::new(move || -> Result<Instance, BoxError> {
                let proxy = seen.get().and_then(Weak::upgrade).ok_or("proxy dropped")?;
                Ok(Arc::new(proxy.is_initialized()) as Instance)
            }),
        ));
        slot.set(Arc::downgrade(&proxy)).unwrap();

        assert!(!*proxy.downcast::<bool>().unwrap());
        assert!(proxy.is_initialized());
    }

    #[test]
    fn test_factory_tracks_generated_classes() {
        let factory = LazyProxyFactory::new();
        factory.generate_proxy("Foo").unwrap();
        factory.generate_proxy("Bar").unwrap();
        factory.generate_proxy("Foo").unwrap();
        assert_eq!(factory.generated_classes(), vec!["Bar".to_string(), "Foo".to_string()]);

        let proxy = factory
            .create_proxy("Foo", Arc::new(|| Ok(Arc::new(1_u8) as Instance)))
            .unwrap();
        let proxy = proxy.downcast::<LazyProxy>().unwrap();
        assert_eq!(proxy.class_name(), "Foo");
    }
}
