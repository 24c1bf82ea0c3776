//! 编译容器的集成测试

mod fixtures;

use fixtures::compiled::CompiledContainer;
use fixtures::{Bar, Foo, MagicMethod, ScalarDependency, Widget};
use ioc_wire::{
    CompiledFactories, CompiledFactory, Container, ContainerBuilder, ContainerError, Factory,
    Instance,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn live_container() -> Container {
    ContainerBuilder::new()
        .reflector(fixtures::catalog())
        .definitions(fixtures::compiled_definitions())
        .build()
}

fn compiled_container() -> Container {
    ContainerBuilder::new()
        .reflector(fixtures::catalog())
        .definitions(fixtures::compiled_definitions())
        .compiled(CompiledContainer)
        .build()
}

#[test]
fn test_generated_source_matches_checked_in_file() {
    let source = live_container().compile().unwrap();
    assert_eq!(source, include_str!("fixtures/compiled.rs"));
}

#[test]
fn test_compiled_and_live_construction_agree() {
    let live = live_container();
    let compiled = compiled_container();

    for container in [&live, &compiled] {
        let foo = container.get_as::<Foo>("Foo").unwrap();
        assert_eq!(foo.label, "primary");

        let bar = container.get_as::<Bar>("Bar").unwrap();
        assert!(Arc::ptr_eq(&bar.foo, &foo));
        assert_eq!(bar.label.as_deref(), Some("bar"));

        let magic = container.get_as::<MagicMethod>("MagicMethod").unwrap();
        assert_eq!(magic.calls, vec!["anything(1, <instance>)".to_string()]);

        let scalar = container.get_as::<ScalarDependency>("Scalar").unwrap();
        assert_eq!(scalar.number, 7);

        let widget = container.get_as::<Widget>("Widget").unwrap();
        let injected = widget.container.as_ref().unwrap().upgrade().unwrap();
        assert!(injected.ptr_eq(container));

        assert_eq!(*container.get_as::<u64>("answer").unwrap(), 42);
    }
}

#[test]
fn test_compiled_output_is_singleton_aware() {
    let container = compiled_container();
    let first = container.get("Foo").unwrap();
    let second = container.get("Foo").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

/// 记录调用次数的编译工厂
struct CountingCompiled;

static COMPILED_CALLS: AtomicUsize = AtomicUsize::new(0);

fn compiled_foo(_: &Container) -> Result<Instance, ioc_wire::BoxError> {
    COMPILED_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok(Arc::new(Foo {
        label: "from compiled".to_string(),
    }))
}

impl CompiledFactories for CountingCompiled {
    fn factory(&self, id: &str) -> Option<CompiledFactory> {
        match id {
            "Foo" => Some(compiled_foo as CompiledFactory),
            _ => None,
        }
    }
}

#[test]
fn test_compiled_factory_takes_precedence_over_definition() {
    let container = ContainerBuilder::new()
        .reflector(fixtures::catalog())
        .definition("Foo", serde_json::json!({"args": ["live"]}))
        .definition(
            "num",
            Factory::new(|_| Ok(Arc::new(1_u8) as Instance)),
        )
        .compiled(CountingCompiled)
        .build();

    let foo = container.get_as::<Foo>("Foo").unwrap();
    assert_eq!(foo.label, "from compiled");
    assert_eq!(COMPILED_CALLS.load(Ordering::SeqCst), 1);

    // 没有编译版本的条目仍走常规路径
    assert_eq!(*container.get_as::<u8>("num").unwrap(), 1);
    assert!(container.validate().is_empty());
}

#[test]
fn test_compile_failure_names_entry() {
    let container = live_container();
    container.register("anonymous", Factory::new(|_| Ok(Arc::new(0_u8) as Instance)));

    let err = container.compile().unwrap_err();
    assert!(matches!(&err, ContainerError::Compilation { id, .. } if id == "anonymous"));
    assert!(matches!(err.root_cause(), ContainerError::NotCompilable(_)));
}

#[test]
fn test_compile_container_writes_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("generated").join("compiled.rs");
    let container = ContainerBuilder::new()
        .reflector(fixtures::catalog())
        .definitions(fixtures::compiled_definitions())
        .compiled_output(&output)
        .build();

    let written = container.compile_container().unwrap();
    assert_eq!(written, output);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        include_str!("fixtures/compiled.rs")
    );
}
