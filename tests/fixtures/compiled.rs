// Generated by ioc-wire. Do not edit.

pub struct CompiledContainer;

#[allow(non_snake_case, unused_mut, unused_variables)]
impl CompiledContainer {
    pub fn create_Bar(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        let mut instance = crate::fixtures::new_bar(vec![ioc_wire::Value::from(container.get("Foo")?)])?;
        crate::fixtures::bar_set_label(&mut *instance, vec![ioc_wire::Value::Literal(serde_json::Value::from("bar"))])?;
        Ok(ioc_wire::Instance::from(instance))
    }

    pub fn create_Foo(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        let mut instance = crate::fixtures::new_foo(vec![ioc_wire::Value::Literal(serde_json::Value::from("primary"))])?;
        Ok(ioc_wire::Instance::from(instance))
    }

    pub fn create_MagicMethod(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        let mut instance = crate::fixtures::new_magic_method(vec![])?;
        crate::fixtures::magic_dispatch(&mut *instance, "anything", vec![ioc_wire::Value::Literal(serde_json::Value::from(1_u64)), ioc_wire::Value::from(container.get("Foo")?)])?;
        Ok(ioc_wire::Instance::from(instance))
    }

    pub fn create_Scalar(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        let mut instance = crate::fixtures::new_scalar_dependency(vec![ioc_wire::Value::Literal(serde_json::Value::from(7_u64))])?;
        Ok(ioc_wire::Instance::from(instance))
    }

    pub fn create_Widget(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        let mut instance = crate::fixtures::new_widget(vec![])?;
        ioc_wire::inject_container::<crate::fixtures::Widget>(&mut *instance, container.downgrade());
        Ok(ioc_wire::Instance::from(instance))
    }

    pub fn create_answer(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {
        crate::fixtures::make_answer(container)
    }
}

impl ioc_wire::CompiledFactories for CompiledContainer {
    fn factory(&self, id: &str) -> Option<ioc_wire::CompiledFactory> {
        match id {
            "Bar" => Some(CompiledContainer::create_Bar as ioc_wire::CompiledFactory),
            "Foo" => Some(CompiledContainer::create_Foo as ioc_wire::CompiledFactory),
            "MagicMethod" => Some(CompiledContainer::create_MagicMethod as ioc_wire::CompiledFactory),
            "Scalar" => Some(CompiledContainer::create_Scalar as ioc_wire::CompiledFactory),
            "Widget" => Some(CompiledContainer::create_Widget as ioc_wire::CompiledFactory),
            "answer" => Some(CompiledContainer::create_answer as ioc_wire::CompiledFactory),
            _ => None,
        }
    }
}
