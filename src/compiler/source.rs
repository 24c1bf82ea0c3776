//! 生成源码的排版
//!
//! 只负责把每个条目的函数体拼成完整的 Rust 源文件，不做任何绑定。

/// 生成文件的首行注释
pub const HEADER: &str = "// Generated by ioc-wire. Do not edit.";

const INDENT: &str = "    ";

/// 一个条目的生成函数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMethod {
    pub id: String,
    pub name: String,
    pub body: Vec<String>,
}

/// 生成 `struct_name` 单元结构体、每个条目一个关联函数，以及
/// `CompiledFactories` 实现。
pub fn render<'a>(struct_name: &str, methods: impl IntoIterator<Item = &'a GeneratedMethod>) -> String {
    let methods: Vec<&GeneratedMethod> = methods.into_iter().collect();
    let mut out = String::new();

    out.push_str(HEADER);
    out.push_str("\n\n");
    out.push_str(&format!("pub struct {};\n\n", struct_name));

    out.push_str("#[allow(non_snake_case, unused_mut, unused_variables)]\n");
    out.push_str(&format!("impl {} {{\n", struct_name));
    for (index, method) in methods.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{}pub fn {}(container: &ioc_wire::Container) -> Result<ioc_wire::Instance, ioc_wire::BoxError> {{\n",
            INDENT, method.name
        ));
        for line in &method.body {
            out.push_str(&format!("{0}{0}{1}\n", INDENT, line));
        }
        out.push_str(&format!("{}}}\n", INDENT));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl ioc_wire::CompiledFactories for {} {{\n", struct_name));
    out.push_str(&format!(
        "{}fn factory(&self, id: &str) -> Option<ioc_wire::CompiledFactory> {{\n",
        INDENT
    ));
    out.push_str(&format!("{0}{0}match id {{\n", INDENT));
    for method in &methods {
        out.push_str(&format!(
            "{0}{0}{0}{1:?} => Some({2}::{3} as ioc_wire::CompiledFactory),\n",
            INDENT, method.id, struct_name, method.name
        ));
    }
    out.push_str(&format!("{0}{0}{0}_ => None,\n", INDENT));
    out.push_str(&format!("{0}{0}}}\n", INDENT));
    out.push_str(&format!("{}}}\n", INDENT));
    out.push_str("}\n");

    out
}

/// 参数表达式以 `, ` 连接
pub fn join_arguments(arguments: &[String]) -> String {
    arguments.join(", ")
}
