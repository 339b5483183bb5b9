//! 声明提取器
//!
//! 阶段 1: 逐文件登记结构体与接口, 合并进同一个注册表
//! 阶段 2: 逐文件把带接收者的方法挂到所属结构体
//!
//! 分两阶段后, 方法与类型分处不同文件时结果与文件顺序无关

use crate::error::Result;
use crate::parser::SourceUnit;
use crate::typeref::normalize_type;
use model::{Field, InterfaceRecord, Method, Parameter, TypeRecord, TypeRegistry};
use tree_sitter::Node;

/// 从全部源文件构建一个新的注册表
pub fn extract_all(units: &[SourceUnit]) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    for unit in units {
        registry.merge(declarations(unit)?)?;
    }

    let mut attached = 0;
    for unit in units {
        attached += attach_methods(unit, &mut registry);
    }

    tracing::debug!(
        "extracted {} records, {} interfaces, {} methods from {} units",
        registry.record_count(),
        registry.interface_count(),
        attached,
        units.len()
    );

    Ok(registry)
}

/// 阶段 1: 单个文件的类型声明
pub fn declarations(unit: &SourceUnit) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    let root = unit.root();

    for decl in root.named_children(&mut root.walk()) {
        if decl.kind() != "type_declaration" {
            continue;
        }
        // type ( ... ) 分组声明的 type_spec 也是直接子节点
        for spec in decl.named_children(&mut decl.walk()) {
            if spec.kind() != "type_spec" {
                continue;
            }
            let (Some(name), Some(shape)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };
            let name = unit.text(name).to_string();

            match shape.kind() {
                "struct_type" => registry.register_record(struct_record(unit, name, shape))?,
                "interface_type" => {
                    registry.register_interface(interface_record(unit, name, shape))?
                }
                _ => {}
            }
        }
    }

    Ok(registry)
}

/// 阶段 2: 挂载方法, 返回成功挂载的数量
///
/// 接收者类型未登记的方法直接丢弃
pub fn attach_methods(unit: &SourceUnit, registry: &mut TypeRegistry) -> usize {
    let root = unit.root();
    let mut attached = 0;

    for decl in root.named_children(&mut root.walk()) {
        if decl.kind() != "method_declaration" {
            continue;
        }
        let (Some(owner), Some(name)) =
            (receiver_owner(unit, decl), decl.child_by_field_name("name"))
        else {
            continue;
        };
        let method = signature(unit, unit.text(name), decl);

        if registry.attach_method(&owner, method) {
            attached += 1;
        } else {
            tracing::debug!(
                "{}: dropping method {}.{}, receiver type not registered",
                unit.path().display(),
                owner,
                unit.text(name)
            );
        }
    }

    attached
}

fn struct_record(unit: &SourceUnit, name: String, node: Node) -> TypeRecord {
    let mut record = TypeRecord::new(name);

    for list in node.named_children(&mut node.walk()) {
        if list.kind() != "field_declaration_list" {
            continue;
        }
        for decl in list.named_children(&mut list.walk()) {
            if decl.kind() == "field_declaration" {
                record.fields.extend(fields_of(unit, decl));
            }
        }
    }

    record
}

/// `X, Y int` 产生两个字段; 无名字段为嵌入字段
fn fields_of(unit: &SourceUnit, decl: Node) -> Vec<Field> {
    let Some(ty) = decl.child_by_field_name("type") else {
        return Vec::new();
    };
    let type_ref = normalize_type(ty, unit.source());
    let names: Vec<&str> = decl
        .children_by_field_name("name", &mut decl.walk())
        .map(|n| unit.text(n))
        .collect();

    if names.is_empty() {
        // 嵌入指针的 `*` 是 field_declaration 的直接子 token
        let pointer = decl.children(&mut decl.walk()).any(|c| c.kind() == "*");
        let type_ref = if pointer { format!("*{}", type_ref) } else { type_ref };
        return vec![Field::embedded(type_ref)];
    }

    names
        .into_iter()
        .map(|name| Field::new(name, type_ref.clone()))
        .collect()
}

fn interface_record(unit: &SourceUnit, name: String, node: Node) -> InterfaceRecord {
    let mut interface = InterfaceRecord::new(name);
    collect_interface_methods(unit, node, &mut interface.methods);
    interface
}

fn collect_interface_methods(unit: &SourceUnit, node: Node, methods: &mut Vec<Method>) {
    for elem in node.named_children(&mut node.walk()) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                if let Some(name) = elem.child_by_field_name("name") {
                    methods.push(signature(unit, unit.text(name), elem));
                }
            }
            // 旧版语法多一层 method_spec_list
            "method_spec_list" => collect_interface_methods(unit, elem, methods),
            // 嵌入接口与类型约束不产生方法
            _ => {}
        }
    }
}

/// 方法签名: 读取 `parameters` 与 `result` 字段
fn signature(unit: &SourceUnit, name: &str, node: Node) -> Method {
    let mut method = Method::new(name);
    if let Some(params) = node.child_by_field_name("parameters") {
        method.parameters = parameters_of(unit, params);
    }
    if let Some(result) = node.child_by_field_name("result") {
        method.returns = results_of(unit, result);
    }
    method
}

fn parameters_of(unit: &SourceUnit, list: Node) -> Vec<Parameter> {
    let mut parameters = Vec::new();

    for decl in list.named_children(&mut list.walk()) {
        let Some(type_ref) = declared_type(unit, decl) else {
            continue;
        };
        let names: Vec<&str> = decl
            .children_by_field_name("name", &mut decl.walk())
            .map(|n| unit.text(n))
            .collect();

        if names.is_empty() {
            parameters.push(Parameter::unnamed(type_ref));
        } else {
            parameters.extend(names.into_iter().map(|n| Parameter::new(n, type_ref.clone())));
        }
    }

    parameters
}

/// 返回值: 每个声明项一个类型, `(a, b int)` 只记一次 `int`
fn results_of(unit: &SourceUnit, result: Node) -> Vec<String> {
    if result.kind() != "parameter_list" {
        return vec![normalize_type(result, unit.source())];
    }
    result
        .named_children(&mut result.walk())
        .filter_map(|decl| declared_type(unit, decl))
        .collect()
}

fn declared_type(unit: &SourceUnit, decl: Node) -> Option<String> {
    let ty = decl.child_by_field_name("type")?;
    let type_ref = normalize_type(ty, unit.source());
    match decl.kind() {
        "parameter_declaration" => Some(type_ref),
        "variadic_parameter_declaration" => Some(format!("...{}", type_ref)),
        _ => None,
    }
}

/// 接收者基础类型名: `(c *Circle)`, `(c Circle)`, `(s *Stack[T])` 都解析为类型名
fn receiver_owner(unit: &SourceUnit, decl: Node) -> Option<String> {
    let receiver = decl.child_by_field_name("receiver")?;
    let param = receiver
        .named_children(&mut receiver.walk())
        .find(|c| c.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    if ty.kind() == "pointer_type" {
        ty = ty.named_child(0)?;
    }
    if ty.kind() == "generic_type" {
        ty = ty.child_by_field_name("type")?;
    }
    match ty.kind() {
        "type_identifier" => Some(unit.text(ty).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::parser::GoParser;
    use model::RegistryError;

    fn unit(path: &str, source: &str) -> SourceUnit {
        GoParser::new().unwrap().parse(path, source).unwrap()
    }

    fn extract(source: &str) -> TypeRegistry {
        extract_all(&[unit("main.go", source)]).unwrap()
    }

    #[test]
    fn test_struct_fields_and_embedding() {
        let registry = extract(
            r#"package car

type Engine struct{}

type Car struct {
	Engine *Engine
	Base
	*Chassis
	X, Y  int
	Tags  []string `json:"tags"`
}
"#,
        );

        let car = registry.record("Car").unwrap();
        let fields: Vec<_> = car
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_ref.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Engine", "*Engine"),
                ("Base", "Base"),
                ("*Chassis", "*Chassis"),
                ("X", "int"),
                ("Y", "int"),
                ("Tags", "[]string"),
            ]
        );
        assert!(registry.record("Engine").unwrap().fields.is_empty());
    }

    #[test]
    fn test_interface_methods_with_multiple_returns() {
        let registry = extract(
            r#"package io

type ReadWriter interface {
	Reader
	Read(p []byte) (n int, err error)
	Write([]byte) (int, error)
	Close() error
	Flush()
}
"#,
        );

        let rw = registry.interface("ReadWriter").unwrap();
        let names: Vec<_> = rw.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Read", "Write", "Close", "Flush"]);

        let read = &rw.methods[0];
        assert_eq!(read.parameters, vec![Parameter::new("p", "[]byte")]);
        assert_eq!(read.return_type(), "int, error");

        let write = &rw.methods[1];
        assert_eq!(write.parameters, vec![Parameter::unnamed("[]byte")]);
        assert_eq!(rw.methods[2].return_type(), "error");
        assert!(rw.methods[3].returns.is_empty());
    }

    #[test]
    fn test_methods_attach_to_pointer_and_value_receivers() {
        let registry = extract(
            r#"package shapes

func (c *Circle) Area() float64 { return 0 }

type Circle struct{ R float64 }

func (c Circle) Scale(factor float64, rest ...int) Circle { return c }

func Free() {}
"#,
        );

        let circle = registry.record("Circle").unwrap();
        let names: Vec<_> = circle.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Area", "Scale"]);
        assert_eq!(
            circle.methods[1].parameters,
            vec![Parameter::new("factor", "float64"), Parameter::new("rest", "...int")]
        );
    }

    #[test]
    fn test_methods_across_units_are_order_independent() {
        let methods = unit(
            "a_methods.go",
            "package shapes\n\nfunc (s *Square) Area() float64 { return 0 }\n",
        );
        let types = unit("b_types.go", "package shapes\n\ntype Square struct{ Side float64 }\n");

        let registry = extract_all(&[methods, types]).unwrap();
        assert!(registry.record("Square").unwrap().has_method("Area"));
    }

    #[test]
    fn test_method_on_unknown_owner_is_dropped() {
        let registry = extract(concat!(
            "package p\n\ntype Known struct{}\n\n",
            "func (g *Ghost) Boo() {}\nfunc (k Known) Hi() {}\n",
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.record("Known").unwrap().methods.len(), 1);
    }

    #[test]
    fn test_generic_receiver_resolves_base_name() {
        let registry = extract(concat!(
            "package p\n\ntype Stack[T any] struct{ items []T }\n\n",
            "func (s *Stack[T]) Push(v T) {}\n",
        ));
        let stack = registry.record("Stack").unwrap();
        assert!(stack.has_method("Push"));
        assert_eq!(stack.fields[0].type_ref, "[]T");
    }

    #[test]
    fn test_grouped_declarations_and_aliases() {
        let registry = extract(
            r#"package p

type (
	A struct{}
	B interface{ Do() }
	ID int
	Alias = A
)
"#,
        );
        assert_eq!(registry.names(), &["A", "B"]);
        assert!(registry.is_interface("B"));
    }

    #[test]
    fn test_duplicate_type_across_units_aborts() {
        let a = unit("a.go", "package p\n\ntype Config struct{}\n");
        let b = unit("b.go", "package p\n\ntype Config interface{ Load() }\n");
        let err = extract_all(&[a, b]).err().unwrap();
        assert!(matches!(
            err,
            ExtractError::Registry(RegistryError::DuplicateType(ref name)) if name == "Config"
        ));
    }
}
