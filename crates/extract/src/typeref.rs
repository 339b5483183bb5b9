//! 类型引用规范化
//!
//! 语法树中的类型节点转成固定文本格式:
//! `*T`, `[]T`, `[n]T`, `map[K]V`, `chan T`, `chan<- T`, `<-chan T`,
//! `func`, `interface{}`, `struct`, `pkg.T`, `T[A, B]`, 其他为 `unknown`

use tree_sitter::Node;

const UNKNOWN: &str = "unknown";

/// 把类型节点规范化为字符串
pub fn normalize_type(node: Node, source: &str) -> String {
    match node.kind() {
        "type_identifier" | "identifier" | "field_identifier" => {
            source[node.byte_range()].to_string()
        }
        "qualified_type" => {
            match (node.child_by_field_name("package"), node.child_by_field_name("name")) {
                (Some(package), Some(name)) => format!(
                    "{}.{}",
                    &source[package.byte_range()],
                    &source[name.byte_range()]
                ),
                _ => UNKNOWN.to_string(),
            }
        }
        "pointer_type" => format!("*{}", normalize_inner(node, source)),
        "slice_type" => format!("[]{}", normalize_field(node, "element", source)),
        "array_type" | "implicit_length_array_type" => {
            format!("[n]{}", normalize_field(node, "element", source))
        }
        "map_type" => format!(
            "map[{}]{}",
            normalize_field(node, "key", source),
            normalize_field(node, "value", source)
        ),
        "channel_type" => {
            let value = normalize_field(node, "value", source);
            let tokens: Vec<&str> = node
                .children(&mut node.walk())
                .filter(|c| !c.is_named())
                .map(|c| c.kind())
                .collect();
            if tokens.first() == Some(&"<-") {
                format!("<-chan {}", value)
            } else if tokens.contains(&"<-") {
                format!("chan<- {}", value)
            } else {
                format!("chan {}", value)
            }
        }
        "function_type" => "func".to_string(),
        "interface_type" => "interface{}".to_string(),
        "struct_type" => "struct".to_string(),
        "parenthesized_type" => normalize_inner(node, source),
        "generic_type" => {
            let base = normalize_field(node, "type", source);
            let arguments: Vec<String> = node
                .child_by_field_name("type_arguments")
                .map(|args| {
                    args.named_children(&mut args.walk())
                        .map(|arg| {
                            // 新版语法把每个实参包在 type_elem 里
                            if arg.kind() == "type_elem" {
                                normalize_inner(arg, source)
                            } else {
                                normalize_type(arg, source)
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            if arguments.is_empty() {
                base
            } else {
                format!("{}[{}]", base, arguments.join(", "))
            }
        }
        _ => UNKNOWN.to_string(),
    }
}

fn normalize_field(node: Node, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| normalize_type(child, source))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn normalize_inner(node: Node, source: &str) -> String {
    node.named_child(0)
        .map(|child| normalize_type(child, source))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// 去掉恰好一个前导 `*`
pub fn strip_pointer(type_ref: &str) -> &str {
    type_ref.strip_prefix('*').unwrap_or(type_ref)
}

/// 去掉 `[]` 或 `[n]` 前缀, 不是切片/数组时返回 None
pub fn strip_collection(type_ref: &str) -> Option<&str> {
    type_ref
        .strip_prefix("[]")
        .or_else(|| type_ref.strip_prefix("[n]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoParser;

    /// 解析单个结构体, 返回 (字段名, 规范化类型)
    fn field_types(body: &str) -> Vec<(String, String)> {
        let source = format!("package p\n\ntype S struct {{\n{}\n}}\n", body);
        let mut parser = GoParser::new().unwrap();
        let unit = parser.parse("p.go", source).unwrap();
        let mut result = Vec::new();
        collect(unit.root(), unit.source(), &mut result);
        result
    }

    fn collect(node: Node, source: &str, out: &mut Vec<(String, String)>) {
        if node.kind() == "field_declaration" {
            let name = node
                .child_by_field_name("name")
                .map(|n| source[n.byte_range()].to_string())
                .unwrap_or_default();
            let ty = node
                .child_by_field_name("type")
                .map(|t| normalize_type(t, source))
                .unwrap_or_default();
            out.push((name, ty));
            return;
        }
        for child in node.children(&mut node.walk()) {
            collect(child, source, out);
        }
    }

    fn type_of(body: &str) -> String {
        field_types(body).remove(0).1
    }

    #[test]
    fn test_identifiers_and_pointers() {
        assert_eq!(type_of("a int"), "int");
        assert_eq!(type_of("a *Engine"), "*Engine");
        assert_eq!(type_of("a **Engine"), "**Engine");
        assert_eq!(type_of("a time.Duration"), "time.Duration");
        assert_eq!(type_of("a *http.Client"), "*http.Client");
    }

    #[test]
    fn test_collections() {
        assert_eq!(type_of("a []Wheel"), "[]Wheel");
        assert_eq!(type_of("a [4]*Wheel"), "[n]*Wheel");
        assert_eq!(type_of("a map[string][]int"), "map[string][]int");
    }

    #[test]
    fn test_channel_directions() {
        assert_eq!(type_of("a chan int"), "chan int");
        assert_eq!(type_of("a chan<- Event"), "chan<- Event");
        assert_eq!(type_of("a <-chan Event"), "<-chan Event");
    }

    #[test]
    fn test_anonymous_shapes() {
        assert_eq!(type_of("a func(int) error"), "func");
        assert_eq!(type_of("a interface{ Close() }"), "interface{}");
        assert_eq!(type_of("a struct{ X int }"), "struct");
    }

    #[test]
    fn test_generic_instantiation() {
        assert_eq!(type_of("a Stack[int]"), "Stack[int]");
        assert_eq!(type_of("a Pair[string, *Node]"), "Pair[string, *Node]");
    }

    #[test]
    fn test_strip_pointer_only_once() {
        assert_eq!(strip_pointer("*Engine"), "Engine");
        assert_eq!(strip_pointer("**Engine"), "*Engine");
        assert_eq!(strip_pointer("Engine"), "Engine");
    }

    #[test]
    fn test_strip_collection() {
        assert_eq!(strip_collection("[]Wheel"), Some("Wheel"));
        assert_eq!(strip_collection("[n]*Wheel"), Some("*Wheel"));
        assert_eq!(strip_collection("map[string]Wheel"), None);
        assert_eq!(strip_collection("Wheel"), None);
    }
}
