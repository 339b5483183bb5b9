use serde::Serialize;
use std::fmt;

/// 结构体字段
///
/// `name == type_ref` 表示匿名(嵌入)字段, 例如 `struct { *Base }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// 规范化后的类型引用: "*T", "[]T", "map[K]V" ...
    pub type_ref: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }

    /// 嵌入字段: 名字与类型引用相同
    pub fn embedded(type_ref: impl Into<String>) -> Self {
        let type_ref = type_ref.into();
        Self {
            name: type_ref.clone(),
            type_ref,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.name == self.type_ref
    }
}

/// 方法参数, 匿名参数的 `name` 为空
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }

    pub fn unnamed(type_ref: impl Into<String>) -> Self {
        Self::new(String::new(), type_ref)
    }
}

/// 方法签名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// 返回值类型, 按声明顺序
    pub returns: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return(mut self, type_ref: impl Into<String>) -> Self {
        self.returns.push(type_ref.into());
        self
    }

    /// 返回类型文本: 多个返回值以 ", " 连接, 无返回值时为空
    pub fn return_type(&self) -> String {
        self.returns.join(", ")
    }

    /// 参数类型与返回类型逐一相同 (忽略参数名)
    pub fn signature_matches(&self, other: &Method) -> bool {
        self.name == other.name
            && self.returns == other.returns
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.type_ref == b.type_ref)
    }
}

/// 结构体类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRecord {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl TypeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// 接口类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub methods: Vec<Method>,
}

impl InterfaceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}

/// 关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Extends,
    Implements,
    Aggregation,
    Composition,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Composition => "composition",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 关系基数: "", "1", "*"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Cardinality {
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "*")]
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Unspecified => "",
            Cardinality::One => "1",
            Cardinality::Many => "*",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 类型之间的有向关系
///
/// 字段顺序即排序键: (from, to, kind, cardinality)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
    pub cardinality: Cardinality,
}

impl Relation {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: RelationKind,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            cardinality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_field_name_equals_type() {
        let field = Field::embedded("*Base");
        assert_eq!(field.name, "*Base");
        assert!(field.is_embedded());
        assert!(!Field::new("base", "*Base").is_embedded());
    }

    #[test]
    fn test_return_type_joins_in_order() {
        let method = Method::new("Read").with_return("int").with_return("error");
        assert_eq!(method.return_type(), "int, error");
        assert_eq!(Method::new("Close").return_type(), "");
    }

    #[test]
    fn test_signature_matches_ignores_parameter_names() {
        let a = Method::new("Write")
            .with_parameter(Parameter::new("p", "[]byte"))
            .with_return("int");
        let b = Method::new("Write")
            .with_parameter(Parameter::new("buf", "[]byte"))
            .with_return("int");
        assert!(a.signature_matches(&b));
    }

    #[test]
    fn test_signature_matches_detects_return_mismatch() {
        let a = Method::new("Area").with_return("float64");
        let b = Method::new("Area").with_return("int");
        assert!(!a.signature_matches(&b));
    }

    #[test]
    fn test_relation_ordering_uses_from_then_to() {
        let mut relations = vec![
            Relation::new("B", "A", RelationKind::Extends, Cardinality::One),
            Relation::new("A", "C", RelationKind::Aggregation, Cardinality::Many),
            Relation::new("A", "B", RelationKind::Composition, Cardinality::One),
        ];
        relations.sort();
        let pairs: Vec<_> = relations.iter().map(|r| (r.from.as_str(), r.to.as_str())).collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "A")]);
    }

    #[test]
    fn test_relation_serializes_wire_names() {
        let relation = Relation::new("Car", "Engine", RelationKind::Composition, Cardinality::One);
        let json = serde_json::to_value(&relation).unwrap();
        assert_eq!(json["kind"], "composition");
        assert_eq!(json["cardinality"], "1");
    }
}
