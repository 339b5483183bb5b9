use model::{Cardinality, Method, Relation, RelationKind, TypeRegistry};

/// PlantUML 类图生成器
///
/// 类型与关系在输出前排序, 相同模型总是得到相同文本
pub struct PlantUmlGenerator {
    title: Option<String>,
}

impl PlantUmlGenerator {
    pub fn new() -> Self {
        Self { title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 生成 PlantUML 文本
    pub fn generate(&self, registry: &TypeRegistry, relations: &[Relation]) -> String {
        let mut lines = vec!["@startuml".to_string()];
        if let Some(title) = &self.title {
            lines.push(format!("title {}", title));
        }
        lines.push(String::new());

        let mut records: Vec<_> = registry.records().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        for record in records {
            lines.push(format!("class {} {{", record.name));
            // 嵌入字段只体现为继承关系
            for field in record.fields.iter().filter(|f| !f.is_embedded()) {
                lines.push(format!("    +{}: {}", field.name, field.type_ref));
            }
            for method in &record.methods {
                lines.push(format!("    {}", Self::method_line(method)));
            }
            lines.push("}".to_string());
            lines.push(String::new());
        }

        let mut interfaces: Vec<_> = registry.interfaces().collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        for interface in interfaces {
            lines.push(format!("interface {} {{", interface.name));
            for method in &interface.methods {
                lines.push(format!("    {}", Self::method_line(method)));
            }
            lines.push("}".to_string());
            lines.push(String::new());
        }

        let mut sorted: Vec<&Relation> = relations.iter().collect();
        sorted.sort();
        lines.extend(sorted.into_iter().map(Self::relation_line));

        lines.push(String::new());
        lines.push("@enduml".to_string());
        lines.join("\n")
    }

    #[doc(hidden)]
    pub fn method_line(method: &Method) -> String {
        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.type_ref.clone()
                } else {
                    format!("{}: {}", p.name, p.type_ref)
                }
            })
            .collect();

        let return_type = method.return_type();
        if return_type.is_empty() {
            format!("+{}({})", method.name, params.join(", "))
        } else {
            format!("+{}({}): {}", method.name, params.join(", "), return_type)
        }
    }

    #[doc(hidden)]
    pub fn relation_line(relation: &Relation) -> String {
        match relation.kind {
            RelationKind::Extends => format!("{} <|-- {}", relation.to, relation.from),
            RelationKind::Implements => format!("{} <|.. {}", relation.to, relation.from),
            RelationKind::Aggregation if relation.cardinality == Cardinality::Many => {
                format!("{} o-- \"{}\" {}", relation.from, relation.cardinality, relation.to)
            }
            RelationKind::Aggregation => format!("{} o-- {}", relation.from, relation.to),
            RelationKind::Composition => format!("{} *-- {}", relation.from, relation.to),
        }
    }
}

impl Default for PlantUmlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Field, InterfaceRecord, Parameter, TypeRecord};

    fn sample_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_record(
                TypeRecord::new("Car")
                    .with_field(Field::new("Engine", "*Engine"))
                    .with_field(Field::embedded("Vehicle"))
                    .with_method(
                        Method::new("Drive")
                            .with_parameter(Parameter::new("speed", "int"))
                            .with_parameter(Parameter::unnamed("bool"))
                            .with_return("error"),
                    ),
            )
            .unwrap();
        registry.register_record(TypeRecord::new("Engine")).unwrap();
        registry
            .register_interface(
                InterfaceRecord::new("Driver")
                    .with_method(Method::new("Drive").with_return("error")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_generate_full_document() {
        let registry = sample_registry();
        let relations = vec![
            Relation::new("Car", "Engine", RelationKind::Composition, Cardinality::One),
            Relation::new("Car", "Driver", RelationKind::Implements, Cardinality::Unspecified),
        ];
        let text = PlantUmlGenerator::new().generate(&registry, &relations);
        let expected = "\
@startuml

class Car {
    +Engine: *Engine
    +Drive(speed: int, bool): error
}

class Engine {
}

interface Driver {
    +Drive(): error
}

Driver <|.. Car
Car *-- Engine

@enduml";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_embedded_fields_not_listed() {
        let text = PlantUmlGenerator::new().generate(&sample_registry(), &[]);
        assert!(!text.contains("Vehicle"));
    }

    #[test]
    fn test_relation_lines() {
        let line = |kind, card| {
            PlantUmlGenerator::relation_line(&Relation::new("From", "To", kind, card))
        };
        assert_eq!(line(RelationKind::Extends, Cardinality::One), "To <|-- From");
        assert_eq!(line(RelationKind::Implements, Cardinality::Unspecified), "To <|.. From");
        assert_eq!(line(RelationKind::Aggregation, Cardinality::One), "From o-- To");
        assert_eq!(line(RelationKind::Aggregation, Cardinality::Many), "From o-- \"*\" To");
        assert_eq!(line(RelationKind::Composition, Cardinality::One), "From *-- To");
    }

    #[test]
    fn test_output_independent_of_input_order() {
        let mut forward = TypeRegistry::new();
        forward.register_record(TypeRecord::new("A")).unwrap();
        forward.register_record(TypeRecord::new("B")).unwrap();
        let mut backward = TypeRegistry::new();
        backward.register_record(TypeRecord::new("B")).unwrap();
        backward.register_record(TypeRecord::new("A")).unwrap();

        let ab = Relation::new("A", "B", RelationKind::Aggregation, Cardinality::One);
        let ba = Relation::new("B", "A", RelationKind::Composition, Cardinality::One);

        let generator = PlantUmlGenerator::new();
        assert_eq!(
            generator.generate(&forward, &[ab.clone(), ba.clone()]),
            generator.generate(&backward, &[ba, ab])
        );
    }

    #[test]
    fn test_duplicate_relations_are_kept() {
        let registry = sample_registry();
        let relation = Relation::new("Car", "Engine", RelationKind::Composition, Cardinality::One);
        let text = PlantUmlGenerator::new().generate(&registry, &[relation.clone(), relation]);
        assert_eq!(text.matches("Car *-- Engine").count(), 2);
    }

    #[test]
    fn test_title_line() {
        let text = PlantUmlGenerator::new()
            .with_title("shapes")
            .generate(&TypeRegistry::new(), &[]);
        assert_eq!(text, "@startuml\ntitle shapes\n\n\n@enduml");
    }
}
