use extract::{strip_collection, strip_pointer};
use model::{Cardinality, Field, InterfaceRecord, Relation, RelationKind, TypeRecord, TypeRegistry};

/// 嵌入字段的关系策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingPolicy {
    /// 嵌入一律视为继承
    #[default]
    Extends,
    /// 嵌入指针视为组合, 嵌入值仍为继承
    CompositionForPointer,
}

/// 接口实现的判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SatisfactionMode {
    /// 只比较方法名, 不看参数与返回值
    #[default]
    NameOnly,
    /// 参数类型与返回类型也必须一致
    Signature,
}

/// 关系推断器
pub struct RelationInferencer {
    embedding: EmbeddingPolicy,
    satisfaction: SatisfactionMode,
}

impl RelationInferencer {
    pub fn new() -> Self {
        Self {
            embedding: EmbeddingPolicy::default(),
            satisfaction: SatisfactionMode::default(),
        }
    }

    pub fn with_embedding_policy(mut self, policy: EmbeddingPolicy) -> Self {
        self.embedding = policy;
        self
    }

    pub fn with_satisfaction_mode(mut self, mode: SatisfactionMode) -> Self {
        self.satisfaction = mode;
        self
    }

    /// 推断全部关系
    ///
    /// 先按注册表顺序输出字段关系, 再输出结构化的接口实现; 不去重
    pub fn infer(&self, registry: &TypeRegistry) -> Vec<Relation> {
        let mut relations = Vec::new();

        for record in registry.records() {
            for field in &record.fields {
                self.field_relations(record, field, registry, &mut relations);
            }
        }

        for record in registry.records() {
            for interface in registry.interfaces() {
                if self.satisfies(record, interface) {
                    relations.push(Relation::new(
                        &record.name,
                        &interface.name,
                        RelationKind::Implements,
                        Cardinality::Unspecified,
                    ));
                }
            }
        }

        tracing::debug!("inferred {} relations", relations.len());
        relations
    }

    fn field_relations(
        &self,
        record: &TypeRecord,
        field: &Field,
        registry: &TypeRegistry,
        relations: &mut Vec<Relation>,
    ) {
        let target = strip_pointer(&field.type_ref);
        if registry.is_record(target) {
            relations.push(Relation::new(
                &record.name,
                target,
                self.member_kind(field),
                Cardinality::One,
            ));
        }

        if let Some(element) = strip_collection(&field.type_ref) {
            let element = strip_pointer(element);
            if registry.is_record(element) {
                relations.push(Relation::new(
                    &record.name,
                    element,
                    RelationKind::Aggregation,
                    Cardinality::Many,
                ));
            }
        }

        if registry.is_interface(&field.type_ref) {
            relations.push(Relation::new(
                &record.name,
                &field.type_ref,
                RelationKind::Implements,
                Cardinality::Unspecified,
            ));
        }
    }

    /// 嵌入判定优先于指针判定
    fn member_kind(&self, field: &Field) -> RelationKind {
        let pointer = field.type_ref.starts_with('*');
        if field.is_embedded() {
            match self.embedding {
                EmbeddingPolicy::CompositionForPointer if pointer => RelationKind::Composition,
                _ => RelationKind::Extends,
            }
        } else if pointer {
            RelationKind::Composition
        } else {
            RelationKind::Aggregation
        }
    }

    /// 结构体是否实现接口; 没有方法的接口不参与判定
    pub fn satisfies(&self, record: &TypeRecord, interface: &InterfaceRecord) -> bool {
        if interface.methods.is_empty() {
            return false;
        }
        interface.methods.iter().all(|required| match self.satisfaction {
            SatisfactionMode::NameOnly => record.has_method(&required.name),
            SatisfactionMode::Signature => record
                .find_method(&required.name)
                .map(|m| m.signature_matches(required))
                .unwrap_or(false),
        })
    }
}

impl Default for RelationInferencer {
    fn default() -> Self {
        Self::new()
    }
}
