//! model - 结构模型
//!
//! 类型、成员、关系以及按插入顺序索引的类型注册表

mod registry;
mod types;

pub use registry::{RegistryError, TypeRegistry};
pub use types::{
    Cardinality, Field, InterfaceRecord, Method, Parameter, Relation, RelationKind, TypeRecord,
};
