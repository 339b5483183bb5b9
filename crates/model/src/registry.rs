use crate::types::{InterfaceRecord, Method, TypeRecord};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type declared more than once: {0}")]
    DuplicateType(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// 类型注册表
///
/// 查找用 HashMap, 遍历一律走插入顺序索引 `order`, 保证输出可复现
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    records: HashMap<String, TypeRecord>,
    interfaces: HashMap<String, InterfaceRecord>,
    order: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_record(&mut self, record: TypeRecord) -> Result<()> {
        self.ensure_vacant(&record.name)?;
        self.order.push(record.name.clone());
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn register_interface(&mut self, interface: InterfaceRecord) -> Result<()> {
        self.ensure_vacant(&interface.name)?;
        self.order.push(interface.name.clone());
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    fn ensure_vacant(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    /// 把方法挂到所属结构体, 结构体未注册时返回 false
    pub fn attach_method(&mut self, owner: &str, method: Method) -> bool {
        match self.records.get_mut(owner) {
            Some(record) => {
                record.methods.push(method);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name) || self.interfaces.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Option<&TypeRecord> {
        self.records.get(name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceRecord> {
        self.interfaces.get(name)
    }

    pub fn is_record(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// 按插入顺序遍历结构体
    pub fn records(&self) -> impl Iterator<Item = &TypeRecord> + '_ {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    /// 按插入顺序遍历接口
    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceRecord> + '_ {
        self.order.iter().filter_map(|name| self.interfaces.get(name))
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 合并另一个注册表 (按源文件分区提取后使用)
    ///
    /// 任一重名即失败, 失败时 self 保持不变
    pub fn merge(&mut self, other: TypeRegistry) -> Result<()> {
        if let Some(name) = other.order.iter().find(|name| self.contains(name)) {
            return Err(RegistryError::DuplicateType(name.clone()));
        }

        let TypeRegistry {
            mut records,
            mut interfaces,
            order,
        } = other;

        for name in order {
            if let Some(record) = records.remove(&name) {
                self.records.insert(name.clone(), record);
            } else if let Some(interface) = interfaces.remove(&name) {
                self.interfaces.insert(name.clone(), interface);
            }
            self.order.push(name);
        }
        Ok(())
    }
}
