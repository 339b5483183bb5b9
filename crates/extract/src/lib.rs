//! extract - Go 声明提取
//!
//! tree-sitter 解析源文件, 两阶段提取结构体/接口/方法到类型注册表

mod error;
mod extractor;
mod parser;
mod sources;
mod typeref;

pub use error::{ExtractError, Result};
pub use extractor::{attach_methods, declarations, extract_all};
pub use parser::{GoParser, SourceUnit};
pub use sources::{discover_sources, is_go_file};
pub use typeref::{normalize_type, strip_collection, strip_pointer};
