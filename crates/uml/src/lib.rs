//! uml - 关系推断与 PlantUML 生成
//!
//! 推断类型关系、生成类图文本、调用外部渲染器, 以及监听源码目录自动重建

mod config;
mod error;
mod infer;
mod pipeline;
mod plantuml;
mod render;
mod watch;

pub use config::{RendererKind, UmlConfig};
pub use error::{ConfigError, PassError, RenderError};
pub use infer::{EmbeddingPolicy, RelationInferencer, SatisfactionMode};
pub use pipeline::{
    build_model, load_units, publish, run_pass, write_notation, ImageStatus, Model, PassReport,
};
pub use plantuml::PlantUmlGenerator;
pub use render::{
    encode_hex, renderer_for, DiagramRenderer, LocalJarRenderer, NoopRenderer, RenderOutcome,
    ServerRenderer,
};
pub use watch::{ChangeSet, Snapshot, TickOutcome, WatchState, Watcher};
