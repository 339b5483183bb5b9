//! 运行配置

use crate::error::ConfigError;
use crate::infer::{EmbeddingPolicy, RelationInferencer, SatisfactionMode};
use crate::plantuml::PlantUmlGenerator;
use std::path::PathBuf;
use std::time::Duration;

/// 渲染器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// 本地 plantuml.jar
    Jar,
    /// PlantUML 服务器
    Server,
    /// 只写 .puml
    None,
}

impl RendererKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "jar" => Some(RendererKind::Jar),
            "server" => Some(RendererKind::Server),
            "none" => Some(RendererKind::None),
            _ => None,
        }
    }
}

/// 配置
///
/// 进程启动时确定, 运行期间不再修改
#[derive(Debug, Clone)]
pub struct UmlConfig {
    /// 监听的源文件或目录
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// 输出文件名 (不含扩展名)
    pub base_name: String,
    pub title: Option<String>,
    /// 轮询间隔
    pub interval: Duration,
    /// 检测到变化后等待文件写完的时间
    pub settle: Duration,
    pub renderer: RendererKind,
    pub java: String,
    pub jar: PathBuf,
    pub server_url: String,
    pub embedding: EmbeddingPolicy,
    pub satisfaction: SatisfactionMode,
}

impl Default for UmlConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            output_dir: PathBuf::from("output"),
            base_name: "uml_diagram".to_string(),
            title: None,
            interval: Duration::from_secs(2),
            settle: Duration::from_millis(300),
            renderer: RendererKind::Jar,
            java: "java".to_string(),
            jar: PathBuf::from("plantuml.jar"),
            server_url: "https://www.plantuml.com/plantuml".to_string(),
            embedding: EmbeddingPolicy::Extends,
            satisfaction: SatisfactionMode::NameOnly,
        }
    }
}

impl UmlConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GOUML_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }

        if let Ok(v) = std::env::var("GOUML_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                config.interval = Duration::from_millis(ms);
            }
        }

        if let Ok(v) = std::env::var("GOUML_SETTLE_MS") {
            if let Ok(ms) = v.parse() {
                config.settle = Duration::from_millis(ms);
            }
        }

        if let Ok(v) = std::env::var("GOUML_RENDERER") {
            if let Some(kind) = RendererKind::parse(&v) {
                config.renderer = kind;
            }
        }

        if let Ok(v) = std::env::var("GOUML_JAVA") {
            config.java = v;
        }

        if let Ok(v) = std::env::var("GOUML_JAR") {
            config.jar = PathBuf::from(v);
        }

        if let Ok(v) = std::env::var("GOUML_SERVER") {
            config.server_url = v;
        }

        config
    }

    /// 启动检查: 源路径必须存在, 输出目录必须可创建
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.exists() {
            return Err(ConfigError::MissingSource(self.source.clone()));
        }
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    pub fn inferencer(&self) -> RelationInferencer {
        RelationInferencer::new()
            .with_embedding_policy(self.embedding)
            .with_satisfaction_mode(self.satisfaction)
    }

    pub fn generator(&self) -> PlantUmlGenerator {
        match &self.title {
            Some(title) => PlantUmlGenerator::new().with_title(title.clone()),
            None => PlantUmlGenerator::new(),
        }
    }

    pub fn puml_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.puml", self.base_name))
    }
}
