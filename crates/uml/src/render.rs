//! 外部渲染器 - 把 PlantUML 文本变成 PNG

use crate::config::{RendererKind, UmlConfig};
use crate::error::{ConfigError, RenderError};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

pub type Result<T> = std::result::Result<T, RenderError>;

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// 已生成图片
    Rendered(PathBuf),
    /// 没有可用的渲染器, 只写了 .puml
    Skipped(String),
}

/// 渲染器 trait
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// `puml_path` 是已写出的 .puml 文件, `notation` 是其内容
    async fn render(&self, puml_path: &Path, notation: &str) -> Result<RenderOutcome>;
}

/// 按配置选择渲染器
pub fn renderer_for(
    config: &UmlConfig,
) -> std::result::Result<Box<dyn DiagramRenderer>, ConfigError> {
    let renderer: Box<dyn DiagramRenderer> = match config.renderer {
        RendererKind::Jar => Box::new(LocalJarRenderer::new(&config.java, &config.jar)),
        RendererKind::Server => Box::new(ServerRenderer::new(&config.server_url)?),
        RendererKind::None => Box::new(NoopRenderer),
    };
    tracing::debug!("Using renderer: {}", renderer.name());
    Ok(renderer)
}

/// 本地 plantuml.jar
pub struct LocalJarRenderer {
    java: String,
    jar: PathBuf,
}

impl LocalJarRenderer {
    pub fn new(java: &str, jar: impl AsRef<Path>) -> Self {
        Self {
            java: java.to_string(),
            jar: jar.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DiagramRenderer for LocalJarRenderer {
    fn name(&self) -> &'static str {
        "plantuml.jar"
    }

    async fn render(&self, puml_path: &Path, _notation: &str) -> Result<RenderOutcome> {
        if !self.jar.exists() {
            return Ok(RenderOutcome::Skipped(format!(
                "{} not found, only the .puml file was written; \
                 to produce a PNG run: {} -jar {} {}",
                self.jar.display(),
                self.java,
                self.jar.display(),
                puml_path.display()
            )));
        }

        tracing::debug!(
            "Running {} -jar {} {}",
            self.java,
            self.jar.display(),
            puml_path.display()
        );
        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(&self.jar)
            .arg(puml_path)
            .output()
            .await?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(RenderError::ExitStatus {
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(RenderOutcome::Rendered(puml_path.with_extension("png")))
    }
}

/// PlantUML 服务器: GET {base}/png/~h<hex>
pub struct ServerRenderer {
    client: Client,
    base_url: String,
}

impl ServerRenderer {
    pub fn new(base_url: &str) -> std::result::Result<Self, ConfigError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[doc(hidden)]
    pub fn image_url(&self, notation: &str) -> String {
        format!("{}/png/{}", self.base_url, encode_hex(notation))
    }
}

#[async_trait]
impl DiagramRenderer for ServerRenderer {
    fn name(&self) -> &'static str {
        "plantuml-server"
    }

    async fn render(&self, puml_path: &Path, notation: &str) -> Result<RenderOutcome> {
        let response = self.client.get(self.image_url(notation)).send().await?;

        if !response.status().is_success() {
            return Err(RenderError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        let png_path = puml_path.with_extension("png");
        tokio::fs::write(&png_path, &bytes).await?;
        Ok(RenderOutcome::Rendered(png_path))
    }
}

/// 不渲染
pub struct NoopRenderer;

#[async_trait]
impl DiagramRenderer for NoopRenderer {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn render(&self, _puml_path: &Path, _notation: &str) -> Result<RenderOutcome> {
        Ok(RenderOutcome::Skipped("image rendering disabled".to_string()))
    }
}

/// PlantUML 的十六进制文本编码 (`~h` 前缀)
pub fn encode_hex(text: &str) -> String {
    let mut encoded = String::with_capacity(2 + text.len() * 2);
    encoded.push_str("~h");
    for byte in text.as_bytes() {
        encoded.push_str(&format!("{:02x}", byte));
    }
    encoded
}
