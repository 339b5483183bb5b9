//! 单轮生成: 读取 → 解析 → 提取 → 推断 → 生成文本 → 写文件 → 渲染

use crate::config::UmlConfig;
use crate::error::PassError;
use crate::infer::RelationInferencer;
use crate::render::{DiagramRenderer, RenderOutcome};
use extract::{discover_sources, extract_all, GoParser, SourceUnit};
use model::{InterfaceRecord, Relation, TypeRecord, TypeRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, PassError>;

/// 一轮构建出的结构模型
#[derive(Debug, Clone)]
pub struct Model {
    pub registry: TypeRegistry,
    pub relations: Vec<Relation>,
}

#[derive(Serialize)]
struct ModelView<'a> {
    records: Vec<&'a TypeRecord>,
    interfaces: Vec<&'a InterfaceRecord>,
    relations: Vec<&'a Relation>,
}

impl Model {
    /// JSON 形式 (同样排序, 输出稳定)
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut records: Vec<_> = self.registry.records().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        let mut interfaces: Vec<_> = self.registry.interfaces().collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        let mut relations: Vec<_> = self.relations.iter().collect();
        relations.sort();

        serde_json::to_string_pretty(&ModelView {
            records,
            interfaces,
            relations,
        })
    }
}

/// 图片生成状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Rendered(PathBuf),
    Skipped(String),
    /// 渲染失败, .puml 已写出
    Failed(String),
}

/// 单轮结果
#[derive(Debug, Clone)]
pub struct PassReport {
    pub units: usize,
    pub records: usize,
    pub interfaces: usize,
    pub relations: usize,
    pub puml_path: PathBuf,
    pub image: ImageStatus,
}

/// 读取并解析全部源文件, 任一失败即中止
pub async fn load_units(paths: &[PathBuf]) -> Result<Vec<SourceUnit>> {
    let mut parser = GoParser::new()?;
    let mut units = Vec::with_capacity(paths.len());

    for path in paths {
        tracing::debug!("Parsing: {}", path.display());
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PassError::Read {
                path: path.clone(),
                source,
            })?;
        units.push(parser.parse(path.clone(), source)?);
    }

    Ok(units)
}

/// 从空注册表开始构建模型
pub fn build_model(units: &[SourceUnit], inferencer: &RelationInferencer) -> Result<Model> {
    let registry = extract_all(units)?;
    let relations = inferencer.infer(&registry);
    Ok(Model { registry, relations })
}

/// 写出 `<output_dir>/<base_name>.puml`
pub async fn write_notation(notation: &str, output_dir: &Path, base_name: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| PassError::Output {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let path = output_dir.join(format!("{}.puml", base_name));
    tokio::fs::write(&path, notation)
        .await
        .map_err(|source| PassError::Output {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// 生成文本、写文件并交给渲染器; 渲染失败只降级, 不报错
pub async fn publish(
    config: &UmlConfig,
    model: &Model,
    units: usize,
    renderer: &dyn DiagramRenderer,
) -> Result<PassReport> {
    let notation = config.generator().generate(&model.registry, &model.relations);
    let puml_path = write_notation(&notation, &config.output_dir, &config.base_name).await?;
    tracing::info!("PlantUML file written: {}", puml_path.display());

    let image = match renderer.render(&puml_path, &notation).await {
        Ok(RenderOutcome::Rendered(path)) => {
            tracing::info!("UML diagram written: {}", path.display());
            ImageStatus::Rendered(path)
        }
        Ok(RenderOutcome::Skipped(notice)) => {
            tracing::info!("{}", notice);
            ImageStatus::Skipped(notice)
        }
        Err(e) => {
            tracing::warn!("Image not produced ({}): {}", renderer.name(), e);
            ImageStatus::Failed(e.to_string())
        }
    };

    Ok(PassReport {
        units,
        records: model.registry.record_count(),
        interfaces: model.registry.interface_count(),
        relations: model.relations.len(),
        puml_path,
        image,
    })
}

/// 完整的一轮
pub async fn run_pass(config: &UmlConfig, renderer: &dyn DiagramRenderer) -> Result<PassReport> {
    let paths = discover_sources(&config.source)?;
    tracing::info!("Found {} Go files", paths.len());

    let units = load_units(&paths).await?;
    let model = build_model(&units, &config.inferencer())?;
    publish(config, &model, units.len(), renderer).await
}
