//! uml subcommand - class diagram generation

use clap::{Args, Subcommand, ValueEnum};
use extract::discover_sources;
use std::path::PathBuf;
use std::time::Duration;
use uml::{
    build_model, load_units, renderer_for, run_pass, ConfigError, EmbeddingPolicy, ImageStatus,
    RendererKind, SatisfactionMode, UmlConfig, Watcher,
};

#[derive(Subcommand)]
pub enum UmlCommands {
    /// Generate the diagram once
    Generate {
        /// Go file or directory
        path: PathBuf,
        #[command(flatten)]
        opts: DiagramArgs,
        /// Print the model as JSON instead of writing files
        #[arg(long)]
        json: bool,
    },
    /// Regenerate the diagram whenever sources change
    Watch {
        /// Go file or directory
        path: PathBuf,
        #[command(flatten)]
        opts: DiagramArgs,
        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Wait after a change before reading files, in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,
    },
}

#[derive(Args)]
pub struct DiagramArgs {
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output file name without extension
    #[arg(long)]
    name: Option<String>,
    /// Diagram title
    #[arg(long)]
    title: Option<String>,
    /// Image renderer
    #[arg(long, value_enum)]
    renderer: Option<RendererArg>,
    /// Path to plantuml.jar
    #[arg(long)]
    jar: Option<PathBuf>,
    /// PlantUML server base URL
    #[arg(long)]
    server: Option<String>,
    /// How embedded fields are classified
    #[arg(long, value_enum, default_value = "extends")]
    embedding: EmbeddingArg,
    /// Compare full method signatures when matching interfaces
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RendererArg {
    Jar,
    Server,
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbeddingArg {
    /// Embedding is always extends
    Extends,
    /// Embedded pointers are composition
    Composition,
}

pub async fn run(cmd: UmlCommands) -> anyhow::Result<()> {
    match cmd {
        UmlCommands::Generate { path, opts, json } => {
            cmd_generate(build_config(path, opts), json).await
        }
        UmlCommands::Watch {
            path,
            opts,
            interval_ms,
            settle_ms,
        } => {
            let mut config = build_config(path, opts);
            if let Some(ms) = interval_ms {
                config.interval = Duration::from_millis(ms);
            }
            if let Some(ms) = settle_ms {
                config.settle = Duration::from_millis(ms);
            }
            cmd_watch(config).await
        }
    }
}

/// Environment first, then command-line flags
fn build_config(path: PathBuf, opts: DiagramArgs) -> UmlConfig {
    let mut config = UmlConfig::from_env();
    config.source = path;

    if let Some(output) = opts.output {
        config.output_dir = output;
    }
    if let Some(name) = opts.name {
        config.base_name = name;
    }
    config.title = opts.title;
    if let Some(renderer) = opts.renderer {
        config.renderer = match renderer {
            RendererArg::Jar => RendererKind::Jar,
            RendererArg::Server => RendererKind::Server,
            RendererArg::None => RendererKind::None,
        };
    }
    if let Some(jar) = opts.jar {
        config.jar = jar;
    }
    if let Some(server) = opts.server {
        config.server_url = server;
    }
    config.embedding = match opts.embedding {
        EmbeddingArg::Extends => EmbeddingPolicy::Extends,
        EmbeddingArg::Composition => EmbeddingPolicy::CompositionForPointer,
    };
    if opts.strict {
        config.satisfaction = SatisfactionMode::Signature;
    }

    config
}

async fn cmd_generate(config: UmlConfig, json: bool) -> anyhow::Result<()> {
    if json {
        if !config.source.exists() {
            return Err(ConfigError::MissingSource(config.source).into());
        }
        let paths = discover_sources(&config.source)?;
        let units = load_units(&paths).await?;
        let model = build_model(&units, &config.inferencer())?;
        println!("{}", model.to_json()?);
        return Ok(());
    }

    config.validate()?;
    println!("Analyzing: {}", config.source.display());

    let renderer = renderer_for(&config)?;
    let report = run_pass(&config, renderer.as_ref()).await?;

    println!(
        "{} files: {} records, {} interfaces, {} relations",
        report.units, report.records, report.interfaces, report.relations
    );
    println!("PlantUML file: {}", report.puml_path.display());
    match report.image {
        ImageStatus::Rendered(path) => println!("UML diagram: {}", path.display()),
        ImageStatus::Skipped(notice) => println!("Note: {}", notice),
        ImageStatus::Failed(reason) => println!("Image not produced: {}", reason),
    }

    Ok(())
}

async fn cmd_watch(config: UmlConfig) -> anyhow::Result<()> {
    config.validate()?;
    let renderer = renderer_for(&config)?;

    let mut watcher = Watcher::new(config, renderer);
    watcher.run(None).await;

    Ok(())
}
