use extract::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

/// 单次重建失败, 只中止当前这一轮
#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PassError {
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, PassError::Extract(ExtractError::Parse { .. }))
    }
}

/// 外部渲染失败: 只影响图片, .puml 已经写出
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer exited with {status}: {output}")]
    ExitStatus { status: String, output: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("render server returned status {0}")]
    Status(u16),
}

/// 启动配置错误, 进程直接退出
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("watched path does not exist: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid render server: {0}")]
    Server(#[from] reqwest::Error),
}
