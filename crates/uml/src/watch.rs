//! 监听源码目录, 有变化时整体重建
//!
//! 单任务顺序执行: 扫描 → 构建 → 渲染, 任何一轮失败都只记录日志, 下一次 tick 继续

use crate::config::UmlConfig;
use crate::pipeline::{build_model, load_units, publish, PassReport};
use crate::render::DiagramRenderer;
use extract::discover_sources;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// 重建状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Scanning,
    Building,
    Rendering,
    /// 报告完失败后回到 Idle
    Error,
}

/// 文件快照: 路径 → 修改时间
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, SystemTime>,
}

/// 两次快照之间的差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

impl Snapshot {
    /// 读取每个文件的修改时间, 读不到的文件跳过 (下一轮会当作删除)
    pub async fn capture(paths: &[PathBuf]) -> Self {
        let mut files = BTreeMap::new();
        for path in paths {
            match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
                Ok(mtime) => {
                    files.insert(path.clone(), mtime);
                }
                Err(e) => tracing::debug!("Skipping {}: {}", path.display(), e),
            }
        }
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 相对 `previous` 的变化; 修改时间不同 (无论新旧) 即视为修改
    pub fn diff(&self, previous: &Snapshot) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (path, mtime) in &self.files {
            match previous.files.get(path) {
                None => changes.added.push(path.clone()),
                Some(old) if old != mtime => changes.modified.push(path.clone()),
                Some(_) => {}
            }
        }

        changes.removed = previous
            .files
            .keys()
            .filter(|path| !self.files.contains_key(*path))
            .cloned()
            .collect();

        changes
    }
}

/// 单次 tick 的结果
#[derive(Debug)]
pub enum TickOutcome {
    Unchanged,
    Rebuilt(PassReport),
    Failed(String),
}

/// 重建循环
pub struct Watcher {
    config: UmlConfig,
    renderer: Box<dyn DiagramRenderer>,
    snapshot: Snapshot,
    state: WatchState,
}

impl Watcher {
    pub fn new(config: UmlConfig, renderer: Box<dyn DiagramRenderer>) -> Self {
        Self {
            config,
            renderer,
            snapshot: Snapshot::default(),
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// 先强制生成一次, 然后按固定间隔轮询
    ///
    /// `max_ticks` 为 None 时一直运行到进程退出
    pub async fn run(&mut self, max_ticks: Option<usize>) {
        tracing::info!(
            "Watching {} (interval {:?}, settle {:?})",
            self.config.source.display(),
            self.config.interval,
            self.config.settle
        );

        self.force().await;

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即返回
        ticker.tick().await;

        let mut ticks = 0;
        loop {
            if max_ticks.map(|max| ticks >= max).unwrap_or(false) {
                break;
            }
            ticker.tick().await;
            self.tick().await;
            ticks += 1;
        }
    }

    /// 不比较快照, 直接重建
    pub async fn force(&mut self) -> TickOutcome {
        self.state = WatchState::Scanning;
        let paths = match discover_sources(&self.config.source) {
            Ok(p) => p,
            Err(e) => return self.fail(e.to_string()),
        };
        self.snapshot = Snapshot::capture(&paths).await;
        self.rebuild(paths).await
    }

    /// 一次轮询: 有变化时等待 settle 后重建
    pub async fn tick(&mut self) -> TickOutcome {
        self.state = WatchState::Scanning;
        let paths = match discover_sources(&self.config.source) {
            Ok(p) => p,
            Err(e) => return self.fail(e.to_string()),
        };

        let current = Snapshot::capture(&paths).await;
        let changes = current.diff(&self.snapshot);
        if changes.is_empty() {
            self.state = WatchState::Idle;
            return TickOutcome::Unchanged;
        }

        tracing::info!(
            "Changes detected ({} added, {} removed, {} modified), regenerating...",
            changes.added.len(),
            changes.removed.len(),
            changes.modified.len()
        );

        // 等待写入完成后重新扫描
        sleep(self.config.settle).await;
        let paths = match discover_sources(&self.config.source) {
            Ok(p) => p,
            Err(e) => return self.fail(e.to_string()),
        };
        self.snapshot = Snapshot::capture(&paths).await;
        self.rebuild(paths).await
    }

    async fn rebuild(&mut self, paths: Vec<PathBuf>) -> TickOutcome {
        self.state = WatchState::Building;
        let units = match load_units(&paths).await {
            Ok(u) => u,
            Err(e) => return self.fail(e.to_string()),
        };
        let model = match build_model(&units, &self.config.inferencer()) {
            Ok(m) => m,
            Err(e) => return self.fail(e.to_string()),
        };
        self.state = WatchState::Rendering;
        let published = publish(&self.config, &model, paths.len(), self.renderer.as_ref()).await;
        let outcome = match published {
            Ok(report) => {
                tracing::info!(
                    "Regenerated: {} records, {} interfaces, {} relations",
                    report.records,
                    report.interfaces,
                    report.relations
                );
                TickOutcome::Rebuilt(report)
            }
            Err(e) => return self.fail(e.to_string()),
        };

        self.state = WatchState::Idle;
        outcome
    }

    fn fail(&mut self, message: String) -> TickOutcome {
        self.state = WatchState::Error;
        tracing::error!("Failed to generate UML diagram: {}", message);
        self.state = WatchState::Idle;
        TickOutcome::Failed(message)
    }
}
