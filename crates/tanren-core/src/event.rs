//! # Pipeline Events
//!
//! Stages report progress through a [`PipelineObserver`] instead of writing to
//! the console, so embedders decide where progress goes.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::artifact::ArtifactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Train,
    Export,
    Convert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Train => "train",
            Self::Export => "export",
            Self::Convert => "convert",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted {
        stage: Stage,
    },
    ArtifactWritten {
        stage: Stage,
        artifact: ArtifactKind,
        path: PathBuf,
    },
    StageFinished {
        stage: Stage,
        success: bool,
    },
}

/// Receives structured progress events from pipeline stages.
pub trait PipelineObserver: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`. The default observer for every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => info!(%stage, "stage started"),
            PipelineEvent::ArtifactWritten {
                stage,
                artifact,
                path,
            } => info!(%stage, %artifact, path = %path.display(), "artifact written"),
            PipelineEvent::StageFinished {
                stage,
                success: true,
            } => info!(%stage, "stage succeeded"),
            PipelineEvent::StageFinished {
                stage,
                success: false,
            } => warn!(%stage, "stage failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn emit(&self, _event: &PipelineEvent) {}
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drops every recorded event.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Paths of every artifact written so far, in write order.
    pub fn written(&self) -> Vec<(ArtifactKind, PathBuf)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::ArtifactWritten { artifact, path, .. } => Some((artifact, path)),
                _ => None,
            })
            .collect()
    }
}

impl PipelineObserver for RecordingObserver {
    fn emit(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
