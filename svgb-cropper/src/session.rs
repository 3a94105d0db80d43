//! Cropping session state machine
//!
//! Owns the asset queue and the cursor, and drives one protocol step at a
//! time:
//!
//! ```text
//! Idle --start--> Serving --submit_and_advance...--> Done
//!   \                                               ^
//!    `--start (empty directory)---------------------'
//! ```
//!
//! The session is not internally synchronized. Callers hold it behind a
//! single lock and run each `step` to completion before the next one starts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use svgb_common::config::Directories;
use svgb_common::events::{EventBus, SessionEvent};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::naming::{normalize, NamingRules, ProcessingMode};
use crate::scanner::{scan_assets, AssetQueue};
use crate::status::{StatusLine, StatusSink, StatusVerb};
use crate::store::AssetStore;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No asset list loaded yet
    Idle,
    /// Cursor points at an asset waiting to be cropped
    Serving,
    /// Every asset has been processed
    Done,
}

/// Processed content sent back by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub content: Vec<u8>,
}

/// Decoded step request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRequest {
    /// Rescan the input directory and reset the cursor first
    pub start: bool,
    pub submission: Option<Submission>,
}

/// Asset handed to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedAsset {
    pub name: String,
    pub content: Vec<u8>,
    /// 1-based position in the queue
    pub position: usize,
    pub total: usize,
}

/// Final summary once the queue is exhausted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output_directory: PathBuf,
    pub saved: usize,
}

/// Result of a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Serve(ServedAsset),
    Done(Completion),
}

/// Landing page snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub input_directory: String,
    pub output_directory: String,
    pub total: usize,
    /// Number of assets already processed
    pub cursor: usize,
    pub mode: ProcessingMode,
    pub state: SessionState,
}

/// The single cropping session of this process
pub struct CropSession {
    input_dir: PathBuf,
    output_dir: PathBuf,
    mode: ProcessingMode,
    rules: NamingRules,
    store: AssetStore,
    queue: Option<AssetQueue>,
    cursor: usize,
    saved: usize,
    written: HashSet<String>,
    overwritten: usize,
    completion_announced: bool,
    status: Box<dyn StatusSink>,
    events: EventBus,
}

impl CropSession {
    pub fn new(
        dirs: Directories,
        mode: ProcessingMode,
        rules: NamingRules,
        store: AssetStore,
        events: EventBus,
        status: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            input_dir: dirs.input,
            output_dir: dirs.output,
            mode,
            rules,
            store,
            queue: None,
            cursor: 0,
            saved: 0,
            written: HashSet::new(),
            overwritten: 0,
            completion_announced: false,
            status,
            events,
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.queue {
            None => SessionState::Idle,
            Some(queue) if self.cursor < queue.len() => SessionState::Serving,
            Some(_) => SessionState::Done,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Queue length, zero while idle
    pub fn total(&self) -> usize {
        self.queue.as_ref().map_or(0, AssetQueue::len)
    }

    pub fn queue(&self) -> Option<&AssetQueue> {
        self.queue.as_ref()
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of assets written by this process
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Writes in the current pass that replaced an earlier write of that pass
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            input_directory: self.input_dir.display().to_string(),
            output_directory: self.output_dir.display().to_string(),
            total: self.total(),
            cursor: self.cursor,
            mode: self.mode,
            state: self.state(),
        }
    }

    /// Rescan the input directory and reset the cursor
    ///
    /// Not allowed once completion has been reported.
    pub async fn start(&mut self) -> Result<SessionState> {
        if self.completion_announced {
            return Err(Error::InvalidState(
                "session already completed; restart the process for a new pass".to_string(),
            ));
        }

        let queue = scan_assets(&self.input_dir, &self.rules, self.store.timeout()).await?;
        let total = queue.len();

        self.queue = Some(queue);
        self.cursor = 0;
        self.written.clear();
        self.overwritten = 0;
        self.events.emit_lossy(SessionEvent::session_started(total));

        let state = self.state();
        debug!("Session started with {} assets ({:?})", total, state);
        Ok(state)
    }

    /// Persist processed content and move past the current asset
    ///
    /// Returns the normalized filename that was written, or `None` when the
    /// session is already done and the submission is ignored.
    pub async fn submit_and_advance(&mut self, name: &str, content: &[u8]) -> Result<Option<String>> {
        let Some(queue) = &self.queue else {
            return Err(not_started());
        };
        let total = queue.len();
        let Some(current) = queue.get(self.cursor).map(str::to_string) else {
            warn!("Ignoring submission for {} after completion", name);
            return Ok(None);
        };

        if name != current {
            warn!(
                "Submitted name {} differs from current asset {}",
                name, current
            );
        }

        let output_name = normalize(name, self.mode, &self.rules);
        self.store
            .write_asset(&self.output_dir, &output_name, content)
            .await?;

        if !self.written.insert(output_name.clone()) {
            self.overwritten += 1;
            warn!(
                "{} overwrote {} written earlier in this session",
                name, output_name
            );
        }

        let position = self.cursor + 1;
        self.status.report(&StatusLine {
            position,
            total,
            name: current,
            verb: StatusVerb::Saving,
        });
        self.events
            .emit_lossy(SessionEvent::asset_saved(position, total, name, output_name.clone()));

        self.cursor += 1;
        self.saved += 1;
        Ok(Some(output_name))
    }

    /// Serve the asset at the cursor, or report completion
    pub async fn next_asset(&mut self) -> Result<StepOutcome> {
        let Some(queue) = &self.queue else {
            return Err(not_started());
        };
        let total = queue.len();
        let Some(name) = queue.get(self.cursor).map(str::to_string) else {
            return Ok(StepOutcome::Done(self.complete()));
        };

        let content = self.store.read_asset(&self.input_dir, &name).await?;

        let position = self.cursor + 1;
        self.status.report(&StatusLine {
            position,
            total,
            name: name.clone(),
            verb: StatusVerb::Cropping,
        });
        self.events
            .emit_lossy(SessionEvent::asset_served(position, total, name.clone()));

        Ok(StepOutcome::Serve(ServedAsset {
            name,
            content,
            position,
            total,
        }))
    }

    /// One protocol exchange: optional restart, optional submission, next asset
    ///
    /// An idle session is started implicitly.
    pub async fn step(&mut self, request: StepRequest) -> Result<StepOutcome> {
        if request.start || self.state() == SessionState::Idle {
            self.start().await?;
        }

        if let Some(submission) = request.submission {
            self.submit_and_advance(&submission.name, &submission.content)
                .await?;
        }

        self.next_asset().await
    }

    fn complete(&mut self) -> Completion {
        if !self.completion_announced {
            self.completion_announced = true;
            info!(
                "All {} assets processed, {} written to {}",
                self.total(),
                self.saved,
                self.output_dir.display()
            );
            self.events.emit_lossy(SessionEvent::session_completed(
                self.saved,
                self.output_dir.display().to_string(),
            ));
        }

        Completion {
            output_directory: self.output_dir.clone(),
            saved: self.saved,
        }
    }
}

fn not_started() -> Error {
    Error::InvalidState("no asset list loaded; start the session first".to_string())
}
