//! The executor contract and an in-memory executor for tests.
//!
//! The engine never talks to a remote host itself. It hands a fully merged
//! [`ExecutionRequest`] to a [`RemoteExecutor`], which uploads the payload and
//! runs the command however its transport sees fit.

use std::collections::{BTreeMap, VecDeque};
use std::io::Read;

use async_trait::async_trait;
use runner_plan::MergedOperation;
use runner_types::{
    ConnectionInfo, ContentReader, ExecutorConfig, ResourceSpecification, Transition, Violation,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ExecutorError;

/// Everything an executor needs to perform one transition.
#[derive(Clone, Debug)]
pub struct ExecutionRequest {
    /// Resource instance name.
    pub name: String,
    pub connection: ConnectionInfo,
    pub config: Option<ExecutorConfig>,
    pub operation: MergedOperation,
}

/// One resolved payload file, ready for upload.
#[derive(Debug)]
pub struct PayloadFile<'a> {
    pub filename: &'a str,
    pub mode: u32,
    pub reader: ContentReader<'a>,
}

impl ExecutionRequest {
    pub fn new(name: impl Into<String>, spec: &ResourceSpecification, operation: MergedOperation) -> Self {
        Self {
            name: name.into(),
            connection: spec.connection.clone(),
            config: spec.config.clone(),
            operation,
        }
    }

    pub fn transition(&self) -> Transition {
        self.operation.transition
    }

    pub fn command(&self) -> &str {
        &self.operation.command
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.operation.environment
    }

    /// Resolve every payload entry to a reader, destination filename, and
    /// mode, in upload order.
    ///
    /// Entries are opened lazily; each file handle lives as long as the
    /// yielded [`PayloadFile`].
    pub fn files(&self) -> impl Iterator<Item = Result<PayloadFile<'_>, Violation>> {
        self.operation.payload.iter().map(|entry| {
            let filename = entry.filename.value().ok_or(Violation::MissingFilename)?;
            let mode = entry.mode.ok_or(Violation::MissingMode)?;
            let reader = entry.open_content()?;
            Ok(PayloadFile {
                filename,
                mode,
                reader,
            })
        })
    }
}

/// Transport that runs a merged operation against a remote host.
///
/// `preview` asks the executor to validate without side effects. The
/// reconciler handles its own previews and always passes `false`.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest, preview: bool) -> Result<(), ExecutorError>;
}

/// A payload file as the [`RecordingExecutor`] received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedFile {
    pub filename: String,
    pub mode: u32,
    pub contents: Vec<u8>,
}

/// One call received by the [`RecordingExecutor`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub name: String,
    pub transition: Transition,
    pub command: String,
    pub environment: BTreeMap<String, String>,
    pub files: Vec<RecordedFile>,
    pub preview: bool,
}

/// An executor that reads every payload file into memory and records the call.
///
/// Failures queued with [`fail_next`](Self::fail_next) are returned by
/// subsequent calls in FIFO order; a failing call is still recorded.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<VecDeque<ExecutorError>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ExecutorError) {
        self.failures.lock().await.push_back(error);
    }

    /// Every call received so far, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl RemoteExecutor for RecordingExecutor {
    async fn execute(&self, request: &ExecutionRequest, preview: bool) -> Result<(), ExecutorError> {
        let mut files = Vec::new();
        for file in request.files() {
            let mut file = file?;
            let mut contents = Vec::new();
            file.reader
                .read_to_end(&mut contents)
                .map_err(|e| ExecutorError::Other(format!("reading {}: {e}", file.filename)))?;
            files.push(RecordedFile {
                filename: file.filename.to_string(),
                mode: file.mode,
                contents,
            });
        }

        debug!(
            resource = %request.name,
            transition = %request.transition(),
            files = files.len(),
            preview,
            "recording execution"
        );
        self.calls.lock().await.push(RecordedCall {
            name: request.name.clone(),
            transition: request.transition(),
            command: request.command().to_string(),
            environment: request.environment().clone(),
            files,
            preview,
        });

        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
