//! Shared test doubles: scripted chunks, scripted backends and a counting
//! loader.
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::StreamExt;
use siumai_bridge::backends::Backend;
use siumai_bridge::prelude::*;
use siumai_bridge::registry::BackendLoader;
use siumai_bridge::streaming::BoxedChunk;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// A delta chunk assembled by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChunk {
    pub text: Option<String>,
    pub tools: Vec<ToolCallDelta>,
    pub finish: Option<String>,
    pub usage: Option<Usage>,
    pub raw: Option<serde_json::Value>,
    pub response_id: Option<String>,
}

impl ScriptedChunk {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn tool(delta: ToolCallDelta) -> Self {
        Self::default().with_tool(delta)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_tool(mut self, delta: ToolCallDelta) -> Self {
        self.tools.push(delta);
        self
    }

    pub fn with_finish(mut self, reason: &str) -> Self {
        self.finish = Some(reason.to_string());
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_response_id(mut self, id: &str) -> Self {
        self.response_id = Some(id.to_string());
        self
    }
}

impl DeltaChunk for ScriptedChunk {
    fn delta_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn tool_call_deltas(&self) -> Vec<ToolCallDelta> {
        self.tools.clone()
    }

    fn finish_reason(&self) -> Option<&str> {
        self.finish.as_deref()
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }

    fn raw_payload(&self) -> Option<&serde_json::Value> {
        self.raw.as_ref()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "scripted": true, "text": self.text })
    }

    fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }
}

/// One step of a scripted chunk source.
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(ScriptedChunk),
    Fail(Failure),
}

fn boxed(chunk: ScriptedChunk) -> Result<BoxedChunk, Failure> {
    Ok(Box::new(chunk))
}

pub fn chunk_stream(steps: Vec<Step>) -> ChunkStream {
    let items: Vec<Result<BoxedChunk, Failure>> = steps
        .into_iter()
        .map(|step| match step {
            Step::Chunk(chunk) => boxed(chunk),
            Step::Fail(failure) => Err(failure),
        })
        .collect();
    Box::pin(futures_util::stream::iter(items))
}

pub fn chunks(chunks: Vec<ScriptedChunk>) -> ChunkStream {
    chunk_stream(chunks.into_iter().map(Step::Chunk).collect())
}

pub async fn collect(stream: EventStream) -> Vec<StreamEvent> {
    stream.collect().await
}

pub fn kinds(events: &[StreamEvent]) -> Vec<&'static str> {
    events.iter().map(StreamEvent::kind).collect()
}

pub fn text_deltas(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect()
}

/// `(toolCallId, toolName, input)` of every `tool-call` event.
pub fn tool_calls(events: &[StreamEvent]) -> Vec<(String, String, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ToolCall {
                tool_call_id,
                tool_name,
                input,
            } => Some((tool_call_id.clone(), tool_name.clone(), input.clone())),
            _ => None,
        })
        .collect()
}

/// Split SSE fixture text into one byte chunk per event.
pub fn sse_bytes(text: &str) -> Vec<Result<bytes::Bytes, std::io::Error>> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|event| event.trim_end_matches('\n'))
        .filter(|event| !event.is_empty())
        .map(|event| Ok(bytes::Bytes::from(format!("{event}\n\n"))))
        .collect()
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

/// Backend that replays a fixed script.
pub struct ScriptedBackend {
    pub flavor: ApiFlavor,
    pub steps: Vec<Step>,
    pub generate_result: Result<GenerateResponse, Failure>,
    pub stream_setup_failure: Option<Failure>,
    pub warnings: Vec<Warning>,
    pub abort_seen: Mutex<Option<CancellationToken>>,
}

impl ScriptedBackend {
    pub fn new(flavor: ApiFlavor) -> Self {
        Self {
            flavor,
            steps: Vec::new(),
            generate_result: Ok(GenerateResponse::default()),
            stream_setup_failure: None,
            warnings: Vec::new(),
            abort_seen: Mutex::new(None),
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_chunks(self, chunks: Vec<ScriptedChunk>) -> Self {
        self.with_steps(chunks.into_iter().map(Step::Chunk).collect())
    }

    pub fn with_generate(mut self, result: Result<GenerateResponse, Failure>) -> Self {
        self.generate_result = result;
        self
    }

    pub fn failing_stream_setup(mut self, failure: Failure) -> Self {
        self.stream_setup_failure = Some(failure);
        self
    }

    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    fn endpoint(&self) -> Option<String> {
        Some(format!("https://api.example.invalid/{}", self.flavor))
    }

    fn warnings(&self, _request: &ChatRequest) -> Vec<Warning> {
        self.warnings.clone()
    }

    async fn generate(&self, _request: &ChatRequest) -> Result<GenerateResponse, Failure> {
        self.generate_result.clone()
    }

    async fn stream(
        &self,
        _request: &ChatRequest,
        abort: CancellationToken,
    ) -> Result<ChunkStream, Failure> {
        *self.abort_seen.lock().unwrap() = Some(abort);
        if let Some(failure) = &self.stream_setup_failure {
            return Err(failure.clone());
        }
        Ok(chunk_stream(self.steps.clone()))
    }
}

/// Loader handing out prepared backends and counting constructions.
#[derive(Default)]
pub struct CountingLoader {
    pub backends: HashMap<ApiFlavor, Arc<dyn Backend>>,
    pub builds: AtomicUsize,
    pub failures_left: AtomicUsize,
}

impl CountingLoader {
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backends.insert(backend.flavor(), Arc::new(backend));
        self
    }

    pub fn failing_first(self, times: usize) -> Self {
        self.failures_left.store(times, Ordering::SeqCst);
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendLoader for CountingLoader {
    async fn load(&self, flavor: ApiFlavor) -> Result<Arc<dyn Backend>, Failure> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(NativeError::new("Failed to load backend module: network unreachable").into());
        }
        match self.backends.get(&flavor) {
            Some(backend) => Ok(Arc::clone(backend)),
            None => Ok(Arc::new(ScriptedBackend::new(flavor))),
        }
    }
}

/// Cache over `loader`, keeping a handle on the loader for assertions.
pub fn cache_with(loader: CountingLoader) -> (Arc<CountingLoader>, Arc<BindingCache>) {
    let loader = Arc::new(loader);
    let dyn_loader: Arc<dyn BackendLoader> = loader.clone();
    let cache = BindingCache::with_store(dyn_loader, Arc::new(InMemoryBindingStore::new()));
    (loader, Arc::new(cache))
}
