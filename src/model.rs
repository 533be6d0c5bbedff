//! Chat model facade
//!
//! [`BridgeChatModel`] is what callers hold: it resolves the backend binding
//! for the requested flavor, runs the call and hands back unified results.
//! Failures are classified exactly once, here.

use crate::backends::Backend;
use crate::config::{GenerateOptions, ProviderSettings, StreamOptions};
use crate::error::{ProviderError, RequestContext, classify};
use crate::registry::BindingCache;
use crate::streaming::{AccumulateOptions, EventStream, accumulate_stream};
use crate::types::{
    ApiFlavor, ChatRequest, ContentPart, FinishReason, GenerateResult, ProviderMetadata,
    ResponseInfo,
};
use crate::utils::cancel::abortable;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BridgeChatModel {
    model_id: String,
    settings: ProviderSettings,
    bindings: Arc<BindingCache>,
}

impl BridgeChatModel {
    pub fn new(
        model_id: impl Into<String>,
        settings: ProviderSettings,
        bindings: Arc<BindingCache>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            settings,
            bindings,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Provider name, also the provider-metadata key.
    pub fn provider(&self) -> &str {
        &self.settings.provider_name
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Non-streaming call.
    pub async fn do_generate(
        &self,
        request: &ChatRequest,
        options: GenerateOptions,
    ) -> Result<GenerateResult, ProviderError> {
        let api = options.api.unwrap_or(self.settings.api);
        let backend = self.bindings.resolve(api).await?;
        let context = self.request_context(backend.as_ref(), request, None);
        let warnings = backend.warnings(request);

        let response = backend
            .generate(request)
            .await
            .map_err(|failure| classify(failure, Some(&context)))?;

        let mut content = Vec::new();
        if let Some(text) = response.text.filter(|t| !t.is_empty()) {
            content.push(ContentPart::Text { text });
        }
        for call in response.tool_calls {
            content.push(ContentPart::ToolCall {
                tool_call_id: call
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                tool_name: call.name,
                input: call.arguments,
            });
        }

        let finish_reason = FinishReason::from_raw(response.raw_finish_reason.as_deref());
        tracing::debug!(
            model = %self.model_id,
            %api,
            parts = content.len(),
            finish_reason = finish_reason.unified.as_str(),
            "generate completed"
        );

        Ok(GenerateResult {
            content,
            finish_reason,
            usage: response.usage.unwrap_or_default(),
            warnings,
            provider_metadata: Some(self.provider_metadata(api)),
            response: ResponseInfo {
                headers: response.headers,
                body: response.raw_envelope,
            },
        })
    }

    /// Streaming call.
    ///
    /// Fails only if the call cannot be set up. Once chunks flow, a failure
    /// arrives as the terminal `error` event of the returned stream.
    pub async fn do_stream(
        &self,
        request: &ChatRequest,
        options: StreamOptions,
    ) -> Result<EventStream, ProviderError> {
        let api = options.api.unwrap_or(self.settings.api);
        let backend = self.bindings.resolve(api).await?;
        let context = self.request_context(backend.as_ref(), request, options.request_body);
        let warnings = backend.warnings(request);
        let abort = options.abort.unwrap_or_default();

        let source = backend
            .stream(request, abort.clone())
            .await
            .map_err(|failure| classify(failure, Some(&context)))?;

        tracing::debug!(model = %self.model_id, %api, "stream started");
        Ok(accumulate_stream(
            abortable(source, abort),
            AccumulateOptions {
                include_raw_chunks: options
                    .include_raw_chunks
                    .unwrap_or(self.settings.include_raw_chunks),
                warnings,
                provider_metadata: Some(self.provider_metadata(api)),
                context: Some(context),
            },
        ))
    }

    fn request_context(
        &self,
        backend: &dyn Backend,
        request: &ChatRequest,
        request_body: Option<String>,
    ) -> RequestContext {
        let mut context = RequestContext::new();
        if let Some(url) = backend.endpoint() {
            context = context.with_url(url);
        }
        if let Some(body) = request_body.or_else(|| serde_json::to_string(request).ok()) {
            context = context.with_request_body(body);
        }
        context
    }

    fn provider_metadata(&self, api: ApiFlavor) -> ProviderMetadata {
        let mut metadata = ProviderMetadata::new();
        metadata.insert(
            self.settings.provider_name.clone(),
            json!({ "api": api.as_str(), "modelId": self.model_id }),
        );
        metadata
    }
}
