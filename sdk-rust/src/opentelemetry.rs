use crate::{
    google::{GenerateContentParameters, GenerationKind, ParsedResponse},
    VertexResult,
};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct GenerateSpan {
    span: Span,
    start_time: Instant,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl GenerateSpan {
    pub fn new(model_id: &str, kind: GenerationKind, params: &GenerateContentParameters) -> Self {
        let span = info_span!("vertex.generate", model = model_id, kind = kind.as_str());
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", "gcp.vertex_ai");
        span.set_attribute("gen_ai.request.model", model_id.to_string());
        span.set_attribute("vertex.generation_kind", kind.as_str());

        let config = params.generation_config.as_ref();
        Self {
            span,
            start_time: Instant::now(),
            max_tokens: config.and_then(|c| c.max_output_tokens),
            temperature: config.and_then(|c| c.temperature),
            top_p: config.and_then(|c| c.top_p),
            input_tokens: None,
            output_tokens: None,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, response: &ParsedResponse) {
        if let Some(usage) = response.usage() {
            self.input_tokens = usage.prompt_token_count;
            self.output_tokens = usage.candidates_token_count;
        }
        self.span.set_attribute(
            "vertex.response.chunks",
            i64::try_from(response.chunks().len()).unwrap_or(i64::MAX),
        );
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(input_tokens) = self.input_tokens {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", i64::from(input_tokens));
        }
        if let Some(output_tokens) = self.output_tokens {
            self.span
                .set_attribute("gen_ai.usage.output_tokens", i64::from(output_tokens));
        }
        if let Some(max_tokens) = self.max_tokens {
            self.span
                .set_attribute("gen_ai.request.max_tokens", i64::from(max_tokens));
        }
        if let Some(temperature) = self.temperature {
            self.span
                .set_attribute("gen_ai.request.temperature", temperature);
        }
        if let Some(top_p) = self.top_p {
            self.span.set_attribute("gen_ai.request.top_p", top_p);
        }
        self.span
            .set_attribute("vertex.duration_seconds", self.start_time.elapsed().as_secs_f64());
    }
}

pub async fn trace_generate<F, Fut>(
    model_id: &str,
    kind: GenerationKind,
    params: &GenerateContentParameters,
    f: F,
) -> VertexResult<ParsedResponse>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = VertexResult<ParsedResponse>>,
{
    let mut span = GenerateSpan::new(model_id, kind, params);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(response) => span.on_response(response),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
