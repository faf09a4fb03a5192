use crate::{NodeOutput, NodeResult};
use opentelemetry::trace::Status;
use std::{error::Error, future::Future, time::Instant};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct NodeSpan {
    span: Span,
    start_time: Instant,
}

impl NodeSpan {
    pub fn new(node_name: &'static str, category: &'static str) -> Self {
        let span = info_span!("vertex_node.execute", node = node_name);
        span.set_attribute("vertex_node.name", node_name);
        span.set_attribute("vertex_node.category", category);

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_output(&mut self, output: &NodeOutput) {
        self.span.set_attribute(
            "vertex_node.outputs",
            i64::try_from(output.values.len()).unwrap_or(i64::MAX),
        );
    }

    pub fn on_error(&mut self, error: &(dyn Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        self.span.set_attribute(
            "vertex_node.duration_seconds",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

pub async fn trace_execute<F>(
    node_name: &'static str,
    category: &'static str,
    future: F,
) -> NodeResult<NodeOutput>
where
    F: Future<Output = NodeResult<NodeOutput>>,
{
    let mut span = NodeSpan::new(node_name, category);
    let result = future.instrument(span.span()).await;

    match &result {
        Ok(output) => span.on_output(output),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
