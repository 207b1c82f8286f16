//! Completion backend selection.

use std::io::Write;
use std::sync::Arc;

use moriarty_llm::{
    ChunkSink, Completion, OllamaConfig, OllamaProvider, ProviderError, StubProvider,
};
use moriarty_settings::{ModelSettings, ProviderKind};
use tracing::info;

/// Build the configured backend.
///
/// With `echo`, streamed Ollama chunks are written to stdout as they arrive.
pub fn create_completion(
    model: &ModelSettings,
    echo: bool,
) -> Result<Box<dyn Completion>, ProviderError> {
    match model.provider {
        ProviderKind::Stub => {
            info!("using offline stub provider");
            Ok(Box::new(StubProvider::new()))
        }
        ProviderKind::Ollama => {
            let mut provider = OllamaProvider::new(ollama_config(model))?;
            if echo {
                provider = provider.with_chunk_sink(stdout_sink());
            }
            info!(model = %model.name, base_url = %model.base_url, "using ollama provider");
            Ok(Box::new(provider))
        }
    }
}

/// Whether the backend prints the response itself while streaming.
pub fn streams_to_stdout(model: &ModelSettings) -> bool {
    model.provider == ProviderKind::Ollama
}

fn ollama_config(model: &ModelSettings) -> OllamaConfig {
    OllamaConfig {
        base_url: model.base_url.clone(),
        model: model.name.clone(),
        temperature: model.temperature,
        top_p: model.top_p,
        num_predict: model.num_predict,
        timeout_ms: model.timeout_ms,
    }
}

fn stdout_sink() -> ChunkSink {
    Arc::new(|chunk: &str| {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(chunk.as_bytes());
        let _ = out.flush();
    })
}
