use crate::AiError;
use crate::ai::TextModel;
use crate::config::OllamaConfig;
use ollama_rs::{Ollama, generation::completion::request::GenerationRequest, models::ModelOptions};

/// Text model served by a local or remote Ollama instance
#[derive(Clone)]
pub struct OllamaTextModel {
    client: Ollama,
    model: String,
    temperature: f32,
    num_predict: i32,
}

impl OllamaTextModel {
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            client: Ollama::new(config.host.clone(), config.port),
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OllamaTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaTextModel")
            .field("model", &self.model)
            .finish()
    }
}

impl TextModel for OllamaTextModel {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let options = ModelOptions::default()
            .temperature(self.temperature)
            .num_predict(self.num_predict);
        let request =
            GenerationRequest::new(self.model.clone(), prompt.to_string()).options(options);

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| AiError::Model(e.to_string()))?;

        Ok(response.response)
    }
}
