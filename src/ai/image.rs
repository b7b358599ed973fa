use crate::AiError;
use crate::ai::ImageModel;
use crate::config::ImageConfig;
use serde::{Deserialize, Serialize};

/// Client for an OpenAI-style `images/generations` endpoint
#[derive(Debug, Clone)]
pub struct HttpImageModel {
    client: reqwest::Client,
    endpoint: Option<String>,
    model: String,
    size: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

impl ImageDatum {
    fn into_uri(self) -> Option<String> {
        self.b64_json
            .filter(|data| !data.is_empty())
            .map(|data| format!("data:image/png;base64,{}", data))
            .or(self.url.filter(|url| !url.is_empty()))
    }
}

impl HttpImageModel {
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
            api_key: config.api_key(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl ImageModel for HttpImageModel {
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, AiError> {
        let Some(endpoint) = &self.endpoint else {
            return Err(AiError::Unavailable(
                "no image endpoint configured".to_string(),
            ));
        };

        let mut request = self.client.post(endpoint).json(&ImageRequest {
            model: &self.model,
            prompt,
            size: &self.size,
            n: 1,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: ImageResponse = request.send().await?.error_for_status()?.json().await?;

        Ok(response
            .data
            .into_iter()
            .next()
            .and_then(ImageDatum::into_uri))
    }
}
