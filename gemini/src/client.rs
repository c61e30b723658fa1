use crate::GeminiResult;
use crate::config::GeminiConfig;
use crate::message::{GenerateRequest, GenerateResponse};
use anyhow::{Context, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Blocking client for single-image prompts against Gemini.
///
/// Holds one `ureq::Agent` so repeated calls reuse the connection pool.
pub struct GeminiClient {
    config: GeminiConfig,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self { config, agent }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send `prompt` together with `image` and return the model's text answer.
    pub fn describe_image(&self, prompt: &str, image: &RgbaImage) -> GeminiResult<String> {
        let png = encode_png(image)?;
        self.generate(prompt, &png)
    }

    /// Send `prompt` with an already PNG-encoded image.
    pub fn generate(&self, prompt: &str, png: &[u8]) -> GeminiResult<String> {
        let request = GenerateRequest::prompt_with_png(prompt, STANDARD.encode(png));
        let body = serde_json::to_string(&request).context("failed to encode request")?;

        tracing::debug!(model = self.config.model(), bytes = png.len(), "gemini request");
        let response = self
            .agent
            .post(&self.config.generate_url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", self.config.api_key())
            .send_string(&body);

        let text = match response {
            Ok(resp) => resp.into_string().context("failed to read response body")?,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                bail!("gemini returned HTTP {code}: {}", detail.trim());
            }
            Err(err) => return Err(anyhow!(err).context("gemini request failed")),
        };

        parse_answer(&text)
    }
}

/// Extract the answer text from a raw `generateContent` response body.
pub fn parse_answer(body: &str) -> GeminiResult<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).context("unexpected response format")?;
    parsed
        .text()
        .ok_or_else(|| anyhow!("empty answer: {}", parsed.empty_reason()))
}

/// PNG-encode a captured frame.
pub fn encode_png(image: &RgbaImage) -> GeminiResult<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("failed to encode screenshot as PNG")?;
    Ok(buf)
}
