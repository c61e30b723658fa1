use anyhow::Result;
use gemini::{GeminiClient, GeminiConfig};
use image::RgbaImage;

/// 截图理解接口：给定截图与提示词，返回模型的文本回答。
pub trait ScreenClassifier {
    fn classify(&self, image: &RgbaImage, prompt: &str) -> Result<String>;
}

/// 基于 Gemini `generateContent` 的实现。
pub struct GeminiClassifier {
    client: GeminiClient,
}

impl GeminiClassifier {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: GeminiClient::new(config),
        }
    }
}

impl ScreenClassifier for GeminiClassifier {
    fn classify(&self, image: &RgbaImage, prompt: &str) -> Result<String> {
        self.client.describe_image(prompt, image)
    }
}

/// 回答中是否包含关键字（忽略大小写）。
pub fn answer_contains(answer: &str, keyword: &str) -> bool {
    answer.to_uppercase().contains(&keyword.to_uppercase())
}

/// 取回答中出现的第一个非负整数。
pub fn first_number(answer: &str) -> Option<u32> {
    let digits: String = answer
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
