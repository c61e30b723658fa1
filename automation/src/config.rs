use crate::window::WindowSelector;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 未显式指定时尝试读取的配置文件。
pub const DEFAULT_CONFIG_FILE: &str = "automation.json";

/// Gemini 凭据所在的环境变量。
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// 一次运行的全部配置，启动时构建一次，之后只读。
///
/// 来源优先级：环境变量 > `automation.json` > 内置默认值。
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// 模板匹配的默认阈值。
    pub confidence_threshold: f64,
    /// 找图失败前的最大尝试次数。
    pub match_attempts: u32,
    pub match_interval_secs: f64,
    /// 匹配前的下采样比例，1.0 表示原始分辨率。
    pub match_scale: f32,
    /// 每次点击后的停顿。
    pub click_delay_secs: f64,
    pub countdown_secs: u64,
    pub fleet_key_delay_secs: f64,
    /// 早/晚流程中每一步结束后的停顿。
    pub settle_secs: f64,
    pub recovery_presses: u32,
    pub recovery_delay_secs: f64,
    pub assets_dir: PathBuf,
    pub window: WindowSelector,
    pub ai_enabled: bool,
    pub gemini_model: String,
    pub ai_attempts: u32,
    pub ai_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            match_attempts: 3,
            match_interval_secs: 1.0,
            match_scale: 1.0,
            click_delay_secs: 0.2,
            countdown_secs: 5,
            fleet_key_delay_secs: 3.0,
            settle_secs: 1.0,
            recovery_presses: 5,
            recovery_delay_secs: 0.3,
            assets_dir: PathBuf::from("assets"),
            window: WindowSelector::default(),
            ai_enabled: true,
            gemini_model: gemini::DEFAULT_MODEL.to_string(),
            ai_attempts: 2,
            ai_timeout_secs: 30,
        }
    }
}

impl RunConfig {
    /// 读取配置文件并叠加进程环境变量。
    ///
    /// `path` 为 `None` 时，若当前目录存在 `automation.json` 则读取，否则使用默认值；
    /// 显式指定的文件不存在则报错。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("读取配置文件失败：{path:?}"))?;
        Self::from_json(&raw).with_context(|| format!("解析配置文件失败：{path:?}"))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 用环境变量覆盖配置项，`lookup` 通常是 `std::env::var`。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = v
                .trim()
                .parse()
                .with_context(|| format!("CONFIDENCE_THRESHOLD 不是数字：{v:?}"))?;
        }
        if let Some(v) = lookup("CLICK_DELAY") {
            self.click_delay_secs = v
                .trim()
                .parse()
                .with_context(|| format!("CLICK_DELAY 不是数字：{v:?}"))?;
        }
        if let Some(v) = lookup("AI_ENABLED") {
            self.ai_enabled = parse_bool(&v)?;
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            let v = v.trim();
            if !v.is_empty() {
                self.gemini_model = v.to_string();
            }
        }
        Ok(())
    }

    /// 返回所有不合法的配置项说明，为空表示配置可用。
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            issues.push(format!(
                "confidence_threshold 必须在 0 到 1 之间，当前为 {}",
                self.confidence_threshold
            ));
        }
        if !(self.match_scale > 0.0 && self.match_scale <= 1.0) {
            issues.push(format!(
                "match_scale 必须在 (0, 1] 之间，当前为 {}",
                self.match_scale
            ));
        }
        for (name, value) in [
            ("match_interval_secs", self.match_interval_secs),
            ("click_delay_secs", self.click_delay_secs),
            ("fleet_key_delay_secs", self.fleet_key_delay_secs),
            ("settle_secs", self.settle_secs),
            ("recovery_delay_secs", self.recovery_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(format!("{name} 不能为负数，当前为 {value}"));
            }
        }
        if self.match_attempts == 0 {
            issues.push("match_attempts 必须大于 0".to_string());
        }
        if self.ai_attempts == 0 {
            issues.push("ai_attempts 必须大于 0".to_string());
        }
        if self.gemini_model.trim().is_empty() {
            issues.push("gemini_model 不能为空".to_string());
        }
        issues
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }

    pub fn match_interval(&self) -> Duration {
        secs(self.match_interval_secs)
    }

    pub fn click_delay(&self) -> Duration {
        secs(self.click_delay_secs)
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    pub fn fleet_key_delay(&self) -> Duration {
        secs(self.fleet_key_delay_secs)
    }

    pub fn settle(&self) -> Duration {
        secs(self.settle_secs)
    }

    pub fn recovery_delay(&self) -> Duration {
        secs(self.recovery_delay_secs)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}

/// 读取 Gemini 凭据；调用前应先用 `dotenvy` 加载 `.env`。
pub fn api_key<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_VAR)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("AI_ENABLED 不是布尔值：{other:?}"),
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
