use super::Routine;
use crate::config::{API_KEY_VAR, RunConfig};
use anyhow::{Result, bail};

/// 运行前检查：在任何输入或网络调用之前发现配置问题。
///
/// - 选中步骤包含 AI 检查且 AI 已启用时，必须提供凭据。
/// - 没有备用坐标的模板文件缺失视为错误；有备用坐标的只返回警告。
///
/// 返回需要展示给用户的警告。
pub fn preflight(
    routine: &Routine,
    selection: &[usize],
    config: &RunConfig,
    api_key: Option<&str>,
) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if routine.uses_ai(selection) {
        if !config.ai_enabled {
            warnings.push("AI 已在配置中关闭，AI 检查将被跳过".to_string());
        } else if api_key.is_none() {
            bail!("缺少 {API_KEY_VAR}：请在环境变量或 .env 中设置，或将 AI_ENABLED 设为 false");
        }
    }

    let mut missing = Vec::new();
    for (name, has_fallback) in routine.templates(selection) {
        let path = config.template_path(name);
        if path.is_file() {
            continue;
        }
        if has_fallback {
            warnings.push(format!("模板 {path:?} 不存在，将直接使用备用坐标"));
        } else {
            missing.push(format!("{path:?}"));
        }
    }
    if !missing.is_empty() {
        bail!("缺少必需的模板文件：{}", missing.join(", "));
    }

    Ok(warnings)
}
