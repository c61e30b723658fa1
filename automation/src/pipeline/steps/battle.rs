//! 多个早/晚流程共用的动作片段：多倍扫荡（Multi-Sim）与体力弹窗检查。
use super::primitive::{Action, AiCheck, ClickWindowPos, MatchAndClick, PressKey, SleepMs};
use crate::input::KeyId;
use crate::pipeline::RatioRect;
use std::time::Duration;

pub const MULTI_SIM_TEMPLATE: &str = "multi_sim.png";
pub const SIM_CONFIRM_TEMPLATE: &str = "sim_confirm.png";

pub const ENERGY_POPUP_PROMPT: &str = "Is there a popup asking if you want to buy more energy or refill energy?
Look for text about \"Buy Energy\" or \"Refill\" or \"Not enough energy\".

Answer: YES or NO";

pub const CLAIM_COUNT_PROMPT: &str = "Look at the right side of this SWGOH quests screen.
Count how many green \"Claim\" buttons are visible on the right side.
These are usually rectangular green buttons with white \"Claim\" text.

Respond with ONLY a single number representing the count.
Example: 5
If no claim buttons are visible, respond with: 0";

/// 点击右下角的 Multi-Sim，再确认弹窗中的 Sim。
///
/// 两个按钮都先找图，找不到时点击固定比例坐标。
pub fn multi_sim() -> Vec<Action> {
    vec![
        MatchAndClick::new(MULTI_SIM_TEMPLATE)
            .in_region(RatioRect::new(0.5, 0.6, 0.5, 0.4))
            .or_click_ratio(0.82, 0.87)
            .into(),
        SleepMs(2000).into(),
        MatchAndClick::new(SIM_CONFIRM_TEMPLATE)
            .in_region(RatioRect::new(0.2, 0.4, 0.6, 0.4))
            .or_click_ratio(0.5, 0.63)
            .into(),
        SleepMs(3000).into(),
    ]
}

/// 出现“购买体力”弹窗时按一次 `esc` 关闭。
pub fn dismiss_energy_popup() -> Action {
    AiCheck::when("energy-popup", ENERGY_POPUP_PROMPT, "YES")
        .then(PressKey::once(KeyId::Escape))
        .then(SleepMs(500))
        .into()
}

/// Multi-Sim + 体力弹窗检查 + 连按 `esc` 返回。
pub fn sim_and_back(esc_times: u32, esc_delay: Duration) -> Vec<Action> {
    let mut actions = multi_sim();
    actions.push(dismiss_energy_popup());
    actions.push(PressKey::escape(esc_times, esc_delay).into());
    actions
}

/// 连续点击若干比例坐标，每次点击后等待 1 秒。
pub fn click_each(points: &[(f32, f32)]) -> Vec<Action> {
    points
        .iter()
        .flat_map(|&(x, y)| {
            [
                Action::from(ClickWindowPos::at_ratio(x, y)),
                Action::from(SleepMs(1000)),
            ]
        })
        .collect()
}
