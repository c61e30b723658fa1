use super::steps::*;
use super::{Routine, RoutineStep};
use crate::config::RunConfig;
use crate::input::KeyId;
use std::time::Duration;

fn key(c: char) -> PressKey {
    PressKey::once(KeyId::Char(c))
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

/// 早间日常：领取任务、（手动购买体力）、模组/舰队/光明面/酒馆扫荡。
pub fn morning_routine(config: &RunConfig) -> Routine {
    Routine::new("morning", "SWGOH 早间日常")
        .with_settle(config.settle())
        .with_recovery(PressKey::escape(
            config.recovery_presses,
            config.recovery_delay(),
        ))
        .step(
            RoutineStep::new("Claim Quests")
                .then(key('c'))
                .then(SleepMs(2000))
                .then(ClickWindowPos::at_ratio(0.25, 0.95))
                .then(SleepMs(1000))
                .then(PressKey::escape(1, secs(0.5)))
                .then(SleepMs(1000)),
        )
        .step(RoutineStep::new("Energy").then(SkipStep("体力已手动购买")))
        .step(
            RoutineStep::new("Mod Battles")
                .then(key('e'))
                .then(SleepMs(2000))
                .then_all(sim_and_back(2, secs(0.5)))
                .then(SleepMs(1000)),
        )
        .step(fleet_battles())
        .step(hard_battles("Light Side Battles", 0.3, 3, secs(1.0)))
        .step(hard_battles("Cantina Battles", 0.7, 3, secs(1.0)))
}

/// 舰队战斗扫荡，早晚流程共用。
pub fn fleet_battles() -> RoutineStep {
    RoutineStep::new("Fleet Battles")
        .then(key('u'))
        .then(SleepMs(1000))
        .then(key('s'))
        .then(SleepMs(2000))
        .then_all(sim_and_back(3, secs(1.0)))
        .then(SleepMs(1000))
}

/// 从战斗入口（`d`）进入，点击 `tab_x` 处的页签后扫荡。
pub fn hard_battles(
    label: &'static str,
    tab_x: f32,
    esc_times: u32,
    esc_delay: Duration,
) -> RoutineStep {
    RoutineStep::new(label)
        .then(key('d'))
        .then(SleepMs(2000))
        .then(ClickWindowPos::at_ratio(tab_x, 0.75))
        .then(SleepMs(2000))
        .then_all(sim_and_back(esc_times, esc_delay))
        .then(SleepMs(1000))
}
