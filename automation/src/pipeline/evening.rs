use super::morning::{fleet_battles, hard_battles};
use super::steps::*;
use super::{Routine, RoutineStep};
use crate::config::RunConfig;
use crate::input::KeyId;
use std::time::Duration;

/// 晚间流程里单次按键后等待 0.5 秒。
fn key(c: char) -> PressKey {
    PressKey::repeat(KeyId::Char(c), 1, Duration::from_millis(500))
}

/// 领取任务时最多点击的次数。
const MAX_CLAIMS: u32 = 10;

/// 晚间日常：竞技场、领取任务、银河战争、挑战、领取体力、舰队与光明面扫荡。
pub fn evening_routine(config: &RunConfig) -> Routine {
    Routine::new("evening", "SWGOH 晚间日常")
        .with_settle(config.settle())
        .with_recovery(PressKey::escape(
            config.recovery_presses,
            config.recovery_delay(),
        ))
        .step(
            RoutineStep::new("Coliseum")
                .then(key('f'))
                .then(SleepMs(10_000))
                .then(ClickWindowPos::at_ratio(0.9, 0.95))
                .then(SleepMs(1000))
                .then(ClickWindowPos::at_ratio(0.9, 0.95))
                .then(SleepMs(1000))
                .then(SleepMs(10_000))
                .then(key('c'))
                // battle runs on auto
                .then(SleepMs(180_000))
                .then(ClickWindowPos::at_ratio(0.5, 0.7))
                .then(SleepMs(2000))
                .then(ClickWindowPos::at_ratio(0.5, 0.7))
                .then(SleepMs(3000))
                .then(PressKey::escape(1, Duration::from_secs(3))),
        )
        .step(
            RoutineStep::new("Claim Quests")
                .then(key('c'))
                .then(SleepMs(1000))
                .then(
                    AiCheck::count("claim-buttons", CLAIM_COUNT_PROMPT, 5, MAX_CLAIMS)
                        .then(ClickWindowPos::at_ratio(0.9, 0.27))
                        .then(SleepMs(2000)),
                ),
        )
        .step(
            RoutineStep::new("Galactic War")
                .then_all(click_each(&[(0.9, 0.27), (0.1, 0.95), (0.5, 0.95), (0.5, 0.63)]))
                .then(PressKey::escape(3, Duration::from_secs(1))),
        )
        .step(challenges("Challenges", 5, Duration::from_millis(1500)))
        .step(challenges("Fleet Challenge", 4, Duration::from_millis(500)))
        .step(
            RoutineStep::new("Claim Energy")
                .then(key('c'))
                .then(SleepMs(1000))
                .then_all(click_each(&[(0.25, 0.95), (0.9, 0.27), (0.25, 0.45)]))
                .then(PressKey::escape(2, Duration::from_millis(500)))
                .then(SleepMs(1000)),
        )
        .step(fleet_battles())
        .step(hard_battles(
            "Light Side Battles",
            0.3,
            4,
            Duration::from_millis(500),
        ))
}

fn challenges(label: &'static str, esc_times: u32, esc_delay: Duration) -> RoutineStep {
    RoutineStep::new(label)
        .then(key('c'))
        .then(SleepMs(1000))
        .then_all(click_each(&[(0.9, 0.27), (0.9, 0.27), (0.9, 0.15), (0.5, 0.63)]))
        .then(PressKey::escape(esc_times, esc_delay))
}
