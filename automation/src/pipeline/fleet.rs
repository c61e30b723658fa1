use super::steps::KeySequence;
use super::{Routine, RoutineStep};
use crate::config::RunConfig;
use crate::input::KeyId;
use anyhow::Result;

pub const FLEET_FIRST_KEYS: &[&str] = &[
    "e", "s", "w", "w", "e", "q", "q", "q", "t", "down", "down", "c",
];

pub const FLEET_SECOND_KEYS: &[&str] = &[
    "w", "w", "e", "e", "s", "q", "q", "q", "w", "t", "down", "down", "w", "q", "q", "q", "w",
    "s", "q", "q", "w", "w", "t", "up", "up", "q", "q", "c",
];

/// 舰队战第一场：固定按键序列，不做任何识别。
pub fn fleet_first(config: &RunConfig) -> Result<Routine> {
    fleet_routine("fleet-first", "舰队战（第一场）", FLEET_FIRST_KEYS, config)
}

/// 舰队战第二场。
pub fn fleet_second(config: &RunConfig) -> Result<Routine> {
    fleet_routine("fleet-second", "舰队战（第二场）", FLEET_SECOND_KEYS, config)
}

fn fleet_routine(
    name: &'static str,
    title: &'static str,
    keys: &[&str],
    config: &RunConfig,
) -> Result<Routine> {
    let keys = KeyId::parse_list(keys)?;
    Ok(Routine::new(name, title).step(
        RoutineStep::new("Key Sequence").then(KeySequence::new(keys, config.fleet_key_delay())),
    ))
}
