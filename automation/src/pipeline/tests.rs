use super::testing::*;
use super::*;
use crate::input::KeyId;
use anyhow::Result;
use std::time::Duration;

/// 每一步只按一个可区分的键。
fn lettered_routine() -> Routine {
    Routine::new("letters", "Letters")
        .step(RoutineStep::new("a").then(PressKey::once(KeyId::Char('a'))))
        .step(RoutineStep::new("b").then(PressKey::once(KeyId::Char('b'))))
        .step(RoutineStep::new("c").then(PressKey::once(KeyId::Char('c'))))
}

fn quiet_harness() -> Harness {
    let mut h = Harness::new();
    h.config.countdown_secs = 0;
    h
}

fn write_marker(test: &str, name: &str, size: u32) -> Result<std::path::PathBuf> {
    let dir = assets_dir(test)?;
    marker(size).save(dir.join(name))?;
    Ok(dir)
}

#[test]
fn single_index_runs_exactly_that_step() -> Result<()> {
    let routine = lettered_routine();
    let mut h = quiet_harness();
    let selection = routine.select(&[2])?;
    let report = h.run(|ctx| routine.execute(&selection, ctx))?;

    assert_eq!(h.input.keys(), vec![KeyId::Char('b')]);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].index, 2);
    assert_eq!(report.records[0].outcome, StepOutcome::Succeeded);
    Ok(())
}

#[test]
fn no_index_runs_all_steps_in_order() -> Result<()> {
    let routine = lettered_routine();
    let mut h = quiet_harness();
    let selection = routine.select(&[])?;
    let report = h.run(|ctx| routine.execute(&selection, ctx))?;

    assert_eq!(
        h.input.keys(),
        vec![KeyId::Char('a'), KeyId::Char('b'), KeyId::Char('c')]
    );
    let indices: Vec<_> = report.records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(report.exit_code(), 0);
    Ok(())
}

#[test]
fn several_indices_run_in_given_order() -> Result<()> {
    let routine = lettered_routine();
    let mut h = quiet_harness();
    let selection = routine.select(&[3, 1])?;
    h.run(|ctx| routine.execute(&selection, ctx))?;
    assert_eq!(h.input.keys(), vec![KeyId::Char('c'), KeyId::Char('a')]);
    Ok(())
}

#[test]
fn out_of_range_index_is_rejected() {
    let routine = lettered_routine();
    for bad in [0, 4] {
        assert_eq!(
            routine.select(&[1, bad]),
            Err(SelectionError::OutOfRange {
                index: bad,
                routine: "letters".into(),
                count: 3,
            })
        );
    }
}

#[test]
fn describe_numbers_steps_from_one() {
    let text = lettered_routine().describe();
    assert!(text.contains("1. a"));
    assert!(text.contains("3. c"));
}

#[test]
fn routines_resolve_by_name() -> Result<()> {
    let config = RunConfig::default();
    assert_eq!(resolve_routine("morning", &config)?.steps.len(), 6);
    assert_eq!(resolve_routine("evening", &config)?.steps.len(), 8);
    assert_eq!(resolve_routine("fleet-first", &config)?.steps.len(), 1);
    assert_eq!(resolve_routine("fleet2", &config)?.name, "fleet-second");
    assert!(resolve_routine("weekend", &config).is_err());
    Ok(())
}

#[test]
fn match_and_click_hits_template_centre() -> Result<()> {
    let dir = write_marker("match-centre", "button.png", 12)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    paste(&mut h.screen.frame, &marker(12), (60, 40));

    h.run(|ctx| MatchAndClick::new("button.png").run(ctx))?;

    // centre (66, 46) + window origin (100, 50)
    assert_eq!(h.input.clicks(), vec![(166, 96)]);
    assert_eq!(h.screen.captures, 1);
    Ok(())
}

#[test]
fn match_and_click_converts_retina_capture() -> Result<()> {
    let dir = write_marker("match-retina", "button.png", 12)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    h.screen.frame = blank_frame(320, 240);
    paste(&mut h.screen.frame, &marker(12), (120, 80));

    h.run(|ctx| MatchAndClick::new("button.png").run(ctx))?;

    // physical centre (126, 86) -> logical (63, 43)
    assert_eq!(h.input.clicks(), vec![(163, 93)]);
    Ok(())
}

#[test]
fn downscaled_match_stays_within_tolerance() -> Result<()> {
    let dir = write_marker("match-scaled", "button.png", 16)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    h.config.match_scale = 0.5;
    paste(&mut h.screen.frame, &marker(16), (60, 40));

    h.run(|ctx| {
        MatchAndClick::new("button.png")
            .in_region(RatioRect::new(0.25, 0.25, 0.5, 0.5))
            .run(ctx)
    })?;

    let clicks = h.input.clicks();
    assert_eq!(clicks.len(), 1);
    let (x, y) = clicks[0];
    assert!((x - 168).abs() <= 2 && (y - 98).abs() <= 2, "{x},{y}");
    Ok(())
}

#[test]
fn missing_template_fails_step_and_run_continues() -> Result<()> {
    let dir = write_marker("match-missing", "button.png", 12)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    h.config.settle_secs = 0.0;
    let routine = Routine::new("custom", "Custom")
        .with_recovery(PressKey::escape(5, Duration::from_millis(300)))
        .step(RoutineStep::new("find").then(MatchAndClick::new("button.png")))
        .step(RoutineStep::new("next").then(PressKey::once(KeyId::Char('n'))));

    let selection = routine.select(&[])?;
    let report = h.run(|ctx| routine.execute(&selection, ctx))?;

    assert_eq!(h.screen.captures, 3);
    assert!(h.input.clicks().is_empty());
    // retry pauses between the three attempts
    assert_eq!(
        h.clock.sleeps.iter().filter(|d| **d == Duration::from_secs(1)).count(),
        2
    );
    assert!(matches!(report.records[0].outcome, StepOutcome::Failed(ref r) if r.contains("button.png")));
    assert_eq!(report.records[1].outcome, StepOutcome::Succeeded);

    let mut expected = vec![KeyId::Escape; 5];
    expected.push(KeyId::Char('n'));
    assert_eq!(h.input.keys(), expected);
    Ok(())
}

#[test]
fn fallback_position_is_clicked_when_not_found() -> Result<()> {
    let dir = write_marker("match-fallback", "button.png", 12)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    h.config.match_attempts = 1;
    let routine = Routine::new("custom", "Custom").step(
        RoutineStep::new("find").then(MatchAndClick::new("button.png").or_click_ratio(0.5, 0.5)),
    );

    let report = h.run(|ctx| routine.execute(&[0], ctx))?;

    assert_eq!(h.input.clicks(), vec![(180, 110)]);
    assert_eq!(report.records[0].outcome, StepOutcome::Succeeded);
    assert!(report.records[0].notes.iter().any(|n| n.contains("备用坐标")));
    Ok(())
}

#[test]
fn absent_template_file_is_a_step_failure() -> Result<()> {
    let mut h = quiet_harness();
    h.config.assets_dir = assets_dir("match-absent")?;
    let result = h.run(|ctx| MatchAndClick::new("nope.png").run(ctx));
    assert!(matches!(result, Err(ActionError::Asset(_))));
    assert_eq!(h.screen.captures, 0);
    Ok(())
}

#[test]
fn absent_template_file_with_fallback_clicks_fallback_directly() -> Result<()> {
    let mut h = quiet_harness();
    h.config.assets_dir = assets_dir("match-absent-fallback")?;
    h.run(|ctx| MatchAndClick::new("nope.png").or_click_ratio(0.5, 0.5).run(ctx))?;

    assert_eq!(h.input.clicks(), vec![(180, 110)]);
    assert_eq!(h.screen.captures, 0);
    // no retry pauses
    assert!(h.clock.sleeps.is_empty());
    Ok(())
}

#[test]
fn morning_mod_battles_without_assets_uses_sim_fallbacks() -> Result<()> {
    let mut h = quiet_harness();
    h.config.assets_dir = assets_dir("morning-no-assets")?;
    let routine = resolve_routine("morning", &h.config)?;
    let report = h.run(|ctx| routine.execute(&routine.select(&[3])?, ctx))?;

    use InputEvent::*;
    assert_eq!(
        h.input.events,
        vec![
            Key(KeyId::Char('e')),
            // (0.82, 0.87) then (0.5, 0.63) of the 160x120 window at (100, 50)
            Click(231, 154),
            Click(180, 126),
            Key(KeyId::Escape),
            Key(KeyId::Escape),
        ]
    );
    assert_eq!(report.records[0].outcome, StepOutcome::Succeeded);
    Ok(())
}

#[test]
fn full_routines_without_assets_have_no_failed_steps() -> Result<()> {
    for name in ["morning", "evening"] {
        let mut h = quiet_harness();
        h.config.assets_dir = assets_dir(&format!("{name}-full"))?;
        let routine = resolve_routine(name, &h.config)?;
        let report = h.run(|ctx| routine.execute(&routine.select(&[])?, ctx))?;

        assert_eq!(report.records.len(), routine.steps.len());
        assert_eq!(report.failed(), 0, "{name}: {report}");
        assert_eq!(h.screen.captures, 0, "{name}");
        assert!(h.input.clicks().contains(&(231, 154)), "{name}");
    }
    Ok(())
}

#[test]
fn fleet_first_plays_documented_keys_with_fixed_delay() -> Result<()> {
    let mut h = Harness::new();
    let routine = resolve_routine("fleet-first", &h.config)?;
    let selection = routine.select(&[])?;
    let report = h.run(|ctx| routine.execute(&selection, ctx))?;

    let expected = KeyId::parse_list(&[
        "e", "s", "w", "w", "e", "q", "q", "q", "t", "down", "down", "c",
    ])?;
    assert_eq!(h.input.keys(), expected);
    assert!(h.input.clicks().is_empty());

    // 5 countdown seconds, then 11 gaps between 12 keys
    let mut sleeps = vec![Duration::from_secs(1); 5];
    sleeps.extend(vec![Duration::from_secs(3); 11]);
    assert_eq!(h.clock.sleeps, sleeps);
    assert!(h.screen.activations >= 12);
    assert_eq!(report.records[0].outcome, StepOutcome::Succeeded);
    Ok(())
}

#[test]
fn fleet_second_key_count_and_delay_follow_config() -> Result<()> {
    let mut h = quiet_harness();
    h.config.fleet_key_delay_secs = 6.0;
    let routine = resolve_routine("fleet-second", &h.config)?;
    h.run(|ctx| routine.execute(&[0], ctx))?;

    assert_eq!(h.input.keys().len(), 28);
    assert_eq!(h.input.keys().last(), Some(&KeyId::Char('c')));
    assert_eq!(h.clock.total(), Duration::from_secs(6 * 27));
    Ok(())
}

#[test]
fn cancel_during_countdown_sends_nothing() -> Result<()> {
    let mut h = Harness::new();
    h.clock.cancel_on_sleep = Some(2);
    let routine = resolve_routine("fleet-first", &h.config)?;
    let report = h.run(|ctx| routine.execute(&[0], ctx))?;

    assert!(report.cancelled);
    assert_eq!(report.exit_code(), 130);
    assert!(report.records.is_empty());
    assert!(h.input.events.is_empty());
    assert!(!h.screen.attached);
    Ok(())
}

#[test]
fn cancel_mid_sequence_stops_remaining_keys() -> Result<()> {
    let mut h = quiet_harness();
    h.clock.cancel_on_sleep = Some(3);
    let routine = resolve_routine("fleet-first", &h.config)?;
    let report = h.run(|ctx| routine.execute(&[0], ctx))?;

    assert!(report.cancelled);
    assert_eq!(h.input.keys().len(), 3);
    assert!(report.records[0].outcome.is_failed());
    Ok(())
}

#[test]
fn missing_window_is_fatal_before_any_input() {
    let mut h = quiet_harness();
    h.screen.present = false;
    let routine = lettered_routine();
    let result = h.run(|ctx| routine.execute(&[0, 1, 2], ctx));
    assert!(result.is_err());
    assert!(h.input.events.is_empty());
}

#[test]
fn skip_action_is_reported_as_skipped() -> Result<()> {
    let mut h = quiet_harness();
    let routine = resolve_routine("morning", &h.config)?;
    let report = h.run(|ctx| routine.execute(&routine.select(&[2])?, ctx))?;

    assert!(matches!(report.records[0].outcome, StepOutcome::Skipped(_)));
    assert!(h.input.events.is_empty());
    // settle pause still applies
    assert_eq!(h.clock.sleeps, vec![Duration::from_secs(1)]);
    Ok(())
}

#[test]
fn morning_claim_quests_clicks_ratio_position() -> Result<()> {
    let mut h = quiet_harness();
    let routine = resolve_routine("morning", &h.config)?;
    h.run(|ctx| routine.execute(&[0], ctx))?;

    use InputEvent::*;
    assert_eq!(
        h.input.events,
        vec![Key(KeyId::Char('c')), Click(140, 164), Key(KeyId::Escape)]
    );
    Ok(())
}

#[test]
fn energy_popup_answer_yes_presses_escape() -> Result<()> {
    let mut h = quiet_harness().with_classifier(StubClassifier::answering([Ok("YES")]));
    h.run(|ctx| dismiss_energy_popup().run(ctx))?;
    assert_eq!(h.input.keys(), vec![KeyId::Escape]);

    let mut h = quiet_harness().with_classifier(StubClassifier::answering([Ok("no popup")]));
    h.run(|ctx| dismiss_energy_popup().run(ctx))?;
    assert!(h.input.events.is_empty());
    Ok(())
}

#[test]
fn ai_failure_is_noted_and_step_continues() -> Result<()> {
    let mut h = quiet_harness().with_classifier(StubClassifier::answering([
        Err("quota exceeded"),
        Err("quota exceeded"),
    ]));
    let routine = Routine::new("custom", "Custom").step(
        RoutineStep::new("gate")
            .then(dismiss_energy_popup())
            .then(PressKey::once(KeyId::Char('x'))),
    );
    let report = h.run(|ctx| routine.execute(&[0], ctx))?;

    let calls = h.classifier.as_ref().map(|c| c.calls.get());
    assert_eq!(calls, Some(2));
    assert_eq!(h.input.keys(), vec![KeyId::Char('x')]);
    assert_eq!(report.records[0].outcome, StepOutcome::Succeeded);
    assert!(report.records[0].notes.iter().any(|n| n.contains("quota exceeded")));
    Ok(())
}

#[test]
fn disabled_ai_skips_the_check() -> Result<()> {
    let mut h = quiet_harness().with_classifier(StubClassifier::answering([Ok("YES")]));
    h.config.ai_enabled = false;
    h.run(|ctx| dismiss_energy_popup().run(ctx))?;
    assert!(h.input.events.is_empty());
    assert_eq!(h.classifier.as_ref().map(|c| c.calls.get()), Some(0));
    Ok(())
}

#[test]
fn claim_count_drives_click_repetitions() -> Result<()> {
    let config = RunConfig::default();
    let routine = resolve_routine("evening", &config)?;

    let mut h = quiet_harness().with_classifier(StubClassifier::answering([Ok("3")]));
    h.run(|ctx| routine.execute(&[1], ctx))?;
    assert_eq!(h.input.clicks(), vec![(244, 82); 3]);

    // unparsable answer falls back to five claims
    let mut h = quiet_harness().with_classifier(StubClassifier::answering([Ok("several")]));
    let report = h.run(|ctx| routine.execute(&[1], ctx))?;
    assert_eq!(h.input.clicks().len(), 5);
    assert!(report.records[0].notes.iter().any(|n| n.contains("无法从回答中解析")));
    Ok(())
}

#[test]
fn selected_templates_and_ai_usage() -> Result<()> {
    let config = RunConfig::default();
    let morning = resolve_routine("morning", &config)?;
    assert!(!morning.uses_ai(&[0, 1]));
    assert!(morning.uses_ai(&[2]));
    assert_eq!(
        morning.templates(&morning.select(&[])?),
        vec![(MULTI_SIM_TEMPLATE, true), (SIM_CONFIRM_TEMPLATE, true)]
    );

    let fleet = resolve_routine("fleet-first", &config)?;
    assert!(!fleet.uses_ai(&[0]));
    assert!(fleet.templates(&[0]).is_empty());
    Ok(())
}

#[test]
fn offset_and_threshold_override_apply() -> Result<()> {
    let dir = write_marker("match-offset", "button.png", 12)?;
    let mut h = quiet_harness();
    h.config.assets_dir = dir;
    h.config.match_attempts = 1;
    paste(&mut h.screen.frame, &marker(12), (60, 40));

    let shifted = MatchAndClick {
        offset: (10, -5),
        ..MatchAndClick::new("button.png")
    };
    h.run(|ctx| shifted.run(ctx))?;
    assert_eq!(h.input.clicks(), vec![(176, 91)]);

    // a perfect hit still misses an impossible threshold
    let strict = MatchAndClick {
        threshold: Some(1.01),
        ..MatchAndClick::new("button.png")
    };
    let result = h.run(|ctx| strict.run(ctx));
    assert!(matches!(result, Err(ActionError::NotFound { .. })));
    Ok(())
}
