//! The round state machine.
//!
//! Driven by the frame loop: `tick(&mut state, &input, dt)` once per frame.
//! Deferred transitions (target rise, flight resolution, round-end pacing,
//! post-miss re-aim) are countdowns stored on the state and reset on every
//! phase change - a timer belonging to a dead phase no longer exists, so it
//! cannot fire late against the wrong state.

use crate::consts::*;
use crate::landing_pan;
use crate::tuning::SweepTuning;

use super::ballistics::simulate;
use super::difficulty;
use super::state::{GameEvent, GamePhase, GameState, Shot};
use super::sweep::SweepOsc;

/// One frame of player input. `primary` is the single context-dependent
/// action (start / lock / restart) and must be cleared by the caller after
/// the tick that consumed it.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub primary: bool,
}

/// Advance the game by `dt` seconds.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Idle => {
            if input.primary {
                begin_round(state);
            }
        }
        GamePhase::TargetRising => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 {
                state.emit(GameEvent::TargetLocated(state.target));
                state.ping_timer = PING_INTERVAL_SECS;
                enter_angle_phase(state);
            }
        }
        GamePhase::SettingAngle => {
            // Lock before advancing: a press with no elapsed sweep time
            // captures the midpoint, not the first ramp sample.
            if input.primary {
                lock_angle(state);
                return;
            }
            if state.aim_delay > 0.0 {
                state.aim_delay -= dt;
                if state.aim_delay <= 0.0 {
                    state.ping_timer = PING_INTERVAL_SECS;
                    enter_angle_phase(state);
                }
            } else {
                tick_pings(state, dt);
                advance_angle_sweep(state, dt);
            }
        }
        GamePhase::SettingPower => {
            if input.primary {
                lock_power_and_fire(state);
                return;
            }
            tick_pings(state, dt);
            advance_power_sweep(state, dt);
        }
        GamePhase::Flight => {
            tick_pings(state, dt);
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 {
                resolve_shot(state);
            }
        }
        GamePhase::RoundEnd => {
            state.phase_timer -= dt;
            if !state.round_announced && state.phase_timer <= ROUND_ANNOUNCE_SECS {
                state.round_announced = true;
                let msg = format!("Round {}, {} points.", state.round, state.score);
                state.emit(GameEvent::Announce(msg));
            }
            if state.phase_timer <= 0.0 {
                begin_round(state);
            }
        }
        GamePhase::GameOver => {
            if input.primary {
                restart(state);
            }
        }
    }
}

fn scaled(tuning: SweepTuning, scale: f32) -> SweepTuning {
    SweepTuning {
        sweep_secs: tuning.sweep_secs * scale,
        pause_secs: tuning.pause_secs,
    }
}

fn begin_round(state: &mut GameState) {
    state.arrows_left = MAX_ARROWS;
    state.current_shot = Shot::default();
    stop_sweeps(state);

    state.target = difficulty::place_target(state.round, &state.tuning.difficulty, &mut state.rng);
    state.phase = GamePhase::TargetRising;
    state.phase_timer = state.tuning.rise.total_secs();

    state.emit(GameEvent::StateLabel("Target rising…".into()));
    let msg = format!("Round {}, {} points.", state.round, state.score);
    state.emit(GameEvent::Announce(msg));
    state.emit(GameEvent::TargetRise(state.target));
}

fn enter_angle_phase(state: &mut GameState) {
    state.phase = GamePhase::SettingAngle;
    state.aim_delay = 0.0;
    state.emit(GameEvent::StateLabel("Set angle.".into()));
    state.emit(GameEvent::Announce("Angle.".into()));

    let tuning = scaled(state.tuning.angle_sweep, state.sweep_scale);
    state.angle_sweep = Some(SweepOsc::new(
        tuning,
        Some(ANGLE_STEPS),
        state.last_shot.angle_norm,
    ));
}

fn advance_angle_sweep(state: &mut GameState, dt: f32) {
    let Some(sweep) = state.angle_sweep.as_mut() else {
        return;
    };
    let frame = sweep.advance(dt);
    if let Some(value) = frame.value {
        state.current_shot.angle_norm = Some(value);
    }
    if let Some(step) = frame.new_step {
        state.emit(GameEvent::AngleStep(step));
    }
    if frame.echo {
        state.emit(GameEvent::LastShotPing { pan: -0.4 });
    }
}

fn advance_power_sweep(state: &mut GameState, dt: f32) {
    let Some(sweep) = state.power_sweep.as_mut() else {
        return;
    };
    let frame = sweep.advance(dt);
    if let Some(value) = frame.value {
        state.current_shot.power_norm = Some(value);
    }
    if frame.echo {
        state.emit(GameEvent::LastShotPing { pan: 0.6 });
    }
}

fn lock_angle(state: &mut GameState) {
    state.angle_sweep = None;
    state.current_shot.angle_norm.get_or_insert(0.5);

    state.emit(GameEvent::Confirm);
    state.phase = GamePhase::SettingPower;
    state.emit(GameEvent::StateLabel("Set power.".into()));
    state.emit(GameEvent::Announce("Power.".into()));

    let tuning = scaled(state.tuning.power_sweep, state.sweep_scale);
    state.power_sweep = Some(SweepOsc::new(tuning, None, state.last_shot.power_norm));
    state.emit(GameEvent::PowerToneStarted);
}

fn lock_power_and_fire(state: &mut GameState) {
    state.power_sweep = None;
    state.emit(GameEvent::PowerToneStopped);
    if state.arrows_left == 0 {
        return;
    }

    state.emit(GameEvent::Confirm);
    state.current_shot.power_norm.get_or_insert(0.5);

    state.arrows_at_fire = state.arrows_left;
    state.arrows_left -= 1;

    state.phase = GamePhase::Flight;
    state.phase_timer = state.tuning.flight.audible_secs + RESOLVE_PAD_SECS;
    state.emit(GameEvent::StateLabel("Arrow in flight…".into()));
    state.emit(GameEvent::ArrowFired {
        angle_norm: state.current_shot.angle_norm.unwrap_or(0.5),
        power_norm: state.current_shot.power_norm.unwrap_or(0.5),
    });
}

fn resolve_shot(state: &mut GameState) {
    let angle = state.current_shot.angle_norm.unwrap_or(0.5);
    let power = state.current_shot.power_norm.unwrap_or(0.5);
    let traj = simulate(angle, power, &state.tuning.ballistics);

    let tolerances = difficulty::hit_thresholds(state.round, &state.tuning.difficulty);
    let dx = (traj.range_norm - state.target.distance_norm).abs();
    let dy = (traj.height_norm - state.target.height_norm).abs();
    let hit = dx <= tolerances.distance && dy <= tolerances.height;

    state.last_shot = state.current_shot;

    if hit {
        on_hit(state);
    } else {
        on_miss(state, traj.height_norm, landing_pan(traj.range_norm));
    }
}

fn on_hit(state: &mut GameState) {
    let gained = 100 + 100 * state.arrows_at_fire;
    state.score += gained;

    state.emit(GameEvent::TargetHit(state.target));
    state.emit(GameEvent::StateLabel(format!("Hit! +{gained} points.")));
    state.emit(GameEvent::Announce(format!(
        "Hit! You earned {gained} points."
    )));

    state.round += 1;
    state.phase = GamePhase::RoundEnd;
    state.phase_timer = ROUND_END_PAUSE_SECS + ROUND_ANNOUNCE_SECS;
    state.round_announced = false;
}

fn on_miss(state: &mut GameState, shot_height: f32, pan: f32) {
    let arrows = state.arrows_left;
    let noun = if arrows == 1 { "arrow" } else { "arrows" };

    // Classified by simulated height against the target, not by which
    // hit-test axis failed - a wide-but-level shot still reads as
    // "too high". Kept as designed; see the sub-classification test.
    if shot_height < state.target.height_norm {
        state.emit(GameEvent::MissedLow { pan });
        state.emit(GameEvent::Announce(format!(
            "Too low, {arrows} {noun} left."
        )));
    } else {
        state.emit(GameEvent::MissedHigh);
        state.emit(GameEvent::Announce(format!(
            "Too high, {arrows} {noun} left."
        )));
    }

    if arrows > 0 {
        state.phase = GamePhase::SettingAngle;
        state.emit(GameEvent::StateLabel(format!("Missed. {arrows} left.")));
        state.aim_delay = REAIM_DELAY_SECS;
        state.angle_sweep = None;
    } else {
        game_over(state);
    }
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    stop_sweeps(state);
    state.last_shot = Shot::default();

    let score = state.score;
    state.emit(GameEvent::StateLabel(format!(
        "Game Over, Final Score: {score}."
    )));
    state.emit(GameEvent::Announce(format!(
        "Game over. Final Score: {score}."
    )));

    if score > 0 {
        state.emit(GameEvent::SubmitScore(score));
    }
}

fn restart(state: &mut GameState) {
    state.round = 1;
    state.score = 0;
    state.current_shot = Shot::default();
    state.phase = GamePhase::Idle;
    state.emit(GameEvent::StateLabel(
        "Ready? Press Space or the Start Game button.".into(),
    ));
}

/// Forcibly drop both sweeps, releasing the pad tone if it was live.
/// Idempotent; sweeps never survive a phase exit.
fn stop_sweeps(state: &mut GameState) {
    state.angle_sweep = None;
    if state.power_sweep.take().is_some() {
        state.emit(GameEvent::PowerToneStopped);
    }
}

fn tick_pings(state: &mut GameState, dt: f32) {
    state.ping_timer -= dt;
    if state.ping_timer <= 0.0 {
        state.ping_timer += PING_INTERVAL_SECS;
        state.emit(GameEvent::TargetPing(state.target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Target;

    const DT: f32 = 1.0 / 60.0;

    fn advance(state: &mut GameState, secs: f32) {
        let input = TickInput::default();
        let mut remaining = secs;
        while remaining > 0.0 {
            tick(state, &input, DT);
            remaining -= DT;
        }
    }

    /// Tick until the given phase is entered, stopping on the transition
    /// tick itself so no time elapses inside the new phase.
    fn advance_until(state: &mut GameState, phase: GamePhase) {
        let input = TickInput::default();
        for _ in 0..10_000 {
            if state.phase == phase {
                return;
            }
            tick(state, &input, DT);
        }
        panic!("never reached {phase:?}");
    }

    fn press(state: &mut GameState) {
        tick(state, &TickInput { primary: true }, DT);
    }

    /// Drive from Idle to the first aim phase, with the angle sweep not
    /// yet ticked.
    fn start_aiming(state: &mut GameState) {
        press(state);
        assert_eq!(state.phase, GamePhase::TargetRising);
        advance_until(state, GamePhase::SettingAngle);
    }

    /// Lock both sweeps immediately (midpoint shot) and fly it out.
    fn fire_midpoint_shot(state: &mut GameState) {
        press(state); // lock angle
        assert_eq!(state.phase, GamePhase::SettingPower);
        press(state); // lock power and fire
        assert_eq!(state.phase, GamePhase::Flight);
        advance(state, 2.0);
    }

    /// Target the default midpoint shot cannot miss in round 1.
    fn easy_target() -> Target {
        Target {
            distance_norm: 0.42,
            height_norm: 0.41,
        }
    }

    /// Target far enough out that a midpoint shot always misses.
    fn unreachable_target() -> Target {
        Target {
            distance_norm: 1.0,
            height_norm: 1.0,
        }
    }

    fn count_submits(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::SubmitScore(_)))
            .count()
    }

    #[test]
    fn test_start_runs_rise_then_aim() {
        let mut state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Idle);

        press(&mut state);
        assert_eq!(state.phase, GamePhase::TargetRising);
        assert_eq!(state.arrows_left, 5);

        let events = state.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::TargetRise(_))));
        assert!(events.contains(&GameEvent::Announce("Round 1, 0 points.".into())));

        advance(&mut state, 1.2);
        assert_eq!(state.phase, GamePhase::SettingAngle);
        let events = state.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::TargetLocated(_)))
        );
        assert!(events.contains(&GameEvent::Announce("Angle.".into())));
    }

    #[test]
    fn test_angle_sweep_writes_shot_and_steps() {
        let mut state = GameState::new(2);
        start_aiming(&mut state);
        state.take_events();

        advance(&mut state, 0.5);
        assert!(state.current_shot.angle_norm.is_some());
        let events = state.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::AngleStep(_))));
    }

    #[test]
    fn test_instant_locks_default_to_midpoint() {
        let mut state = GameState::new(3);
        start_aiming(&mut state);

        // Lock both without a single sweep tick in between
        press(&mut state);
        press(&mut state);
        assert_eq!(state.phase, GamePhase::Flight);
        assert_eq!(state.current_shot.angle_norm, Some(0.5));
        assert_eq!(state.current_shot.power_norm, Some(0.5));
    }

    #[test]
    fn test_lock_order_and_sweep_lifecycle() {
        let mut state = GameState::new(4);
        start_aiming(&mut state);
        assert!(state.angle_sweep.is_some());
        assert!(state.power_sweep.is_none());

        press(&mut state);
        assert_eq!(state.phase, GamePhase::SettingPower);
        assert!(state.angle_sweep.is_none());
        assert!(state.power_sweep.is_some());

        let events = state.take_events();
        assert!(events.contains(&GameEvent::PowerToneStarted));

        press(&mut state);
        assert!(state.power_sweep.is_none());
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PowerToneStopped));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::ArrowFired { .. }))
        );
    }

    #[test]
    fn test_firing_spends_exactly_one_arrow() {
        let mut state = GameState::new(5);
        start_aiming(&mut state);
        assert_eq!(state.arrows_left, 5);

        press(&mut state);
        assert_eq!(state.arrows_left, 5); // locking the angle is free
        press(&mut state);
        assert_eq!(state.arrows_left, 4);

        // Flight ticks don't spend arrows
        advance(&mut state, 0.5);
        assert_eq!(state.arrows_left, 4);
    }

    #[test]
    fn test_hit_scores_and_advances_round() {
        let mut state = GameState::new(6);
        start_aiming(&mut state);
        state.target = easy_target();
        state.take_events();

        fire_midpoint_shot(&mut state);
        assert_eq!(state.phase, GamePhase::RoundEnd);
        // 100 base + 100 per arrow held when the shot left the bow
        assert_eq!(state.score, 600);
        assert_eq!(state.round, 2);

        let events = state.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::TargetHit(_))));
        assert!(events.contains(&GameEvent::Announce("Hit! You earned 600 points.".into())));
    }

    #[test]
    fn test_round_end_announces_then_rises_again() {
        let mut state = GameState::new(7);
        start_aiming(&mut state);
        state.target = easy_target();
        fire_midpoint_shot(&mut state);
        state.take_events();

        // 1s pause, then the round announcement
        advance(&mut state, 1.1);
        assert_eq!(state.phase, GamePhase::RoundEnd);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Announce("Round 2, 600 points.".into())));

        // announcement window passes, next round begins with fresh arrows
        advance(&mut state, 2.1);
        assert_eq!(state.phase, GamePhase::TargetRising);
        assert_eq!(state.arrows_left, 5);
        assert!(state.current_shot.angle_norm.is_none());
    }

    #[test]
    fn test_miss_too_low_reaims_after_delay() {
        let mut state = GameState::new(8);
        start_aiming(&mut state);
        state.target = Target {
            distance_norm: 1.0,
            height_norm: 0.9,
        };
        state.take_events();

        fire_midpoint_shot(&mut state);
        assert_eq!(state.phase, GamePhase::SettingAngle);
        assert_eq!(state.arrows_left, 4);
        assert_eq!(state.round, 1);

        let events = state.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::MissedLow { .. }))
        );
        assert!(events.contains(&GameEvent::Announce("Too low, 4 arrows left.".into())));

        // Sweep is held back until the re-aim delay passes
        assert!(state.angle_sweep.is_none());
        advance(&mut state, REAIM_DELAY_SECS + 0.1);
        assert!(state.angle_sweep.is_some());
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Announce("Angle.".into())));
    }

    #[test]
    fn test_miss_high_classification() {
        let mut state = GameState::new(9);
        start_aiming(&mut state);
        // Level with the shot's height but far out of distance tolerance:
        // the height comparison, not the failed axis, picks the voice.
        state.target = Target {
            distance_norm: 1.0,
            height_norm: 0.2,
        };
        state.take_events();

        fire_midpoint_shot(&mut state);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::MissedHigh));
        assert!(events.contains(&GameEvent::Announce("Too high, 4 arrows left.".into())));
    }

    #[test]
    fn test_last_arrow_miss_announces_singular() {
        let mut state = GameState::new(10);
        start_aiming(&mut state);
        state.target = unreachable_target();

        for _ in 0..3 {
            fire_midpoint_shot(&mut state);
            advance(&mut state, REAIM_DELAY_SECS + 0.1);
            state.take_events();
        }
        assert_eq!(state.arrows_left, 2);

        // Fourth miss leaves one arrow: the announcement drops the plural
        fire_midpoint_shot(&mut state);
        assert_eq!(state.arrows_left, 1);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Announce("Too low, 1 arrow left.".into())));

        advance(&mut state, REAIM_DELAY_SECS + 0.1);
        fire_midpoint_shot(&mut state);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Announce("Game over. Final Score: 0.".into())));
    }

    #[test]
    fn test_game_over_after_five_misses() {
        let mut state = GameState::new(11);
        start_aiming(&mut state);
        state.target = unreachable_target();
        let mut all_events = state.take_events();

        for shot in 0..5 {
            fire_midpoint_shot(&mut state);
            all_events.append(&mut state.take_events());
            if shot < 4 {
                assert_eq!(state.phase, GamePhase::SettingAngle);
                advance(&mut state, REAIM_DELAY_SECS + 0.1);
                all_events.append(&mut state.take_events());
            }
        }

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.arrows_left, 0);
        // Zero score: no leaderboard hand-off
        assert_eq!(count_submits(&all_events), 0);
        // Last shot memory is cleared for the next run
        assert_eq!(state.last_shot, Shot::default());
    }

    #[test]
    fn test_score_submitted_exactly_once() {
        let mut state = GameState::new(12);
        start_aiming(&mut state);
        state.target = easy_target();
        fire_midpoint_shot(&mut state);
        assert_eq!(state.score, 600);

        // Round 2: burn all five arrows on an unreachable target
        advance_until(&mut state, GamePhase::TargetRising);
        advance_until(&mut state, GamePhase::SettingAngle);
        state.target = unreachable_target();
        let mut all_events = state.take_events();

        for shot in 0..5 {
            fire_midpoint_shot(&mut state);
            all_events.append(&mut state.take_events());
            if shot < 4 {
                advance(&mut state, REAIM_DELAY_SECS + 0.1);
                all_events.append(&mut state.take_events());
            }
        }

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(count_submits(&all_events), 1);
        assert!(all_events.contains(&GameEvent::SubmitScore(600)));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(13);
        start_aiming(&mut state);
        state.target = easy_target();
        fire_midpoint_shot(&mut state);
        let score_after_hit = state.score;
        assert!(score_after_hit > 0);

        // Lose the next round
        advance_until(&mut state, GamePhase::TargetRising);
        advance_until(&mut state, GamePhase::SettingAngle);
        state.target = unreachable_target();
        for shot in 0..5 {
            fire_midpoint_shot(&mut state);
            if shot < 4 {
                advance(&mut state, REAIM_DELAY_SECS + 0.1);
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        state.take_events();

        press(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.round, 1);
        assert_eq!(state.score, 0);
        let events = state.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::StateLabel(_)))
        );

        // And a new run starts cleanly
        press(&mut state);
        assert_eq!(state.phase, GamePhase::TargetRising);
        assert_eq!(state.arrows_left, 5);
    }

    #[test]
    fn test_primary_ignored_mid_flight_and_round_end() {
        let mut state = GameState::new(14);
        start_aiming(&mut state);
        state.target = easy_target();
        press(&mut state);
        press(&mut state);
        assert_eq!(state.phase, GamePhase::Flight);
        let arrows = state.arrows_left;

        press(&mut state);
        assert_eq!(state.phase, GamePhase::Flight);
        assert_eq!(state.arrows_left, arrows);

        advance(&mut state, 2.0);
        assert_eq!(state.phase, GamePhase::RoundEnd);
        press(&mut state);
        assert_eq!(state.phase, GamePhase::RoundEnd);
    }

    #[test]
    fn test_locator_pings_repeat_while_aiming() {
        let mut state = GameState::new(15);
        start_aiming(&mut state);
        state.take_events();

        advance(&mut state, PING_INTERVAL_SECS + 0.1);
        let events = state.take_events();
        let pings = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TargetPing(_)))
            .count();
        assert_eq!(pings, 1);

        advance(&mut state, 2.0 * PING_INTERVAL_SECS);
        let events = state.take_events();
        let pings = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TargetPing(_)))
            .count();
        assert_eq!(pings, 2);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameState::new(424242);
        let mut b = GameState::new(424242);

        for state in [&mut a, &mut b] {
            start_aiming(state);
            advance(state, 0.73);
            press(state);
            advance(state, 0.41);
            press(state);
            advance(state, 2.0);
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.target, b.target);
        assert_eq!(a.score, b.score);
        assert_eq!(a.current_shot, b.current_shot);
    }

    #[test]
    fn test_sweep_speed_scale_slows_sweep() {
        let mut slow = GameState::new(16);
        slow.sweep_scale = 2.0;
        let mut fast = GameState::new(16);

        for state in [&mut slow, &mut fast] {
            start_aiming(state);
            state.take_events();
            advance(state, 0.4);
        }

        let slow_value = slow.current_shot.angle_norm.unwrap();
        let fast_value = fast.current_shot.angle_norm.unwrap();
        assert!(slow_value < fast_value);
    }
}
