use super::*;
use crate::config::{
    BufferedUltraMode, LintConfig, MoveAfterLandMode, Overridable, OverrideEntry, OverrideRuleSet,
    TransitionDirection,
};
use crate::config::FramesRule;

const FASTFALL_SPEED_THRESHOLD: f32 = 160.0;

fn new_linter() -> MovementLinter {
    MovementLinter::new(LintConfig::default())
}

fn linter_with(configure: impl FnOnce(&mut LintConfig)) -> MovementLinter {
    let mut config = LintConfig::default();
    configure(&mut config);
    MovementLinter::new(config)
}

fn fired(linter: &mut MovementLinter) -> Vec<RuleId> {
    linter.drain_events().into_iter().map(|event| event.rule).collect()
}

/// Run one simulated frame through the hooks in host pipeline order.
/// `state_machine` runs where the host's player state machine would (button
/// consumption, jumps, dashes); `movement` runs where collision response
/// would (wall hits, ultra boosts).
fn step_frame(
    linter: &mut MovementLinter,
    view: &PlayerView,
    state_machine: impl FnOnce(&mut MovementLinter),
    movement: impl FnOnce(&mut MovementLinter),
) {
    linter.frame_start(view);
    linter.landing_settled(view);
    linter.before_state_machine(view);
    if view.mode == PlayerMode::Normal {
        linter.move_x_consumed();
        linter.fastfall_input_check(view, FASTFALL_SPEED_THRESHOLD);
        linter.jump_hold_check(view);
    }
    state_machine(linter);
    linter.after_state_machine();
    movement(linter);
    linter.frame_end(view);
}

fn step_with(
    linter: &mut MovementLinter,
    view: &PlayerView,
    state_machine: impl FnOnce(&mut MovementLinter),
) {
    step_frame(linter, view, state_machine, |_| {});
}

fn step(linter: &mut MovementLinter, view: &PlayerView) {
    step_frame(linter, view, |_| {}, |_| {});
}

/// Idle long enough that every startup-relative counter is far outside any
/// configurable window.
fn warm_up(linter: &mut MovementLinter) {
    let idle = PlayerView::empty();
    for _ in 0..120 {
        step(linter, &idle);
    }
    linter.drain_events();
}

fn falling() -> PlayerView {
    PlayerView::empty()
        .with_ground(false, false)
        .with_speed(0.0, FASTFALL_SPEED_THRESHOLD)
}

/// Hold jump for a few frames, then release it for `release_frames` full
/// frames with conditions under which holding would have mattered.
fn release_jump_for(linter: &mut MovementLinter, release_frames: u32) {
    let held = PlayerView::empty().with_jump_held(true);
    for _ in 0..5 {
        step(linter, &held);
    }
    let released = PlayerView::empty();
    for _ in 0..release_frames {
        step(linter, &released);
    }
}

// =====================================================================
// Sentinel and threshold mechanics

#[test]
fn sentinel_counter_never_fires_even_at_the_maximum_threshold() {
    let mut linter = linter_with(|config| {
        config.jump_release_dash.frames = 99;
        config.release_forward_before_dash.frames = 99;
    });
    // Arm the matters flags without ever starting the counters.
    let view = PlayerView::empty();
    linter.frame_start(&view);
    linter.jump_hold_check(&view);
    assert!(linter.detection().jump_release_matters);
    assert_eq!(
        linter.detection().jump_release_frames,
        BEYOND_SHORT_DURATION_FRAMES
    );

    linter.button_consumed(Button::Dash);
    linter.frame_end(&view);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn threshold_boundary_is_inclusive() {
    // Counter exactly at the threshold fires.
    let mut linter = linter_with(|config| config.jump_release_dash.frames = 2);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert_eq!(fired(&mut linter), vec![RuleId::JumpReleaseDash]);

    // One past the threshold does not.
    let mut linter = linter_with(|config| config.jump_release_dash.frames = 2);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 3);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn firing_is_one_shot_until_rearmed() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert_eq!(fired(&mut linter), vec![RuleId::JumpReleaseDash]);

    // Same terminal action on the next frame, no new arming event.
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Jump release

#[test]
fn jump_release_fires_on_the_next_press_with_the_measured_count() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);

    let press = PlayerView::empty().with_jump_pressed(true).with_jump_held(true);
    step(&mut linter, &press);

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::JumpReleaseJump);
    assert_eq!(events[0].frames, 2);
    assert_eq!(events[0].plural_key, messages::JUMP_RELEASE_JUMP_WARN_PLURAL);
}

#[test]
fn jump_release_does_not_refire_on_a_held_repress() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);

    let press = PlayerView::empty().with_jump_pressed(true).with_jump_held(true);
    step(&mut linter, &press);
    assert_eq!(fired(&mut linter).len(), 1);

    step(&mut linter, &press);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn jump_release_needs_the_matters_flag() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let held = PlayerView::empty().with_jump_held(true);
    for _ in 0..5 {
        step(&mut linter, &held);
    }
    // Released, but falling too fast for holding jump to have helped.
    let released = PlayerView::empty()
        .with_ground(false, false)
        .with_speed(0.0, 120.0);
    for _ in 0..2 {
        step(&mut linter, &released);
    }
    assert!(!linter.detection().jump_release_matters);

    let press = released.with_jump_pressed(true).with_jump_held(true);
    step(&mut linter, &press);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn variable_jump_timer_keeps_the_release_relevant_while_fast() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let held = PlayerView::empty().with_jump_held(true);
    for _ in 0..5 {
        step(&mut linter, &held);
    }
    let released = PlayerView::empty()
        .with_ground(false, false)
        .with_speed(0.0, 120.0)
        .with_var_jump_timer_active(true);
    step(&mut linter, &released);

    let press = released.with_jump_pressed(true).with_jump_held(true);
    step(&mut linter, &press);
    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].frames, 1);
    assert_eq!(events[0].singular_key, messages::JUMP_RELEASE_JUMP_WARN_SINGULAR);
}

#[test]
fn auto_jump_activation_counts_as_the_jump_and_picks_its_own_message() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);

    // A spring (or similar) turns auto-jump on; no manual press.
    let auto = PlayerView::empty().with_auto_jump(true);
    step(&mut linter, &auto);

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::JumpReleaseJump);
    assert_eq!(
        events[0].plural_key,
        messages::JUMP_RELEASE_AUTO_JUMP_WARN_PLURAL
    );
}

#[test]
fn dash_takes_over_the_release_opportunity_from_jump() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert_eq!(fired(&mut linter), vec![RuleId::JumpReleaseDash]);

    // The release was spent on the dash; a press right after stays silent.
    let press = PlayerView::empty().with_jump_pressed(true).with_jump_held(true);
    step(&mut linter, &press);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn disabled_rule_emits_no_event_at_all() {
    let mut linter = linter_with(|config| config.jump_release_dash.enabled = false);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn master_switch_silences_every_rule() {
    let mut linter = linter_with(|config| config.enabled = false);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Jump release before room exit

#[test]
fn jump_release_exit_fires_for_an_upward_transition() {
    let mut linter = linter_with(|config| config.jump_release_exit.frames = 6);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 4);

    linter.level_transition(-1);
    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::JumpReleaseExit);
    assert_eq!(events[0].frames, 4);
}

#[test]
fn jump_release_exit_respects_the_direction_mode() {
    let mut linter = linter_with(|config| {
        config.jump_release_exit.frames = 6;
        config.jump_release_exit.direction = TransitionDirection::NotDown;
    });
    warm_up(&mut linter);
    release_jump_for(&mut linter, 4);

    // Downward exit under not-down: wrong direction.
    linter.level_transition(1);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn jump_release_exit_requires_the_normal_mode() {
    let mut linter = linter_with(|config| config.jump_release_exit.frames = 6);
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    // The last simulated frame started in the climb state.
    step(&mut linter, &PlayerView::empty().with_mode(PlayerMode::Climb));

    linter.level_transition(-1);
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Move after landing

fn land_then_wait(linter: &mut MovementLinter, frames_after_land: u32) {
    for _ in 0..10 {
        step(linter, &falling());
    }
    let landing = PlayerView::empty()
        .with_ground(true, false)
        .with_speed(0.0, FASTFALL_SPEED_THRESHOLD);
    step(linter, &landing);
    for _ in 0..frames_after_land.saturating_sub(1) {
        step(linter, &PlayerView::empty());
    }
}

#[test]
fn dash_shortly_after_landing_fires_with_the_frame_count() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    land_then_wait(&mut linter, 3);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::MoveAfterLand);
    assert_eq!(events[0].frames, 3);
}

#[test]
fn dash_after_landing_outside_the_window_is_silent() {
    let mut linter = linter_with(|config| config.move_after_land.frames = 2);
    warm_up(&mut linter);
    land_then_wait(&mut linter, 3);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn move_after_land_mode_selects_the_counted_action() {
    // Dash-only ignores jumps.
    let mut linter = new_linter();
    warm_up(&mut linter);
    land_then_wait(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| l.jump_executed());
    assert!(fired(&mut linter).is_empty());

    // Jump-only counts them.
    let mut linter = linter_with(|config| {
        config.move_after_land.mode = MoveAfterLandMode::JumpOnly;
    });
    warm_up(&mut linter);
    land_then_wait(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| l.jump_executed());
    assert_eq!(fired(&mut linter), vec![RuleId::MoveAfterLand]);

    // And under jump-only a dash is ignored.
    let mut linter = linter_with(|config| {
        config.move_after_land.mode = MoveAfterLandMode::JumpOnly;
    });
    warm_up(&mut linter);
    land_then_wait(&mut linter, 2);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn ultra_landing_suppresses_move_after_land_when_configured() {
    let mut linter = linter_with(|config| {
        config.move_after_land.mode = MoveAfterLandMode::DashOrJump;
    });
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &falling());
    }
    // The landing collision applies an ultra speed boost.
    let landing = PlayerView::empty()
        .with_ground(true, false)
        .with_speed(0.0, FASTFALL_SPEED_THRESHOLD);
    step_frame(&mut linter, &falling(), |_| {}, |l| l.ultra_boost_applied());
    step(&mut linter, &landing);
    assert!(linter.detection().ultra_since_landing);

    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    step_with(&mut linter, &PlayerView::empty(), |l| l.jump_executed());
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn landing_without_control_never_arms_move_after_land() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &falling().with_in_control(false));
    }
    let landing = PlayerView::empty()
        .with_ground(true, false)
        .with_in_control(false);
    step(&mut linter, &landing);
    assert_eq!(
        linter.detection().frames_after_land,
        BEYOND_SHORT_DURATION_FRAMES + 1
    );
}

// =====================================================================
// Move after gaining control

#[test]
fn acting_right_after_gaining_control_fires_once() {
    let mut linter = new_linter();
    let scripted = PlayerView::empty().with_in_control(false);
    for _ in 0..30 {
        step(&mut linter, &scripted);
    }
    linter.drain_events();

    // Control comes back; the player jumps and dashes on the second frame.
    let free = PlayerView::empty().with_jump_grace_timer_active(true);
    step(&mut linter, &free);
    step_with(&mut linter, &free, |l| {
        l.button_consumed(Button::Jump);
        l.button_consumed(Button::Dash);
    });

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::MoveAfterGainControl);
    assert_eq!(events[0].frames, 1);
}

#[test]
fn cutscene_skip_end_restarts_the_control_counter() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let ready = PlayerView::empty().with_jump_grace_timer_active(true);
    linter.level_update_start(true);
    step(&mut linter, &ready);
    // The skip ends; the very next action is a near-miss again.
    linter.level_update_start(false);
    step(&mut linter, &ready);
    step_with(&mut linter, &ready, |l| l.button_consumed(Button::Jump));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::MoveAfterGainControl);
}

#[test]
fn action_outside_the_gain_control_window_is_silent() {
    let mut linter = new_linter();
    let scripted = PlayerView::empty().with_in_control(false);
    for _ in 0..30 {
        step(&mut linter, &scripted);
    }
    let free = PlayerView::empty().with_jump_grace_timer_active(true);
    for _ in 0..10 {
        step(&mut linter, &free);
    }
    linter.drain_events();
    step_with(&mut linter, &free, |l| l.button_consumed(Button::Jump));
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Dash after upward room entry

fn enter_room_upward(linter: &mut MovementLinter) {
    linter.level_transition(-1);
    linter.room_loaded(&RoomScope::new("city", "old-site", 0, "3a"));
    linter.drain_events();
}

#[test]
fn dash_late_after_upward_entry_counts_only_past_the_lockout() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    enter_room_upward(&mut linter);
    // 13 full frames: 11 are the host's own lockout, 2 are late.
    for _ in 0..13 {
        step(&mut linter, &PlayerView::empty());
    }
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::DashAfterUpEntry);
    assert_eq!(events[0].frames, 2);
}

#[test]
fn dash_inside_the_entry_lockout_is_not_late() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    enter_room_upward(&mut linter);
    for _ in 0..5 {
        step(&mut linter, &PlayerView::empty());
    }
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn non_upward_entry_never_arms_the_entry_rule() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    linter.level_transition(1);
    linter.room_loaded(&RoomScope::new("city", "old-site", 0, "3a"));
    for _ in 0..13 {
        step(&mut linter, &PlayerView::empty());
    }
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Release-forward family

fn moving_right() -> PlayerView {
    PlayerView::empty().with_move_x(1).with_speed(90.0, 0.0)
}

fn released_forward() -> PlayerView {
    PlayerView::empty().with_move_x(0).with_speed(90.0, 0.0)
}

#[test]
fn releasing_forward_right_before_a_dash_fires() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    step(&mut linter, &released_forward());
    step_with(&mut linter, &released_forward(), |l| {
        l.button_consumed(Button::Dash)
    });

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::ReleaseForwardBeforeDash);
    assert_eq!(events[0].frames, 1);
}

#[test]
fn holding_forward_again_cancels_the_release_timer() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    step(&mut linter, &released_forward());
    // Forward comes back before the dash: the run is in the clear for good.
    step(&mut linter, &moving_right());
    step_with(&mut linter, &released_forward(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn forced_horizontal_input_suppresses_release_forward() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    step(&mut linter, &released_forward().with_force_move_x_active(true));
    step_with(
        &mut linter,
        &released_forward().with_force_move_x_active(true),
        |l| l.button_consumed(Button::Dash),
    );
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn release_forward_before_a_horizontal_exit_fires() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    step(&mut linter, &released_forward());

    linter.level_transition(0);
    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::ReleaseForwardBeforeExit);
    assert_eq!(events[0].frames, 1);

    // A vertical exit is not this rule's business.
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    step(&mut linter, &released_forward());
    linter.level_transition(-1);
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn turning_right_before_a_wall_kick_fires() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    // The turn toward the wall-kick: input now points away from travel.
    let turned = PlayerView::empty().with_move_x(-1).with_speed(90.0, 0.0);
    step(&mut linter, &turned);
    step_with(&mut linter, &turned, |l| l.wall_jump_executed(-1, &turned));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::TurnBeforeWallkick);
    assert_eq!(events[0].frames, 1);
}

#[test]
fn wall_kick_in_the_travel_direction_is_not_a_turn() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    // Speed already flipped to match the jump direction.
    let turned = PlayerView::empty().with_move_x(-1).with_speed(-90.0, 0.0);
    step(&mut linter, &turned);
    step_with(&mut linter, &turned, |l| l.wall_jump_executed(-1, &turned));
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn holding_toward_a_freshly_hit_wall_still_counts_as_forward() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    for _ in 0..10 {
        step(&mut linter, &moving_right());
    }
    // The player slams into a wall on the right and keeps holding into it;
    // speed drops to zero but the input run stays forward.
    let at_wall = PlayerView::empty()
        .with_move_x(1)
        .with_speed(0.0, 0.0)
        .with_position_x_px(128)
        .with_against_solid(false, true);
    step_frame(&mut linter, &at_wall, |_| {}, |l| l.wall_collided(1, 128));
    for _ in 0..3 {
        step(&mut linter, &at_wall);
    }
    assert!(linter.detection().held_toward_last_wall_hit);
    assert_eq!(
        linter.detection().release_forward_frames,
        BEYOND_SHORT_DURATION_FRAMES
    );
}

// =====================================================================
// Fast-fall release

#[test]
fn dropping_fastfall_right_before_a_dash_fires() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let fastfalling = falling().with_move_y(1);
    for _ in 0..10 {
        step(&mut linter, &fastfalling);
    }
    // Input released while still falling fast.
    let released = falling().with_move_y(0);
    step(&mut linter, &released);
    step_with(&mut linter, &released, |l| l.button_consumed(Button::Dash));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::FastfallReleaseBeforeDash);
    assert_eq!(events[0].frames, 2);
}

#[test]
fn continuous_fastfall_into_a_dash_is_fine() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let fastfalling = falling().with_move_y(1);
    for _ in 0..10 {
        step(&mut linter, &fastfalling);
    }
    step_with(&mut linter, &fastfalling, |l| {
        l.button_consumed(Button::Dash)
    });
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn grounded_dash_ignores_the_fastfall_rule() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let fastfalling = falling().with_move_y(1);
    for _ in 0..10 {
        step(&mut linter, &fastfalling);
    }
    let grounded = PlayerView::empty().with_move_y(0);
    step(&mut linter, &grounded);
    step_with(&mut linter, &grounded, |l| l.button_consumed(Button::Dash));
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Short wallboost

#[test]
fn short_wallboost_fires_immediately_while_boosting() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    // 0.2s boost, 0.15s remaining: round((0.2 - 0.15) * 60) - 1 = 2 frames.
    let boosting = PlayerView::empty()
        .with_mode(PlayerMode::Climb)
        .with_wall_boost_timer_seconds(0.15);
    step_with(&mut linter, &boosting, |l| l.wall_boost_active(&boosting));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::ShortWallboost);
    assert_eq!(events[0].frames, 2);
}

#[test]
fn long_enough_wallboost_is_silent() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let boosting = PlayerView::empty()
        .with_mode(PlayerMode::Climb)
        .with_wall_boost_timer_seconds(0.1);
    step_with(&mut linter, &boosting, |l| l.wall_boost_active(&boosting));
    assert!(fired(&mut linter).is_empty());
}

#[test]
fn wallboost_frame_math_clamps_at_zero() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let boosting = PlayerView::empty()
        .with_mode(PlayerMode::Climb)
        .with_wall_boost_timer_seconds(0.2);
    step_with(&mut linter, &boosting, |l| l.wall_boost_active(&boosting));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].frames, 0);
}

// =====================================================================
// Buffered ultra

#[test]
fn buffered_jump_during_a_downward_diagonal_dash_warns() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let ultra_setup = PlayerView::empty()
        .with_ground(true, false)
        .with_speed(240.0, 10.0)
        .with_dash_dir(1.0, 1.0);
    step_with(&mut linter, &ultra_setup, |l| {
        l.ground_jump_imminent(&ultra_setup)
    });

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::BufferedUltra);
    assert_eq!(events[0].frames, 0);
}

#[test]
fn always_mode_also_warns_right_after_an_ultra_boost() {
    let mut linter = linter_with(|config| {
        config.buffered_ultra.mode = BufferedUltraMode::Always;
    });
    warm_up(&mut linter);
    step_frame(
        &mut linter,
        &falling(),
        |_| {},
        |l| l.ultra_boost_applied(),
    );

    let landing = PlayerView::empty().with_ground(true, false);
    step_with(&mut linter, &landing, |l| l.ground_jump_imminent(&landing));
    assert_eq!(fired(&mut linter), vec![RuleId::BufferedUltra]);
}

#[test]
fn only_when_mattered_ignores_the_previous_frames_ultra() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    step_frame(
        &mut linter,
        &falling(),
        |_| {},
        |l| l.ultra_boost_applied(),
    );

    let landing = PlayerView::empty().with_ground(true, false);
    step_with(&mut linter, &landing, |l| l.ground_jump_imminent(&landing));
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Fast bubble

#[test]
fn dashing_out_of_a_bubble_entered_without_a_dash_fires() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    // No dash available when the bubble swallows the player.
    let spent = PlayerView::empty().with_dashes(0).with_ground(false, false);
    step_with(&mut linter, &spent, |l| l.boost_entered());

    let in_bubble = spent.with_mode(PlayerMode::Boost);
    step_with(&mut linter, &in_bubble, |l| l.boost_update(&in_bubble));
    let pressing = in_bubble.with_dash_pressed(true);
    step_with(&mut linter, &pressing, |l| l.boost_update(&pressing));

    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule, RuleId::FastBubble);
    assert_eq!(events[0].frames, 1);
}

#[test]
fn bubble_entered_with_a_dash_available_is_exempt() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    let fresh = PlayerView::empty().with_ground(false, false);
    step_with(&mut linter, &fresh, |l| l.boost_entered());

    let in_bubble = fresh.with_mode(PlayerMode::Boost);
    step_with(&mut linter, &in_bubble, |l| l.boost_update(&in_bubble));
    let pressing = in_bubble.with_dash_pressed(true);
    step_with(&mut linter, &pressing, |l| l.boost_update(&pressing));
    assert!(fired(&mut linter).is_empty());
}

// =====================================================================
// Room loads

#[test]
fn room_load_resets_every_room_relative_counter() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 1);
    land_then_wait(&mut linter, 1);
    step(&mut linter, &released_forward());
    step(&mut linter, &falling().with_move_y(1));
    linter.drain_events();

    linter.room_loaded(&RoomScope::new("city", "old-site", 0, "3a"));

    let det = linter.detection();
    assert_eq!(det.jump_release_frames, BEYOND_SHORT_DURATION_FRAMES);
    assert!(!det.jump_release_matters);
    assert_eq!(det.frames_after_land, BEYOND_SHORT_DURATION_FRAMES);
    assert_eq!(det.release_forward_frames, BEYOND_SHORT_DURATION_FRAMES);
    assert!(!det.release_forward_matters);
    assert_eq!(det.fastfall_move_y_frames, BEYOND_SHORT_DURATION_FRAMES);

    // And nothing fires on the very next frame's actions.
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    let events: Vec<RuleId> = fired(&mut linter);
    assert!(
        !events.contains(&RuleId::JumpReleaseDash)
            && !events.contains(&RuleId::MoveAfterLand)
            && !events.contains(&RuleId::ReleaseForwardBeforeDash)
            && !events.contains(&RuleId::FastfallReleaseBeforeDash),
        "room-relative rules fired after a room load: {events:?}"
    );
}

// =====================================================================
// Overrides and configuration epochs

fn override_for(scope: &RoomScope, frames: u32, active: bool) -> OverrideEntry {
    OverrideEntry {
        scope: scope.clone(),
        rules: OverrideRuleSet {
            jump_release_dash: Some(Overridable {
                active,
                settings: FramesRule {
                    enabled: true,
                    frames,
                    responses: Vec::new(),
                },
            }),
            ..OverrideRuleSet::default()
        },
    }
}

#[test]
fn entering_an_overridden_room_swaps_the_effective_rule() {
    let scope = RoomScope::new("city", "old-site", 0, "3a");
    let mut linter = linter_with(|config| {
        config.jump_release_dash.frames = 3;
        config.overrides.push(override_for(&scope, 5, true));
    });
    assert_eq!(linter.resolved_rules().jump_release_dash.frames, 3);

    linter.room_loaded(&scope);
    assert_eq!(linter.resolved_rules().jump_release_dash.frames, 5);

    linter.room_loaded(&RoomScope::new("city", "old-site", 0, "3b"));
    assert_eq!(linter.resolved_rules().jump_release_dash.frames, 3);
}

#[test]
fn inactive_override_slot_keeps_the_base_rule() {
    let scope = RoomScope::new("city", "old-site", 0, "3a");
    let mut linter = linter_with(|config| {
        config.jump_release_dash.frames = 3;
        config.overrides.push(override_for(&scope, 5, false));
    });
    linter.room_loaded(&scope);
    assert_eq!(linter.resolved_rules().jump_release_dash.frames, 3);
}

#[test]
fn pause_end_picks_up_configuration_edits() {
    let scope = RoomScope::new("city", "old-site", 0, "3a");
    let mut linter = new_linter();
    linter.room_loaded(&scope);

    // The player edits the config while paused; the host pushes it and then
    // reports the pause ending.
    let mut edited = linter.config().clone();
    edited.overrides.push(override_for(&scope, 7, true));
    linter.set_config(edited);
    linter.pause_ended();
    assert_eq!(linter.resolved_rules().jump_release_dash.frames, 7);
}

// =====================================================================
// Save-state boundary

#[test]
fn snapshot_restore_is_observably_identical() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    let before = *linter.detection();
    let snapshot = linter.capture_snapshot();

    // Keep playing, then rewind.
    for _ in 0..30 {
        step(&mut linter, &falling());
    }
    assert_ne!(*linter.detection(), before);

    linter.restore_snapshot(&snapshot);
    assert_eq!(*linter.detection(), before);

    // Restoring the snapshot of the current state is a no-op.
    let recapture = linter.capture_snapshot();
    linter.restore_snapshot(&recapture);
    assert_eq!(*linter.detection(), before);
}

#[test]
fn restored_state_behaves_like_the_original_timeline() {
    let mut linter = new_linter();
    warm_up(&mut linter);
    release_jump_for(&mut linter, 2);
    let snapshot = linter.capture_snapshot();

    // Timeline A: the dash fires.
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    assert_eq!(fired(&mut linter), vec![RuleId::JumpReleaseDash]);

    // Rewind and replay: it fires again, with the same measurement.
    linter.restore_snapshot(&snapshot);
    step_with(&mut linter, &PlayerView::empty(), |l| {
        l.button_consumed(Button::Dash)
    });
    let events = linter.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].frames, 2);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "restore_snapshot during an active frame")]
fn restoring_mid_frame_asserts_in_debug_builds() {
    let mut linter = new_linter();
    let snapshot = linter.capture_snapshot();
    linter.frame_start(&PlayerView::empty());
    linter.restore_snapshot(&snapshot);
}
