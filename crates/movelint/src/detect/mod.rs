use tracing::{debug, warn};

use crate::config::{BufferedUltraMode, LintConfig, ResolvedRules, RoomScope};
use crate::events::{LintEvent, LintEventBus, RuleId};
use crate::messages;
use crate::player::{Button, PlayerMode, PlayerView};
use crate::state::{DetectionSnapshot, DetectionState, BEYOND_SHORT_DURATION_FRAMES};

/// The host locks dashing out for this many frames after an upward room
/// entry; only frames beyond it count as late.
const UP_ENTRY_DASH_LOCKOUT_FRAMES: u32 = 11;
const CLIMB_JUMP_BOOST_TIME_SECONDS: f32 = 0.2;
const SIMULATION_FPS: f32 = 60.0;
/// Holding jump only matters while the variable-jump timer runs or vertical
/// speed is still inside this window.
const JUMP_HOLD_SPEED_WINDOW: f32 = 40.0;

/// Values captured at frame start and consumed at frame end of the same
/// frame. Not part of [`DetectionState`]: nothing here survives a frame, so
/// snapshots do not carry it.
#[derive(Debug, Clone, Copy, Default)]
struct FrameScratch {
    jump_pressed_at_frame_start: bool,
    auto_jump_was_active_last_frame: bool,
    force_move_x_will_be_active: bool,
}

/// The per-frame near-miss detection engine. Owned by the frame driver and
/// invoked at fixed instants of the host pipeline; it never runs on its own
/// and never reaches back into the host.
///
/// Hook order within one simulated frame:
///
/// 1. [`level_update_start`](Self::level_update_start)
/// 2. [`frame_start`](Self::frame_start)
/// 3. [`landing_settled`](Self::landing_settled), then
///    [`wall_boost_active`](Self::wall_boost_active) on boosting frames, then
///    [`before_state_machine`](Self::before_state_machine)
/// 4. state machine: [`move_x_consumed`](Self::move_x_consumed) /
///    [`move_x_discarded`](Self::move_x_discarded),
///    [`fastfall_input_check`](Self::fastfall_input_check),
///    [`jump_hold_check`](Self::jump_hold_check),
///    [`ground_jump_imminent`](Self::ground_jump_imminent),
///    [`button_consumed`](Self::button_consumed) and the action hooks, each
///    0..n times
/// 5. [`after_state_machine`](Self::after_state_machine)
/// 6. movement/collision: [`wall_collided`](Self::wall_collided),
///    [`ultra_boost_applied`](Self::ultra_boost_applied)
/// 7. [`frame_end`](Self::frame_end)
///
/// [`level_transition`](Self::level_transition),
/// [`room_loaded`](Self::room_loaded) and [`pause_ended`](Self::pause_ended)
/// arrive outside the per-player cadence. When the player entity is absent
/// the host simply skips the player hooks for that frame.
#[derive(Debug)]
pub struct MovementLinter {
    config: LintConfig,
    resolved: ResolvedRules,
    location: Option<RoomScope>,
    det: DetectionState,
    scratch: FrameScratch,
    frame_active: bool,
    events: LintEventBus,
}

fn sign_of(value: i8) -> i32 {
    value.signum() as i32
}

fn sign_of_f32(value: f32) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// The host reports `in_control` as true during scripted falls even though
/// no input registers, so that mode is excluded here.
fn player_in_control(view: &PlayerView) -> bool {
    view.in_control && view.mode != PlayerMode::ScriptedFall
}

impl MovementLinter {
    pub fn new(config: LintConfig) -> Self {
        let config = config.validated();
        let resolved = ResolvedRules::resolve(&config, None);
        Self {
            config,
            resolved,
            location: None,
            det: DetectionState::default(),
            scratch: FrameScratch::default(),
            frame_active: false,
            events: LintEventBus::default(),
        }
    }

    /// Replace the configuration (e.g. after the settings menu closes) and
    /// re-resolve the effective rules for the current location.
    pub fn set_config(&mut self, config: LintConfig) {
        self.config = config.validated();
        self.resolved = ResolvedRules::resolve(&self.config, self.location.as_ref());
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn resolved_rules(&self) -> &ResolvedRules {
        &self.resolved
    }

    pub fn detection(&self) -> &DetectionState {
        &self.det
    }

    pub fn location(&self) -> Option<&RoomScope> {
        self.location.as_ref()
    }

    pub fn pending_events(&self) -> &[LintEvent] {
        self.events.emitted_this_frame()
    }

    pub fn drain_events(&mut self) -> Vec<LintEvent> {
        self.events.drain()
    }

    pub fn total_events_emitted(&self) -> u32 {
        self.events.total_emitted()
    }

    fn fire(
        &mut self,
        rule: RuleId,
        rule_enabled: bool,
        singular_key: &'static str,
        plural_key: &'static str,
        frames: u32,
    ) {
        if !self.resolved.enabled || !rule_enabled {
            return;
        }
        debug!(rule = rule.name(), frames, "lint_fired");
        self.events.emit(LintEvent {
            rule,
            singular_key,
            plural_key,
            frames,
        });
    }

    // =================================================================
    // Level cadence hooks

    /// Called at the top of the host's level update, before the player runs.
    pub fn level_update_start(&mut self, skipping_cutscene: bool) {
        if !skipping_cutscene && self.det.was_skipping_cutscene {
            self.det.in_control_frames = 0;
        }
        self.det.was_skipping_cutscene = skipping_cutscene;
    }

    /// A room finished loading: fresh slate for every room-relative counter.
    /// Also the point where location-scoped overrides are re-resolved.
    pub fn room_loaded(&mut self, scope: &RoomScope) {
        self.det.room_load_just_happened = true;
        self.det.jump_release_frames = BEYOND_SHORT_DURATION_FRAMES;
        self.det.jump_release_matters = false;
        self.det.frames_after_land = BEYOND_SHORT_DURATION_FRAMES;
        self.det.release_forward_frames = BEYOND_SHORT_DURATION_FRAMES;
        self.det.release_forward_matters = false;
        self.det.frames_since_up_transition = if self.det.up_transition_just_happened {
            0
        } else {
            BEYOND_SHORT_DURATION_FRAMES + UP_ENTRY_DASH_LOCKOUT_FRAMES
        };
        self.det.fastfall_move_y_frames = BEYOND_SHORT_DURATION_FRAMES;

        self.location = Some(scope.clone());
        self.resolved = ResolvedRules::resolve(&self.config, self.location.as_ref());
        debug!(scope = %scope, "room_loaded");
    }

    /// A transition to the next room has begun. `direction_y == -1` is an
    /// upward exit.
    pub fn level_transition(&mut self, direction_y: i8) {
        let exit_direction = self.resolved.jump_release_exit.direction;
        let exit_frames = self.resolved.jump_release_exit.frames;
        let exit_enabled = self.resolved.jump_release_exit.enabled;
        if exit_direction.accepts(direction_y)
            && self.det.jump_release_frames > 0
            && self.det.jump_release_frames <= exit_frames
            && self.det.jump_release_matters
            && self.det.frame_start_player_mode == PlayerMode::Normal
        {
            let frames = self.det.jump_release_frames;
            self.fire(
                RuleId::JumpReleaseExit,
                exit_enabled,
                messages::JUMP_RELEASE_EXIT_WARN_SINGULAR,
                messages::JUMP_RELEASE_EXIT_WARN_PLURAL,
                frames,
            );
        }

        let forward_frames = self.resolved.release_forward_before_exit.frames;
        let forward_enabled = self.resolved.release_forward_before_exit.enabled;
        if direction_y == 0
            && self.det.release_forward_frames > 0
            && self.det.release_forward_frames <= forward_frames
            && self.det.release_forward_matters
            && !self.det.force_move_x_active
        {
            let frames = self.det.release_forward_frames;
            self.fire(
                RuleId::ReleaseForwardBeforeExit,
                forward_enabled,
                messages::RELEASE_FORWARD_BEFORE_EXIT_WARN_SINGULAR,
                messages::RELEASE_FORWARD_BEFORE_EXIT_WARN_PLURAL,
                frames,
            );
        }

        self.det.up_transition_just_happened = direction_y == -1;
    }

    /// Re-resolve overrides when control returns from the pause menu, in case
    /// the configuration was edited while paused.
    pub fn pause_ended(&mut self) {
        self.resolved = ResolvedRules::resolve(&self.config, self.location.as_ref());
    }

    // =================================================================
    // Player frame hooks

    /// Before any player logic runs this frame.
    pub fn frame_start(&mut self, view: &PlayerView) {
        self.frame_active = true;
        self.det.frame_start_player_mode = view.mode;

        self.scratch.jump_pressed_at_frame_start = view.jump_pressed;
        self.scratch.auto_jump_was_active_last_frame = self.det.auto_jump_was_active;

        let in_control = player_in_control(view);
        if in_control && !self.det.was_in_control {
            self.det.in_control_frames = 0;
        }
        self.det.was_in_control = in_control;

        self.scratch.force_move_x_will_be_active = view.force_move_x_active;
        self.det.move_x_used_this_frame = false;
        self.det.fastfall_checked_this_frame = false;
    }

    /// Right after the host finalizes `on_ground`/`was_on_ground` for this
    /// frame.
    pub fn landing_settled(&mut self, view: &PlayerView) {
        if view.on_ground && !view.was_on_ground {
            self.det.frames_after_land =
                if self.det.room_load_just_happened || !player_in_control(view) {
                    BEYOND_SHORT_DURATION_FRAMES
                } else {
                    0
                };
            self.det.ultra_since_landing = self.det.ultra_last_frame;
        }
        // Some terminal checks need grounding without a player view in hand.
        self.det.on_ground = view.on_ground;
    }

    /// Called each frame the host is actively applying a wall boost.
    pub fn wall_boost_active(&mut self, view: &PlayerView) {
        // Multiple competing off-by-ones surround wall boosts; this is the
        // count that matches the boost the player actually kept.
        let used = ((CLIMB_JUMP_BOOST_TIME_SECONDS - view.wall_boost_timer_seconds)
            * SIMULATION_FPS)
            .round() as i32
            - 1;
        let frames = used.max(0) as u32;
        let threshold = self.resolved.short_wallboost.frames;
        let enabled = self.resolved.short_wallboost.enabled;
        if frames <= threshold {
            self.fire(
                RuleId::ShortWallboost,
                enabled,
                messages::SHORT_WALLBOOST_WARN_SINGULAR,
                messages::SHORT_WALLBOOST_WARN_PLURAL,
                frames,
            );
        }
    }

    /// Just before the host's player state machine runs, once `move_x` and
    /// the ground/collision flags are valid for this frame.
    pub fn before_state_machine(&mut self, view: &PlayerView) {
        self.det.can_dash_this_frame = !view.dash_cooldown_active && view.dashes > 0;

        // Far from exhaustive, but covers the common ways to act right after
        // gaining control.
        let can_unduck = view.can_unduck;
        let wall_jump_possible = view.wall_jump_check_left || view.wall_jump_check_right;
        self.det.can_jump_this_frame = (view.mode == PlayerMode::Normal
            && view.jump_grace_timer_active)
            || (view.mode == PlayerMode::Normal && view.water_below)
            || (view.mode == PlayerMode::Swim && view.swim_jump_check)
            || (view.mode == PlayerMode::Normal && can_unduck && wall_jump_possible)
            || (view.mode == PlayerMode::Climb && (!view.ducking || can_unduck));

        self.det.held_toward_last_wall_hit = false;
        if self.det.last_wall_hit_dir != 0 {
            let still_at_wall_x = view.position_x_px == self.det.last_wall_hit_player_x;
            let still_against_wall = if self.det.last_wall_hit_dir < 0 {
                view.against_solid_left
            } else {
                view.against_solid_right
            };
            if !still_at_wall_x || !still_against_wall {
                self.det.last_wall_hit_dir = 0;
            } else {
                self.det.held_toward_last_wall_hit =
                    sign_of(view.move_x) == self.det.last_wall_hit_dir as i32;
            }
        }

        // Measured here so retained speed has already been applied.
        self.det.frame_start_player_speed = view.speed;
    }

    /// After the state machine ran, before movement applies.
    pub fn after_state_machine(&mut self) {
        self.det.ultra_last_frame = false;
    }

    /// The host is about to feed `move_x` into the player's speed this frame.
    pub fn move_x_consumed(&mut self) {
        self.det.move_x_used_this_frame = true;
    }

    /// The horizontal input turned out not to matter after all (speed gets
    /// overwritten by a climb, super jump, dash, ...).
    pub fn move_x_discarded(&mut self) {
        self.det.move_x_used_this_frame = false;
    }

    /// Just before the host's own fast-fall input check, with the fall-speed
    /// threshold it is about to compare against.
    pub fn fastfall_input_check(&mut self, view: &PlayerView, fastfall_threshold: f32) {
        let move_y_is_fastfall = view.move_y == 1;
        if move_y_is_fastfall != self.det.move_y_is_fastfall && !self.det.room_load_just_happened {
            self.det.fastfall_move_y_frames = 0;
        }
        self.det.move_y_is_fastfall = move_y_is_fastfall;
        self.det.fastfall_move_y_frames = self.det.fastfall_move_y_frames.saturating_add(1);

        if view.speed.y >= fastfall_threshold && !view.on_ground {
            self.det.fastfall_checked_this_frame = true;
        }
    }

    /// Just before the host starts checking whether jump is held.
    pub fn jump_hold_check(&mut self, view: &PlayerView) {
        self.det.jump_release_matters |= !(view.auto_jump || view.jump_held)
            && (view.var_jump_timer_active || view.speed.y.abs() < JUMP_HOLD_SPEED_WINDOW);
        self.det.auto_jump_was_active = view.auto_jump;
    }

    /// An on-ground jump is about to execute.
    pub fn ground_jump_imminent(&mut self, view: &PlayerView) {
        let mode = self.resolved.buffered_ultra.mode;
        if !view.was_on_ground
            && ((view.dash_dir.x != 0.0 && view.dash_dir.y > 0.0 && view.speed.y > 0.0)
                || (mode == BufferedUltraMode::Always && self.det.ultra_last_frame))
        {
            self.fire(
                RuleId::BufferedUltra,
                mode != BufferedUltraMode::Disabled,
                messages::BUFFERED_ULTRA_WARN,
                messages::BUFFERED_ULTRA_WARN,
                0,
            );
        }
    }

    /// The host consumed a jump or dash press/buffer: the canonical signal
    /// that an action really happened. May fire several times per frame.
    pub fn button_consumed(&mut self, button: Button) {
        if button == Button::Jump {
            self.det.fastfall_checked_this_frame = false;
        }
        if button == Button::Dash {
            self.move_x_discarded();

            if self.det.jump_release_frames > 0
                && self.det.jump_release_frames <= self.resolved.jump_release_dash.frames
                && self.det.jump_release_matters
            {
                let enabled = self.resolved.jump_release_dash.enabled;
                let frames = self.det.jump_release_frames;
                self.fire(
                    RuleId::JumpReleaseDash,
                    enabled,
                    messages::JUMP_RELEASE_DASH_WARN_SINGULAR,
                    messages::JUMP_RELEASE_DASH_WARN_PLURAL,
                    frames,
                );
            }

            if self.det.release_forward_frames > 0
                && self.det.release_forward_frames
                    <= self.resolved.release_forward_before_dash.frames
                && self.det.release_forward_matters
                && !self.det.force_move_x_active
            {
                let enabled = self.resolved.release_forward_before_dash.enabled;
                let frames = self.det.release_forward_frames;
                self.fire(
                    RuleId::ReleaseForwardBeforeDash,
                    enabled,
                    messages::RELEASE_FORWARD_BEFORE_DASH_WARN_SINGULAR,
                    messages::RELEASE_FORWARD_BEFORE_DASH_WARN_PLURAL,
                    frames,
                );
            }

            if self.det.fastfall_move_y_frames > 0
                && self.det.fastfall_move_y_frames
                    <= self.resolved.fastfall_release_before_dash.frames
                && self.det.fastfall_checked_last_frame
                && !self.det.on_ground
            {
                let enabled = self.resolved.fastfall_release_before_dash.enabled;
                let frames = self.det.fastfall_move_y_frames;
                self.fire(
                    RuleId::FastfallReleaseBeforeDash,
                    enabled,
                    messages::FASTFALL_RELEASE_BEFORE_DASH_WARN_SINGULAR,
                    messages::FASTFALL_RELEASE_BEFORE_DASH_WARN_PLURAL,
                    frames,
                );
            }

            let land_mode = self.resolved.move_after_land.mode;
            let land_frames = self.resolved.move_after_land.frames;
            let land_ignore_ultras = self.resolved.move_after_land.ignore_ultras;
            if land_mode.counts_dash()
                && self.det.could_dash_last_frame
                && self.det.frames_after_land > 0
                && self.det.frames_after_land <= land_frames
                && !(land_ignore_ultras && self.det.ultra_since_landing)
            {
                let frames = self.det.frames_after_land;
                self.fire(
                    RuleId::MoveAfterLand,
                    true,
                    messages::MOVE_AFTER_LAND_WARN_SINGULAR,
                    messages::MOVE_AFTER_LAND_WARN_PLURAL,
                    frames,
                );
            }

            let frames_late = self
                .det
                .frames_since_up_transition
                .saturating_sub(UP_ENTRY_DASH_LOCKOUT_FRAMES);
            if frames_late > 0 && frames_late <= self.resolved.dash_after_up_entry.frames {
                let enabled = self.resolved.dash_after_up_entry.enabled;
                self.fire(
                    RuleId::DashAfterUpEntry,
                    enabled,
                    messages::DASH_AFTER_UP_ENTRY_WARN_SINGULAR,
                    messages::DASH_AFTER_UP_ENTRY_WARN_PLURAL,
                    frames_late,
                );
            }

            // From here the release opportunity belongs exclusively to
            // jump-release-dash.
            self.det.jump_release_frames = BEYOND_SHORT_DURATION_FRAMES;
            self.det.jump_release_matters = false;
        }

        if ((button == Button::Jump && self.det.could_jump_last_frame)
            || (button == Button::Dash && self.det.could_dash_last_frame))
            && self.det.in_control_frames > 0
            && self.det.in_control_frames <= self.resolved.move_after_gain_control.frames
        {
            let enabled = self.resolved.move_after_gain_control.enabled;
            let frames = self.det.in_control_frames;
            self.fire(
                RuleId::MoveAfterGainControl,
                enabled,
                messages::MOVE_AFTER_GAIN_CONTROL_WARN_SINGULAR,
                messages::MOVE_AFTER_GAIN_CONTROL_WARN_PLURAL,
                frames,
            );
        }
        // Combined same-frame actions must not fire gain-control twice.
        self.det.in_control_frames = BEYOND_SHORT_DURATION_FRAMES;
    }

    /// A (non-wall) jump executed.
    pub fn jump_executed(&mut self) {
        let land_mode = self.resolved.move_after_land.mode;
        let land_frames = self.resolved.move_after_land.frames;
        let land_ignore_ultras = self.resolved.move_after_land.ignore_ultras;
        if land_mode.counts_jump()
            && self.det.frames_after_land > 0
            && self.det.frames_after_land <= land_frames
            && !(land_ignore_ultras && self.det.ultra_since_landing)
        {
            let frames = self.det.frames_after_land;
            self.fire(
                RuleId::MoveAfterLand,
                true,
                messages::MOVE_AFTER_LAND_WARN_SINGULAR,
                messages::MOVE_AFTER_LAND_WARN_PLURAL,
                frames,
            );
        }
    }

    /// A wall jump executed. `dir` is the direction of the jump, not of the
    /// wall the player kicked off.
    pub fn wall_jump_executed(&mut self, dir: i8, view: &PlayerView) {
        self.move_x_discarded();
        if self.det.release_forward_frames > 0
            && self.det.release_forward_frames <= self.resolved.turn_before_wallkick.frames
            && self.det.release_forward_matters
            && !self.det.force_move_x_active
            && view.move_x != 0
            && sign_of_f32(self.det.frame_start_player_speed.x) != dir as i32
        {
            let enabled = self.resolved.turn_before_wallkick.enabled;
            let frames = self.det.release_forward_frames;
            self.fire(
                RuleId::TurnBeforeWallkick,
                enabled,
                messages::TURN_BEFORE_WALLKICK_WARN_SINGULAR,
                messages::TURN_BEFORE_WALLKICK_WARN_PLURAL,
                frames,
            );
        }
    }

    /// The player entered a booster bubble.
    pub fn boost_entered(&mut self) {
        self.det.could_dash_before_bubble = self.det.can_dash_this_frame;
        self.det.frames_before_fast_bubble = 0;
    }

    /// One frame of the booster's boost-update sub-state.
    pub fn boost_update(&mut self, view: &PlayerView) {
        if (view.dash_pressed || view.crouch_dash_pressed)
            && !self.det.could_dash_before_bubble
            && self.det.frames_before_fast_bubble > 0
            && self.det.frames_before_fast_bubble <= self.resolved.fast_bubble.frames
        {
            let enabled = self.resolved.fast_bubble.enabled;
            let frames = self.det.frames_before_fast_bubble;
            self.fire(
                RuleId::FastBubble,
                enabled,
                messages::FAST_BUBBLE_WARN_SINGULAR,
                messages::FAST_BUBBLE_WARN_PLURAL,
                frames,
            );
        }
        self.det.frames_before_fast_bubble = self.det.frames_before_fast_bubble.saturating_add(1);
    }

    /// The player collided with a wall. `dir` is the collision direction.
    pub fn wall_collided(&mut self, dir: i8, position_x_px: i32) {
        self.det.last_wall_hit_dir = dir;
        self.det.last_wall_hit_player_x = position_x_px;
    }

    /// A downward collision just applied an ultra speed boost.
    pub fn ultra_boost_applied(&mut self) {
        self.det.ultra_last_frame = true;
        self.det.ultra_since_landing = true;
    }

    /// After the host finished the player's full per-frame update. Every
    /// Pattern-A counter advances exactly once here.
    pub fn frame_end(&mut self, view: &PlayerView) {
        // Jump release: a press (or an auto-jump activating) right after a
        // too-early release is the near-miss.
        let pressed = self.scratch.jump_pressed_at_frame_start;
        let auto_jump_activated =
            self.det.auto_jump_was_active && !self.scratch.auto_jump_was_active_last_frame;
        if (pressed || auto_jump_activated)
            && self.det.jump_release_frames > 0
            && self.det.jump_release_frames <= self.resolved.jump_release_jump.frames
            && self.det.jump_release_matters
        {
            let (singular, plural) = if pressed {
                (
                    messages::JUMP_RELEASE_JUMP_WARN_SINGULAR,
                    messages::JUMP_RELEASE_JUMP_WARN_PLURAL,
                )
            } else {
                (
                    messages::JUMP_RELEASE_AUTO_JUMP_WARN_SINGULAR,
                    messages::JUMP_RELEASE_AUTO_JUMP_WARN_PLURAL,
                )
            };
            let enabled = self.resolved.jump_release_jump.enabled;
            let frames = self.det.jump_release_frames;
            self.fire(RuleId::JumpReleaseJump, enabled, singular, plural, frames);
        }
        if view.jump_held {
            self.det.jump_release_frames = 0;
            self.det.jump_release_matters = false;
        } else {
            self.det.jump_release_frames = self.det.jump_release_frames.saturating_add(1);
        }

        self.det.frames_after_land = self.det.frames_after_land.saturating_add(1);
        self.det.could_dash_last_frame = self.det.can_dash_this_frame;
        self.det.in_control_frames = self.det.in_control_frames.saturating_add(1);
        self.det.could_jump_last_frame = self.det.can_jump_this_frame;
        self.det.frames_since_up_transition =
            self.det.frames_since_up_transition.saturating_add(1);
        self.det.up_transition_just_happened = false;

        self.det.force_move_x_active = self.scratch.force_move_x_will_be_active;
        let forward = self.det.held_toward_last_wall_hit
            || (self.det.frame_start_player_speed.x != 0.0
                && sign_of(view.move_x) == sign_of_f32(self.det.frame_start_player_speed.x));
        if forward {
            // Holding forward at any point puts this input run permanently in
            // the clear.
            self.det.release_forward_frames = BEYOND_SHORT_DURATION_FRAMES;
            self.det.release_forward_matters = false;
        } else {
            if view.move_x != self.det.last_move_x
                && self.det.last_move_x_was_forward
                && !self.det.room_load_just_happened
            {
                // The timer starts on the release itself, whether it matters
                // yet or not.
                self.det.release_forward_frames = 1;
                self.det.release_forward_matters = false;
            } else {
                self.det.release_forward_frames =
                    self.det.release_forward_frames.saturating_add(1);
            }
            self.det.release_forward_matters |=
                self.det.move_x_used_this_frame && self.det.last_wall_hit_dir == 0;
        }
        self.det.last_move_x = view.move_x;
        self.det.last_move_x_was_forward = forward;

        self.det.fastfall_checked_last_frame = self.det.fastfall_checked_this_frame;

        // Applies for the whole frame, so cleared last.
        self.det.room_load_just_happened = false;

        self.frame_active = false;
    }

    // =================================================================
    // Save-state boundary

    /// Copy the whole detection record out, as one unit.
    pub fn capture_snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot(self.det)
    }

    /// Copy a previously captured record back in, as one unit. Calling this
    /// while a frame is being processed is an integration error: asserts in
    /// debug builds, safely ignored in release.
    pub fn restore_snapshot(&mut self, snapshot: &DetectionSnapshot) {
        if self.frame_active {
            debug_assert!(!self.frame_active, "restore_snapshot during an active frame");
            warn!("snapshot_restore_rejected_mid_frame");
            return;
        }
        self.det = snapshot.0;
        // The save-state may have been taken under a different configuration
        // epoch; refresh the resolved rules like a room entry would.
        self.resolved = ResolvedRules::resolve(&self.config, self.location.as_ref());
        debug!("snapshot_restored");
    }
}
