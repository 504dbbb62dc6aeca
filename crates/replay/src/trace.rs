use std::fs;
use std::path::{Path, PathBuf};

use movelint::{
    messages, Button, LintConfig, MovementLinter, PlayerMode, PlayerView, ResponseDirector,
    RoomScope, RuleId, Vec2,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const TRACE_VERSION: u32 = 1;

/// Fall speed at which the host's normal-state update starts consulting the
/// fast-fall input.
const FASTFALL_SPEED_THRESHOLD: f32 = 160.0;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported trace version: expected {expected}, got {actual}")]
    Version { expected: u32, actual: u32 },
}

/// A recorded frame sequence: per frame, the player's authoritative fields
/// plus the discrete occurrences the host observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default = "default_trace_version")]
    pub trace_version: u32,
    #[serde(default)]
    pub frames: Vec<TraceFrame>,
}

fn default_trace_version() -> u32 {
    TRACE_VERSION
}

impl Trace {
    pub fn load_from_path(path: &Path) -> Result<Self, TraceError> {
        let raw = fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&raw)
    }

    pub fn parse_json(raw: &str) -> Result<Self, TraceError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let trace: Trace = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            let json_path = if json_path.is_empty() || json_path == "." {
                "(root)".to_string()
            } else {
                json_path
            };
            TraceError::Parse {
                json_path,
                source: error.into_inner(),
            }
        })?;
        if trace.trace_version != TRACE_VERSION {
            return Err(TraceError::Version {
                expected: TRACE_VERSION,
                actual: trace.trace_version,
            });
        }
        Ok(trace)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceFrame {
    /// Absent while the player entity does not exist (death, loading).
    pub player: Option<TracePlayer>,
    pub skipping_cutscene: bool,
    pub events: Vec<TraceEvent>,
}

/// Player fields at this frame, all defaulting to a grounded idle player so
/// recorded traces only carry what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracePlayer {
    pub mode: PlayerMode,
    pub speed_x: f32,
    pub speed_y: f32,
    pub move_x: i8,
    pub move_y: i8,
    pub position_x_px: i32,
    pub on_ground: bool,
    pub was_on_ground: bool,
    pub jump_held: bool,
    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub crouch_dash_pressed: bool,
    pub auto_jump: bool,
    pub var_jump_timer_active: bool,
    pub jump_grace_timer_active: bool,
    pub dash_cooldown_active: bool,
    pub dashes: u8,
    pub force_move_x_active: bool,
    pub wall_boost_timer_seconds: f32,
    pub in_control: bool,
    pub can_unduck: bool,
    pub ducking: bool,
    pub wall_jump_check_left: bool,
    pub wall_jump_check_right: bool,
    pub swim_jump_check: bool,
    pub water_below: bool,
    pub against_solid_left: bool,
    pub against_solid_right: bool,
    pub dash_dir_x: f32,
    pub dash_dir_y: f32,
}

impl Default for TracePlayer {
    fn default() -> Self {
        let view = PlayerView::empty();
        Self {
            mode: view.mode,
            speed_x: view.speed.x,
            speed_y: view.speed.y,
            move_x: view.move_x,
            move_y: view.move_y,
            position_x_px: view.position_x_px,
            on_ground: view.on_ground,
            was_on_ground: view.was_on_ground,
            jump_held: view.jump_held,
            jump_pressed: view.jump_pressed,
            dash_pressed: view.dash_pressed,
            crouch_dash_pressed: view.crouch_dash_pressed,
            auto_jump: view.auto_jump,
            var_jump_timer_active: view.var_jump_timer_active,
            jump_grace_timer_active: view.jump_grace_timer_active,
            dash_cooldown_active: view.dash_cooldown_active,
            dashes: view.dashes,
            force_move_x_active: view.force_move_x_active,
            wall_boost_timer_seconds: view.wall_boost_timer_seconds,
            in_control: view.in_control,
            can_unduck: view.can_unduck,
            ducking: view.ducking,
            wall_jump_check_left: view.wall_jump_check_left,
            wall_jump_check_right: view.wall_jump_check_right,
            swim_jump_check: view.swim_jump_check,
            water_below: view.water_below,
            against_solid_left: view.against_solid_left,
            against_solid_right: view.against_solid_right,
            dash_dir_x: view.dash_dir.x,
            dash_dir_y: view.dash_dir.y,
        }
    }
}

impl TracePlayer {
    fn to_view(&self) -> PlayerView {
        PlayerView {
            mode: self.mode,
            speed: Vec2 {
                x: self.speed_x,
                y: self.speed_y,
            },
            move_x: self.move_x,
            move_y: self.move_y,
            position_x_px: self.position_x_px,
            on_ground: self.on_ground,
            was_on_ground: self.was_on_ground,
            jump_held: self.jump_held,
            jump_pressed: self.jump_pressed,
            dash_pressed: self.dash_pressed,
            crouch_dash_pressed: self.crouch_dash_pressed,
            auto_jump: self.auto_jump,
            var_jump_timer_active: self.var_jump_timer_active,
            jump_grace_timer_active: self.jump_grace_timer_active,
            dash_cooldown_active: self.dash_cooldown_active,
            dashes: self.dashes,
            force_move_x_active: self.force_move_x_active,
            wall_boost_timer_seconds: self.wall_boost_timer_seconds,
            in_control: self.in_control,
            can_unduck: self.can_unduck,
            ducking: self.ducking,
            wall_jump_check_left: self.wall_jump_check_left,
            wall_jump_check_right: self.wall_jump_check_right,
            swim_jump_check: self.swim_jump_check,
            water_below: self.water_below,
            against_solid_left: self.against_solid_left,
            against_solid_right: self.against_solid_right,
            dash_dir: Vec2 {
                x: self.dash_dir_x,
                y: self.dash_dir_y,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceButton {
    Jump,
    Dash,
}

impl TraceButton {
    fn to_button(self) -> Button {
        match self {
            Self::Jump => Button::Jump,
            Self::Dash => Button::Dash,
        }
    }
}

/// A discrete occurrence inside one frame. The driver knows at which phase of
/// the frame each kind belongs; within a phase, list order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEvent {
    WallBoostActive,
    ButtonConsumed { button: TraceButton },
    Jump,
    WallJump { dir: i8 },
    GroundJumpImminent,
    BoostEnter,
    BoostUpdate,
    WallHit { dir: i8 },
    UltraBoost,
    Transition { direction_y: i8 },
    RoomLoad(RoomScope),
    PauseEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    PreStateMachine,
    StateMachine,
    Movement,
    Level,
}

impl TraceEvent {
    fn phase(&self) -> FramePhase {
        match self {
            Self::WallBoostActive => FramePhase::PreStateMachine,
            Self::ButtonConsumed { .. }
            | Self::Jump
            | Self::WallJump { .. }
            | Self::GroundJumpImminent
            | Self::BoostEnter
            | Self::BoostUpdate => FramePhase::StateMachine,
            Self::WallHit { .. } | Self::UltraBoost => FramePhase::Movement,
            Self::Transition { .. } | Self::RoomLoad(_) | Self::PauseEnd => FramePhase::Level,
        }
    }
}

/// One lint event as it surfaced during a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedLint {
    pub frame: u32,
    pub rule: RuleId,
    pub frames: u32,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    pub frames_run: u32,
    pub lints: Vec<ReportedLint>,
    pub commands_issued: u32,
    pub kills_requested: u32,
}

/// Replays a recorded trace through the detection engine, invoking the hooks
/// in the host pipeline's order, and collects everything that fired.
#[derive(Debug)]
pub struct ReplayDriver {
    linter: MovementLinter,
    director: ResponseDirector,
}

impl ReplayDriver {
    pub fn new(config: LintConfig) -> Self {
        Self {
            linter: MovementLinter::new(config),
            director: ResponseDirector::new(),
        }
    }

    pub fn run(&mut self, trace: &Trace) -> ReplayReport {
        let mut report = ReplayReport::default();
        for (index, frame) in trace.frames.iter().enumerate() {
            self.run_frame(index as u32, frame, &mut report);
        }
        report.frames_run = trace.frames.len() as u32;
        report
    }

    fn run_frame(&mut self, index: u32, frame: &TraceFrame, report: &mut ReplayReport) {
        self.director.begin_frame();
        self.linter.level_update_start(frame.skipping_cutscene);

        if let Some(player) = &frame.player {
            let view = player.to_view();
            self.linter.frame_start(&view);
            self.linter.landing_settled(&view);
            for event in frame.events.iter() {
                if event.phase() == FramePhase::PreStateMachine {
                    self.linter.wall_boost_active(&view);
                }
            }
            self.linter.before_state_machine(&view);
            // Swim and glide also read the horizontal input; the fast-fall
            // and jump-hold checks only exist in the normal state.
            if matches!(
                view.mode,
                PlayerMode::Normal | PlayerMode::Swim | PlayerMode::Glide
            ) {
                self.linter.move_x_consumed();
            }
            if view.mode == PlayerMode::Normal {
                self.linter
                    .fastfall_input_check(&view, FASTFALL_SPEED_THRESHOLD);
                self.linter.jump_hold_check(&view);
            }
            for event in frame.events.iter() {
                if event.phase() != FramePhase::StateMachine {
                    continue;
                }
                match event {
                    TraceEvent::ButtonConsumed { button } => {
                        self.linter.button_consumed(button.to_button())
                    }
                    TraceEvent::Jump => self.linter.jump_executed(),
                    TraceEvent::WallJump { dir } => self.linter.wall_jump_executed(*dir, &view),
                    TraceEvent::GroundJumpImminent => self.linter.ground_jump_imminent(&view),
                    TraceEvent::BoostEnter => self.linter.boost_entered(),
                    TraceEvent::BoostUpdate => self.linter.boost_update(&view),
                    _ => {}
                }
            }
            self.linter.after_state_machine();
            for event in frame.events.iter() {
                match event {
                    TraceEvent::WallHit { dir } => {
                        self.linter.wall_collided(*dir, view.position_x_px)
                    }
                    TraceEvent::UltraBoost => self.linter.ultra_boost_applied(),
                    _ => {}
                }
            }
            self.linter.frame_end(&view);
        }

        for event in frame.events.iter() {
            match event {
                TraceEvent::Transition { direction_y } => {
                    self.linter.level_transition(*direction_y)
                }
                TraceEvent::RoomLoad(scope) => self.linter.room_loaded(scope),
                TraceEvent::PauseEnd => self.linter.pause_ended(),
                _ => {}
            }
        }

        let resolved = self.linter.resolved_rules().clone();
        for lint in self.linter.drain_events() {
            let text = messages::format_warning(lint.singular_key, lint.plural_key, lint.frames);
            info!(
                frame = index,
                rule = lint.rule.name(),
                frames = lint.frames,
                text = %text,
                "lint_detected"
            );
            self.director.dispatch(&lint, resolved.responses_for(lint.rule));
            report.lints.push(ReportedLint {
                frame: index,
                rule: lint.rule,
                frames: lint.frames,
                text,
            });
        }
        report.commands_issued += self.director.drain_commands().len() as u32;
        if self.director.take_pending_kill() {
            report.kills_requested += 1;
        }
    }
}
