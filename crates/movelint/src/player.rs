use serde::{Deserialize, Serialize};

/// 2D vector in the host's coordinate system. The y axis points down: a
/// falling player has positive `y` speed, and an upward room transition has
/// `direction_y == -1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
}

/// The player state machine's mode at a given instant, as reported by the
/// host character controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    #[default]
    Normal,
    Climb,
    Dash,
    Swim,
    Boost,
    Glide,
    /// Scripted falling sequences. The host reports `in_control` as true
    /// here, but the player cannot actually act.
    ScriptedFall,
    Cutscene,
    Other,
}

/// Buttons whose press/buffer consumption the host reports to the linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Jump,
    Dash,
}

/// A plain copy of the host-authoritative player fields, taken at the instant
/// a hook is invoked. The host fills in whichever fields are final at that
/// point in its update; the linter only reads the fields each hook documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub mode: PlayerMode,
    pub speed: Vec2,
    /// Digital horizontal input after the host's dead-zone mapping: -1, 0, 1.
    pub move_x: i8,
    /// Digital vertical input: 1 is held down (fast-fall position).
    pub move_y: i8,
    /// Integer pixel x position, used to detect that the player has not left
    /// a wall they recently hit.
    pub position_x_px: i32,
    pub on_ground: bool,
    pub was_on_ground: bool,
    pub jump_held: bool,
    /// A buffered jump press is waiting to be consumed.
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
    pub dash_dir: Vec2,
}

impl PlayerView {
    /// A grounded, idle player in the normal mode with full control.
    pub fn empty() -> Self {
        Self {
            mode: PlayerMode::Normal,
            speed: Vec2::ZERO,
            move_x: 0,
            move_y: 0,
            position_x_px: 0,
            on_ground: true,
            was_on_ground: true,
            jump_held: false,
            jump_pressed: false,
            dash_pressed: false,
            crouch_dash_pressed: false,
            auto_jump: false,
            var_jump_timer_active: false,
            jump_grace_timer_active: false,
            dash_cooldown_active: false,
            dashes: 1,
            force_move_x_active: false,
            wall_boost_timer_seconds: 0.0,
            in_control: true,
            can_unduck: true,
            ducking: false,
            wall_jump_check_left: false,
            wall_jump_check_right: false,
            swim_jump_check: false,
            water_below: false,
            against_solid_left: false,
            against_solid_right: false,
            dash_dir: Vec2::ZERO,
        }
    }

    pub fn with_mode(mut self, mode: PlayerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_speed(mut self, x: f32, y: f32) -> Self {
        self.speed = Vec2 { x, y };
        self
    }

    pub fn with_move_x(mut self, move_x: i8) -> Self {
        self.move_x = move_x;
        self
    }

    pub fn with_move_y(mut self, move_y: i8) -> Self {
        self.move_y = move_y;
        self
    }

    pub fn with_position_x_px(mut self, position_x_px: i32) -> Self {
        self.position_x_px = position_x_px;
        self
    }

    pub fn with_ground(mut self, on_ground: bool, was_on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self.was_on_ground = was_on_ground;
        self
    }

    pub fn with_jump_held(mut self, jump_held: bool) -> Self {
        self.jump_held = jump_held;
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_dash_pressed(mut self, dash_pressed: bool) -> Self {
        self.dash_pressed = dash_pressed;
        self
    }

    pub fn with_crouch_dash_pressed(mut self, crouch_dash_pressed: bool) -> Self {
        self.crouch_dash_pressed = crouch_dash_pressed;
        self
    }

    pub fn with_auto_jump(mut self, auto_jump: bool) -> Self {
        self.auto_jump = auto_jump;
        self
    }

    pub fn with_var_jump_timer_active(mut self, active: bool) -> Self {
        self.var_jump_timer_active = active;
        self
    }

    pub fn with_jump_grace_timer_active(mut self, active: bool) -> Self {
        self.jump_grace_timer_active = active;
        self
    }

    pub fn with_dash_cooldown_active(mut self, active: bool) -> Self {
        self.dash_cooldown_active = active;
        self
    }

    pub fn with_dashes(mut self, dashes: u8) -> Self {
        self.dashes = dashes;
        self
    }

    pub fn with_force_move_x_active(mut self, active: bool) -> Self {
        self.force_move_x_active = active;
        self
    }

    pub fn with_wall_boost_timer_seconds(mut self, seconds: f32) -> Self {
        self.wall_boost_timer_seconds = seconds;
        self
    }

    pub fn with_in_control(mut self, in_control: bool) -> Self {
        self.in_control = in_control;
        self
    }

    pub fn with_ducking(mut self, ducking: bool, can_unduck: bool) -> Self {
        self.ducking = ducking;
        self.can_unduck = can_unduck;
        self
    }

    pub fn with_wall_jump_checks(mut self, left: bool, right: bool) -> Self {
        self.wall_jump_check_left = left;
        self.wall_jump_check_right = right;
        self
    }

    pub fn with_swim_jump_check(mut self, swim_jump_check: bool) -> Self {
        self.swim_jump_check = swim_jump_check;
        self
    }

    pub fn with_water_below(mut self, water_below: bool) -> Self {
        self.water_below = water_below;
        self
    }

    pub fn with_against_solid(mut self, left: bool, right: bool) -> Self {
        self.against_solid_left = left;
        self.against_solid_right = right;
        self
    }

    pub fn with_dash_dir(mut self, x: f32, y: f32) -> Self {
        self.dash_dir = Vec2 { x, y };
        self
    }
}
