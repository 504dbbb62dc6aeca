use serde::{Deserialize, Serialize};

use crate::config::MAX_SHORT_DURATION_FRAMES;
use crate::player::{PlayerMode, Vec2};

/// The canonical "timer not running" value. One more than the largest
/// configurable threshold, so it compares as "too late" against every rule.
pub const BEYOND_SHORT_DURATION_FRAMES: u32 = MAX_SHORT_DURATION_FRAMES + 1;

/// Every counter and flag the detection engine carries across frames, one
/// sub-record per heuristic. The whole record is copied out and back in as a
/// unit for save-states; adding a field here automatically includes it in the
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionState {
    // General frame tracking
    pub frame_start_player_mode: PlayerMode,
    pub room_load_just_happened: bool,
    pub on_ground: bool,

    // Jump release
    pub jump_release_frames: u32,
    pub jump_release_matters: bool,
    pub auto_jump_was_active: bool,

    // Move after land
    pub frames_after_land: u32,
    pub ultra_since_landing: bool,
    pub can_dash_this_frame: bool,
    pub could_dash_last_frame: bool,

    // Move after gaining control
    pub was_in_control: bool,
    pub in_control_frames: u32,
    pub was_skipping_cutscene: bool,
    pub can_jump_this_frame: bool,
    pub could_jump_last_frame: bool,

    // Dash after upward room entry
    pub frames_since_up_transition: u32,
    pub up_transition_just_happened: bool,

    // Fast bubble
    pub could_dash_before_bubble: bool,
    pub frames_before_fast_bubble: u32,

    // Release-forward family
    pub frame_start_player_speed: Vec2,
    pub force_move_x_active: bool,
    pub last_move_x: i8,
    pub last_move_x_was_forward: bool,
    pub release_forward_frames: u32,
    pub move_x_used_this_frame: bool,
    pub release_forward_matters: bool,
    pub last_wall_hit_dir: i8,
    pub last_wall_hit_player_x: i32,
    pub held_toward_last_wall_hit: bool,

    // Fast-fall release
    pub fastfall_checked_this_frame: bool,
    pub fastfall_checked_last_frame: bool,
    pub move_y_is_fastfall: bool,
    pub fastfall_move_y_frames: u32,

    // Buffered ultra
    pub ultra_last_frame: bool,
}

impl Default for DetectionState {
    fn default() -> Self {
        Self {
            frame_start_player_mode: PlayerMode::Normal,
            room_load_just_happened: false,
            on_ground: false,

            jump_release_frames: BEYOND_SHORT_DURATION_FRAMES,
            jump_release_matters: false,
            auto_jump_was_active: false,

            frames_after_land: BEYOND_SHORT_DURATION_FRAMES,
            ultra_since_landing: false,
            can_dash_this_frame: true,
            could_dash_last_frame: true,

            was_in_control: false,
            in_control_frames: 0,
            was_skipping_cutscene: false,
            can_jump_this_frame: true,
            could_jump_last_frame: true,

            frames_since_up_transition: BEYOND_SHORT_DURATION_FRAMES,
            up_transition_just_happened: false,

            could_dash_before_bubble: true,
            frames_before_fast_bubble: 0,

            frame_start_player_speed: Vec2::ZERO,
            force_move_x_active: false,
            last_move_x: 0,
            last_move_x_was_forward: false,
            release_forward_frames: BEYOND_SHORT_DURATION_FRAMES,
            move_x_used_this_frame: false,
            release_forward_matters: false,
            last_wall_hit_dir: 0,
            last_wall_hit_player_x: i32::MIN,
            held_toward_last_wall_hit: false,

            fastfall_checked_this_frame: false,
            fastfall_checked_last_frame: false,
            move_y_is_fastfall: false,
            fastfall_move_y_frames: 0,

            ultra_last_frame: false,
        }
    }
}

/// An opaque whole-record copy of [`DetectionState`], produced by
/// `MovementLinter::capture_snapshot` and accepted back by
/// `restore_snapshot`. Restoring a snapshot can never desynchronize
/// individual sub-records because there is no partial form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSnapshot(pub(crate) DetectionState);
