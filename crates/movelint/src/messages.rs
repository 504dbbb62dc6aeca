//! Message keys and english templates for lint warnings. A lint event
//! carries a singular/plural key pair; dispatch picks the singular template
//! only when the measured frame count is exactly 1 and substitutes the count
//! into the `{}` placeholder otherwise.

pub const JUMP_RELEASE_JUMP_WARN_SINGULAR: &str = "jump_release_jump_warn_singular";
pub const JUMP_RELEASE_JUMP_WARN_PLURAL: &str = "jump_release_jump_warn_plural";
pub const JUMP_RELEASE_AUTO_JUMP_WARN_SINGULAR: &str = "jump_release_auto_jump_warn_singular";
pub const JUMP_RELEASE_AUTO_JUMP_WARN_PLURAL: &str = "jump_release_auto_jump_warn_plural";
pub const JUMP_RELEASE_DASH_WARN_SINGULAR: &str = "jump_release_dash_warn_singular";
pub const JUMP_RELEASE_DASH_WARN_PLURAL: &str = "jump_release_dash_warn_plural";
pub const JUMP_RELEASE_EXIT_WARN_SINGULAR: &str = "jump_release_exit_warn_singular";
pub const JUMP_RELEASE_EXIT_WARN_PLURAL: &str = "jump_release_exit_warn_plural";
pub const MOVE_AFTER_LAND_WARN_SINGULAR: &str = "move_after_land_warn_singular";
pub const MOVE_AFTER_LAND_WARN_PLURAL: &str = "move_after_land_warn_plural";
pub const MOVE_AFTER_GAIN_CONTROL_WARN_SINGULAR: &str = "move_after_gain_control_warn_singular";
pub const MOVE_AFTER_GAIN_CONTROL_WARN_PLURAL: &str = "move_after_gain_control_warn_plural";
pub const DASH_AFTER_UP_ENTRY_WARN_SINGULAR: &str = "dash_after_up_entry_warn_singular";
pub const DASH_AFTER_UP_ENTRY_WARN_PLURAL: &str = "dash_after_up_entry_warn_plural";
pub const RELEASE_FORWARD_BEFORE_DASH_WARN_SINGULAR: &str =
    "release_forward_before_dash_warn_singular";
pub const RELEASE_FORWARD_BEFORE_DASH_WARN_PLURAL: &str =
    "release_forward_before_dash_warn_plural";
pub const RELEASE_FORWARD_BEFORE_EXIT_WARN_SINGULAR: &str =
    "release_forward_before_exit_warn_singular";
pub const RELEASE_FORWARD_BEFORE_EXIT_WARN_PLURAL: &str =
    "release_forward_before_exit_warn_plural";
pub const TURN_BEFORE_WALLKICK_WARN_SINGULAR: &str = "turn_before_wallkick_warn_singular";
pub const TURN_BEFORE_WALLKICK_WARN_PLURAL: &str = "turn_before_wallkick_warn_plural";
pub const FASTFALL_RELEASE_BEFORE_DASH_WARN_SINGULAR: &str =
    "fastfall_release_before_dash_warn_singular";
pub const FASTFALL_RELEASE_BEFORE_DASH_WARN_PLURAL: &str =
    "fastfall_release_before_dash_warn_plural";
pub const SHORT_WALLBOOST_WARN_SINGULAR: &str = "short_wallboost_warn_singular";
pub const SHORT_WALLBOOST_WARN_PLURAL: &str = "short_wallboost_warn_plural";
pub const BUFFERED_ULTRA_WARN: &str = "buffered_ultra_warn";
pub const FAST_BUBBLE_WARN_SINGULAR: &str = "fast_bubble_warn_singular";
pub const FAST_BUBBLE_WARN_PLURAL: &str = "fast_bubble_warn_plural";

/// Look up the english template for a message key. Unknown keys fall back to
/// the key itself so a mismatched configuration never panics mid-frame.
pub fn template(key: &str) -> &str {
    match key {
        JUMP_RELEASE_JUMP_WARN_SINGULAR => "Released jump 1 frame too early before jumping",
        JUMP_RELEASE_JUMP_WARN_PLURAL => "Released jump {} frames too early before jumping",
        JUMP_RELEASE_AUTO_JUMP_WARN_SINGULAR => "Released jump 1 frame before an auto-jump",
        JUMP_RELEASE_AUTO_JUMP_WARN_PLURAL => "Released jump {} frames before an auto-jump",
        JUMP_RELEASE_DASH_WARN_SINGULAR => "Released jump 1 frame too early before dashing",
        JUMP_RELEASE_DASH_WARN_PLURAL => "Released jump {} frames too early before dashing",
        JUMP_RELEASE_EXIT_WARN_SINGULAR => "Released jump 1 frame too early before the exit",
        JUMP_RELEASE_EXIT_WARN_PLURAL => "Released jump {} frames too early before the exit",
        MOVE_AFTER_LAND_WARN_SINGULAR => "Waited 1 frame after landing before moving",
        MOVE_AFTER_LAND_WARN_PLURAL => "Waited {} frames after landing before moving",
        MOVE_AFTER_GAIN_CONTROL_WARN_SINGULAR => "Waited 1 frame after gaining control",
        MOVE_AFTER_GAIN_CONTROL_WARN_PLURAL => "Waited {} frames after gaining control",
        DASH_AFTER_UP_ENTRY_WARN_SINGULAR => "Dashed 1 frame late after the upward entry",
        DASH_AFTER_UP_ENTRY_WARN_PLURAL => "Dashed {} frames late after the upward entry",
        RELEASE_FORWARD_BEFORE_DASH_WARN_SINGULAR => "Released forward 1 frame before dashing",
        RELEASE_FORWARD_BEFORE_DASH_WARN_PLURAL => "Released forward {} frames before dashing",
        RELEASE_FORWARD_BEFORE_EXIT_WARN_SINGULAR => "Released forward 1 frame before the exit",
        RELEASE_FORWARD_BEFORE_EXIT_WARN_PLURAL => "Released forward {} frames before the exit",
        TURN_BEFORE_WALLKICK_WARN_SINGULAR => "Turned 1 frame too early before the wall-kick",
        TURN_BEFORE_WALLKICK_WARN_PLURAL => "Turned {} frames too early before the wall-kick",
        FASTFALL_RELEASE_BEFORE_DASH_WARN_SINGULAR => {
            "Dropped the fast-fall input 1 frame before dashing"
        }
        FASTFALL_RELEASE_BEFORE_DASH_WARN_PLURAL => {
            "Dropped the fast-fall input {} frames before dashing"
        }
        SHORT_WALLBOOST_WARN_SINGULAR => "Left the wall boost after 1 frame",
        SHORT_WALLBOOST_WARN_PLURAL => "Left the wall boost after {} frames",
        BUFFERED_ULTRA_WARN => "Buffered jump would have eaten an ultra",
        FAST_BUBBLE_WARN_SINGULAR => "Dashed out of the bubble 1 frame after entering",
        FAST_BUBBLE_WARN_PLURAL => "Dashed out of the bubble {} frames after entering",
        other => other,
    }
}

/// Format the warning text for a lint event's key pair and frame count.
pub fn format_warning(singular_key: &str, plural_key: &str, frames: u32) -> String {
    if frames == 1 {
        template(singular_key).to_string()
    } else {
        template(plural_key).replace("{}", &frames.to_string())
    }
}
