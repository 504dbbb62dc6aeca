use serde::{Deserialize, Serialize};

/// Identity of a lint heuristic. Doubles as the key for per-rule
/// configuration slots and override resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    JumpReleaseJump,
    JumpReleaseDash,
    JumpReleaseExit,
    MoveAfterLand,
    MoveAfterGainControl,
    DashAfterUpEntry,
    ReleaseForwardBeforeDash,
    ReleaseForwardBeforeExit,
    TurnBeforeWallkick,
    FastfallReleaseBeforeDash,
    ShortWallboost,
    BufferedUltra,
    FastBubble,
}

impl RuleId {
    pub fn name(self) -> &'static str {
        match self {
            Self::JumpReleaseJump => "jump_release_jump",
            Self::JumpReleaseDash => "jump_release_dash",
            Self::JumpReleaseExit => "jump_release_exit",
            Self::MoveAfterLand => "move_after_land",
            Self::MoveAfterGainControl => "move_after_gain_control",
            Self::DashAfterUpEntry => "dash_after_up_entry",
            Self::ReleaseForwardBeforeDash => "release_forward_before_dash",
            Self::ReleaseForwardBeforeExit => "release_forward_before_exit",
            Self::TurnBeforeWallkick => "turn_before_wallkick",
            Self::FastfallReleaseBeforeDash => "fastfall_release_before_dash",
            Self::ShortWallboost => "short_wallboost",
            Self::BufferedUltra => "buffered_ultra",
            Self::FastBubble => "fast_bubble",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected near-miss. Ephemeral: produced by the engine, drained by the
/// frame driver and handed to dispatch the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintEvent {
    pub rule: RuleId,
    pub singular_key: &'static str,
    pub plural_key: &'static str,
    /// Measured frame count. 1 selects the singular message; everything else,
    /// including 0, the plural one.
    pub frames: u32,
}

/// Per-frame buffer of lint events. The engine only ever appends; the driver
/// drains it once per frame and forwards the events to dispatch.
#[derive(Debug, Default)]
pub struct LintEventBus {
    current_frame_events: Vec<LintEvent>,
    total_emitted: u32,
}

impl LintEventBus {
    pub fn emit(&mut self, event: LintEvent) {
        self.total_emitted = self.total_emitted.saturating_add(1);
        self.current_frame_events.push(event);
    }

    pub fn emitted_this_frame(&self) -> &[LintEvent] {
        &self.current_frame_events
    }

    pub fn drain(&mut self) -> Vec<LintEvent> {
        std::mem::take(&mut self.current_frame_events)
    }

    pub fn total_emitted(&self) -> u32 {
        self.total_emitted
    }
}
