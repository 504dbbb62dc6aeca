//! Per-frame detection of movement-tech near-misses for a 2D platformer,
//! plus the command contract toward the host's presentation layer. The host
//! drives everything: it calls the hooks on [`MovementLinter`] at fixed
//! instants of its frame pipeline and forwards the resulting events to a
//! [`ResponseDirector`].

pub mod config;
pub mod detect;
pub mod events;
pub mod messages;
pub mod player;
pub mod response;
pub mod state;

pub use config::{
    BufferedUltraMode, ConfigError, ExitRule, FramesRule, HazardKind, LandRule, LintConfig,
    MoveAfterLandMode, Overridable, OverrideEntry, OverrideRuleSet, ResolvedRules, ResponseSpec,
    RoomScope, SoundCue, TransitionDirection, UltraRule, CONFIG_VERSION,
    MAX_SHORT_DURATION_FRAMES, MAX_SHORT_WALLBOOST_FRAMES,
};
pub use detect::MovementLinter;
pub use events::{LintEvent, LintEventBus, RuleId};
pub use player::{Button, PlayerMode, PlayerView, Vec2};
pub use response::{ResponseCommand, ResponseDirector};
pub use state::{DetectionSnapshot, DetectionState, BEYOND_SHORT_DURATION_FRAMES};
