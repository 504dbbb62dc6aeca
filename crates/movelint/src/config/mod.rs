use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod overrides;

pub use overrides::{OverrideEntry, OverrideRuleSet, Overridable, ResolvedRules, RoomScope};

/// Upper bound for every window threshold, in frames.
pub const MAX_SHORT_DURATION_FRAMES: u32 = 99;
/// The wall boost only lasts this many frames, so the short-wallboost rule
/// has a narrower range.
pub const MAX_SHORT_WALLBOOST_FRAMES: u32 = 11;
/// A rule may carry at most this many response descriptors.
pub const MAX_RESPONSES_PER_RULE: usize = 3;

pub const CONFIG_VERSION: u32 = 1;

const DEFAULT_TOOLTIP_FRAMES: u32 = 120;
const DEFAULT_TINT_FRAMES: u32 = 30;
const DEFAULT_MEMORIAL_CONSECUTIVE: u32 = 3;

// =====================================================================
// Rule mode enums

/// Which room-exit directions the jump-release-before-exit rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    #[default]
    UpOnly,
    NotDown,
    Any,
}

impl TransitionDirection {
    /// Whether an exit with the given vertical direction counts.
    /// `direction_y == -1` is an upward transition.
    pub fn accepts(self, direction_y: i8) -> bool {
        match self {
            Self::UpOnly => direction_y == -1,
            Self::NotDown => direction_y <= 0,
            Self::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAfterLandMode {
    Disabled,
    #[default]
    DashOnly,
    DashOrJump,
    JumpOnly,
}

impl MoveAfterLandMode {
    pub fn counts_dash(self) -> bool {
        matches!(self, Self::DashOnly | Self::DashOrJump)
    }

    pub fn counts_jump(self) -> bool {
        matches!(self, Self::DashOrJump | Self::JumpOnly)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferedUltraMode {
    Disabled,
    #[default]
    OnlyWhenMattered,
    Always,
}

// =====================================================================
// Response descriptors

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Caw,
    Boop,
    DingDong,
    Bumper,
    Spring,
    Secret,
    Bonk,
    Hey,
    GitGud,
    Uhoh,
    Alert,
    Boom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Spikes,
    Seeker,
}

/// One response the dispatch layer should perform when a rule fires.
/// Consumed opaquely by dispatch; the engine never inspects these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSpec {
    Tooltip {
        #[serde(default = "default_tooltip_frames")]
        duration_frames: u32,
    },
    Dialog {
        speaker: String,
    },
    Kill,
    Sound {
        cue: SoundCue,
    },
    Tint {
        #[serde(default = "default_tint_frames")]
        frames: u32,
    },
    Reflex,
    Hazard {
        kind: HazardKind,
    },
    /// Fans out into one of every other response kind. Fires at most once per
    /// frame, and only after `after_consecutive` back-to-back triggers of the
    /// same rule.
    Memorial {
        #[serde(default = "default_memorial_consecutive")]
        after_consecutive: u32,
    },
}

fn default_tooltip_frames() -> u32 {
    DEFAULT_TOOLTIP_FRAMES
}

fn default_tint_frames() -> u32 {
    DEFAULT_TINT_FRAMES
}

fn default_memorial_consecutive() -> u32 {
    DEFAULT_MEMORIAL_CONSECUTIVE
}

fn default_responses() -> Vec<ResponseSpec> {
    vec![ResponseSpec::Tooltip {
        duration_frames: DEFAULT_TOOLTIP_FRAMES,
    }]
}

fn default_true() -> bool {
    true
}

// =====================================================================
// Per-rule settings

/// Settings shape shared by the plain enable-plus-window rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramesRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub frames: u32,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
}

impl FramesRule {
    fn enabled_with_frames(frames: u32) -> Self {
        Self {
            enabled: true,
            frames,
            responses: default_responses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub direction: TransitionDirection,
    #[serde(default)]
    pub frames: u32,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
}

impl Default for ExitRule {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: TransitionDirection::UpOnly,
            frames: 2,
            responses: default_responses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandRule {
    #[serde(default)]
    pub mode: MoveAfterLandMode,
    #[serde(default = "default_true")]
    pub ignore_ultras: bool,
    #[serde(default)]
    pub frames: u32,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
}

impl Default for LandRule {
    fn default() -> Self {
        Self {
            mode: MoveAfterLandMode::DashOnly,
            ignore_ultras: true,
            frames: 3,
            responses: default_responses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraRule {
    #[serde(default)]
    pub mode: BufferedUltraMode,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
}

impl Default for UltraRule {
    fn default() -> Self {
        Self {
            mode: BufferedUltraMode::OnlyWhenMattered,
            responses: default_responses(),
        }
    }
}

// =====================================================================
// The whole configuration

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub config_version: u32,
    pub enabled: bool,
    pub jump_release_jump: FramesRule,
    pub jump_release_dash: FramesRule,
    pub jump_release_exit: ExitRule,
    pub move_after_land: LandRule,
    pub move_after_gain_control: FramesRule,
    pub dash_after_up_entry: FramesRule,
    pub release_forward_before_dash: FramesRule,
    pub release_forward_before_exit: FramesRule,
    pub turn_before_wallkick: FramesRule,
    pub fastfall_release_before_dash: FramesRule,
    pub short_wallboost: FramesRule,
    pub buffered_ultra: UltraRule,
    pub fast_bubble: FramesRule,
    pub overrides: Vec<OverrideEntry>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            enabled: true,
            jump_release_jump: FramesRule::enabled_with_frames(2),
            jump_release_dash: FramesRule::enabled_with_frames(2),
            jump_release_exit: ExitRule::default(),
            move_after_land: LandRule::default(),
            move_after_gain_control: FramesRule::enabled_with_frames(3),
            dash_after_up_entry: FramesRule::enabled_with_frames(3),
            release_forward_before_dash: FramesRule::enabled_with_frames(4),
            release_forward_before_exit: FramesRule::enabled_with_frames(4),
            turn_before_wallkick: FramesRule::enabled_with_frames(4),
            fastfall_release_before_dash: FramesRule::enabled_with_frames(4),
            short_wallboost: FramesRule::enabled_with_frames(2),
            buffered_ultra: UltraRule::default(),
            fast_bubble: FramesRule::enabled_with_frames(2),
            overrides: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read lint config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lint config at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported lint config version: expected {expected}, got {actual}")]
    Version { expected: u32, actual: u32 },
    #[error("failed to encode lint config: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write lint config '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LintConfig {
    /// Load, version-check and normalize a config file. Out-of-range values
    /// are clamped, never fatal.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_json(&raw)?;
        if config.config_version != CONFIG_VERSION {
            return Err(ConfigError::Version {
                expected: CONFIG_VERSION,
                actual: config.config_version,
            });
        }
        Ok(config.validated())
    }

    pub fn parse_json(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, Self>(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            let json_path = if json_path.is_empty() || json_path == "." {
                "(root)".to_string()
            } else {
                json_path
            };
            ConfigError::Parse {
                json_path,
                source: error.into_inner(),
            }
        })
    }

    pub fn store_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Clamp every threshold into its legal range and normalize response
    /// lists, for the base rules and every override slot.
    pub fn validated(mut self) -> Self {
        normalize_frames_rule("jump_release_jump", &mut self.jump_release_jump, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("jump_release_dash", &mut self.jump_release_dash, MAX_SHORT_DURATION_FRAMES);
        normalize_exit_rule(&mut self.jump_release_exit);
        normalize_land_rule(&mut self.move_after_land);
        normalize_frames_rule("move_after_gain_control", &mut self.move_after_gain_control, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("dash_after_up_entry", &mut self.dash_after_up_entry, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("release_forward_before_dash", &mut self.release_forward_before_dash, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("release_forward_before_exit", &mut self.release_forward_before_exit, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("turn_before_wallkick", &mut self.turn_before_wallkick, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("fastfall_release_before_dash", &mut self.fastfall_release_before_dash, MAX_SHORT_DURATION_FRAMES);
        normalize_frames_rule("short_wallboost", &mut self.short_wallboost, MAX_SHORT_WALLBOOST_FRAMES);
        normalize_responses("buffered_ultra", &mut self.buffered_ultra.responses);
        normalize_frames_rule("fast_bubble", &mut self.fast_bubble, MAX_SHORT_DURATION_FRAMES);
        for entry in &mut self.overrides {
            entry.normalize();
        }
        self
    }
}

fn clamp_frames(rule: &'static str, frames: u32, max: u32) -> u32 {
    let clamped = frames.clamp(1, max);
    if clamped != frames {
        warn!(rule, frames, clamped, "config_frames_clamped");
    }
    clamped
}

fn normalize_responses(rule: &'static str, responses: &mut Vec<ResponseSpec>) {
    if responses.is_empty() {
        responses.extend(default_responses());
    } else if responses.len() > MAX_RESPONSES_PER_RULE {
        warn!(
            rule,
            configured = responses.len(),
            kept = MAX_RESPONSES_PER_RULE,
            "config_responses_truncated"
        );
        responses.truncate(MAX_RESPONSES_PER_RULE);
    }
}

pub(crate) fn normalize_frames_rule(rule: &'static str, settings: &mut FramesRule, max: u32) {
    settings.frames = clamp_frames(rule, settings.frames, max);
    normalize_responses(rule, &mut settings.responses);
}

pub(crate) fn normalize_exit_rule(settings: &mut ExitRule) {
    settings.frames = clamp_frames("jump_release_exit", settings.frames, MAX_SHORT_DURATION_FRAMES);
    normalize_responses("jump_release_exit", &mut settings.responses);
}

pub(crate) fn normalize_land_rule(settings: &mut LandRule) {
    settings.frames = clamp_frames("move_after_land", settings.frames, MAX_SHORT_DURATION_FRAMES);
    normalize_responses("move_after_land", &mut settings.responses);
}

pub(crate) fn normalize_ultra_rule(settings: &mut UltraRule) {
    normalize_responses("buffered_ultra", &mut settings.responses);
}
