use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::RuleId;

use super::{
    normalize_exit_rule, normalize_frames_rule, normalize_land_rule, normalize_ultra_rule,
    ExitRule, FramesRule, LandRule, LintConfig, ResponseSpec, UltraRule,
    MAX_SHORT_DURATION_FRAMES, MAX_SHORT_WALLBOOST_FRAMES,
};

/// Identifies one room in the campaign: level group, chapter plus its
/// variant, and the room name inside the chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomScope {
    pub level_group: String,
    pub chapter: String,
    #[serde(default)]
    pub variant: u8,
    pub room: String,
}

impl RoomScope {
    pub fn new(level_group: &str, chapter: &str, variant: u8, room: &str) -> Self {
        Self {
            level_group: level_group.to_string(),
            chapter: chapter.to_string(),
            variant,
            room: room.to_string(),
        }
    }

    fn sort_key(&self) -> (&str, &str, u8, &str) {
        (
            self.level_group.as_str(),
            self.chapter.as_str(),
            self.variant,
            self.room.as_str(),
        )
    }
}

impl std::fmt::Display for RoomScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}+{}/{}",
            self.level_group, self.chapter, self.variant, self.room
        )
    }
}

/// A rule override slot. The settings only take effect while `active` is
/// true; an inactive slot falls back to the base rule, so a rule can be
/// staged in an override set without applying yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overridable<T> {
    #[serde(default)]
    pub active: bool,
    pub settings: T,
}

/// Per-rule override slots; absent slots fall back to the base rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideRuleSet {
    pub jump_release_jump: Option<Overridable<FramesRule>>,
    pub jump_release_dash: Option<Overridable<FramesRule>>,
    pub jump_release_exit: Option<Overridable<ExitRule>>,
    pub move_after_land: Option<Overridable<LandRule>>,
    pub move_after_gain_control: Option<Overridable<FramesRule>>,
    pub dash_after_up_entry: Option<Overridable<FramesRule>>,
    pub release_forward_before_dash: Option<Overridable<FramesRule>>,
    pub release_forward_before_exit: Option<Overridable<FramesRule>>,
    pub turn_before_wallkick: Option<Overridable<FramesRule>>,
    pub fastfall_release_before_dash: Option<Overridable<FramesRule>>,
    pub short_wallboost: Option<Overridable<FramesRule>>,
    pub buffered_ultra: Option<Overridable<UltraRule>>,
    pub fast_bubble: Option<Overridable<FramesRule>>,
}

/// One location-scoped override: a room plus the rule slots it replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    #[serde(flatten)]
    pub scope: RoomScope,
    #[serde(default)]
    pub rules: OverrideRuleSet,
}

impl OverrideEntry {
    pub fn matches(&self, location: &RoomScope) -> bool {
        self.scope == *location
    }

    pub(crate) fn normalize(&mut self) {
        let rules = &mut self.rules;
        for slot in [
            &mut rules.jump_release_jump,
            &mut rules.jump_release_dash,
            &mut rules.move_after_gain_control,
            &mut rules.dash_after_up_entry,
            &mut rules.release_forward_before_dash,
            &mut rules.release_forward_before_exit,
            &mut rules.turn_before_wallkick,
            &mut rules.fastfall_release_before_dash,
            &mut rules.fast_bubble,
        ] {
            if let Some(overridable) = slot {
                normalize_frames_rule("override", &mut overridable.settings, MAX_SHORT_DURATION_FRAMES);
            }
        }
        if let Some(overridable) = &mut rules.short_wallboost {
            normalize_frames_rule("override", &mut overridable.settings, MAX_SHORT_WALLBOOST_FRAMES);
        }
        if let Some(overridable) = &mut rules.jump_release_exit {
            normalize_exit_rule(&mut overridable.settings);
        }
        if let Some(overridable) = &mut rules.move_after_land {
            normalize_land_rule(&mut overridable.settings);
        }
        if let Some(overridable) = &mut rules.buffered_ultra {
            normalize_ultra_rule(&mut overridable.settings);
        }
    }
}

/// The effective per-rule settings for the current location, cached between
/// location changes and pause-ends. The engine only ever reads this.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRules {
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
}

fn pick<T: Clone>(base: &T, slot: &Option<Overridable<T>>) -> T {
    match slot {
        Some(overridable) if overridable.active => overridable.settings.clone(),
        _ => base.clone(),
    }
}

impl ResolvedRules {
    /// Resolve the effective rules for `location`. At most one override entry
    /// matches; within it every slot opts in independently. An override
    /// naming a location that never occurs simply never matches.
    pub fn resolve(config: &LintConfig, location: Option<&RoomScope>) -> Self {
        let entry = location.and_then(|scope| {
            config
                .overrides
                .iter()
                .find(|candidate| candidate.matches(scope))
        });
        let no_overrides = OverrideRuleSet::default();
        let rules = match entry {
            Some(entry) => {
                debug!(scope = %entry.scope, "overrides_resolved");
                &entry.rules
            }
            None => &no_overrides,
        };
        Self {
            enabled: config.enabled,
            jump_release_jump: pick(&config.jump_release_jump, &rules.jump_release_jump),
            jump_release_dash: pick(&config.jump_release_dash, &rules.jump_release_dash),
            jump_release_exit: pick(&config.jump_release_exit, &rules.jump_release_exit),
            move_after_land: pick(&config.move_after_land, &rules.move_after_land),
            move_after_gain_control: pick(
                &config.move_after_gain_control,
                &rules.move_after_gain_control,
            ),
            dash_after_up_entry: pick(&config.dash_after_up_entry, &rules.dash_after_up_entry),
            release_forward_before_dash: pick(
                &config.release_forward_before_dash,
                &rules.release_forward_before_dash,
            ),
            release_forward_before_exit: pick(
                &config.release_forward_before_exit,
                &rules.release_forward_before_exit,
            ),
            turn_before_wallkick: pick(&config.turn_before_wallkick, &rules.turn_before_wallkick),
            fastfall_release_before_dash: pick(
                &config.fastfall_release_before_dash,
                &rules.fastfall_release_before_dash,
            ),
            short_wallboost: pick(&config.short_wallboost, &rules.short_wallboost),
            buffered_ultra: pick(&config.buffered_ultra, &rules.buffered_ultra),
            fast_bubble: pick(&config.fast_bubble, &rules.fast_bubble),
        }
    }

    /// The response list dispatch should perform when `rule` fires.
    pub fn responses_for(&self, rule: RuleId) -> &[ResponseSpec] {
        match rule {
            RuleId::JumpReleaseJump => &self.jump_release_jump.responses,
            RuleId::JumpReleaseDash => &self.jump_release_dash.responses,
            RuleId::JumpReleaseExit => &self.jump_release_exit.responses,
            RuleId::MoveAfterLand => &self.move_after_land.responses,
            RuleId::MoveAfterGainControl => &self.move_after_gain_control.responses,
            RuleId::DashAfterUpEntry => &self.dash_after_up_entry.responses,
            RuleId::ReleaseForwardBeforeDash => &self.release_forward_before_dash.responses,
            RuleId::ReleaseForwardBeforeExit => &self.release_forward_before_exit.responses,
            RuleId::TurnBeforeWallkick => &self.turn_before_wallkick.responses,
            RuleId::FastfallReleaseBeforeDash => &self.fastfall_release_before_dash.responses,
            RuleId::ShortWallboost => &self.short_wallboost.responses,
            RuleId::BufferedUltra => &self.buffered_ultra.responses,
            RuleId::FastBubble => &self.fast_bubble.responses,
        }
    }
}

/// Order override entries for display: entries whose location still exists
/// first, each group lexicographic, dangling locations last.
pub fn sorted_for_display<'a>(
    entries: &'a [OverrideEntry],
    location_exists: impl Fn(&RoomScope) -> bool,
) -> Vec<&'a OverrideEntry> {
    let mut sorted: Vec<&OverrideEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        let a_dangling = !location_exists(&a.scope);
        let b_dangling = !location_exists(&b.scope);
        a_dangling
            .cmp(&b_dangling)
            .then_with(|| a.scope.sort_key().cmp(&b.scope.sort_key()))
    });
    sorted
}
