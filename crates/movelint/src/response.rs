use tracing::{debug, info};

use crate::config::{HazardKind, ResponseSpec, SoundCue};
use crate::events::{LintEvent, RuleId};
use crate::messages;

const TOOLTIP_ROW_COUNT: u32 = 32;
const MEMORIAL_SPEAKER: &str = "memorial";
const MEMORIAL_TOOLTIP_FRAMES: u32 = 120;
const MEMORIAL_TINT_FRAMES: u32 = 30;

/// A presentation request for the host. The director only decides *what*
/// should happen; rendering, audio and entity spawning stay host-side.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseCommand {
    ShowTooltip {
        row: u32,
        text: String,
        duration_frames: u32,
    },
    ShowDialog {
        speaker: String,
        text: String,
    },
    PlaySound {
        cue: SoundCue,
    },
    TintPlayer {
        frames: u32,
    },
    PlayReflex,
    SpawnHazard {
        kind: HazardKind,
    },
}

/// On-screen tooltip rows. Rows are taken lowest-first and released once
/// their tooltip expires; when every row is occupied a new tooltip has
/// nowhere to go and is dropped.
#[derive(Debug)]
struct TooltipRows {
    /// 1 bits are free rows, 0 bits occupied.
    free_mask: u32,
    remaining_frames: [u32; TOOLTIP_ROW_COUNT as usize],
}

impl Default for TooltipRows {
    fn default() -> Self {
        Self {
            free_mask: u32::MAX,
            remaining_frames: [0; TOOLTIP_ROW_COUNT as usize],
        }
    }
}

impl TooltipRows {
    fn tick(&mut self) {
        for row in 0..TOOLTIP_ROW_COUNT {
            if self.free_mask & (1 << row) != 0 {
                continue;
            }
            let remaining = &mut self.remaining_frames[row as usize];
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.free_mask |= 1 << row;
            }
        }
    }

    fn allocate(&mut self, duration_frames: u32) -> Option<u32> {
        if self.free_mask == 0 {
            return None;
        }
        let row = self.free_mask.trailing_zeros();
        self.free_mask &= !(1 << row);
        self.remaining_frames[row as usize] = duration_frames.max(1);
        Some(row)
    }
}

#[derive(Debug, Default)]
struct MemorialGate {
    last_rule: Option<RuleId>,
    consecutive: u32,
    fired_this_frame: bool,
}

impl MemorialGate {
    fn record(&mut self, rule: RuleId) {
        if self.last_rule == Some(rule) {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.last_rule = Some(rule);
            self.consecutive = 1;
        }
    }
}

/// Default implementation of the response dispatch boundary: formats the
/// warning text, walks the rule's configured response list and turns it into
/// [`ResponseCommand`]s plus the pending-kill flag. Failures to present
/// anything are the host's problem; nothing here reaches back into the
/// engine.
#[derive(Debug, Default)]
pub struct ResponseDirector {
    commands: Vec<ResponseCommand>,
    pending_kill: bool,
    tooltip_rows: TooltipRows,
    memorial: MemorialGate,
}

impl ResponseDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance tooltip lifetimes and re-open the once-per-frame memorial
    /// gate. Call once per simulated frame, before dispatching that frame's
    /// events.
    pub fn begin_frame(&mut self) {
        self.memorial.fired_this_frame = false;
        self.tooltip_rows.tick();
    }

    /// Perform every configured response for one lint event.
    pub fn dispatch(&mut self, event: &LintEvent, responses: &[ResponseSpec]) {
        self.memorial.record(event.rule);
        let text = messages::format_warning(event.singular_key, event.plural_key, event.frames);
        info!(rule = event.rule.name(), frames = event.frames, "lint_response");
        for spec in responses {
            self.perform(spec, &text);
        }
    }

    fn perform(&mut self, spec: &ResponseSpec, text: &str) {
        match spec {
            ResponseSpec::Tooltip { duration_frames } => {
                match self.tooltip_rows.allocate(*duration_frames) {
                    Some(row) => self.commands.push(ResponseCommand::ShowTooltip {
                        row,
                        text: text.to_string(),
                        duration_frames: *duration_frames,
                    }),
                    None => debug!("tooltip_rows_full"),
                }
            }
            ResponseSpec::Dialog { speaker } => self.commands.push(ResponseCommand::ShowDialog {
                speaker: speaker.clone(),
                text: text.to_string(),
            }),
            // Killing the player mid-hook is never safe; the host consumes
            // this flag at its next safe point instead.
            ResponseSpec::Kill => self.pending_kill = true,
            ResponseSpec::Sound { cue } => {
                self.commands.push(ResponseCommand::PlaySound { cue: *cue })
            }
            ResponseSpec::Tint { frames } => self
                .commands
                .push(ResponseCommand::TintPlayer { frames: *frames }),
            ResponseSpec::Reflex => self.commands.push(ResponseCommand::PlayReflex),
            ResponseSpec::Hazard { kind } => self
                .commands
                .push(ResponseCommand::SpawnHazard { kind: *kind }),
            ResponseSpec::Memorial { after_consecutive } => {
                if self.memorial.fired_this_frame
                    || self.memorial.consecutive < *after_consecutive
                {
                    return;
                }
                self.memorial.fired_this_frame = true;
                info!(consecutive = self.memorial.consecutive, "memorial_response");
                self.perform(
                    &ResponseSpec::Tooltip {
                        duration_frames: MEMORIAL_TOOLTIP_FRAMES,
                    },
                    text,
                );
                self.perform(
                    &ResponseSpec::Dialog {
                        speaker: MEMORIAL_SPEAKER.to_string(),
                    },
                    text,
                );
                self.perform(&ResponseSpec::Kill, text);
                self.perform(&ResponseSpec::Sound { cue: SoundCue::Boom }, text);
                self.perform(
                    &ResponseSpec::Tint {
                        frames: MEMORIAL_TINT_FRAMES,
                    },
                    text,
                );
                self.perform(&ResponseSpec::Reflex, text);
                self.perform(
                    &ResponseSpec::Hazard {
                        kind: HazardKind::Spikes,
                    },
                    text,
                );
            }
        }
    }

    pub fn pending_kill(&self) -> bool {
        self.pending_kill
    }

    /// Consume the pending-kill flag. The host calls this at its next point
    /// where killing the player is legal.
    pub fn take_pending_kill(&mut self) -> bool {
        std::mem::take(&mut self.pending_kill)
    }

    pub fn drain_commands(&mut self) -> Vec<ResponseCommand> {
        std::mem::take(&mut self.commands)
    }
}
