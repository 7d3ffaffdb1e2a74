//! Ready-made button definitions.
//!
//! A preset bundles a base style, the commands a press sends and the
//! feedbacks that restyle the button. Button text may reference variables
//! as `$(showlink:<name>)`; the host substitutes them.

use serde::Serialize;

use crate::colors::{self, Rgb};
use crate::command::{Command, JumpTarget};
use crate::feedback::{Feedback, QueueDelta, SectionRef, StylePatch};
use crate::progress::{BarStyle, ProgressStyle};
use crate::projection::{RELATIVE_SLOTS, SECTION_SLOTS, SONG_SLOTS};
use crate::settings::{Setting, SettingValue, COUNT_IN_DURATIONS, JUMP_MODES};

/// Connection label used in variable references.
pub const VARIABLE_PREFIX: &str = "showlink";

/// Beats offered by the visual metronome.
pub const METRONOME_BEATS: i64 = 8;

fn var(name: &str) -> String {
    format!("$({}:{})", VARIABLE_PREFIX, name)
}

/// Base look of a button.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresetStyle {
    pub text: String,
    /// Font size in points, `None` for automatic.
    pub size: Option<u32>,
    pub color: Rgb,
    pub bgcolor: Rgb,
    /// Name of a built-in icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
}

impl PresetStyle {
    /// Small white-on-black text used for song and section names.
    fn song(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: Some(14),
            color: colors::WHITE,
            bgcolor: colors::BLACK,
            icon: None,
        }
    }

    fn large(text: impl Into<String>) -> Self {
        Self {
            size: Some(18),
            ..Self::song(text)
        }
    }

    fn auto_size(mut self) -> Self {
        self.size = None;
        self
    }

    fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    fn with_bgcolor(mut self, color: Rgb) -> Self {
        self.bgcolor = color;
        self
    }
}

/// A feedback attached to a preset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresetFeedback {
    pub feedback: Feedback,
    /// Style applied while a boolean feedback is true. Empty for
    /// feedbacks that return their own style.
    #[serde(skip_serializing_if = "StylePatch::is_empty")]
    pub style: StylePatch,
}

impl PresetFeedback {
    fn new(feedback: Feedback, style: StylePatch) -> Self {
        Self { feedback, style }
    }

    fn advanced(feedback: Feedback) -> Self {
        Self::new(feedback, StylePatch::default())
    }
}

/// A button preset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresetDefinition {
    pub id: String,
    pub category: &'static str,
    pub name: String,
    pub style: PresetStyle,
    /// Sent in order when the button is pressed.
    pub press: Vec<Command>,
    pub feedbacks: Vec<PresetFeedback>,
}

impl PresetDefinition {
    fn new(
        id: impl Into<String>,
        category: &'static str,
        name: impl Into<String>,
        style: PresetStyle,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            style,
            press: Vec::new(),
            feedbacks: Vec::new(),
        }
    }

    fn on_press(mut self, command: Command) -> Self {
        self.press.push(command);
        self
    }

    fn feedback(mut self, feedback: Feedback, style: StylePatch) -> Self {
        self.feedbacks.push(PresetFeedback::new(feedback, style));
        self
    }

    fn advanced(mut self, feedback: Feedback) -> Self {
        self.feedbacks.push(PresetFeedback::advanced(feedback));
        self
    }
}

fn ordinal(n: usize) -> String {
    match n {
        1 => String::new(),
        2 => "2nd ".to_string(),
        3 => "3rd ".to_string(),
        _ => format!("{}th ", n),
    }
}

fn relative_suffix(n: usize) -> String {
    if n == 1 {
        String::new()
    } else {
        n.to_string()
    }
}

fn song_presets() -> Vec<PresetDefinition> {
    (1..=SONG_SLOTS as i64)
        .map(|n| {
            PresetDefinition::new(
                format!("song{}", n),
                "Songs",
                format!("Song {}", n),
                PresetStyle::song(var(&format!("song{}Name", n))),
            )
            .on_press(Command::JumpToSong {
                target: JumpTarget::Number(n),
            })
            .feedback(
                Feedback::IsQueuedSong { song_number: n },
                StylePatch::background(colors::GREEN_800),
            )
            .feedback(
                Feedback::IsCurrentSong { song_number: n },
                StylePatch::background(colors::GREEN_500),
            )
        })
        .collect()
}

/// Section color, progress overlay and queued marker for `section`.
fn section_feedbacks(preset: PresetDefinition, section: SectionRef) -> PresetDefinition {
    preset
        .advanced(Feedback::SectionColor {
            section,
            background: true,
            text: false,
        })
        .advanced(Feedback::SectionProgressByNumber {
            section,
            style: ProgressStyle::FullTransparent,
        })
}

fn section_presets() -> Vec<PresetDefinition> {
    (1..=SECTION_SLOTS as i64)
        .map(|n| {
            let preset = PresetDefinition::new(
                format!("section{}", n),
                "Sections",
                format!("Section {}", n),
                PresetStyle::song(var(&format!("section{}Name", n))),
            )
            .on_press(Command::JumpToSection {
                target: JumpTarget::Number(n),
            });
            section_feedbacks(preset, SectionRef::Number(n)).feedback(
                Feedback::IsQueuedSection { section_number: n },
                StylePatch::text_color(colors::WHITE).with_text("⏭"),
            )
        })
        .collect()
}

fn relative_song_presets() -> Vec<PresetDefinition> {
    let mut presets = vec![PresetDefinition::new(
        "currentSong",
        "Jump Songs",
        "Current Song",
        PresetStyle::song(var("activeSongName")).with_bgcolor(colors::GREEN_500),
    )
    .on_press(Command::JumpBySongs {
        steps: 0,
        force: true,
    })
    .feedback(
        Feedback::IsQueuedNextSong {
            delta: QueueDelta::Exact(0),
        },
        StylePatch::background(colors::GREEN_800),
    )];

    for (direction, sign) in [("next", 1i64), ("previous", -1i64)] {
        for n in 1..=RELATIVE_SLOTS {
            let steps = sign * n as i64;
            let label = if sign > 0 { "Next" } else { "Previous" };
            presets.push(
                PresetDefinition::new(
                    format!("{}Song{}", direction, n),
                    "Jump Songs",
                    format!("{}{} Song", ordinal(n), label),
                    PresetStyle::song(var(&format!(
                        "{}SongName{}",
                        direction,
                        relative_suffix(n)
                    ))),
                )
                .on_press(Command::JumpBySongs { steps, force: true })
                .feedback(
                    Feedback::IsQueuedNextSong {
                        delta: QueueDelta::Exact(steps),
                    },
                    StylePatch::background(colors::GREEN_800),
                ),
            );
        }
    }
    presets
}

fn relative_section_presets() -> Vec<PresetDefinition> {
    let current = PresetDefinition::new(
        "currentSection",
        "Jump Sections",
        "Current Section",
        PresetStyle::song(var("activeSectionName")),
    )
    .on_press(Command::JumpBySections {
        steps: 0,
        force: true,
    });
    let mut presets = vec![section_feedbacks(current, SectionRef::Relative(0)).feedback(
        Feedback::IsQueuedNextSection {
            delta: QueueDelta::Exact(0),
        },
        StylePatch::text_color(colors::WHITE).with_text("⏭"),
    )];

    for (direction, sign) in [("next", 1i64), ("previous", -1i64)] {
        for n in 1..=RELATIVE_SLOTS {
            let steps = sign * n as i64;
            let label = if sign > 0 { "Next" } else { "Previous" };
            let preset = PresetDefinition::new(
                format!("{}Section{}", direction, n),
                "Jump Sections",
                format!("{}{} Section", ordinal(n), label),
                PresetStyle::song(var(&format!(
                    "{}SectionName{}",
                    direction,
                    relative_suffix(n)
                ))),
            )
            .on_press(Command::JumpBySections { steps, force: true });
            presets.push(
                section_feedbacks(preset, SectionRef::Relative(steps)).feedback(
                    Feedback::IsQueuedNextSection {
                        delta: QueueDelta::Exact(steps),
                    },
                    StylePatch::text_color(colors::WHITE).with_text("⏭"),
                ),
            );
        }
    }
    presets
}

fn playback_presets() -> Vec<PresetDefinition> {
    vec![
        PresetDefinition::new(
            "playPause",
            "Playback",
            "Toggle Play/Pause",
            PresetStyle::large("").with_icon("play"),
        )
        .on_press(Command::PlayPause)
        .feedback(
            Feedback::IsPlaying,
            StylePatch::background(colors::GREEN_700).with_text("Pause"),
        ),
        PresetDefinition::new(
            "playStop",
            "Playback",
            "Toggle Play/Stop",
            PresetStyle::large("").with_icon("play"),
        )
        .on_press(Command::PlayStop)
        .feedback(
            Feedback::IsPlaying,
            StylePatch::background(colors::GREEN_700).with_text("Stop"),
        ),
        PresetDefinition::new(
            "toggleRecord",
            "Playback",
            "Toggle Record",
            PresetStyle::large("").with_icon("record"),
        )
        .on_press(Command::ToggleRecording)
        .feedback(Feedback::IsRecording, StylePatch::background(colors::RED_600)),
        PresetDefinition::new(
            "prevSong",
            "Playback",
            "Previous Song",
            PresetStyle::large("")
                .with_icon("previous-song")
                .with_color(colors::GRAY),
        )
        .on_press(Command::JumpBySongs {
            steps: -1,
            force: false,
        })
        .feedback(
            Feedback::CanJumpToPreviousSong,
            StylePatch::text_color(colors::WHITE),
        )
        .feedback(
            Feedback::IsQueuedNextSong {
                delta: QueueDelta::AnyPrevious,
            },
            StylePatch::background(colors::GREEN_800),
        ),
        PresetDefinition::new(
            "nextSong",
            "Playback",
            "Next Song",
            PresetStyle::large("")
                .with_icon("next-song")
                .with_color(colors::GRAY),
        )
        .on_press(Command::JumpBySongs {
            steps: 1,
            force: false,
        })
        .feedback(
            Feedback::CanJumpToNextSong,
            StylePatch::text_color(colors::WHITE),
        )
        .feedback(
            Feedback::IsQueuedNextSong {
                delta: QueueDelta::AnyNext,
            },
            StylePatch::background(colors::GREEN_800),
        ),
        PresetDefinition::new(
            "prevSection",
            "Playback",
            "Previous Section",
            PresetStyle::song("Prev\nSection").with_color(colors::GRAY),
        )
        .on_press(Command::JumpBySections {
            steps: -1,
            force: false,
        })
        .feedback(
            Feedback::CanJumpToPreviousSection,
            StylePatch::text_color(colors::WHITE),
        )
        .feedback(
            Feedback::IsQueuedNextSection {
                delta: QueueDelta::AnyPrevious,
            },
            StylePatch::background(colors::GREEN_800),
        ),
        PresetDefinition::new(
            "nextSection",
            "Playback",
            "Next Section",
            PresetStyle::song("Next\nSection").with_color(colors::GRAY),
        )
        .on_press(Command::JumpBySections {
            steps: 1,
            force: false,
        })
        .feedback(
            Feedback::CanJumpToNextSection,
            StylePatch::text_color(colors::WHITE),
        )
        .feedback(
            Feedback::IsQueuedNextSection {
                delta: QueueDelta::AnyNext,
            },
            StylePatch::background(colors::GREEN_800),
        ),
        PresetDefinition::new(
            "toggleLoop",
            "Playback",
            "Toggle Loop",
            PresetStyle::large("")
                .with_icon("loop")
                .with_color(colors::GRAY),
        )
        .on_press(Command::ToggleLoop)
        .feedback(Feedback::IsInLoop, StylePatch::text_color(colors::WHITE))
        .feedback(
            Feedback::IsInActiveLoop,
            StylePatch::background(colors::GREEN_700),
        ),
        PresetDefinition::new(
            "playbackPosition",
            "Playback",
            "Playback Position",
            PresetStyle::large(var("humanPosition")),
        ),
        PresetDefinition::new(
            "playbackPositionBeats",
            "Playback",
            "Current Beat",
            PresetStyle::large(var("humanPositionBeats")).auto_size(),
        ),
        PresetDefinition::new(
            "timeSignature",
            "Playback",
            "Time Signature",
            PresetStyle::large(var("timeSignature")),
        ),
    ]
}

fn metronome_presets() -> Vec<PresetDefinition> {
    (1..=METRONOME_BEATS)
        .map(|beat| {
            PresetDefinition::new(
                format!("beat{}", beat),
                "Visual Metronome",
                format!("Beat {}", beat),
                PresetStyle::large(beat.to_string())
                    .auto_size()
                    .with_color(colors::DARK_GRAY),
            )
            .feedback(
                Feedback::BeatIsInBar { beat },
                StylePatch::text_color(colors::WHITE),
            )
            .feedback(
                Feedback::IsBeat { beat },
                StylePatch::background(colors::GREEN_500),
            )
        })
        .collect()
}

/// Button-count/style combinations offered as progress bar tiles.
const PROGRESS_TILES: [(u32, BarStyle); 7] = [
    (1, BarStyle::Full),
    (2, BarStyle::Full),
    (4, BarStyle::Full),
    (8, BarStyle::Full),
    (2, BarStyle::Slim),
    (4, BarStyle::Slim),
    (8, BarStyle::Slim),
];

fn progress_presets() -> Vec<PresetDefinition> {
    let mut presets = Vec::new();
    for (category, id) in [("Song Progress", "songProgress"), ("Section Progress", "sectionProgress")] {
        for (button_count, style) in PROGRESS_TILES {
            let style_name = match style {
                BarStyle::Full => "full",
                BarStyle::Slim => "slim",
            };
            for button_number in 1..=button_count {
                let feedback = if id == "songProgress" {
                    Feedback::SongProgress {
                        button_count,
                        button_number,
                        style,
                    }
                } else {
                    Feedback::SectionProgress {
                        button_count,
                        button_number,
                        style,
                    }
                };
                presets.push(
                    PresetDefinition::new(
                        format!("{}{}{}{}", id, style_name, button_number, button_count),
                        category,
                        format!("{} ({}/{})", category, button_number, button_count),
                        PresetStyle::large("").with_bgcolor(colors::GREEN_800),
                    )
                    .feedback(Feedback::IsPlaying, StylePatch::background(colors::GREEN_700))
                    .advanced(feedback),
                );
            }
        }
    }
    presets
}

fn setting_presets() -> Vec<PresetDefinition> {
    let equals = |setting: Setting, value: &str| Feedback::SettingEqualsValue {
        setting,
        value: value.to_string(),
    };
    let mut presets: Vec<PresetDefinition> = Setting::BOOLEAN
        .iter()
        .map(|&setting| {
            PresetDefinition::new(
                setting.id(),
                "Settings",
                setting.label(),
                PresetStyle::song(setting.label()),
            )
            .on_press(Command::ToggleSetting { setting })
            .feedback(
                equals(setting, "true"),
                StylePatch::background(colors::GREEN_500),
            )
        })
        .collect();

    for (bars, label) in COUNT_IN_DURATIONS {
        presets.push(
            PresetDefinition::new(
                format!("countInDuration{}", bars),
                "Settings",
                format!("Count-In Duration / {}", label),
                PresetStyle::song(label),
            )
            .on_press(Command::SetSetting {
                setting: Setting::CountInDuration,
                value: SettingValue::Int(bars),
            })
            .feedback(
                equals(Setting::CountInDuration, &bars.to_string()),
                StylePatch::background(colors::GREEN_500),
            ),
        );
    }

    for (mode, label) in JUMP_MODES {
        presets.push(
            PresetDefinition::new(
                format!("jumpMode-{}", mode),
                "Settings",
                format!("Jump Mode / {}", label),
                PresetStyle::song(label),
            )
            .on_press(Command::SetSetting {
                setting: Setting::JumpMode,
                value: SettingValue::Text(mode.to_string()),
            })
            .feedback(
                equals(Setting::JumpMode, mode),
                StylePatch::background(colors::GREEN_500),
            ),
        );
    }
    presets
}

fn play_audio12_presets() -> Vec<PresetDefinition> {
    vec![PresetDefinition::new(
        "playAudio12",
        "PlayAUDIO12",
        "PlayAUDIO12 Scene",
        PresetStyle::song("PA12\nN/A").with_color(colors::GRAY),
    )
    .on_press(Command::Pa12ToggleScene)
    .feedback(
        Feedback::PlayAudio12IsConnected,
        StylePatch::text_color(colors::WHITE).with_text("PA12\nN/A"),
    )
    .feedback(
        Feedback::PlayAudio12Scene { scene: 1 },
        StylePatch::background(colors::GREEN_800).with_text("PA12\nScene A"),
    )
    .feedback(
        Feedback::PlayAudio12Scene { scene: 2 },
        StylePatch::background(colors::RED_700).with_text("PA12\nScene B"),
    )]
}

fn timecode_presets() -> Vec<PresetDefinition> {
    let minutes_seconds = format!("{}:{}", var("timecodeMinutes"), var("timecodeSeconds"));
    [
        ("timecodeHours", "Timecode Hours", var("timecodeHours")),
        ("timecodeMinutes", "Timecode Minutes", var("timecodeMinutes")),
        ("timecodeSeconds", "Timecode Seconds", var("timecodeSeconds")),
        ("timecodeFrames", "Timecode Frames", var("timecodeFrames")),
        ("timecode", "Timecode", var("timecode")),
        ("timecodeMinSec", "Timecode Minutes and Seconds", minutes_seconds),
        ("timecodeFps", "Timecode FPS", var("timecodeFps")),
    ]
    .into_iter()
    .map(|(id, name, text)| {
        PresetDefinition::new(
            id,
            "LTC Timecode",
            name,
            PresetStyle::large(text).with_color(colors::GRAY),
        )
        .feedback(Feedback::IsTimecodeActive, StylePatch::text_color(colors::WHITE))
    })
    .collect()
}

/// Every preset, grouped by category in display order.
pub fn presets() -> Vec<PresetDefinition> {
    let mut all = song_presets();
    all.extend(section_presets());
    all.extend(relative_song_presets());
    all.extend(relative_section_presets());
    all.extend(playback_presets());
    all.extend(progress_presets());
    all.extend(play_audio12_presets());
    all.extend(timecode_presets());
    all.extend(metronome_presets());
    all.extend(setting_presets());
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn find(id: &str) -> PresetDefinition {
        presets()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap_or_else(|| panic!("no preset {}", id))
    }

    #[test]
    fn test_ids_are_unique() {
        let all = presets();
        let ids: HashSet<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_category_sizes() {
        let all = presets();
        let count = |category: &str| all.iter().filter(|p| p.category == category).count();
        assert_eq!(count("Songs"), SONG_SLOTS);
        assert_eq!(count("Sections"), SECTION_SLOTS);
        assert_eq!(count("Jump Songs"), 1 + 2 * RELATIVE_SLOTS);
        assert_eq!(count("Jump Sections"), 1 + 2 * RELATIVE_SLOTS);
        assert_eq!(count("Visual Metronome"), METRONOME_BEATS as usize);
        // 1 + 2 + 4 + 8 full tiles, 2 + 4 + 8 slim tiles
        assert_eq!(count("Song Progress"), 29);
        assert_eq!(count("Section Progress"), 29);
    }

    #[test]
    fn test_song_preset() {
        let preset = find("song3");
        assert_eq!(preset.style.text, "$(showlink:song3Name)");
        assert_eq!(
            preset.press,
            vec![Command::JumpToSong {
                target: JumpTarget::Number(3)
            }]
        );
        assert_eq!(
            preset.feedbacks[1].feedback,
            Feedback::IsCurrentSong { song_number: 3 }
        );
    }

    #[test]
    fn test_relative_presets_use_matching_variables() {
        assert_eq!(find("nextSong1").style.text, "$(showlink:nextSongName)");
        assert_eq!(find("previousSection3").style.text, "$(showlink:previousSectionName3)");
        assert_eq!(find("previousSong2").name, "2nd Previous Song");
        assert_eq!(
            find("previousSong2").press,
            vec![Command::JumpBySongs {
                steps: -2,
                force: true
            }]
        );
    }

    #[test]
    fn test_setting_presets() {
        let preset = find("countInDuration2");
        assert_eq!(
            preset.feedbacks[0].feedback,
            Feedback::SettingEqualsValue {
                setting: Setting::CountInDuration,
                value: "2".into()
            }
        );
        let preset = find("safeMode");
        assert_eq!(
            preset.press,
            vec![Command::ToggleSetting {
                setting: Setting::SafeMode
            }]
        );
    }

    #[test]
    fn test_advanced_feedbacks_have_no_style() {
        for preset in presets() {
            for attached in &preset.feedbacks {
                if attached.feedback.id().is_advanced() {
                    assert!(attached.style.is_empty(), "{}", preset.id);
                }
            }
        }
    }
}
