//! Derived button feedback.
//!
//! Every [`Feedback`] is a pure function of the [`Snapshot`]: it never
//! blocks, retries or performs I/O. The option-less [`FeedbackId`] names a
//! feedback kind so the dispatcher can say which kinds an update affects
//! and the host can re-evaluate only those.

use serde::Serialize;

use crate::colors::{self, Rgb};
use crate::progress::{self, BarStyle, IconHandle, ProgressStyle};
use crate::settings::Setting;
use crate::state::Snapshot;

/// Feedback kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackId {
    IsPlaying,
    IsRecording,
    IsBeat,
    BeatIsInBar,
    IsInLoop,
    IsInActiveLoop,
    IsCurrentSong,
    IsCurrentSection,
    IsFutureSection,
    SectionColor,
    SongProgress,
    SectionProgress,
    SectionProgressByNumber,
    IsQueuedSong,
    IsQueuedNextSong,
    IsQueuedSection,
    IsQueuedNextSection,
    CanJumpToNextSong,
    CanJumpToPreviousSong,
    CanJumpToNextSection,
    CanJumpToPreviousSection,
    SettingEqualsValue,
    PlayAudio12IsConnected,
    PlayAudio12Scene,
    IsTimecodeActive,
    IsSyncingPlayback,
}

impl FeedbackId {
    pub const ALL: [FeedbackId; 26] = [
        FeedbackId::IsPlaying,
        FeedbackId::IsRecording,
        FeedbackId::IsBeat,
        FeedbackId::BeatIsInBar,
        FeedbackId::IsInLoop,
        FeedbackId::IsInActiveLoop,
        FeedbackId::IsCurrentSong,
        FeedbackId::IsCurrentSection,
        FeedbackId::IsFutureSection,
        FeedbackId::SectionColor,
        FeedbackId::SongProgress,
        FeedbackId::SectionProgress,
        FeedbackId::SectionProgressByNumber,
        FeedbackId::IsQueuedSong,
        FeedbackId::IsQueuedNextSong,
        FeedbackId::IsQueuedSection,
        FeedbackId::IsQueuedNextSection,
        FeedbackId::CanJumpToNextSong,
        FeedbackId::CanJumpToPreviousSong,
        FeedbackId::CanJumpToNextSection,
        FeedbackId::CanJumpToPreviousSection,
        FeedbackId::SettingEqualsValue,
        FeedbackId::PlayAudio12IsConnected,
        FeedbackId::PlayAudio12Scene,
        FeedbackId::IsTimecodeActive,
        FeedbackId::IsSyncingPlayback,
    ];

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            FeedbackId::IsPlaying => "Playing",
            FeedbackId::IsRecording => "Recording",
            FeedbackId::IsBeat => "Current Beat Equals",
            FeedbackId::BeatIsInBar => "Beat is in Bar",
            FeedbackId::IsInLoop => "Is in Loop",
            FeedbackId::IsInActiveLoop => "Is in Active Loop",
            FeedbackId::IsCurrentSong => "Is Current Song",
            FeedbackId::IsCurrentSection => "Is Current Section",
            FeedbackId::IsFutureSection => "Is Future Section",
            FeedbackId::SectionColor => "Section Color",
            FeedbackId::SongProgress => "Song Progress",
            FeedbackId::SectionProgress => "Section Progress",
            FeedbackId::SectionProgressByNumber => "Section Progress by Number",
            FeedbackId::IsQueuedSong => "Is Queued Song",
            FeedbackId::IsQueuedNextSong => "Is Queued Song Relative to Current",
            FeedbackId::IsQueuedSection => "Is Queued Section",
            FeedbackId::IsQueuedNextSection => "Is Queued Section Relative to Current",
            FeedbackId::CanJumpToNextSong => "Can Jump to Next Song",
            FeedbackId::CanJumpToPreviousSong => "Can Jump to Previous Song",
            FeedbackId::CanJumpToNextSection => "Can Jump to Next Section",
            FeedbackId::CanJumpToPreviousSection => "Can Jump to Previous Section",
            FeedbackId::SettingEqualsValue => "Setting Equals Value",
            FeedbackId::PlayAudio12IsConnected => "PlayAUDIO12 Connected",
            FeedbackId::PlayAudio12Scene => "PlayAUDIO12 Scene Equals Value",
            FeedbackId::IsTimecodeActive => "Timecode is Active",
            FeedbackId::IsSyncingPlayback => "Is Syncing Playback",
        }
    }

    /// Whether this kind yields a style patch rather than a boolean.
    pub fn is_advanced(self) -> bool {
        matches!(
            self,
            FeedbackId::SectionColor
                | FeedbackId::SongProgress
                | FeedbackId::SectionProgress
                | FeedbackId::SectionProgressByNumber
        )
    }

    /// Style applied while a boolean feedback is active.
    pub fn default_style(self) -> StylePatch {
        match self {
            FeedbackId::IsRecording => StylePatch::background(colors::RED_600),
            FeedbackId::PlayAudio12Scene => StylePatch::background(colors::GREEN_800),
            FeedbackId::IsQueuedSong | FeedbackId::IsQueuedSection => {
                StylePatch::background(colors::GREEN_800)
            }
            FeedbackId::CanJumpToNextSong
            | FeedbackId::CanJumpToPreviousSong
            | FeedbackId::CanJumpToNextSection
            | FeedbackId::CanJumpToPreviousSection
            | FeedbackId::PlayAudio12IsConnected
            | FeedbackId::IsTimecodeActive
            | FeedbackId::IsFutureSection => StylePatch::text_color(colors::WHITE),
            id if id.is_advanced() => StylePatch::default(),
            _ => StylePatch::background(colors::GREEN_500),
        }
    }
}

/// How a feedback kind is announced to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDefinition {
    pub id: FeedbackId,
    pub name: &'static str,
    /// `"boolean"` or `"advanced"`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "StylePatch::is_empty")]
    pub default_style: StylePatch,
}

/// Every feedback kind with its label and default style.
pub fn feedback_definitions() -> Vec<FeedbackDefinition> {
    FeedbackId::ALL
        .into_iter()
        .map(|id| FeedbackDefinition {
            id,
            name: id.name(),
            kind: if id.is_advanced() { "advanced" } else { "boolean" },
            default_style: id.default_style(),
        })
        .collect()
}

/// Queued target relative to the active one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueDelta {
    /// Queued is exactly `active + n`.
    Exact(i64),
    /// Anything after the active one.
    AnyNext,
    /// Anything before the active one.
    AnyPrevious,
}

/// A section addressed either by 1-based number or relative to the active one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionRef {
    Number(i64),
    Relative(i64),
}

impl SectionRef {
    /// 0-based index, `-1` when it cannot be resolved.
    pub fn resolve(self, snapshot: &Snapshot) -> i64 {
        match self {
            SectionRef::Number(n) => n.checked_sub(1).unwrap_or(-1),
            SectionRef::Relative(delta) => {
                let active = snapshot.setlist.active_section_index;
                if active == -1 {
                    -1
                } else {
                    active.checked_add(delta).unwrap_or(-1)
                }
            }
        }
    }
}

/// Partial button style.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconHandle>,
}

impl StylePatch {
    pub fn background(color: Rgb) -> Self {
        Self {
            bgcolor: Some(color),
            ..Default::default()
        }
    }

    pub fn text_color(color: Rgb) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn icon(icon: IconHandle) -> Self {
        Self {
            icon: Some(icon),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }
}

/// Result of evaluating a feedback.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedbackValue {
    Bool(bool),
    Style(StylePatch),
}

impl FeedbackValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FeedbackValue::Bool(b) => Some(*b),
            FeedbackValue::Style(_) => None,
        }
    }
}

/// A feedback with its options.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "feedbackId", rename_all = "camelCase")]
pub enum Feedback {
    IsPlaying,
    IsRecording,
    IsBeat { beat: i64 },
    BeatIsInBar { beat: i64 },
    IsInLoop,
    IsInActiveLoop,
    IsCurrentSong { song_number: i64 },
    IsCurrentSection { section_number: i64 },
    IsFutureSection { section: SectionRef },
    SectionColor {
        section: SectionRef,
        background: bool,
        text: bool,
    },
    SongProgress {
        button_count: u32,
        button_number: u32,
        style: BarStyle,
    },
    SectionProgress {
        button_count: u32,
        button_number: u32,
        style: BarStyle,
    },
    SectionProgressByNumber {
        section: SectionRef,
        style: ProgressStyle,
    },
    IsQueuedSong { song_number: i64 },
    IsQueuedNextSong { delta: QueueDelta },
    IsQueuedSection { section_number: i64 },
    IsQueuedNextSection { delta: QueueDelta },
    CanJumpToNextSong,
    CanJumpToPreviousSong,
    CanJumpToNextSection,
    CanJumpToPreviousSection,
    SettingEqualsValue { setting: Setting, value: String },
    PlayAudio12IsConnected,
    PlayAudio12Scene { scene: i64 },
    IsTimecodeActive,
    IsSyncingPlayback,
}

impl Feedback {
    pub fn id(&self) -> FeedbackId {
        match self {
            Feedback::IsPlaying => FeedbackId::IsPlaying,
            Feedback::IsRecording => FeedbackId::IsRecording,
            Feedback::IsBeat { .. } => FeedbackId::IsBeat,
            Feedback::BeatIsInBar { .. } => FeedbackId::BeatIsInBar,
            Feedback::IsInLoop => FeedbackId::IsInLoop,
            Feedback::IsInActiveLoop => FeedbackId::IsInActiveLoop,
            Feedback::IsCurrentSong { .. } => FeedbackId::IsCurrentSong,
            Feedback::IsCurrentSection { .. } => FeedbackId::IsCurrentSection,
            Feedback::IsFutureSection { .. } => FeedbackId::IsFutureSection,
            Feedback::SectionColor { .. } => FeedbackId::SectionColor,
            Feedback::SongProgress { .. } => FeedbackId::SongProgress,
            Feedback::SectionProgress { .. } => FeedbackId::SectionProgress,
            Feedback::SectionProgressByNumber { .. } => FeedbackId::SectionProgressByNumber,
            Feedback::IsQueuedSong { .. } => FeedbackId::IsQueuedSong,
            Feedback::IsQueuedNextSong { .. } => FeedbackId::IsQueuedNextSong,
            Feedback::IsQueuedSection { .. } => FeedbackId::IsQueuedSection,
            Feedback::IsQueuedNextSection { .. } => FeedbackId::IsQueuedNextSection,
            Feedback::CanJumpToNextSong => FeedbackId::CanJumpToNextSong,
            Feedback::CanJumpToPreviousSong => FeedbackId::CanJumpToPreviousSong,
            Feedback::CanJumpToNextSection => FeedbackId::CanJumpToNextSection,
            Feedback::CanJumpToPreviousSection => FeedbackId::CanJumpToPreviousSection,
            Feedback::SettingEqualsValue { .. } => FeedbackId::SettingEqualsValue,
            Feedback::PlayAudio12IsConnected => FeedbackId::PlayAudio12IsConnected,
            Feedback::PlayAudio12Scene { .. } => FeedbackId::PlayAudio12Scene,
            Feedback::IsTimecodeActive => FeedbackId::IsTimecodeActive,
            Feedback::IsSyncingPlayback => FeedbackId::IsSyncingPlayback,
        }
    }

    pub fn evaluate(&self, s: &Snapshot) -> FeedbackValue {
        let setlist = &s.setlist;
        let transport = &s.transport;
        let value = match self {
            Feedback::IsPlaying => transport.is_playing,
            Feedback::IsRecording => transport.is_recording,
            Feedback::IsBeat { beat } => is_beat(s, *beat),
            Feedback::BeatIsInBar { beat } => *beat <= s.beats_in_bar(),
            Feedback::IsInLoop => is_in_loop(s),
            Feedback::IsInActiveLoop => is_in_active_loop(s),
            Feedback::IsCurrentSong { song_number } => {
                song_number.checked_sub(1) == Some(setlist.active_song_index)
            }
            Feedback::IsCurrentSection { section_number } => {
                section_number.checked_sub(1) == Some(setlist.active_section_index)
            }
            Feedback::IsFutureSection { section } => {
                let index = section.resolve(s);
                index >= 0 && index > setlist.active_section_index
            }
            Feedback::SectionColor {
                section,
                background,
                text,
            } => return FeedbackValue::Style(section_color(s, *section, *background, *text)),
            Feedback::SongProgress {
                button_count,
                button_number,
                style,
            } => {
                return FeedbackValue::Style(tile_progress(
                    transport.position(),
                    setlist.active_song_start,
                    setlist.active_song_end,
                    *button_count,
                    *button_number,
                    *style,
                ))
            }
            Feedback::SectionProgress {
                button_count,
                button_number,
                style,
            } => {
                return FeedbackValue::Style(tile_progress(
                    transport.position(),
                    setlist.active_section_start,
                    setlist.active_section_end,
                    *button_count,
                    *button_number,
                    *style,
                ))
            }
            Feedback::SectionProgressByNumber { section, style } => {
                let progress = section_progress_by_index(s, section.resolve(s));
                return FeedbackValue::Style(StylePatch::icon(progress::progress_icon(
                    progress, *style,
                )));
            }
            Feedback::IsQueuedSong { song_number } => {
                setlist.queued_song_index != -1
                    && song_number.checked_sub(1) == Some(setlist.queued_song_index)
            }
            Feedback::IsQueuedNextSong { delta } => {
                queued_matches(setlist.queued_song_index, setlist.active_song_index, *delta)
            }
            Feedback::IsQueuedSection { section_number } => {
                setlist.queued_section_index != -1
                    && section_number.checked_sub(1) == Some(setlist.queued_section_index)
            }
            Feedback::IsQueuedNextSection { delta } => queued_matches(
                setlist.queued_section_index,
                setlist.active_section_index,
                *delta,
            ),
            Feedback::CanJumpToNextSong => {
                can_jump_next(s.relevant_song_index(), setlist.songs.len())
            }
            Feedback::CanJumpToPreviousSong => can_jump_previous(s.relevant_song_index()),
            Feedback::CanJumpToNextSection => {
                can_jump_next(s.relevant_section_index(), setlist.sections.len())
            }
            Feedback::CanJumpToPreviousSection => can_jump_previous(s.relevant_section_index()),
            Feedback::SettingEqualsValue { setting, value } => s
                .settings
                .get(*setting)
                .is_some_and(|current| current.to_string() == *value),
            Feedback::PlayAudio12IsConnected => s.play_audio12.connected,
            Feedback::PlayAudio12Scene { scene } => s.play_audio12.scene == *scene,
            Feedback::IsTimecodeActive => s.timecode.stale == Some(false),
            Feedback::IsSyncingPlayback => transport.is_syncing_playback,
        };
        FeedbackValue::Bool(value)
    }
}

/// `start <= position <= end`, false while either bound is unknown.
pub fn loop_contains(position: f64, start: Option<f64>, end: Option<f64>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start <= position && position <= end,
        _ => false,
    }
}

pub fn is_in_loop(s: &Snapshot) -> bool {
    loop_contains(
        s.transport.position(),
        s.setlist.loop_start,
        s.setlist.loop_end,
    )
}

pub fn is_in_active_loop(s: &Snapshot) -> bool {
    s.setlist.loop_enabled && is_in_loop(s)
}

/// Whether `queued` sits at `delta` from `active`. Nothing queued is never a match.
pub fn queued_matches(queued: i64, active: i64, delta: QueueDelta) -> bool {
    if queued == -1 {
        return false;
    }
    match delta {
        QueueDelta::AnyNext => queued > active,
        QueueDelta::AnyPrevious => queued < active,
        QueueDelta::Exact(n) => active.checked_add(n) == Some(queued),
    }
}

pub fn can_jump_next(relevant: i64, len: usize) -> bool {
    relevant < len as i64 - 1
}

pub fn can_jump_previous(relevant: i64) -> bool {
    relevant > 0
}

fn is_beat(s: &Snapshot, beat: i64) -> bool {
    match s.transport.current_measure {
        Some(measure) => measure.beat == beat,
        None => s.transport.human_position.beat == beat as f64,
    }
}

fn section_color(s: &Snapshot, section: SectionRef, background: bool, text: bool) -> StylePatch {
    let color = s
        .setlist
        .section_color(section.resolve(s))
        .and_then(colors::section_color);
    match color {
        Some(color) => StylePatch {
            bgcolor: background.then_some(color),
            color: text.then_some(color),
            ..Default::default()
        },
        None => StylePatch::default(),
    }
}

fn tile_progress(
    position: f64,
    start: Option<f64>,
    end: Option<f64>,
    count: u32,
    number: u32,
    style: BarStyle,
) -> StylePatch {
    let count = count.max(1);
    let index = number.saturating_sub(1).min(count - 1);
    let percent = progress::button_percent(position, start, end, count, index);
    StylePatch::icon(progress::progress_icon(
        percent,
        style.icon_style(index, count),
    ))
}

/// Past sections are full, the active one shows live progress, later ones are empty.
fn section_progress_by_index(s: &Snapshot, index: i64) -> f64 {
    let active = s.setlist.active_section_index;
    if index < 0 || active < 0 {
        return 0.0;
    }
    if index < active {
        1.0
    } else if index == active {
        progress::range_progress(
            s.transport.position(),
            s.setlist.active_section_start,
            s.setlist.active_section_end,
        )
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingValue;
    use crate::timing::{HumanPosition, Measure, TimeSignature};

    fn eval_bool(feedback: Feedback, s: &Snapshot) -> bool {
        feedback.evaluate(s).as_bool().unwrap()
    }

    fn frame(feedback: Feedback, s: &Snapshot) -> usize {
        match feedback.evaluate(s) {
            FeedbackValue::Style(style) => style.icon.unwrap().frame,
            other => panic!("expected style, got {:?}", other),
        }
    }

    #[test]
    fn test_loop_boundaries_inclusive() {
        let mut s = Snapshot::new();
        s.setlist.loop_start = Some(10.0);
        s.setlist.loop_end = Some(20.0);

        for (pos, expected) in [(10.0, true), (20.0, true), (9.999, false), (20.001, false)] {
            s.transport.beats_position = pos;
            assert_eq!(is_in_loop(&s), expected, "pos {}", pos);
        }
    }

    #[test]
    fn test_active_loop_needs_enabled() {
        let mut s = Snapshot::new();
        s.setlist.loop_start = Some(10.0);
        s.setlist.loop_end = Some(20.0);
        s.transport.beats_position = 15.0;
        assert!(eval_bool(Feedback::IsInLoop, &s));
        assert!(!eval_bool(Feedback::IsInActiveLoop, &s));
        s.setlist.loop_enabled = true;
        assert!(eval_bool(Feedback::IsInActiveLoop, &s));
    }

    #[test]
    fn test_unknown_loop_is_false() {
        let mut s = Snapshot::new();
        s.setlist.loop_enabled = true;
        s.setlist.loop_end = Some(20.0);
        assert!(!eval_bool(Feedback::IsInActiveLoop, &s));
    }

    #[test]
    fn test_fine_position_takes_precedence() {
        let mut s = Snapshot::new();
        s.setlist.loop_start = Some(10.0);
        s.setlist.loop_end = Some(20.0);
        s.transport.beats_position = 20.0;
        s.transport.fine_position = Some(20.5);
        assert!(!is_in_loop(&s));
    }

    #[test]
    fn test_queued_delta() {
        // active 3, queued 5
        assert!(queued_matches(5, 3, QueueDelta::Exact(2)));
        assert!(!queued_matches(5, 3, QueueDelta::Exact(1)));
        assert!(queued_matches(5, 3, QueueDelta::AnyNext));
        assert!(!queued_matches(5, 3, QueueDelta::AnyPrevious));
        // nothing queued
        assert!(!queued_matches(-1, 3, QueueDelta::AnyPrevious));
        assert!(!queued_matches(-1, -2, QueueDelta::Exact(1)));
    }

    #[test]
    fn test_extreme_indices_do_not_overflow() {
        assert!(!queued_matches(5, i64::MAX, QueueDelta::Exact(1)));
        assert!(!queued_matches(5, i64::MIN, QueueDelta::Exact(-1)));

        let mut s = Snapshot::new();
        s.setlist.active_section_index = i64::MAX;
        assert_eq!(SectionRef::Relative(1).resolve(&s), -1);
        assert_eq!(SectionRef::Number(i64::MIN).resolve(&s), -1);
        assert!(!eval_bool(
            Feedback::IsCurrentSection {
                section_number: i64::MIN
            },
            &s
        ));
        assert!(!eval_bool(
            Feedback::IsFutureSection {
                section: SectionRef::Relative(1)
            },
            &s
        ));
    }

    #[test]
    fn test_queued_song_feedbacks() {
        let mut s = Snapshot::new();
        s.setlist.active_song_index = 3;
        s.setlist.queued_song_index = 5;
        assert!(eval_bool(
            Feedback::IsQueuedNextSong {
                delta: QueueDelta::Exact(2)
            },
            &s
        ));
        assert!(eval_bool(Feedback::IsQueuedSong { song_number: 6 }, &s));
        assert!(!eval_bool(Feedback::IsQueuedSong { song_number: 5 }, &s));
        assert!(!eval_bool(Feedback::IsQueuedSection { section_number: 0 }, &s));
    }

    #[test]
    fn test_jump_availability() {
        let mut s = Snapshot::new();
        s.setlist.songs = vec!["A".into(), "B".into(), "C".into()];
        s.setlist.active_song_index = 0;
        assert!(eval_bool(Feedback::CanJumpToNextSong, &s));
        assert!(!eval_bool(Feedback::CanJumpToPreviousSong, &s));

        s.setlist.queued_song_index = 2;
        assert!(!eval_bool(Feedback::CanJumpToNextSong, &s));
        assert!(eval_bool(Feedback::CanJumpToPreviousSong, &s));

        // sections only look at the section axis
        s.setlist.sections = vec!["Intro".into(), "Verse".into()];
        s.setlist.active_section_index = 0;
        assert!(eval_bool(Feedback::CanJumpToNextSection, &s));
        assert!(!eval_bool(Feedback::CanJumpToPreviousSection, &s));
    }

    #[test]
    fn test_jump_with_empty_setlist() {
        let s = Snapshot::new();
        assert!(!eval_bool(Feedback::CanJumpToNextSong, &s));
        assert!(!eval_bool(Feedback::CanJumpToPreviousSong, &s));
    }

    #[test]
    fn test_beat_in_bar() {
        let mut s = Snapshot::new();
        s.transport.time_signature = TimeSignature::new(3, 4);
        assert!(eval_bool(Feedback::BeatIsInBar { beat: 3 }, &s));
        assert!(!eval_bool(Feedback::BeatIsInBar { beat: 4 }, &s));

        s.transport.current_measure = Some(Measure {
            bar: 2,
            beat: 4,
            beats_in_measure: 7,
        });
        assert!(eval_bool(Feedback::BeatIsInBar { beat: 7 }, &s));
        assert!(eval_bool(Feedback::IsBeat { beat: 4 }, &s));
    }

    #[test]
    fn test_is_beat_from_human_position() {
        let mut s = Snapshot::new();
        s.transport.human_position = HumanPosition { bar: 3, beat: 2.0 };
        assert!(eval_bool(Feedback::IsBeat { beat: 2 }, &s));
        assert!(!eval_bool(Feedback::IsBeat { beat: 1 }, &s));
    }

    #[test]
    fn test_setting_equals_value() {
        let mut s = Snapshot::new();
        let feedback = Feedback::SettingEqualsValue {
            setting: Setting::Autoplay,
            value: "false".into(),
        };
        assert!(!eval_bool(feedback.clone(), &s));

        s.settings.set(Setting::Autoplay, SettingValue::Bool(false));
        assert!(eval_bool(feedback, &s));

        s.settings.set(Setting::CountInDuration, SettingValue::Int(2));
        assert!(eval_bool(
            Feedback::SettingEqualsValue {
                setting: Setting::CountInDuration,
                value: "2".into()
            },
            &s
        ));
    }

    #[test]
    fn test_song_progress_tiles() {
        let mut s = Snapshot::new();
        s.setlist.active_song_start = Some(0.0);
        s.setlist.active_song_end = Some(100.0);
        s.transport.beats_position = 50.0;

        let tile = |n| Feedback::SongProgress {
            button_count: 4,
            button_number: n,
            style: BarStyle::Slim,
        };
        assert_eq!(frame(tile(1), &s), 72);
        assert_eq!(frame(tile(2), &s), 72);
        assert_eq!(frame(tile(3), &s), 0);
        assert_eq!(frame(tile(4), &s), 0);

        match tile(4).evaluate(&s) {
            FeedbackValue::Style(style) => {
                assert_eq!(style.icon.unwrap().style, ProgressStyle::SlimRight)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_progress_unknown_range_is_empty() {
        let mut s = Snapshot::new();
        s.transport.beats_position = 50.0;
        let feedback = Feedback::SectionProgress {
            button_count: 1,
            button_number: 1,
            style: BarStyle::Full,
        };
        assert_eq!(frame(feedback, &s), 0);
    }

    #[test]
    fn test_section_progress_by_number() {
        let mut s = Snapshot::new();
        s.setlist.active_section_index = 1;
        s.setlist.active_section_start = Some(16.0);
        s.setlist.active_section_end = Some(32.0);
        s.transport.beats_position = 24.0;

        let by = |n| Feedback::SectionProgressByNumber {
            section: SectionRef::Number(n),
            style: ProgressStyle::FullTransparent,
        };
        assert_eq!(frame(by(1), &s), 72);
        assert_eq!(frame(by(2), &s), 36);
        assert_eq!(frame(by(3), &s), 0);

        let relative = Feedback::SectionProgressByNumber {
            section: SectionRef::Relative(-1),
            style: ProgressStyle::FullTransparent,
        };
        assert_eq!(frame(relative, &s), 72);
    }

    #[test]
    fn test_section_color() {
        let mut s = Snapshot::new();
        s.setlist.section_colors = vec!["red".into(), "unknown".into()];
        s.setlist.active_section_index = 0;

        let color = |section| Feedback::SectionColor {
            section,
            background: true,
            text: false,
        };
        assert_eq!(
            color(SectionRef::Relative(0)).evaluate(&s),
            FeedbackValue::Style(StylePatch::background(Rgb(220, 38, 38)))
        );
        assert_eq!(
            color(SectionRef::Number(2)).evaluate(&s),
            FeedbackValue::Style(StylePatch::default())
        );
        assert_eq!(
            color(SectionRef::Number(9)).evaluate(&s),
            FeedbackValue::Style(StylePatch::default())
        );
    }

    #[test]
    fn test_future_section() {
        let mut s = Snapshot::new();
        s.setlist.active_section_index = 1;
        assert!(eval_bool(
            Feedback::IsFutureSection {
                section: SectionRef::Number(3)
            },
            &s
        ));
        assert!(!eval_bool(
            Feedback::IsFutureSection {
                section: SectionRef::Number(1)
            },
            &s
        ));
    }

    #[test]
    fn test_timecode_active_needs_report() {
        let mut s = Snapshot::new();
        assert!(!eval_bool(Feedback::IsTimecodeActive, &s));
        s.timecode.stale = Some(true);
        assert!(!eval_bool(Feedback::IsTimecodeActive, &s));
        s.timecode.stale = Some(false);
        assert!(eval_bool(Feedback::IsTimecodeActive, &s));
    }

    #[test]
    fn test_feedback_definitions() {
        let defs = feedback_definitions();
        assert_eq!(defs.len(), FeedbackId::ALL.len());

        let recording = defs
            .iter()
            .find(|d| d.id == FeedbackId::IsRecording)
            .unwrap();
        assert_eq!(recording.name, "Recording");
        assert_eq!(recording.kind, "boolean");
        assert_eq!(recording.default_style.bgcolor, Some(colors::RED_600));

        for def in defs.iter().filter(|d| d.id.is_advanced()) {
            assert_eq!(def.kind, "advanced");
            assert!(def.default_style.is_empty(), "{:?}", def.id);
        }
        for def in defs.iter().filter(|d| !d.id.is_advanced()) {
            assert!(!def.default_style.is_empty(), "{:?}", def.id);
        }
    }

    #[test]
    fn test_ids_match() {
        assert_eq!(Feedback::IsInLoop.id(), FeedbackId::IsInLoop);
        assert_eq!(
            Feedback::PlayAudio12Scene { scene: 1 }.id(),
            FeedbackId::PlayAudio12Scene
        );
        assert!(FeedbackId::SongProgress.is_advanced());
        assert!(!FeedbackId::IsPlaying.is_advanced());
    }
}
