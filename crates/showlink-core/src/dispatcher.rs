//! Routing of inbound OSC status messages into the snapshot.
//!
//! Each known address maps to exactly one [`Topic`]. Applying a topic
//! writes the coerced arguments into the [`Snapshot`] and reports what
//! went stale as a [`Dispatch`]; handlers never perform I/O and never fail.

use std::collections::HashMap;

use rosc::OscType;

use crate::coerce;
use crate::feedback::FeedbackId;
use crate::settings::{Setting, SettingKind, SettingValue};
use crate::state::Snapshot;
use crate::timing::{HumanPosition, Measure, TimeSignature, Timecode};

/// Every status address the show controller sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    BeatsPosition,
    FinePosition,
    HumanPosition,
    CurrentMeasure,
    Tempo,
    IsPlaying,
    IsRecording,
    TimeSignature,
    IsSyncingPlayback,
    Heartbeat,
    SetlistName,
    Songs,
    Sections,
    SectionColors,
    ActiveSongName,
    ActiveSongIndex,
    ActiveSongStart,
    ActiveSongEnd,
    ActiveSectionName,
    ActiveSectionIndex,
    ActiveSectionStart,
    ActiveSectionEnd,
    QueuedName,
    QueuedIndex,
    LoopEnabled,
    LoopStart,
    LoopEnd,
    IsCountingIn,
    RemainingTimeInSong,
    RemainingTimeInSet,
    PlayAudio12Connected,
    PlayAudio12Scene,
    Timecode,
    TimecodeFps,
    TimecodeStale,
    Setting(Setting),
}

const FIXED_TOPICS: [(&str, Topic); 35] = [
    ("/global/beatsPosition", Topic::BeatsPosition),
    ("/global/finePosition", Topic::FinePosition),
    ("/global/humanPosition", Topic::HumanPosition),
    ("/global/currentMeasure", Topic::CurrentMeasure),
    ("/global/tempo", Topic::Tempo),
    ("/global/isPlaying", Topic::IsPlaying),
    ("/global/isRecording", Topic::IsRecording),
    ("/global/timeSignature", Topic::TimeSignature),
    ("/global/isSyncingPlayback", Topic::IsSyncingPlayback),
    ("/heartbeat", Topic::Heartbeat),
    ("/setlist/name", Topic::SetlistName),
    ("/setlist/songs", Topic::Songs),
    ("/setlist/sections", Topic::Sections),
    ("/setlist/sectionColors", Topic::SectionColors),
    ("/setlist/activeSongName", Topic::ActiveSongName),
    ("/setlist/activeSongIndex", Topic::ActiveSongIndex),
    ("/setlist/activeSongStart", Topic::ActiveSongStart),
    ("/setlist/activeSongEnd", Topic::ActiveSongEnd),
    ("/setlist/activeSectionName", Topic::ActiveSectionName),
    ("/setlist/activeSectionIndex", Topic::ActiveSectionIndex),
    ("/setlist/activeSectionStart", Topic::ActiveSectionStart),
    ("/setlist/activeSectionEnd", Topic::ActiveSectionEnd),
    ("/setlist/queuedName", Topic::QueuedName),
    ("/setlist/queuedIndex", Topic::QueuedIndex),
    ("/setlist/loopEnabled", Topic::LoopEnabled),
    ("/setlist/loopStart", Topic::LoopStart),
    ("/setlist/loopEnd", Topic::LoopEnd),
    ("/setlist/isCountingIn", Topic::IsCountingIn),
    ("/setlist/remainingTimeInSong", Topic::RemainingTimeInSong),
    ("/setlist/remainingTimeInSet", Topic::RemainingTimeInSet),
    ("/playaudio12/isConnected", Topic::PlayAudio12Connected),
    ("/playaudio12/scene", Topic::PlayAudio12Scene),
    ("/timecode/tc", Topic::Timecode),
    ("/timecode/fps", Topic::TimecodeFps),
    ("/timecode/stale", Topic::TimecodeStale),
];

/// Every topic, settings included.
pub fn all_topics() -> impl Iterator<Item = Topic> {
    FIXED_TOPICS
        .iter()
        .map(|(_, topic)| *topic)
        .chain(Setting::ALL.into_iter().map(Topic::Setting))
}

/// Which liveness signal a message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    /// The first state topic the remote sends after subscribing.
    PrimaryState,
    Heartbeat,
}

/// Composite variable groups recomputed on a trailing debounce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectionGroup {
    Songs,
    Sections,
}

/// What a single inbound message invalidated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dispatch {
    /// Feedbacks to re-check after the gather window.
    pub feedbacks: Vec<FeedbackId>,
    /// Feedbacks to re-check right away.
    pub immediate: Vec<FeedbackId>,
    pub projections: Vec<ProjectionGroup>,
    pub liveness: Option<Liveness>,
}

impl Dispatch {
    fn feedbacks(ids: &[FeedbackId]) -> Self {
        Self {
            feedbacks: ids.to_vec(),
            ..Default::default()
        }
    }

    fn with_projection(mut self, group: ProjectionGroup) -> Self {
        self.projections.push(group);
        self
    }
}

const POSITION_FEEDBACKS: [FeedbackId; 5] = [
    FeedbackId::IsInLoop,
    FeedbackId::IsInActiveLoop,
    FeedbackId::SongProgress,
    FeedbackId::SectionProgress,
    FeedbackId::SectionProgressByNumber,
];

const LOOP_FEEDBACKS: [FeedbackId; 2] = [FeedbackId::IsInLoop, FeedbackId::IsInActiveLoop];

/// Address table for inbound status messages.
#[derive(Debug)]
pub struct Dispatcher {
    table: HashMap<String, Topic>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut table: HashMap<String, Topic> = FIXED_TOPICS
            .iter()
            .map(|(addr, topic)| (addr.to_string(), *topic))
            .collect();
        for setting in Setting::ALL {
            table.insert(setting.address(), Topic::Setting(setting));
        }
        Self { table }
    }

    /// Exact-match lookup.
    pub fn topic(&self, addr: &str) -> Option<Topic> {
        self.table.get(addr).copied()
    }

    /// Apply a message. Unknown addresses are ignored and yield `None`.
    pub fn dispatch(
        &self,
        addr: &str,
        args: &[OscType],
        snapshot: &mut Snapshot,
    ) -> Option<(Topic, Dispatch)> {
        let Some(topic) = self.topic(addr) else {
            log::trace!("[DISPATCH] Ignoring unknown address {}", addr);
            return None;
        };
        let dispatch = apply(topic, args, snapshot);
        snapshot.bump_version();
        Some((topic, dispatch))
    }
}

/// Write one topic's arguments into the snapshot.
pub fn apply(topic: Topic, args: &[OscType], s: &mut Snapshot) -> Dispatch {
    let arg = |i: usize| args.get(i);
    let transport = &mut s.transport;
    let setlist = &mut s.setlist;

    match topic {
        Topic::BeatsPosition => {
            transport.beats_position = coerce::number(arg(0)).unwrap_or(0.0);
            Dispatch::feedbacks(&POSITION_FEEDBACKS)
        }
        Topic::FinePosition => {
            transport.fine_position = coerce::number(arg(0));
            Dispatch::feedbacks(&POSITION_FEEDBACKS)
        }
        Topic::HumanPosition => {
            transport.human_position = HumanPosition {
                bar: coerce::integer(arg(0)).unwrap_or(0),
                beat: coerce::number(arg(1)).unwrap_or(0.0),
            };
            Dispatch {
                immediate: vec![FeedbackId::IsBeat],
                ..Default::default()
            }
        }
        Topic::CurrentMeasure => {
            let beats_in_measure = coerce::integer(arg(2)).unwrap_or(0);
            transport.current_measure = (beats_in_measure > 0).then(|| Measure {
                bar: coerce::integer(arg(0)).unwrap_or(0),
                beat: coerce::integer(arg(1)).unwrap_or(0),
                beats_in_measure,
            });
            Dispatch {
                feedbacks: vec![FeedbackId::BeatIsInBar],
                immediate: vec![FeedbackId::IsBeat],
                ..Default::default()
            }
        }
        Topic::Tempo => {
            transport.tempo = coerce::number(arg(0)).unwrap_or(0.0);
            Dispatch::default()
        }
        Topic::IsPlaying => {
            transport.is_playing = coerce::truthy(arg(0));
            Dispatch {
                liveness: Some(Liveness::PrimaryState),
                ..Dispatch::feedbacks(&[FeedbackId::IsPlaying])
            }
        }
        Topic::IsRecording => {
            transport.is_recording = coerce::truthy(arg(0));
            Dispatch::feedbacks(&[FeedbackId::IsRecording])
        }
        Topic::TimeSignature => {
            let part = |i: usize, default: i64| {
                coerce::integer(arg(i))
                    .unwrap_or(default)
                    .clamp(1, u32::MAX as i64) as u32
            };
            transport.time_signature = TimeSignature::new(part(0, 4), part(1, 4));
            Dispatch::feedbacks(&[FeedbackId::BeatIsInBar])
        }
        Topic::IsSyncingPlayback => {
            transport.is_syncing_playback = coerce::truthy(arg(0));
            Dispatch::feedbacks(&[FeedbackId::IsSyncingPlayback])
        }
        Topic::Heartbeat => Dispatch {
            liveness: Some(Liveness::Heartbeat),
            ..Default::default()
        },
        Topic::SetlistName => {
            setlist.name = coerce::string(arg(0));
            Dispatch::default()
        }
        Topic::Songs => {
            setlist.songs = coerce::string_list(args);
            Dispatch::feedbacks(&[
                FeedbackId::CanJumpToNextSong,
                FeedbackId::CanJumpToPreviousSong,
            ])
            .with_projection(ProjectionGroup::Songs)
        }
        Topic::Sections => {
            setlist.sections = coerce::string_list(args);
            Dispatch::feedbacks(&[
                FeedbackId::CanJumpToNextSection,
                FeedbackId::CanJumpToPreviousSection,
                FeedbackId::IsFutureSection,
                FeedbackId::SectionColor,
                FeedbackId::SectionProgressByNumber,
            ])
            .with_projection(ProjectionGroup::Sections)
        }
        Topic::SectionColors => {
            setlist.section_colors = coerce::string_list(args);
            Dispatch::feedbacks(&[FeedbackId::SectionColor])
        }
        Topic::ActiveSongName => {
            setlist.active_song_name = coerce::string(arg(0));
            Dispatch::default().with_projection(ProjectionGroup::Songs)
        }
        Topic::ActiveSongIndex => {
            setlist.active_song_index = coerce::index(arg(0));
            Dispatch::feedbacks(&[
                FeedbackId::IsCurrentSong,
                FeedbackId::CanJumpToNextSong,
                FeedbackId::CanJumpToPreviousSong,
                FeedbackId::IsQueuedNextSong,
            ])
            .with_projection(ProjectionGroup::Songs)
        }
        Topic::ActiveSongStart => {
            setlist.active_song_start = coerce::number(arg(0));
            Dispatch::feedbacks(&[FeedbackId::SongProgress])
        }
        Topic::ActiveSongEnd => {
            setlist.active_song_end = coerce::number(arg(0));
            Dispatch::feedbacks(&[FeedbackId::SongProgress])
        }
        Topic::ActiveSectionName => {
            setlist.active_section_name = coerce::string(arg(0));
            Dispatch::default().with_projection(ProjectionGroup::Sections)
        }
        Topic::ActiveSectionIndex => {
            setlist.active_section_index = coerce::index(arg(0));
            Dispatch::feedbacks(&[
                FeedbackId::IsCurrentSection,
                FeedbackId::CanJumpToNextSection,
                FeedbackId::CanJumpToPreviousSection,
                FeedbackId::IsQueuedNextSection,
                FeedbackId::IsFutureSection,
                FeedbackId::SectionColor,
                FeedbackId::SectionProgressByNumber,
            ])
            .with_projection(ProjectionGroup::Sections)
        }
        Topic::ActiveSectionStart => {
            setlist.active_section_start = coerce::number(arg(0));
            Dispatch::feedbacks(&[
                FeedbackId::SectionProgress,
                FeedbackId::SectionProgressByNumber,
            ])
        }
        Topic::ActiveSectionEnd => {
            setlist.active_section_end = coerce::number(arg(0));
            Dispatch::feedbacks(&[
                FeedbackId::SectionProgress,
                FeedbackId::SectionProgressByNumber,
            ])
        }
        Topic::QueuedName => {
            setlist.queued_song_name = coerce::string(arg(0));
            setlist.queued_section_name = coerce::string(arg(1));
            Dispatch::default()
        }
        Topic::QueuedIndex => {
            setlist.queued_song_index = coerce::index(arg(0));
            setlist.queued_section_index = coerce::index(arg(1));
            Dispatch::feedbacks(&[
                FeedbackId::IsQueuedSong,
                FeedbackId::IsQueuedSection,
                FeedbackId::IsQueuedNextSong,
                FeedbackId::IsQueuedNextSection,
                FeedbackId::CanJumpToNextSong,
                FeedbackId::CanJumpToPreviousSong,
                FeedbackId::CanJumpToNextSection,
                FeedbackId::CanJumpToPreviousSection,
            ])
        }
        Topic::LoopEnabled => {
            setlist.loop_enabled = coerce::truthy(arg(0));
            Dispatch::feedbacks(&LOOP_FEEDBACKS)
        }
        Topic::LoopStart => {
            setlist.loop_start = coerce::number(arg(0));
            Dispatch::feedbacks(&LOOP_FEEDBACKS)
        }
        Topic::LoopEnd => {
            setlist.loop_end = coerce::number(arg(0));
            Dispatch::feedbacks(&LOOP_FEEDBACKS)
        }
        Topic::IsCountingIn => {
            setlist.is_counting_in = coerce::truthy(arg(0));
            Dispatch::default()
        }
        Topic::RemainingTimeInSong => {
            setlist.remaining_time_in_song = coerce::number(arg(0));
            Dispatch::default()
        }
        Topic::RemainingTimeInSet => {
            setlist.remaining_time_in_set = coerce::number(arg(0));
            Dispatch::default()
        }
        Topic::PlayAudio12Connected => {
            s.play_audio12.connected = coerce::truthy(arg(0));
            Dispatch::feedbacks(&[FeedbackId::PlayAudio12IsConnected])
        }
        Topic::PlayAudio12Scene => {
            s.play_audio12.scene = coerce::integer(arg(0)).unwrap_or(0);
            Dispatch::feedbacks(&[FeedbackId::PlayAudio12Scene])
        }
        Topic::Timecode => {
            s.timecode.tc = Timecode::parse(&coerce::string(arg(0)));
            Dispatch::default()
        }
        Topic::TimecodeFps => {
            s.timecode.fps = coerce::string(arg(0));
            Dispatch::default()
        }
        Topic::TimecodeStale => {
            s.timecode.stale = Some(coerce::truthy(arg(0)));
            Dispatch::feedbacks(&[FeedbackId::IsTimecodeActive])
        }
        Topic::Setting(setting) => {
            match setting_value(setting, arg(0)) {
                Some(value) => s.settings.set(setting, value),
                None => log::debug!(
                    "[DISPATCH] Unusable value {:?} for setting {}",
                    arg(0),
                    setting.id()
                ),
            }
            Dispatch::feedbacks(&[FeedbackId::SettingEqualsValue])
        }
    }
}

fn setting_value(setting: Setting, arg: Option<&OscType>) -> Option<SettingValue> {
    match setting.kind() {
        SettingKind::Boolean => Some(SettingValue::Bool(coerce::truthy(arg))),
        SettingKind::Integer => coerce::integer(arg).map(SettingValue::Int),
        SettingKind::Text => Some(SettingValue::Text(coerce::string(arg))),
    }
}
