//! Projection of the snapshot into host-facing variables.
//!
//! Most variables follow a single inbound topic and are pushed as soon as
//! that topic arrives ([`variables_for`]). The next/previous song and
//! section names depend on several topics at once and are rebuilt by
//! [`project_songs`] / [`project_sections`] behind a trailing debounce.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dispatcher::{ProjectionGroup, Topic};
use crate::feedback::FeedbackId;
use crate::settings::{Setting, SettingValue};
use crate::state::{name_at, Snapshot};
use crate::supervisor::ConnectionStatus;

/// Number of `song<N>Name` slots.
pub const SONG_SLOTS: usize = 64;
/// Number of `section<N>Name` / `section<N>Color` slots.
pub const SECTION_SLOTS: usize = 32;
/// How far `nextSongName<N>` and friends reach.
pub const RELATIVE_SLOTS: usize = 8;

/// A projected variable value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    /// Unknown or out of range.
    Empty,
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableValue::Text(s) => f.write_str(s),
            VariableValue::Number(n) => f.write_str(&crate::coerce::format_number(*n)),
            VariableValue::Int(i) => write!(f, "{}", i),
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for VariableValue {
    fn from(n: f64) -> Self {
        VariableValue::Number(n)
    }
}

impl From<i64> for VariableValue {
    fn from(i: i64) -> Self {
        VariableValue::Int(i)
    }
}

impl From<bool> for VariableValue {
    fn from(b: bool) -> Self {
        VariableValue::Bool(b)
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        VariableValue::Text(s.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(s: String) -> Self {
        VariableValue::Text(s)
    }
}

impl<T: Into<VariableValue>> From<Option<T>> for VariableValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(VariableValue::Empty, Into::into)
    }
}

impl From<SettingValue> for VariableValue {
    fn from(value: SettingValue) -> Self {
        match value {
            SettingValue::Bool(b) => VariableValue::Bool(b),
            SettingValue::Int(i) => VariableValue::Int(i),
            SettingValue::Text(s) => VariableValue::Text(s),
        }
    }
}

/// Variable name to value.
pub type Variables = BTreeMap<String, VariableValue>;

fn put(vars: &mut Variables, name: impl Into<String>, value: impl Into<VariableValue>) {
    vars.insert(name.into(), value.into());
}

/// Receiver of everything the engine publishes.
pub trait ProjectionSink: Send {
    fn set_variables(&mut self, variables: &Variables);
    /// The listed feedbacks may have changed and should be re-evaluated
    /// against `snapshot`. The snapshot stays read-locked for the call.
    fn check_feedbacks(&mut self, ids: &[FeedbackId], snapshot: &Snapshot);
    fn update_status(&mut self, status: &ConnectionStatus);
}

/// Suffix for relative slot `n`: nothing for 1, the number otherwise.
fn relative_suffix(n: usize) -> String {
    if n == 1 {
        String::new()
    } else {
        n.to_string()
    }
}

/// Variables that directly mirror `topic`.
pub fn variables_for(topic: Topic, s: &Snapshot) -> Variables {
    let mut vars = Variables::new();
    let transport = &s.transport;
    let setlist = &s.setlist;

    match topic {
        Topic::BeatsPosition => put(&mut vars, "beatsPosition", transport.beats_position),
        Topic::FinePosition => put(&mut vars, "finePosition", transport.fine_position),
        Topic::HumanPosition => {
            put(&mut vars, "humanPosition", transport.human_position.to_string());
            put(&mut vars, "humanPositionBeats", transport.human_position.beat);
        }
        Topic::CurrentMeasure => put(&mut vars, "currentMeasureBeats", s.beats_in_bar()),
        Topic::Tempo => put(&mut vars, "tempo", transport.tempo),
        Topic::IsPlaying => put(&mut vars, "isPlaying", transport.is_playing),
        Topic::IsRecording => put(&mut vars, "isRecording", transport.is_recording),
        Topic::TimeSignature => {
            let sig = transport.time_signature;
            put(&mut vars, "timeSignature", sig.to_string());
            put(&mut vars, "timeSignatureNumerator", sig.numerator as i64);
            put(&mut vars, "timeSignatureDenominator", sig.denominator as i64);
            put(&mut vars, "currentMeasureBeats", s.beats_in_bar());
        }
        Topic::IsSyncingPlayback => {
            put(&mut vars, "isSyncingPlayback", transport.is_syncing_playback)
        }
        Topic::Heartbeat => {}
        Topic::SetlistName => put(&mut vars, "setlistName", setlist.name.as_str()),
        Topic::Songs => {
            for i in 0..SONG_SLOTS {
                let name = setlist.songs.get(i).map_or("", String::as_str);
                put(&mut vars, format!("song{}Name", i + 1), name);
            }
        }
        Topic::Sections => {
            put(&mut vars, "sectionsCount", setlist.sections.len() as i64);
            for i in 0..SECTION_SLOTS {
                let name = setlist.sections.get(i).map_or("", String::as_str);
                put(&mut vars, format!("section{}Name", i + 1), name);
            }
        }
        Topic::SectionColors => {
            for i in 0..SECTION_SLOTS {
                let color = setlist.section_colors.get(i).map_or("", String::as_str);
                put(&mut vars, format!("section{}Color", i + 1), color);
            }
        }
        // name and index go out with the debounced song/section projection
        Topic::ActiveSongName
        | Topic::ActiveSongIndex
        | Topic::ActiveSectionName
        | Topic::ActiveSectionIndex => {}
        Topic::ActiveSongStart => put(&mut vars, "activeSongStart", setlist.active_song_start),
        Topic::ActiveSongEnd => put(&mut vars, "activeSongEnd", setlist.active_song_end),
        Topic::ActiveSectionStart => {
            put(&mut vars, "activeSectionStart", setlist.active_section_start)
        }
        Topic::ActiveSectionEnd => put(&mut vars, "activeSectionEnd", setlist.active_section_end),
        Topic::QueuedName => {
            put(&mut vars, "queuedSongName", setlist.queued_song_name.as_str());
            put(&mut vars, "queuedSectionName", setlist.queued_section_name.as_str());
        }
        Topic::QueuedIndex => {
            put(&mut vars, "queuedSongIndex", setlist.queued_song_index);
            put(&mut vars, "queuedSectionIndex", setlist.queued_section_index);
        }
        Topic::LoopEnabled => put(&mut vars, "loopEnabled", setlist.loop_enabled),
        Topic::LoopStart => put(&mut vars, "loopStart", setlist.loop_start),
        Topic::LoopEnd => put(&mut vars, "loopEnd", setlist.loop_end),
        Topic::IsCountingIn => put(&mut vars, "isCountingIn", setlist.is_counting_in),
        Topic::RemainingTimeInSong => {
            put(&mut vars, "remainingTimeInSong", setlist.remaining_time_in_song)
        }
        Topic::RemainingTimeInSet => {
            put(&mut vars, "remainingTimeInSet", setlist.remaining_time_in_set)
        }
        Topic::PlayAudio12Connected => {
            put(&mut vars, "playAudio12Connected", s.play_audio12.connected)
        }
        Topic::PlayAudio12Scene => put(&mut vars, "playAudio12Scene", s.play_audio12.scene),
        Topic::Timecode => {
            let tc = &s.timecode.tc;
            put(&mut vars, "timecode", tc.full.as_str());
            put(&mut vars, "timecodeHours", tc.hours.as_str());
            put(&mut vars, "timecodeMinutes", tc.minutes.as_str());
            put(&mut vars, "timecodeSeconds", tc.seconds.as_str());
            put(&mut vars, "timecodeFrames", tc.frames.as_str());
        }
        Topic::TimecodeFps => put(&mut vars, "timecodeFps", s.timecode.fps.as_str()),
        Topic::TimecodeStale => put(&mut vars, "timecodeStale", s.timecode.stale),
        Topic::Setting(setting) => put(&mut vars, setting.id(), s.settings.get(setting)),
    }
    vars
}

fn project_relative(
    vars: &mut Variables,
    names: &[String],
    active: i64,
    next_prefix: &str,
    previous_prefix: &str,
) {
    for n in 1..=RELATIVE_SLOTS {
        let suffix = relative_suffix(n);
        let offset = n as i64;
        // -1 stays "nothing active"; no next/previous to speak of
        let (next, previous) = if active < 0 {
            (None, None)
        } else {
            (
                active.checked_add(offset).and_then(|i| name_at(names, i)),
                active.checked_sub(offset).and_then(|i| name_at(names, i)),
            )
        };
        put(vars, format!("{}{}", next_prefix, suffix), next);
        put(vars, format!("{}{}", previous_prefix, suffix), previous);
    }
}

/// Active song name/index plus the next and previous song names.
pub fn project_songs(s: &Snapshot) -> Variables {
    let setlist = &s.setlist;
    let mut vars = Variables::new();
    put(&mut vars, "activeSongName", setlist.active_song_name.as_str());
    put(&mut vars, "activeSongIndex", setlist.active_song_index);
    project_relative(
        &mut vars,
        &setlist.songs,
        setlist.active_song_index,
        "nextSongName",
        "previousSongName",
    );
    vars
}

/// Active section name/index plus the next and previous section names.
pub fn project_sections(s: &Snapshot) -> Variables {
    let setlist = &s.setlist;
    let mut vars = Variables::new();
    put(&mut vars, "activeSectionName", setlist.active_section_name.as_str());
    put(&mut vars, "activeSectionIndex", setlist.active_section_index);
    project_relative(
        &mut vars,
        &setlist.sections,
        setlist.active_section_index,
        "nextSectionName",
        "previousSectionName",
    );
    vars
}

pub fn project_group(group: ProjectionGroup, s: &Snapshot) -> Variables {
    match group {
        ProjectionGroup::Songs => project_songs(s),
        ProjectionGroup::Sections => project_sections(s),
    }
}

/// Every variable, used to publish a full table after a reset.
pub fn project_all(s: &Snapshot) -> Variables {
    let mut vars = Variables::new();
    for topic in crate::dispatcher::all_topics() {
        vars.extend(variables_for(topic, s));
    }
    vars.extend(project_songs(s));
    vars.extend(project_sections(s));
    vars
}

/// A variable as announced to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableDefinition {
    pub id: String,
    pub name: String,
}

impl VariableDefinition {
    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Names and labels of every variable the engine publishes.
pub fn variable_definitions() -> Vec<VariableDefinition> {
    let mut defs: Vec<VariableDefinition> = [
        ("beatsPosition", "Playhead Position in Beats"),
        ("finePosition", "Fine Playhead Position in Beats"),
        ("humanPosition", "Playhead Position in Bars.Beats"),
        ("humanPositionBeats", "Beats Part of the Playhead Position"),
        ("currentMeasureBeats", "Beats in the Current Measure"),
        ("tempo", "Current Tempo"),
        ("isPlaying", "Is Playing"),
        ("isRecording", "Is Recording"),
        ("isSyncingPlayback", "Is Syncing Playback"),
        ("timeSignature", "Time Signature"),
        ("timeSignatureNumerator", "Time Signature Numerator"),
        ("timeSignatureDenominator", "Time Signature Denominator"),
        ("setlistName", "Setlist Name"),
        ("activeSongName", "Active Song Name"),
        ("activeSongIndex", "Active Song Index"),
        ("activeSongStart", "Active Song Start"),
        ("activeSongEnd", "Active Song End"),
        ("queuedSongName", "Queued Song Name"),
        ("queuedSongIndex", "Queued Song Index"),
        ("activeSectionName", "Active Section Name"),
        ("activeSectionIndex", "Active Section Index"),
        ("activeSectionStart", "Active Section Start"),
        ("activeSectionEnd", "Active Section End"),
        ("queuedSectionName", "Queued Section Name"),
        ("queuedSectionIndex", "Queued Section Index"),
        ("sectionsCount", "Number of Sections"),
    ]
    .into_iter()
    .map(|(id, name)| VariableDefinition::new(id, name))
    .collect();

    for i in 1..=SONG_SLOTS {
        defs.push(VariableDefinition::new(
            format!("song{}Name", i),
            format!("Song {} Name", i),
        ));
    }
    for i in 1..=SECTION_SLOTS {
        defs.push(VariableDefinition::new(
            format!("section{}Name", i),
            format!("Section {} Name", i),
        ));
        defs.push(VariableDefinition::new(
            format!("section{}Color", i),
            format!("Section {} Color", i),
        ));
    }
    for (kind, label) in [("Song", "Song"), ("Section", "Section")] {
        for (direction, direction_label) in [("next", "Next"), ("previous", "Previous")] {
            for n in 1..=RELATIVE_SLOTS {
                let name = if n == 1 {
                    format!("{} {} Name", direction_label, label)
                } else {
                    format!("{} {} {} Name", ordinal(n), direction_label, label)
                };
                defs.push(VariableDefinition::new(
                    format!("{}{}Name{}", direction, kind, relative_suffix(n)),
                    name,
                ));
            }
        }
    }

    defs.extend(
        [
            ("loopEnabled", "Loop Enabled"),
            ("loopStart", "Loop Start"),
            ("loopEnd", "Loop End"),
            ("isCountingIn", "Is Counting In"),
            ("remainingTimeInSong", "Remaining Time in Song"),
            ("remainingTimeInSet", "Remaining Time in Set"),
            ("playAudio12Connected", "PlayAUDIO12 Connected"),
            ("playAudio12Scene", "PlayAUDIO12 Scene"),
            ("timecode", "Timecode"),
            ("timecodeHours", "Timecode Hours"),
            ("timecodeMinutes", "Timecode Minutes"),
            ("timecodeSeconds", "Timecode Seconds"),
            ("timecodeFrames", "Timecode Frames"),
            ("timecodeFps", "Timecode FPS"),
            ("timecodeStale", "Timecode Stale"),
        ]
        .into_iter()
        .map(|(id, name)| VariableDefinition::new(id, name)),
    );
    defs.extend(
        Setting::ALL
            .iter()
            .map(|setting| VariableDefinition::new(setting.id(), setting.label())),
    );
    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn songs(s: &mut Snapshot, names: &[&str]) {
        s.setlist.songs = names.iter().map(|n| n.to_string()).collect();
    }

    #[test]
    fn test_next_and_previous_songs() {
        let mut s = Snapshot::new();
        songs(&mut s, &["A", "B", "C"]);
        s.setlist.active_song_index = 0;
        s.setlist.active_song_name = "A".into();

        let vars = project_songs(&s);
        assert_eq!(vars["activeSongName"], VariableValue::Text("A".into()));
        assert_eq!(vars["activeSongIndex"], VariableValue::Int(0));
        assert_eq!(vars["nextSongName"], VariableValue::Text("B".into()));
        assert_eq!(vars["nextSongName2"], VariableValue::Text("C".into()));
        assert_eq!(vars["nextSongName3"], VariableValue::Empty);
        assert_eq!(vars["previousSongName"], VariableValue::Empty);
        assert!(vars.contains_key("previousSongName8"));
    }

    #[test]
    fn test_extreme_active_index_has_no_neighbours() {
        let mut s = Snapshot::new();
        songs(&mut s, &["A", "B"]);
        s.setlist.active_song_index = i64::MAX;
        let vars = project_songs(&s);
        assert_eq!(vars["nextSongName"], VariableValue::Empty);
        assert_eq!(vars["previousSongName8"], VariableValue::Empty);
    }

    #[test]
    fn test_nothing_active_has_no_neighbours() {
        let mut s = Snapshot::new();
        songs(&mut s, &["A", "B"]);
        let vars = project_songs(&s);
        assert_eq!(vars["nextSongName"], VariableValue::Empty);
        assert_eq!(vars["activeSongIndex"], VariableValue::Int(-1));
    }

    #[test]
    fn test_song_slots_are_padded() {
        let mut s = Snapshot::new();
        songs(&mut s, &["Intro"]);
        let vars = variables_for(Topic::Songs, &s);
        assert_eq!(vars.len(), SONG_SLOTS);
        assert_eq!(vars["song1Name"].to_string(), "Intro");
        assert_eq!(vars["song64Name"].to_string(), "");
    }

    #[test]
    fn test_topic_variables() {
        let mut s = Snapshot::new();
        s.transport.human_position.bar = 5;
        s.transport.human_position.beat = 2.0;
        let vars = variables_for(Topic::HumanPosition, &s);
        assert_eq!(vars["humanPosition"].to_string(), "5.2");
        assert_eq!(vars["humanPositionBeats"], VariableValue::Number(2.0));

        let vars = variables_for(Topic::Setting(Setting::JumpMode), &s);
        assert_eq!(vars["jumpMode"], VariableValue::Empty);
        s.settings.jump_mode = Some("manual".into());
        let vars = variables_for(Topic::Setting(Setting::JumpMode), &s);
        assert_eq!(vars["jumpMode"].to_string(), "manual");

        assert!(variables_for(Topic::Heartbeat, &s).is_empty());
    }

    #[test]
    fn test_every_projected_variable_is_defined() {
        let defined: HashSet<String> = variable_definitions().into_iter().map(|d| d.id).collect();
        for name in project_all(&Snapshot::new()).keys() {
            assert!(defined.contains(name), "{} is not defined", name);
        }
    }

    #[test]
    fn test_definition_labels() {
        let defs = variable_definitions();
        let find = |id: &str| defs.iter().find(|d| d.id == id).map(|d| d.name.clone());
        assert_eq!(find("nextSongName").as_deref(), Some("Next Song Name"));
        assert_eq!(find("nextSongName2").as_deref(), Some("2nd Next Song Name"));
        assert_eq!(find("previousSectionName3").as_deref(), Some("3rd Previous Section Name"));
        assert_eq!(find("countIn").as_deref(), Some("Count-In"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(VariableValue::Number(120.0).to_string(), "120");
        assert_eq!(VariableValue::Number(1.5).to_string(), "1.5");
        assert_eq!(VariableValue::Empty.to_string(), "");
        assert_eq!(VariableValue::from(Some(true)).to_string(), "true");
    }
}
