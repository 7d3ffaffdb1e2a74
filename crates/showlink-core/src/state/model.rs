//! State model types for showlink.
//!
//! These types mirror what the show controller reports about itself. Every
//! field arrives in its own OSC message, so any subset may be stale or
//! missing; unknown values are `None`, `-1` or empty and never invalid.

use crate::settings::{Setting, SettingValue};
use crate::timing::{HumanPosition, Measure, TimeSignature, Timecode};
use std::time::Instant;

/// Central state snapshot for one session.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Bumped on every applied update.
    pub version: u64,
    pub transport: TransportState,
    pub setlist: SetlistState,
    pub play_audio12: PlayAudio12State,
    pub timecode: TimecodeState,
    pub settings: SettingsMirror,
    pub connection: ConnectionState,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the version counter.
    pub fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Index used to decide where the next jump lands: the queued song if
    /// one is queued, otherwise the active one.
    pub fn relevant_song_index(&self) -> i64 {
        let setlist = &self.setlist;
        if setlist.queued_song_index != -1 {
            setlist.queued_song_index
        } else {
            setlist.active_song_index
        }
    }

    /// Same as [`Snapshot::relevant_song_index`] for sections. Decided
    /// independently of the song axis.
    pub fn relevant_section_index(&self) -> i64 {
        let setlist = &self.setlist;
        if setlist.queued_section_index != -1 {
            setlist.queued_section_index
        } else {
            setlist.active_section_index
        }
    }

    /// Beats in the current bar: the received measure if any, else the
    /// time signature numerator.
    pub fn beats_in_bar(&self) -> i64 {
        match self.transport.current_measure {
            Some(measure) => measure.beats_in_measure,
            None => self.transport.time_signature.numerator as i64,
        }
    }
}

/// Playhead and transport flags.
#[derive(Clone, Debug, Default)]
pub struct TransportState {
    /// Playhead in beats.
    pub beats_position: f64,
    /// High-frequency playhead, only sent when fine updates are requested.
    pub fine_position: Option<f64>,
    pub human_position: HumanPosition,
    pub tempo: f64,
    pub is_playing: bool,
    pub is_recording: bool,
    pub time_signature: TimeSignature,
    pub current_measure: Option<Measure>,
    pub is_syncing_playback: bool,
}

impl TransportState {
    /// Best known playhead position.
    pub fn position(&self) -> f64 {
        self.fine_position.unwrap_or(self.beats_position)
    }
}

/// Setlist, active/queued song and section, loop region.
#[derive(Clone, Debug)]
pub struct SetlistState {
    pub name: String,
    pub songs: Vec<String>,
    pub sections: Vec<String>,
    /// Color names parallel to `sections`.
    pub section_colors: Vec<String>,
    pub active_song_index: i64,
    pub active_song_name: String,
    pub active_song_start: Option<f64>,
    pub active_song_end: Option<f64>,
    pub active_section_index: i64,
    pub active_section_name: String,
    pub active_section_start: Option<f64>,
    pub active_section_end: Option<f64>,
    pub queued_song_index: i64,
    pub queued_section_index: i64,
    pub queued_song_name: String,
    pub queued_section_name: String,
    pub loop_enabled: bool,
    pub loop_start: Option<f64>,
    pub loop_end: Option<f64>,
    pub is_counting_in: bool,
    /// Seconds left in the active song.
    pub remaining_time_in_song: Option<f64>,
    /// Seconds left in the setlist.
    pub remaining_time_in_set: Option<f64>,
}

impl Default for SetlistState {
    fn default() -> Self {
        Self {
            name: String::new(),
            songs: Vec::new(),
            sections: Vec::new(),
            section_colors: Vec::new(),
            active_song_index: -1,
            active_song_name: String::new(),
            active_song_start: None,
            active_song_end: None,
            active_section_index: -1,
            active_section_name: String::new(),
            active_section_start: None,
            active_section_end: None,
            queued_song_index: -1,
            queued_section_index: -1,
            queued_song_name: String::new(),
            queued_section_name: String::new(),
            loop_enabled: false,
            loop_start: None,
            loop_end: None,
            is_counting_in: false,
            remaining_time_in_song: None,
            remaining_time_in_set: None,
        }
    }
}

/// Entry at `index`, if it exists.
pub(crate) fn name_at(list: &[String], index: i64) -> Option<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .map(String::as_str)
}

impl SetlistState {
    pub fn song_name(&self, index: i64) -> Option<&str> {
        name_at(&self.songs, index)
    }

    pub fn section_name(&self, index: i64) -> Option<&str> {
        name_at(&self.sections, index)
    }

    pub fn section_color(&self, index: i64) -> Option<&str> {
        name_at(&self.section_colors, index)
    }
}

/// PlayAUDIO12 redundancy interface.
#[derive(Clone, Debug, Default)]
pub struct PlayAudio12State {
    pub connected: bool,
    /// 1 = scene A, 2 = scene B, 0 = unknown.
    pub scene: i64,
}

/// LTC timecode input.
#[derive(Clone, Debug, Default)]
pub struct TimecodeState {
    pub tc: Timecode,
    pub fps: String,
    /// `None` until the first staleness report.
    pub stale: Option<bool>,
}

/// Mirror of the remote settings, each `None` until first received.
#[derive(Clone, Debug, Default)]
pub struct SettingsMirror {
    pub autoplay: Option<bool>,
    pub safe_mode: Option<bool>,
    pub always_stop_on_song_end: Option<bool>,
    pub auto_jump_to_next_song: Option<bool>,
    pub auto_loop_current_section: Option<bool>,
    pub count_in: Option<bool>,
    pub count_in_solo_click: Option<bool>,
    pub count_in_duration: Option<i64>,
    pub jump_mode: Option<String>,
}

impl SettingsMirror {
    fn flag_mut(&mut self, setting: Setting) -> Option<&mut Option<bool>> {
        match setting {
            Setting::Autoplay => Some(&mut self.autoplay),
            Setting::SafeMode => Some(&mut self.safe_mode),
            Setting::AlwaysStopOnSongEnd => Some(&mut self.always_stop_on_song_end),
            Setting::AutoJumpToNextSong => Some(&mut self.auto_jump_to_next_song),
            Setting::AutoLoopCurrentSection => Some(&mut self.auto_loop_current_section),
            Setting::CountIn => Some(&mut self.count_in),
            Setting::CountInSoloClick => Some(&mut self.count_in_solo_click),
            Setting::CountInDuration | Setting::JumpMode => None,
        }
    }

    /// Current value of a setting.
    pub fn get(&self, setting: Setting) -> Option<SettingValue> {
        match setting {
            Setting::Autoplay => self.autoplay.map(SettingValue::Bool),
            Setting::SafeMode => self.safe_mode.map(SettingValue::Bool),
            Setting::AlwaysStopOnSongEnd => self.always_stop_on_song_end.map(SettingValue::Bool),
            Setting::AutoJumpToNextSong => self.auto_jump_to_next_song.map(SettingValue::Bool),
            Setting::AutoLoopCurrentSection => {
                self.auto_loop_current_section.map(SettingValue::Bool)
            }
            Setting::CountIn => self.count_in.map(SettingValue::Bool),
            Setting::CountInSoloClick => self.count_in_solo_click.map(SettingValue::Bool),
            Setting::CountInDuration => self.count_in_duration.map(SettingValue::Int),
            Setting::JumpMode => self.jump_mode.clone().map(SettingValue::Text),
        }
    }

    /// Store a value. Values of the wrong kind are ignored.
    pub fn set(&mut self, setting: Setting, value: SettingValue) {
        match (setting, value) {
            (Setting::CountInDuration, SettingValue::Int(n)) => self.count_in_duration = Some(n),
            (Setting::JumpMode, SettingValue::Text(s)) => self.jump_mode = Some(s),
            (setting, SettingValue::Bool(b)) => {
                if let Some(slot) = self.flag_mut(setting) {
                    *slot = Some(b);
                }
            }
            (setting, value) => {
                log::debug!("[STATE] Ignoring {:?} for setting {}", value, setting.id());
            }
        }
    }
}

/// Liveness bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ConnectionState {
    pub is_connected: bool,
    pub last_heartbeat_at: Option<Instant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_unknown() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.setlist.active_song_index, -1);
        assert_eq!(snapshot.setlist.queued_section_index, -1);
        assert_eq!(snapshot.setlist.loop_start, None);
        assert_eq!(snapshot.settings.get(Setting::Autoplay), None);
        assert_eq!(snapshot.timecode.stale, None);
        assert!(!snapshot.connection.is_connected);
    }

    #[test]
    fn test_relevant_index_prefers_queued() {
        let mut snapshot = Snapshot::new();
        snapshot.setlist.active_song_index = 2;
        assert_eq!(snapshot.relevant_song_index(), 2);
        snapshot.setlist.queued_song_index = 4;
        assert_eq!(snapshot.relevant_song_index(), 4);
        // the section axis is unaffected by a queued song
        snapshot.setlist.active_section_index = 1;
        assert_eq!(snapshot.relevant_section_index(), 1);
    }

    #[test]
    fn test_beats_in_bar_prefers_measure() {
        let mut snapshot = Snapshot::new();
        snapshot.transport.time_signature = TimeSignature::new(3, 4);
        assert_eq!(snapshot.beats_in_bar(), 3);
        snapshot.transport.current_measure = Some(Measure {
            bar: 5,
            beat: 1,
            beats_in_measure: 5,
        });
        assert_eq!(snapshot.beats_in_bar(), 5);
    }

    #[test]
    fn test_name_lookup_tolerates_bad_index() {
        let mut setlist = SetlistState::default();
        setlist.songs = vec!["A".into(), "B".into()];
        assert_eq!(setlist.song_name(1), Some("B"));
        assert_eq!(setlist.song_name(2), None);
        assert_eq!(setlist.song_name(-1), None);
        assert_eq!(setlist.section_color(0), None);
    }

    #[test]
    fn test_settings_mirror() {
        let mut settings = SettingsMirror::default();
        settings.set(Setting::SafeMode, SettingValue::Bool(true));
        settings.set(Setting::CountInDuration, SettingValue::Int(2));
        settings.set(Setting::JumpMode, SettingValue::Text("manual".into()));
        settings.set(Setting::Autoplay, SettingValue::Text("nope".into()));

        assert_eq!(settings.get(Setting::SafeMode), Some(SettingValue::Bool(true)));
        assert_eq!(settings.get(Setting::CountInDuration), Some(SettingValue::Int(2)));
        assert_eq!(
            settings.get(Setting::JumpMode),
            Some(SettingValue::Text("manual".into()))
        );
        assert_eq!(settings.get(Setting::Autoplay), None);
    }
}
