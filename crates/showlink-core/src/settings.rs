//! Show controller settings mirrored under `/settings/<name>`.

use serde::Serialize;

/// A remote setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Setting {
    Autoplay,
    SafeMode,
    AlwaysStopOnSongEnd,
    AutoJumpToNextSong,
    AutoLoopCurrentSection,
    CountIn,
    CountInSoloClick,
    CountInDuration,
    JumpMode,
}

/// How a setting's value is typed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
    Boolean,
    Integer,
    Text,
}

impl Setting {
    pub const ALL: [Setting; 9] = [
        Setting::Autoplay,
        Setting::SafeMode,
        Setting::AlwaysStopOnSongEnd,
        Setting::AutoJumpToNextSong,
        Setting::AutoLoopCurrentSection,
        Setting::CountIn,
        Setting::CountInSoloClick,
        Setting::CountInDuration,
        Setting::JumpMode,
    ];

    /// Settings that are plain on/off switches.
    pub const BOOLEAN: [Setting; 7] = [
        Setting::Autoplay,
        Setting::SafeMode,
        Setting::AlwaysStopOnSongEnd,
        Setting::AutoJumpToNextSong,
        Setting::AutoLoopCurrentSection,
        Setting::CountIn,
        Setting::CountInSoloClick,
    ];

    /// Name used in the OSC address and as variable name.
    pub fn id(self) -> &'static str {
        match self {
            Setting::Autoplay => "autoplay",
            Setting::SafeMode => "safeMode",
            Setting::AlwaysStopOnSongEnd => "alwaysStopOnSongEnd",
            Setting::AutoJumpToNextSong => "autoJumpToNextSong",
            Setting::AutoLoopCurrentSection => "autoLoopCurrentSection",
            Setting::CountIn => "countIn",
            Setting::CountInSoloClick => "countInSoloClick",
            Setting::CountInDuration => "countInDuration",
            Setting::JumpMode => "jumpMode",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Setting::Autoplay => "Autoplay",
            Setting::SafeMode => "Safe Mode",
            Setting::AlwaysStopOnSongEnd => "Always Stop on Song End",
            Setting::AutoJumpToNextSong => "Autojump to the Next Song",
            Setting::AutoLoopCurrentSection => "Autoloop the Current Section",
            Setting::CountIn => "Count-In",
            Setting::CountInSoloClick => "Solo Click During Count-In",
            Setting::CountInDuration => "Count-In Duration",
            Setting::JumpMode => "Jump Mode",
        }
    }

    pub fn kind(self) -> SettingKind {
        match self {
            Setting::CountInDuration => SettingKind::Integer,
            Setting::JumpMode => SettingKind::Text,
            _ => SettingKind::Boolean,
        }
    }

    pub fn from_id(id: &str) -> Option<Setting> {
        Setting::ALL.iter().copied().find(|s| s.id() == id)
    }

    /// OSC address of this setting.
    pub fn address(self) -> String {
        format!("/settings/{}", self.id())
    }
}

/// A mirrored setting value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Int(i) => write!(f, "{}", i),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// Jump quantization modes with their labels.
pub const JUMP_MODES: [(&str, &str); 4] = [
    ("quantized", "Quantized"),
    ("end-of-section", "End of Section"),
    ("end-of-song", "End of Song"),
    ("manual", "Manual"),
];

/// Count-in lengths in bars with their labels.
pub const COUNT_IN_DURATIONS: [(i64, &str); 3] = [(1, "1 Bar"), (2, "2 Bars"), (4, "4 Bars")];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_ids_roundtrip() {
        for setting in Setting::ALL {
            assert_eq!(Setting::from_id(setting.id()), Some(setting));
        }
        assert_eq!(Setting::from_id("volume"), None);
        assert_eq!(Setting::SafeMode.address(), "/settings/safeMode");
    }

    #[test]
    fn test_setting_value_display() {
        assert_eq!(SettingValue::Bool(true).to_string(), "true");
        assert_eq!(SettingValue::Int(2).to_string(), "2");
        assert_eq!(SettingValue::Text("manual".into()).to_string(), "manual");
    }
}
