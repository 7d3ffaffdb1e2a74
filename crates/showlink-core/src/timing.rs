//! Musical and timecode primitives mirrored from the show controller.
//!
//! - [`TimeSignature`] - Musical time signature (e.g., 4/4, 6/8)
//! - [`HumanPosition`] - Playhead as bar and beat
//! - [`Measure`] - The current measure including its beat count
//! - [`Timecode`] - An `HH:MM:SS:FF` timecode split into its parts

/// Musical time signature (numerator/denominator).
///
/// The numerator indicates beats per bar, and the denominator indicates
/// the note value that gets one beat (4 = quarter note, 8 = eighth note).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    /// Create a new time signature.
    ///
    /// Values are clamped to at least 1 to prevent division by zero.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator: numerator.max(1),
            denominator: denominator.max(1),
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Playhead position in bars and beats, both 1-based.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HumanPosition {
    pub bar: i64,
    pub beat: f64,
}

impl std::fmt::Display for HumanPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.bar, self.beat)
    }
}

/// The measure the playhead is in.
///
/// Unlike the time signature this reflects irregular measures, so it is
/// preferred for deciding how many beats a bar has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Measure {
    pub bar: i64,
    pub beat: i64,
    pub beats_in_measure: i64,
}

/// Timecode split into its two-digit parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timecode {
    pub full: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub frames: String,
}

/// Characters `start..end` of `s`, clamped to its length.
fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

impl Timecode {
    /// Split a `HH:MM:SS:FF` string by fixed offsets.
    ///
    /// Malformed input still yields parts (possibly short or empty).
    pub fn parse(tc: &str) -> Self {
        Self {
            full: tc.to_string(),
            hours: char_slice(tc, 0, 2),
            minutes: char_slice(tc, 3, 5),
            seconds: char_slice(tc, 6, 8),
            frames: char_slice(tc, 9, 11),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_signature_clamps_and_displays() {
        assert_eq!(TimeSignature::new(0, 0), TimeSignature::new(1, 1));
        assert_eq!(TimeSignature::new(7, 8).to_string(), "7/8");
    }

    #[test]
    fn test_timecode_parse() {
        let tc = Timecode::parse("01:23:45:12");
        assert_eq!(tc.hours, "01");
        assert_eq!(tc.minutes, "23");
        assert_eq!(tc.seconds, "45");
        assert_eq!(tc.frames, "12");
    }

    #[test]
    fn test_timecode_malformed() {
        let tc = Timecode::parse("1:2");
        assert_eq!(tc.hours, "1:");
        assert_eq!(tc.minutes, "");
        assert_eq!(tc.frames, "");

        let tc = Timecode::parse("");
        assert_eq!(tc, Timecode::default());
    }

    #[test]
    fn test_human_position_display() {
        let pos = HumanPosition { bar: 12, beat: 3.0 };
        assert_eq!(pos.to_string(), "12.3");
    }
}
