//! Button colors and the section color palette.

use serde::Serialize;

/// An RGB color as the control host expects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Pack into `0xRRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.to_u32())
    }
}

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const GRAY: Rgb = Rgb(128, 128, 128);
pub const DARK_GRAY: Rgb = Rgb(80, 80, 80);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const GREEN_500: Rgb = Rgb(34, 197, 94);
pub const GREEN_700: Rgb = Rgb(21, 128, 61);
pub const GREEN_800: Rgb = Rgb(22, 101, 52);
pub const RED_600: Rgb = Rgb(220, 38, 38);
pub const RED_700: Rgb = Rgb(185, 28, 28);

/// Section colors by the names the show controller uses.
const SECTION_PALETTE: [(&str, Rgb); 15] = [
    ("red", Rgb(220, 38, 38)),
    ("orange", Rgb(234, 88, 12)),
    ("amber", Rgb(217, 119, 6)),
    ("yellow", Rgb(202, 138, 4)),
    ("lime", Rgb(101, 163, 13)),
    ("green", Rgb(56, 161, 105)),
    ("emerald", Rgb(5, 150, 105)),
    ("teal", Rgb(13, 148, 136)),
    ("sky", Rgb(2, 132, 199)),
    ("blue", Rgb(37, 99, 235)),
    ("violet", Rgb(124, 58, 237)),
    ("purple", Rgb(147, 51, 234)),
    ("pink", Rgb(219, 39, 119)),
    ("gray", Rgb(75, 85, 99)),
    ("black", BLACK),
];

/// Look up a section color by name.
pub fn section_color(name: &str) -> Option<Rgb> {
    SECTION_PALETTE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}
