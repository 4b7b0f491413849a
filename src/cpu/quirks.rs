// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Controls the [Quirks] behavior of the CPU on a granular level.

/// Controls the quirk behavior of the CPU on a granular level.
///
/// `false` is the default for every quirk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quirks {
    /// Sprites that run off the edge of the screen wrap around to the opposite edge,
    /// instead of being clipped.
    ///
    /// The starting coordinate always wraps, whatever this is set to.
    pub screen_wrap: bool,
}

impl From<bool> for Quirks {
    fn from(value: bool) -> Self {
        Quirks { screen_wrap: value }
    }
}
