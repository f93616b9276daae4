use std::fmt;

use crate::notes::MidiNote;
use crate::{Error, Result};

/// Pitch-class intervals measured from the root, as a 12-bit mask.
///
/// Bit `i` set means interval `i` (in semitones, mod 12) is present.
/// Bit 0 is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalProfile {
    mask: u16,
}

impl IntervalProfile {
    pub const fn from_mask(mask: u16) -> Self {
        Self {
            mask: (mask & 0x0fff) | 1,
        }
    }

    pub fn from_intervals(intervals: &[u8]) -> Self {
        let mask = intervals
            .iter()
            .fold(0u16, |mask, &i| mask | 1 << (i % 12));
        Self::from_mask(mask)
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Never true: the root interval is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, interval: u8) -> bool {
        interval < 12 && self.mask & (1 << interval) != 0
    }

    /// True when every interval of `other` is also in `self`.
    pub fn is_superset_of(&self, other: &IntervalProfile) -> bool {
        self.mask & other.mask == other.mask
    }

    /// Ascending interval list, e.g. `[0, 4, 7]`.
    pub fn intervals(&self) -> Vec<u8> {
        (0..12u8).filter(|&i| self.contains(i)).collect()
    }
}

impl fmt::Display for IntervalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.intervals().iter().map(u8::to_string).collect();
        write!(f, "({})", parts.join(","))
    }
}

/// Lowest note becomes the root; every other note is reduced to its
/// pitch-class distance above it.
pub fn build_profile(midi_notes: &[MidiNote]) -> Result<(MidiNote, IntervalProfile)> {
    let root = *midi_notes.iter().min().ok_or(Error::EmptyChord)?;
    let root_pc = root.pitch_class();

    let mask = midi_notes.iter().fold(0u16, |mask, note| {
        let interval = (note.pitch_class() + 12 - root_pc) % 12;
        mask | 1 << interval
    });

    Ok((root, IntervalProfile::from_mask(mask)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::validate;

    fn profile_of(notes: &[u8]) -> (u8, Vec<u8>) {
        let notes = validate(notes).unwrap();
        let (root, profile) = build_profile(&notes).unwrap();
        (root.value(), profile.intervals())
    }

    #[test]
    fn c_major_triad() {
        assert_eq!(profile_of(&[60, 64, 67]), (60, vec![0, 4, 7]));
    }

    #[test]
    fn input_order_does_not_matter() {
        assert_eq!(profile_of(&[67, 60, 64]), (60, vec![0, 4, 7]));
    }

    #[test]
    fn octave_doublings_collapse() {
        assert_eq!(profile_of(&[48, 60, 64, 67, 72, 76]), (48, vec![0, 4, 7]));
    }

    #[test]
    fn bass_note_is_root() {
        // First-inversion C major is analyzed from E.
        assert_eq!(profile_of(&[64, 67, 72]), (64, vec![0, 3, 8]));
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(build_profile(&[]), Err(Error::EmptyChord));
    }

    #[test]
    fn display_lists_intervals() {
        let profile = IntervalProfile::from_intervals(&[0, 1, 6]);
        assert_eq!(profile.to_string(), "(0,1,6)");
        assert_eq!(profile.len(), 3);
    }

    #[test]
    fn superset_check() {
        let dom7 = IntervalProfile::from_intervals(&[0, 4, 7, 10]);
        let major = IntervalProfile::from_intervals(&[0, 4, 7]);
        assert!(dom7.is_superset_of(&major));
        assert!(!major.is_superset_of(&dom7));
    }
}
