use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Root spellings for major-family chords: the key signature with fewer
/// accidentals wins, F# beats Gb on the six-accidental tie.
const MAJOR_ROOTS: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Root spellings for minor-family chords. D#m/Ebm tie goes to Eb.
const MINOR_ROOTS: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// Highest valid MIDI note number.
pub const MAX_MIDI_NOTE: u8 = 127;

/// Which spelling table names a chord root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSpelling {
    /// Plain sharps, as used for note names.
    Sharps,
    Major,
    Minor,
    /// Diminished chords behave like leading tones and take sharps.
    Diminished,
}

/// Name for a pitch class under the given spelling table.
pub fn spell(pitch_class: u8, spelling: RootSpelling) -> &'static str {
    let idx = (pitch_class % 12) as usize;
    match spelling {
        RootSpelling::Sharps | RootSpelling::Diminished => NOTE_NAMES_SHARP[idx],
        RootSpelling::Major => MAJOR_ROOTS[idx],
        RootSpelling::Minor => MINOR_ROOTS[idx],
    }
}

/// A validated MIDI note number in 0..=127.
///
/// Out-of-range values are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MidiNote(u8);

impl MidiNote {
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    /// MIDI octave convention: note 60 is C4.
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    pub fn name(self) -> NoteName {
        NoteName {
            pitch_class: self.pitch_class(),
            octave: self.octave(),
        }
    }
}

impl TryFrom<i64> for MidiNote {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_MIDI_NOTE)
            .map(MidiNote)
            .ok_or(Error::InvalidNote { value })
    }
}

impl TryFrom<u8> for MidiNote {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        MidiNote::try_from(value as i64)
    }
}

impl From<MidiNote> for u8 {
    fn from(note: MidiNote) -> u8 {
        note.0
    }
}

/// Pitch class plus octave, displayed as e.g. "C4" or "F#2".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    pub pitch_class: u8,
    pub octave: i8,
}

impl NoteName {
    pub fn letter(&self) -> &'static str {
        spell(self.pitch_class, RootSpelling::Sharps)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), self.octave)
    }
}

/// Validate raw note numbers, keeping input order and duplicates.
pub fn validate(midi_notes: &[u8]) -> Result<Vec<MidiNote>> {
    midi_notes.iter().map(|&n| MidiNote::try_from(n)).collect()
}

pub fn to_note_name(midi_note: u8) -> Result<NoteName> {
    MidiNote::try_from(midi_note).map(MidiNote::name)
}

pub fn to_pitch_class(midi_note: u8) -> Result<u8> {
    MidiNote::try_from(midi_note).map(MidiNote::pitch_class)
}

/// Batch form of [`to_note_name`]; fails on the first invalid note.
pub fn to_note_names(midi_notes: &[u8]) -> Result<Vec<NoteName>> {
    midi_notes.iter().map(|&n| to_note_name(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(to_note_name(60).unwrap().to_string(), "C4");
    }

    #[test]
    fn octave_boundaries() {
        assert_eq!(to_note_name(0).unwrap().to_string(), "C-1");
        assert_eq!(to_note_name(59).unwrap().to_string(), "B3");
        assert_eq!(to_note_name(127).unwrap().to_string(), "G9");
    }

    #[test]
    fn note_names_use_sharps() {
        let names: Vec<String> = to_note_names(&[61, 66, 70])
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["C#4", "F#4", "A#4"]);
    }

    #[test]
    fn pitch_class_is_mod_12() {
        assert_eq!(to_pitch_class(60).unwrap(), 0);
        assert_eq!(to_pitch_class(71).unwrap(), 11);
        assert_eq!(to_pitch_class(13).unwrap(), 1);
    }

    #[test]
    fn out_of_range_rejected() {
        assert_eq!(to_note_name(200), Err(Error::InvalidNote { value: 200 }));
        assert_eq!(MidiNote::try_from(-1_i64), Err(Error::InvalidNote { value: -1 }));
        assert_eq!(MidiNote::try_from(128_i64), Err(Error::InvalidNote { value: 128 }));
    }

    #[test]
    fn validate_preserves_order_and_duplicates() {
        let notes = validate(&[67, 60, 67]).unwrap();
        let raw: Vec<u8> = notes.into_iter().map(u8::from).collect();
        assert_eq!(raw, vec![67, 60, 67]);
    }

    #[test]
    fn spelling_tables() {
        assert_eq!(spell(6, RootSpelling::Major), "F#");
        assert_eq!(spell(10, RootSpelling::Major), "Bb");
        assert_eq!(spell(1, RootSpelling::Minor), "C#");
        assert_eq!(spell(3, RootSpelling::Minor), "Eb");
        assert_eq!(spell(10, RootSpelling::Diminished), "A#");
    }

    #[test]
    fn serde_rejects_out_of_range() {
        let ok: MidiNote = serde_json::from_str("64").unwrap();
        assert_eq!(ok.value(), 64);
        assert!(serde_json::from_str::<MidiNote>("128").is_err());
    }
}
