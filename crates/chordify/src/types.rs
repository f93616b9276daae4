use serde::{Deserialize, Serialize};

use crate::notes::RootSpelling;
use crate::progression::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    // Triads and dyads
    Major,
    Minor,
    Diminished,
    Augmented,
    Suspended2,
    Suspended4,
    Power,
    // Sixths and added tones
    Major6,
    Minor6,
    Add9,
    MinorAdd9,
    Add11,
    SixNine,
    // Sevenths
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    Diminished7,
    HalfDiminished7,
    Dominant7Sus4,
    Augmented7,
    Dominant7Flat5,
    Major7Sharp5,
    // Extended
    Dominant9,
    Major9,
    Minor9,
    Dominant7Flat9,
    Dominant7Sharp9,
    Dominant9Sus4,
    Dominant11,
    Minor11,
    Dominant13,
    Major13,
    Minor13,
}

impl ChordQuality {
    /// Suffix for chord symbol display
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Suspended2 => "sus2",
            ChordQuality::Suspended4 => "sus4",
            ChordQuality::Power => "5",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Add9 => "add9",
            ChordQuality::MinorAdd9 => "madd9",
            ChordQuality::Add11 => "add11",
            ChordQuality::SixNine => "6/9",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::MinorMajor7 => "m(maj7)",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Dominant7Sus4 => "7sus4",
            ChordQuality::Augmented7 => "aug7",
            ChordQuality::Dominant7Flat5 => "7b5",
            ChordQuality::Major7Sharp5 => "maj7#5",
            ChordQuality::Dominant9 => "9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Dominant7Flat9 => "7b9",
            ChordQuality::Dominant7Sharp9 => "7#9",
            ChordQuality::Dominant9Sus4 => "9sus4",
            ChordQuality::Dominant11 => "11",
            ChordQuality::Minor11 => "m11",
            ChordQuality::Dominant13 => "13",
            ChordQuality::Major13 => "maj13",
            ChordQuality::Minor13 => "m13",
        }
    }

    /// Minor third with a perfect fifth. Half-diminished counts as diminished.
    pub fn is_minor(&self) -> bool {
        matches!(
            self,
            ChordQuality::Minor
                | ChordQuality::Minor6
                | ChordQuality::MinorAdd9
                | ChordQuality::Minor7
                | ChordQuality::MinorMajor7
                | ChordQuality::Minor9
                | ChordQuality::Minor11
                | ChordQuality::Minor13
        )
    }

    pub fn is_diminished(&self) -> bool {
        matches!(
            self,
            ChordQuality::Diminished | ChordQuality::Diminished7 | ChordQuality::HalfDiminished7
        )
    }

    pub fn is_augmented(&self) -> bool {
        matches!(
            self,
            ChordQuality::Augmented | ChordQuality::Augmented7 | ChordQuality::Major7Sharp5
        )
    }

    pub fn is_suspended(&self) -> bool {
        matches!(
            self,
            ChordQuality::Suspended2
                | ChordQuality::Suspended4
                | ChordQuality::Dominant7Sus4
                | ChordQuality::Dominant9Sus4
        )
    }

    /// Contains a seventh (major, minor or diminished), including the
    /// extended chords stacked on one.
    pub fn has_seventh(&self) -> bool {
        matches!(
            self,
            ChordQuality::Dominant7
                | ChordQuality::Major7
                | ChordQuality::Minor7
                | ChordQuality::MinorMajor7
                | ChordQuality::Diminished7
                | ChordQuality::HalfDiminished7
                | ChordQuality::Dominant7Sus4
                | ChordQuality::Augmented7
                | ChordQuality::Dominant7Flat5
                | ChordQuality::Major7Sharp5
                | ChordQuality::Dominant9
                | ChordQuality::Major9
                | ChordQuality::Minor9
                | ChordQuality::Dominant7Flat9
                | ChordQuality::Dominant7Sharp9
                | ChordQuality::Dominant9Sus4
                | ChordQuality::Dominant11
                | ChordQuality::Minor11
                | ChordQuality::Dominant13
                | ChordQuality::Major13
                | ChordQuality::Minor13
        )
    }

    /// Carries a 9th, 11th or 13th, added or stacked.
    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            ChordQuality::Add9
                | ChordQuality::MinorAdd9
                | ChordQuality::Add11
                | ChordQuality::SixNine
                | ChordQuality::Dominant9
                | ChordQuality::Major9
                | ChordQuality::Minor9
                | ChordQuality::Dominant7Flat9
                | ChordQuality::Dominant7Sharp9
                | ChordQuality::Dominant9Sus4
                | ChordQuality::Dominant11
                | ChordQuality::Minor11
                | ChordQuality::Dominant13
                | ChordQuality::Major13
                | ChordQuality::Minor13
        )
    }

    pub fn spelling(&self) -> RootSpelling {
        if self.is_diminished() {
            RootSpelling::Diminished
        } else if self.is_minor() {
            RootSpelling::Minor
        } else {
            RootSpelling::Major
        }
    }
}

/// Which path produced a chord label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Oracle,
    Heuristic,
}

impl std::fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMethod::Oracle => write!(f, "oracle"),
            AnalysisMethod::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Analysis of a single note set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordAnalysisResult {
    /// Full chord symbol: "Cmaj7", "Dm", "G5"
    pub chord_name: String,
    /// Note names parallel to `midi_notes`
    pub note_names: Vec<String>,
    /// Input notes, order and duplicates preserved
    pub midi_notes: Vec<u8>,
    /// Number of distinct MIDI notes
    pub note_count: usize,
    /// 0.0–1.0
    pub confidence: f64,
    pub method: AnalysisMethod,
    /// Pitch class of the chord root (bass note for heuristic results)
    pub root_pitch_class: u8,
    /// None for single notes and unrecognized note sets
    pub quality: Option<ChordQuality>,
}

impl ChordAnalysisResult {
    /// Whether the label should be trusted at the given threshold.
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Aggregate analysis of an ordered chord sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionAnalysisResult {
    pub chord_count: usize,
    pub unique_chord_count: usize,
    pub chord_names: Vec<String>,
    /// 0–10
    pub complexity_score: u8,
    pub average_notes_per_chord: f64,
    pub patterns: Vec<Pattern>,
    pub chord_details: Vec<ChordAnalysisResult>,
}

impl ProgressionAnalysisResult {
    pub fn has_pattern(&self, pattern: &Pattern) -> bool {
        self.patterns.contains(pattern)
    }
}
