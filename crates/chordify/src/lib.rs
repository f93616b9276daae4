//! MIDI chord recognition and progression analysis.
//!
//! Turns unordered sets of MIDI note numbers into chord symbols ("Cmaj7",
//! "Dm", "G5") with a confidence score, and summarizes sequences of chords
//! into statistics, a 0–10 complexity score and pattern tags.
//!
//! The lowest sounding note is always treated as the root. Inversions are
//! not detected: `E G C` is analyzed as a chord built on E.
//!
//! ```
//! let result = chordify::analyze_chord(&[60, 64, 67, 71]).unwrap();
//! assert_eq!(result.chord_name, "Cmaj7");
//! ```

pub mod analyzer;
pub mod chord_templates;
pub mod classify;
pub mod notes;
pub mod oracle;
pub mod profile;
pub mod progression;
pub mod song;
pub mod symbol;
pub mod types;

pub use analyzer::{ChordAnalyzer, DEFAULT_CONFIDENCE_THRESHOLD};
pub use classify::{classify, Classification, MatchKind};
pub use notes::{to_note_name, to_note_names, to_pitch_class, MidiNote, NoteName};
pub use oracle::{ChordOracle, CommandOracle, HeuristicOnly, OracleAnswer, OracleChord, OracleError};
pub use profile::{build_profile, IntervalProfile};
pub use progression::{analyze_results, Pattern, ProgressionAnalyzer};
pub use song::{analyze_song, SectionAnalysis, SongAnalysis, SongSection, SongStructure};
pub use symbol::{parse_symbol, ParsedSymbol};
pub use types::{AnalysisMethod, ChordAnalysisResult, ChordQuality, ProgressionAnalysisResult};

use std::sync::OnceLock;

/// Errors surfaced by chord and progression analysis.
///
/// Oracle failures never appear here; they are absorbed by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no notes given")]
    EmptyChord,

    #[error("invalid MIDI note {value}: expected 0-127")]
    InvalidNote { value: i64 },

    #[error("no chords given")]
    EmptyProgression,
}

pub type Result<T> = std::result::Result<T, Error>;

static DEFAULT_ANALYZER: OnceLock<ChordAnalyzer> = OnceLock::new();

/// Install the analyzer used by the free functions in this crate.
///
/// Only the first call wins; later calls hand the analyzer back.
pub fn install_default(analyzer: ChordAnalyzer) -> std::result::Result<(), ChordAnalyzer> {
    DEFAULT_ANALYZER.set(analyzer)
}

/// The process-wide analyzer. Heuristic-only unless `install_default` ran first.
pub fn default_analyzer() -> &'static ChordAnalyzer {
    DEFAULT_ANALYZER.get_or_init(ChordAnalyzer::heuristic)
}

/// Analyze one chord with the default confidence threshold.
pub fn analyze_chord(midi_notes: &[u8]) -> Result<ChordAnalysisResult> {
    default_analyzer().analyze_chord(midi_notes, DEFAULT_CONFIDENCE_THRESHOLD)
}

/// Analyze one chord. The threshold is advisory and never changes the result.
pub fn analyze_chord_with_threshold(
    midi_notes: &[u8],
    confidence_threshold: f64,
) -> Result<ChordAnalysisResult> {
    default_analyzer().analyze_chord(midi_notes, confidence_threshold)
}

/// Analyze an ordered sequence of note sets.
pub fn analyze_progression(chords: &[Vec<u8>]) -> Result<ProgressionAnalysisResult> {
    ProgressionAnalyzer::new(default_analyzer()).analyze_progression(chords)
}

/// Chord symbol only, e.g. `"Cmaj7"`.
pub fn midi_to_chord_name(midi_notes: &[u8]) -> Result<String> {
    analyze_chord(midi_notes).map(|result| result.chord_name)
}

/// Note names with octave, in input order, e.g. `["C4", "E4", "G4"]`.
pub fn midi_to_note_names(midi_notes: &[u8]) -> Result<Vec<String>> {
    Ok(to_note_names(midi_notes)?
        .into_iter()
        .map(|name| name.to_string())
        .collect())
}
