use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::classify::classify;
use crate::notes::{validate, MidiNote};
use crate::oracle::{ChordOracle, CommandOracle, HeuristicOnly, OracleAnswer, ORACLE_CONFIDENCE};
use crate::profile::build_profile;
use crate::types::{AnalysisMethod, ChordAnalysisResult};
use crate::{Error, Result};

/// Threshold below which a label is considered untrustworthy.
///
/// Advisory only: results are never filtered by it.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Turns note sets into [`ChordAnalysisResult`]s.
///
/// Asks its oracle first, then falls back to the template engine. The
/// oracle variant is chosen at construction and never changes.
#[derive(Clone)]
pub struct ChordAnalyzer {
    oracle: Arc<dyn ChordOracle>,
}

impl Default for ChordAnalyzer {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl std::fmt::Debug for ChordAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChordAnalyzer")
            .field("oracle", &self.oracle.name())
            .finish()
    }
}

impl ChordAnalyzer {
    /// Template engine only.
    pub fn heuristic() -> Self {
        Self {
            oracle: Arc::new(HeuristicOnly),
        }
    }

    /// Use a custom oracle (for testing or another backend).
    pub fn with_oracle(oracle: Arc<dyn ChordOracle>) -> Self {
        Self { oracle }
    }

    /// Probe the command oracle now and keep it only if it answers.
    pub fn detect(oracle: Option<CommandOracle>) -> Self {
        match oracle {
            Some(oracle) if oracle.is_available() => Self::with_oracle(Arc::new(oracle)),
            _ => Self::heuristic(),
        }
    }

    pub fn oracle_name(&self) -> &'static str {
        self.oracle.name()
    }

    /// Analyze one note set.
    ///
    /// `confidence_threshold` does not change the result; a label under it
    /// is only logged. Use [`ChordAnalysisResult::is_confident`] to gate.
    pub fn analyze_chord(
        &self,
        midi_notes: &[u8],
        confidence_threshold: f64,
    ) -> Result<ChordAnalysisResult> {
        if midi_notes.is_empty() {
            return Err(Error::EmptyChord);
        }
        let notes = validate(midi_notes)?;

        let result = match self.oracle.try_oracle(&notes) {
            Some(answer) => from_oracle(&notes, answer),
            None => self.heuristic_result(&notes)?,
        };

        if result.confidence < confidence_threshold {
            debug!(
                chord = %result.chord_name,
                confidence = result.confidence,
                threshold = confidence_threshold,
                "low-confidence chord"
            );
        }

        Ok(result)
    }

    fn heuristic_result(&self, notes: &[MidiNote]) -> Result<ChordAnalysisResult> {
        let (root, profile) = build_profile(notes)?;
        let note_count = distinct_count(notes);
        let classification = classify(root.pitch_class(), &profile, note_count);

        debug!(
            chord = %classification.name,
            intervals = %profile,
            kind = ?classification.kind,
            confidence = classification.confidence,
            "classified chord"
        );

        Ok(ChordAnalysisResult {
            chord_name: classification.name,
            note_names: note_names(notes),
            midi_notes: notes.iter().map(|n| n.value()).collect(),
            note_count,
            confidence: classification.confidence,
            method: AnalysisMethod::Heuristic,
            root_pitch_class: root.pitch_class(),
            quality: classification.quality,
        })
    }
}

fn from_oracle(notes: &[MidiNote], answer: OracleAnswer) -> ChordAnalysisResult {
    debug!(chord = %answer.symbol, "oracle classified chord");

    ChordAnalysisResult {
        note_names: note_names(notes),
        midi_notes: notes.iter().map(|n| n.value()).collect(),
        note_count: distinct_count(notes),
        confidence: ORACLE_CONFIDENCE,
        method: AnalysisMethod::Oracle,
        root_pitch_class: answer.root_pitch_class,
        quality: Some(answer.quality),
        chord_name: answer.symbol,
    }
}

fn distinct_count(notes: &[MidiNote]) -> usize {
    notes.iter().collect::<BTreeSet<_>>().len()
}

fn note_names(notes: &[MidiNote]) -> Vec<String> {
    notes.iter().map(|n| n.name().to_string()).collect()
}
