use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::analyzer::{ChordAnalyzer, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::types::{ChordAnalysisResult, ProgressionAnalysisResult};
use crate::{Error, Result};

pub const MAX_COMPLEXITY: u8 = 10;

/// Unique/total chord ratio above which a progression counts as varied.
const VARIETY_THRESHOLD: f64 = 0.6;

/// Progressions longer than this earn a complexity point.
const LENGTH_THRESHOLD: usize = 6;

/// Recognized progressions as root movements in semitones above the first
/// chord's root. Matching is by exact equality of the whole sequence.
pub static NAMED_PROGRESSIONS: &[(&str, &[u8])] = &[
    ("I-IV-V-I", &[0, 5, 7, 0]),
    ("I-IV-V", &[0, 5, 7]),
    ("I-V-I", &[0, 7, 0]),
    ("I-IV-I", &[0, 5, 0]),
    ("I-V-vi-IV", &[0, 7, 9, 5]),
    ("I-vi-IV-V", &[0, 9, 5, 7]),
    ("I-IV-I-V", &[0, 5, 0, 7]),
    ("I-ii-V-I", &[0, 2, 7, 0]),
    ("I-vi-ii-V", &[0, 9, 2, 7]),
    ("I-bVII-IV-I", &[0, 10, 5, 0]),
    ("i-bVII-bVI-V", &[0, 10, 8, 7]),
    ("12-bar blues", &[0, 0, 0, 0, 5, 5, 0, 0, 7, 5, 0, 7]),
];

/// A tag describing something found in a progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Pattern {
    ReturnsToRoot,
    ContainsMinor,
    ContainsSeventh,
    Extended,
    DiminishedAugmented,
    Suspended,
    /// One of [`NAMED_PROGRESSIONS`]
    Named(&'static str),
}

impl Pattern {
    pub fn label(&self) -> &'static str {
        match self {
            Pattern::ReturnsToRoot => "Returns to root",
            Pattern::ContainsMinor => "Contains minor chords",
            Pattern::ContainsSeventh => "Contains seventh chords",
            Pattern::Extended => "Extended chords",
            Pattern::DiminishedAugmented => "Diminished/augmented chords",
            Pattern::Suspended => "Suspended chords",
            Pattern::Named(name) => *name,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> String {
        pattern.label().to_string()
    }
}

impl TryFrom<String> for Pattern {
    type Error = String;

    fn try_from(label: String) -> std::result::Result<Self, Self::Error> {
        let fixed = [
            Pattern::ReturnsToRoot,
            Pattern::ContainsMinor,
            Pattern::ContainsSeventh,
            Pattern::Extended,
            Pattern::DiminishedAugmented,
            Pattern::Suspended,
        ];
        fixed
            .into_iter()
            .find(|p| p.label() == label)
            .or_else(|| {
                NAMED_PROGRESSIONS
                    .iter()
                    .find(|entry| entry.0 == label)
                    .map(|entry| Pattern::Named(entry.0))
            })
            .ok_or_else(|| format!("unknown pattern: {}", label))
    }
}

// Labels deserialize owned, then map back onto the static names.
impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Pattern::try_from(label).map_err(serde::de::Error::custom)
    }
}

/// Analyzes ordered chord sequences.
#[derive(Debug, Clone)]
pub struct ProgressionAnalyzer<'a> {
    analyzer: &'a ChordAnalyzer,
}

impl<'a> ProgressionAnalyzer<'a> {
    pub fn new(analyzer: &'a ChordAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Analyze every note set in order, then aggregate.
    ///
    /// Any invalid element fails the whole progression.
    pub fn analyze_progression(&self, chords: &[Vec<u8>]) -> Result<ProgressionAnalysisResult> {
        if chords.is_empty() {
            return Err(Error::EmptyProgression);
        }
        let details = chords
            .iter()
            .map(|notes| self.analyzer.analyze_chord(notes, DEFAULT_CONFIDENCE_THRESHOLD))
            .collect::<Result<Vec<_>>>()?;
        analyze_results(details)
    }
}

/// Aggregate already-analyzed chords.
pub fn analyze_results(details: Vec<ChordAnalysisResult>) -> Result<ProgressionAnalysisResult> {
    if details.is_empty() {
        return Err(Error::EmptyProgression);
    }

    let chord_count = details.len();
    let chord_names: Vec<String> = details.iter().map(|d| d.chord_name.clone()).collect();
    let unique_chord_count = chord_names.iter().collect::<HashSet<_>>().len();
    let total_notes: usize = details.iter().map(|d| d.note_count).sum();
    let average_notes_per_chord = total_notes as f64 / chord_count as f64;

    let complexity_score = complexity(&details, unique_chord_count);
    let patterns = detect_patterns(&details);

    debug!(
        chord_count,
        unique_chord_count,
        complexity_score,
        patterns = patterns.len(),
        "analyzed progression"
    );

    Ok(ProgressionAnalysisResult {
        chord_count,
        unique_chord_count,
        chord_names,
        complexity_score,
        average_notes_per_chord,
        patterns,
        chord_details: details,
    })
}

/// One point per quality category present, one for high variety, one for
/// length; capped at [`MAX_COMPLEXITY`].
fn complexity(details: &[ChordAnalysisResult], unique_chord_count: usize) -> u8 {
    let qualities: Vec<_> = details.iter().filter_map(|d| d.quality).collect();
    let categories = [
        qualities.iter().any(|q| q.is_diminished()),
        qualities.iter().any(|q| q.is_augmented()),
        qualities.iter().any(|q| q.is_suspended()),
        qualities.iter().any(|q| q.has_seventh()),
        qualities.iter().any(|q| q.is_extended()),
    ];

    let mut score = categories.iter().filter(|present| **present).count() as u8;
    if unique_chord_count as f64 / details.len() as f64 > VARIETY_THRESHOLD {
        score += 1;
    }
    if details.len() > LENGTH_THRESHOLD {
        score += 1;
    }
    score.min(MAX_COMPLEXITY)
}

fn detect_patterns(details: &[ChordAnalysisResult]) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    if let (Some(first), Some(last)) = (details.first(), details.last()) {
        if first.root_pitch_class == last.root_pitch_class {
            patterns.push(Pattern::ReturnsToRoot);
        }
    }

    let qualities: Vec<_> = details.iter().filter_map(|d| d.quality).collect();
    let checks = [
        (Pattern::ContainsMinor, qualities.iter().any(|q| q.is_minor())),
        (Pattern::ContainsSeventh, qualities.iter().any(|q| q.has_seventh())),
        (Pattern::Extended, qualities.iter().any(|q| q.is_extended())),
        (
            Pattern::DiminishedAugmented,
            qualities.iter().any(|q| q.is_diminished() || q.is_augmented()),
        ),
        (Pattern::Suspended, qualities.iter().any(|q| q.is_suspended())),
    ];
    patterns.extend(checks.into_iter().filter(|(_, hit)| *hit).map(|(p, _)| p));

    let degrees = root_degrees(details);
    patterns.extend(
        NAMED_PROGRESSIONS
            .iter()
            .filter(|entry| entry.1 == degrees.as_slice())
            .map(|entry| Pattern::Named(entry.0)),
    );

    patterns
}

/// Root movement of each chord in semitones above the first chord's root.
fn root_degrees(details: &[ChordAnalysisResult]) -> Vec<u8> {
    let Some(tonic) = details.first().map(|d| d.root_pitch_class) else {
        return Vec::new();
    };
    details
        .iter()
        .map(|d| (d.root_pitch_class + 12 - tonic) % 12)
        .collect()
}
