use serde::{Deserialize, Serialize};

use crate::chord_templates::{ChordTemplate, POWER_CHORD_CONFIDENCE, TEMPLATES};
use crate::notes::{spell, RootSpelling};
use crate::profile::IntervalProfile;
use crate::types::ChordQuality;

/// Confidence for a lone pitch class.
pub const SINGLE_NOTE_CONFIDENCE: f64 = 0.3;

/// Confidence for a note set no template explains.
pub const UNRECOGNIZED_CONFIDENCE: f64 = 0.2;

/// How the classifier arrived at its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    /// A template covered part of the profile; the rest went unexplained.
    Subset,
    SingleNote,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub name: String,
    pub quality: Option<ChordQuality>,
    pub confidence: f64,
    pub kind: MatchKind,
}

/// Classify an interval profile rooted on `root_pitch_class`.
///
/// Exact matches are tried first in template rank order. Failing that, the
/// largest template contained in the profile wins, with confidence scaled
/// by how much of the profile it explains. `note_count` is the number of
/// distinct MIDI notes and only matters for the degenerate single-note case.
pub fn classify(root_pitch_class: u8, profile: &IntervalProfile, note_count: usize) -> Classification {
    if profile.len() == 1 || note_count <= 1 {
        return Classification {
            name: spell(root_pitch_class, RootSpelling::Sharps).to_string(),
            quality: None,
            confidence: SINGLE_NOTE_CONFIDENCE,
            kind: MatchKind::SingleNote,
        };
    }

    if let Some(template) = exact_match(profile) {
        let confidence = if template.quality == ChordQuality::Power {
            POWER_CHORD_CONFIDENCE
        } else {
            template.confidence
        };
        return named(root_pitch_class, template, confidence, MatchKind::Exact);
    }

    if let Some(template) = best_subset(profile) {
        let explained = template.size as f64 / profile.len() as f64;
        let confidence = (template.confidence * explained).clamp(0.0, 1.0);
        return named(root_pitch_class, template, confidence, MatchKind::Subset);
    }

    Classification {
        name: format!("{}{}", spell(root_pitch_class, RootSpelling::Sharps), profile),
        quality: None,
        confidence: UNRECOGNIZED_CONFIDENCE,
        kind: MatchKind::Unrecognized,
    }
}

fn exact_match(profile: &IntervalProfile) -> Option<&'static ChordTemplate> {
    TEMPLATES.iter().find(|t| t.profile == *profile)
}

/// Largest template whose intervals all appear in the profile. The table is
/// sorted by size, so the first hit is both the largest and the best ranked.
fn best_subset(profile: &IntervalProfile) -> Option<&'static ChordTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| t.size < profile.len())
        .find(|t| profile.is_superset_of(&t.profile))
}

fn named(
    root_pitch_class: u8,
    template: &ChordTemplate,
    confidence: f64,
    kind: MatchKind,
) -> Classification {
    let root = spell(root_pitch_class, template.quality.spelling());
    Classification {
        name: format!("{}{}", root, template.suffix()),
        quality: Some(template.quality),
        confidence,
        kind,
    }
}
