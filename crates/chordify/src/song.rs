use serde::{Deserialize, Serialize};

use crate::notes::MidiNote;
use crate::progression::ProgressionAnalyzer;
use crate::types::ProgressionAnalysisResult;
use crate::Result;

/// A song-structure record, typically loaded from JSON.
///
/// Only `structure` and `chord_progression` are analyzed; the metadata is
/// carried through untouched. Note numbers are kept signed until analysis
/// so out-of-range values surface as `InvalidNote`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongStructure {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub time_signature: Option<String>,
    /// Whole-song progression as MIDI note sets
    #[serde(default)]
    pub chord_progression: Vec<Vec<i64>>,
    /// Sections in playing order
    #[serde(default)]
    pub structure: Vec<SongSection>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongSection {
    #[serde(default)]
    pub name: String,
    pub chords: Vec<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub name: String,
    pub analysis: ProgressionAnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAnalysis {
    pub title: String,
    /// None when the song has no whole-song progression
    pub overall: Option<ProgressionAnalysisResult>,
    pub sections: Vec<SectionAnalysis>,
}

/// Analyze a song's overall progression and each section in order.
///
/// A section without chords fails the whole song with `EmptyProgression`.
pub fn analyze_song(analyzer: &ProgressionAnalyzer<'_>, song: &SongStructure) -> Result<SongAnalysis> {
    let overall = if song.chord_progression.is_empty() {
        None
    } else {
        Some(analyzer.analyze_progression(&to_midi(&song.chord_progression)?)?)
    };

    let sections = song
        .structure
        .iter()
        .map(|section| {
            Ok(SectionAnalysis {
                name: section.name.clone(),
                analysis: analyzer.analyze_progression(&to_midi(&section.chords)?)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SongAnalysis {
        title: song.title.clone(),
        overall,
        sections,
    })
}

fn to_midi(chords: &[Vec<i64>]) -> Result<Vec<Vec<u8>>> {
    chords
        .iter()
        .map(|chord| {
            chord
                .iter()
                .map(|&n| MidiNote::try_from(n).map(u8::from))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ChordAnalyzer;
    use crate::Error;

    const SONG: &str = r#"{
        "title": "Test Song",
        "key": "C",
        "tempo": 120,
        "time_signature": "4/4",
        "structure": [
            {"name": "verse", "chords": [[60,64,67],[69,72,76],[65,69,72],[67,71,74]]},
            {"name": "chorus", "chords": [[65,69,72],[67,71,74],[60,64,67]]}
        ]
    }"#;

    #[test]
    fn sections_analyzed_in_order() {
        let song: SongStructure = serde_json::from_str(SONG).unwrap();
        let analyzer = ChordAnalyzer::heuristic();
        let analysis = analyze_song(&ProgressionAnalyzer::new(&analyzer), &song).unwrap();

        assert_eq!(analysis.title, "Test Song");
        assert!(analysis.overall.is_none());
        assert_eq!(analysis.sections.len(), 2);
        assert_eq!(analysis.sections[0].name, "verse");
        assert_eq!(
            analysis.sections[0].analysis.chord_names,
            vec!["C", "Am", "F", "G"]
        );
        assert_eq!(analysis.sections[1].analysis.chord_names, vec!["F", "G", "C"]);
    }

    #[test]
    fn overall_progression_when_present() {
        let song = SongStructure {
            title: "Loop".into(),
            chord_progression: vec![vec![60, 64, 67], vec![67, 71, 74]],
            ..Default::default()
        };
        let analyzer = ChordAnalyzer::heuristic();
        let analysis = analyze_song(&ProgressionAnalyzer::new(&analyzer), &song).unwrap();
        assert_eq!(analysis.overall.unwrap().chord_count, 2);
        assert!(analysis.sections.is_empty());
    }

    #[test]
    fn out_of_range_note_is_invalid_note() {
        let song: SongStructure = serde_json::from_str(
            r#"{"title": "Loud", "structure": [{"name": "intro", "chords": [[60,300]]}]}"#,
        )
        .unwrap();
        let analyzer = ChordAnalyzer::heuristic();
        assert_eq!(
            analyze_song(&ProgressionAnalyzer::new(&analyzer), &song),
            Err(Error::InvalidNote { value: 300 })
        );

        let song: SongStructure =
            serde_json::from_str(r#"{"chord_progression": [[-1, 64, 67]]}"#).unwrap();
        assert_eq!(
            analyze_song(&ProgressionAnalyzer::new(&analyzer), &song),
            Err(Error::InvalidNote { value: -1 })
        );
    }

    #[test]
    fn metadata_is_optional() {
        let song: SongStructure =
            serde_json::from_str(r#"{"structure": [{"name": "a", "chords": [[62,65,69]]}]}"#).unwrap();
        assert_eq!(song.title, "");
        assert_eq!(song.key, None);

        let analyzer = ChordAnalyzer::heuristic();
        let analysis = analyze_song(&ProgressionAnalyzer::new(&analyzer), &song).unwrap();
        assert_eq!(analysis.sections[0].analysis.chord_names, vec!["Dm"]);
    }

    #[test]
    fn empty_section_fails() {
        let song = SongStructure {
            title: "Broken".into(),
            structure: vec![SongSection {
                name: "bridge".into(),
                chords: vec![],
            }],
            ..Default::default()
        };
        let analyzer = ChordAnalyzer::heuristic();
        assert_eq!(
            analyze_song(&ProgressionAnalyzer::new(&analyzer), &song),
            Err(Error::EmptyProgression)
        );
    }
}
