//! CLI command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chordconf::{ChordifyConfig, ConfigSources};
use chordify::{MidiNote, ProgressionAnalyzer, SongStructure};

use crate::output;

/// clap value parser for `--threshold`.
pub fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0..=1.0", value))
    }
}

/// Range-check raw note numbers.
fn to_midi(notes: &[i64]) -> Result<Vec<u8>> {
    let midi = notes
        .iter()
        .map(|&n| MidiNote::try_from(n).map(u8::from))
        .collect::<chordify::Result<Vec<u8>>>()?;
    Ok(midi)
}

/// Parse `"60,64,67"` into note numbers.
fn parse_chord_arg(arg: &str) -> Result<Vec<u8>> {
    let raw = arg
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid note '{}' in chord '{}'", part.trim(), arg))
        })
        .collect::<Result<Vec<i64>>>()?;
    to_midi(&raw)
}

pub fn chord(notes: &[i64], threshold: f64, json: bool) -> Result<()> {
    let midi = to_midi(notes)?;
    let result = chordify::analyze_chord_with_threshold(&midi, threshold)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_chord(&result, threshold);
    }
    Ok(())
}

pub fn names(notes: &[i64]) -> Result<()> {
    let midi = to_midi(notes)?;
    let names = chordify::midi_to_note_names(&midi)?;
    println!("{}", names.join(" "));
    Ok(())
}

pub fn progression(chords: &[String], threshold: f64, json: bool) -> Result<()> {
    let sets = chords
        .iter()
        .map(|arg| parse_chord_arg(arg))
        .collect::<Result<Vec<_>>>()?;
    let result = chordify::analyze_progression(&sets)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_progression(&result, threshold);
    }
    Ok(())
}

pub fn song(path: &Path, threshold: f64, json: bool) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read song file {}", path.display()))?;
    let song: SongStructure = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse song file {}", path.display()))?;

    let analyzer = ProgressionAnalyzer::new(chordify::default_analyzer());
    let analysis = chordify::analyze_song(&analyzer, &song)
        .with_context(|| format!("Failed to analyze '{}'", song.title))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        output::print_song(&analysis, threshold);
    }
    Ok(())
}

pub fn show_config(config: &ChordifyConfig, sources: &ConfigSources) -> Result<()> {
    if sources.files.is_empty() {
        println!("# No config files loaded; using defaults");
    } else {
        println!("# Loaded from:");
        for file in &sources.files {
            println!("#   {}", file.display());
        }
    }
    if !sources.env_overrides.is_empty() {
        println!("# Environment overrides: {}", sources.env_overrides.join(", "));
    }
    println!();
    print!("{}", config.to_toml());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.5"), Ok(0.5));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_parse_chord_arg() {
        assert_eq!(parse_chord_arg("60,64,67").unwrap(), vec![60, 64, 67]);
        assert_eq!(parse_chord_arg(" 60 , 67 ").unwrap(), vec![60, 67]);
        assert!(parse_chord_arg("60,,67").is_err());
    }

    #[test]
    fn test_out_of_range_is_invalid_note() {
        let err = parse_chord_arg("60,300").unwrap_err();
        assert_eq!(
            err.downcast_ref::<chordify::Error>(),
            Some(&chordify::Error::InvalidNote { value: 300 })
        );
        assert!(to_midi(&[-1]).is_err());
    }
}
