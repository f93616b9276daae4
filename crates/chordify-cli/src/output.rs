//! Human-readable output. Color only when stdout supports it.

use chordify::{ChordAnalysisResult, ProgressionAnalysisResult, SongAnalysis};
use owo_colors::{OwoColorize, Stream};

pub fn print_chord(result: &ChordAnalysisResult, threshold: f64) {
    println!(
        "{}  (confidence {:.2}, {}){}",
        result
            .chord_name
            .if_supports_color(Stream::Stdout, |name| name.bold()),
        result.confidence,
        result.method,
        uncertain_marker(result, threshold)
    );
    println!("notes: {}", result.note_names.join(" "));
}

pub fn print_progression(result: &ProgressionAnalysisResult, threshold: f64) {
    println!(
        "{}",
        result
            .chord_names
            .join(" - ")
            .if_supports_color(Stream::Stdout, |names| names.bold())
    );
    println!(
        "chords: {} ({} unique), {:.2} notes per chord",
        result.chord_count, result.unique_chord_count, result.average_notes_per_chord
    );
    println!("complexity: {}/10", result.complexity_score);

    let patterns: Vec<String> = result.patterns.iter().map(|p| p.to_string()).collect();
    if patterns.is_empty() {
        println!("patterns: none");
    } else {
        println!("patterns: {}", patterns.join(", "));
    }

    for (index, chord) in result.chord_details.iter().enumerate() {
        let marker = uncertain_marker(chord, threshold);
        if !marker.is_empty() {
            println!("  #{} {}{}", index + 1, chord.chord_name, marker);
        }
    }
}

pub fn print_song(analysis: &SongAnalysis, threshold: f64) {
    println!(
        "{}",
        analysis
            .title
            .if_supports_color(Stream::Stdout, |title| title.underline())
    );
    if let Some(overall) = &analysis.overall {
        println!();
        println!("[overall]");
        print_progression(overall, threshold);
    }
    for section in &analysis.sections {
        println!();
        println!("[{}]", section.name);
        print_progression(&section.analysis, threshold);
    }
}

fn uncertain_marker(result: &ChordAnalysisResult, threshold: f64) -> String {
    if result.is_confident(threshold) {
        String::new()
    } else {
        format!(
            "  {}",
            "low confidence".if_supports_color(Stream::Stdout, |text| text.yellow())
        )
    }
}
