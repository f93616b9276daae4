//! Chord symbol parsing, used to recover root and quality from labels
//! produced outside the template engine.

use crate::chord_templates::TEMPLATES;
use crate::types::ChordQuality;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSymbol {
    pub root_pitch_class: u8,
    /// None when the suffix is not one we recognize
    pub quality: Option<ChordQuality>,
}

/// Spellings other chord vocabularies use for the same qualities.
const ALIASES: &[(&str, ChordQuality)] = &[
    ("maj", ChordQuality::Major),
    ("M", ChordQuality::Major),
    ("major", ChordQuality::Major),
    ("min", ChordQuality::Minor),
    ("minor", ChordQuality::Minor),
    ("-", ChordQuality::Minor),
    ("o", ChordQuality::Diminished),
    ("°", ChordQuality::Diminished),
    ("+", ChordQuality::Augmented),
    ("sus", ChordQuality::Suspended4),
    ("power", ChordQuality::Power),
    ("M7", ChordQuality::Major7),
    ("Δ7", ChordQuality::Major7),
    ("Δ", ChordQuality::Major7),
    ("min7", ChordQuality::Minor7),
    ("-7", ChordQuality::Minor7),
    ("mM7", ChordQuality::MinorMajor7),
    ("mmaj7", ChordQuality::MinorMajor7),
    ("minmaj7", ChordQuality::MinorMajor7),
    ("o7", ChordQuality::Diminished7),
    ("°7", ChordQuality::Diminished7),
    ("ø", ChordQuality::HalfDiminished7),
    ("ø7", ChordQuality::HalfDiminished7),
    ("m7(b5)", ChordQuality::HalfDiminished7),
    ("+7", ChordQuality::Augmented7),
    ("7#5", ChordQuality::Augmented7),
    ("7+", ChordQuality::Augmented7),
    ("M9", ChordQuality::Major9),
    ("M13", ChordQuality::Major13),
    ("69", ChordQuality::SixNine),
    ("6add9", ChordQuality::SixNine),
    ("2", ChordQuality::Add9),
    ("add2", ChordQuality::Add9),
];

/// Parse a symbol such as `"F#m7"`, `"Bbmaj7"` or `"C/E"`.
///
/// Returns None when no root letter can be read. Roots must be uppercase
/// `A`-`G`. A slash bass is ignored.
pub fn parse_symbol(symbol: &str) -> Option<ParsedSymbol> {
    let symbol = symbol.trim();
    let head = strip_slash_bass(symbol);

    let mut chars = head.chars();
    let letter = chars.next()?;
    let natural: u8 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (root_pitch_class, suffix) = if let Some(s) = strip_accidental(rest, &['#', '♯']) {
        ((natural + 1) % 12, s)
    } else if let Some(s) = strip_accidental(rest, &['b', '♭']) {
        ((natural + 11) % 12, s)
    } else {
        (natural, rest)
    };

    Some(ParsedSymbol {
        root_pitch_class,
        quality: quality_for_suffix(suffix.trim()),
    })
}

/// `"C/E"` -> `"C"`, but `"C6/9"` stays whole.
fn strip_slash_bass(symbol: &str) -> &str {
    match symbol.rsplit_once('/') {
        Some((head, bass)) if bass.starts_with(|c: char| matches!(c, 'A'..='G')) => head,
        _ => symbol,
    }
}

fn strip_accidental<'a>(s: &'a str, marks: &[char]) -> Option<&'a str> {
    let first = s.chars().next()?;
    if marks.contains(&first) {
        Some(&s[first.len_utf8()..])
    } else {
        None
    }
}

fn quality_for_suffix(suffix: &str) -> Option<ChordQuality> {
    TEMPLATES
        .iter()
        .map(|t| (t.suffix(), t.quality))
        .chain(ALIASES.iter().copied())
        .find(|(s, _)| *s == suffix)
        .map(|(_, q)| q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{spell, RootSpelling};

    #[test]
    fn plain_major() {
        let p = parse_symbol("C").unwrap();
        assert_eq!(p.root_pitch_class, 0);
        assert_eq!(p.quality, Some(ChordQuality::Major));
    }

    #[test]
    fn accidentals() {
        assert_eq!(parse_symbol("F#m7").unwrap().root_pitch_class, 6);
        assert_eq!(parse_symbol("Bbmaj7").unwrap().root_pitch_class, 10);
        assert_eq!(parse_symbol("Cb").unwrap().root_pitch_class, 11);
        assert_eq!(parse_symbol("E♭m").unwrap().root_pitch_class, 3);
    }

    #[test]
    fn aliases() {
        assert_eq!(parse_symbol("Cpower").unwrap().quality, Some(ChordQuality::Power));
        assert_eq!(parse_symbol("G-7").unwrap().quality, Some(ChordQuality::Minor7));
        assert_eq!(parse_symbol("Bø7").unwrap().quality, Some(ChordQuality::HalfDiminished7));
        assert_eq!(parse_symbol("C+").unwrap().quality, Some(ChordQuality::Augmented));
    }

    #[test]
    fn slash_bass_ignored() {
        let p = parse_symbol("C/E").unwrap();
        assert_eq!(p.root_pitch_class, 0);
        assert_eq!(p.quality, Some(ChordQuality::Major));
    }

    #[test]
    fn six_nine_is_not_a_slash_chord() {
        let p = parse_symbol("C6/9").unwrap();
        assert_eq!(p.quality, Some(ChordQuality::SixNine));
    }

    #[test]
    fn unknown_suffix_keeps_root() {
        let p = parse_symbol("Dquartal").unwrap();
        assert_eq!(p.root_pitch_class, 2);
        assert_eq!(p.quality, None);
    }

    #[test]
    fn not_a_symbol() {
        assert!(parse_symbol("").is_none());
        assert!(parse_symbol("H7").is_none());
        assert!(parse_symbol("  ").is_none());
    }

    #[test]
    fn lowercase_root_is_not_a_symbol() {
        assert!(parse_symbol("bb").is_none());
        assert!(parse_symbol("am").is_none());
        assert!(parse_symbol("c").is_none());
        assert_eq!(parse_symbol("Bb").unwrap().root_pitch_class, 10);
    }

    #[test]
    fn every_template_suffix_parses_back() {
        for t in TEMPLATES {
            for pc in 0..12u8 {
                let name = format!("{}{}", spell(pc, t.quality.spelling()), t.suffix());
                let p = parse_symbol(&name).unwrap_or_else(|| panic!("failed on {}", name));
                assert_eq!(p.root_pitch_class, pc, "{}", name);
                assert_eq!(p.quality, Some(t.quality), "{}", name);
            }
        }
    }

    #[test]
    fn sharps_spelling_also_parses() {
        let p = parse_symbol(&format!("{}dim", spell(1, RootSpelling::Sharps))).unwrap();
        assert_eq!(p.root_pitch_class, 1);
    }
}
