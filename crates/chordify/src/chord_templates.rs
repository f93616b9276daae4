use crate::profile::IntervalProfile;
use crate::types::ChordQuality;

/// A chord template: quality + interval set from root + base confidence for
/// an exact match.
///
/// A template's rank is its position in [`TEMPLATES`].
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub profile: IntervalProfile,
    pub size: usize,
    pub confidence: f64,
}

impl ChordTemplate {
    const fn new(quality: ChordQuality, intervals: &[u8], confidence: f64) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << intervals[i];
            i += 1;
        }
        Self {
            quality,
            profile: IntervalProfile::from_mask(mask),
            size: intervals.len(),
            confidence,
        }
    }

    pub fn suffix(&self) -> &'static str {
        self.quality.suffix()
    }
}

/// Exact-match confidence for triads and plain sevenths.
const CANONICAL: f64 = 1.0;

/// Power chords are unambiguous but carry no third.
pub const POWER_CHORD_CONFIDENCE: f64 = 0.85;

/// All recognized chord templates, most specific first.
///
/// Larger interval sets come before smaller ones so a triad never outranks
/// the seventh or ninth chord that contains it.
pub static TEMPLATES: &[ChordTemplate] = &[
    // 6-note: thirteenths and elevenths
    ChordTemplate::new(ChordQuality::Dominant13, &[0, 2, 4, 7, 9, 10], 0.85),
    ChordTemplate::new(ChordQuality::Major13, &[0, 2, 4, 7, 9, 11], 0.85),
    ChordTemplate::new(ChordQuality::Minor13, &[0, 2, 3, 7, 9, 10], 0.85),
    ChordTemplate::new(ChordQuality::Dominant11, &[0, 2, 4, 5, 7, 10], 0.87),
    ChordTemplate::new(ChordQuality::Minor11, &[0, 2, 3, 5, 7, 10], 0.87),
    // 5-note: ninths
    ChordTemplate::new(ChordQuality::Dominant9, &[0, 2, 4, 7, 10], 0.9),
    ChordTemplate::new(ChordQuality::Major9, &[0, 2, 4, 7, 11], 0.9),
    ChordTemplate::new(ChordQuality::Minor9, &[0, 2, 3, 7, 10], 0.9),
    ChordTemplate::new(ChordQuality::SixNine, &[0, 2, 4, 7, 9], 0.9),
    ChordTemplate::new(ChordQuality::Dominant7Flat9, &[0, 1, 4, 7, 10], 0.88),
    ChordTemplate::new(ChordQuality::Dominant7Sharp9, &[0, 3, 4, 7, 10], 0.88),
    ChordTemplate::new(ChordQuality::Dominant9Sus4, &[0, 2, 5, 7, 10], 0.88),
    // 4-note: sevenths
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10], CANONICAL),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11], CANONICAL),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10], CANONICAL),
    ChordTemplate::new(ChordQuality::MinorMajor7, &[0, 3, 7, 11], CANONICAL),
    ChordTemplate::new(ChordQuality::Diminished7, &[0, 3, 6, 9], CANONICAL),
    ChordTemplate::new(ChordQuality::HalfDiminished7, &[0, 3, 6, 10], CANONICAL),
    ChordTemplate::new(ChordQuality::Dominant7Sus4, &[0, 5, 7, 10], 0.9),
    ChordTemplate::new(ChordQuality::Augmented7, &[0, 4, 8, 10], 0.9),
    ChordTemplate::new(ChordQuality::Dominant7Flat5, &[0, 4, 6, 10], 0.9),
    ChordTemplate::new(ChordQuality::Major7Sharp5, &[0, 4, 8, 11], 0.9),
    // 4-note: sixths and added tones
    ChordTemplate::new(ChordQuality::Major6, &[0, 4, 7, 9], 0.95),
    ChordTemplate::new(ChordQuality::Minor6, &[0, 3, 7, 9], 0.95),
    ChordTemplate::new(ChordQuality::Add9, &[0, 2, 4, 7], 0.9),
    ChordTemplate::new(ChordQuality::MinorAdd9, &[0, 2, 3, 7], 0.9),
    ChordTemplate::new(ChordQuality::Add11, &[0, 4, 5, 7], 0.9),
    // Triads
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7], CANONICAL),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7], CANONICAL),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6], CANONICAL),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8], CANONICAL),
    ChordTemplate::new(ChordQuality::Suspended4, &[0, 5, 7], 0.9),
    ChordTemplate::new(ChordQuality::Suspended2, &[0, 2, 7], 0.9),
    // Dyad
    ChordTemplate::new(ChordQuality::Power, &[0, 7], POWER_CHORD_CONFIDENCE),
];

/// Template for a quality, if one exists.
pub fn template_for(quality: ChordQuality) -> Option<&'static ChordTemplate> {
    TEMPLATES.iter().find(|t| t.quality == quality)
}
