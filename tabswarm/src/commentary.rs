//! Randomized feedback commentary.
//!
//! Text is composed from fixed sentence templates so filled forms look like
//! hurried human prose rather than noise, without pulling in a text corpus.

/// Sentence openers, each already carrying its trailing space.
const OPENERS: [&str; 15] = [
    "The feedback is ",
    "I think ",
    "Overall ",
    "In my opinion ",
    "The performance was ",
    "They did ",
    "The presentation was ",
    "This debate was ",
    "The arguments were ",
    "I found that ",
    "It appears that ",
    "Considering the points made ",
    "When analyzing the debate ",
    "From my perspective ",
    "Looking at the evidence presented ",
];

const ADJECTIVES: [&str; 20] = [
    "good",
    "great",
    "excellent",
    "poor",
    "adequate",
    "impressive",
    "disappointing",
    "outstanding",
    "mediocre",
    "average",
    "exceptional",
    "subpar",
    "reasonable",
    "compelling",
    "unconvincing",
    "persuasive",
    "weak",
    "strong",
    "nuanced",
    "simplistic",
];

const ADVERBS: [&str; 13] = [
    "very",
    "quite",
    "extremely",
    "somewhat",
    "rather",
    "fairly",
    "surprisingly",
    "remarkably",
    "notably",
    "unusually",
    "particularly",
    "especially",
    "generally",
];

const ELABORATION: &str = "However, there could be improvement in some areas. ";

/// Generate commentary between `min_len` and `max_len` characters.
///
/// Sentences are appended while they fit the drawn target length; the last
/// slot falls back to a short filler sentence when the next full sentence
/// would overshoot.
pub fn generate(min_len: usize, max_len: usize) -> String {
    let target = min_len + fastrand::usize(0..=max_len.saturating_sub(min_len));
    let mut out = String::with_capacity(target);
    let mut remaining = target;

    while remaining > 0 {
        let mut sentence = String::new();
        sentence.push_str(OPENERS[fastrand::usize(0..OPENERS.len())]);
        if fastrand::bool() {
            sentence.push_str(ADVERBS[fastrand::usize(0..ADVERBS.len())]);
            sentence.push(' ');
        }
        sentence.push_str(ADJECTIVES[fastrand::usize(0..ADJECTIVES.len())]);
        sentence.push_str(". ");

        if remaining > 50 && fastrand::f32() > 0.7 {
            sentence.push_str(ELABORATION);
        }

        if sentence.len() <= remaining {
            remaining -= sentence.len();
            out.push_str(&sentence);
        } else {
            let short = string_concat!(
                "It was ",
                ADJECTIVES[fastrand::usize(0..ADJECTIVES.len())],
                ". "
            );
            if short.len() <= remaining {
                out.push_str(&short);
            }
            remaining = 0;
        }
    }

    out
}
