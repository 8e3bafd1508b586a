/// Keyword and phrase matching shared by the state tracker and classifier.
///
/// Patterns are compiled once and matched case-insensitively. Trigger lists
/// are ordered `(pattern, effect)` pairs; within one text the match that
/// occurs latest wins, ties going to the earlier list entry.

use regex_lite::Regex;

use crate::schema::scene_state::CastName;

/// Compile a case-insensitive pattern. Only used on literal patterns.
pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(&format!("(?i){}", source)).expect("valid cue pattern")
}

/// The matched text of the first hit, lower-cased.
pub(crate) fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_lowercase())
}

/// A trigger hit inside a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hit<E> {
    pub effect: E,
    pub start: usize,
    pub cue: String,
}

/// Evaluate an ordered trigger list against `text` and keep the effect whose
/// match sits furthest into the text.
pub(crate) fn latest_effect<E: Copy>(triggers: &[(Regex, E)], text: &str) -> Option<Hit<E>> {
    let mut best: Option<Hit<E>> = None;
    for (re, effect) in triggers {
        if let Some(m) = re.find_iter(text).last() {
            let later = best.as_ref().map_or(true, |b| m.start() > b.start);
            if later {
                best = Some(Hit {
                    effect: *effect,
                    start: m.start(),
                    cue: m.as_str().to_lowercase(),
                });
            }
        }
    }
    best
}

/// Where a character's name appears in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NameSpan<'n> {
    start: usize,
    end: usize,
    name: &'n str,
}

impl NameSpan<'_> {
    /// Strictly longer and covering `inner`.
    fn encloses(&self, inner: &NameSpan) -> bool {
        self.start <= inner.start
            && inner.end <= self.end
            && self.end - self.start > inner.end - inner.start
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every whole-word occurrence of any spelling in `names`. A span nested in a
/// longer one ("Rook" inside "Sgt. Rook") is dropped.
fn name_spans<'n>(text: &str, names: &'n [CastName]) -> Vec<NameSpan<'n>> {
    let mut spans = Vec::new();
    for cast in names {
        for spelling in cast.spellings.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let re = pattern(&regex_lite::escape(spelling));
            for m in re.find_iter(text) {
                let open = !text[..m.start()].chars().next_back().is_some_and(is_name_char);
                let close = !text[m.end()..].chars().next().is_some_and(is_name_char);
                if open && close {
                    spans.push(NameSpan {
                        start: m.start(),
                        end: m.end(),
                        name: cast.name.as_str(),
                    });
                }
            }
        }
    }
    spans
        .iter()
        .filter(|span| !spans.iter().any(|other| other.encloses(span)))
        .copied()
        .collect()
}

/// Byte offsets of sentence terminators, skipping any that sit inside a name.
fn sentence_breaks(text: &str, spans: &[NameSpan]) -> Vec<usize> {
    text.char_indices()
        .filter(|(_, c)| matches!(c, '.' | '!' | '?' | ';' | '\n'))
        .map(|(i, _)| i)
        .filter(|i| !spans.iter().any(|s| s.start <= *i && *i < s.end))
        .collect()
}

/// For every match of `verb` in `text`, the character named closest before
/// it in the same sentence. Names are only taken from `names`, so someone
/// merely mentioned elsewhere in the beat is never picked up. Subjects are
/// reported by their `CastName::name`.
pub(crate) fn subjects_of<'n>(verb: &Regex, text: &str, names: &'n [CastName]) -> Vec<&'n str> {
    let spans = name_spans(text, names);
    if spans.is_empty() {
        return Vec::new();
    }
    let breaks = sentence_breaks(text, &spans);

    let mut subjects: Vec<&str> = Vec::new();
    for verb_match in verb.find_iter(text) {
        if spans
            .iter()
            .any(|s| s.start < verb_match.end() && verb_match.start() < s.end)
        {
            continue;
        }
        let sentence_start = breaks
            .iter()
            .rev()
            .find(|b| **b < verb_match.start())
            .map_or(0, |b| b + 1);
        let nearest = spans
            .iter()
            .filter(|s| s.start >= sentence_start && s.end <= verb_match.start())
            .max_by_key(|s| s.start);
        if let Some(span) = nearest {
            if !subjects.contains(&span.name) {
                subjects.push(span.name);
            }
        }
    }
    subjects
}
