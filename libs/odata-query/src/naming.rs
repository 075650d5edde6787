//! Range variable naming for lambda quantifiers.
//!
//! `ClassSections/any(...)` binds `classSection`: the collection's terminal segment
//! is lower-camel-cased and its last word singularized.

use heck::ToLowerCamelCase;

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "species",
    "staff",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("addresses", "address"),
    ("aliases", "alias"),
    ("analyses", "analysis"),
    ("children", "child"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("diagnoses", "diagnosis"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lenses", "lens"),
    ("lives", "life"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("movies", "movie"),
    ("oxen", "ox"),
    ("people", "person"),
    ("quizzes", "quiz"),
    ("shelves", "shelf"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

const SUFFIX_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("sses", "ss"),
    ("shes", "sh"),
    ("ches", "ch"),
    ("xes", "x"),
    ("zzes", "zz"),
    ("wives", "wife"),
    ("heroes", "hero"),
    ("atoes", "ato"),
    ("echoes", "echo"),
    ("vetoes", "veto"),
];

const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Range variable bound by a lambda over the collection whose last segment is `terminal`.
#[must_use]
pub fn lambda_variable(terminal: &str) -> String {
    singularize(&terminal.to_lower_camel_case())
}

/// Singularize the last camel-case word of `word`.
#[must_use]
pub fn singularize(word: &str) -> String {
    let split = word
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_uppercase())
        .map_or(0, |(idx, _)| idx);
    let (head, last) = word.split_at(split);
    format!("{head}{}", singularize_word(last))
}

fn singularize_word(word: &str) -> String {
    if !word.is_ascii() {
        return word.to_owned();
    }
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_owned();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return match_leading_case(word, singular);
    }
    if let Some(stem) = latin_us_stem(&lower) {
        return word[..stem].to_owned();
    }
    for (suffix, replacement) in SUFFIX_RULES {
        if lower.ends_with(suffix) {
            let stem = &word[..word.len() - suffix.len()];
            return if stem.is_empty() {
                match_leading_case(word, replacement)
            } else {
                format!("{stem}{replacement}")
            };
        }
    }
    if lower.len() > 1
        && lower.ends_with('s')
        && !SINGULAR_ENDINGS.iter().any(|ending| lower.ends_with(ending))
    {
        return word[..word.len() - 1].to_owned();
    }
    word.to_owned()
}

/// Length of the singular for `-uses` plurals of `-us` nouns (`statuses`, `campuses`),
/// excluding `-ouses`, `-auses` and `-uuses` (`houses`, `causes`).
fn latin_us_stem(lower: &str) -> Option<usize> {
    let stem = lower.strip_suffix("uses")?;
    let before = stem.chars().last()?;
    (!matches!(before, 'a' | 'o' | 'u')).then_some(stem.len() + 2)
}

fn match_leading_case(original: &str, replacement: &str) -> String {
    let upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_owned(),
    }
}
