//! Best-effort extraction of exercise structure from free-text knowledge
//! base passages. Inherently fuzzy; every function has a documented fallback
//! and nothing downstream treats the output as validated structured data.

use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_SETS: i32 = 3;
pub const DEFAULT_REPS: i32 = 15;

/// Longest name we keep before truncating at a word boundary.
const MAX_NAME_LEN: usize = 80;

lazy_static! {
    static ref SETS_RE: Regex = Regex::new(r"(?i)(\d+)\s*(?:sets?|series)").unwrap();
    static ref REPS_RE: Regex =
        Regex::new(r"(?i)(\d+)\s*(?:reps?|repetitions?|repeticion(?:es)?)").unwrap();
    static ref DURATION_RE: Regex =
        Regex::new(r"(?i)(\d+)\s*(?:min(?:ute)?s?|minutos?)").unwrap();
}

fn extract_number(re: &Regex, text: &str) -> Option<i32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Number of sets mentioned in the passage, defaulting to [`DEFAULT_SETS`].
pub fn extract_sets(text: &str) -> i32 {
    extract_number(&SETS_RE, text).unwrap_or(DEFAULT_SETS)
}

/// Number of reps mentioned in the passage, defaulting to [`DEFAULT_REPS`].
pub fn extract_reps(text: &str) -> i32 {
    extract_number(&REPS_RE, text).unwrap_or(DEFAULT_REPS)
}

/// Duration in minutes, with no default; most drills are set/rep based.
pub fn extract_duration_minutes(text: &str) -> Option<i32> {
    extract_number(&DURATION_RE, text)
}

/// Sniffs an exercise name out of a passage: first line or sentence,
/// truncated at a word boundary. Falls back to a generic label for
/// degenerate input.
pub fn extract_exercise_name(text: &str) -> String {
    let first = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    let sentence = first.split(['.', ':']).next().unwrap_or(first).trim();

    if sentence.is_empty() {
        return "Ejercicio de tecnica".to_string();
    }

    if sentence.len() <= MAX_NAME_LEN {
        return sentence.to_string();
    }

    let mut cut = MAX_NAME_LEN;
    while cut > 0 && !sentence.is_char_boundary(cut) {
        cut -= 1;
    }
    match sentence[..cut].rfind(' ') {
        Some(space) if space > 0 => sentence[..space].to_string(),
        _ => sentence[..cut].to_string(),
    }
}

/// Splits an AI drill suggestion on its leading "name: instructions" colon.
/// Suggestions without the pattern become their own name and instructions.
pub fn split_drill_suggestion(suggestion: &str) -> (String, String) {
    match suggestion.split_once(':') {
        Some((name, instructions)) if !name.trim().is_empty() => {
            (name.trim().to_string(), instructions.trim().to_string())
        }
        _ => (suggestion.trim().to_string(), suggestion.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_and_reps_are_sniffed_from_text() {
        let text = "Shadow swings: perform 4 sets of 12 reps focusing on the follow-through.";
        assert_eq!(extract_sets(text), 4);
        assert_eq!(extract_reps(text), 12);
        assert_eq!(extract_duration_minutes(text), None);
    }

    #[test]
    fn spanish_units_are_recognized() {
        let text = "Haz 5 series de 10 repeticiones durante 20 minutos.";
        assert_eq!(extract_sets(text), 5);
        assert_eq!(extract_reps(text), 10);
        assert_eq!(extract_duration_minutes(text), Some(20));
    }

    #[test]
    fn missing_counts_fall_back_to_defaults() {
        let text = "Practice the toss against a wall until consistent.";
        assert_eq!(extract_sets(text), DEFAULT_SETS);
        assert_eq!(extract_reps(text), DEFAULT_REPS);
    }

    #[test]
    fn name_is_first_sentence() {
        let text = "Wall volley drill. Stand two meters from the wall and volley continuously.";
        assert_eq!(extract_exercise_name(text), "Wall volley drill");
    }

    #[test]
    fn long_names_are_truncated_at_word_boundary() {
        let text = "An extremely long description of a drill that keeps going on and on and never actually names itself properly";
        let name = extract_exercise_name(text);
        assert!(name.len() <= 80);
        assert!(!name.ends_with(' '));
    }

    #[test]
    fn empty_text_gets_generic_name() {
        assert_eq!(extract_exercise_name("   \n  "), "Ejercicio de tecnica");
    }

    #[test]
    fn drill_suggestion_splits_on_leading_colon() {
        let (name, instructions) =
            split_drill_suggestion("Toss practice: repeat the toss 20 times against a line");
        assert_eq!(name, "Toss practice");
        assert_eq!(instructions, "repeat the toss 20 times against a line");
    }

    #[test]
    fn drill_suggestion_without_colon_is_both_name_and_instructions() {
        let (name, instructions) = split_drill_suggestion("Practice split step timing");
        assert_eq!(name, "Practice split step timing");
        assert_eq!(instructions, name);
    }
}
