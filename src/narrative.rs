//! Narrative rendering: step labels and sentence-style names.
//!
//! A step's rendered text is its label followed by its description. The
//! label is the upper-case keyword of the step's command, unless the previous
//! step had the same command, in which case the step reads as a continuation
//! (`and`).
//!
//! Descriptions may also be derived from identifiers. Rust has no ambient
//! "calling member" facility, so names come from the type name of a function
//! item (see [`function_name`]) or from the [`function_name!`](crate::function_name)
//! macro, then pass through [`sentence_from_identifier`].

use std::fmt;

use crate::step::Command;

/// The word rendered for a continuation step.
pub const AND_KEYWORD: &str = "and";

/// The rendered prefix of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// The step opens a new block and shows its own keyword.
    Keyword(Command),
    /// The step continues a block of the same command.
    And,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(command) => f.write_str(command.keyword()),
            Self::And => f.write_str(AND_KEYWORD),
        }
    }
}

/// Choose the label for a step with `command` appended after `previous`.
#[must_use]
pub fn label_for(command: Command, previous: Option<Command>) -> Label {
    if previous == Some(command) {
        Label::And
    } else {
        Label::Keyword(command)
    }
}

/// Turn an identifier into a lower-case sentence.
///
/// A space goes before every upper-case letter except a leading one, and
/// before the first digit; from that digit on, the rest of the identifier is
/// kept as a single word. Underscores separate words.
///
/// ```
/// use fluent_scenario::narrative::sentence_from_identifier;
///
/// assert_eq!(
///     sentence_from_identifier("TheTemperatureIsBelow0C"),
///     "the temperature is below 0c"
/// );
/// assert_eq!(
///     sentence_from_identifier("when_the_weather_is_too_cold"),
///     "when the weather is too cold"
/// );
/// ```
#[must_use]
pub fn sentence_from_identifier(identifier: &str) -> String {
    let mut spaced = String::with_capacity(identifier.len() + 8);
    let mut in_digit_tail = false;

    for (position, character) in identifier.chars().enumerate() {
        if character == '_' {
            spaced.push(' ');
            continue;
        }
        if !in_digit_tail && position > 0 {
            if character.is_ascii_digit() {
                in_digit_tail = true;
                spaced.push(' ');
            } else if character.is_uppercase() {
                spaced.push(' ');
            }
        }
        spaced.push(character);
    }

    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract a function's own name from a fully qualified type name.
///
/// Generic arguments are ignored and closure segments are skipped, so a
/// closure reports the name of the function that defines it. Returns `None`
/// when no named segment remains.
///
/// ```
/// use fluent_scenario::narrative::function_name_from_type_name;
///
/// assert_eq!(
///     function_name_from_type_name("my_tests::weather::stay_inside"),
///     Some("stay_inside")
/// );
/// assert_eq!(
///     function_name_from_type_name("my_tests::weather::{{closure}}"),
///     Some("weather")
/// );
/// ```
#[must_use]
pub fn function_name_from_type_name(type_name: &str) -> Option<&str> {
    split_path(type_name)
        .into_iter()
        .rev()
        .map(strip_generics)
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
}

/// The sentence-style name of a function item or closure.
#[must_use]
pub fn function_name(type_name: &str) -> String {
    function_name_from_type_name(type_name)
        .map(sentence_from_identifier)
        .unwrap_or_default()
}

/// Split a path on `::`, ignoring separators nested inside `<...>`.
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0_usize;
    let mut previous_colon = false;

    for (index, character) in path.char_indices() {
        match character {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ':' if depth == 0 && previous_colon => {
                if let Some(segment) = path.get(start..index.saturating_sub(1)) {
                    segments.push(segment);
                }
                start = index + 1;
            }
            _ => {}
        }
        previous_colon = character == ':' && !previous_colon;
    }
    if let Some(segment) = path.get(start..) {
        segments.push(segment);
    }
    segments
}

fn strip_generics(segment: &str) -> &str {
    segment
        .split_once('<')
        .map_or(segment, |(name, _)| name)
        .trim()
}

/// Expands to the `&'static str` name of the enclosing function.
///
/// ```
/// fn loads_configuration() -> &'static str {
///     fluent_scenario::function_name!()
/// }
///
/// assert_eq!(loads_configuration(), "loads_configuration");
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __fluent_scenario_marker() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let full = __type_name_of(__fluent_scenario_marker);
        let enclosing = full
            .strip_suffix("::__fluent_scenario_marker")
            .unwrap_or(full);
        $crate::narrative::function_name_from_type_name(enclosing).unwrap_or(enclosing)
    }};
}
