//! Reply attribution ("On … wrote:") detection and parsing.
//!
//! Mail clients introduce a quoted message with a single line naming the
//! original sender and when it was sent. The wording depends on the
//! client and the locale:
//!
//! - `Am 12.07.2025 um 14:35 schrieb Max Mustermann:`
//! - `On 3/4/2024 9:15 AM, John Smith wrote:`
//! - `On Mon, Jan 1, 2026 at 10:00 AM Alice <alice@example.com> wrote:`
//! - `Le 12/07/2025 à 14:35, Jean Dupont a écrit :`
//! - `El 12/07/2025 a las 14:35, Juan Pérez escribió:`
//!
//! Two strategies are available (see [`HeaderStrategy`]):
//!
//! - **Grammar**: the rule table below is tried top to bottom and the first
//!   full match wins. Localized rules come before the generic catch-alls so
//!   a looser rule never captures a name a specific rule binds better. A
//!   generic line either starts with the date and has a comma before the
//!   name, or carries one of the known "wrote" verbs; an ordinary sentence
//!   that merely contains a date, a time and a colon is not a header.
//! - **TokenScan**: any date token and any time token anywhere on the line;
//!   the author is what follows the time up to the next colon, reduced to
//!   its capitalized words. Tolerates unknown phrasings at the cost of the
//!   occasional wrong name.
//!
//! Parsing is all-or-nothing: a line either yields sender, date and time,
//! or it is not a header and yields nothing.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::HeaderStrategy;
use crate::models::Attribution;

/// Time of day, optionally with seconds and a meridiem suffix.
const TIME_TOKEN: &str = r"\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AaPp]\.?[Mm]\.?)?";

/// One locale-specific header grammar.
///
/// Patterns must define the named groups `date`, `time` and `from` and are
/// matched against a whitespace-trimmed line. `{TIME}` expands to
/// [`TIME_TOKEN`].
struct HeaderGrammar {
    name: &'static str,
    pattern: &'static str,
}

/// Header grammars in priority order.
const HEADER_GRAMMARS: &[HeaderGrammar] = &[
    // Am 12.07.2025 um 14:35 schrieb Max Mustermann:
    // Am Sa., 12. Juli 2025 um 14:35 Uhr schrieb Max <max@example.de>:
    HeaderGrammar {
        name: "german",
        pattern: r"^Am\s+(?:\p{L}{2,10}\.?,?\s+)?(?P<date>\d{1,2}\.\s?\d{1,2}\.\s?\d{2,4}|\d{1,2}\.\s+\p{L}+\.?\s+\d{4}),?\s+(?:um\s+)?(?P<time>{TIME})(?:\s+Uhr)?,?\s+schrieb\s+(?P<from>.+?)\s*:$",
    },
    // On 3/4/2024 9:15 AM, John Smith wrote:
    HeaderGrammar {
        name: "english-numeric",
        pattern: r"^On\s+(?:\p{L}{2,9}\.?,?\s+)?(?P<date>\d{1,2}/\d{1,2}/\d{2,4}),?\s+(?:at\s+)?(?P<time>{TIME}),?\s+(?P<from>.+?)\s+wrote\s*:$",
    },
    // On Mon, Jan 1, 2026 at 10:00 AM Alice <alice@example.com> wrote:
    // On 1 Jan 2026, at 10:00, Alice wrote:
    HeaderGrammar {
        name: "english-long",
        pattern: r"^On\s+(?:\p{L}{2,9}\.?,?\s+)?(?P<date>\p{L}{3,9}\.?\s+\d{1,2},?\s+\d{4}|\d{1,2}\s+\p{L}{3,9}\.?\s+\d{4}),?\s+(?:at\s+)?(?P<time>{TIME}),?\s+(?P<from>.+?)\s+wrote\s*:$",
    },
    // Le 12/07/2025 à 14:35, Jean Dupont a écrit :
    HeaderGrammar {
        name: "french",
        pattern: r"^Le\s+(?:\p{L}{2,9}\.?,?\s+)?(?P<date>\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}\s+\p{L}+\.?\s+\d{4}),?\s+(?:à\s+)?(?P<time>\d{1,2}[:h]\d{2}),?\s+(?P<from>.+?)\s+a\s+écrit\s*:$",
    },
    // El 12/07/2025 a las 14:35, Juan Pérez escribió:
    HeaderGrammar {
        name: "spanish",
        pattern: r"^El\s+(?:\p{L}{2,9}\.?,?\s+)?(?P<date>\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}\s+(?:de\s+)?\p{L}+\.?\s+(?:de\s+)?\d{4}),?\s+(?:a\s+las\s+)?(?P<time>{TIME}),?\s+(?P<from>.+?)\s+escribió\s*:$",
    },
    // 12.07.2025 14:35, Max Mustermann:
    HeaderGrammar {
        name: "generic-leading",
        pattern: r"(?i)^(?P<date>\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4})[\s,]+(?:(?:um|at|à|a\s+las)\s+)?(?P<time>{TIME})(?:\s+uhr)?\s*,\s*(?P<from>.+?)\s*:$",
    },
    // Sent 2025-07-12 14:35 Max Mustermann wrote:
    HeaderGrammar {
        name: "generic-verb-after",
        pattern: r"(?i)\b(?P<date>\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4})[\s,]+(?:(?:um|at|à|a\s+las)\s+)?(?P<time>{TIME})(?:\s+uhr)?[,\s-]+(?P<from>.+?)\s+(?:schrieb|wrote|a\s+écrit|escribió)\s*:$",
    },
    // 12.07.2025 14:35 schrieb Max Mustermann:
    HeaderGrammar {
        name: "generic-verb-before",
        pattern: r"(?i)\b(?P<date>\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4})[\s,]+(?:(?:um|at|à|a\s+las)\s+)?(?P<time>{TIME})(?:\s+uhr)?[,\s-]+(?:schrieb|wrote)\s+(?P<from>.+?)\s*:$",
    },
];

static GRAMMAR_REGEXES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static TOKEN_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static TIME_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static CAPITALIZED_WORDS_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_grammar_regexes() -> &'static [(&'static str, Regex)] {
    GRAMMAR_REGEXES.get_or_init(|| {
        HEADER_GRAMMARS
            .iter()
            .map(|grammar| {
                let pattern = grammar.pattern.replace("{TIME}", TIME_TOKEN);
                let re = Regex::new(&pattern).expect("Invalid header grammar regex");
                (grammar.name, re)
            })
            .collect()
    })
}

/// Line shape accepted by the token-scan strategy:
/// `<date> [um] <time> … <something>:`.
fn get_token_header_regex() -> &'static Regex {
    TOKEN_HEADER_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)(?:\d{1,2}[./-]){2}\d{2,4}[\s,]+(?:um\s)?\d{1,2}:\d{2}(?:\s?(?:AM|PM))?[,:\s-]+.+?:",
        )
        .expect("Invalid token header regex")
    })
}

fn get_date_token_regex() -> &'static Regex {
    DATE_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"\d{1,2}[./-]\d{1,2}[./-]\d{2,4}").expect("Invalid date token regex")
    })
}

fn get_time_token_regex() -> &'static Regex {
    TIME_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\d{1,2}:\d{2}(?:\s?(?:AM|PM))?").expect("Invalid time token regex")
    })
}

fn get_capitalized_words_regex() -> &'static Regex {
    CAPITALIZED_WORDS_REGEX.get_or_init(|| {
        Regex::new(r"\b\p{Lu}\p{Ll}+(?:\s\p{Lu}\p{Ll}+)*\b")
            .expect("Invalid capitalized words regex")
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce a captured sender to a display name.
///
/// `"Alice Smith" <alice@example.com>` becomes `Alice Smith`; a bare
/// `<alice@example.com>` becomes `alice@example.com`.
fn clean_author(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let mut author = collapsed.trim().trim_end_matches(',').trim();

    if author.ends_with('>') {
        if let Some(open) = author.rfind('<') {
            let name = author[..open].trim();
            author = if name.is_empty() {
                &author[open + 1..author.len() - 1]
            } else {
                name
            };
        }
    }

    author
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Keep only the capitalized-word runs of a captured author.
fn extract_name(raw: &str) -> String {
    let runs: Vec<&str> = get_capitalized_words_regex()
        .find_iter(raw)
        .map(|m| m.as_str())
        .collect();

    if runs.is_empty() {
        raw.trim().to_string()
    } else {
        runs.join(" ")
    }
}

fn parse_with_grammars(line: &str) -> Option<Attribution> {
    let line = line.trim();
    for (name, re) in get_grammar_regexes() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let attribution = Attribution::new(
            clean_author(caps.name("from").map_or("", |m| m.as_str())),
            collapse_whitespace(caps.name("date").map_or("", |m| m.as_str())),
            collapse_whitespace(caps.name("time").map_or("", |m| m.as_str())),
        );
        if !attribution.is_empty() {
            log::trace!("header matched {} grammar: {}", name, line);
            return Some(attribution);
        }
    }
    None
}

fn parse_with_tokens(line: &str) -> Attribution {
    let cleaned = collapse_whitespace(line);

    let Some(date) = get_date_token_regex().find(&cleaned) else {
        return Attribution::default();
    };
    let Some(time) = get_time_token_regex().find(&cleaned) else {
        return Attribution::default();
    };

    let after_time = cleaned[time.end()..].trim();
    let raw_author = after_time.split(':').next().unwrap_or("").trim();

    Attribution::new(
        extract_name(raw_author),
        date.as_str().to_string(),
        time.as_str().to_string(),
    )
}

/// Whether `line` is an attribution header under `strategy`.
pub fn is_date_and_author_line(line: &str, strategy: HeaderStrategy) -> bool {
    match strategy {
        HeaderStrategy::Grammar => parse_with_grammars(line).is_some(),
        HeaderStrategy::TokenScan => get_token_header_regex().is_match(line),
    }
}

/// First line of `message` that is an attribution header, trimmed.
pub fn extract_date_and_author_line(message: &str, strategy: HeaderStrategy) -> Option<&str> {
    message
        .lines()
        .map(str::trim)
        .find(|line| is_date_and_author_line(line, strategy))
}

/// Sender, date and time of a header line; empty when it is not one.
pub fn parse_date_and_author_line(line: &str, strategy: HeaderStrategy) -> Attribution {
    if line.trim().is_empty() {
        return Attribution::default();
    }
    match strategy {
        HeaderStrategy::Grammar => parse_with_grammars(line).unwrap_or_default(),
        HeaderStrategy::TokenScan => parse_with_tokens(line),
    }
}

/// Drop every attribution header line from `message`.
///
/// Normally a chunk holds at most one, but stray echoes from nested quote
/// boundaries are removed too.
pub fn remove_date_and_author_lines(message: &str, strategy: HeaderStrategy) -> String {
    message
        .split('\n')
        .filter(|line| !is_date_and_author_line(line, strategy))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(line: &str) -> Attribution {
        parse_date_and_author_line(line, HeaderStrategy::Grammar)
    }

    fn tokens(line: &str) -> Attribution {
        parse_date_and_author_line(line, HeaderStrategy::TokenScan)
    }

    fn attribution(from: &str, date: &str, time: &str) -> Attribution {
        Attribution::new(from.to_string(), date.to_string(), time.to_string())
    }

    #[test]
    fn german_header() {
        assert_eq!(
            grammar("Am 12.07.2025 um 14:35 schrieb Max Mustermann:"),
            attribution("Max Mustermann", "12.07.2025", "14:35")
        );
    }

    #[test]
    fn german_long_date_header_with_address() {
        assert_eq!(
            grammar("Am Sa., 12. Juli 2025 um 14:35 Uhr schrieb Max Mustermann <max@example.de>:"),
            attribution("Max Mustermann", "12. Juli 2025", "14:35")
        );
    }

    #[test]
    fn english_numeric_header() {
        assert_eq!(
            grammar("On 3/4/2024 9:15 AM, John Smith wrote:"),
            attribution("John Smith", "3/4/2024", "9:15 AM")
        );
    }

    #[test]
    fn english_long_header() {
        assert_eq!(
            grammar("On Mon, Jan 1, 2026 at 10:00 AM Alice Smith <alice@example.com> wrote:"),
            attribution("Alice Smith", "Jan 1, 2026", "10:00 AM")
        );
        assert_eq!(
            grammar("On 1 Jan 2026, at 10:00, Bob wrote:"),
            attribution("Bob", "1 Jan 2026", "10:00")
        );
    }

    #[test]
    fn french_header() {
        assert_eq!(
            grammar("Le 12/07/2025 à 14:35, Jean Dupont a écrit :"),
            attribution("Jean Dupont", "12/07/2025", "14:35")
        );
    }

    #[test]
    fn spanish_header() {
        assert_eq!(
            grammar("El 12/07/2025 a las 14:35, Juan Pérez escribió:"),
            attribution("Juan Pérez", "12/07/2025", "14:35")
        );
    }

    #[test]
    fn generic_header() {
        assert_eq!(
            grammar("2025-07-12 14:35, Erika Musterfrau:"),
            attribution("Erika Musterfrau", "2025-07-12", "14:35")
        );
        assert_eq!(
            grammar("Sent 12.07.2025 14:35 Erika Musterfrau wrote:"),
            attribution("Erika Musterfrau", "12.07.2025", "14:35")
        );
    }

    #[test]
    fn bare_address_author() {
        assert_eq!(
            grammar("On 3/4/2024 9:15 AM, <jsmith@example.com> wrote:"),
            attribution("jsmith@example.com", "3/4/2024", "9:15 AM")
        );
    }

    #[test]
    fn non_header_lines_yield_nothing() {
        assert_eq!(grammar("Hello there"), Attribution::default());
        assert_eq!(grammar("Meeting on 12.07.2025 at noon"), Attribution::default());
        assert_eq!(grammar(""), Attribution::default());
        assert_eq!(tokens("no date here: nope"), Attribution::default());
    }

    #[test]
    fn token_scan_uses_capitalized_words() {
        assert_eq!(
            tokens("Am 12.07.2025 um 14:35 schrieb Max Mustermann:"),
            attribution("Max Mustermann", "12.07.2025", "14:35")
        );
        assert_eq!(
            tokens("On 3/4/2024 9:15 AM, John Smith wrote:"),
            attribution("John Smith", "3/4/2024", "9:15 AM")
        );
    }

    #[test]
    fn extract_finds_first_header_line() {
        let chunk = "Thanks!\n\nOn 3/4/2024 9:15 AM, John Smith wrote:\nmore";
        assert_eq!(
            extract_date_and_author_line(chunk, HeaderStrategy::Grammar),
            Some("On 3/4/2024 9:15 AM, John Smith wrote:")
        );
        assert_eq!(
            extract_date_and_author_line("plain text", HeaderStrategy::Grammar),
            None
        );
    }

    #[test]
    fn strategies_disagree_on_unlisted_phrasing() {
        // Dutch is not in the grammar table and "schreef" is no known verb.
        let line = "Op 12-07-2025 14:35 schreef Jan Jansen:";
        assert_eq!(grammar(line), Attribution::default());
        assert!(!is_date_and_author_line(line, HeaderStrategy::Grammar));
        assert_eq!(tokens(line).from, "Jan Jansen");
        assert!(is_date_and_author_line(line, HeaderStrategy::TokenScan));
    }

    #[test]
    fn generic_rules_need_leading_date_or_verb() {
        let line = "Deployed on 2025-07-12 14:35 to these hosts:";
        assert!(!is_date_and_author_line(line, HeaderStrategy::Grammar));
        assert!(is_date_and_author_line(line, HeaderStrategy::TokenScan));
        assert!(!is_date_and_author_line(
            "Backup ran 12.07.2025 14:35, results:",
            HeaderStrategy::Grammar
        ));
        assert_eq!(
            grammar("12.07.2025 14:35 schrieb Max Mustermann:"),
            attribution("Max Mustermann", "12.07.2025", "14:35")
        );
    }

    #[test]
    fn remove_strips_all_header_lines() {
        let chunk = "Reply\nAm 12.07.2025 um 14:35 schrieb Max Mustermann:\nAm 11.07.2025 um 09:00 schrieb Erika Musterfrau:";
        assert_eq!(
            remove_date_and_author_lines(chunk, HeaderStrategy::Grammar),
            "Reply"
        );
    }
}
