//! CLI output formatting for every command.
//!
//! Logging (`tracing`, stderr) is for diagnosing a run. This module is the
//! operator-facing summary on stdout: one header line per result, with
//! indented context lines underneath.
//!
//! # Output Format
//!
//! ## Post
//!
//! ```text
//! posted cats/black and white/01.jpg
//!     Attempts: 2
//!     Upload: resized to 2048px wide
//! ```
//!
//! ```text
//! giving up! cats/black and white/01.jpg
//!     Attempts: 5
//!     Last error: /api/v2/media returned 503: Service Unavailable
//! ```
//!
//! ```text
//! nothing to post: already at the end of the sequence
//! ```
//!
//! ## Check
//!
//! ```text
//! Media root: /srv/bot/media
//!     Files: 12
//!     Candidates: 7
//!     Next (sequential): cats/01.jpg
//!         Daily cat
//!         #cats
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalog::{Catalog, Item};
use crate::pipeline::Outcome;
use crate::retry::Delivery;
use crate::text::truncate_chars;

const NOTHING_TO_POST: &str = "nothing to post: already at the end of the sequence";
const MAX_ERROR_CHARS: usize = 160;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn give_up_lines(subject: &str, attempts: u32, last_error: &str) -> Vec<String> {
    vec![
        format!("giving up! {}", subject),
        format!("{}Attempts: {}", indent(1), attempts),
        format!(
            "{}Last error: {}",
            indent(1),
            truncate_chars(last_error, MAX_ERROR_CHARS)
        ),
    ]
}

// ============================================================================
// post
// ============================================================================

/// Format the result of a publishing run.
pub fn format_outcome(outcome: &Outcome, max_width: u32) -> Vec<String> {
    match outcome {
        Outcome::NothingToPost => vec![NOTHING_TO_POST.to_string()],
        Outcome::Posted {
            item,
            attempts,
            resized,
        } => {
            let mut lines = vec![
                format!("posted {}", item.id),
                format!("{}Attempts: {}", indent(1), attempts),
            ];
            if *resized {
                lines.push(format!(
                    "{}Upload: resized to {}px wide",
                    indent(1),
                    max_width
                ));
            }
            lines
        }
        Outcome::GaveUp {
            item,
            attempts,
            last_error,
        } => give_up_lines(&item.id, *attempts, last_error),
    }
}

/// Print the result of a publishing run to stdout.
pub fn print_outcome(outcome: &Outcome, max_width: u32) {
    for line in format_outcome(outcome, max_width) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the dry-run report: counts, plus the item a sequential run would
/// post next and the text it would get.
pub fn format_check_output(catalog: &Catalog, next: Option<(&Item, &str)>) -> Vec<String> {
    let mut lines = vec![
        format!("Media root: {}", catalog.root.display()),
        format!("{}Files: {}", indent(1), catalog.total_files),
        format!("{}Candidates: {}", indent(1), catalog.candidates.len()),
    ];
    match next {
        Some((item, text)) => {
            lines.push(format!("{}Next (sequential): {}", indent(1), item.id));
            for text_line in text.lines() {
                lines.push(format!("{}{}", indent(2), text_line));
            }
        }
        None => lines.push(format!("{}{}", indent(1), NOTHING_TO_POST)),
    }
    lines
}

/// Print the dry-run report to stdout.
pub fn print_check_output(catalog: &Catalog, next: Option<(&Item, &str)>) {
    for line in format_check_output(catalog, next) {
        println!("{}", line);
    }
}

// ============================================================================
// say
// ============================================================================

/// Format the result of a text-only status.
pub fn format_say_output(delivery: &Delivery<()>) -> Vec<String> {
    match delivery {
        Delivery::Delivered { attempts, .. } => vec![
            "posted status".to_string(),
            format!("{}Attempts: {}", indent(1), attempts),
        ],
        Delivery::Exhausted {
            attempts,
            last_error,
        } => give_up_lines("status", *attempts, last_error),
    }
}

/// Print the result of a text-only status to stdout.
pub fn print_say_output(delivery: &Delivery<()>) {
    for line in format_say_output(delivery) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MediaKind;
    use std::path::PathBuf;

    fn item(id: &str) -> Item {
        Item {
            path: PathBuf::from("/srv/media").join(id),
            id: id.to_string(),
            kind: MediaKind::Still,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // post
    // =========================================================================

    #[test]
    fn nothing_to_post_line() {
        assert_eq!(
            format_outcome(&Outcome::NothingToPost, 2048),
            vec!["nothing to post: already at the end of the sequence"]
        );
    }

    #[test]
    fn posted_original() {
        let lines = format_outcome(
            &Outcome::Posted {
                item: item("cats/01.jpg"),
                attempts: 1,
                resized: false,
            },
            2048,
        );
        assert_eq!(lines, vec!["posted cats/01.jpg", "    Attempts: 1"]);
    }

    #[test]
    fn posted_resized_mentions_width() {
        let lines = format_outcome(
            &Outcome::Posted {
                item: item("big.png"),
                attempts: 3,
                resized: true,
            },
            1024,
        );
        assert_eq!(lines[2], "    Upload: resized to 1024px wide");
    }

    #[test]
    fn gave_up_shows_last_error() {
        let lines = format_outcome(
            &Outcome::GaveUp {
                item: item("a.gif"),
                attempts: 5,
                last_error: "connection refused".into(),
            },
            2048,
        );
        assert_eq!(
            lines,
            vec![
                "giving up! a.gif",
                "    Attempts: 5",
                "    Last error: connection refused",
            ]
        );
    }

    // =========================================================================
    // check
    // =========================================================================

    #[test]
    fn check_with_next_item() {
        let next = item("cats/01.jpg");
        let catalog = Catalog {
            root: PathBuf::from("/srv/media"),
            total_files: 3,
            candidates: vec![next.clone(), item("dogs/02.png")],
        };
        let lines = format_check_output(&catalog, Some((&next, "Daily cat\n#cats")));
        assert_eq!(
            lines,
            vec![
                "Media root: /srv/media",
                "    Files: 3",
                "    Candidates: 2",
                "    Next (sequential): cats/01.jpg",
                "        Daily cat",
                "        #cats",
            ]
        );
    }

    #[test]
    fn check_when_exhausted() {
        let catalog = Catalog {
            root: PathBuf::from("/srv/media"),
            total_files: 4,
            candidates: Vec::new(),
        };
        let lines = format_check_output(&catalog, None);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "    Candidates: 0");
        assert!(lines[3].contains("nothing to post"));
    }

    // =========================================================================
    // say
    // =========================================================================

    #[test]
    fn say_delivered() {
        let lines = format_say_output(&Delivery::Delivered {
            value: (),
            attempts: 2,
        });
        assert_eq!(lines, vec!["posted status", "    Attempts: 2"]);
    }

    #[test]
    fn say_exhausted() {
        let lines = format_say_output(&Delivery::Exhausted {
            attempts: 5,
            last_error: "x".repeat(500),
        });
        assert_eq!(lines[0], "giving up! status");
        assert!(lines[2].ends_with("..."));
    }
}
