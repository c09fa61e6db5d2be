//! Status text composition.
//!
//! A status is built from several optional fragments, any of which may be
//! missing or empty:
//!
//! ```text
//! <default_desc>
//! <metadata description>
//! Source: <source 1>|<source 2>
//! <default_tags> <directory tags> <media format tag>
//! ```
//!
//! Empty fragments never leave stray separators behind. All of this goes
//! through [`join_non_empty`].
//!
//! ## Directory tags
//!
//! The folder layout under the media root doubles as a tagging taxonomy:
//! `media/cats/black and white/01.jpg` is posted with
//! `#cats #black #and #white`. Both path separators and whitespace inside a
//! folder name split tags.

use crate::catalog::{Item, MediaKind};
use std::path::Path;

/// Join the non-empty parts with `separator`.
///
/// `None` and `""` are skipped entirely, so no doubled or trailing separators
/// appear. Joining nothing yields an empty string.
pub fn join_non_empty(separator: &str, parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Hashtags derived from the item's directory relative to `root`.
///
/// Items directly under the root get no tags.
pub fn directory_tags(root: &Path, item_path: &Path) -> String {
    let Some(dir) = item_path
        .strip_prefix(root)
        .ok()
        .and_then(|rel| rel.parent())
    else {
        return String::new();
    };

    let tags: Vec<String> = dir
        .components()
        .flat_map(|c| {
            c.as_os_str()
                .to_string_lossy()
                .split_whitespace()
                .map(|segment| format!("#{segment}"))
                .collect::<Vec<_>>()
        })
        .collect();

    let parts: Vec<Option<&str>> = tags.iter().map(|t| Some(t.as_str())).collect();
    join_non_empty(" ", &parts)
}

/// Extra tag announcing animated media. Stills and QuickTime files get none.
pub fn media_format_tag(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "#video",
        MediaKind::Gif => "#gif",
        MediaKind::Still | MediaKind::QuickTime => "",
    }
}

/// Fixed text that goes into every status.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub default_desc: String,
    pub default_tags: String,
    pub add_media_format_tag: bool,
}

/// Build the full status text for `item`.
///
/// `metadata` is the already-rendered curated text for the item (see
/// [`MetadataStore::lookup`](crate::metadata::MetadataStore::lookup)).
pub fn compose_post(options: &ComposeOptions, metadata: &str, root: &Path, item: &Item) -> String {
    let description = join_non_empty(
        "\n",
        &[Some(options.default_desc.as_str()), Some(metadata)],
    );

    let dir_tags = directory_tags(root, &item.path);
    let format_tag = if options.add_media_format_tag {
        media_format_tag(item.kind)
    } else {
        ""
    };
    let tags = join_non_empty(
        " ",
        &[
            Some(options.default_tags.as_str()),
            Some(dir_tags.as_str()),
            Some(format_tag),
        ],
    );

    join_non_empty("\n", &[Some(description.as_str()), Some(tags.as_str())])
}

/// Truncate text to `max` characters, appending `...` if truncated.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(root: &Path, rel: &str, kind: MediaKind) -> Item {
        Item {
            path: root.join(rel),
            id: rel.to_string(),
            kind,
        }
    }

    // =========================================================================
    // truncate_chars() tests
    // =========================================================================

    #[test]
    fn truncate_short() {
        assert_eq!(truncate_chars("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_chars(&text, 40), text);
    }

    #[test]
    fn truncate_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_chars(&text, 40), expected);
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate_chars("ñññ", 2), "ññ...");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    // =========================================================================
    // join_non_empty() tests
    // =========================================================================

    #[test]
    fn join_skips_empty_and_none() {
        assert_eq!(
            join_non_empty(",", &[Some("a"), Some(""), None, Some("b")]),
            "a,b"
        );
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert_eq!(join_non_empty(",", &[]), "");
        assert_eq!(join_non_empty(",", &[None, Some("")]), "");
    }

    #[test]
    fn join_single_part_has_no_separator() {
        assert_eq!(join_non_empty("\n", &[None, Some("only")]), "only");
    }

    // =========================================================================
    // directory_tags() tests
    // =========================================================================

    #[test]
    fn directory_tags_split_on_separators_and_spaces() {
        let root = PathBuf::from("/media");
        assert_eq!(
            directory_tags(&root, &root.join("foo bar/baz/img.png")),
            "#foo #bar #baz"
        );
    }

    #[test]
    fn directory_tags_empty_for_item_at_root() {
        let root = PathBuf::from("/media");
        assert_eq!(directory_tags(&root, &root.join("img.png")), "");
    }

    #[test]
    fn directory_tags_collapse_repeated_whitespace() {
        let root = PathBuf::from("/media");
        assert_eq!(
            directory_tags(&root, &root.join("black  and\twhite/x.jpg")),
            "#black #and #white"
        );
    }

    #[test]
    fn directory_tags_empty_outside_root() {
        assert_eq!(
            directory_tags(Path::new("/media"), Path::new("/elsewhere/a/x.jpg")),
            ""
        );
    }

    // =========================================================================
    // media_format_tag() tests
    // =========================================================================

    #[test]
    fn format_tag_per_kind() {
        assert_eq!(media_format_tag(MediaKind::Video), "#video");
        assert_eq!(media_format_tag(MediaKind::Gif), "#gif");
        assert_eq!(media_format_tag(MediaKind::Still), "");
        assert_eq!(media_format_tag(MediaKind::QuickTime), "");
    }

    // =========================================================================
    // compose_post() tests
    // =========================================================================

    #[test]
    fn compose_everything_present() {
        let root = PathBuf::from("/media");
        let options = ComposeOptions {
            default_desc: "Daily cat".into(),
            default_tags: "#bot".into(),
            add_media_format_tag: true,
        };
        let text = compose_post(
            &options,
            "Sleepy\nSource: alice",
            &root,
            &item(&root, "cats/nap.gif", MediaKind::Gif),
        );
        assert_eq!(text, "Daily cat\nSleepy\nSource: alice\n#bot #cats #gif");
    }

    #[test]
    fn compose_only_tags() {
        let root = PathBuf::from("/media");
        let text = compose_post(
            &ComposeOptions::default(),
            "",
            &root,
            &item(&root, "cats/nap.png", MediaKind::Still),
        );
        assert_eq!(text, "#cats");
    }

    #[test]
    fn compose_format_tag_disabled() {
        let root = PathBuf::from("/media");
        let options = ComposeOptions {
            add_media_format_tag: false,
            ..ComposeOptions::default()
        };
        let clip = item(&root, "clip.mp4", MediaKind::Video);
        let text = compose_post(&options, "", &root, &clip);
        assert_eq!(text, "");
    }

    #[test]
    fn compose_description_without_tags() {
        let root = PathBuf::from("/media");
        let options = ComposeOptions {
            default_desc: "Hello".into(),
            ..ComposeOptions::default()
        };
        let text = compose_post(&options, "", &root, &item(&root, "a.jpg", MediaKind::Still));
        assert_eq!(text, "Hello");
    }
}
