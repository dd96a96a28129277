use regex::{Match, Regex};
use std::path::Path;
use std::sync::LazyLock;

use crate::report::ItemError;

/// Size assumed for the rotation centre when the tag has no width/height.
pub const DEFAULT_SIZE: &str = "24";

static SVG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg[^>]*>").unwrap());
// Attribute values may use either quote style; group 1 is double, group 2 single.
static WIDTH_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\swidth=(?:"([^"]*)"|'([^']*)')"#).unwrap());
static HEIGHT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sheight=(?:"([^"]*)"|'([^']*)')"#).unwrap());
static TRANSFORM_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\stransform=(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Add a 180-degree rotation to the first `<svg ...>` tag of `content`.
///
/// The rotation is centred on `width/2, height/2` of that tag, appended to an
/// existing `transform` attribute or inserted as a new one. Only the matched
/// tag is rewritten; the rest of the document is untouched. Returns `None`
/// when there is no `<svg` tag.
pub fn rotate_svg_markup(content: &str) -> Option<String> {
    let tag_match = SVG_TAG.find(content)?;
    let tag = tag_match.as_str();

    let width = attr_value(&WIDTH_ATTR, tag).map_or(DEFAULT_SIZE, |m| m.as_str());
    let height = attr_value(&HEIGHT_ATTR, tag).map_or(DEFAULT_SIZE, |m| m.as_str());
    let rotation = format!("rotate(180, {width}/2, {height}/2)");

    let new_tag = match attr_value(&TRANSFORM_ATTR, tag) {
        Some(value) => format!(
            "{} {}{}",
            &tag[..value.end()],
            rotation,
            &tag[value.end()..]
        ),
        None => match tag.strip_suffix("/>") {
            Some(open) => format!("{} transform=\"{}\"/>", open.trim_end(), rotation),
            None => format!(
                "{} transform=\"{}\">",
                &tag[..tag.len() - 1],
                rotation
            ),
        },
    };

    let mut out = String::with_capacity(content.len() + rotation.len() + 16);
    out.push_str(&content[..tag_match.start()]);
    out.push_str(&new_tag);
    out.push_str(&content[tag_match.end()..]);
    Some(out)
}

/// Rotate the SVG at `src` into `dest`. Returns `Ok(false)` (and writes
/// nothing) when the file has no `<svg` tag.
pub fn rotate_svg(src: &Path, dest: &Path) -> Result<bool, ItemError> {
    let content = std::fs::read_to_string(src).map_err(|source| ItemError::Read {
        path: src.to_path_buf(),
        source,
    })?;

    let Some(rotated) = rotate_svg_markup(&content) else {
        return Ok(false);
    };

    std::fs::write(dest, rotated).map_err(|source| ItemError::Write {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(true)
}

fn attr_value<'a>(re: &Regex, tag: &'a str) -> Option<Match<'a>> {
    re.captures(tag).and_then(|c| c.get(1).or_else(|| c.get(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_transform_with_size() {
        let src = r#"<svg width="50" height="50"><circle r="4"/></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert_eq!(
            out,
            r#"<svg width="50" height="50" transform="rotate(180, 50/2, 50/2)"><circle r="4"/></svg>"#
        );
    }

    #[test]
    fn test_defaults_to_24_without_size() {
        let src = r#"<svg viewBox="0 0 24 24"><path d="M0 0"/></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert!(out.contains(r#"transform="rotate(180, 24/2, 24/2)""#), "{out}");
    }

    #[test]
    fn test_appends_to_existing_transform() {
        let src = r#"<svg width="40" height="30" transform="scale(2)"></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert_eq!(
            out,
            r#"<svg width="40" height="30" transform="scale(2) rotate(180, 40/2, 30/2)"></svg>"#
        );
    }

    #[test]
    fn test_keeps_prolog_and_only_touches_first_tag() {
        let src = concat!(
            "<?xml version=\"1.0\"?>\n",
            "<svg width=\"10\" height=\"20\">\n",
            "  <svg width=\"5\" height=\"5\"></svg>\n",
            "</svg>\n"
        );
        let out = rotate_svg_markup(src).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\"?>\n<svg width=\"10\" height=\"20\" transform=\"rotate(180, 10/2, 20/2)\">\n"));
        assert!(out.contains("  <svg width=\"5\" height=\"5\"></svg>\n"));
        assert_eq!(out.matches("rotate(").count(), 1);
    }

    #[test]
    fn test_appends_to_single_quoted_transform() {
        let src = r#"<svg width="50" height="50" transform='scale(2)'></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert_eq!(out.matches("transform=").count(), 1, "{out}");
        assert_eq!(
            out,
            r#"<svg width="50" height="50" transform='scale(2) rotate(180, 50/2, 50/2)'></svg>"#
        );
    }

    #[test]
    fn test_single_quoted_size() {
        let src = r#"<svg width='40' height='30'></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert!(out.contains(r#"transform="rotate(180, 40/2, 30/2)""#), "{out}");
    }

    #[test]
    fn test_stroke_width_is_not_width() {
        let src = r#"<svg stroke-width="2" height="30"></svg>"#;
        let out = rotate_svg_markup(src).unwrap();
        assert!(out.contains("rotate(180, 24/2, 30/2)"), "{out}");
    }

    #[test]
    fn test_self_closing_tag() {
        let src = r#"<svg width="8" height="8" />"#;
        let out = rotate_svg_markup(src).unwrap();
        assert_eq!(
            out,
            r#"<svg width="8" height="8" transform="rotate(180, 8/2, 8/2)"/>"#
        );
    }

    #[test]
    fn test_no_svg_tag() {
        assert!(rotate_svg_markup("<html><body>nope</body></html>").is_none());
        assert!(rotate_svg_markup("").is_none());
    }

    #[test]
    fn test_rotate_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("soldier.svg");
        let dest = dir.path().join("out.svg");
        std::fs::write(&src, r#"<svg width="50" height="50"></svg>"#).unwrap();

        assert!(rotate_svg(&src, &dest).unwrap());
        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(text.contains(r#"transform="rotate(180, 50/2, 50/2)""#));
    }

    #[test]
    fn test_rotate_svg_without_tag_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.svg");
        let dest = dir.path().join("out.svg");
        std::fs::write(&src, "not an svg").unwrap();

        assert!(!rotate_svg(&src, &dest).unwrap());
        assert!(!dest.exists());
    }

    #[test]
    fn test_rotate_svg_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = rotate_svg(&dir.path().join("gone.svg"), &dir.path().join("out.svg"));
        assert!(matches!(err, Err(ItemError::Read { .. })));
    }
}
