//! Tag and attribute scanning for FCD trace text.
//!
//! The scanner is deliberately lenient: it is not an XML parser. It walks
//! the text tag by tag (`<name attr="value" ...>`), skips closing tags,
//! comments and processing instructions, and extracts `key="value"` (or
//! `key='value'`) pairs. Tags may span lines and several tags may share a
//! line. Attribute keys are matched as whole names.

/// One opening or self-closing tag in a trace document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Element name, e.g. `"timestep"` or `"vehicle"`.
    pub name: &'a str,
    body: &'a str,
}

impl<'a> Tag<'a> {
    /// Iterate over the tag's `(key, value)` attribute pairs in order.
    pub fn attributes(&self) -> Attributes<'a> {
        Attributes { rest: self.body }
    }

    /// Value of the first attribute named exactly `key`.
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Like [`attribute`](Self::attribute) but treats an empty value as
    /// absent.
    pub fn non_empty_attribute(&self, key: &str) -> Option<&'a str> {
        self.attribute(key).filter(|v| !v.trim().is_empty())
    }
}

/// Iterate over the opening and self-closing tags of `text`.
///
/// # Examples
///
/// ```
/// use fcdgym_trace::codec::tags;
///
/// let text = r#"<timestep time="1.0"><vehicle id="a" x="1" y="2"/></timestep>"#;
/// let names: Vec<_> = tags(text).map(|t| t.name).collect();
/// assert_eq!(names, vec!["timestep", "vehicle"]);
/// ```
pub fn tags(text: &str) -> Tags<'_> {
    Tags { rest: text }
}

/// Iterator returned by [`tags`].
#[derive(Clone, Debug)]
pub struct Tags<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let open = self.rest.find('<')?;
            let after = &self.rest[open + 1..];
            // An unterminated final tag runs to end of input.
            let (inner, rest) = match tag_end(after) {
                Some(close) => (&after[..close], &after[close + 1..]),
                None => (after, ""),
            };
            self.rest = rest;

            if inner.starts_with('/') || inner.starts_with('?') || inner.starts_with('!') {
                continue;
            }
            let inner = inner.strip_suffix('/').unwrap_or(inner);
            let name_end = inner
                .find(|c: char| c.is_whitespace() || c == '/')
                .unwrap_or(inner.len());
            let name = &inner[..name_end];
            if name.is_empty() {
                continue;
            }
            return Some(Tag {
                name,
                body: &inner[name_end..],
            });
        }
    }
}

/// Offset of the `>` closing a tag. Inside element tags a `>` within a
/// quoted attribute value does not close the tag; comments and
/// processing instructions close at the first `>`. A `<` inside quotes
/// marks an unbalanced quote, and the tag then closes at the first `>`.
fn tag_end(after: &str) -> Option<usize> {
    if after.starts_with('!') || after.starts_with('?') {
        return after.find('>');
    }
    let mut quote = None;
    for (i, c) in after.char_indices() {
        match (quote, c) {
            (None, '>') => return Some(i),
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (Some(_), '<') => return after.find('>'),
            _ => {}
        }
    }
    None
}

/// Iterator over the `(key, value)` pairs of a tag body.
///
/// Stops at the first syntactically broken pair; everything before it is
/// still yielded.
#[derive(Clone, Debug)]
pub struct Attributes<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let s = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if s.is_empty() {
            self.rest = s;
            return None;
        }

        let key_end = s.find(|c: char| c == '=' || c.is_whitespace())?;
        let key = &s[..key_end];
        let s = s[key_end..].trim_start();
        let s = s.strip_prefix('=')?.trim_start();

        let quote = s.chars().next().filter(|&c| c == '"' || c == '\'')?;
        let s = &s[1..];
        let value_end = s.find(quote)?;
        let value = &s[..value_end];
        self.rest = &s[value_end + 1..];

        if key.is_empty() {
            // `="orphan"`: drop the value and keep scanning.
            return self.next();
        }
        Some((key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_prolog_comments_and_closing_tags() {
        let text = r#"<?xml version="1.0"?>
<!-- generated -->
<fcd-export>
  <timestep time="0.00">
  </timestep>
</fcd-export>"#;
        let names: Vec<_> = tags(text).map(|t| t.name).collect();
        assert_eq!(names, vec!["fcd-export", "timestep"]);
    }

    #[test]
    fn attributes_in_any_order_with_extras() {
        let tag = tags(r#"<vehicle lane="e0_0" y="2.5" angle="90" x="1.5" id="veh0"/>"#)
            .next()
            .unwrap();
        assert_eq!(tag.name, "vehicle");
        assert_eq!(tag.attribute("id"), Some("veh0"));
        assert_eq!(tag.attribute("x"), Some("1.5"));
        assert_eq!(tag.attribute("y"), Some("2.5"));
        assert_eq!(tag.attribute("speed"), None);
    }

    #[test]
    fn keys_match_whole_names_only() {
        let tag = tags(r#"<vehicle xid="wrong" id="right" ox="9" x="1"/>"#)
            .next()
            .unwrap();
        assert_eq!(tag.attribute("id"), Some("right"));
        assert_eq!(tag.attribute("x"), Some("1"));
    }

    #[test]
    fn single_quotes_and_spaced_equals() {
        let tag = tags("<vehicle id = 'a b' x='3'>").next().unwrap();
        assert_eq!(tag.attribute("id"), Some("a b"));
        assert_eq!(tag.attribute("x"), Some("3"));
    }

    #[test]
    fn tag_spanning_lines() {
        let text = "<vehicle id=\"a\"\n   x=\"1\"\n   y=\"2\"/>";
        let tag = tags(text).next().unwrap();
        assert_eq!(tag.attribute("y"), Some("2"));
    }

    #[test]
    fn empty_value_is_absent_for_non_empty_lookup() {
        let tag = tags(r#"<vehicle id="" x="1"/>"#).next().unwrap();
        assert_eq!(tag.attribute("id"), Some(""));
        assert_eq!(tag.non_empty_attribute("id"), None);
    }

    #[test]
    fn broken_pair_stops_scan_but_keeps_prefix() {
        let tag = tags(r#"<vehicle id="a" x="1 y="2"/>"#).next().unwrap();
        let pairs: Vec<_> = tag.attributes().collect();
        assert_eq!(pairs[0], ("id", "a"));
        assert_eq!(tag.attribute("y"), None);
    }

    #[test]
    fn angle_bracket_inside_quoted_value() {
        let text = r#"<vehicle id="a>b" x='1>0' y="2"/><vehicle id="c" x="3" y="4"/>"#;
        let found: Vec<_> = tags(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attribute("id"), Some("a>b"));
        assert_eq!(found[0].attribute("x"), Some("1>0"));
        assert_eq!(found[0].attribute("y"), Some("2"));
        assert_eq!(found[1].attribute("id"), Some("c"));
    }

    #[test]
    fn unbalanced_quote_does_not_swallow_next_tag() {
        let text = "<vehicle id=\"a\" x=\"1 y=\"2\"/>\n<vehicle id=\"b\" x=\"3\" y=\"4\"/>";
        let found: Vec<_> = tags(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].attribute("id"), Some("b"));
        assert_eq!(found[1].attribute("y"), Some("4"));
    }

    #[test]
    fn comment_with_apostrophe_closes_normally() {
        let text = r#"<!-- don't --><vehicle id="a" x="1" y="2"/>"#;
        let names: Vec<_> = tags(text).map(|t| t.name).collect();
        assert_eq!(names, vec!["vehicle"]);
    }

    #[test]
    fn unterminated_tag_at_end() {
        let tag = tags(r#"<vehicle id="a" x="1""#).next().unwrap();
        assert_eq!(tag.attribute("x"), Some("1"));
    }
}
