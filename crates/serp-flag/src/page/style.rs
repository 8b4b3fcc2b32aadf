//! Inline `style` attribute handling.

/// A single CSS declaration forced onto an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOverride {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl StyleOverride {
    /// `color: <color> !important`, which wins over page stylesheets,
    /// including their own `!important` rules.
    pub fn highlight(color: &str) -> Self {
        Self {
            property: "color".to_string(),
            value: color.trim().to_string(),
            important: true,
        }
    }

    /// The declaration value as it appears after the colon.
    pub fn declared_value(&self) -> String {
        if self.important {
            format!("{} !important", self.value)
        } else {
            self.value.clone()
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.property, self.declared_value())
    }
}

/// Split an inline style into trimmed, non-empty declarations.
///
/// A `;` only ends a declaration at the top level: semicolons inside quoted
/// strings, `url(...)` and other parenthesized or bracketed values belong to
/// the value. Backslash escapes are honoured inside and outside quotes.
pub fn split_declarations(style: &str) -> Vec<&str> {
    let mut declarations = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in style.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                declarations.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    declarations.push(&style[start..]);

    declarations
        .into_iter()
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .collect()
}

fn property_name(declaration: &str) -> Option<&str> {
    let (property, _) = declaration.split_once(':')?;
    Some(property.trim())
}

/// Split an inline style into `(property, value)` pairs. Empty and
/// malformed declarations are dropped.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    split_declarations(style)
        .into_iter()
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some((property.to_string(), value.to_string()))
        })
        .collect()
}

/// Replace every declaration of the override's property and append the
/// override. Other declarations keep their order and their exact text.
/// Applying the same override twice yields the same string.
pub fn merge_declaration(existing: Option<&str>, style: &StyleOverride) -> String {
    let mut declarations: Vec<String> = existing
        .map(split_declarations)
        .unwrap_or_default()
        .into_iter()
        .filter(|decl| {
            property_name(decl).map_or(true, |p| !p.eq_ignore_ascii_case(&style.property))
        })
        .map(|decl| format!("{decl};"))
        .collect();
    declarations.push(format!("{};", style.render()));
    declarations.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_render() {
        let style = StyleOverride::highlight("red");
        assert_eq!(style.render(), "color: red !important");
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations(" font-weight:bold ;color: blue !important;; bogus ;");
        assert_eq!(
            decls,
            vec![
                ("font-weight".to_string(), "bold".to_string()),
                ("color".to_string(), "blue !important".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_keeps_nested_semicolons() {
        let cases: &[(&str, &[&str])] = &[
            ("a: 1; b: 2", &["a: 1", "b: 2"]),
            (
                r#"background-image: url("data:image/png;base64,iVBORw0KGgo="); margin: 0"#,
                &[
                    r#"background-image: url("data:image/png;base64,iVBORw0KGgo=")"#,
                    "margin: 0",
                ],
            ),
            (
                "background: url(data:image/gif;base64,R0lGOD); color: blue",
                &["background: url(data:image/gif;base64,R0lGOD)", "color: blue"],
            ),
            (
                r#"font-family: "A;B", serif; color: blue"#,
                &[r#"font-family: "A;B", serif"#, "color: blue"],
            ),
            (
                r#"content: 'it\'s; fine'; top: 0"#,
                &[r#"content: 'it\'s; fine'"#, "top: 0"],
            ),
            ("grid-area: [a;b] / 1;;", &["grid-area: [a;b] / 1"]),
        ];
        for (style, expected) in cases {
            assert_eq!(split_declarations(style), *expected, "splitting {style:?}");
        }
    }

    #[test]
    fn test_merge_leaves_other_declarations_untouched() {
        let style = StyleOverride::highlight("red");
        let existing = r#"background-image: url("data:image/png;base64,iVBORw0KGgo="); font-family: "A;B", serif"#;
        let merged = merge_declaration(Some(existing), &style);
        assert_eq!(
            merged,
            r#"background-image: url("data:image/png;base64,iVBORw0KGgo="); font-family: "A;B", serif; color: red !important;"#
        );
        assert_eq!(merge_declaration(Some(&merged), &style), merged);
    }

    #[test]
    fn test_merge_keeps_declaration_text_verbatim() {
        let style = StyleOverride::highlight("red");
        let merged = merge_declaration(Some("font-weight:bold;color:blue"), &style);
        assert_eq!(merged, "font-weight:bold; color: red !important;");
    }

    #[test]
    fn test_merge_into_empty() {
        let style = StyleOverride::highlight("red");
        assert_eq!(merge_declaration(None, &style), "color: red !important;");
        assert_eq!(merge_declaration(Some(""), &style), "color: red !important;");
    }

    #[test]
    fn test_merge_replaces_existing_color() {
        let style = StyleOverride::highlight("red");
        let merged = merge_declaration(
            Some("color: blue !important; font-size: 20px; COLOR: green"),
            &style,
        );
        assert_eq!(merged, "font-size: 20px; color: red !important;");
    }

    #[test]
    fn test_merge_keeps_background_color() {
        let style = StyleOverride::highlight("red");
        let merged = merge_declaration(Some("background-color: yellow"), &style);
        assert_eq!(merged, "background-color: yellow; color: red !important;");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let style = StyleOverride::highlight("red");
        let once = merge_declaration(Some("margin: 0"), &style);
        let twice = merge_declaration(Some(&once), &style);
        assert_eq!(once, twice);
    }
}
