//! Stateful converter from terminal SGR escape sequences to HTML spans.
//!
//! Error messages and captured stdout arrive with the styling escapes the
//! test runner printed to the terminal. The converter translates them into
//! flat, well-nested `<span style="...">` scopes so the offline report can
//! show them verbatim.

use std::sync::LazyLock;

use regex::Regex;

/// Matches one SGR sequence: `ESC '[' <params> 'm'`.
static SGR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{1b}\\[([0-9;]*)m").expect("SGR pattern is valid"));

/// The 8 standard terminal colors (codes 30-37 / 40-47), indexed 0-7.
const STANDARD_COLORS: [&str; 8] = [
    "#000000", "#cd3131", "#0dbc79", "#e5e510", "#2472c8", "#bc3fbc", "#11a8cd", "#e5e5e5",
];

/// The 8 bright terminal colors (codes 90-97 / 100-107), indexed 0-7.
const BRIGHT_COLORS: [&str; 8] = [
    "#666666", "#f14c4c", "#23d18b", "#f5f543", "#3b8eea", "#d670d6", "#29b8db", "#ffffff",
];

/// Escape the five HTML-significant characters.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Stateful SGR-to-HTML translator.
///
/// Holds the ordered set of active style declarations while walking the
/// input. At most one span scope is open at any time; whichever scope is
/// open at end of input is closed, so the output markup is always
/// well-nested.
#[derive(Debug, Default)]
pub struct AnsiMarkupConverter {
    /// Active declarations in application order, property → CSS value.
    declarations: Vec<(&'static str, String)>,
}

impl AnsiMarkupConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert one chunk of terminal output to HTML.
    ///
    /// State is reset first: each message converts independently.
    pub fn convert(&mut self, input: &str) -> String {
        self.declarations.clear();

        let mut out = String::with_capacity(input.len());
        // Style string of the currently open scope, if any.
        let mut open_scope: Option<String> = None;
        let mut cursor = 0;

        for caps in SGR_PATTERN.captures_iter(input) {
            let full = caps.get(0).expect("group 0 always present");
            self.emit_text(&input[cursor..full.start()], &mut out, &mut open_scope);
            self.apply_params(caps.get(1).map_or("", |m| m.as_str()));
            cursor = full.end();
        }
        self.emit_text(&input[cursor..], &mut out, &mut open_scope);

        if open_scope.is_some() {
            out.push_str("</span>");
        }
        out
    }

    /// Emit literal text inside the scope the active declarations call for.
    fn emit_text(&self, text: &str, out: &mut String, open_scope: &mut Option<String>) {
        if text.is_empty() {
            return;
        }

        let style = self.effective_style();
        let wanted = if style.is_empty() { None } else { Some(style) };

        if *open_scope != wanted {
            if open_scope.is_some() {
                out.push_str("</span>");
            }
            if let Some(ref style) = wanted {
                out.push_str("<span style=\"");
                out.push_str(style);
                out.push_str("\">");
            }
            *open_scope = wanted;
        }

        out.push_str(&html_escape(text));
    }

    /// Render the active declarations as a style attribute value.
    ///
    /// Declarations valued `inherit` restore the document default, so they
    /// never force a span on their own.
    fn effective_style(&self) -> String {
        self.declarations
            .iter()
            .filter(|(_, value)| value != "inherit")
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Apply one parameter list (the `<params>` of `ESC [ <params> m`).
    fn apply_params(&mut self, params: &str) {
        // A bare `ESC [ m` is shorthand for reset.
        if params.is_empty() {
            self.reset();
            return;
        }

        let codes: Vec<u16> = params
            .split(';')
            .map(|part| part.parse().unwrap_or(u16::MAX))
            .collect();

        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 => self.reset(),
                1 => self.set("font-weight", "bold".into()),
                2 => self.set("opacity", "0.8".into()),
                3 => self.set("font-style", "italic".into()),
                4 => self.set("text-decoration", "underline".into()),
                c @ 30..=37 => self.set("color", STANDARD_COLORS[(c - 30) as usize].into()),
                c @ 90..=97 => self.set("color", BRIGHT_COLORS[(c - 90) as usize].into()),
                c @ 40..=47 => {
                    self.set("background-color", STANDARD_COLORS[(c - 40) as usize].into());
                }
                c @ 100..=107 => {
                    self.set("background-color", BRIGHT_COLORS[(c - 100) as usize].into());
                }
                39 => self.set("color", "inherit".into()),
                49 => self.set("background-color", "inherit".into()),
                c @ (38 | 48) => {
                    let property = if c == 38 { "color" } else { "background-color" };
                    match codes.get(i + 1).copied() {
                        // Truecolor: 38;2;r;g;b
                        Some(2) if i + 4 < codes.len() => {
                            let (r, g, b) = (codes[i + 2], codes[i + 3], codes[i + 4]);
                            self.set(property, format!("rgb({}, {}, {})", r, g, b));
                            i += 4;
                        }
                        // 256-color form: recognized enough to skip its argument.
                        Some(5) if i + 2 < codes.len() => i += 2,
                        _ => {}
                    }
                }
                // Unrecognized codes are ignored for forward compatibility.
                _ => {}
            }
            i += 1;
        }
    }

    /// Add a declaration, replacing any prior one for the same property.
    fn set(&mut self, property: &'static str, value: String) {
        if let Some(slot) = self.declarations.iter_mut().find(|(p, _)| *p == property) {
            slot.1 = value;
        } else {
            self.declarations.push((property, value));
        }
    }

    /// Code 0: clear everything, then re-apply the baseline reset declaration.
    fn reset(&mut self) {
        self.declarations.clear();
        self.declarations.push(("color", "inherit".into()));
    }
}

/// One-shot conversion helper.
pub fn ansi_to_html(input: &str) -> String {
    AnsiMarkupConverter::new().convert(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_spans() {
        assert_eq!(ansi_to_html("hello world"), "hello world");
    }

    #[test]
    fn test_plain_text_is_html_escaped() {
        assert_eq!(
            ansi_to_html("a < b & c > \"d\" 'e'"),
            "a &lt; b &amp; c &gt; &quot;d&quot; &#39;e&#39;"
        );
    }

    #[test]
    fn test_single_color_scope_then_unstyled_tail() {
        assert_eq!(
            ansi_to_html("\x1b[31mhello\x1b[0m world"),
            "<span style=\"color: #cd3131\">hello</span> world"
        );
    }

    #[test]
    fn test_open_scope_closed_at_end_of_input() {
        assert_eq!(
            ansi_to_html("\x1b[32mgreen to the end"),
            "<span style=\"color: #0dbc79\">green to the end</span>"
        );
    }

    #[test]
    fn test_combined_codes_in_one_sequence() {
        assert_eq!(
            ansi_to_html("\x1b[1;31mloud\x1b[0m"),
            "<span style=\"font-weight: bold; color: #cd3131\">loud</span>"
        );
    }

    #[test]
    fn test_same_property_replaced_not_duplicated() {
        assert_eq!(
            ansi_to_html("\x1b[31m\x1b[34mblue\x1b[0m"),
            "<span style=\"color: #2472c8\">blue</span>"
        );
    }

    #[test]
    fn test_default_foreground_keeps_other_styles() {
        // 39 drops the color but bold stays active.
        assert_eq!(
            ansi_to_html("\x1b[1;33mwarn\x1b[39m still bold"),
            "<span style=\"font-weight: bold; color: #e5e510\">warn</span>\
             <span style=\"font-weight: bold\"> still bold</span>"
        );
    }

    #[test]
    fn test_truecolor_foreground() {
        assert_eq!(
            ansi_to_html("\x1b[38;2;255;128;0mamber\x1b[0m"),
            "<span style=\"color: rgb(255, 128, 0)\">amber</span>"
        );
    }

    #[test]
    fn test_truecolor_background() {
        assert_eq!(
            ansi_to_html("\x1b[48;2;0;0;0mink\x1b[0m"),
            "<span style=\"background-color: rgb(0, 0, 0)\">ink</span>"
        );
    }

    #[test]
    fn test_bright_and_background_palette() {
        assert_eq!(
            ansi_to_html("\x1b[91;107malert\x1b[0m"),
            "<span style=\"color: #f14c4c; background-color: #ffffff\">alert</span>"
        );
    }

    #[test]
    fn test_unrecognized_codes_ignored() {
        // 7 (reverse video) and 53 (overline) are not mapped.
        assert_eq!(ansi_to_html("\x1b[7m\x1b[53mplain"), "plain");
    }

    #[test]
    fn test_256_color_argument_not_misread_as_code() {
        // 38;5;31 must not be interpreted as foreground red (31).
        assert_eq!(ansi_to_html("\x1b[38;5;31mtext\x1b[0m"), "text");
    }

    #[test]
    fn test_empty_params_is_reset() {
        assert_eq!(
            ansi_to_html("\x1b[31mred\x1b[mdone"),
            "<span style=\"color: #cd3131\">red</span>done"
        );
    }

    #[test]
    fn test_dim_and_underline() {
        assert_eq!(
            ansi_to_html("\x1b[2;4mfaint\x1b[0m"),
            "<span style=\"opacity: 0.8; text-decoration: underline\">faint</span>"
        );
    }

    #[test]
    fn test_adjacent_sequences_do_not_open_empty_scopes() {
        assert_eq!(ansi_to_html("\x1b[31m\x1b[0mclean"), "clean");
    }

    #[test]
    fn test_state_resets_between_conversions() {
        let mut converter = AnsiMarkupConverter::new();
        assert_eq!(
            converter.convert("\x1b[31mfirst"),
            "<span style=\"color: #cd3131\">first</span>"
        );
        // The dangling red scope from the first message must not leak.
        assert_eq!(converter.convert("second"), "second");
    }
}
