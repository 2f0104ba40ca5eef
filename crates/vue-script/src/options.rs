//! Formatting options and option kinds.

use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use source_span::LineEnding;
use std::fmt;
use std::str::FromStr;

/// Quote character for generated string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
}

impl QuoteStyle {
    /// The quote character.
    pub fn char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    /// Quote a plain string value.
    pub fn quote(self, value: &str) -> String {
        let q = self.char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(q);
        for c in value.chars() {
            if c == q || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(q);
        out
    }
}

impl FromStr for QuoteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" | "'" => Ok(QuoteStyle::Single),
            "double" | "\"" => Ok(QuoteStyle::Double),
            other => Err(format!("unknown quote style: {}", other)),
        }
    }
}

/// How generated script text is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// One level of indentation.
    pub indent: String,
    /// Quote used for generated strings.
    pub quote: QuoteStyle,
    /// Terminator of generated lines.
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            quote: QuoteStyle::Single,
            line_ending: LineEnding::Lf,
        }
    }
}

impl FormatOptions {
    /// Indent with `width` spaces.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }

    /// Terminate generated lines with `line_ending`.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Use the given quote style.
    pub fn with_quote(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }
}

/// Language of a `<script>` block, from its `lang` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLang {
    #[default]
    Js,
    Ts,
    Jsx,
    Tsx,
}

impl ScriptLang {
    /// Map a `lang` attribute value, defaulting to JavaScript.
    pub fn from_attr(lang: Option<&str>) -> Self {
        match lang.map(str::trim) {
            Some("ts") | Some("typescript") => ScriptLang::Ts,
            Some("jsx") => ScriptLang::Jsx,
            Some("tsx") => ScriptLang::Tsx,
            _ => ScriptLang::Js,
        }
    }

    pub(crate) fn source_type(self) -> SourceType {
        match self {
            ScriptLang::Js => SourceType::mjs(),
            ScriptLang::Ts => SourceType::ts(),
            ScriptLang::Jsx => SourceType::jsx(),
            ScriptLang::Tsx => SourceType::tsx(),
        }
    }
}

/// A recognized top-level key of the component definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Components,
    Props,
    Data,
    Watch,
    Computed,
    Methods,
}

impl OptionKind {
    /// All kinds in canonical order.
    pub const ALL: [OptionKind; 6] = [
        OptionKind::Components,
        OptionKind::Props,
        OptionKind::Data,
        OptionKind::Watch,
        OptionKind::Computed,
        OptionKind::Methods,
    ];

    /// The key as written in the definition object.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKind::Components => "components",
            OptionKind::Props => "props",
            OptionKind::Data => "data",
            OptionKind::Watch => "watch",
            OptionKind::Computed => "computed",
            OptionKind::Methods => "methods",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown option kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(QuoteStyle::Single.quote("foo"), "'foo'");
        assert_eq!(QuoteStyle::Single.quote("it's"), "'it\\'s'");
        assert_eq!(QuoteStyle::Double.quote("foo"), "\"foo\"");
    }

    #[test]
    fn test_script_lang_from_attr() {
        assert_eq!(ScriptLang::from_attr(None), ScriptLang::Js);
        assert_eq!(ScriptLang::from_attr(Some("ts")), ScriptLang::Ts);
        assert_eq!(ScriptLang::from_attr(Some("tsx")), ScriptLang::Tsx);
    }

    #[test]
    fn test_option_kind_round_trip() {
        for kind in OptionKind::ALL {
            assert_eq!(kind.as_str().parse::<OptionKind>().unwrap(), kind);
        }
        assert!("mixins".parse::<OptionKind>().is_err());
    }
}
