//! Rich text used for field labels and descriptions.
//!
//! Text is kept as an ordered list of runs, each carrying its own emphasis
//! flags. A run can also be a reference to an option attribute which only
//! becomes text once the surrounding list slot is known (see
//! [`crate::template::flatten`]).

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?(b|i|u|ins)>").expect("static tag pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Emphasis {
    pub const NONE: Emphasis = Emphasis {
        bold: false,
        italic: false,
        underline: false,
    };

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::NONE
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::NONE
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::NONE
    }
}

/// Which attribute of an option entry a reference resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionAttribute {
    Key,
    Label,
    Description,
}

impl OptionAttribute {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "key" => Some(Self::Key),
            "label" => Some(Self::Label),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Label => "label",
            Self::Description => "description",
        }
    }
}

/// Reference to an attribute of the option selected by an enclosing list slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionRef {
    pub options_key: String,
    pub attribute: OptionAttribute,
}

impl fmt::Display for OptionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.options_key, self.attribute.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunContent {
    Text(String),
    OptionRef(OptionRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub content: RunContent,
    pub emphasis: Emphasis,
}

impl TextRun {
    pub fn text(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            emphasis,
        }
    }

    pub fn option_ref(reference: OptionRef, emphasis: Emphasis) -> Self {
        Self {
            content: RunContent::OptionRef(reference),
            emphasis,
        }
    }

    /// Text of the run, or `None` while it is still an unresolved reference
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            RunContent::OptionRef(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    runs: Vec<TextRun>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            runs: vec![TextRun::text(text, Emphasis::NONE)],
        }
    }

    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        let runs = runs
            .into_iter()
            .filter(|run| run.as_text().is_none_or(|text| !text.is_empty()))
            .collect();
        Self { runs }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// True when the text can be written as an ordinary string cell
    pub fn is_plain(&self) -> bool {
        self.runs
            .iter()
            .all(|run| run.emphasis.is_plain() && run.as_text().is_some())
    }

    /// Concatenated text of all resolved runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().filter_map(TextRun::as_text).collect()
    }

    pub fn option_refs(&self) -> impl Iterator<Item = &OptionRef> {
        self.runs.iter().filter_map(|run| match &run.content {
            RunContent::OptionRef(reference) => Some(reference),
            RunContent::Text(_) => None,
        })
    }

    /// Surround the text with unstyled padding, keeping the run structure
    pub fn padded(&self, padding: &str) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        let mut runs = Vec::with_capacity(self.runs.len() + 2);
        runs.push(TextRun::text(padding, Emphasis::NONE));
        runs.extend(self.runs.iter().cloned());
        runs.push(TextRun::text(padding, Emphasis::NONE));
        Self { runs }
    }

    /// Replace every option reference with the text returned by `resolve`.
    ///
    /// References the resolver cannot answer become empty text and are
    /// returned so the caller can report them.
    pub fn resolve<F>(&self, mut resolve: F) -> (RichText, Vec<OptionRef>)
    where
        F: FnMut(&OptionRef) -> Option<String>,
    {
        let mut unresolved = Vec::new();
        let runs = self
            .runs
            .iter()
            .map(|run| match &run.content {
                RunContent::Text(_) => run.clone(),
                RunContent::OptionRef(reference) => {
                    let text = resolve(reference).unwrap_or_else(|| {
                        unresolved.push(reference.clone());
                        String::new()
                    });
                    TextRun::text(text, run.emphasis)
                }
            })
            .collect();

        (RichText::from_runs(runs), unresolved)
    }

    /// Parse the small tag subset used in template assets.
    ///
    /// `<b>`, `<i>` and `<u>` toggle emphasis; `<ins>optionsKey.attribute</ins>`
    /// becomes an [`OptionRef`]. Text without tags is returned as one run.
    pub fn parse_markup(value: &str) -> Self {
        let mut runs = Vec::new();
        let mut open: Vec<&str> = Vec::new();
        let mut cursor = 0;

        let push_token = |token: &str, open: &[&str], runs: &mut Vec<TextRun>| {
            if token.is_empty() {
                return;
            }
            let emphasis = Emphasis {
                bold: open.contains(&"b"),
                italic: open.contains(&"i"),
                underline: open.contains(&"u"),
            };
            if open.contains(&"ins") {
                match parse_option_ref(token) {
                    Some(reference) => runs.push(TextRun::option_ref(reference, emphasis)),
                    None => warn!("Ignoring malformed option reference '{}'", token),
                }
            } else {
                runs.push(TextRun::text(token, emphasis));
            }
        };

        for captures in TAG_REGEX.captures_iter(value) {
            let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            push_token(&value[cursor..whole.start()], &open, &mut runs);
            cursor = whole.end();

            if whole.as_str().starts_with("</") {
                if let Some(position) = open.iter().rposition(|t| *t == tag.as_str()) {
                    open.remove(position);
                }
            } else {
                open.push(tag.as_str());
            }
        }
        push_token(&value[cursor..], &open, &mut runs);

        Self::from_runs(runs)
    }
}

impl From<&str> for RichText {
    fn from(value: &str) -> Self {
        RichText::plain(value)
    }
}

fn parse_option_ref(token: &str) -> Option<OptionRef> {
    let (options_key, attribute) = token.trim().split_once('.')?;
    if options_key.is_empty() {
        return None;
    }
    Some(OptionRef {
        options_key: options_key.to_string(),
        attribute: OptionAttribute::parse(attribute)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_text_is_single_plain_run() {
        let text = RichText::parse_markup("Affected Country");
        assert!(text.is_plain());
        assert_eq!(text.runs().len(), 1);
        assert_eq!(text.plain_text(), "Affected Country");
    }

    #[test]
    fn test_nested_emphasis() {
        let text = RichText::parse_markup("<b><i>Import template</i></b> now");
        assert_eq!(text.runs().len(), 2);
        assert_eq!(
            text.runs()[0].emphasis,
            Emphasis {
                bold: true,
                italic: true,
                underline: false
            }
        );
        assert_eq!(text.runs()[1].emphasis, Emphasis::NONE);
        assert_eq!(text.plain_text(), "Import template now");
        assert!(!text.is_plain());
    }

    #[test]
    fn test_underline_inside_sentence() {
        let text = RichText::parse_markup("in the <u>last 3 years</u>?");
        let runs = text.runs();
        assert_eq!(runs.len(), 3);
        assert!(runs[1].emphasis.underline);
        assert_eq!(runs[2].as_text(), Some("?"));
    }

    #[test]
    fn test_option_reference() {
        let text = RichText::parse_markup("<ins>needs_identified.description</ins>");
        let refs: Vec<_> = text.option_refs().collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].options_key, "needs_identified");
        assert_eq!(refs[0].attribute, OptionAttribute::Description);
    }

    #[test]
    fn test_malformed_reference_is_dropped() {
        let text = RichText::parse_markup("<ins>nonsense</ins>");
        assert!(text.is_empty());
    }

    #[test]
    fn test_resolve_reports_unknown_references() {
        let text = RichText::parse_markup("Hello <ins>a.label</ins> <b><ins>b.key</ins></b>");
        let (resolved, unresolved) = text.resolve(|reference| {
            (reference.options_key == "a").then(|| "World".to_string())
        });
        assert_eq!(resolved.plain_text(), "Hello World ");
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].to_string(), "b.key");
    }

    #[test]
    fn test_padding_keeps_runs() {
        let text = RichText::parse_markup("<b>Description</b>");
        let padded = text.padded("\n\n");
        assert_eq!(padded.runs().len(), 3);
        assert!(padded.runs()[1].emphasis.bold);
        assert_eq!(padded.plain_text(), "\n\nDescription\n\n");
        assert!(RichText::default().padded("\n").is_empty());
    }
}
