use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER: &str = "/wiki/";
pub const DEFAULT_TERMINATOR: char = '"';
pub const DEFAULT_SUFFIX: &str = ".html";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Substitution {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl Substitution {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The fixed cleanup applied to exported pages before links are rewritten.
pub fn default_substitutions() -> Vec<Substitution> {
    vec![
        Substitution::new("missing wiki", "wiki"),
        Substitution::new("nofollow", "follow"),
        Substitution::new("?", ""),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRules {
    pub substitutions: Vec<Substitution>,
    pub marker: String,
    pub terminator: char,
    pub suffix: String,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self {
            substitutions: default_substitutions(),
            marker: DEFAULT_MARKER.to_string(),
            terminator: DEFAULT_TERMINATOR,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionCount {
    pub from: String,
    pub to: String,
    pub replaced: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    #[serde(skip)]
    pub output: String,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub substitutions: Vec<SubstitutionCount>,
    pub links_rewritten: usize,
}

impl RewriteRules {
    /// Run every substitution in order over the whole text, then rewrite links.
    pub fn apply(&self, input: &str) -> RewriteReport {
        let mut text = input.to_string();
        let mut substitutions = Vec::with_capacity(self.substitutions.len());
        for rule in &self.substitutions {
            let (next, replaced) = substitute(&text, rule);
            substitutions.push(SubstitutionCount {
                from: rule.from.clone(),
                to: rule.to.clone(),
                replaced,
            });
            text = next;
        }

        let (output, links_rewritten) =
            rewrite_links(&text, &self.marker, self.terminator, &self.suffix);
        log::debug!(
            "rewrote {links_rewritten} link(s) with marker {:?}",
            self.marker
        );

        RewriteReport {
            input_bytes: input.len(),
            output_bytes: output.len(),
            output,
            substitutions,
            links_rewritten,
        }
    }

    pub fn transform(&self, input: &str) -> String {
        self.apply(input).output
    }
}

/// Rewrite an exported wiki page with the default rules.
///
/// Pure and total: every input, including the empty string, produces output.
pub fn transform(input: &str) -> String {
    RewriteRules::default().transform(input)
}

fn substitute(text: &str, rule: &Substitution) -> (String, usize) {
    if rule.from.is_empty() {
        return (text.to_string(), 0);
    }
    let replaced = text.matches(rule.from.as_str()).count();
    if replaced == 0 {
        return (text.to_string(), 0);
    }
    (text.replace(rule.from.as_str(), &rule.to), replaced)
}

/// Rewrite every `marker ... terminator` span into `span-without-marker + suffix`.
///
/// The terminator stays in the output. A marker with no terminator after it
/// consumes the rest of the text. Returns the new text and the number of
/// rewritten spans.
pub fn rewrite_links(text: &str, marker: &str, terminator: char, suffix: &str) -> (String, usize) {
    LinkSegments::new(text, marker, terminator).fold(
        (String::with_capacity(text.len()), 0usize),
        |(mut output, links), segment| {
            output.push_str(segment.verbatim);
            match segment.link {
                Some(span) => {
                    output.push_str(&span.replace(marker, ""));
                    output.push_str(suffix);
                    (output, links + 1)
                }
                None => (output, links),
            }
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinkSegment<'a> {
    verbatim: &'a str,
    link: Option<&'a str>,
}

/// Splits text into verbatim runs, each followed by at most one link span.
/// The last segment is always the verbatim tail with no link.
struct LinkSegments<'a> {
    text: &'a str,
    marker: &'a str,
    terminator: char,
    cursor: Option<usize>,
}

impl<'a> LinkSegments<'a> {
    fn new(text: &'a str, marker: &'a str, terminator: char) -> Self {
        Self {
            text,
            marker,
            terminator,
            cursor: Some(0),
        }
    }
}

impl<'a> Iterator for LinkSegments<'a> {
    type Item = LinkSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        let rest = &self.text[cursor..];
        let found = if self.marker.is_empty() {
            None
        } else {
            rest.find(self.marker)
        };
        let Some(offset) = found else {
            self.cursor = None;
            return Some(LinkSegment {
                verbatim: rest,
                link: None,
            });
        };

        let start = cursor + offset;
        let after_marker = start + self.marker.len();
        let end = self.text[after_marker..]
            .find(self.terminator)
            .map_or(self.text.len(), |position| after_marker + position);
        self.cursor = Some(end);

        Some(LinkSegment {
            verbatim: &self.text[cursor..start],
            link: Some(&self.text[start..end]),
        })
    }
}
