// src/extractors/query.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

// --- Pseudo-selector Patterns (Lazy Static) ---
// `:contains(...)` must close the compound it belongs to. Quoted or bare text.
static CONTAINS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#":contains\(\s*(?:"([^"]*)"|'([^']*)'|([^)"']*))\s*\)$"#)
        .expect("Failed to compile CONTAINS_RE")
});

// --- Data Structures ---

/// One compound match: an optional CSS selector plus an optional text filter.
#[derive(Debug, Clone)]
struct Filter {
    css: Option<Selector>,
    contains: Option<String>,
}

impl Filter {
    fn parse(text: &str, source: &str) -> Result<Self, ExtractError> {
        let text = text.trim();
        let (css, contains) = match CONTAINS_RE.captures(text) {
            Some(caps) => {
                let start = caps.get(0).map_or(text.len(), |m| m.start());
                let needle = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .or_else(|| caps.get(3).map(|m| m.as_str().trim().to_string()));
                (&text[..start], needle)
            }
            None => (text, None),
        };

        if css.contains(":contains(") {
            return Err(invalid(source, ":contains() must end its compound selector"));
        }

        let css = css.trim();
        let css = if css.is_empty() {
            None
        } else {
            Some(Selector::parse(css).map_err(|e| invalid(source, &format!("{:?}", e)))?)
        };

        if css.is_none() && contains.is_none() {
            return Err(invalid(source, "empty compound selector"));
        }
        Ok(Self { css, contains })
    }

    fn matches(&self, element: ElementRef<'_>) -> bool {
        if let Some(css) = &self.css {
            if !css.matches(&element) {
                return false;
            }
        }
        match &self.contains {
            Some(needle) => element.text().collect::<String>().contains(needle.as_str()),
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
enum Step {
    /// All descendants matching the filter.
    Descend(Filter),
    /// Direct children matching the filter.
    Children(Filter),
    /// The next element sibling, if it passes the filter.
    NextSibling(Option<Filter>),
    /// The parent element, if it passes the filter.
    Parent(Option<Filter>),
}

impl Step {
    fn apply<'a>(&self, element: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match self {
            Step::Descend(filter) => element
                .descendants()
                .skip(1) // Skip the context element itself
                .filter_map(ElementRef::wrap)
                .filter(|e| filter.matches(*e))
                .collect(),
            Step::Children(filter) => element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| filter.matches(*e))
                .collect(),
            Step::NextSibling(filter) => element
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|e| filter.as_ref().map_or(true, |f| f.matches(*e)))
                .into_iter()
                .collect(),
            Step::Parent(filter) => element
                .parent()
                .and_then(ElementRef::wrap)
                .filter(|e| filter.as_ref().map_or(true, |f| f.matches(*e)))
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Hop {
    Next,
    Parent,
}

/// A compiled template selector.
///
/// Plain CSS is handed to `scraper`, so tag, class, attribute, `>`, `:not` and
/// `:nth-child` all work. On top of that:
/// - `:contains(text)` keeps elements whose text contains `text`. It must be
///   the last part of its compound, but may be followed by a combinator
///   (`li:contains("Next") > a`);
/// - `+` moves to the next element sibling, optionally matched against the
///   compound that follows (`label + span`, or a bare trailing `+`);
/// - `<` moves to the parent element.
///
/// A query that starts with `+` or `<` hops from the context element itself.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    steps: Vec<Step>,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self, ExtractError> {
        let (lead, hops) = split_hops(source)
            .ok_or_else(|| invalid(source, "unbalanced brackets or quotes"))?;

        let mut steps = Vec::new();
        let lead = lead.trim();
        if !lead.is_empty() {
            push_descend(lead, &mut steps, source)?;
        } else if hops.is_empty() {
            return Err(invalid(source, "empty selector"));
        }

        for (hop, run) in hops {
            let (head, tail) = split_compound(run.trim_start());
            let filter = if head.is_empty() {
                None
            } else {
                Some(Filter::parse(head, source)?)
            };
            steps.push(match hop {
                Hop::Next => Step::NextSibling(filter),
                Hop::Parent => Step::Parent(filter),
            });
            push_tail(tail, &mut steps, source)?;
        }

        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every match reachable from `context`, in discovery order, without duplicates.
    pub fn select<'a>(&self, context: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let mut current = vec![context];
        for step in &self.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for element in &current {
                for found in step.apply(*element) {
                    if seen.insert(found.id()) {
                        next.push(found);
                    }
                }
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn first<'a>(&self, context: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.select(context).into_iter().next()
    }
}

// --- Helper Functions ---

fn invalid(source: &str, reason: &str) -> ExtractError {
    ExtractError::InvalidSelector {
        selector: source.to_string(),
        reason: reason.to_string(),
    }
}

/// Tracks bracket, paren and quote nesting while scanning a selector.
#[derive(Default)]
struct Nesting {
    parens: usize,
    brackets: usize,
    quote: Option<char>,
}

impl Nesting {
    /// Feeds one char and reports whether it sits at top level.
    fn feed(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if c == q {
                self.quote = None;
            }
            return false;
        }
        match c {
            '"' | '\'' => {
                self.quote = Some(c);
                false
            }
            '(' => {
                self.parens += 1;
                false
            }
            ')' => {
                self.parens = self.parens.saturating_sub(1);
                false
            }
            '[' => {
                self.brackets += 1;
                false
            }
            ']' => {
                self.brackets = self.brackets.saturating_sub(1);
                false
            }
            _ => self.parens == 0 && self.brackets == 0,
        }
    }

    fn balanced(&self) -> bool {
        self.parens == 0 && self.brackets == 0 && self.quote.is_none()
    }
}

/// Splits at top-level `+` and `<`. Returns `None` on unbalanced input.
fn split_hops(source: &str) -> Option<(&str, Vec<(Hop, &str)>)> {
    let mut nesting = Nesting::default();
    let mut lead: Option<&str> = None;
    let mut hops = Vec::new();
    let mut pending: Option<Hop> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        if !nesting.feed(c) {
            continue;
        }
        let hop = match c {
            '+' => Hop::Next,
            '<' => Hop::Parent,
            _ => continue,
        };
        let run = &source[start..i];
        match pending.replace(hop) {
            None => lead = Some(run),
            Some(prev) => hops.push((prev, run)),
        }
        start = i + c.len_utf8();
    }

    if !nesting.balanced() {
        return None;
    }
    let rest = &source[start..];
    match pending {
        None => Some((rest, hops)),
        Some(prev) => {
            hops.push((prev, rest));
            Some((lead.unwrap_or(""), hops))
        }
    }
}

/// Splits off the first compound selector at top-level whitespace, `>` or `~`.
fn split_compound(run: &str) -> (&str, &str) {
    let mut nesting = Nesting::default();
    for (i, c) in run.char_indices() {
        if nesting.feed(c) && (c.is_whitespace() || c == '>' || c == '~') {
            return (&run[..i], &run[i..]);
        }
    }
    (run, "")
}

/// Compiles whatever follows a hop's compound: `> child ...` or a descendant query.
fn push_tail(tail: &str, steps: &mut Vec<Step>, source: &str) -> Result<(), ExtractError> {
    let tail = tail.trim_start();
    if tail.is_empty() {
        return Ok(());
    }
    if let Some(rest) = tail.strip_prefix('>') {
        let (head, rest) = split_compound(rest.trim_start());
        if head.is_empty() {
            return Err(invalid(source, "dangling '>'"));
        }
        steps.push(Step::Children(Filter::parse(head, source)?));
        return push_tail(rest, steps, source);
    }
    if tail.starts_with('~') {
        return Err(invalid(source, "'~' after a traversal is not supported"));
    }
    push_descend(tail, steps, source)
}

/// Compiles a descendant query. A `:contains()` followed by a combinator ends
/// a step there; the rest is matched below each element it kept.
fn push_descend(run: &str, steps: &mut Vec<Step>, source: &str) -> Result<(), ExtractError> {
    let run = run.trim();
    if let Some((head, rest)) = split_after_contains(run) {
        if !rest.trim().is_empty() {
            if !rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '~') {
                return Err(invalid(source, ":contains() must end its compound selector"));
            }
            steps.push(Step::Descend(Filter::parse(head, source)?));
            return push_tail(rest, steps, source);
        }
    }
    steps.push(Step::Descend(Filter::parse(run, source)?));
    Ok(())
}

/// Splits right after the first top-level `:contains(...)`.
fn split_after_contains(run: &str) -> Option<(&str, &str)> {
    let mut nesting = Nesting::default();
    let mut open = false;
    for (i, c) in run.char_indices() {
        let top = nesting.feed(c);
        if !open {
            open = top && run[i..].starts_with(":contains(");
        } else if c == ')' && nesting.balanced() {
            return Some(run.split_at(i + 1));
        }
    }
    None
}
