// ABOUTME: Field extraction strategies for title, content, date and images.
// ABOUTME: Defines FallbackChain, an ordered list of named strategies where the first value wins.

//! Field extraction module.
//!
//! Every field is produced by a fixed, ordered list of strategies. Each
//! strategy is a pure function over the parsed document that either yields a
//! value or yields nothing; "nothing" covers both "no match" and "this step
//! could not run" (for example an unparseable selector). The first strategy
//! that yields a value wins and later strategies are never evaluated.
//!
//! Submodules:
//! - `select`: selector-list resolution and the compiled selector cache.
//! - `title`, `content`, `date`, `images`: the per-field chains.

use scraper::Html;

pub mod content;
pub mod date;
pub mod images;
pub mod select;
pub mod title;

pub use content::extract_content;
pub use date::extract_date;
pub use images::extract_images;
pub use title::extract_title;

type Strategy<'a, T> = Box<dyn Fn(&Html) -> Option<T> + 'a>;

/// An ordered list of named extraction strategies for one field.
pub struct FallbackChain<'a, T> {
    field: &'static str,
    steps: Vec<(&'static str, Strategy<'a, T>)>,
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            steps: Vec::new(),
        }
    }

    /// Appends a strategy; it runs only if every earlier one yielded nothing.
    pub fn step<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(&Html) -> Option<T> + 'a,
    {
        self.steps.push((name, Box::new(f)));
        self
    }

    /// Step names in evaluation order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(name, _)| *name).collect()
    }

    /// Evaluates strategies in order and returns the first value produced.
    pub fn run(&self, doc: &Html) -> Option<T> {
        for (name, strategy) in &self.steps {
            if let Some(value) = strategy(doc) {
                tracing::debug!(field = self.field, step = name, "fallback step matched");
                return Some(value);
            }
        }
        tracing::debug!(field = self.field, "no fallback step matched");
        None
    }
}

/// Maps the empty string to `None` so "absent" has exactly one representation.
pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
