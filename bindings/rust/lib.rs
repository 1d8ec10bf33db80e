//! Rust bindings for the `tree-sitter-rue` grammar.
//!
//! The parser is generated from `src/grammar.json` at build time and linked
//! into this crate. Consumers obtain a [`tree_sitter::Language`] for it either
//! through [`LANGUAGE`] or through [`language`]:
//!
//! ```
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_rue::LANGUAGE.into())
//!     .expect("Error loading Rue grammar");
//! let tree = parser.parse("fn main() -> i32 { 0 }", None).unwrap();
//! assert_eq!(tree.root_node().kind(), "source_file");
//! ```

use tree_sitter::Language;
use tree_sitter_language::LanguageFn;

mod verify;

pub use verify::{load_language, verify_can_load_grammar, GrammarLoadFailure, LoadFailureReason};

extern "C" {
    fn tree_sitter_rue() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for the Rue grammar.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_rue) };

/// Returns the Tree-sitter [`Language`] for this grammar.
pub fn language() -> Language {
    Language::new(LANGUAGE)
}

/// The syntax highlighting query for this language.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");
