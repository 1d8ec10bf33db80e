//! Load-time checks for generated grammar tables.
//!
//! A table that fails here was generated for a different runtime ABI, or the
//! entry point handed back something that is not a table at all. Every
//! failure is reported as a [`GrammarLoadFailure`]; nothing panics and nothing
//! is retried.

use tree_sitter::{Language, Parser};
use tree_sitter_language::LanguageFn;

/// Why a grammar table could not be turned into a usable [`Language`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailureReason {
    /// The binding entry point returned a null table pointer.
    #[error("binding returned a null grammar table")]
    NullTable,
    /// The table's ABI version is outside what the linked runtime accepts.
    #[error("grammar ABI version {found} is outside the supported range {min}..={max}")]
    IncompatibleVersion { found: usize, min: usize, max: usize },
}

/// The single error produced when a grammar table cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error loading Rue grammar: {reason}")]
pub struct GrammarLoadFailure {
    pub reason: LoadFailureReason,
}

impl GrammarLoadFailure {
    fn new(reason: LoadFailureReason) -> Self {
        Self { reason }
    }
}

/// Turns a binding entry point into a [`Language`] the runtime will accept.
///
/// The table pointer is inspected before any runtime call dereferences it, so a
/// null or foreign table comes back as an error instead of a crash.
pub fn load_language(entry: LanguageFn) -> Result<Language, GrammarLoadFailure> {
    // SAFETY: binding entry points take no arguments and only return a pointer
    // to static data; calling one has no other effect.
    let table = unsafe { (entry.into_raw())() };
    if table.is_null() {
        tracing::warn!("grammar entry point returned a null table");
        return Err(GrammarLoadFailure::new(LoadFailureReason::NullTable));
    }

    // SAFETY: `table` is non-null and points at the static tables the
    // entry point owns for the life of the process.
    let language = unsafe { Language::from_raw(table.cast()) };
    let found = language.version();

    // The runtime only reads the version field before refusing a table.
    Parser::new().set_language(&language).map_err(|_| {
        let (min, max) = (
            tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION,
            tree_sitter::LANGUAGE_VERSION,
        );
        tracing::warn!(found, min, max, "grammar ABI version not supported");
        GrammarLoadFailure::new(LoadFailureReason::IncompatibleVersion { found, min, max })
    })?;

    tracing::debug!(
        abi = found,
        node_kinds = language.node_kind_count(),
        fields = language.field_count(),
        "grammar loaded"
    );
    Ok(language)
}

/// Checks that the Rue grammar compiled into this crate can be loaded.
pub fn verify_can_load_grammar() -> Result<(), GrammarLoadFailure> {
    load_language(crate::LANGUAGE).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    unsafe extern "C" fn null_table() -> *const () {
        std::ptr::null()
    }

    // Large enough that the runtime only ever reads the leading version field.
    static ZEROED_TABLE: [u64; 64] = [0; 64];

    unsafe extern "C" fn zeroed_table() -> *const () {
        ZEROED_TABLE.as_ptr().cast()
    }

    #[test]
    fn verify_can_load_grammar_succeeds() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        verify_can_load_grammar().expect("Error loading Rue grammar");
    }

    #[test]
    fn verify_is_idempotent() {
        let first = verify_can_load_grammar();
        let second = verify_can_load_grammar();
        assert_eq!(first, second);
        assert!(first.is_ok());
    }

    #[test]
    fn loaded_language_matches_runtime_abi() {
        let language = load_language(crate::LANGUAGE).unwrap();
        assert_eq!(language.version(), tree_sitter::LANGUAGE_VERSION);
    }

    #[test]
    fn null_table_is_reported_not_dereferenced() {
        let entry = unsafe { LanguageFn::from_raw(null_table) };
        let err = load_language(entry).unwrap_err();
        assert_eq!(err.reason, LoadFailureReason::NullTable);
        assert_eq!(
            err.to_string(),
            "Error loading Rue grammar: binding returned a null grammar table"
        );
    }

    #[test]
    fn table_with_unknown_abi_is_rejected() {
        let entry = unsafe { LanguageFn::from_raw(zeroed_table) };
        let err = load_language(entry).unwrap_err();
        assert_eq!(
            err.reason,
            LoadFailureReason::IncompatibleVersion {
                found: 0,
                min: tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: tree_sitter::LANGUAGE_VERSION,
            }
        );
        assert!(err
            .to_string()
            .starts_with("Error loading Rue grammar: grammar ABI version 0 is outside"));
    }

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn counted_rue_table() -> *const () {
        CALLS.fetch_add(1, Ordering::SeqCst);
        (crate::LANGUAGE.into_raw())()
    }

    #[test]
    fn entry_point_is_called_once_per_load() {
        let entry = unsafe { LanguageFn::from_raw(counted_rue_table) };
        let language = load_language(entry).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(language.version(), tree_sitter::LANGUAGE_VERSION);
    }
}
