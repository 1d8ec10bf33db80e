//! Generates the Rue parser from `src/grammar.json` and compiles it.
//!
//! The grammar tables are never checked in. `tree-sitter-generate` turns the
//! grammar description into `parser.c` inside `OUT_DIR`, next to the
//! `tree_sitter/parser.h` header the generated code includes, and `cc` links
//! the result into the crate as `tree-sitter-rue`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

const GRAMMAR_NAME: &str = "rue";

fn main() -> Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let grammar_path = manifest_dir.join("src").join("grammar.json");
    println!("cargo:rerun-if-changed={}", grammar_path.display());

    let parser_path = generate_parser(&grammar_path, &out_dir)?;
    compile_parser(&parser_path, &out_dir);

    Ok(())
}

fn generate_parser(grammar_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let grammar_json = fs::read_to_string(grammar_path)
        .with_context(|| format!("reading {}", grammar_path.display()))?;

    let (name, c_code) = tree_sitter_generate::generate_parser_for_grammar(&grammar_json)
        .context("generating parser tables for the Rue grammar")?;
    if name != GRAMMAR_NAME {
        bail!("grammar.json declares `{name}`, expected `{GRAMMAR_NAME}`");
    }

    let header_dir = out_dir.join("tree_sitter");
    fs::create_dir_all(&header_dir)?;
    fs::write(header_dir.join("parser.h"), tree_sitter::PARSER_HEADER)?;

    let parser_path = out_dir.join("parser.c");
    fs::write(&parser_path, c_code)?;
    Ok(parser_path)
}

fn compile_parser(parser_path: &Path, include_dir: &Path) {
    let mut c_config = cc::Build::new();
    c_config
        .std("c11")
        .include(include_dir)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");

    #[cfg(target_env = "msvc")]
    c_config.flag("-utf-8");

    c_config.file(parser_path);
    c_config.compile("tree-sitter-rue");
}
