//! Parser for a small constant-assignment configuration language.
//!
//! A source file is a sequence of `name = value;` statements. Values are
//! numbers, `'quoted'` strings, `( ... )` arrays, names of earlier
//! assignments, or `$[op arg ...]` constant expressions folded at parse
//! time. The result is a [`Document`] that [`to_xml`] renders as XML.
//!
//! ```text
//! // ports
//! base = 8000;
//! ports = (base, $[+ base 1]);
//! {- nested {- block -} comment -}
//! ratio = $[/ base 3];
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
pub mod scanner;
pub mod value;
pub mod xml;

pub use error::{ErrorKind, Position, SyntaxError};
pub use parser::{parse, ConfigParser, ParseOptions, DEFAULT_MAX_DEPTH};
pub use value::{Assignment, ConstantTable, Document, Value};
pub use xml::to_xml;

// ── Core API ───────────────────────────────────────────────────────

/// Parse with explicit options. The constant table is discarded afterwards;
/// use [`ConfigParser`] to inspect it.
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<Document, SyntaxError> {
    ConfigParser::with_options(options).parse(input)
}

/// Parse `input` and render the result as XML.
pub fn convert(input: &str, options: ParseOptions) -> Result<String, SyntaxError> {
    parse_with_options(input, options).map(|doc| to_xml(&doc))
}

#[cfg(test)]
mod tests;
