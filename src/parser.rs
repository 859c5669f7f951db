use tracing::debug;

use crate::ast::{Expression, Operation, Term};
use crate::error::{ErrorKind, Position, Result};
use crate::eval;
use crate::scanner::{is_name_char, Scanner};
use crate::value::{Assignment, ConstantTable, Document, Value};

/// Default bound on array and expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of `( ... )` and `$[ ... ]`.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A parser that can be reused across inputs.
///
/// Each call to [`ConfigParser::parse`] starts from an empty constant table
/// and the first line of the new input. The table from the most recent
/// parse stays available through [`ConfigParser::constants`].
#[derive(Debug, Default)]
pub struct ConfigParser {
    options: ParseOptions,
    constants: ConstantTable,
}

impl ConfigParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        ConfigParser {
            options,
            constants: ConstantTable::new(),
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Constants assigned by the most recent parse.
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn parse(&mut self, input: &str) -> Result<Document> {
        self.constants.clear();
        let mut parser = Parser {
            scanner: Scanner::new(input),
            constants: &mut self.constants,
            max_depth: self.options.max_depth,
            depth: 0,
        };
        parser.parse_document()
    }
}

/// Parse a whole input into a document with default options.
pub fn parse(input: &str) -> Result<Document> {
    ConfigParser::new().parse(input)
}

/// Parser state for one call: cursor, constants and nesting depth.
struct Parser<'a, 'c> {
    scanner: Scanner<'a>,
    constants: &'c mut ConstantTable,
    max_depth: usize,
    depth: usize,
}

impl<'a, 'c> Parser<'a, 'c> {
    // ── Document ────────────────────────────────────────────────────

    fn parse_document(&mut self) -> Result<Document> {
        debug!("parse started");
        let mut document = Document::new();
        loop {
            self.scanner.skip_ignorable()?;
            match self.scanner.peek() {
                None => break,
                Some(ch) if is_name_char(ch) => {
                    let assignment = self.parse_assignment()?;
                    document.assignments.push(assignment);
                }
                other => return Err(self.scanner.error(ErrorKind::UnexpectedCharacter(other))),
            }
        }
        debug!(
            assignments = document.len(),
            constants = self.constants.len(),
            "parse finished"
        );
        Ok(document)
    }

    /// `name = value ;`
    fn parse_assignment(&mut self) -> Result<Assignment> {
        let name = self.parse_name()?;
        self.scanner.skip_ignorable()?;
        if !self.scanner.eat_char('=') {
            return Err(self.scanner.error(ErrorKind::MissingEquals));
        }

        let value = self.parse_value()?;

        self.scanner.skip_ignorable()?;
        if !self.scanner.eat_char(';') {
            return Err(self.scanner.error(ErrorKind::MissingSemicolon));
        }

        debug!(name = %name, kind = value.type_name(), "assignment");
        if self.constants.insert(name.clone(), value.clone()).is_some() {
            debug!(name = %name, "constant reassigned");
        }
        Ok(Assignment { name, value })
    }

    // ── Values ──────────────────────────────────────────────────────

    /// Parse one value. Names and expressions are resolved as soon as they
    /// have been read, so the first error in source order is the one reported.
    fn parse_value(&mut self) -> Result<Value> {
        self.scanner.skip_ignorable()?;
        match self.scanner.peek() {
            Some(ch) if ch == '-' || ch == '.' || ch.is_ascii_digit() => self.parse_number(),
            Some('\'') => self.parse_string().map(Value::Text),
            Some('(') => self.parse_array(),
            Some('$') => {
                let expr = self.parse_expression()?;
                self.resolve(&expr)
            }
            Some(ch) if is_name_char(ch) => {
                let at = self.scanner.position();
                let name = self.parse_name()?;
                self.resolve(&Term::ConstantRef { name, at })
            }
            other => Err(self.scanner.error(ErrorKind::UnexpectedCharacter(other))),
        }
    }

    fn resolve(&self, term: &Term) -> Result<Value> {
        eval::resolve(term, &*self.constants)
    }

    fn enter(&mut self, at: Position) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(self
                .scanner
                .error_at(ErrorKind::NestingTooDeep(self.max_depth), at));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ── Numbers ─────────────────────────────────────────────────────

    fn parse_number(&mut self) -> Result<Value> {
        let begin = self.scanner.position();
        let start = begin.offset;

        self.scanner.eat_char('-');
        let mut found_digit = !self.scanner.take_while(|c| c.is_ascii_digit()).is_empty();
        let mut is_float = false;

        if self.scanner.eat_char('.') {
            is_float = true;
            found_digit |= !self.scanner.take_while(|c| c.is_ascii_digit()).is_empty();
        }

        if let Some('e' | 'E') = self.scanner.peek() {
            is_float = true;
            self.scanner.advance();
            if let Some('+' | '-') = self.scanner.peek() {
                self.scanner.advance();
            }
            self.scanner.take_while(|c| c.is_ascii_digit());
        }

        if !found_digit {
            return Err(self.scanner.error_at(ErrorKind::ExpectedNumber, begin));
        }

        let text = self.scanner.slice_from(start);
        let invalid = || {
            self.scanner
                .error_at(ErrorKind::InvalidNumber(text.to_string()), begin)
        };
        if is_float {
            text.parse::<f64>().map(Value::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Value::Integer).map_err(|_| invalid())
        }
    }

    // ── Strings ─────────────────────────────────────────────────────

    /// `'...'` with `\n`, `\t`, `\\` and `\'` escapes. Any other escaped
    /// character stands for itself.
    fn parse_string(&mut self) -> Result<String> {
        let begin = self.scanner.position();
        if !self.scanner.eat_char('\'') {
            return Err(self.scanner.error(ErrorKind::UnexpectedCharacter(self.scanner.peek())));
        }
        let mut result = String::new();
        loop {
            match self.scanner.advance() {
                None => return Err(self.scanner.error_at(ErrorKind::UnclosedString, begin)),
                Some('\'') => return Ok(result),
                Some('\\') => match self.scanner.advance() {
                    None => return Err(self.scanner.error_at(ErrorKind::UnclosedString, begin)),
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some(ch) => result.push(ch),
                },
                Some(ch) => result.push(ch),
            }
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let name = self.scanner.take_while(is_name_char);
        if name.is_empty() {
            return Err(self.scanner.error(ErrorKind::ExpectedName));
        }
        Ok(name.to_string())
    }

    // ── Arrays ──────────────────────────────────────────────────────

    fn parse_array(&mut self) -> Result<Value> {
        let begin = self.scanner.position();
        if !self.scanner.eat_char('(') {
            return Err(self.scanner.error(ErrorKind::ExpectedArray));
        }
        self.enter(begin)?;
        self.scanner.skip_ignorable()?;

        let mut items = Vec::new();
        if !self.scanner.eat_char(')') {
            loop {
                items.push(self.parse_value()?);
                self.scanner.skip_ignorable()?;
                if self.scanner.eat_char(')') {
                    break;
                }
                if !self.scanner.eat_char(',') {
                    return Err(self.scanner.error(ErrorKind::ExpectedCommaOrCloseParen));
                }
            }
        }

        self.leave();
        Ok(Value::Array(items))
    }

    // ── Constant expressions ────────────────────────────────────────

    /// `$[op arg ...]`, arguments separated by ignorable input only.
    /// Each argument is fully resolved before the next one is read.
    fn parse_expression(&mut self) -> Result<Term> {
        let begin = self.scanner.position();
        if !self.scanner.eat_char('$') {
            return Err(self.scanner.error(ErrorKind::ExpectedConstantExpression));
        }
        if !self.scanner.eat_char('[') {
            return Err(self.scanner.error(ErrorKind::ExpectedOpenBracket));
        }
        self.enter(begin)?;
        self.scanner.skip_ignorable()?;

        let op_name = match self.scanner.peek() {
            Some(ch) if ch.is_ascii_punctuation() && ch != ']' && ch != '_' => {
                self.scanner.advance();
                ch.to_string()
            }
            _ => self.parse_name()?,
        };
        let operation = Operation::from_name(&op_name)
            .ok_or_else(|| self.scanner.error_at(ErrorKind::UnknownOperation(op_name), begin))?;

        let mut args = Vec::new();
        loop {
            self.scanner.skip_ignorable()?;
            match self.scanner.peek() {
                Some(']') => {
                    self.scanner.advance();
                    break;
                }
                None => return Err(self.scanner.error_at(ErrorKind::UnclosedExpression, begin)),
                Some(_) => args.push(self.parse_value()?),
            }
        }

        self.leave();
        Ok(Term::Expression(Box::new(Expression {
            operation,
            args,
            at: begin,
        })))
    }
}
