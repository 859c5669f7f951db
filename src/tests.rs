use crate::error::ErrorKind;
use crate::parser::{ConfigParser, ParseOptions};
use crate::value::{ConstantTable, Document, Value};
use crate::xml::{format_float, to_xml};

use proptest::prelude::*;

// ── Shared fixture runners ──────────────────────────────────────────

/// Embed fixture files at compile time.
const PARSE_FIXTURES: &str = include_str!("../test-data/fixtures/parse.json");
const PARSE_ERROR_FIXTURES: &str = include_str!("../test-data/fixtures/parse-errors.json");

/// Convert a resolved value to the fixture JSON shape: numbers keep their
/// integer/float distinction, arrays stay arrays.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}

fn document_to_json(doc: &Document) -> serde_json::Value {
    serde_json::Value::Array(
        doc.iter()
            .map(|a| serde_json::json!([a.name, value_to_json(&a.value)]))
            .collect(),
    )
}

#[test]
fn test_fixture_parse() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(PARSE_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let expected = &fixture["expected"];

        let doc = match crate::parse(input) {
            Ok(doc) => doc,
            Err(err) => panic!("Fixture '{}': unexpected error: {}", name, err),
        };
        let got = document_to_json(&doc);
        assert_eq!(
            &got, expected,
            "Fixture '{}': value mismatch\n  Got:      {}\n  Expected: {}",
            name, got, expected
        );
    }
}

#[test]
fn test_fixture_parse_errors() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(PARSE_ERROR_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let code = fixture["code"].as_str().unwrap();
        let line = fixture["line"].as_u64().unwrap() as usize;
        let column = fixture["column"].as_u64().unwrap() as usize;

        let err = match crate::parse(input) {
            Ok(doc) => panic!(
                "Fixture '{}': expected error for input {:?}, got {:?}",
                name, input, doc
            ),
            Err(err) => err,
        };
        assert_eq!(err.code(), code, "Fixture '{}': wrong error: {}", name, err);
        assert_eq!(
            (err.position.line, err.position.column),
            (line, column),
            "Fixture '{}': wrong position: {}",
            name,
            err
        );
    }
}

// ── Constant table ──────────────────────────────────────────────────

#[test]
fn test_constants_after_parse() {
    let mut parser = ConfigParser::new();
    let doc = parser
        .parse(
            "
            x = 10;
            y = x;
        ",
        )
        .unwrap();

    assert_eq!(parser.constants().get("x"), Some(&Value::Integer(10)));
    assert_eq!(parser.constants().get("y"), Some(&Value::Integer(10)));
    assert_eq!(doc.len(), 2);
    assert!(doc.iter().all(|a| a.value == Value::Integer(10)));
}

#[test]
fn test_complex_expressions_fill_table() {
    let mut parser = ConfigParser::new();
    parser
        .parse("a = 10; b = 20; c = $[+ a b]; d = $[* c 2];")
        .unwrap();
    assert_eq!(parser.constants().get("c"), Some(&Value::Integer(30)));
    assert_eq!(parser.constants().get("d"), Some(&Value::Integer(60)));
}

#[test]
fn test_reuse_resets_state() {
    let mut parser = ConfigParser::new();
    parser.parse("x = 1;").unwrap();
    assert!(parser.constants().contains("x"));

    // A second parse must not see constants from the first one.
    let err = parser.parse("y = x;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedConstant("x".to_string()));
    assert_eq!(err.position.line, 1);

    let doc = parser.parse("\n\nz = 'ok';").unwrap();
    assert_eq!(doc.assignments[0].value, Value::from("ok"));
    assert_eq!(parser.constants().len(), 1);
    assert!(!parser.constants().contains("x"));
}

#[test]
fn test_constant_table_order_and_overwrite() {
    let mut table = ConstantTable::new();
    assert!(table.is_empty());
    assert_eq!(table.insert("b".to_string(), Value::Integer(1)), None);
    assert_eq!(table.insert("a".to_string(), Value::Integer(2)), None);
    assert_eq!(
        table.insert("b".to_string(), Value::Integer(3)),
        Some(Value::Integer(1))
    );

    let entries: Vec<_> = table.iter().collect();
    assert_eq!(
        entries,
        vec![("b", &Value::Integer(3)), ("a", &Value::Integer(2))]
    );
}

#[test]
fn test_reassignment_last_write_wins() {
    let mut parser = ConfigParser::new();
    let doc = parser.parse("x = 1; x = 'two';").unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(parser.constants().get("x"), Some(&Value::from("two")));
    assert_eq!(parser.constants().len(), 1);
}

// ── Values ──────────────────────────────────────────────────────────

#[test]
fn test_array_keeps_order_and_types() {
    let doc = crate::parse("arr = (1, 'text', 3.14);").unwrap();
    assert_eq!(
        doc.assignments[0].value,
        Value::Array(vec![
            Value::Integer(1),
            Value::from("text"),
            Value::Float(3.14),
        ])
    );
}

#[test]
fn test_division_yields_float() {
    let doc = crate::parse("x = $[/ 60 2]; y = $[/ 1 4];").unwrap();
    assert_eq!(doc.assignments[0].value, Value::from(30.0_f64));
    assert_eq!(doc.assignments[1].value, Value::Float(0.25));
}

#[test]
fn test_comments_are_transparent() {
    let with_comments = crate::parse("// comment\n{- block -}\nx = 42;").unwrap();
    let without = crate::parse("x = 42;").unwrap();
    assert_eq!(with_comments, without);
    assert_eq!(without.assignments[0].value, Value::from(42_i64));

    assert!(crate::parse("// nothing but a comment\n").unwrap().is_empty());
    assert!(!without.is_empty());
}

// ── Errors ──────────────────────────────────────────────────────────

#[test]
fn test_error_display() {
    let err = crate::parse("x = 1;\ny = z;").unwrap_err();
    assert_eq!(err.to_string(), "Line 2, position 5: Undefined constant: z");

    let err = crate::parse("x = $[+ 1];").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Line 1, position 5: '+' requires 2 arguments"
    );

    let err = crate::parse("x = $[len];").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Line 1, position 5: 'len' requires 1 argument"
    );

    let err = crate::parse("x = 1").unwrap_err();
    assert_eq!(err.to_string(), "Line 1, position 6: Expected ';'");

    let err = crate::parse("x = ").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Line 1, position 5: Unexpected character: end of input"
    );
}

#[test]
fn test_first_error_aborts() {
    // The undefined reference comes first; the division by zero is never reached.
    let err = crate::parse("a = q;\nb = $[/ 1 0];").unwrap_err();
    assert_eq!(err.code(), "undefined-constant");
}

#[test]
fn test_first_error_in_source_order_wins() {
    // The inner expression fails as soon as its `]` is read, before the
    // outer `+` finds it is missing an argument.
    let err = crate::parse("x = $[+ $[/ 1 0]];").unwrap_err();
    assert_eq!(err.to_string(), "Line 1, position 9: Division by zero");

    // The name is resolved where it appears, before the bad token after it.
    let err = crate::parse("x = (z, ?);").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedConstant("z".to_string()));
    assert_eq!(err.position.column, 6);
}

#[test]
fn test_unknown_symbol_operation() {
    let err = crate::parse("x = $[% 1 2];").unwrap_err();
    assert_eq!(err.to_string(), "Line 1, position 5: Unknown operation: %");
}

#[test]
fn test_nesting_limit() {
    let options = ParseOptions { max_depth: 3 };
    assert_eq!(ConfigParser::with_options(options).options(), options);
    assert_eq!(ConfigParser::new().options(), ParseOptions::default());

    let ok = crate::parse_with_options("x = (((1)));", options).unwrap();
    assert_eq!(
        ok.assignments[0].value,
        Value::Array(vec![Value::Array(vec![Value::Array(vec![Value::Integer(1)])])])
    );

    let err = crate::parse_with_options("x = ((((1))));", options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep(3));
    assert_eq!(err.position.column, 8);

    let err = crate::parse_with_options("x = $[len ($[len ($[len (1)])])];", options).unwrap_err();
    assert_eq!(err.code(), "nesting-too-deep");
}

#[test]
fn test_deep_input_fails_predictably() {
    let depth = 10_000;
    let input = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let err = crate::parse(&input).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep(crate::DEFAULT_MAX_DEPTH));
}

// ── XML ─────────────────────────────────────────────────────────────

#[test]
fn test_to_xml_single_number() {
    let doc = crate::parse("test = 42;").unwrap();
    let xml = to_xml(&doc);
    assert!(xml.contains("<assignment name=\"test\">"));
    assert!(xml.contains("<number>42</number>"));
}

#[test]
fn test_to_xml_layout() {
    let doc = crate::parse("n = $[/ 3 2]; s = 'a<b & \"c\"'; arr = (1, ('x'), ());").unwrap();
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<configuration>
  <assignment name="n">
    <number>1.5</number>
  </assignment>
  <assignment name="s">
    <string>a&lt;b &amp; &quot;c&quot;</string>
  </assignment>
  <assignment name="arr">
    <array>
      <number>1</number>
      <array>
        <string>x</string>
      </array>
      <array>
      </array>
    </array>
  </assignment>
</configuration>"#;
    assert_eq!(to_xml(&doc), expected);
}

#[test]
fn test_to_xml_empty_document() {
    let xml = to_xml(&Document::new());
    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<configuration>\n</configuration>"
    );
}

#[test]
fn test_to_xml_escapes_apostrophe() {
    let doc = crate::parse("s = 'It\\'s > 0';").unwrap();
    assert!(to_xml(&doc).contains("<string>It&apos;s &gt; 0</string>"));
}

#[test]
fn test_format_float() {
    assert_eq!(format_float(30.0), "30.0");
    assert_eq!(format_float(-2.0), "-2.0");
    assert_eq!(format_float(3.14), "3.14");
    assert_eq!(format_float(0.25), "0.25");
    assert_eq!(format_float(f64::INFINITY), "inf");
}

#[test]
fn test_convert() {
    let xml = crate::convert("x = $[len 'hello'];", ParseOptions::default()).unwrap();
    assert!(xml.contains("<number>5</number>"));
}

// ── Number literals ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn integer_literals_round_trip(n in any::<i64>()) {
        let doc = crate::parse(&format!("x = {};", n)).unwrap();
        prop_assert_eq!(&doc.assignments[0].value, &Value::Integer(n));
    }

    #[test]
    fn decimal_literals_match_std(
        int in 0u32..1_000_000,
        frac in 0u32..1_000_000,
        negative in any::<bool>(),
    ) {
        let text = format!("{}{}.{}", if negative { "-" } else { "" }, int, frac);
        let doc = crate::parse(&format!("x = {};", text)).unwrap();
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(&doc.assignments[0].value, &Value::Float(expected));
    }

    #[test]
    fn exponent_literals_match_std(
        mantissa in 0u32..100_000,
        exp in -30i32..30,
        upper in any::<bool>(),
    ) {
        let text = format!("{}{}{}", mantissa, if upper { "E" } else { "e" }, exp);
        let doc = crate::parse(&format!("x = {};", text)).unwrap();
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(&doc.assignments[0].value, &Value::Float(expected));
    }

    #[test]
    fn integer_addition_matches_checked_add(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let doc = crate::parse(&format!("x = $[+ {} {}];", a, b)).unwrap();
        prop_assert_eq!(&doc.assignments[0].value, &Value::Integer(a + b));
    }
}
