//! Lenient JSON parser for configuration files, using chumsky.
//!
//! The configuration dialect is JSON plus two relaxations the hand-edited
//! pad and fallback files rely on: `//` line comments and trailing commas in
//! arrays and objects. Malformed regions recover to [`Json::Invalid`] so a
//! single typo yields a spanned error instead of losing the whole document.

use chumsky::prelude::*;
use std::collections::HashMap;

/// A parsed JSON value.
#[derive(Clone, Debug, PartialEq)]
pub enum Json {
    /// Invalid value (used for error recovery).
    Invalid,
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// A string.
    Str(String),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An array.
    Array(Vec<Json>),
    /// An object.
    Object(HashMap<String, Json>),
}

fn parser<'a>() -> impl Parser<'a, &'a str, Json, extra::Err<Rich<'a, char>>> {
    // Whitespace or a `//` comment running to end of line.
    let line_comment = just("//").then(none_of("\n").repeated()).ignored();
    let ws = line_comment
        .or(one_of(" \t\r\n").ignored())
        .repeated()
        .boxed();

    recursive(|value| {
        let digits = text::digits(10).to_slice();

        let frac = just('.').then(digits);

        let exp = just('e')
            .or(just('E'))
            .then(one_of("+-").or_not())
            .then(digits);

        let number = just('-')
            .or_not()
            .then(text::int(10))
            .then(frac.or_not())
            .then(exp.or_not())
            .to_slice()
            .map(|s: &str| {
                if s.contains('.') || s.to_lowercase().contains('e') {
                    Json::Float(s.parse().unwrap_or(f64::NAN))
                } else {
                    s.parse().map_or(Json::Invalid, Json::Int)
                }
            })
            .boxed();

        let escape = just('\\')
            .then(choice((
                just('\\'),
                just('/'),
                just('"'),
                just('b').to('\x08'),
                just('f').to('\x0C'),
                just('n').to('\n'),
                just('r').to('\r'),
                just('t').to('\t'),
                just('u').ignore_then(text::digits(16).exactly(4).to_slice().validate(
                    |digits, e, emitter| {
                        char::from_u32(u32::from_str_radix(digits, 16).unwrap_or(0)).unwrap_or_else(
                            || {
                                emitter.emit(Rich::custom(e.span(), "invalid unicode character"));
                                '\u{FFFD}'
                            },
                        )
                    },
                )),
            )))
            .ignored()
            .boxed();

        let string = none_of("\\\"")
            .ignored()
            .or(escape)
            .repeated()
            .to_slice()
            .map(ToString::to_string)
            .delimited_by(just('"'), just('"'))
            .boxed();

        let array = value
            .clone()
            .separated_by(
                just(',')
                    .padded_by(ws.clone())
                    .recover_with(skip_then_retry_until(any().ignored(), one_of(",]").ignored())),
            )
            .allow_trailing()
            .collect()
            .padded_by(ws.clone())
            .delimited_by(
                just('['),
                just(']')
                    .ignored()
                    .recover_with(via_parser(end()))
                    .recover_with(skip_then_retry_until(any().ignored(), end())),
            )
            .boxed();

        let member = string
            .clone()
            .padded_by(ws.clone())
            .then_ignore(just(':').padded_by(ws.clone()))
            .then(value);
        let object = member
            .clone()
            .separated_by(
                just(',')
                    .padded_by(ws.clone())
                    .recover_with(skip_then_retry_until(any().ignored(), one_of(",}").ignored())),
            )
            .allow_trailing()
            .collect()
            .padded_by(ws.clone())
            .delimited_by(
                just('{'),
                just('}')
                    .ignored()
                    .recover_with(via_parser(end()))
                    .recover_with(skip_then_retry_until(any().ignored(), end())),
            )
            .boxed();

        choice((
            just("null").to(Json::Null),
            just("true").to(Json::Bool(true)),
            just("false").to(Json::Bool(false)),
            number,
            string.map(Json::Str),
            array.map(Json::Array),
            object.map(Json::Object),
        ))
        .recover_with(via_parser(nested_delimiters(
            '{',
            '}',
            [('[', ']')],
            |_| Json::Invalid,
        )))
        .recover_with(via_parser(nested_delimiters(
            '[',
            ']',
            [('{', '}')],
            |_| Json::Invalid,
        )))
        .recover_with(skip_then_retry_until(
            any().ignored(),
            one_of(",]}").ignored(),
        ))
        .padded_by(ws.clone())
    })
}

/// Parses a configuration JSON document.
///
/// Returns the parsed value (if any part of the input could be made sense
/// of) together with every syntax error encountered.
///
/// # Examples
///
/// ```
/// use restep::config::parser::{Json, parse_json};
///
/// let (value, errors) = parse_json(
///     r#"{
///         // trailing commas are fine
///         "Lanes": [1, 2, 3,],
///     }"#,
/// );
/// assert!(errors.is_empty());
/// let Some(Json::Object(object)) = value else {
///     panic!("expected an object");
/// };
/// assert_eq!(
///     object.get("Lanes"),
///     Some(&Json::Array(vec![Json::Int(1), Json::Int(2), Json::Int(3)]))
/// );
/// ```
pub fn parse_json(src: &str) -> (Option<Json>, Vec<Rich<'_, char>>) {
    let (json, errs) = parser().parse(src).into_output_errors();
    (json, errs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values() {
        assert_eq!(parse_json("null").0, Some(Json::Null));
        assert_eq!(parse_json("true").0, Some(Json::Bool(true)));
        assert_eq!(parse_json("42").0, Some(Json::Int(42)));
        assert_eq!(parse_json("-0.5").0, Some(Json::Float(-0.5)));
        assert_eq!(parse_json("\"abc\"").0, Some(Json::Str("abc".into())));
    }

    #[test]
    fn comments_anywhere() {
        let (value, errors) = parse_json(
            "// leading\n[1, // inline\n 2,\n// between\n3]\n// trailing",
        );
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            value,
            Some(Json::Array(vec![Json::Int(1), Json::Int(2), Json::Int(3)]))
        );
    }

    #[test]
    fn trailing_commas_in_objects() {
        let (value, errors) = parse_json("{\"a\": 1, \"b\": [true,],}");
        assert!(errors.is_empty(), "{errors:?}");
        let Some(Json::Object(object)) = value else {
            panic!("expected object, got {value:?}");
        };
        assert_eq!(object.get("a"), Some(&Json::Int(1)));
        assert_eq!(object.get("b"), Some(&Json::Array(vec![Json::Bool(true)])));
    }

    #[test]
    fn malformed_input_reports_errors() {
        let (value, errors) = parse_json("{invalid json");
        assert!(value.is_none() || matches!(value, Some(Json::Invalid)));
        assert!(!errors.is_empty());
    }
}
