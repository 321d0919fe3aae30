// tests/lexer_tests.rs

use rlang_core::ast::{LexicalAnomaly, Token, TokenCollection, TokenSubType, TokenType};
use rlang_core::lexer::braces::{BraceTokenType, find_matching_brace};
use rlang_core::lexer::{BraceTokenizer, Tokenizer, TokenizerOptions, tokenize};
use rlang_core::text::{TextProvider, TextRange, TextStream};

fn types(source: &str) -> Vec<TokenType> {
    tokenize(source).iter().map(|t| t.token_type).collect()
}

fn texts(source: &str) -> Vec<String> {
    let text = TextStream::new(source);
    tokenize(source).iter().map(|t| text.text(t.range)).collect()
}

// ============================================================================
// Token Types
// ============================================================================

#[test]
fn test_single_token_types() {
    let test_cases = vec![
        ("x", TokenType::Identifier),
        (".hidden", TokenType::Identifier),
        ("data.frame", TokenType::Identifier),
        ("`my var`", TokenType::Identifier),
        ("if", TokenType::Keyword),
        ("function", TokenType::Keyword),
        ("\\", TokenType::Keyword),
        ("TRUE", TokenType::Logical),
        ("FALSE", TokenType::Logical),
        ("NULL", TokenType::Null),
        ("NA", TokenType::Missing),
        ("NA_character_", TokenType::Missing),
        ("42", TokenType::Number),
        ("2i", TokenType::Complex),
        ("\"s\"", TokenType::String),
        ("'s'", TokenType::String),
        ("<-", TokenType::Operator),
        ("%in%", TokenType::Operator),
        ("%%", TokenType::Operator),
        ("$", TokenType::Operator),
        ("(", TokenType::OpenBrace),
        (")", TokenType::CloseBrace),
        ("[", TokenType::OpenSquareBracket),
        ("[[", TokenType::OpenDoubleSquareBracket),
        ("{", TokenType::OpenCurlyBrace),
        ("}", TokenType::CloseCurlyBrace),
        (",", TokenType::Comma),
        (";", TokenType::Semicolon),
        ("...", TokenType::Ellipsis),
        ("# note", TokenType::Comment),
    ];

    for (input, expected) in test_cases {
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 1, "Failed for input: {}", input);
        let token = tokens.get(0).unwrap();
        assert_eq!(token.token_type, expected, "Failed for input: {}", input);
        assert_eq!(token.range, TextRange::new(0, input.chars().count()));
        assert_eq!(token.anomaly, None, "Failed for input: {}", input);
    }
}

#[test]
fn test_sub_types() {
    let test_cases = vec![
        ("5L", TokenType::Number, TokenSubType::Integer),
        ("0x1F", TokenType::Number, TokenSubType::Hexadecimal),
        ("0xFFL", TokenType::Number, TokenSubType::Integer),
        ("Inf", TokenType::Number, TokenSubType::Infinity),
        ("NaN", TokenType::Number, TokenSubType::NaN),
        ("pi", TokenType::Identifier, TokenSubType::BuiltinConstant),
        ("LETTERS", TokenType::Identifier, TokenSubType::BuiltinConstant),
        ("c", TokenType::Identifier, TokenSubType::BuiltinFunction),
        ("paste0", TokenType::Identifier, TokenSubType::BuiltinFunction),
        ("my_fn", TokenType::Identifier, TokenSubType::None),
        ("`x y`", TokenType::Identifier, TokenSubType::QuotedIdentifier),
        ("r\"(a)\"", TokenType::String, TokenSubType::RawString),
    ];

    for (input, token_type, sub_type) in test_cases {
        let expected = Token::new(token_type, TextRange::new(0, input.chars().count()))
            .with_sub_type(sub_type);
        assert_eq!(tokenize(input).get(0), Some(&expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_numbers() {
    for input in ["1", "1.5", ".5", "1.", "1e-3", "1E+10", "0xff", "100L", "3.5i"] {
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 1, "Failed for input: {}", input);
        assert_eq!(tokens.get(0).unwrap().anomaly, None, "Failed for input: {}", input);
    }
}

#[test]
fn test_operators_longest_match() {
    assert_eq!(texts("a<<-b"), vec!["a", "<<-", "b"]);
    assert_eq!(texts("x->>y"), vec!["x", "->>", "y"]);
    assert_eq!(texts("base:::f"), vec!["base", ":::", "f"]);
    assert_eq!(texts("x|>f()"), vec!["x", "|>", "f", "(", ")"]);
    assert_eq!(texts("a<=-1"), vec!["a", "<=", "-", "1"]);
    assert_eq!(texts("x %>% y"), vec!["x", "%>%", "y"]);
    assert_eq!(texts("dt[, a := 1]"), vec!["dt", "[", ",", "a", ":=", "1", "]"]);
}

#[test]
fn test_function_and_lambda() {
    assert_eq!(
        types("function(x) x"),
        vec![
            TokenType::Keyword,
            TokenType::OpenBrace,
            TokenType::Identifier,
            TokenType::CloseBrace,
            TokenType::Identifier,
        ]
    );
    assert_eq!(texts("\\(x) x"), vec!["\\", "(", "x", ")", "x"]);
}

#[test]
fn test_ellipsis_and_dotted_names() {
    assert_eq!(
        types("f(...)"),
        vec![
            TokenType::Identifier,
            TokenType::OpenBrace,
            TokenType::Ellipsis,
            TokenType::CloseBrace,
        ]
    );
    assert_eq!(types("..1"), vec![TokenType::Identifier]);
    assert_eq!(types("...x"), vec![TokenType::Identifier]);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_valid_escapes() {
    let source = r#""\x41\u00e9\U{1F600}\n\t\\\"\101""#;
    let tokens = tokenize(source);
    assert_eq!(tokens.len(), 1);
    let token = tokens.get(0).unwrap();
    assert_eq!(token.token_type, TokenType::String);
    assert_eq!(token.anomaly, None);
}

#[test]
fn test_multi_line_string() {
    let tokens = tokenize("'a\nb' x");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens.get(0).unwrap().range, TextRange::new(0, 5));
}

#[test]
fn test_raw_strings() {
    // The backslash is not an escape inside a raw string.
    assert_eq!(texts(r#"r"(C:\path)" x"#), vec![r#"r"(C:\path)""#, "x"]);
    // A closer without the matching dashes does not end the string.
    assert_eq!(texts(r#"r"-[a]"]-""#), vec![r#"r"-[a]"]-""#]);
    assert_eq!(texts("R'{x}'"), vec!["R'{x}'"]);
    // Plain identifiers named r are not raw strings.
    assert_eq!(types("r + 1"), vec![TokenType::Identifier, TokenType::Operator, TokenType::Number]);
}

// ============================================================================
// Lexical Anomalies
// ============================================================================

#[test]
fn test_anomalies() {
    let test_cases = vec![
        ("'abc", LexicalAnomaly::UnterminatedString),
        ("r\"(abc", LexicalAnomaly::UnterminatedString),
        ("`abc", LexicalAnomaly::UnterminatedIdentifier),
        ("%x", LexicalAnomaly::UnterminatedOperator),
        ("\"a\\qb\"", LexicalAnomaly::InvalidEscape),
        ("1e", LexicalAnomaly::MalformedNumber),
        ("0x", LexicalAnomaly::MalformedNumber),
        ("12abc", LexicalAnomaly::MalformedNumber),
        ("§", LexicalAnomaly::UnknownCharacter),
    ];

    for (input, expected) in test_cases {
        let tokens = tokenize(input);
        let token = tokens.get(0).unwrap();
        assert_eq!(token.anomaly, Some(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_anomalous_tokens_keep_their_extent() {
    // The invalid escape does not end the string.
    assert_eq!(
        tokenize("\"a\\qb\" + 1").get(0),
        Some(
            &Token::new(TokenType::String, TextRange::new(0, 6))
                .with_anomaly(Some(LexicalAnomaly::InvalidEscape))
        )
    );

    // A lone `%` is a one-character operator; what follows is tokenized normally.
    let tokens = tokenize("%in");
    assert_eq!(
        tokens.get(0),
        Some(
            &Token::new(TokenType::Operator, TextRange::new(0, 1))
                .with_anomaly(Some(LexicalAnomaly::UnterminatedOperator))
        )
    );
    assert_eq!(tokens.get(1).unwrap().token_type, TokenType::Keyword);

    // `%op%` does not continue onto the next line.
    assert_eq!(texts("a %in\nb %in% c"), vec!["a", "%", "in", "b", "%in%", "c"]);
}

#[test]
fn test_anomaly_messages() {
    assert_eq!(LexicalAnomaly::UnterminatedString.message(), "Unterminated string literal");
    assert_eq!(LexicalAnomaly::UnknownCharacter.message(), "Unexpected character");
}

// ============================================================================
// Brackets
// ============================================================================

#[test]
fn test_double_brackets() {
    assert_eq!(
        types("x[[1]]"),
        vec![
            TokenType::Identifier,
            TokenType::OpenDoubleSquareBracket,
            TokenType::Number,
            TokenType::CloseDoubleSquareBracket,
        ]
    );
    assert_eq!(
        types("x[y[1]]"),
        vec![
            TokenType::Identifier,
            TokenType::OpenSquareBracket,
            TokenType::Identifier,
            TokenType::OpenSquareBracket,
            TokenType::Number,
            TokenType::CloseSquareBracket,
            TokenType::CloseSquareBracket,
        ]
    );
    assert_eq!(texts("a[[b[[1]]]]"), vec!["a", "[[", "b", "[[", "1", "]]", "]]"]);
}

#[test]
fn test_brace_tokenizer() {
    let text = TextStream::new("func()[x]{}");
    let types: Vec<_> = BraceTokenizer::new()
        .tokenize(&text, 0, text.len())
        .iter()
        .map(|t| t.token_type)
        .collect();
    assert_eq!(
        types,
        vec![
            BraceTokenType::OpenBrace,
            BraceTokenType::CloseBrace,
            BraceTokenType::OpenBracket,
            BraceTokenType::CloseBracket,
            BraceTokenType::OpenCurly,
            BraceTokenType::CloseCurly,
        ]
    );
}

#[test]
fn test_brace_matching_skips_strings() {
    let text = TextStream::new("if (a[1]) { '}' # }\n}");
    let tokens = BraceTokenizer::new().tokenize(&text, 0, text.len());
    assert_eq!(tokens.len(), 6);
    assert_eq!(find_matching_brace(&tokens, 4), Some(5));
    assert_eq!(tokens[5].range, TextRange::new(20, 1));
    assert_eq!(find_matching_brace(&tokens, 3), Some(0));
}

// ============================================================================
// Options and Ranges
// ============================================================================

#[test]
fn test_comments() {
    let text = TextStream::new("x # note\ny");
    let with = Tokenizer::default().tokenize(&text, 0, text.len());
    assert_eq!(with.len(), 3);
    assert!(with.get(1).unwrap().is_comment());
    assert_eq!(with.get(1).unwrap().range, TextRange::new(2, 6));

    let without =
        Tokenizer::new(TokenizerOptions { emit_comments: false }).tokenize(&text, 0, text.len());
    assert_eq!(without.len(), 2);
    assert!(without.iter().all(|t| !t.is_comment()));
}

#[test]
fn test_sub_range_uses_absolute_positions() {
    let text = TextStream::new("abc <- 12");
    let tokens = Tokenizer::default().tokenize(&text, 4, 5);
    assert_eq!(
        tokens.as_slice(),
        &[
            Token::new(TokenType::Operator, TextRange::new(4, 2)),
            Token::new(TokenType::Number, TextRange::new(7, 2)),
        ]
    );

    // A range ending inside a token cuts the token short.
    let tokens = Tokenizer::default().tokenize(&text, 0, 2);
    assert_eq!(tokens.get(0).unwrap().range, TextRange::new(0, 2));

    // A range running past the text is clamped.
    let tokens = Tokenizer::default().tokenize(&text, 7, 100);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens.get(0).unwrap().range, TextRange::new(7, 2));
}

#[test]
fn test_whitespace_only() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("  \n\t \r\n").is_empty());
}

// ============================================================================
// Token Collection Queries
// ============================================================================

#[test]
fn test_token_collection_queries() {
    // x <- foo(1)
    let tokens = tokenize("x <- foo(1)");
    assert_eq!(tokens.len(), 6);

    assert_eq!(tokens.item_containing(3), Some(1));
    assert_eq!(tokens.item_containing(4), None);
    assert_eq!(tokens.item_containing(0), Some(0));

    assert_eq!(tokens.first_item_at_or_after(4), Some(2));
    assert_eq!(tokens.first_item_at_or_after(5), Some(2));
    assert_eq!(tokens.first_item_at_or_after(11), None);

    let overlapping = tokens.items_overlapping(TextRange::new(3, 4));
    assert_eq!(overlapping.len(), 2);
    assert_eq!(overlapping[0].range, TextRange::new(2, 2));
    assert_eq!(overlapping[1].range, TextRange::new(5, 3));

    assert!(tokens.items_overlapping(TextRange::empty(4)).is_empty());
    assert_eq!(tokens.items_overlapping(TextRange::empty(6)).len(), 1);
}

#[test]
fn test_token_collection_from_vec() {
    let tokens = TokenCollection::from(vec![
        Token::new(TokenType::Identifier, TextRange::new(0, 1)),
        Token::new(TokenType::String, TextRange::new(2, 4))
            .with_anomaly(Some(LexicalAnomaly::UnterminatedString)),
    ]);
    assert_eq!(tokens.item_containing(5), Some(1));
    assert_eq!((&tokens).into_iter().filter(|t| t.anomaly.is_some()).count(), 1);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic]
fn test_token_collection_from_vec_rejects_overlap() {
    let _ = TokenCollection::from(vec![
        Token::new(TokenType::Identifier, TextRange::new(0, 3)),
        Token::new(TokenType::Identifier, TextRange::new(2, 2)),
    ]);
}
