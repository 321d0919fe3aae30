use proptest::prelude::*;
use rlang_core::lexer::{Tokenizer, TokenizerOptions};
use rlang_core::parser::parse;
use rlang_core::protocol::Message;
use rlang_core::text::{TextProvider, TextStream};
use serde_json::{Value, json};

fn arg_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        "\\PC*".prop_map(|s| json!(s)),
        Just(Value::Null),
    ]
}

proptest! {
    // Tokens come out in order, never overlap, and cover every non-whitespace character
    #[test]
    fn test_tokenizer_covers_input(text in "\\PC*") {
        let stream = TextStream::new(&text);
        let tokens = Tokenizer::new(TokenizerOptions { emit_comments: true })
            .tokenize(&stream, 0, stream.len());

        let mut previous_end = 0;
        for token in tokens.iter() {
            prop_assert!(token.start() < token.end());
            prop_assert!(token.start() >= previous_end);
            prop_assert!(token.end() <= stream.len());
            previous_end = token.end();
        }

        for (position, ch) in text.chars().enumerate() {
            if !ch.is_whitespace() {
                prop_assert!(
                    tokens.item_containing(position).is_some(),
                    "{:?} at {} is not covered",
                    ch,
                    position
                );
            }
        }
    }

    // Any input parses, and the tree is well formed
    #[test]
    fn test_parser_robustness(text in "\\PC*") {
        let length = text.chars().count();
        let ast = parse(&text);

        prop_assert!(ast[ast.root()].range.end <= length);
        for node in ast.walk() {
            for child in node.children() {
                prop_assert!(node.range().contains_range(child.range()));
                prop_assert_eq!(child.parent().map(|p| p.id()), Some(node.id()));
            }
        }
        for diagnostic in ast.diagnostics() {
            prop_assert!(diagnostic.range.end <= length);
        }
        prop_assert!(!ast.is_cancelled());
    }

    // R-looking input exercises the statement and recovery paths harder than random text
    #[test]
    fn test_parser_is_deterministic(
        text in concat!(
            "([a-z]{1,3}|[0-9]|<-|->|[-+*/^~?!]|[(){}\\[\\],;$@]",
            "|if|else|for|in|function| |\n)*"
        ),
    ) {
        prop_assert_eq!(parse(&text), parse(&text));
    }

    // Arbitrary bytes either decode or are rejected, never panic
    #[test]
    fn test_decoder_robustness(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = Message::decode(&bytes);
    }

    #[test]
    fn test_message_round_trip(
        id in any::<u64>(),
        request_id in any::<u64>(),
        name in "[a-z_.]{1,12}",
        args in proptest::collection::vec(arg_value(), 0..6),
        blob in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let message = Message {
            id,
            request_id,
            name,
            args,
            blob,
        };
        let bytes = message.encode().unwrap();
        prop_assert_eq!(Message::decode(&bytes).unwrap(), message);
    }
}
