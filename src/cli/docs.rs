//! Reference documentation for the rlang CLI

use std::fmt::Write;

use super::CliError;
use crate::ast::{Association, OperatorType};

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Tokens,
    Diagnostics,
    Protocol,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "statements" => Some(Self::Syntax),
            "operators" | "ops" | "precedence" => Some(Self::Operators),
            "tokens" | "token" | "lexer" => Some(Self::Tokens),
            "diagnostics" | "errors" => Some(Self::Diagnostics),
            "protocol" | "messages" | "wire" => Some(Self::Protocol),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"RLANG DOCUMENTATION

rlang tokenizes and parses R source without ever giving up on it: broken code still
yields a syntax tree, with diagnostics pointing at what is wrong. It also encodes and
decodes the binary messages exchanged with an R host process.

DOCUMENTATION CATEGORIES

  syntax            Statements, scopes, keywords, and how line breaks end statements
  operators         Operator precedence and associativity, loosest first
  tokens            Token types and subtypes produced by the tokenizer
  diagnostics       Syntax errors and lexical anomalies the parser reports
  protocol          Wire layout of R host messages

COMMANDS

  rlang tokenize [FILE]       Token dump as JSON
  rlang parse [FILE]          Syntax tree and diagnostics as JSON
  rlang check [FILE]          Print diagnostics, exit 1 on errors
  rlang encode [FILE]         JSON message to hex frame
  rlang decode [FILE]         Hex frame to JSON message

Source is read from stdin when no file is given.
Run 'rlang doc <category>' for detailed documentation.
Set RLANG_LOG=debug to see what the tokenizer and parser are doing.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_str(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::Operators) => Ok(operators_doc()),
        Some(DocCategory::Tokens) => Ok(TOKENS_DOC.to_string()),
        Some(DocCategory::Diagnostics) => Ok(DIAGNOSTICS_DOC.to_string()),
        Some(DocCategory::Protocol) => Ok(PROTOCOL_DOC.to_string()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn operators_doc() -> String {
    let mut doc = String::from(
        "OPERATORS\n\nLoosest binding first. Operators of equal precedence group in the\n\
         direction shown.\n\n  PREC  OPERATOR  KIND    GROUPS\n",
    );
    for op in OperatorType::ALL {
        let kind = if op.is_unary() { "unary" } else { "binary" };
        let groups = match op.association() {
            Association::Left => "left",
            Association::Right => "right",
        };
        let _ = writeln!(
            doc,
            "  {:>4}  {:<8}  {:<6}  {}",
            op.precedence(),
            op.symbol(),
            kind,
            groups
        );
    }
    doc.push_str(
        "\nNOTES\n  -2^2 is -(2^2): negation binds looser than ^.\n  \
         $, @, :: and ::: take a name or string on the right, not an expression.\n  \
         %op% covers %%, %/%, %in%, %>% and every other user operator.\n",
    );
    doc
}

const SYNTAX_DOC: &str = r#"SYNTAX

STATEMENTS
  A statement ends at ';', at a line break, or at the '}' closing its scope.
  Inside ( ), [ ] and [[ ]] line breaks do not end anything:

    x <- (1 +
          2)

  Two expressions on one line with nothing between them is an error:

    x y          Operator expected

SCOPES
  The whole file is the global scope. { } opens a braced scope. The body of
  if, for, while, repeat and function is a scope too, braced or a single
  statement.

  Each scope records the names assigned directly inside it:
    x <- 1, x = 1, 1 -> x, x := 1     variable x
    f <- function(a) a                 function f
    for (i in xs) ...                  variable i
  The first assignment of a name is its declaration. Super assignments
  (<<- and ->>) declare nothing. Names resolve outward through enclosing scopes.

KEYWORDS
  if (cond) body [else body]
  for (name in expr) body
  while (cond) body
  repeat body
  function(params) body       \(params) body is the same thing
  break, next

  At top level an 'else' must be on the same line as the end of the 'if' body.
  Inside braces it may start a new line.

ARGUMENTS
  f(a, name = value, ...)     positional, named, and ellipsis arguments
  x[, 1]                      an empty slot is a missing argument
  x[[i]]                      double brackets
"#;

const TOKENS_DOC: &str = r#"TOKENS

TYPES
  Identifier      names, including `quoted names`
  Keyword         if else repeat while function \ for in next break
  Logical         TRUE FALSE
  Null            NULL
  Missing         NA NA_integer_ NA_real_ NA_character_ NA_complex_
  Number          1 1.5 1e-3 0x1F 5L Inf NaN
  Complex         2i
  String          "double", 'single', r"(raw)"
  Operator        <- + %in% and the rest (see 'rlang doc operators')
  Comment         # to end of line
  Brackets        ( ) [ ] [[ ]] { }
  Punctuation     , ; ...
  Unknown         anything else

SUBTYPES
  BuiltinConstant     pi, LETTERS, letters, month.name, month.abb, T, F
  BuiltinFunction     c, list, print, function names from base R
  Integer             5L
  Hexadecimal         0x1F
  RawString           r"(...)", R"[...]", r"--{...}--"
  QuotedIdentifier    `my name`
  Infinity / NaN      Inf, NaN

ANOMALIES
  A malformed lexeme still becomes a token covering what was read, tagged
  with an anomaly: unterminated string or `name`, unterminated %op%,
  invalid escape, malformed number (1e, 0x, 12abc), unknown character.
"#;

const DIAGNOSTICS_DOC: &str = r#"DIAGNOSTICS

Every diagnostic has a range, a message, and a severity. Parsing never stops
at an error: after reporting it, the parser skips ahead to a ';', a statement
keyword, or a name at the start of a line, and carries on.

SYNTAX ERRORS
  Unexpected token            a token with no place where it is
  Operator expected           x y
  Identifier expected         for (1 in x), function(1), x$1
  Expression expected         if () x
  Right operand expected      x <-
  '(' expected                if x
  ')' expected                f(1, 2
  ']' expected                x[1
  ']]' expected               x[[1
  '}' expected                { x      reported at the end of input
  'in' expected               for (i x)
  Expression nested too deeply
                              more than 100 levels of brackets, operators or
                              keyword constructs; the nested part is skipped

LEXICAL ANOMALIES
  Unterminated string literal
  Unterminated quoted identifier
  Unterminated special operator
  Invalid escape sequence
  Malformed numeric literal
  Unexpected character

'rlang check --no-lexical' reports syntax errors only.
"#;

const PROTOCOL_DOC: &str = r#"PROTOCOL

FRAME LAYOUT
  u64 id (little endian)
  u64 request id (little endian), 0 unless the message answers a request
  name, ASCII, followed by a 0x00 byte
  arguments, a UTF-8 JSON array, followed by a 0x00 byte
  blob, every remaining byte

  The blob has no length of its own. One frame must hold exactly one message,
  so the transport is responsible for framing.

JSON FORM (rlang encode / rlang decode)
  {
    "id": 1,
    "request_id": 2,
    "name": "eval",
    "args": [1, 2, 3],
    "blob": "aabb"
  }

  'blob' is hex. 'id', 'request_id', 'args' and 'blob' may be left out.

MALFORMED FRAMES
  truncated header, missing name or argument terminator, empty or non-ASCII
  name, arguments that are not UTF-8, not JSON, or not a JSON array.
"#;
