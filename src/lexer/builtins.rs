use crate::ast::tokens::TokenSubType;

const CONSTANTS: &[&str] = &["T", "F", "pi", "LETTERS", "letters", "month.name", "month.abb"];

const FUNCTIONS: &[&str] = &[
    "abs", "all", "any", "apply", "as.character", "as.integer", "as.numeric", "assign", "c",
    "cat", "cbind", "data.frame", "exists", "exp", "factor", "format", "get", "getwd",
    "identical", "ifelse", "invisible", "is.na", "is.null", "lapply", "length", "levels",
    "library", "list", "log", "matrix", "max", "mean", "message", "min", "names", "nchar",
    "ncol", "new", "nrow", "order", "paste", "paste0", "print", "rbind", "rep", "require",
    "return", "rev", "round", "sapply", "seq", "setwd", "sort", "source", "sprintf", "sqrt",
    "stop", "substr", "sum", "switch", "tolower", "toupper", "unique", "vapply", "vector",
    "warning", "which",
];

/// Classifies a plain identifier as a built-in constant or function name.
pub fn classify(name: &str) -> TokenSubType {
    if CONSTANTS.contains(&name) {
        TokenSubType::BuiltinConstant
    } else if FUNCTIONS.binary_search(&name).is_ok() {
        TokenSubType::BuiltinFunction
    } else {
        TokenSubType::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_table_is_sorted() {
        assert!(FUNCTIONS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("pi"), TokenSubType::BuiltinConstant);
        assert_eq!(classify("library"), TokenSubType::BuiltinFunction);
        assert_eq!(classify("my_fn"), TokenSubType::None);
    }
}
