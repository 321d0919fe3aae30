/// R operators, binary and unary.
///
/// Precedence follows R's `?Syntax` table. Higher values bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorType {
    // Namespace and member access
    /// `::`
    Namespace,
    /// `:::`
    NamespaceInternal,
    /// `$`
    ListIndex,
    /// `@`
    Slot,

    /// `^` (also written `**`)
    Exponent,
    /// Unary `-`
    UnaryMinus,
    /// Unary `+`
    UnaryPlus,
    /// `:`
    Sequence,
    /// `%%`, `%/%`, `%in%`, `%>%` and any other `%op%`
    Special,
    /// `|>`
    Pipe,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// Binary `+`
    Add,
    /// Binary `-`
    Subtract,

    // Comparison
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,

    /// `!`
    Not,
    /// `&`
    And,
    /// `&&`
    And2,
    /// `|`
    Or,
    /// `||`
    Or2,

    /// Binary `~`
    Formula,
    /// Unary `~`
    UnaryFormula,

    // Assignment
    /// `->`
    RightAssign,
    /// `->>`
    RightSuperAssign,
    /// `<-`
    LeftAssign,
    /// `<<-`
    LeftSuperAssign,
    /// `:=`
    ColonAssign,
    /// `=`
    Equals,

    /// Binary `?`
    Help,
    /// Unary `?`
    UnaryHelp,
}

/// Which way operators of equal precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Left,
    Right,
}

impl OperatorType {
    /// Every operator, loosest binding first.
    pub const ALL: &[OperatorType] = &[
        OperatorType::UnaryHelp,
        OperatorType::Help,
        OperatorType::Equals,
        OperatorType::LeftAssign,
        OperatorType::LeftSuperAssign,
        OperatorType::ColonAssign,
        OperatorType::RightAssign,
        OperatorType::RightSuperAssign,
        OperatorType::UnaryFormula,
        OperatorType::Formula,
        OperatorType::Or,
        OperatorType::Or2,
        OperatorType::And,
        OperatorType::And2,
        OperatorType::Not,
        OperatorType::LessThan,
        OperatorType::GreaterThan,
        OperatorType::LessOrEqual,
        OperatorType::GreaterOrEqual,
        OperatorType::Equal,
        OperatorType::NotEqual,
        OperatorType::Add,
        OperatorType::Subtract,
        OperatorType::Multiply,
        OperatorType::Divide,
        OperatorType::Special,
        OperatorType::Pipe,
        OperatorType::Sequence,
        OperatorType::UnaryMinus,
        OperatorType::UnaryPlus,
        OperatorType::Exponent,
        OperatorType::ListIndex,
        OperatorType::Slot,
        OperatorType::Namespace,
        OperatorType::NamespaceInternal,
    ];

    /// How the operator is written. [OperatorType::Special] stands for the whole `%op%` family.
    pub fn symbol(&self) -> &'static str {
        use OperatorType::*;
        match self {
            Namespace => "::",
            NamespaceInternal => ":::",
            ListIndex => "$",
            Slot => "@",
            Exponent => "^",
            UnaryMinus | Subtract => "-",
            UnaryPlus | Add => "+",
            Sequence => ":",
            Special => "%op%",
            Pipe => "|>",
            Multiply => "*",
            Divide => "/",
            LessThan => "<",
            GreaterThan => ">",
            LessOrEqual => "<=",
            GreaterOrEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Not => "!",
            And => "&",
            And2 => "&&",
            Or => "|",
            Or2 => "||",
            Formula | UnaryFormula => "~",
            RightAssign => "->",
            RightSuperAssign => "->>",
            LeftAssign => "<-",
            LeftSuperAssign => "<<-",
            ColonAssign => ":=",
            Equals => "=",
            Help | UnaryHelp => "?",
        }
    }

    /// Binary operator spelled `text`.
    pub fn binary_from_str(text: &str) -> Option<OperatorType> {
        use OperatorType::*;
        let op = match text {
            "::" => Namespace,
            ":::" => NamespaceInternal,
            "$" => ListIndex,
            "@" => Slot,
            "^" | "**" => Exponent,
            ":" => Sequence,
            "|>" => Pipe,
            "*" => Multiply,
            "/" => Divide,
            "+" => Add,
            "-" => Subtract,
            "<" => LessThan,
            ">" => GreaterThan,
            "<=" => LessOrEqual,
            ">=" => GreaterOrEqual,
            "==" => Equal,
            "!=" => NotEqual,
            "&" => And,
            "&&" => And2,
            "|" => Or,
            "||" => Or2,
            "~" => Formula,
            "->" => RightAssign,
            "->>" => RightSuperAssign,
            "<-" => LeftAssign,
            "<<-" => LeftSuperAssign,
            ":=" => ColonAssign,
            "=" => Equals,
            "?" => Help,
            s if s.len() >= 2 && s.starts_with('%') && s.ends_with('%') => Special,
            _ => return None,
        };
        Some(op)
    }

    /// Prefix operator spelled `text`.
    pub fn unary_from_str(text: &str) -> Option<OperatorType> {
        match text {
            "-" => Some(OperatorType::UnaryMinus),
            "+" => Some(OperatorType::UnaryPlus),
            "!" => Some(OperatorType::Not),
            "~" => Some(OperatorType::UnaryFormula),
            "?" => Some(OperatorType::UnaryHelp),
            _ => None,
        }
    }

    pub fn precedence(&self) -> u8 {
        use OperatorType::*;
        match self {
            UnaryHelp | Help => 1,
            Equals => 2,
            LeftAssign | LeftSuperAssign | ColonAssign => 3,
            RightAssign | RightSuperAssign => 4,
            Formula | UnaryFormula => 5,
            Or | Or2 => 6,
            And | And2 => 7,
            Not => 8,
            LessThan | GreaterThan | LessOrEqual | GreaterOrEqual | Equal | NotEqual => 9,
            Add | Subtract => 10,
            Multiply | Divide => 11,
            Special | Pipe => 12,
            Sequence => 13,
            UnaryMinus | UnaryPlus => 14,
            Exponent => 15,
            ListIndex | Slot => 16,
            Namespace | NamespaceInternal => 17,
        }
    }

    pub fn association(&self) -> Association {
        use OperatorType::*;
        match self {
            Exponent | Equals | LeftAssign | LeftSuperAssign | ColonAssign | RightAssign
            | RightSuperAssign => Association::Right,
            _ => Association::Left,
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            OperatorType::UnaryMinus
                | OperatorType::UnaryPlus
                | OperatorType::Not
                | OperatorType::UnaryFormula
                | OperatorType::UnaryHelp
        )
    }

    pub fn is_assignment(&self) -> bool {
        self.is_left_assignment() || self.is_right_assignment()
    }

    /// Assignments whose target is the left operand.
    pub fn is_left_assignment(&self) -> bool {
        matches!(
            self,
            OperatorType::LeftAssign
                | OperatorType::LeftSuperAssign
                | OperatorType::ColonAssign
                | OperatorType::Equals
        )
    }

    pub fn is_right_assignment(&self) -> bool {
        matches!(self, OperatorType::RightAssign | OperatorType::RightSuperAssign)
    }

    /// `$`, `@`, `::` and `:::` take a bare name on the right, never an expression.
    pub fn takes_name_operand(&self) -> bool {
        matches!(
            self,
            OperatorType::ListIndex
                | OperatorType::Slot
                | OperatorType::Namespace
                | OperatorType::NamespaceInternal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_minus_binds_looser_than_exponent() {
        assert!(OperatorType::Exponent.precedence() > OperatorType::UnaryMinus.precedence());
        assert!(OperatorType::UnaryMinus.precedence() > OperatorType::Sequence.precedence());
    }

    #[test]
    fn test_special_operators() {
        assert_eq!(OperatorType::binary_from_str("%in%"), Some(OperatorType::Special));
        assert_eq!(OperatorType::binary_from_str("%%"), Some(OperatorType::Special));
        assert_eq!(OperatorType::binary_from_str("%"), None);
        assert_eq!(OperatorType::binary_from_str("!"), None);
    }

    #[test]
    fn test_assignment_direction() {
        assert!(OperatorType::LeftSuperAssign.is_left_assignment());
        assert!(OperatorType::RightAssign.is_right_assignment());
        assert_eq!(OperatorType::LeftAssign.association(), Association::Right);
        assert_eq!(OperatorType::RightAssign.association(), Association::Right);
        assert_eq!(OperatorType::RightSuperAssign.association(), Association::Right);
    }

    #[test]
    fn test_all_is_ordered_by_precedence() {
        assert_eq!(OperatorType::ALL.len(), 35);
        assert!(OperatorType::ALL.windows(2).all(|w| w[0].precedence() <= w[1].precedence()));
    }

    #[test]
    fn test_symbols_parse_back() {
        for op in OperatorType::ALL.iter().filter(|op| !op.is_unary()) {
            if *op != OperatorType::Special {
                assert_eq!(OperatorType::binary_from_str(op.symbol()), Some(*op));
            }
        }
    }
}
