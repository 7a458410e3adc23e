use std::fmt;

/// Tokens produced by the lexer.
///
/// `Indent`, `Dedent` and `Newline` are synthetic layout tokens; `Char`
/// carries any single byte that no other rule claims (the parser decides
/// whether it is meaningful). Equality is structural: same variant and, for
/// valued kinds, equal payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(i32),
    Id(String),
    String(String),
    Char(u8),

    // Keywords
    Class,
    Return,
    If,
    Else,
    Def,
    Print,
    And,
    Or,
    Not,
    None,
    True,
    False,

    // Two-character operators
    Eq,
    NotEq,
    LessOrEq,
    GreaterOrEq,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl Token {
    /// Keyword table consulted for identifier-shaped lexemes.
    pub(crate) fn keyword(lexeme: &str) -> Option<Token> {
        let token = match lexeme {
            "class" => Token::Class,
            "return" => Token::Return,
            "if" => Token::If,
            "else" => Token::Else,
            "def" => Token::Def,
            "print" => Token::Print,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "None" => Token::None,
            "True" => Token::True,
            "False" => Token::False,
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "Number{{{value}}}"),
            Token::Id(name) => write!(f, "Id{{{name}}}"),
            Token::String(value) => write!(f, "String{{{value}}}"),
            Token::Char(byte) => write!(f, "Char{{{}}}", char::from(*byte)),
            Token::Class => f.write_str("class"),
            Token::Return => f.write_str("return"),
            Token::If => f.write_str("if"),
            Token::Else => f.write_str("else"),
            Token::Def => f.write_str("def"),
            Token::Print => f.write_str("print"),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::None => f.write_str("None"),
            Token::True => f.write_str("True"),
            Token::False => f.write_str("False"),
            Token::Eq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::LessOrEq => f.write_str("<="),
            Token::GreaterOrEq => f.write_str(">="),
            Token::Newline => f.write_str("Newline"),
            Token::Indent => f.write_str("Indent"),
            Token::Dedent => f.write_str("Dedent"),
            Token::Eof => f.write_str("Eof"),
        }
    }
}
