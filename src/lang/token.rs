/// ## Token kinds
///
/// Every token the scanner produces has exactly one kind. Keywords,
/// builtin functions and the directive are identified by kind alone;
/// the parser never compares their spelling.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Unknown,
    Newline,
    EndText,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LCurly,
    RCurly,
    Asterisk,
    Divide,
    Plus,
    Minus,
    Not,
    Equal,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NotEqual,
    AndAnd,
    OrOr,
    Numeral,
    Literal,
    Variable,
    Label,
    // Keywords
    Declare,
    If,
    Then,
    Else,
    Null,
    // Directives
    ClearModified,
    // Builtin functions
    Abs,
    Pow,
    Sqrt,
    Convert,
    Substring,
    GetPrice,
    In,
    Like,
    Trim,
    Upper,
    Lower,
    IsNull,
}

impl Kind {
    pub const FUNCTIONS: [Kind; 12] = [
        Kind::Abs,
        Kind::Pow,
        Kind::Sqrt,
        Kind::Convert,
        Kind::Substring,
        Kind::GetPrice,
        Kind::In,
        Kind::Like,
        Kind::Trim,
        Kind::Upper,
        Kind::Lower,
        Kind::IsNull,
    ];

    pub fn is_function(self) -> bool {
        Kind::FUNCTIONS.contains(&self)
    }

    pub fn describe(self) -> &'static str {
        use Kind::*;
        match self {
            Unknown => "unknown symbol",
            Newline => "newline",
            EndText => "end of text",
            Semicolon => ";",
            Comma => ",",
            LBracket => "[",
            RBracket => "]",
            LParen => "(",
            RParen => ")",
            LCurly => "{",
            RCurly => "}",
            Asterisk => "*",
            Divide => "/",
            Plus => "+",
            Minus => "-",
            Not => "!",
            Equal => "=",
            EqualEqual => "==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            NotEqual => "<>",
            AndAnd => "&&",
            OrOr => "||",
            Numeral => "numeral",
            Literal => "literal",
            Variable => "variable",
            Label => "label",
            Declare => "declare",
            If => "if",
            Then => "then",
            Else => "else",
            Null => "null",
            ClearModified => "#directive_clear_modified",
            Abs => "abs",
            Pow => "pow",
            Sqrt => "sqrt",
            Convert => "convert",
            Substring => "substring",
            GetPrice => "getprice",
            In => "in",
            Like => "like",
            Trim => "trim",
            Upper => "upper",
            Lower => "lower",
            IsNull => "isnull",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A classified lexical unit with its payload, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Symbol(Kind),
    Numeral(f64),
    Literal(String),
    Variable(String),
    Label(String),
    Unknown(String),
}

impl Token {
    pub fn kind(&self) -> Kind {
        match self {
            Token::Symbol(kind) => *kind,
            Token::Numeral(_) => Kind::Numeral,
            Token::Literal(_) => Kind::Literal,
            Token::Variable(_) => Kind::Variable,
            Token::Label(_) => Kind::Label,
            Token::Unknown(_) => Kind::Unknown,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Symbol(kind) => write!(f, "{}", kind),
            Numeral(n) => write!(f, "{}", n),
            Literal(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Variable(s) => write!(f, "{}", s),
            Label(s) => write!(f, "{}:", s),
            Unknown(s) => write!(f, "{}", s),
        }
    }
}
