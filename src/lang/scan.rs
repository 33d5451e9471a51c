use super::token::{Kind, Token};
use super::{Error, Position};
use crate::error;
use crate::mach::{Role, SymbolTable};
use std::collections::HashSet;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// ## Scanner
///
/// Converts rule text into tokens. Words are classified against the
/// symbol table. In non-strict mode an unknown word becomes a new user
/// variable as a side effect, unless the text declares it; in strict
/// mode it is passed through and left for the parser to reject.

pub fn scan(text: &str, symbols: &mut SymbolTable, strict: bool) -> Result<Vec<Token>> {
    let mut scanner = Scanner {
        chars: text.chars().peekable(),
        symbols,
        strict,
        line: 0,
        symbol: -1,
        tokens: vec![],
        declared: HashSet::new(),
    };
    scanner.run()?;
    Ok(scanner.tokens)
}

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_word_end(c: char) -> bool {
    match c {
        ' ' | '\t' | '\r' | '\n' => true,
        '}' | '{' | '<' | '>' | ';' | ',' | '[' | ']' | ':' => true,
        '*' | '/' | '+' | '-' | '(' | ')' | '=' => true,
        '\'' | '!' | '&' | '|' => true,
        _ => false,
    }
}

fn is_numeral_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '.'
}

fn binary(digits: &str) -> Option<f64> {
    if digits.is_empty() || !digits.chars().all(|c| c == '0' || c == '1') {
        return None;
    }
    u64::from_str_radix(digits, 2).ok().map(|n| n as f64)
}

fn hex(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok().map(|n| n as f64)
}

struct Scanner<'a, 't> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    symbols: &'t mut SymbolTable,
    strict: bool,
    line: usize,
    symbol: isize,
    tokens: Vec<Token>,
    declared: HashSet<String>,
}

impl<'a, 't> Scanner<'a, 't> {
    fn run(&mut self) -> Result<()> {
        loop {
            while let Some(pk) = self.chars.peek() {
                if !is_whitespace(*pk) {
                    break;
                }
                self.chars.next();
            }
            let pk = match self.chars.peek() {
                Some(pk) => *pk,
                None => break,
            };
            if pk.is_ascii_digit() || pk == '.' {
                self.numeral();
                continue;
            }
            if pk.is_alphabetic() {
                self.word();
                continue;
            }
            self.chars.next();
            match pk {
                '\r' => {
                    if let Some('\n') = self.chars.peek() {
                        self.chars.next();
                    }
                    self.newline();
                }
                '\n' => self.newline(),
                ';' => self.emit(Token::Symbol(Kind::Semicolon)),
                ',' => self.emit(Token::Symbol(Kind::Comma)),
                '[' => self.emit(Token::Symbol(Kind::LBracket)),
                ']' => self.emit(Token::Symbol(Kind::RBracket)),
                '*' => self.emit(Token::Symbol(Kind::Asterisk)),
                '/' => self.emit(Token::Symbol(Kind::Divide)),
                '+' => self.emit(Token::Symbol(Kind::Plus)),
                '-' => self.emit(Token::Symbol(Kind::Minus)),
                '(' => self.emit(Token::Symbol(Kind::LParen)),
                ')' => self.emit(Token::Symbol(Kind::RParen)),
                '!' => self.emit(Token::Symbol(Kind::Not)),
                '{' => self.emit(Token::Symbol(Kind::LCurly)),
                '}' => self.emit(Token::Symbol(Kind::RCurly)),
                '\'' => self.literal(),
                '=' => self.pair('=', Kind::EqualEqual, Kind::Equal),
                '>' => self.pair('=', Kind::GreaterEqual, Kind::Greater),
                '<' => {
                    if self.chars.next_if_eq(&'>').is_some() {
                        self.emit(Token::Symbol(Kind::NotEqual));
                    } else {
                        self.pair('=', Kind::LessEqual, Kind::Less);
                    }
                }
                '&' => self.doubled('&', Kind::AndAnd),
                '|' => self.doubled('|', Kind::OrOr),
                '#' => {
                    if self.chars.next_if_eq(&'#').is_some() {
                        self.comment();
                    } else {
                        self.directive();
                    }
                }
                _ => {
                    self.symbol += 1;
                    let pos = Position {
                        line: self.line,
                        statement: 0,
                        symbol: self.symbol,
                    };
                    return Err(error!(ScanError, pos; &format!(
                        "Failed to scan the input document, unrecognized character '{}'",
                        pk
                    )));
                }
            }
        }
        self.emit(Token::Symbol(Kind::EndText));
        Ok(())
    }

    fn emit(&mut self, token: Token) {
        self.symbol += 1;
        trace!(line = self.line, symbol = self.symbol, %token, "scan");
        self.tokens.push(token);
    }

    fn newline(&mut self) {
        self.emit(Token::Symbol(Kind::Newline));
        self.line += 1;
        self.symbol = -1;
    }

    fn pair(&mut self, second: char, long: Kind, short: Kind) {
        if self.chars.next_if_eq(&second).is_some() {
            self.emit(Token::Symbol(long));
        } else {
            self.emit(Token::Symbol(short));
        }
    }

    fn doubled(&mut self, ch: char, kind: Kind) {
        if self.chars.next_if_eq(&ch).is_some() {
            self.emit(Token::Symbol(kind));
        } else {
            self.emit(Token::Unknown(ch.to_string()));
        }
    }

    fn comment(&mut self) {
        while let Some(pk) = self.chars.peek() {
            if *pk == '\r' || *pk == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    fn numeral(&mut self) {
        let mut s = String::new();
        while let Some(ch) = self.chars.next_if(|c| is_numeral_char(*c)) {
            s.push(ch);
        }
        if s.ends_with(|c| c == 'e' || c == 'E') {
            if let Some(sign) = self.chars.next_if(|c| *c == '+' || *c == '-') {
                s.push(sign);
                while let Some(ch) = self.chars.next_if(|c| c.is_ascii_digit()) {
                    s.push(ch);
                }
            }
        }
        let value = if let Some(h) = self.chars.next_if(|c| *c == 'h' || *c == 'H') {
            let value = hex(&s);
            s.push(h);
            value
        } else if s.ends_with(|c| c == 'b' || c == 'B') {
            binary(&s[..s.len() - 1])
        } else {
            s.parse::<f64>().ok()
        };
        match value {
            Some(n) => self.emit(Token::Numeral(n)),
            None => self.emit(Token::Unknown(s)),
        }
    }

    fn literal(&mut self) {
        let mut s = String::new();
        loop {
            match self.chars.peek() {
                None | Some('\r') | Some('\n') => break,
                Some('\'') => {
                    self.chars.next();
                    if self.chars.next_if_eq(&'\'').is_some() {
                        s.push('\'');
                        continue;
                    }
                    break;
                }
                Some(ch) => {
                    s.push(*ch);
                    self.chars.next();
                }
            }
        }
        self.emit(Token::Literal(s));
    }

    fn directive(&mut self) {
        let mut s = String::from("#");
        self.take_word(&mut s);
        self.classify(s);
    }

    fn word(&mut self) {
        let mut s = String::new();
        self.take_word(&mut s);
        if self.chars.next_if_eq(&':').is_some() {
            self.emit(Token::Label(s));
            return;
        }
        self.classify(s);
    }

    fn take_word(&mut self, s: &mut String) {
        while let Some(ch) = self.chars.next_if(|c| !is_word_end(*c)) {
            s.push(ch);
        }
    }

    fn classify(&mut self, s: String) {
        let token = match self.symbols.lookup(&s) {
            Some(symbol) => match symbol.role() {
                Role::Keyword | Role::Function | Role::Directive => Token::Symbol(symbol.kind()),
                Role::User | Role::UserDynamic => Token::Variable(symbol.name().to_string()),
            },
            None => {
                if self.declaring() {
                    self.declared.insert(s.clone());
                } else if !self.strict && !self.declared.contains(&s) {
                    self.symbols.add_user(&s);
                }
                Token::Variable(s)
            }
        };
        self.emit(token);
    }

    /// Inside a `declare a, b` list the names are left for the
    /// declaration to create at run time.
    fn declaring(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.kind(), Kind::Variable | Kind::Comma))
            .map_or(false, |t| t.kind() == Kind::Declare)
    }
}
