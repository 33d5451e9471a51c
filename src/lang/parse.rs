use super::admit::Admit;
use super::token::{Kind, Token};
use super::{Error, Position};
use crate::error;
use crate::mach::{Address, Link, Opcode, Program, SymbolTable, ValueType};
use std::collections::HashSet;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// Parser switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Every variable must exist in the symbol table or be declared
    /// earlier in the same text.
    pub strict: bool,
    /// The text must contain at least one assignment or if statement.
    pub strict_statement: bool,
    /// Terminate the program with an end-of-code marker.
    pub code_end: bool,
}

impl Default for Mode {
    fn default() -> Mode {
        Mode {
            strict: false,
            strict_statement: false,
            code_end: true,
        }
    }
}

const STATEMENT_FOLLOW: &[Kind] = &[
    Kind::Semicolon,
    Kind::EndText,
    Kind::ClearModified,
    Kind::Declare,
    Kind::Label,
    Kind::Literal,
    Kind::Variable,
    Kind::If,
    Kind::LParen,
    Kind::Numeral,
];

const EXPRESSION: &[Kind] = &[
    Kind::LParen,
    Kind::Minus,
    Kind::Plus,
    Kind::Numeral,
    Kind::Variable,
    Kind::Literal,
    Kind::Not,
    Kind::Null,
];

const MATH: &[Kind] = &[Kind::Asterisk, Kind::Divide];

const ADD: &[Kind] = &[Kind::Minus, Kind::Plus];

const RELATION: &[Kind] = &[
    Kind::Less,
    Kind::LessEqual,
    Kind::Greater,
    Kind::GreaterEqual,
    Kind::NotEqual,
    Kind::EqualEqual,
];

const LOGICAL: &[Kind] = &[Kind::AndAnd, Kind::OrOr];

fn operator(kind: Kind) -> Option<Opcode> {
    Some(match kind {
        Kind::Less => Opcode::Less,
        Kind::LessEqual => Opcode::LessEqual,
        Kind::Greater => Opcode::Greater,
        Kind::GreaterEqual => Opcode::GreaterEqual,
        Kind::NotEqual => Opcode::NotEqual,
        Kind::EqualEqual => Opcode::EqualEqual,
        Kind::AndAnd => Opcode::AndAnd,
        Kind::OrOr => Opcode::OrOr,
        Kind::Asterisk => Opcode::Multiply,
        Kind::Divide => Opcode::Divide,
        Kind::Plus => Opcode::Add,
        Kind::Minus => Opcode::Subtract,
        _ => return None,
    })
}

/// ## Parser and code generator
///
/// Recursive descent straight to bytecode. Rules register the token
/// kinds they can accept in an [`Admit`] set before descending. On a
/// syntax error the first message is latched and tokens are skipped
/// until one is admissible again.

pub fn parse(tokens: Vec<Token>, symbols: &SymbolTable, mode: &Mode) -> Result<Program> {
    let mut tokens = tokens;
    if tokens.last().map(Token::kind) != Some(Kind::EndText) {
        tokens.push(Token::Symbol(Kind::EndText));
    }
    Parser {
        symbols,
        mode: *mode,
        declared: HashSet::new(),
        tokens,
        pos: 0,
        admit: Admit::new(),
        program: Program::new(),
        link: Link::new(),
        line: 0,
        statement: 0,
        symbol: -1,
        error: None,
    }
    .parse()
}

struct Parser<'a> {
    symbols: &'a SymbolTable,
    mode: Mode,
    declared: HashSet<String>,
    tokens: Vec<Token>,
    pos: usize,
    admit: Admit,
    program: Program,
    link: Link,
    line: usize,
    statement: usize,
    symbol: isize,
    error: Option<Error>,
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Result<Program> {
        self.settle();
        self.within(&[Kind::EndText, Kind::ClearModified], |p| {
            while p.error.is_none() && !p.at(Kind::EndText) {
                let before = p.pos;
                p.statement();
                if p.pos == before {
                    p.unexpected();
                    break;
                }
            }
        });
        if self.mode.code_end {
            self.emit(Opcode::CodeEnd);
        }
        if self.mode.strict_statement && self.statement == 0 {
            self.latch("The input document does not contain any valid statements.");
        }
        debug_assert!(self.error.is_some() || self.admit.is_empty());
        if let Some(error) = self.error {
            return Err(error);
        }
        self.link.link(&mut self.program)?;
        Ok(self.program)
    }

    // *** Token management

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> Kind {
        self.current().kind()
    }

    fn at(&self, kind: Kind) -> bool {
        self.kind() == kind
    }

    fn at_any(&self, kinds: &[Kind]) -> bool {
        kinds.contains(&self.kind())
    }

    fn at_expression(&self) -> bool {
        self.at_any(EXPRESSION) || self.kind().is_function()
    }

    fn peek_kind(&self) -> Kind {
        self.tokens[self.pos + 1..]
            .iter()
            .map(Token::kind)
            .find(|k| *k != Kind::Newline)
            .unwrap_or(Kind::EndText)
    }

    fn text(&self) -> String {
        match self.current() {
            Token::Literal(s) | Token::Variable(s) | Token::Label(s) | Token::Unknown(s) => {
                s.clone()
            }
            other => other.to_string(),
        }
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
            self.settle();
        }
    }

    /// Step over newlines to the next real token.
    fn settle(&mut self) {
        while self.at(Kind::Newline) && self.pos + 1 < self.tokens.len() {
            self.pos += 1;
            self.line += 1;
            self.symbol = -1;
        }
        self.symbol += 1;
        if let Token::Unknown(s) = self.current() {
            let message = format!("Unexpected Symbol '{}'", s);
            self.latch(&message);
        }
    }

    fn within<F: FnOnce(&mut Self)>(&mut self, kinds: &[Kind], f: F) {
        self.admit.insert(kinds);
        f(self);
        self.admit.remove(kinds);
    }

    // *** Errors

    fn position(&self) -> Position {
        Position {
            line: self.line,
            statement: self.statement,
            symbol: self.symbol,
        }
    }

    fn latch(&mut self, message: &str) {
        if self.error.is_none() {
            let error = error!(SyntaxError, self.position(); message);
            trace!(%error, "latched");
            self.error = Some(error);
        }
    }

    fn recover(&mut self) {
        while !self.admit.contains(self.kind()) && !self.at(Kind::EndText) {
            self.advance();
        }
    }

    fn unexpected(&mut self) {
        let message = format!("Unexpected Symbol '{}'", self.current());
        self.latch(&message);
        self.recover();
    }

    fn syntax_check(&mut self) {
        if !self.admit.contains(self.kind()) {
            self.unexpected();
        }
    }

    fn expect(&mut self, kind: Kind) {
        if self.at(kind) {
            self.advance();
        } else {
            self.latch(&format!("Expected Symbol {}", kind));
            self.recover();
        }
    }

    fn emit(&mut self, op: Opcode) -> Address {
        let addr = self.program.emit(&op);
        trace!(offset = addr, %op, "emit");
        addr
    }

    // *** Statements

    fn statement(&mut self) {
        self.within(&[Kind::Semicolon], |p| {
            match p.kind() {
                Kind::ClearModified => {
                    p.emit(Opcode::ClearModified);
                    p.advance();
                }
                Kind::Declare => p.declaration(),
                Kind::Label => p.unexpected(),
                Kind::Literal => {
                    let s = p.text();
                    p.emit(Opcode::Push(ValueType::String, s));
                    p.advance();
                }
                Kind::Variable => {
                    let assignment = p.peek_kind() == Kind::Equal;
                    p.variable_access();
                    if assignment {
                        p.assignment();
                        p.statement += 1;
                    }
                }
                Kind::If => {
                    p.if_statement();
                    p.statement += 1;
                }
                Kind::LParen | Kind::Numeral => p.within(STATEMENT_FOLLOW, |p| p.condition()),
                _ => p.syntax_check(),
            }
            p.within(STATEMENT_FOLLOW, |p| {
                if p.at(Kind::Semicolon) {
                    p.advance();
                }
                p.syntax_check();
            });
        });
    }

    fn declaration(&mut self) {
        self.advance();
        self.within(&[Kind::Variable, Kind::Comma], |p| {
            while p.error.is_none() {
                if !p.at(Kind::Variable) {
                    p.expect(Kind::Variable);
                    break;
                }
                let name = p.text();
                p.emit(Opcode::Declare(ValueType::String, name.clone()));
                p.declared.insert(name);
                p.advance();
                if !p.at(Kind::Comma) {
                    break;
                }
                p.advance();
            }
        });
    }

    fn variable_access(&mut self) {
        let name = self.text();
        if self.mode.strict && !self.symbols.contains(&name) && !self.declared.contains(&name) {
            self.latch(&format!("Undefined symbol {}", name));
        } else {
            self.emit(Opcode::VariableAccess(name));
        }
        self.advance();
    }

    fn assignment(&mut self) {
        self.expect(Kind::Equal);
        if self.at_expression() {
            self.condition();
            self.emit(Opcode::Assign);
        } else {
            self.unexpected();
        }
    }

    fn if_statement(&mut self) {
        self.advance();
        self.expect(Kind::LParen);
        self.within(&[Kind::RParen], |p| p.condition());
        self.expect(Kind::RParen);
        self.branches();
    }

    /// ```text
    ///         condition
    ///         DEFADDR(on_false)
    ///         then branch
    ///         GOTO(join)
    /// on_false:
    ///         else branch
    /// join:   NOOP
    /// ```
    fn branches(&mut self) {
        let on_false = self.link.label();
        let join = self.link.label();
        let site = self.emit(Opcode::Defaddr(0));
        self.link.reserve(site, on_false);
        self.within(&[Kind::Else], |p| match p.kind() {
            Kind::Then => {
                p.advance();
                p.branch();
            }
            _ => p.branch(),
        });
        let site = self.emit(Opcode::Goto(0));
        self.link.reserve(site, join);
        self.link.resolve(on_false, self.program.len());
        if self.at(Kind::Else) {
            self.advance();
            self.branch();
        }
        self.link.resolve(join, self.program.len());
        self.emit(Opcode::Noop);
    }

    fn branch(&mut self) {
        if self.at(Kind::LCurly) {
            self.block();
        } else {
            self.statement();
        }
    }

    fn block(&mut self) {
        self.expect(Kind::LCurly);
        self.within(&[Kind::RCurly], |p| {
            while p.error.is_none() && !p.at(Kind::RCurly) && !p.at(Kind::EndText) {
                let before = p.pos;
                p.statement();
                if p.pos == before {
                    p.unexpected();
                    break;
                }
            }
        });
        self.expect(Kind::RCurly);
    }

    // *** Expressions

    fn expression(&mut self) {
        while self.error.is_none() && self.at_expression() {
            self.simple_expression();
        }
    }

    fn simple_expression(&mut self) {
        self.within(ADD, |p| {
            match p.kind() {
                Kind::Minus => {
                    p.advance();
                    p.factor();
                    p.emit(Opcode::Negate);
                    p.simple_term();
                }
                Kind::Not => {
                    p.advance();
                    p.factor();
                    p.emit(Opcode::Not);
                    p.simple_term();
                }
                Kind::Plus => {
                    p.advance();
                    p.term();
                }
                _ => p.term(),
            }
            while p.error.is_none() && p.at_any(ADD) {
                let op = operator(p.kind());
                p.advance();
                p.term();
                if let Some(op) = op {
                    p.emit(op);
                }
            }
        });
    }

    fn term(&mut self) {
        self.within(MATH, |p| {
            p.factor();
            p.simple_term();
        });
    }

    fn simple_term(&mut self) {
        while self.error.is_none() && self.at_any(MATH) {
            let op = operator(self.kind());
            self.advance();
            self.factor();
            if let Some(op) = op {
                self.emit(op);
            }
        }
    }

    fn factor(&mut self) {
        match self.current().clone() {
            Token::Numeral(n) => {
                self.emit(Opcode::Push(ValueType::Double, n.to_string()));
                self.advance();
            }
            Token::Variable(_) => {
                self.variable_access();
                match self.kind() {
                    Kind::In => self.infix_in(),
                    Kind::Like => self.infix_like(),
                    _ => {}
                }
            }
            Token::Literal(s) => {
                self.emit(Opcode::Push(ValueType::String, s));
                self.advance();
            }
            Token::Symbol(Kind::Null) => {
                self.emit(Opcode::Push(ValueType::Null, "null".to_string()));
                self.advance();
            }
            Token::Symbol(Kind::LParen) => {
                self.advance();
                self.within(&[Kind::RParen], |p| p.condition());
                self.expect(Kind::RParen);
            }
            Token::Symbol(Kind::Minus) => self.simple_expression(),
            Token::Symbol(kind) if kind.is_function() => self.function_call(),
            _ => self.unexpected(),
        }
    }

    /// An expression followed by any comparison and logical chain.
    fn condition(&mut self) {
        self.within(RELATION, |p| p.within(LOGICAL, |p| p.expression()));
        self.relation();
    }

    /// Comparisons bind tighter than `&&` and `||`. Within each level
    /// operators chain left to right, each emitted once its right
    /// operand is complete.
    fn relation(&mut self) {
        self.within(LOGICAL, |p| p.comparisons());
        while self.error.is_none() && self.at_any(LOGICAL) {
            let op = operator(self.kind());
            self.advance();
            self.within(LOGICAL, |p| {
                p.operand();
                p.comparisons();
            });
            if let Some(op) = op {
                self.emit(op);
            }
        }
    }

    fn comparisons(&mut self) {
        while self.error.is_none() && self.at_any(RELATION) {
            let op = operator(self.kind());
            self.advance();
            self.within(RELATION, |p| p.operand());
            if let Some(op) = op {
                self.emit(op);
            }
        }
    }

    fn operand(&mut self) {
        if self.at_expression() {
            self.simple_expression();
        } else {
            self.unexpected();
        }
    }

    // *** Builtin functions

    fn function_call(&mut self) {
        let kind = self.kind();
        let name = self
            .symbols
            .find(kind)
            .unwrap_or_else(|| kind.describe())
            .to_string();
        self.advance();
        let argc = match kind {
            Kind::Abs | Kind::Sqrt | Kind::Trim | Kind::Upper | Kind::Lower => self.arguments(1),
            Kind::Pow | Kind::Convert | Kind::Like => self.arguments(2),
            Kind::Substring | Kind::GetPrice => self.arguments(3),
            _ => self.variadic(),
        };
        self.emit(Opcode::Call(name, argc));
    }

    /// `name in (a, b, c)` tests the variable against the list.
    fn infix_in(&mut self) {
        let name = self.symbols.find(Kind::In).unwrap_or("in").to_string();
        self.advance();
        let argc = self.variadic();
        self.emit(Opcode::Call(name, argc + 1));
    }

    /// `name like 'pattern'`
    fn infix_like(&mut self) {
        let name = self.symbols.find(Kind::Like).unwrap_or("like").to_string();
        self.advance();
        match self.kind() {
            Kind::Literal => {
                let s = self.text();
                self.emit(Opcode::Push(ValueType::String, s));
                self.advance();
            }
            Kind::Variable => self.variable_access(),
            _ => {
                self.unexpected();
                return;
            }
        }
        self.emit(Opcode::Call(name, 2));
    }

    fn arguments(&mut self, count: usize) -> usize {
        self.expect(Kind::LParen);
        for n in 0..count {
            if self.error.is_some() {
                break;
            }
            let separator = if n + 1 == count {
                Kind::RParen
            } else {
                Kind::Comma
            };
            self.within(&[separator], |p| p.argument());
            self.expect(separator);
        }
        count
    }

    fn variadic(&mut self) -> usize {
        self.expect(Kind::LParen);
        let mut argc = 0;
        self.within(&[Kind::Comma, Kind::RParen], |p| {
            while p.error.is_none() && !p.at(Kind::RParen) && !p.at(Kind::EndText) {
                p.argument();
                argc += 1;
                if !p.at(Kind::Comma) {
                    break;
                }
                p.advance();
            }
        });
        self.expect(Kind::RParen);
        argc
    }

    fn argument(&mut self) {
        if self.at_expression() {
            self.condition();
        } else {
            self.unexpected();
        }
    }
}
