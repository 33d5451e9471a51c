/// Coordinates of a diagnostic: zero based line, the number of
/// statements completed before it, and the symbol index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub statement: usize,
    pub symbol: isize,
}

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    position: Option<Position>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $pos:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).at($pos)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $pos:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .at($pos)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            position: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn at(&self, position: Position) -> Error {
        debug_assert!(self.position.is_none());
        Error {
            code: self.code,
            position: Some(position),
            message: self.message.clone(),
        }
    }

    pub fn message(&self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            position: self.position,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ScanError = 1,
    SyntaxError = 2,
    RuntimeError = 3,
    UndeclaredVariable = 4,
    AlreadyDeclared = 5,
    StackUnderflow = 6,
    OutOfMemory = 7,
    MalformedCode = 8,
    InternalError = 51,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            ErrorCode::ScanError => "SCAN ERROR",
            ErrorCode::SyntaxError => "SYNTAX ERROR",
            ErrorCode::RuntimeError => "RUNTIME ERROR",
            ErrorCode::UndeclaredVariable => "UNDECLARED VARIABLE",
            ErrorCode::AlreadyDeclared => "ALREADY DECLARED",
            ErrorCode::StackUnderflow => "STACK UNDERFLOW",
            ErrorCode::OutOfMemory => "OUT OF MEMORY",
            ErrorCode::MalformedCode => "MALFORMED CODE",
            ErrorCode::InternalError => "INTERNAL ERROR",
        };
        let mut suffix = String::new();
        if let Some(pos) = self.position {
            suffix.push_str(&format!(
                " AT LINE {} STATEMENT {} SYMBOL {}",
                pos.line, pos.statement, pos.symbol
            ));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        write!(f, "{}{}", code_str, suffix)
    }
}
