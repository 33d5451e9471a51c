use super::{Address, ValueType};

/// ## Virtual machine instruction set
///
/// The rule machine has no registers.
/// Every operation is performed on the stack.
///
/// For example: `total = price * 2` compiles to
/// `[VARIABLEACCESS(total), VARIABLEACCESS(price), PUSH(double, 2), MULTIPLY, ASSIGN]`
///
/// Each instruction is stored as a four byte tag followed by its operands.

#[derive(Clone, PartialEq)]
pub enum Opcode {
    // *** Stack manipulation
    /// Push a literal built from a type and its text.
    Push(ValueType, String),
    /// Push a reference to a named variable. Fails if undeclared.
    VariableAccess(String),
    /// Pop source, pop destination, store.
    Assign,
    /// Create a null variable of the given type.
    Declare(ValueType, String),

    // *** Branch control
    /// Pop a condition and branch to Address if false.
    Defaddr(Address),
    /// Unconditional branch to Address.
    Goto(Address),
    Noop,
    CodeEnd,

    // *** Directives
    ClearModified,

    // *** Expression operations
    Negate,
    Not,
    Multiply,
    Divide,
    Add,
    Subtract,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    AndAnd,
    OrOr,

    // *** Built-in functions
    /// Pop the argument count and dispatch by name.
    Call(String, usize),
}

impl Opcode {
    pub fn tag(&self) -> u32 {
        use Opcode::*;
        match self {
            ClearModified => 1,
            Declare(..) => 2,
            Defaddr(_) => 4,
            Goto(_) => 5,
            Add => 6,
            Subtract => 7,
            Multiply => 8,
            Divide => 9,
            Assign => 10,
            Negate => 11,
            Less => 12,
            LessEqual => 13,
            Greater => 14,
            GreaterEqual => 15,
            EqualEqual => 16,
            NotEqual => 17,
            VariableAccess(_) => 18,
            Call(..) => 19,
            Push(..) => 20,
            Not => 21,
            CodeEnd => 22,
            OrOr => 23,
            AndAnd => 24,
            Noop => 25,
        }
    }

    /// Instructions without operands, by tag.
    pub fn simple(tag: u32) -> Option<Opcode> {
        use Opcode::*;
        Some(match tag {
            1 => ClearModified,
            6 => Add,
            7 => Subtract,
            8 => Multiply,
            9 => Divide,
            10 => Assign,
            11 => Negate,
            12 => Less,
            13 => LessEqual,
            14 => Greater,
            15 => GreaterEqual,
            16 => EqualEqual,
            17 => NotEqual,
            21 => Not,
            22 => CodeEnd,
            23 => OrOr,
            24 => AndAnd,
            25 => Noop,
            _ => return None,
        })
    }

    /// Jump target, for the instructions that carry one.
    pub fn address(&self) -> Option<Address> {
        match self {
            Opcode::Defaddr(a) | Opcode::Goto(a) => Some(*a),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Push(t, s) => write!(f, "PUSH({}, {})", t, s),
            VariableAccess(s) => write!(f, "VARIABLEACCESS({})", s),
            Assign => write!(f, "ASSIGN"),
            Declare(t, s) => write!(f, "DECLARE({}, {})", t, s),

            Defaddr(a) => write!(f, "DEFADDR({})", a),
            Goto(a) => write!(f, "GOTO({})", a),
            Noop => write!(f, "NOOP"),
            CodeEnd => write!(f, "CODEEND"),

            ClearModified => write!(f, "CLEARMODIFIED"),

            Negate => write!(f, "NEGATE"),
            Not => write!(f, "NOT"),
            Multiply => write!(f, "MULTIPLY"),
            Divide => write!(f, "DIVIDE"),
            Add => write!(f, "ADD"),
            Subtract => write!(f, "SUBTRACT"),
            Less => write!(f, "LESS"),
            LessEqual => write!(f, "LESSEQUAL"),
            Greater => write!(f, "GREATER"),
            GreaterEqual => write!(f, "GREATEREQUAL"),
            EqualEqual => write!(f, "EQUALEQUAL"),
            NotEqual => write!(f, "NOTEQUAL"),
            AndAnd => write!(f, "ANDAND"),
            OrOr => write!(f, "OROR"),

            Call(s, n) => write!(f, "CALL({}, {})", s, n),
        }
    }
}
