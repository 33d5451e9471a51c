use super::{Address, Function, Opcode, Operation, PriceSource, Program, Stack, SymbolTable, Value};
use crate::error;
use crate::lang::Error;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// An evaluation stack entry. Variables are resolved when used so that
/// assignment can write through to the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Literal(Value),
    Variable(String),
}

/// ## Virtual machine

pub struct Runtime {
    stack: Stack<Slot>,
    trace: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime {
            stack: Stack::new("EXPRESSION TOO COMPLEX"),
            trace: false,
        }
    }
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime::default()
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Values left on the stack by the last run.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn run(
        &mut self,
        program: &Program,
        symbols: &mut SymbolTable,
        prices: Option<&dyn PriceSource>,
    ) -> Result<()> {
        self.stack.clear();
        let mut pc: Address = 0;
        loop {
            if pc >= program.len() {
                return Err(error!(MalformedCode; "Program ended without end of code."));
            }
            let (op, next) = program.decode(pc)?;
            if self.trace {
                trace!(offset = pc, %op, "execute");
            }
            pc = next;
            match op {
                Opcode::Push(t, s) => {
                    let val = Value::from_parts(t, &s).unwrap_or_else(|| Value::Null(t));
                    self.stack.push(Slot::Literal(val))?;
                }
                Opcode::VariableAccess(name) => {
                    if !symbols.contains(&name) {
                        return Err(error!(UndeclaredVariable; &format!(
                            "The symbol '{}' must be declared prior to use.",
                            name
                        )));
                    }
                    self.stack.push(Slot::Variable(name))?;
                }
                Opcode::Declare(t, name) => symbols.declare(&name, t)?,
                Opcode::Assign => {
                    let source = self.stack.pop()?;
                    let destination = self.stack.pop()?;
                    let val = self.resolve(&source, symbols);
                    if let Slot::Variable(name) = destination {
                        symbols.assign(&name, val)?;
                    }
                }
                Opcode::Defaddr(addr) => {
                    let slot = self.stack.pop()?;
                    let cond = self.resolve(&slot, symbols);
                    let cond = if cond.is_null() {
                        false
                    } else {
                        match cond.to_bool() {
                            Some(b) => b,
                            None => {
                                return Err(error!(RuntimeError; &format!(
                                    "Condition '{}' is not a boolean.",
                                    cond
                                )));
                            }
                        }
                    };
                    if !cond {
                        pc = addr;
                    }
                }
                Opcode::Goto(addr) => pc = addr,
                Opcode::Noop => {}
                Opcode::CodeEnd => break,
                Opcode::ClearModified => symbols.clear_modified(),
                Opcode::Negate => self.unary(symbols, Operation::negate)?,
                Opcode::Not => self.unary(symbols, Operation::not)?,
                Opcode::Multiply => {
                    let (lhs, rhs) = self.pop_values(symbols)?;
                    self.stack
                        .push(Slot::Literal(Operation::multiply(&rhs, &lhs)))?;
                }
                Opcode::Divide => self.binary(symbols, Operation::divide)?,
                Opcode::Add => self.binary(symbols, Operation::add)?,
                Opcode::Subtract => self.binary(symbols, Operation::subtract)?,
                Opcode::Less => self.binary(symbols, Operation::less)?,
                Opcode::LessEqual => self.binary(symbols, Operation::less_equal)?,
                Opcode::Greater => self.binary(symbols, Operation::greater)?,
                Opcode::GreaterEqual => self.binary(symbols, Operation::greater_equal)?,
                Opcode::EqualEqual => self.binary(symbols, Operation::equal)?,
                Opcode::NotEqual => self.binary(symbols, Operation::not_equal)?,
                Opcode::AndAnd => self.binary(symbols, Operation::and)?,
                Opcode::OrOr => self.binary(symbols, Operation::or)?,
                Opcode::Call(name, argc) => {
                    let args: Vec<Value> = self
                        .stack
                        .pop_n(argc)?
                        .iter()
                        .map(|slot| self.resolve(slot, symbols))
                        .collect();
                    if let Some(val) = Function::call(&name, &args, prices) {
                        self.stack.push(Slot::Literal(val))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, slot: &Slot, symbols: &SymbolTable) -> Value {
        match slot {
            Slot::Literal(val) => val.clone(),
            Slot::Variable(name) => symbols.value(name).cloned().unwrap_or_default(),
        }
    }

    fn pop_values(&mut self, symbols: &SymbolTable) -> Result<(Value, Value)> {
        let (lhs, rhs) = self.stack.pop_2()?;
        Ok((self.resolve(&lhs, symbols), self.resolve(&rhs, symbols)))
    }

    fn binary(&mut self, symbols: &SymbolTable, op: fn(&Value, &Value) -> Value) -> Result<()> {
        let (lhs, rhs) = self.pop_values(symbols)?;
        self.stack.push(Slot::Literal(op(&lhs, &rhs)))
    }

    fn unary(&mut self, symbols: &SymbolTable, op: fn(&Value) -> Value) -> Result<()> {
        let slot = self.stack.pop()?;
        let val = self.resolve(&slot, symbols);
        self.stack.push(Slot::Literal(op(&val)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::ValueType;

    fn run(ops: &[Opcode], symbols: &mut SymbolTable) -> Result<()> {
        let mut program = Program::new();
        for op in ops {
            program.emit(op);
        }
        program.emit(&Opcode::CodeEnd);
        Runtime::new().run(&program, symbols, None)
    }

    fn push(n: &str) -> Opcode {
        Opcode::Push(ValueType::Double, n.to_string())
    }

    #[test]
    fn test_declare_assign() {
        let mut symbols = SymbolTable::new();
        run(
            &[
                Opcode::Declare(ValueType::String, "x".into()),
                Opcode::VariableAccess("x".into()),
                push("6"),
                push("4"),
                Opcode::Subtract,
                Opcode::Assign,
            ],
            &mut symbols,
        )
        .unwrap();
        assert_eq!(symbols.value("x"), Some(&Value::Float(2.0)));
        assert!(symbols.get("x").unwrap().is_modified());
    }

    #[test]
    fn test_undeclared() {
        let mut symbols = SymbolTable::new();
        let e = run(&[Opcode::VariableAccess("nope".into())], &mut symbols).unwrap_err();
        assert_eq!(e.code(), ErrorCode::UndeclaredVariable);
        assert_eq!(e.text(), "The symbol 'nope' must be declared prior to use.");
    }

    #[test]
    fn test_underflow() {
        let mut symbols = SymbolTable::new();
        let e = run(&[push("1"), Opcode::Add], &mut symbols).unwrap_err();
        assert_eq!(e.code(), ErrorCode::StackUnderflow);
    }

    #[test]
    fn test_assign_to_literal_is_discarded() {
        let mut symbols = SymbolTable::new();
        run(&[push("1"), push("2"), Opcode::Assign], &mut symbols).unwrap();
    }

    #[test]
    fn test_defaddr_branches_on_false() {
        let mut symbols = SymbolTable::new();
        symbols.add_user("r");
        let mut program = Program::new();
        program.emit(&Opcode::Push(ValueType::Boolean, "false".into()));
        let site = program.emit(&Opcode::Defaddr(0));
        program.emit(&Opcode::VariableAccess("r".into()));
        program.emit(&push("1"));
        program.emit(&Opcode::Assign);
        let target = program.emit(&Opcode::Noop);
        program.emit(&Opcode::CodeEnd);
        program.patch_address(site, target).unwrap();
        Runtime::new().run(&program, &mut symbols, None).unwrap();
        assert!(symbols.value("r").unwrap().is_null());
    }

    #[test]
    fn test_unknown_call_pushes_nothing() {
        let mut symbols = SymbolTable::new();
        let mut program = Program::new();
        program.emit(&push("1"));
        program.emit(&Opcode::Call("frobnicate".into(), 1));
        program.emit(&Opcode::CodeEnd);
        let mut runtime = Runtime::new();
        runtime.run(&program, &mut symbols, None).unwrap();
        assert_eq!(runtime.stack_len(), 0);
    }

    #[test]
    fn test_missing_code_end() {
        let mut symbols = SymbolTable::new();
        let mut program = Program::new();
        program.emit(&Opcode::Noop);
        let e = Runtime::new().run(&program, &mut symbols, None).unwrap_err();
        assert_eq!(e.code(), ErrorCode::MalformedCode);
    }
}
