use super::{Address, Opcode, Program};
use crate::lang::Error;
use tracing::info;

/// ## Disassembly
///
/// A linear listing of a program from offset zero to its end-of-code
/// marker. Nothing is executed.

#[derive(Debug, Clone, Default)]
pub struct Listing {
    lines: Vec<(Address, Opcode)>,
    end: Option<Address>,
}

impl Listing {
    pub fn disassemble(program: &Program) -> Result<Listing, Error> {
        let mut listing = Listing::default();
        let mut pc = 0;
        while pc < program.len() {
            let (op, next) = program.decode(pc)?;
            info!(offset = pc, %op, "disassemble");
            let end = op == Opcode::CodeEnd;
            listing.lines.push((pc, op));
            if end {
                listing.end = Some(pc);
                break;
            }
            pc = next;
        }
        Ok(listing)
    }

    /// Offset of the end-of-code marker.
    pub fn end_of_code(&self) -> Option<Address> {
        self.end
    }

    pub fn lines(&self) -> &[(Address, Opcode)] {
        &self.lines
    }

    pub fn opcodes(&self) -> impl Iterator<Item = &Opcode> {
        self.lines.iter().map(|(_, op)| op)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (addr, op) in &self.lines {
            writeln!(f, "{:>6}  {}", addr, op)?;
        }
        Ok(())
    }
}
