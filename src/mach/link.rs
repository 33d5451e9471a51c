use super::{Address, Opcode, Program};
use crate::error;
use crate::lang::Error;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// Forward reference to a code address not yet known.
pub type Label = usize;

/// ## Backpatching
///
/// Jumps are emitted with a zero target and recorded as patch sites.
/// Once every label is resolved, `link` writes the real addresses.

#[derive(Debug, Default)]
pub struct Link {
    targets: Vec<Option<Address>>,
    sites: Vec<(Address, Label)>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn label(&mut self) -> Label {
        self.targets.push(None);
        self.targets.len() - 1
    }

    /// The jump at `site` will target `label`.
    pub fn reserve(&mut self, site: Address, label: Label) {
        self.sites.push((site, label));
    }

    pub fn resolve(&mut self, label: Label, addr: Address) {
        if let Some(target) = self.targets.get_mut(label) {
            *target = Some(addr);
        }
    }

    pub fn link(&mut self, program: &mut Program) -> Result<()> {
        for (site, label) in std::mem::take(&mut self.sites) {
            match self.targets.get(label).copied().flatten() {
                Some(addr) => program.patch_address(site, addr)?,
                None => return Err(error!(InternalError; "LINK FAILURE")),
            }
        }
        self.targets.clear();
        Ok(())
    }
}

/// Every jump in the program: (operand offset, target).
pub fn address_sites(program: &Program) -> Result<Vec<(Address, Address)>> {
    let mut sites = vec![];
    let mut pc = 0;
    while pc < program.len() {
        let (op, next) = program.decode(pc)?;
        if let Some(addr) = op.address() {
            sites.push((pc + 4, addr));
        }
        if op == Opcode::CodeEnd {
            break;
        }
        pc = next;
    }
    Ok(sites)
}

/// Shift every jump target by `offset`, for a program about to be
/// placed after `offset` bytes of other code. Returns the number of
/// addresses rewritten.
pub fn fixup(program: &mut Program, offset: usize) -> Result<usize> {
    let sites = address_sites(program)?;
    for (at, addr) in &sites {
        program.write_i64(*at, (*addr + offset) as i64)?;
    }
    debug!(offset, count = sites.len(), "fixup");
    Ok(sites.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_backpatch() {
        let mut program = Program::new();
        let mut link = Link::new();
        let done = link.label();
        let site = program.emit(&Opcode::Defaddr(0));
        link.reserve(site, done);
        program.emit(&Opcode::Noop);
        link.resolve(done, program.len());
        program.emit(&Opcode::CodeEnd);
        link.link(&mut program).unwrap();
        assert_eq!(program.decode(site).unwrap().0, Opcode::Defaddr(16));
    }

    #[test]
    fn test_unresolved_label() {
        let mut program = Program::new();
        let mut link = Link::new();
        let nowhere = link.label();
        let site = program.emit(&Opcode::Goto(0));
        link.reserve(site, nowhere);
        let e = link.link(&mut program).unwrap_err();
        assert_eq!(e.text(), "LINK FAILURE");
    }

    #[test]
    fn test_fixup_counts() {
        let mut program = Program::new();
        program.emit(&Opcode::Goto(12));
        program.emit(&Opcode::Push(super::super::ValueType::Double, "12".into()));
        program.emit(&Opcode::Defaddr(0));
        program.emit(&Opcode::CodeEnd);
        assert_eq!(fixup(&mut program, 100).unwrap(), 2);
        let sites = address_sites(&program).unwrap();
        assert_eq!(sites.iter().map(|s| s.1).collect::<Vec<_>>(), vec![112, 100]);
    }
}
