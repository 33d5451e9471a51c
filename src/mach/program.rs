use super::{link, Address, Opcode, ValueType};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

const STRING_TAG: &str = "string";

/// ## Compiled bytecode
///
/// A self-contained byte buffer. Every record is a little endian `u32`
/// tag followed by its operands. Strings are a `u32` byte length then
/// UTF-8, addresses are `i64`, argument counts are `u32`.

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn from_bytes(code: Vec<u8>) -> Program {
        Program { code }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Append an instruction and return its address.
    pub fn emit(&mut self, op: &Opcode) -> Address {
        use Opcode::*;
        let addr = self.code.len();
        self.put_u32(op.tag());
        match op {
            Push(t, s) | Declare(t, s) => {
                self.put_str(t.name());
                self.put_str(s);
            }
            VariableAccess(s) => {
                self.put_str(STRING_TAG);
                self.put_str(s);
            }
            Call(s, n) => {
                self.put_str(STRING_TAG);
                self.put_str(s);
                self.put_u32(*n as u32);
            }
            Defaddr(a) | Goto(a) => self.put_i64(*a as i64),
            _ => {}
        }
        addr
    }

    /// Rewrite the target of the jump instruction at `site`.
    pub fn patch_address(&mut self, site: Address, addr: Address) -> Result<()> {
        match self.decode(site)?.0 {
            Opcode::Defaddr(_) | Opcode::Goto(_) => self.write_i64(site + 4, addr as i64),
            _ => Err(error!(InternalError; "PATCH SITE IS NOT A JUMP")),
        }
    }

    pub(super) fn write_i64(&mut self, at: usize, n: i64) -> Result<()> {
        match self.code.get_mut(at..at + 8) {
            Some(slice) => {
                slice.copy_from_slice(&n.to_le_bytes());
                Ok(())
            }
            None => Err(error!(MalformedCode; "ADDRESS OUT OF RANGE")),
        }
    }

    /// Decode the instruction at `at`, returning it and the address that follows.
    pub fn decode(&self, at: Address) -> Result<(Opcode, Address)> {
        use Opcode::*;
        let mut cursor = Cursor {
            code: &self.code,
            pos: at,
        };
        let tag = cursor.u32()?;
        if let Some(op) = Opcode::simple(tag) {
            return Ok((op, cursor.pos));
        }
        let op = match tag {
            2 | 20 => {
                let t = cursor.str()?;
                let t = match ValueType::parse(&t) {
                    Some(t) => t,
                    None => {
                        return Err(error!(MalformedCode; &format!("UNKNOWN TYPE {}", t)));
                    }
                };
                let s = cursor.str()?;
                if tag == 2 {
                    Declare(t, s)
                } else {
                    Push(t, s)
                }
            }
            4 => Defaddr(cursor.address()?),
            5 => Goto(cursor.address()?),
            18 => {
                cursor.str()?;
                VariableAccess(cursor.str()?)
            }
            19 => {
                cursor.str()?;
                let s = cursor.str()?;
                Call(s, cursor.u32()? as usize)
            }
            _ => {
                return Err(error!(MalformedCode; &format!("UNKNOWN OPCODE {} AT {}", tag, at)));
            }
        };
        Ok((op, cursor.pos))
    }

    /// Append another independently compiled program, relocating its
    /// jumps. This program's end-of-code marker, if last, is dropped.
    pub fn concat(&mut self, other: &Program) -> Result<()> {
        let mut end = None;
        let mut pc = 0;
        while pc < self.code.len() {
            let (op, next) = self.decode(pc)?;
            if op == Opcode::CodeEnd && next == self.code.len() {
                end = Some(pc);
            }
            pc = next;
        }
        if let Some(end) = end {
            self.code.truncate(end);
        }
        let mut other = other.clone();
        link::fixup(&mut other, self.code.len())?;
        self.code.extend_from_slice(&other.code);
        Ok(())
    }

    fn put_u32(&mut self, n: u32) {
        self.code.extend_from_slice(&n.to_le_bytes());
    }

    fn put_i64(&mut self, n: i64) {
        self.code.extend_from_slice(&n.to_le_bytes());
    }

    fn put_str(&mut self, s: &str) {
        self.put_u32(s.len() as u32);
        self.code.extend_from_slice(s.as_bytes());
    }
}

struct Cursor<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        match self.code.get(self.pos..self.pos + len) {
            Some(slice) => {
                self.pos += len;
                Ok(slice)
            }
            None => Err(error!(MalformedCode; &format!("TRUNCATED AT {}", self.pos))),
        }
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn address(&mut self) -> Result<Address> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        let n = i64::from_le_bytes(buf);
        if n < 0 {
            return Err(error!(MalformedCode; "NEGATIVE ADDRESS"));
        }
        Ok(n as Address)
    }

    fn str(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        match std::str::from_utf8(self.take(len)?) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(error!(MalformedCode; "INVALID UTF-8")),
        }
    }
}
