use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_LIMIT: usize = 0x1_0000;

/// ## Bounded evaluation stack
///
/// Pushing past the limit is an out of memory error carrying the
/// message given at construction. Popping an empty stack is an
/// underflow error and leaves the stack untouched.

pub struct Stack<T> {
    full: &'static str,
    limit: usize,
    slots: Vec<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.slots.iter()).finish()
    }
}

impl<T> Stack<T> {
    pub fn new(full: &'static str) -> Stack<T> {
        Stack::with_limit(full, DEFAULT_LIMIT)
    }

    pub fn with_limit(full: &'static str, limit: usize) -> Stack<T> {
        Stack {
            full,
            limit,
            slots: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, slot: T) -> Result<()> {
        if self.slots.len() >= self.limit {
            return Err(error!(OutOfMemory; self.full));
        }
        self.slots.push(slot);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        self.slots.pop().ok_or_else(underflow)
    }

    /// Pops two, returned in push order.
    pub fn pop_2(&mut self) -> Result<(T, T)> {
        if self.slots.len() < 2 {
            return Err(underflow());
        }
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }

    /// Pops `count`, returned in push order.
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<T>> {
        match self.slots.len().checked_sub(count) {
            Some(from) => Ok(self.slots.split_off(from)),
            None => Err(underflow()),
        }
    }
}

fn underflow() -> Error {
    error!(StackUnderflow; "Attempt to pop from an empty stack.")
}
