use crate::lang::{parse, scan, Error, Mode};
use crate::mach::{PriceSource, Program, Row, Runtime, SymbolTable, Value};
use std::collections::HashMap;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Error>;

/// Compiler and runtime switches. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Unknown words are not added to the symbol table while scanning.
    pub scan_strict: bool,
    /// Every variable must be known when parsing.
    pub parse_strict: bool,
    /// Trace each executed instruction and dump user symbols afterwards.
    pub trace: bool,
    /// Keep compiled programs keyed by a checksum of their text.
    pub use_cache: bool,
}

/// ## Rule runner
///
/// Owns a symbol table and drives text through the scanner, parser and
/// virtual machine. Each entry point returns a `Result`; the message of
/// the most recent failure is also kept in [`Runner::last_message`].

#[derive(Default)]
pub struct Runner {
    symbols: SymbolTable,
    options: Options,
    prices: Option<Box<dyn PriceSource>>,
    cache: HashMap<u32, Program>,
    runtime: Runtime,
    last_message: String,
}

impl Runner {
    pub fn new() -> Runner {
        Runner::default()
    }

    pub fn with_options(options: Options) -> Runner {
        Runner {
            options,
            ..Runner::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn set_prices<P: PriceSource + 'static>(&mut self, prices: P) {
        self.prices = Some(Box::new(prices));
    }

    /// Scan, parse and execute. Goes through the program cache when
    /// enabled.
    pub fn compile_and_run(&mut self, text: &str) -> Result<()> {
        let result = if self.options.use_cache {
            self.run_cached(text)
        } else {
            self.build(text, self.options.scan_strict, self.mode())
                .and_then(|program| self.run(&program))
        };
        self.latch(result)
    }

    /// Scan and parse without executing. Scanning is strict so the
    /// symbol table is left alone; the text must hold a statement.
    pub fn syntax_check(&mut self, text: &str) -> Result<()> {
        let mode = Mode {
            strict: false,
            strict_statement: true,
            code_end: true,
        };
        let result = self.build(text, true, mode).map(|_| ());
        self.latch(result)
    }

    pub fn compile(&mut self, text: &str) -> Result<Program> {
        let result = self.build(text, true, self.mode());
        self.latch(result)
    }

    pub fn execute(&mut self, program: &Program) -> Result<()> {
        let result = self.run(program);
        self.latch(result)
    }

    /// Reset the symbol table, load one row of values and run the text.
    pub fn apply_row<R: Row>(&mut self, row: &R, text: &str) -> Result<()> {
        self.symbols.reset();
        self.symbols.add_row(row);
        self.compile_and_run(text)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.symbols.value(name)
    }

    /// Canonical text of a variable, `null` when absent or null.
    pub fn value_string(&self, name: &str) -> String {
        match self.value(name) {
            Some(val) => val.to_string(),
            None => "null".to_string(),
        }
    }

    pub fn reset(&mut self) {
        self.symbols.reset();
        self.last_message.clear();
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbol_table_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn mode(&self) -> Mode {
        Mode {
            strict: self.options.parse_strict,
            ..Mode::default()
        }
    }

    fn build(&mut self, text: &str, scan_strict: bool, mode: Mode) -> Result<Program> {
        let tokens = scan(text, &mut self.symbols, scan_strict)?;
        parse(tokens, &self.symbols, &mode)
    }

    fn run_cached(&mut self, text: &str) -> Result<()> {
        let key = crc::crc32::checksum_ieee(text.as_bytes());
        let program = match self.cache.get(&key) {
            Some(program) => {
                debug!(key, "cache hit");
                program.clone()
            }
            None => {
                debug!(key, "cache miss");
                let program = self.build(text, self.options.scan_strict, self.mode())?;
                self.cache.insert(key, program.clone());
                program
            }
        };
        self.run(&program)
    }

    fn run(&mut self, program: &Program) -> Result<()> {
        self.runtime.set_trace(self.options.trace);
        let result = self
            .runtime
            .run(program, &mut self.symbols, self.prices.as_deref());
        if self.runtime.stack_len() > 0 {
            debug!(depth = self.runtime.stack_len(), "values left on stack");
        }
        if self.options.trace {
            for symbol in self.symbols.user_symbols() {
                info!(name = symbol.name(), value = %symbol.value(), "symbol");
            }
        }
        result
    }

    fn latch<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_message.clear(),
            Err(error) => {
                tracing::error!(%error, "rule failed");
                self.last_message = error.to_string();
            }
        }
        result
    }
}
