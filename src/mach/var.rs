use super::{Value, ValueType};
use crate::error;
use crate::lang::token::Kind;
use crate::lang::Error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Keyword,
    Function,
    Directive,
    /// Injected from a row; survives `reset` with its value cleared.
    User,
    /// Created by a `declare` statement; removed on `reset`.
    UserDynamic,
}

impl Role {
    pub fn is_variable(self) -> bool {
        matches!(self, Role::User | Role::UserDynamic)
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    kind: Kind,
    role: Role,
    value: Value,
    modified: bool,
}

impl Symbol {
    fn new(name: &str, kind: Kind, role: Role) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            role,
            value: Value::null(),
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// A row of named cells, the unit of data fed to a rule.
pub trait Row {
    fn cells(&self) -> Vec<(String, Value)>;
}

impl Row for Vec<(String, Value)> {
    fn cells(&self) -> Vec<(String, Value)> {
        self.clone()
    }
}

impl Row for &[(&str, Value)] {
    fn cells(&self) -> Vec<(String, Value)> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl Row for HashMap<String, Value> {
    fn cells(&self) -> Vec<(String, Value)> {
        let mut cells: Vec<(String, Value)> =
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }
}

/// ## Symbol table
///
/// Holds both the words the scanner classifies and the variables the
/// machine reads and writes. Builtin entries are created once and are
/// never removed.

#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    builtins: HashMap<Kind, String>,
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        let mut table = SymbolTable {
            symbols: HashMap::new(),
            builtins: HashMap::new(),
        };
        table.builtin("#directive_clear_modified", Kind::ClearModified, Role::Directive);
        table.builtin("declare", Kind::Declare, Role::Keyword);
        table.builtin("if", Kind::If, Role::Keyword);
        table.builtin("then", Kind::Then, Role::Keyword);
        table.builtin("else", Kind::Else, Role::Keyword);
        table.builtin("and", Kind::AndAnd, Role::Keyword);
        table.builtin("or", Kind::OrOr, Role::Keyword);
        table.builtin("null", Kind::Null, Role::Keyword);
        for kind in Kind::FUNCTIONS.iter() {
            table.builtin(kind.describe(), *kind, Role::Function);
        }
        table
    }

    fn builtin(&mut self, name: &str, kind: Kind, role: Role) {
        self.symbols
            .insert(name.to_string(), Symbol::new(name, kind, role));
        self.builtins.entry(kind).or_insert_with(|| name.to_string());
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Exact match first, then the lowercased spelling.
    pub fn lookup(&self, word: &str) -> Option<&Symbol> {
        match self.symbols.get(word) {
            Some(symbol) => Some(symbol),
            None => self.symbols.get(&word.to_lowercase()),
        }
    }

    /// Canonical spelling of a builtin kind.
    pub fn find(&self, kind: Kind) -> Option<&str> {
        self.builtins.get(&kind).map(|s| s.as_str())
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.symbols.get(name) {
            Some(symbol) if symbol.role.is_variable() => Some(&symbol.value),
            _ => None,
        }
    }

    pub fn declare(&mut self, name: &str, value_type: ValueType) -> Result<()> {
        if self.symbols.contains_key(name) {
            return Err(error!(AlreadyDeclared; &format!(
                "The variable '{}' has already been declared.",
                name
            )));
        }
        let mut symbol = Symbol::new(name, Kind::Variable, Role::UserDynamic);
        symbol.value = Value::Null(value_type);
        self.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Ensure a user variable exists. Existing names are left alone.
    pub fn add_user(&mut self, name: &str) -> &Symbol {
        self.symbols
            .entry(name.to_string())
            .or_insert_with(|| Symbol::new(name, Kind::Variable, Role::User))
    }

    /// Store into a variable and mark it modified.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        match self.symbols.get_mut(name) {
            Some(symbol) if symbol.role.is_variable() => {
                symbol.value = value;
                symbol.modified = true;
                Ok(())
            }
            Some(_) => Err(error!(RuntimeError; &format!(
                "The symbol '{}' is not a variable.",
                name
            ))),
            None => Err(error!(UndeclaredVariable; &format!(
                "The symbol '{}' must be declared prior to use.",
                name
            ))),
        }
    }

    /// Store without touching the modified flag.
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        match self.symbols.get_mut(name) {
            Some(symbol) if symbol.role.is_variable() => {
                symbol.value = value;
                true
            }
            _ => false,
        }
    }

    /// Clears the flag on every variable, declared ones included.
    pub fn clear_modified(&mut self) {
        for symbol in self.symbols.values_mut() {
            if symbol.role.is_variable() {
                symbol.modified = false;
            }
        }
    }

    pub fn is_modified(&self) -> bool {
        self.symbols
            .values()
            .any(|s| s.role == Role::User && s.modified)
    }

    /// Modified row variables, in name order.
    pub fn modified(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self
            .symbols
            .values()
            .filter(|s| s.role == Role::User && s.modified)
            .collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }

    pub fn modified_names(&self) -> String {
        self.modified()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<&str>>()
            .join(",")
    }

    /// Clear flags and values, then drop declared variables.
    pub fn reset(&mut self) {
        self.clear_modified();
        for symbol in self.symbols.values_mut() {
            symbol.value = Value::null();
        }
        self.symbols.retain(|_, s| s.role != Role::UserDynamic);
    }

    /// Every variable, in name order.
    pub fn user_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self
            .symbols
            .values()
            .filter(|s| s.role.is_variable())
            .collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }

    pub fn add_user_symbols<'a, T: IntoIterator<Item = &'a str>>(&mut self, names: T) {
        for name in names {
            self.add_user(name);
        }
    }

    pub fn add_user_values<R: Row>(&mut self, row: &R) {
        for (name, value) in row.cells() {
            self.set_value(&name, value);
        }
    }

    pub fn add_row<R: Row>(&mut self, row: &R) {
        let cells = row.cells();
        self.add_user_symbols(cells.iter().map(|(name, _)| name.as_str()));
        for (name, value) in cells {
            self.set_value(&name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("IF").unwrap().kind(), Kind::If);
        assert_eq!(table.lookup("and").unwrap().kind(), Kind::AndAnd);
        assert_eq!(table.find(Kind::Substring), Some("substring"));
        assert_eq!(table.get("getprice").unwrap().role(), Role::Function);
        assert!(table.value("if").is_none());
    }

    #[test]
    fn test_declare_twice() {
        let mut table = SymbolTable::new();
        table.declare("x", ValueType::String).unwrap();
        let e = table.declare("x", ValueType::String).unwrap_err();
        assert_eq!(e.code(), crate::lang::ErrorCode::AlreadyDeclared);
        assert!(table.declare("null", ValueType::String).is_err());
    }

    #[test]
    fn test_clear_modified_covers_declared() {
        let mut table = SymbolTable::new();
        table.declare("d", ValueType::Double).unwrap();
        table.add_user("u");
        table.assign("d", Value::Float(1.0)).unwrap();
        table.assign("u", Value::Float(2.0)).unwrap();
        assert_eq!(table.modified_names(), "u");
        assert!(table.get("d").unwrap().is_modified());
        table.clear_modified();
        assert!(!table.get("d").unwrap().is_modified());
        assert!(!table.is_modified());
    }

    #[test]
    fn test_reset_keeps_row_variables() {
        let mut table = SymbolTable::new();
        let row: &[(&str, Value)] = &[("qty", Value::Integer(4))];
        table.add_row(&row);
        table.declare("tmp", ValueType::Double).unwrap();
        table.assign("qty", Value::Integer(5)).unwrap();
        assert_eq!(table.modified_names(), "qty");
        table.reset();
        assert!(table.contains("qty"));
        assert!(!table.contains("tmp"));
        assert!(table.value("qty").unwrap().is_null());
        assert!(!table.is_modified());
    }

    #[test]
    fn test_add_user_values_ignores_unknown() {
        let mut table = SymbolTable::new();
        table.add_user_symbols(vec!["a"]);
        let row = vec![
            ("a".to_string(), Value::from("x")),
            ("b".to_string(), Value::from("y")),
        ];
        table.add_user_values(&row);
        assert_eq!(table.value("a"), Some(&Value::from("x")));
        assert!(!table.contains("b"));
    }
}
