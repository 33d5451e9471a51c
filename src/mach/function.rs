use super::{Operation, Value};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// One day of prices for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Price {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Lookup service behind the `getprice` builtin.
pub trait PriceSource {
    fn price(&self, symbol: &str, date: NaiveDate) -> Option<Price>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPrices {
    prices: HashMap<(String, NaiveDate), Price>,
}

impl MemoryPrices {
    pub fn new() -> MemoryPrices {
        MemoryPrices::default()
    }

    pub fn insert(&mut self, symbol: &str, date: NaiveDate, price: Price) {
        self.prices
            .insert((symbol.to_ascii_uppercase(), date), price);
    }
}

impl PriceSource for MemoryPrices {
    fn price(&self, symbol: &str, date: NaiveDate) -> Option<Price> {
        self.prices
            .get(&(symbol.to_ascii_uppercase(), date))
            .copied()
    }
}

/// ## Builtin functions

pub struct Function {}

impl Function {
    pub const NAMES: [&'static str; 12] = [
        "abs",
        "pow",
        "sqrt",
        "convert",
        "substring",
        "getprice",
        "in",
        "like",
        "trim",
        "upper",
        "lower",
        "isnull",
    ];

    /// Dispatch by canonical name. Unknown names return `None`; the
    /// caller pushes nothing.
    pub fn call(name: &str, args: &[Value], prices: Option<&dyn PriceSource>) -> Option<Value> {
        let arg = |n: usize| args.get(n).cloned().unwrap_or_default();
        let result = match name {
            "abs" => Operation::abs(&arg(0)),
            "pow" => Operation::pow(&arg(0), &arg(1)),
            "sqrt" => Operation::sqrt(&arg(0)),
            "convert" => Operation::convert(&arg(0), &arg(1)),
            "substring" => Operation::substring(&arg(0), &arg(1), &arg(2)),
            "getprice" => Function::getprice(&arg(0), &arg(1), &arg(2), prices),
            "in" => Operation::is_in(args),
            "like" => Operation::like(&arg(0), &arg(1)),
            "trim" => Operation::trim(&arg(0)),
            "upper" => Operation::upper(&arg(0)),
            "lower" => Operation::lower(&arg(0)),
            "isnull" => Operation::is_null(args),
            _ => {
                debug!(name, "unknown function");
                return None;
            }
        };
        Some(result)
    }

    /// Field is OPEN, HIGH or LOW, anything else reads the close.
    /// Missing data reads as zero.
    pub fn getprice(
        symbol: &Value,
        date: &Value,
        field: &Value,
        prices: Option<&dyn PriceSource>,
    ) -> Value {
        let found = match (prices, symbol.to_text(), date.to_datetime()) {
            (Some(source), Some(symbol), Some(date)) => source.price(&symbol, date.date()),
            _ => None,
        };
        let price = match found {
            Some(price) => price,
            None => return Value::Float(0.0),
        };
        let field = field.to_text().unwrap_or_default().to_ascii_uppercase();
        Value::Float(match field.as_str() {
            "OPEN" => price.open,
            "HIGH" => price.high,
            "LOW" => price.low,
            _ => price.close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> MemoryPrices {
        let mut p = MemoryPrices::new();
        p.insert(
            "midd",
            NaiveDate::from_ymd_opt(2021, 7, 12).unwrap(),
            Price {
                open: 1.0,
                high: 4.0,
                low: 0.5,
                close: 2.0,
            },
        );
        p
    }

    #[test]
    fn test_getprice_fields() {
        let p = prices();
        let sym = Value::from("MIDD");
        let date = Value::from("07-12-2021");
        let get = |f: &str| Function::getprice(&sym, &date, &Value::from(f), Some(&p));
        assert_eq!(get("high"), Value::Float(4.0));
        assert_eq!(get("Open"), Value::Float(1.0));
        assert_eq!(get("whatever"), Value::Float(2.0));
        let missing = Function::getprice(&sym, &Value::from("01-01-2000"), &Value::from("low"), Some(&p));
        assert_eq!(missing, Value::Float(0.0));
        assert_eq!(Function::getprice(&sym, &date, &Value::from("low"), None), Value::Float(0.0));
    }

    #[test]
    fn test_call_by_name() {
        let args = vec![Value::Float(2.0), Value::Float(10.0)];
        assert_eq!(Function::call("pow", &args, None), Some(Value::Float(1024.0)));
        assert_eq!(Function::call("nosuch", &args, None), None);
        for name in Function::NAMES.iter() {
            assert!(Function::call(name, &[], None).is_some());
        }
    }
}
