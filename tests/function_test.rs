mod common;
use chrono::NaiveDate;
use common::*;
use rule::mach::{MemoryPrices, Price, Value, ValueType};
use rule::Runner;

#[test]
fn test_fn_substring() {
    assert_eq!(eval("s = substring('HELLO', 2, 3)", "s"), "ELL");
    assert_eq!(eval("s = substring('HELLO', 4, 9)", "s"), "null");
}

#[test]
fn test_fn_in() {
    assert_eq!(eval("b = in('B', 'A', 'B', 'C')", "b"), "true");
    assert_eq!(eval("b = in('Z', 'A', 'B', 'C')", "b"), "false");
    assert_eq!(eval("c = 'B'; b = c in ('A', 'B')", "b"), "true");
}

#[test]
fn test_fn_convert() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "d = convert('3.5', 'System.Double')"), "");
    assert_eq!(value(&r, "d"), Value::Float(3.5));
    assert_eq!(exec(&mut r, "d = convert('bogus', 'System.Double')"), "");
    assert_eq!(value(&r, "d"), Value::Null(ValueType::Double));
    assert_eq!(exec(&mut r, "d = convert(42, 'string')"), "");
    assert_eq!(value(&r, "d"), Value::String("42".into()));
}

#[test]
fn test_fn_math() {
    assert_eq!(eval("x = abs(-3)", "x"), "3");
    assert_eq!(eval("x = pow(2, 10)", "x"), "1024");
    assert_eq!(eval("x = sqrt(16)", "x"), "4");
    assert_eq!(eval("x = abs(2 - 7) * 2", "x"), "10");
}

#[test]
fn test_fn_text() {
    assert_eq!(eval("s = upper(trim('  ab '))", "s"), "AB");
    assert_eq!(eval("s = lower('MiXeD')", "s"), "mixed");
    assert_eq!(eval("s = upper(null)", "s"), "null");
}

#[test]
fn test_fn_like() {
    assert_eq!(eval("b = like('hello world', '%lo w%')", "b"), "true");
    assert_eq!(eval("s = 'hello'; b = s like '%ell%'", "b"), "true");
    assert_eq!(eval("s = 'hello'; b = s like 'xyz%'", "b"), "false");
}

#[test]
fn test_fn_isnull() {
    assert_eq!(eval("y = isnull(null, 'fallback')", "y"), "fallback");
    assert_eq!(eval("y = isnull('first', 'second')", "y"), "first");
}

#[test]
fn test_fn_getprice() {
    let mut prices = MemoryPrices::new();
    prices.insert(
        "MIDD",
        NaiveDate::from_ymd_opt(2021, 7, 12).unwrap(),
        Price {
            open: 1.0,
            high: 4.0,
            low: 0.5,
            close: 2.0,
        },
    );
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "p = getprice('MIDD', '2021-07-12', 'high')"), "");
    assert_eq!(value(&r, "p"), Value::Float(0.0));
    r.set_prices(prices);
    assert_eq!(exec(&mut r, "p = getprice('MIDD', '2021-07-12', 'high')"), "");
    assert_eq!(value(&r, "p"), Value::Float(4.0));
    assert_eq!(exec(&mut r, "p = getprice('midd', '07/12/2021', 'close')"), "");
    assert_eq!(value(&r, "p"), Value::Float(2.0));
}
