mod common;
use common::*;
use rule::mach::Value;
use rule::{Options, Runner};
use std::collections::HashMap;

const RULE: &str = "if ((qty * price) > 100) tier = 'large'; else tier = 'small';";

fn row(qty: f64, price: f64) -> HashMap<String, Value> {
    let mut row = HashMap::new();
    row.insert("qty".to_string(), Value::Float(qty));
    row.insert("price".to_string(), Value::Float(price));
    row
}

#[test]
fn test_row_by_row() {
    let mut r = Runner::new();
    let mut tiers = vec![];
    for (qty, price) in &[(1.0, 5.0), (20.0, 10.0), (3.0, 40.0)] {
        r.apply_row(&row(*qty, *price), RULE).unwrap();
        tiers.push(r.value_string("tier"));
    }
    assert_eq!(tiers, vec!["small", "large", "large"]);
    assert_eq!(r.symbol_table().modified_names(), "tier");
}

#[test]
fn test_row_by_row_cached() {
    let mut r = Runner::with_options(Options {
        use_cache: true,
        ..Options::default()
    });
    for n in 0..5 {
        r.apply_row(&row(n as f64 * 10.0, 3.0), RULE).unwrap();
    }
    assert_eq!(r.cached_len(), 1);
    assert_eq!(r.value_string("tier"), "large");
    r.apply_row(&row(1.0, 1.0), "total = qty * price").unwrap();
    assert_eq!(r.cached_len(), 2);
    assert_eq!(value(&r, "total"), Value::Float(1.0));
}

#[test]
fn test_row_slices() {
    let mut r = Runner::new();
    let cells: &[(&str, Value)] = &[("name", Value::from("widget")), ("n", Value::from(2.0))];
    r.apply_row(&cells, "label = upper(name) + '-' + convert(n, 'string')").unwrap();
    assert_eq!(r.value_string("label"), "WIDGET-2");
}

#[test]
fn test_value_string() {
    let mut r = Runner::new();
    assert_eq!(r.value_string("missing"), "null");
    assert_eq!(exec(&mut r, "b = 1 == 1; d = convert('2021-07-12', 'date')"), "");
    assert_eq!(r.value_string("b"), "true");
    assert_eq!(r.value_string("d"), "2021-07-12 00:00:00");
}

#[test]
fn test_last_message_tracks_latest() {
    let mut r = Runner::new();
    let e = fail(&mut r, "x = (");
    assert_eq!(r.last_message(), e.to_string());
    assert_eq!(exec(&mut r, "x = 1"), "");
    assert_eq!(r.last_message(), "");
}

#[test]
fn test_trace_option() {
    let mut r = Runner::new();
    r.options_mut().trace = true;
    assert_eq!(exec(&mut r, "x = 1 + 1"), "");
    assert_eq!(r.value_string("x"), "2");
}
