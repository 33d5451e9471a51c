use super::{Value, ValueType};

/// ## Value operators
///
/// Binary operators select their behavior from the type of the right
/// hand operand; the left hand operand is coerced to match. Nothing here
/// fails. A coercion that does not succeed yields null or a sentinel.

pub struct Operation {}

#[derive(Clone, Copy)]
enum Compare {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Compare {
    fn apply<T: PartialOrd>(self, l: T, r: T) -> bool {
        match self {
            Compare::Less => l < r,
            Compare::LessEqual => l <= r,
            Compare::Greater => l > r,
            Compare::GreaterEqual => l >= r,
        }
    }
}

fn text_len(val: &Value) -> Option<usize> {
    val.to_text().map(|s| s.chars().count())
}

impl Operation {
    pub fn add(lhs: &Value, rhs: &Value) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Value::null();
        }
        match rhs {
            Float(r) => match lhs.to_f64() {
                Some(l) => Float(l + r),
                None => Value::null(),
            },
            Integer(r) => match lhs.to_i32() {
                Some(l) => Integer(l.wrapping_add(*r)),
                None => Value::null(),
            },
            String(r) => match lhs.to_text() {
                Some(l) => String(l + r),
                None => Value::null(),
            },
            _ => Value::null(),
        }
    }

    pub fn subtract(lhs: &Value, rhs: &Value) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Value::null();
        }
        match rhs {
            Float(r) => match lhs.to_f64() {
                Some(l) => Float(l - r),
                None => Value::null(),
            },
            Integer(r) => match lhs.to_i32() {
                Some(l) => Integer(l.wrapping_sub(*r)),
                None => Value::null(),
            },
            String(r) => match lhs.to_text() {
                Some(l) if r.is_empty() => String(l),
                Some(l) => String(l.replacen(r.as_str(), "", 1)),
                None => Value::null(),
            },
            _ => Value::null(),
        }
    }

    pub fn multiply(lhs: &Value, rhs: &Value) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Value::null();
        }
        match rhs {
            Float(r) => Float(lhs.to_f64().map(|l| l * r).unwrap_or(f64::NAN)),
            Integer(r) => Integer(
                lhs.to_i32()
                    .and_then(|l| l.checked_mul(*r))
                    .unwrap_or(i32::MIN),
            ),
            String(_) => Float(f64::NAN),
            _ => Value::null(),
        }
    }

    pub fn divide(lhs: &Value, rhs: &Value) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Value::null();
        }
        match rhs {
            Float(r) => Float(lhs.to_f64().map(|l| l / r).unwrap_or(f64::NAN)),
            Integer(r) => Integer(
                lhs.to_i32()
                    .and_then(|l| l.checked_div(*r))
                    .unwrap_or(i32::MIN),
            ),
            String(_) => Float(f64::NAN),
            _ => Value::null(),
        }
    }

    fn compare(lhs: &Value, rhs: &Value, cmp: Compare) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Boolean(false);
        }
        let result = match rhs {
            Float(r) => lhs.to_f64().map(|l| cmp.apply(l, *r)),
            Integer(r) => lhs.to_i32().map(|l| cmp.apply(l, *r)),
            String(_) => match (text_len(lhs), text_len(rhs)) {
                (Some(l), Some(r)) => Some(cmp.apply(l, r)),
                _ => None,
            },
            _ => return Value::null(),
        };
        match result {
            Some(b) => Boolean(b),
            None => Float(0.0),
        }
    }

    /// Strings compare by length.
    pub fn less(lhs: &Value, rhs: &Value) -> Value {
        Operation::compare(lhs, rhs, Compare::Less)
    }

    pub fn less_equal(lhs: &Value, rhs: &Value) -> Value {
        Operation::compare(lhs, rhs, Compare::LessEqual)
    }

    pub fn greater(lhs: &Value, rhs: &Value) -> Value {
        Operation::compare(lhs, rhs, Compare::Greater)
    }

    pub fn greater_equal(lhs: &Value, rhs: &Value) -> Value {
        Operation::compare(lhs, rhs, Compare::GreaterEqual)
    }

    pub fn equal(lhs: &Value, rhs: &Value) -> Value {
        use Value::*;
        match (lhs.is_null(), rhs.is_null()) {
            (true, true) => return Boolean(true),
            (true, false) | (false, true) => return Boolean(false),
            _ => {}
        }
        let result = match rhs {
            Float(r) => lhs.to_f64().map(|l| l == *r),
            Integer(r) => lhs.to_i32().map(|l| l == *r),
            String(r) => lhs.to_text().map(|l| &l == r),
            Boolean(r) => lhs.to_bool().map(|l| l == *r),
            DateTime(r) => lhs.to_datetime().map(|l| l == *r),
            Null(_) => return Value::null(),
        };
        match result {
            Some(b) => Boolean(b),
            None => Float(0.0),
        }
    }

    pub fn not_equal(lhs: &Value, rhs: &Value) -> Value {
        match Operation::equal(lhs, rhs) {
            Value::Boolean(b) => Value::Boolean(!b),
            other => other,
        }
    }

    fn logical(lhs: &Value, rhs: &Value, and: bool) -> Value {
        use Value::*;
        if lhs.is_null() {
            return Boolean(false);
        }
        let pair = match rhs {
            Float(_) => match (lhs.to_f64(), rhs.to_f64()) {
                (Some(l), Some(r)) => Some((l != 0.0, r != 0.0)),
                _ => None,
            },
            Integer(_) => match (lhs.to_i32(), rhs.to_i32()) {
                (Some(l), Some(r)) => Some((l != 0, r != 0)),
                _ => None,
            },
            Boolean(r) => lhs.to_bool().map(|l| (l, *r)),
            _ => return Value::null(),
        };
        match pair {
            Some((l, r)) => Boolean(if and { l && r } else { l || r }),
            None => Float(0.0),
        }
    }

    pub fn and(lhs: &Value, rhs: &Value) -> Value {
        Operation::logical(lhs, rhs, true)
    }

    pub fn or(lhs: &Value, rhs: &Value) -> Value {
        Operation::logical(lhs, rhs, false)
    }

    /// Zero is true, any other number is false.
    pub fn not(val: &Value) -> Value {
        use Value::*;
        match val {
            Boolean(b) => Boolean(!b),
            Integer(n) => Boolean(*n == 0),
            Float(n) => Boolean(*n == 0.0),
            String(_) => match val.to_bool() {
                Some(b) => Boolean(!b),
                None => Value::null(),
            },
            Null(_) | DateTime(_) => Value::null(),
        }
    }

    pub fn negate(val: &Value) -> Value {
        use Value::*;
        match val {
            Null(_) => Value::null(),
            Float(n) => Float(-n),
            _ => match val.to_i32() {
                Some(n) => Integer(n.wrapping_neg()),
                None => Value::null(),
            },
        }
    }

    pub fn abs(val: &Value) -> Value {
        use Value::*;
        match val {
            Null(_) => Value::null(),
            Float(n) => Float(n.abs()),
            _ => match val.to_i32() {
                Some(n) => Integer(n.wrapping_abs()),
                None => Value::null(),
            },
        }
    }

    fn string_op(val: &Value, f: fn(&str) -> std::string::String) -> Value {
        match val {
            Value::String(s) => Value::String(f(s)),
            Value::Null(_) => Value::Null(ValueType::String),
            _ => match val.to_text() {
                Some(s) => Value::String(f(&s)),
                None => Value::Null(ValueType::String),
            },
        }
    }

    pub fn trim(val: &Value) -> Value {
        Operation::string_op(val, |s| s.trim().to_string())
    }

    pub fn upper(val: &Value) -> Value {
        Operation::string_op(val, |s| s.to_uppercase())
    }

    pub fn lower(val: &Value) -> Value {
        Operation::string_op(val, |s| s.to_lowercase())
    }

    /// One based start, counted in characters.
    pub fn substring(val: &Value, start: &Value, len: &Value) -> Value {
        let none = Value::Null(ValueType::String);
        let (s, start, len) = match (val.to_text(), start.to_i32(), len.to_i32()) {
            (Some(s), Some(start), Some(len)) => (s, start, len),
            _ => return none,
        };
        if start < 1 || len < 0 {
            return none;
        }
        let chars: Vec<char> = s.chars().collect();
        let from = (start - 1) as usize;
        let to = from + len as usize;
        if to > chars.len() {
            return none;
        }
        Value::String(chars[from..to].iter().collect())
    }

    /// Containment after `%` wildcards are removed.
    pub fn like(val: &Value, pattern: &Value) -> Value {
        match (val.to_text(), pattern.to_text()) {
            (Some(s), Some(p)) => Value::Boolean(s.contains(&p.replace('%', ""))),
            _ => Value::Boolean(false),
        }
    }

    /// Re-render as text and parse as the named type.
    pub fn convert(val: &Value, type_name: &Value) -> Value {
        let value_type = match type_name.to_text().and_then(|t| ValueType::parse(&t)) {
            Some(t) => t,
            None => return Value::null(),
        };
        match val.to_text() {
            Some(text) => Value::from_parts(value_type, &text).unwrap_or(Value::Null(value_type)),
            None => Value::Null(value_type),
        }
    }

    pub fn pow(base: &Value, exp: &Value) -> Value {
        match (base.to_f64(), exp.to_f64()) {
            (Some(b), Some(e)) => Value::Float(b.powf(e)),
            _ => Value::null(),
        }
    }

    pub fn sqrt(val: &Value) -> Value {
        match val.to_f64() {
            Some(n) => Value::Float(n.sqrt()),
            None => Value::null(),
        }
    }

    /// First argument that is not null, else the last argument.
    pub fn is_null(args: &[Value]) -> Value {
        match args.iter().find(|v| !v.is_null()) {
            Some(v) => v.clone(),
            None => args.last().cloned().unwrap_or_default(),
        }
    }

    /// True if the first argument equals any of the rest.
    pub fn is_in(args: &[Value]) -> Value {
        let (needle, haystack) = match args.split_first() {
            Some(split) => split,
            None => return Value::Boolean(false),
        };
        let found = haystack
            .iter()
            .any(|v| Operation::equal(needle, v) == Value::Boolean(true));
        Value::Boolean(found)
    }
}
