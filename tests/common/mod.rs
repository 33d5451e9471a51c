use rule::lang::Error;
use rule::mach::Value;
use rule::Runner;

/// Run `text` and return the error text, or an empty string.
pub fn exec(runner: &mut Runner, text: &str) -> String {
    match runner.compile_and_run(text) {
        Ok(()) => String::new(),
        Err(error) => error.to_string(),
    }
}

/// Run `text` in a fresh runner and return the text of `name`.
pub fn eval(text: &str, name: &str) -> String {
    let mut r = Runner::new();
    let result = exec(&mut r, text);
    assert_eq!(result, "", "running {:?}", text);
    r.value_string(name)
}

pub fn value(runner: &Runner, name: &str) -> Value {
    runner.value(name).cloned().unwrap_or_default()
}

pub fn strict() -> Runner {
    let mut r = Runner::new();
    r.options_mut().scan_strict = true;
    r.options_mut().parse_strict = true;
    r
}

pub fn fail(runner: &mut Runner, text: &str) -> Error {
    match runner.compile_and_run(text) {
        Ok(()) => panic!("expected {:?} to fail", text),
        Err(error) => error,
    }
}
