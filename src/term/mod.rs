extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Signal, Terminal};
use rule::mach::{Function, Listing};
use rule::Runner;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn main(args: &[String]) {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        eprintln!("{}", error);
    }
    let mut runner = Runner::new();
    for filename in args {
        if let Err(error) = run_file(&mut runner, filename, &interrupted) {
            eprintln!("{}", Style::new().bold().paint(error.to_string()));
            return;
        }
    }
    if !args.is_empty() {
        return;
    }
    if let Err(error) = main_loop(&mut runner) {
        eprintln!("{}", error);
    }
}

fn main_loop(runner: &mut Runner) -> std::io::Result<()> {
    let interface = Interface::new("RULE")?;
    interface.set_report_signal(Signal::Interrupt, true);
    interface.set_prompt("> ")?;
    loop {
        let line = match interface.read_line()? {
            ReadResult::Input(line) => line,
            ReadResult::Signal(Signal::Interrupt) => {
                interface.set_buffer("")?;
                continue;
            }
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        interface.add_history_unique(line.clone());
        if !command(&interface, runner, line.trim())? {
            break;
        }
    }
    Ok(())
}

/// Returns false when the shell should exit.
fn command<T: Terminal>(
    interface: &Interface<T>,
    runner: &mut Runner,
    line: &str,
) -> std::io::Result<bool> {
    let (word, rest) = match line.find(' ') {
        Some(n) => (&line[..n], line[n + 1..].trim()),
        None => (line, ""),
    };
    match word {
        ":quit" => return Ok(false),
        ":vars" => {
            for symbol in runner.symbol_table().user_symbols() {
                interface.write_fmt(format_args!("{} = {}\n", symbol.name(), symbol.value()))?;
            }
        }
        ":functions" => {
            interface.write_fmt(format_args!("{}\n", Function::NAMES.join(" ")))?;
        }
        ":modified" => {
            interface.write_fmt(format_args!("{}\n", runner.symbol_table().modified_names()))?;
        }
        ":reset" => runner.reset(),
        ":dis" => match runner.compile(rest).and_then(|p| Listing::disassemble(&p)) {
            Ok(listing) => interface.write_fmt(format_args!("{}", listing))?,
            Err(error) => show_error(interface, &error)?,
        },
        ":check" => match runner.syntax_check(rest) {
            Ok(_) => interface.write_fmt(format_args!("OK\n"))?,
            Err(error) => show_error(interface, &error)?,
        },
        ":strict" => {
            let on = switch(rest);
            let options = runner.options_mut();
            options.scan_strict = on;
            options.parse_strict = on;
        }
        ":trace" => runner.options_mut().trace = switch(rest),
        ":cache" => {
            runner.options_mut().use_cache = switch(rest);
            runner.clear_cache();
        }
        _ if word.starts_with(':') => {
            interface.write_fmt(format_args!(
                "{}\n",
                Style::new()
                    .bold()
                    .paint(format!("UNKNOWN COMMAND {}", word))
            ))?;
        }
        _ => {
            if let Err(error) = runner.compile_and_run(line) {
                show_error(interface, &error)?;
            }
        }
    }
    Ok(true)
}

fn switch(arg: &str) -> bool {
    !arg.eq_ignore_ascii_case("off")
}

fn show_error<T: Terminal>(interface: &Interface<T>, error: &rule::lang::Error) -> std::io::Result<()> {
    interface.write_fmt(format_args!(
        "{}\n",
        Style::new().bold().paint(error.to_string())
    ))
}

/// Each line of the file is run as its own program.
fn run_file(
    runner: &mut Runner,
    filename: &str,
    interrupted: &AtomicBool,
) -> Result<(), rule::lang::Error> {
    let reader = match File::open(filename) {
        Ok(file) => BufReader::new(file),
        Err(error) => return Err(rule::error!(InternalError; &error.to_string())),
    };
    for (index, line) in reader.lines().enumerate() {
        if interrupted.swap(false, Ordering::SeqCst) {
            return Err(rule::error!(InternalError; "INTERRUPTED"));
        }
        let line = match line {
            Ok(line) => line,
            Err(error) => return Err(rule::error!(InternalError; &error.to_string())),
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(error) = runner.compile_and_run(&line) {
            eprintln!(
                "{}",
                Style::new()
                    .bold()
                    .paint(format!("{} (line {} of {})", error, index + 1, filename))
            );
        }
    }
    for symbol in runner.symbol_table().user_symbols() {
        println!("{} = {}", symbol.name(), symbol.value());
    }
    Ok(())
}
