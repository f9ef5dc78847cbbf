extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate sdb;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sdb::monitor::bridge::Bridge;
use sdb::monitor::machine::{self, Machine, MachineConfig};
use sdb::monitor::oracle;

/// Bytes per row of an examine (`-x`) dump.
const DUMP_WIDTH: usize = 8;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tImage: {}\n\tExamine: {}\n\tTest file: {}\n\tExpression: {}",
        verbosity(args.occurrences_of("verbose")),
        args.value_of("image").unwrap_or("None"),
        args.value_of("examine").unwrap_or("None"),
        args.value_of("test").unwrap_or("None"),
        expression(&args).unwrap_or_else(|| "None".to_owned())
    );

    let machine = build_machine(&args);
    debug!("Machine: {}", machine);

    if args.is_present("registers") {
        println!("{}", register_grid(&machine));
    }

    if let Some(path) = args.value_of("test") {
        std::process::exit(run_oracle(Path::new(path), &machine));
    }

    let text = match expression(&args) {
        Some(text) => text,
        None if args.is_present("registers") => return,
        None => {
            error!("fatal: no expression given");
            std::process::exit(1);
        },
    };

    let value = match sdb::evaluate(&text, &machine) {
        Ok(value) => value,
        Err(err) => {
            println!("{}: invalid expression: {}", text, err);
            std::process::exit(1);
        },
    };

    match args.value_of("examine") {
        None => println!("{} = {} (0x{:016x})", text, value, value),
        Some(count) => {
            let count = match machine::parse_number(count) {
                Some(n) => n as usize,
                None => {
                    error!("fatal: invalid byte count `{}`", count);
                    std::process::exit(1);
                },
            };
            match machine.read_bytes(value, count) {
                Ok(bytes) => println!("{}", dump_grid(value, &bytes)),
                Err(err) => {
                    println!("{}: {}", text, err);
                    std::process::exit(1);
                },
            }
        },
    }
}

/// Joins the positional words so that `sdb 1 + 2` works unquoted.
fn expression(args: &ArgMatches) -> Option<String> {
    args.values_of("EXPR").map(|words| words.collect::<Vec<_>>().join(" "))
}

fn build_machine(args: &ArgMatches) -> Machine {
    let mut config = MachineConfig::default();
    if let Some(base) = args.value_of("base") {
        config.base = parse_or_exit("base address", base);
    }
    if let Some(size) = args.value_of("msize") {
        config.size = match usize::try_from(parse_or_exit("memory size", size)) {
            Ok(n) => n,
            Err(_) => {
                error!("fatal: memory size `{}` does not fit in host memory", size);
                std::process::exit(1);
            },
        };
    }
    let mut machine = match Machine::new(config) {
        Ok(machine) => machine,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        },
    };

    if let Some(image) = args.value_of("image") {
        let ipath = Path::new(image);
        let mut bytes = Vec::new();
        let read = File::open(&ipath).and_then(|f| BufReader::new(f).read_to_end(&mut bytes));
        if let Err(err) = read {
            error!("fatal: unable to read image file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        }
        if let Err(err) = machine.load_image(&bytes) {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
    }

    for assignment in args.values_of("register").into_iter().flatten() {
        if let Err(err) = machine.assign(assignment) {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
    }

    machine
}

fn parse_or_exit(what: &str, value: &str) -> u64 {
    match machine::parse_number(value) {
        Some(n) => n,
        None => {
            error!("fatal: invalid {} `{}`", what, value);
            std::process::exit(1);
        },
    }
}

/// Runs a self-test file and prints one row per case.
/// Returns the process exit code.
fn run_oracle(path: &Path, machine: &Machine) -> i32 {
    let file = match File::open(path) {
        Err(err) => {
            error!("fatal: unable to open test file `{}`: {}", path.display(), err);
            return 1;
        },
        Ok(file) => file,
    };

    let cases = match oracle::parse(BufReader::new(file)) {
        Ok(cases) => cases,
        Err(err) => {
            error!("fatal: {}", err);
            return 1;
        },
    };

    let outcomes = oracle::run(&cases, machine);
    let failures = outcomes.iter().filter(|o| !o.passed()).count();

    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });
    for outcome in outcomes.iter() {
        grid.add(Cell::from(format!("{}:", outcome.case.line)));
        grid.add(Cell::from(if outcome.passed() { "ok" } else { "FAIL" }));
        grid.add(Cell::from(outcome.case.expression.clone()));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(match &outcome.result {
            Ok(value) => value.to_string(),
            Err(err) => err.to_string(),
        }));
    }
    println!("{}", grid.fit_into_columns(5));
    println!("{} passed, {} failed", outcomes.len() - failures, failures);

    if failures > 0 {
        error!("Stopped self-test due to {} failing expression(s).", failures);
        1
    } else {
        0
    }
}

/// Lays out `bytes` as rows of `0xADDR:` followed by up to eight bytes.
fn dump_grid(addr: u64, bytes: &[u8]) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (row, chunk) in bytes.chunks(DUMP_WIDTH).enumerate() {
        grid.add(Cell::from(format!("0x{:08x}:", addr.wrapping_add((row * DUMP_WIDTH) as u64))));
        for i in 0..DUMP_WIDTH {
            grid.add(Cell::from(chunk.get(i).map(|b| format!("{:02x}", b)).unwrap_or_default()));
        }
    }

    grid.fit_into_columns(DUMP_WIDTH + 1).to_string()
}

/// Lays out every register as `$name 0x...` pairs, four to a row.
fn register_grid(machine: &Machine) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (name, value) in machine.registers() {
        grid.add(Cell::from(name));
        grid.add(Cell::from(format!("0x{:016x}", value)));
    }

    grid.fit_into_columns(8).to_string()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap_or("sdb"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("0.0.0"))
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap_or(""))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or(""))
        .arg(Arg::with_name("EXPR")
            .help("Expression to evaluate, e.g. `*$sp + 0x10`")
            .multiple(true)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("image")
            .short("i")
            .takes_value(true)
            .help("loads a raw image file at the base of guest memory"))
        .arg(Arg::with_name("register")
            .short("r")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
            .help("sets a register before evaluating, as NAME=VALUE"))
        .arg(Arg::with_name("registers")
            .short("R")
            .takes_value(false)
            .help("prints every register before evaluating"))
        .arg(Arg::with_name("base")
            .short("b")
            .takes_value(true)
            .help("guest address of the first byte of memory (default 0x80000000)"))
        .arg(Arg::with_name("msize")
            .short("m")
            .takes_value(true)
            .help("bytes of guest memory (default 0x8000000)"))
        .arg(Arg::with_name("examine")
            .short("x")
            .takes_value(true)
            .conflicts_with("test")
            .help("dumps N bytes of guest memory starting at the value of EXPR"))
        .arg(Arg::with_name("test")
            .short("t")
            .takes_value(true)
            .help("runs a self-test file of `<expected> <expression>` lines"))
        .get_matches()
}

fn verbosity(occurrences: u64) -> log::LevelFilter {
    match occurrences {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn initialize_logging(occurrences: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity(occurrences))
        .chain(std::io::stderr())
        .apply().ok();
}
