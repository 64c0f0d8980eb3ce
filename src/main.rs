/// RegLisp - reader CLI
use reglisp::{tokenize, Config, Machine, Register};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, Level};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("RegLisp v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    reglisp [OPTIONS] <INPUT>");
    eprintln!("    reglisp [OPTIONS] -e <EXPR>");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help               Print this help message");
    eprintln!("    -v, --version            Print version information");
    eprintln!("    -e, --expr <EXPR>        Read EXPR instead of a file");
    eprintln!("    --tokens                 Print the token stream");
    eprintln!("    --stats                  Print continuation stack statistics");
    eprintln!("    --config <FILE>          Read configuration from FILE");
    eprintln!("    --log-level <LEVEL>      error, warn, info, debug or trace");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <INPUT>                  Source file (use '-' for stdin)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    reglisp program.lisp");
    eprintln!("    reglisp --tokens -e '(+ 1 (* 2 3))'");
    eprintln!("    cat program.lisp | reglisp -");
}

fn print_version() {
    println!("RegLisp {}", VERSION);
}

#[derive(Default)]
struct Options {
    input: Option<String>,
    expr: Option<String>,
    config: Option<PathBuf>,
    log_level: Option<String>,
    show_tokens: bool,
    print_stats: bool,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    let value_for = |i: &mut usize, flag: &str| -> Result<String, String> {
        *i += 1;
        args.get(*i)
            .cloned()
            .ok_or_else(|| format!("Missing value after {}", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                process::exit(0);
            }
            "-e" | "--expr" => options.expr = Some(value_for(&mut i, "-e")?),
            "--config" => options.config = Some(PathBuf::from(value_for(&mut i, "--config")?)),
            "--log-level" => options.log_level = Some(value_for(&mut i, "--log-level")?),
            "--tokens" => options.show_tokens = true,
            "--stats" => options.print_stats = true,
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if options.input.is_some() {
                    return Err("Multiple input files specified".to_string());
                }
                options.input = Some(arg.to_string());
            }
        }
        i += 1;
    }

    Ok(options)
}

fn load_config(options: &Options) -> Result<Config, String> {
    let mut config = match &options.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .map_err(|e| e.to_string())?;

    if let Some(level) = &options.log_level {
        config.log_level = level.clone();
    }
    config.show_tokens |= options.show_tokens;
    config.print_stats |= options.print_stats;
    config.level().map_err(|e| e.to_string())?;
    Ok(config)
}

fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        let path = Path::new(input);
        if !path.exists() {
            return Err(format!("Input file not found: {}", input));
        }
        fs::read_to_string(path).map_err(|e| format!("Failed to read file '{}': {}", input, e))
    }
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    init_logging(config.level().unwrap_or(Level::WARN));

    let source = match (&options.expr, &options.input) {
        (Some(expr), _) => expr.clone(),
        (None, Some(input)) => match read_input(input) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Error: Missing input file");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if config.show_tokens {
        for token in tokenize(&source) {
            println!("{}", token);
        }
    }

    let mut machine = Machine::new().with_max_parse_depth(config.max_parse_depth);

    // A source that does not read is unrecoverable: report and stop.
    if let Err(e) = machine.read(&source) {
        error!(target: "reglisp::main", %e, "read failed");
        eprintln!("Parse error: {}", e);
        process::exit(1);
    }

    println!("{}", machine.get(Register::Expr));

    if config.print_stats {
        println!("{}", machine.stats());
    }
}
