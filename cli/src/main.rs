mod convert;
mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use seqpat::{SyntaxError, Template};

#[derive(Parser)]
#[command(name = "seqpat", version, about = "Structural sequence pattern matcher")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a pattern and print its canonical form
    Check(CheckArgs),

    /// Match a value against a pattern and print the bindings
    Match(MatchArgs),

    /// Run .test.toml case files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Pattern source, e.g. "(head *rest)"
    pattern: String,
}

#[derive(clap::Args)]
struct MatchArgs {
    /// Pattern source, e.g. "(head (k v) ...)"
    pattern: String,

    /// Candidate value as a TOML value, e.g. '[1, [2, 3]]'; anything that is
    /// not valid TOML is matched as a bare string
    value: String,

    /// Dump the compiled pattern tree
    #[arg(long)]
    ast: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => do_check(args, cli.no_color),
        Command::Match(args) => do_match(args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// Install a stderr subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn do_check(args: CheckArgs, no_color: bool) {
    let template = compile_or_exit(&args.pattern, no_color);
    println!("{}", template);
    let names = template.variables();
    if names.is_empty() {
        println!("binds: (nothing)");
    } else {
        println!("binds: {}", names.join(", "));
    }
}

fn do_match(args: MatchArgs, no_color: bool) {
    let template = compile_or_exit(&args.pattern, no_color);

    if args.ast {
        println!("{:#?}", template);
    }

    let value = match convert::parse_value_arg(&args.value) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: invalid value '{}': {}", args.value, e);
            process::exit(1);
        }
    };

    match matcher::explain(&template, &value) {
        Ok(bindings) => {
            if bindings.is_empty() {
                println!("matched (no bindings)");
            } else {
                print!("{}", bindings);
            }
        }
        Err(mismatch) => {
            println!("no match: {}", mismatch);
            process::exit(1);
        }
    }
}

fn compile_or_exit(pattern: &str, no_color: bool) -> Template {
    let mut files = SimpleFiles::new();
    let file_id = files.add("<pattern>".to_string(), pattern.to_string());

    let parser = seqpat::Parser::new(pattern.to_string(), file_id);
    match parser.parse() {
        Ok(t) => {
            tracing::debug!(pattern, template = %t, "compiled pattern");
            t
        }
        Err(error) => {
            tracing::debug!(pattern, %error, "syntax error");
            emit_syntax_error(&files, &error, no_color);
            process::exit(1);
        }
    }
}

fn emit_syntax_error(files: &SimpleFiles<String, String>, error: &SyntaxError, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
}
