// ABOUTME: CLI/REPL host — registers the builtins the core knows nothing about
// ABOUTME: and drives either a script file or an interactive session.

mod config;

use clap::Parser as _;
use config::{HELP_TEXT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use yahaha::env::Environment;
use yahaha::error::{RuntimeError, ARITY_ONE};
use yahaha::value::Value;
use yahaha::{builtins::register_builtin, exec, parse};

/// A tree-walking interpreter for the D language.
#[derive(clap::Parser, Debug)]
#[command(name = "yahaha")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for the D language")]
struct CliArgs {
    /// Script file to execute (`.yahaha`). If omitted, starts a REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let env = Environment::new();
    register_host_builtins(&env);

    if let Some(script_path) = args.script {
        run_script(&script_path, &env)?;
        return Ok(());
    }

    run_repl(&env)
}

/// Installs the builtins a D program can rely on: console I/O, the
/// `assert` sanity check, and the three `read*` input primitives (spec
/// §1 "Host responsibilities" — none of these live in the core).
fn register_host_builtins(env: &Rc<Environment>) {
    register_builtin(
        env,
        "print",
        Rc::new(|args: &[Value]| {
            for arg in args {
                print!("{}", arg);
            }
            let _ = std::io::stdout().flush();
            Ok(Value::Empty)
        }),
    );

    register_builtin(
        env,
        "println",
        Rc::new(|args: &[Value]| {
            for arg in args {
                print!("{}", arg);
            }
            println!();
            Ok(Value::Empty)
        }),
    );

    register_builtin(
        env,
        "assert",
        Rc::new(|args: &[Value]| match args {
            [Value::Bool(true)] => Ok(Value::Empty),
            [Value::Bool(false)] => Err(RuntimeError::Default("assertion failed".to_string())),
            [other] => Err(RuntimeError::type_error("bool", other)),
            _ => Err(RuntimeError::arity_error(ARITY_ONE, args.len())),
        }),
    );

    register_builtin(
        env,
        "readInt",
        Rc::new(|_| read_line_as(&|s| s.parse::<i64>().ok().map(Value::Int))),
    );
    register_builtin(
        env,
        "readReal",
        Rc::new(|_| read_line_as(&|s| s.parse::<f64>().ok().map(Value::Real))),
    );
    register_builtin(
        env,
        "readString",
        Rc::new(|_| read_line_as(&|s| Some(Value::String(s.to_string())))),
    );
}

fn read_line_as(convert: &dyn Fn(&str) -> Option<Value>) -> Result<Value, RuntimeError> {
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::Default(format!("failed to read input: {}", e)))?;
    convert(line.trim()).ok_or_else(|| RuntimeError::Default("malformed input".to_string()))
}

fn run_script(path: &PathBuf, env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {}", path.display(), e))?;

    let program = parse(&source).map_err(|e| format!("parse error: {}", e))?;
    exec(env, &program).map_err(|e| format!("runtime error: {}", e))?;
    Ok(())
}

fn run_repl(env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(config)?;

    let history_file = ".yahaha_history";
    let _ = rl.load_history(history_file);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    // Lines accumulate here until they form a complete, semicolon-terminated
    // statement — the REPL feeds the parser one statement at a time.
    let pending = RefCell::new(String::new());

    loop {
        let prompt = if pending.borrow().is_empty() {
            "d> "
        } else {
            "..> "
        };
        let readline = rl.readline(prompt);

        match readline {
            Ok(line) => {
                if pending.borrow().is_empty() {
                    match line.trim() {
                        "exit" => {
                            println!("Goodbye!");
                            break;
                        }
                        ":help" => {
                            println!("{}", HELP_TEXT);
                            continue;
                        }
                        _ => {}
                    }
                }

                pending.borrow_mut().push_str(&line);
                pending.borrow_mut().push('\n');

                if !pending.borrow().trim_end().ends_with(';') {
                    continue;
                }

                let source = pending.borrow().clone();
                pending.borrow_mut().clear();

                match parse(&source) {
                    Ok(program) => match exec(env, &program) {
                        Ok(value) => println!("=> {}", value),
                        Err(e) => eprintln!("Error: {}", e),
                    },
                    Err(e) => eprintln!("Parse error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.borrow_mut().clear();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
