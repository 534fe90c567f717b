// ABOUTME: Version info and REPL banner text for the D interpreter host

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "yahaha REPL";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for the D language";

pub const HELP_TEXT: &str = r#"
Available commands:
  exit                 - Exit the REPL
  :help                - Show this help message

Type any D statement, terminated by `;`, to evaluate it. Use Ctrl-D to exit.
"#;
