//! Interactive command-line front end for the TodoBot agent.
//!
//! Run with: `cargo run`
//!
//! Store locations and the model can be changed with `TODOBOT_DATA_DIR`,
//! `TODOBOT_MODEL` and `TODOBOT_OLLAMA_URL`.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use todobot_agent::start_todobot;
use todobot_agent::{AgentResult, TodoAgent};

/// Print the command reference.
fn print_help() {
    println!();
    println!("  Available commands:");
    println!("  - 'quit', 'exit', 'bye'  exit the chat");
    println!("  - 'clear'                clear conversation history");
    println!("  - 'todos'                show the to-do list without asking the model");
    println!("  - 'help'                 show this help message");
    println!();
    println!("  Todo requests (just type naturally):");
    println!("  - Add [task] to my todo list");
    println!("  - Show my todos");
    println!("  - Remove [task] from my list");
    println!("  - Clear my todo list");
}

/// Read one trimmed line; `None` on end of input.
fn prompt_line(stdin: &mut impl BufRead) -> AgentResult<Option<String>> {
    print!("\n  You: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = stdin.read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// What the loop should do after one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Quit,
    Help,
    Say(String),
}

/// Reply text, or the failure reported so the session can go on.
fn reply_line(reply: AgentResult<String>) -> String {
    match reply {
        Ok(text) => format!("TodoBot: {text}"),
        Err(e) => format!("Error: {e}. Please try again."),
    }
}

/// Handle one line of input.
fn step(agent: &mut TodoAgent, runtime: &tokio::runtime::Runtime, input: &str) -> Step {
    match input.to_lowercase().as_str() {
        "quit" | "exit" | "bye" => Step::Quit,
        "help" => Step::Help,
        "clear" => Step::Say(reply_line(
            agent.clear_conversation().map(str::to_string),
        )),
        "todos" => Step::Say(reply_line(
            agent.todos().list().map(|listing| listing.to_string()),
        )),
        "" => Step::Say("TodoBot: Please say something!".to_string()),
        _ => Step::Say(reply_line(runtime.block_on(agent.chat(input)))),
    }
}

/// Chat loop until the user leaves or input ends.
fn repl(agent: &mut TodoAgent, runtime: &tokio::runtime::Runtime) -> AgentResult<()> {
    let mut stdin = io::stdin().lock();

    while let Some(input) = prompt_line(&mut stdin)? {
        match step(agent, runtime, &input) {
            Step::Quit => break,
            Step::Help => print_help(),
            Step::Say(line) => println!("  {line}"),
        }
    }

    println!("  Goodbye! Have a great day!");
    Ok(())
}

fn main() -> ExitCode {
    start_todobot::init_tracing();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║                 TodoBot CLI               ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!("  Welcome! I'm your personal todo assistant.");
    println!("  Type 'help' for available commands.");

    let mut agent = match start_todobot::initialize() {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("  Error initializing agent: {e}");
            return ExitCode::from(1);
        }
    };

    match agent.conversation().user_name() {
        Some(name) => println!("  Welcome back, {name}!"),
        None => println!("  Hello! What's your name?"),
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("  Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = repl(&mut agent, &runtime) {
        eprintln!("  Error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
