use std::io::{self, BufRead, IsTerminal, Read};

use anyhow::{anyhow, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "codescribe",
    version,
    about = "Turn handwritten code drawings into runnable scripts"
)]
struct Cli {
    /// Drawing to recognize (PNG/JPEG image or stroke JSON file)
    #[arg(short = 'd', long = "drawing")]
    drawing: Option<String>,

    /// Recognizer backend: local (tesseract) or remote (Vision API)
    #[arg(short = 'p', long = "provider")]
    provider: Option<String>,

    /// Target programming language (e.g. "Python 3", "Java")
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// API key for the remote recognizer (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Saved file to merge recognized code into
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Execute the merged script and append its output
    #[arg(short = 'x', long = "execute")]
    execute: bool,

    /// Rasterization scale for stroke drawings
    #[arg(long = "scale")]
    scale: Option<f32>,

    /// Create a saved file seeded with the language template and exit
    #[arg(long = "new-file")]
    new_file: Option<String>,

    /// Delete a saved file by name and exit
    #[arg(long = "delete-file")]
    delete_file: Option<String>,

    /// Show saved files and exit
    #[arg(long = "show-files")]
    show_files: bool,

    /// Show supported languages and exit
    #[arg(long = "show-languages")]
    show_languages: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,

    /// Interactive mode
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    codescribe::logging::init(cli.verbose)?;
    if cli.interactive {
        return run_interactive(cli).await;
    }

    let needs_input = !(cli.show_files
        || cli.show_languages
        || cli.new_file.is_some()
        || cli.delete_file.is_some());
    let stdin_bytes = if needs_input {
        if cli.drawing.is_some() && io::stdin().is_terminal() {
            None
        } else {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Some(buffer)
        }
    } else {
        None
    };
    let input = stdin_bytes.filter(|bytes| !bytes.is_empty());

    let output = codescribe::run(
        codescribe::Config {
            drawing: cli.drawing,
            provider: cli.provider,
            language: cli.language,
            key: cli.key,
            file: cli.file,
            execute: cli.execute,
            scale: cli.scale,
            new_file: cli.new_file,
            delete_file: cli.delete_file,
            show_files: cli.show_files,
            show_languages: cli.show_languages,
            settings_path: cli.read_settings,
        },
        input,
    )
    .await?;

    println!("{}", output);
    Ok(())
}

struct InteractiveState {
    config: codescribe::Config,
}

impl InteractiveState {
    fn new(cli: &Cli) -> Self {
        Self {
            config: codescribe::Config {
                drawing: cli.drawing.clone(),
                provider: cli.provider.clone(),
                language: cli.language.clone(),
                key: cli.key.clone(),
                file: cli.file.clone(),
                execute: cli.execute,
                scale: cli.scale,
                new_file: None,
                delete_file: None,
                show_files: false,
                show_languages: false,
                settings_path: cli.read_settings.clone(),
            },
        }
    }

    fn config_for_run(&self) -> codescribe::Config {
        let mut config = self.config.clone();
        config.new_file = None;
        config.delete_file = None;
        config.show_files = false;
        config.show_languages = false;
        config
    }
}

async fn run_interactive(cli: Cli) -> Result<()> {
    use std::io::Write;

    let mut state = InteractiveState::new(&cli);
    println!("Interactive mode. Use /quit or /exit to finish.");
    println!("Type /help to see available commands.");

    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.starts_with('/') {
            if handle_interactive_command(input, &mut state).await? {
                break;
            }
            continue;
        }
        eprintln!("drawings come from /drawing <path>; type /help for commands");
    }
    Ok(())
}

// Recognition and execution failures end the request, not the session.
async fn run_and_print(config: codescribe::Config) {
    match codescribe::run(config, None).await {
        Ok(output) => println!("{}", output),
        Err(err) => eprintln!("error: {:#}", err),
    }
}

async fn handle_interactive_command(input: &str, state: &mut InteractiveState) -> Result<bool> {
    let trimmed = input.trim();
    if matches!(trimmed, "/quit" | "/exit") {
        return Ok(true);
    }
    if trimmed == "/help" {
        print_interactive_help();
        return Ok(false);
    }
    if trimmed == "/show-files" {
        let mut config = state.config_for_run();
        config.show_files = true;
        run_and_print(config).await;
        return Ok(false);
    }
    if trimmed == "/show-languages" {
        let mut config = state.config_for_run();
        config.show_languages = true;
        run_and_print(config).await;
        return Ok(false);
    }
    if trimmed == "/run" {
        run_and_print(state.config_for_run()).await;
        return Ok(false);
    }

    if let Some(arg) = trimmed.strip_prefix("/new-file") {
        let value = arg.trim();
        if value.is_empty() {
            eprintln!("usage: /new-file <name>");
            return Ok(false);
        }
        let mut config = state.config_for_run();
        config.new_file = Some(value.to_string());
        run_and_print(config).await;
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/delete-file") {
        let value = arg.trim();
        if value.is_empty() {
            eprintln!("usage: /delete-file <name>");
            return Ok(false);
        }
        let mut config = state.config_for_run();
        config.delete_file = Some(value.to_string());
        run_and_print(config).await;
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/drawing") {
        let value = arg.trim();
        if value.is_empty() {
            println!(
                "drawing: {}",
                state.config.drawing.as_deref().unwrap_or("(none)")
            );
        } else if value == "clear" {
            state.config.drawing = None;
            println!("drawing cleared");
        } else {
            state.config.drawing = Some(value.to_string());
            println!("drawing set to {}", value);
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/provider") {
        let value = arg.trim();
        if value.is_empty() {
            println!(
                "provider: {}",
                state.config.provider.as_deref().unwrap_or("(settings)")
            );
        } else {
            state.config.provider = Some(value.to_string());
            println!("provider set to {}", value);
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/language") {
        let value = arg.trim();
        if value.is_empty() {
            println!(
                "language: {}",
                state.config.language.as_deref().unwrap_or("(settings)")
            );
        } else {
            state.config.language = Some(value.to_string());
            println!("language set to {}", value);
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/file") {
        let value = arg.trim();
        if value.is_empty() {
            println!("file: {}", state.config.file.as_deref().unwrap_or("(none)"));
        } else if value == "clear" {
            state.config.file = None;
            println!("file cleared");
        } else {
            state.config.file = Some(value.to_string());
            println!("file set to {}", value);
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/scale") {
        let value = arg.trim();
        if value.is_empty() {
            match state.config.scale {
                Some(scale) => println!("scale: {}", scale),
                None => println!("scale: (settings)"),
            }
        } else {
            match value.parse::<f32>() {
                Ok(scale) => {
                    state.config.scale = Some(scale);
                    println!("scale set to {}", scale);
                }
                Err(_) => eprintln!("expected a number, got '{}'", value),
            }
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/execute") {
        match parse_toggle(arg, state.config.execute) {
            Ok(execute) => {
                state.config.execute = execute;
                println!("execute: {}", state.config.execute);
            }
            Err(err) => eprintln!("{}", err),
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/key") {
        let value = arg.trim();
        if value.is_empty() {
            println!(
                "key: {}",
                state
                    .config
                    .key
                    .as_deref()
                    .map(|_| "(set)")
                    .unwrap_or("(none)")
            );
        } else {
            state.config.key = Some(value.to_string());
            println!("key set");
        }
        return Ok(false);
    }

    eprintln!("unknown command: {}", trimmed);
    Ok(false)
}

fn parse_toggle(arg: &str, current: bool) -> Result<bool> {
    let value = arg.trim();
    if value.is_empty() {
        return Ok(!current);
    }
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("expected on/off/true/false/1/0")),
    }
}

fn print_interactive_help() {
    println!("Commands:");
    println!("  /quit, /exit             Exit interactive mode");
    println!("  /run                     Recognize the current drawing");
    println!("  /show-files              Show saved files");
    println!("  /show-languages          Show supported languages");
    println!("  /new-file <name>         Create a saved file");
    println!("  /delete-file <name>      Delete a saved file");
    println!("  /drawing <path|clear>    Set the drawing to recognize");
    println!("  /provider <local|remote> Set the recognizer backend");
    println!("  /language <name>         Set the target language");
    println!("  /file <name|clear>       Set the saved file to merge into");
    println!("  /scale <n>               Set the rasterization scale");
    println!("  /execute [on|off]        Toggle script execution");
    println!("  /key <api-key>           Set the remote recognizer key");
}
