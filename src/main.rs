//! synocalc command line shell: one-shot evaluation or an interactive
//! session around the calculator core.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use synocalc::calculator::{self, Evaluation, Mode};
use synocalc::functions;
use synocalc::history::{self, History};
use synocalc::settings::{self, Language, Settings};

/// Smart calculator with natural-language input and mode auto-detection.
#[derive(Debug, Parser)]
#[command(name = "synocalc", version, about)]
struct Cli {
    /// Expression to evaluate; starts an interactive session when omitted.
    expression: Vec<String>,

    /// Evaluation mode to start in (persisted).
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Disable mode auto-detection for this run.
    #[arg(long)]
    no_detect: bool,

    /// Copy the result to the clipboard.
    #[arg(long)]
    copy: bool,

    /// Print example inputs for the selected mode and exit.
    #[arg(long)]
    examples: bool,

    /// Interface language (persisted).
    #[arg(long, value_enum)]
    lang: Option<Language>,
}

/// Shell labels per language.
struct Labels {
    banner: &'static str,
    detected: &'static str,
    copied: &'static str,
    nothing_to_copy: &'static str,
    history_empty: &'static str,
    cleared: &'static str,
    unknown_command: &'static str,
    unknown_mode: &'static str,
    goodbye: &'static str,
}

const LABELS_DE: Labels = Labels {
    banner: "synocalc – Eingabe auswerten, :help für Befehle",
    detected: "Modus erkannt",
    copied: "Ergebnis kopiert",
    nothing_to_copy: "Kein Ergebnis zum Kopieren",
    history_empty: "Verlauf ist leer",
    cleared: "Verlauf gelöscht",
    unknown_command: "Unbekannter Befehl",
    unknown_mode: "Unbekannter Modus",
    goodbye: "Bis bald",
};

const LABELS_EN: Labels = Labels {
    banner: "synocalc – type an expression, :help for commands",
    detected: "mode detected",
    copied: "result copied",
    nothing_to_copy: "no result to copy",
    history_empty: "history is empty",
    cleared: "history cleared",
    unknown_command: "unknown command",
    unknown_mode: "unknown mode",
    goodbye: "bye",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::De => &LABELS_DE,
        Language::En => &LABELS_EN,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let settings_path = settings::default_path();
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(lang) = cli.lang {
        settings.language = lang;
    }
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    if cli.no_detect {
        settings.auto_detect = false;
    }
    if cli.lang.is_some() || cli.mode.is_some() {
        persist_settings(&settings, settings_path.as_deref());
    }

    if cli.examples {
        print_examples(settings.mode);
        return Ok(());
    }

    if !cli.expression.is_empty() {
        let input = cli.expression.join(" ");
        return evaluate_once(&input, &settings, cli.copy);
    }

    repl(settings, settings_path)
}

fn persist_settings(settings: &Settings, path: Option<&std::path::Path>) {
    if let Some(path) = path
        && let Err(err) = settings.save(path)
    {
        eprintln!("warning: could not save settings: {err:#}");
    }
}

fn print_examples(mode: Mode) {
    println!("[{mode}]");
    for example in functions::examples(mode) {
        println!("  {example}");
    }
    for group in functions::function_groups(mode) {
        let items: Vec<&str> = group.items.iter().map(|item| item.label).collect();
        println!("{}: {}", group.title, items.join("  "));
    }
}

fn evaluate_once(input: &str, settings: &Settings, copy: bool) -> Result<()> {
    let Some(evaluation) = calculator::evaluate(input, settings.mode, settings.auto_detect) else {
        anyhow::bail!("empty input");
    };
    print_evaluation(input, &evaluation, settings.language);

    if let Some(path) = history::default_path() {
        let mut hist = History::load(&path);
        hist.add(
            input,
            evaluation.result.expression(),
            evaluation.result.display(),
        );
        if let Err(err) = hist.save(&path) {
            eprintln!("warning: could not save history: {err:#}");
        }
    }

    if copy {
        copy_to_clipboard(evaluation.result.display())?;
        println!("{}", labels(settings.language).copied);
    }
    if !evaluation.result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_evaluation(input: &str, evaluation: &Evaluation, language: Language) {
    let normalized = evaluation.result.expression();
    if normalized != input.trim() {
        println!("  → {normalized}");
    }
    if evaluation.auto_detected {
        println!("  [{}: {}]", labels(language).detected, evaluation.mode);
    }
    println!("  = {}", evaluation.result.display());
}

fn repl(mut settings: Settings, settings_path: Option<PathBuf>) -> Result<()> {
    let l = labels(settings.language);
    println!("{}", l.banner);

    let history_path = history::default_path();
    let mut hist = history_path
        .as_deref()
        .map(History::load)
        .unwrap_or_default();
    let mut last_result: Option<String> = None;

    let stdin = io::stdin();
    loop {
        print!("[{}] > ", settings.mode);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            if !run_command(command, &mut settings, settings_path.as_deref(), &mut hist, &last_result)? {
                break;
            }
            continue;
        }

        match calculator::evaluate(line, settings.mode, settings.auto_detect) {
            Some(evaluation) => {
                print_evaluation(line, &evaluation, settings.language);
                hist.add(
                    line,
                    evaluation.result.expression(),
                    evaluation.result.display(),
                );
                if evaluation.result.is_success() {
                    last_result = Some(evaluation.result.display().to_string());
                }
            }
            None => continue,
        }
    }

    if let Some(path) = history_path.as_deref()
        && let Err(err) = hist.save(path)
    {
        eprintln!("warning: could not save history: {err:#}");
    }
    println!("{}", labels(settings.language).goodbye);
    Ok(())
}

/// Handle a `:command`; returns false when the session should end.
fn run_command(
    command: &str,
    settings: &mut Settings,
    settings_path: Option<&std::path::Path>,
    hist: &mut History,
    last_result: &Option<String>,
) -> Result<bool> {
    let l = labels(settings.language);
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" | "exit" => return Ok(false),
        "help" => {
            println!(":mode <basic|developer|finance|advanced>  :lang <de|en>");
            println!(":examples  :history  :fav <id>  :clear  :copy  :quit");
        }
        "mode" => match Mode::parse(arg) {
            Some(mode) => {
                settings.mode = mode;
                persist_settings(settings, settings_path);
            }
            None => println!("{}: {arg:?}", l.unknown_mode),
        },
        "lang" => match Language::parse(arg) {
            Some(language) => {
                settings.language = language;
                persist_settings(settings, settings_path);
            }
            None => println!("{}: {arg:?}", l.unknown_command),
        },
        "examples" => print_examples(settings.mode),
        "history" => {
            if hist.is_empty() {
                println!("{}", l.history_empty);
            }
            for entry in hist.entries().iter().take(10) {
                let star = if entry.favorite { "★" } else { " " };
                println!("{star} #{:<4} {} = {}", entry.id, entry.expr, entry.result);
            }
        }
        "fav" => match arg.parse::<u64>().ok().and_then(|id| hist.toggle_favorite(id)) {
            Some(state) => println!("#{arg} ★ {state}"),
            None => println!("{}: {arg:?}", l.unknown_command),
        },
        "clear" => {
            hist.clear();
            println!("{}", l.cleared);
        }
        "copy" => match last_result {
            Some(text) => {
                copy_to_clipboard(text)?;
                println!("{}", l.copied);
            }
            None => println!("{}", l.nothing_to_copy),
        },
        _ => println!("{}: {name:?}", l.unknown_command),
    }
    Ok(true)
}

/// Copy text to the system clipboard.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("failed to access clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to copy to clipboard")?;
    Ok(())
}
