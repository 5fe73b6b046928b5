//! Interactive pipeline session.
//!
//! Reads one intent per line from stdin and drives the pipeline with it. The
//! prompt shows which intents the current stage allows; a failed step is
//! reported and the session carries on from the last completed stage.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use console::style;

use docscan::{Intent, PipelineController, Settings};

use crate::cli::helpers::{self, report};
use crate::cli::icons::{note, toggle, warn};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Load(PathBuf),
    Scan,
    Extract,
    Save(PathBuf),
    Status,
    Text,
    Help,
    Quit,
    Nothing,
}

/// Strip one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Nothing);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, unquote(rest.trim())),
        None => (line, ""),
    };

    let path_arg = |name: &str| {
        if rest.is_empty() {
            Err(format!("usage: {} <path>", name))
        } else {
            Ok(PathBuf::from(rest))
        }
    };

    match word.to_lowercase().as_str() {
        "load" | "open" => path_arg("load").map(ShellCommand::Load),
        "scan" => Ok(ShellCommand::Scan),
        "extract" => Ok(ShellCommand::Extract),
        "save" => path_arg("save").map(ShellCommand::Save),
        "status" => Ok(ShellCommand::Status),
        "text" => Ok(ShellCommand::Text),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{}' (try 'help')", other)),
    }
}

/// Prompt listing intents, enabled ones highlighted.
fn prompt(controller: &PipelineController) -> String {
    let intents = [Intent::Load, Intent::Scan, Intent::Extract, Intent::Save];
    let labels: Vec<String> = intents
        .iter()
        .map(|i| toggle(i.as_str(), controller.can(*i)))
        .collect();
    format!("[{}] {} ", labels.join(" "), style(">").bold())
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  load <image>   select an image (png, jpg, jpeg, bmp, tiff)");
    eprintln!("  scan           correct the loaded image's perspective");
    eprintln!("  extract        recognize text in the scanned image");
    eprintln!("  save <file>    write the extracted text to a file");
    eprintln!("  status         show the current document");
    eprintln!("  text           print the extracted text");
    eprintln!("  quit           leave the session");
}

fn print_status(controller: &PipelineController) {
    let doc = controller.document();
    let show = |p: Option<&std::path::Path>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    eprintln!("Stage:     {}", style(doc.stage()).bold());
    eprintln!("Original:  {}", show(doc.original_path()));
    eprintln!("Scanned:   {}", show(doc.scanned_path()));
    eprintln!(
        "Text:      {}",
        doc.extracted_text()
            .map(|t| format!("{} chars", t.chars().count()))
            .unwrap_or_else(|| "-".to_string())
    );
    eprintln!("Saved to:  {}", show(doc.saved_path()));
}

/// Run an interactive session until `quit` or end of input.
pub fn cmd_shell(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let mut controller = settings.create_pipeline()?;

    eprintln!(
        "{} Corrected images go to {}",
        note(),
        settings.output_dir.display()
    );
    eprintln!("{} Type 'help' for commands", note());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("{}", prompt(&controller));
        io::stderr().flush()?;

        let Some(line) = lines.next() else {
            eprintln!();
            break;
        };
        let command = match parse_line(&line?) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("{} {}", warn(), msg);
                continue;
            }
        };

        match command {
            ShellCommand::Load(path) => {
                let result = controller.load(&path);
                report(Intent::Load, &result, &controller);
            }
            ShellCommand::Scan => {
                let result = helpers::scan(&mut controller);
                report(Intent::Scan, &result, &controller);
            }
            ShellCommand::Extract => {
                let result = helpers::extract(&mut controller);
                report(Intent::Extract, &result, &controller);
            }
            ShellCommand::Save(path) => {
                let result = controller.save(&path);
                report(Intent::Save, &result, &controller);
            }
            ShellCommand::Status => print_status(&controller),
            ShellCommand::Text => match controller.document().extracted_text() {
                Some(text) => println!("{}", text),
                None => eprintln!("{} No text extracted yet", warn()),
            },
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => break,
            ShellCommand::Nothing => {}
        }
    }

    Ok(())
}
