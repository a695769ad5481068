use anyhow::{Context, Result, bail};
use blockmark_config::Config;
use blockmark_engine::io::{self, DocumentFormat};
use blockmark_engine::{Action, Editor, EditorOptions};
use std::path::{Path, PathBuf};
use std::{env, process};

const USAGE: &str = "Usage: blockmark-cli <parse|render|roundtrip|validate> <document> [output]";

#[derive(Debug, PartialEq)]
enum Command {
    /// Print the document as block interchange JSON.
    Parse(PathBuf),
    /// Print the document as markdown, or write it to `output` in the format of its extension.
    Render {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    /// Parse then serialize, and report whether the markdown survived unchanged.
    Roundtrip(PathBuf),
    /// Report parse diagnostics and blocks of unregistered types.
    Validate(PathBuf),
}

impl Command {
    fn from_args(args: &[String]) -> Result<Self> {
        let path = |index: usize| -> Result<PathBuf> {
            args.get(index)
                .map(PathBuf::from)
                .with_context(|| format!("missing document path\n{USAGE}"))
        };
        let command = match args.get(1).map(String::as_str) {
            Some("parse") => Command::Parse(path(2)?),
            Some("render") => Command::Render {
                input: path(2)?,
                output: args.get(3).map(PathBuf::from),
            },
            Some("roundtrip") => Command::Roundtrip(path(2)?),
            Some("validate") => Command::Validate(path(2)?),
            Some(other) => bail!("unknown command '{other}'\n{USAGE}"),
            None => bail!("{USAGE}"),
        };
        Ok(command)
    }
}

/// Outcome of a command: what to print and whether it succeeded.
struct Report {
    output: String,
    ok: bool,
}

fn open(path: &Path, options: &EditorOptions) -> Result<Editor> {
    let mut editor = Editor::new(vec![], options.clone());
    let report = io::read_document(path, editor.registry())
        .with_context(|| format!("failed to open {}", path.display()))?;
    editor.set_blocks(report.blocks);
    for diagnostic in report.diagnostics {
        log::warn!("{}: {diagnostic}", path.display());
        editor.dispatch(Action::ReportError(diagnostic));
    }
    Ok(editor)
}

fn run(command: Command, config: &Config) -> Result<Report> {
    let options = &config.editor;
    match command {
        Command::Parse(path) => {
            let editor = open(&config.resolve_document(&path), options)?;
            Ok(Report {
                output: editor.to_json()?,
                ok: true,
            })
        }
        Command::Render { input, output } => {
            let editor = open(&config.resolve_document(&input), options)?;
            match output {
                Some(output) => {
                    let output = config.resolve_document(&output);
                    io::write_document(&output, editor.blocks(), editor.registry())
                        .with_context(|| format!("failed to write {}", output.display()))?;
                    log::info!("wrote {} blocks to {}", editor.blocks().len(), output.display());
                    Ok(Report {
                        output: String::new(),
                        ok: true,
                    })
                }
                None => Ok(Report {
                    output: editor.markdown(),
                    ok: true,
                }),
            }
        }
        Command::Roundtrip(path) => {
            let path = config.resolve_document(&path);
            if DocumentFormat::from_path(&path)? != DocumentFormat::Markdown {
                bail!("roundtrip needs a markdown document: {}", path.display());
            }
            let original = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let editor = Editor::from_markdown(&original, options.clone());
            let rendered = editor.markdown();
            let ok = rendered == original.trim_end_matches('\n');
            let output = if ok {
                format!("{}: {} blocks, lossless", path.display(), editor.blocks().len())
            } else {
                format!("{}: normalized to\n{rendered}", path.display())
            };
            Ok(Report { output, ok })
        }
        Command::Validate(path) => {
            let path = config.resolve_document(&path);
            let mut editor = open(&path, options)?;
            let lines: Vec<String> = editor
                .validate()
                .iter()
                .map(|error| format!("{}: {error}", path.display()))
                .collect();
            let ok = lines.is_empty();
            let output = if ok {
                format!("{}: {} blocks, no problems", path.display(), editor.blocks().len())
            } else {
                lines.join("\n")
            };
            Ok(Report { output, ok })
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let command = match Command::from_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            log::warn!("ignoring config file {}: {e}", Config::config_path().display());
            Config::default()
        }
    };

    let report = run(command, &config)?;
    if !report.output.is_empty() {
        println!("{}", report.output);
    }
    if !report.ok {
        process::exit(1);
    }
    Ok(())
}
