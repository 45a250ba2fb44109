// Command-line interface for note-babel
//
// Converts note exports between Evernote ENEX, Google Keep Takeout HTML and Markdown.
// All conversion logic lives in the note-babel crate; this binary reads files (expanding .zip
// bundles), picks formats, and writes the result.
//
// Usage:
//  notebabel <inputs>... --to <format> [--from <format>] [-o <path>]          - Convert (default)
//  notebabel convert <inputs>... --to <format> [--from <format>] [-o <path>]  - Same as above
//  notebabel inspect <inputs>... [--from <format>]                            - Notes as JSON
//  notebabel formats                                                          - List formats
//
// The source format is auto-detected from the input extensions (entries, for .zip inputs) and
// can be forced with --from. Formats producing several files (keep, markdown) are written as a
// zip archive and need -o.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use env_logger::Env;
use note_babel::{Converter, ConvertOptions, FormatRegistry, RawDocument, ReadOutcome};
use note_cli::{inspect, io};
use note_config::{Loader, NoteBabelConfig};
use std::path::{Path, PathBuf};

const SUBCOMMANDS: &[&str] = &["convert", "inspect", "formats", "help"];

fn build_cli() -> Command {
    Command::new("notebabel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert note exports between Evernote, Google Keep and Markdown")
        .long_about(
            "notebabel converts note-taking application exports.\n\n\
            Commands:\n  \
            - convert: Read notes in one format and write them in another\n  \
            - inspect: Print the notes read from the inputs as JSON\n  \
            - formats: List the available formats\n\n\
            Examples:\n  \
            notebabel export.enex --to markdown -o notes.zip    # Evernote to Markdown\n  \
            notebabel takeout.zip --to enex -o notes.enex       # Keep Takeout to Evernote\n  \
            notebabel notes/*.md --to apple-notes -o apple.enex # Markdown to Apple Notes",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a notebabel.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress (-v) or debugging detail (-vv) to stderr")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between note formats (default command)")
                .long_about(
                    "Convert notes between formats.\n\n\
                    Supported formats:\n  \
                    - enex:        Evernote export (.enex), read and write\n  \
                    - apple-notes: ENEX for Apple Notes import, write only\n  \
                    - keep:        Google Keep Takeout HTML (.html), read and write\n  \
                    - markdown:    Markdown (.md), read and write\n\n\
                    Inputs may be files or .zip bundles. The source format is auto-detected\n\
                    from the file extensions. ENEX output goes to stdout unless -o is given;\n\
                    keep and markdown output is a zip archive and requires -o.",
                )
                .arg(inputs_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout for single documents)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the canonical notes read from the inputs as JSON")
                .arg(inputs_arg())
                .arg(from_arg()),
        )
        .subcommand(Command::new("formats").about("List available formats"))
}

fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .help("Input files or .zip bundles")
        .required(true)
        .num_args(1..)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format (auto-detected from file extensions if not specified)")
        .value_hint(ValueHint::Other)
}

fn main() {
    // If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if args.len() > 1
                && !args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let converter =
        Converter::new(config.registry()).with_options(ConvertOptions::from(&config));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => handle_convert_command(&converter, sub_matches),
        Some(("inspect", sub_matches)) => handle_inspect_command(&converter, sub_matches),
        Some(("formats", _)) => handle_formats_command(converter.registry()),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn input_paths(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<String>("inputs")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default()
}

/// `--from`, or the format detected from the inputs.
fn source_format(registry: &FormatRegistry, matches: &ArgMatches, paths: &[&Path]) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.to_string();
    }
    match io::detect_format(registry, paths) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect the source format from the input names");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

/// Read the inputs as `from`, exiting on I/O failure.
fn read_inputs(converter: &Converter, from: &str, paths: &[&Path]) -> Vec<RawDocument> {
    let extensions = match converter.registry().reader(from) {
        Ok(reader) => reader.file_extensions().to_vec(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    io::collect_documents(paths, &extensions).unwrap_or_else(|e| {
        eprintln!("Error reading input {e}");
        std::process::exit(1);
    })
}

fn handle_convert_command(converter: &Converter, matches: &ArgMatches) {
    let paths = input_paths(matches);
    let paths: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    let from = source_format(converter.registry(), matches, &paths);
    let to = matches.get_one::<String>("to").map_or("", |s| s.as_str());
    let docs = read_inputs(converter, &from, &paths);

    let result = converter.convert(&from, to, &docs).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let output = matches.get_one::<String>("output").map(Path::new);
    if let Err(e) = io::write_output(&result.output, output) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    log::info!(
        "wrote {} note(s) as {to} ({} file(s))",
        result.note_count,
        result.output.entry_count()
    );
}

fn handle_inspect_command(converter: &Converter, matches: &ArgMatches) {
    let paths = input_paths(matches);
    let paths: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    let from = source_format(converter.registry(), matches, &paths);
    let docs = read_inputs(converter, &from, &paths);

    let outcome: ReadOutcome = converter.read(&from, &docs).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    match inspect::render_json(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn handle_formats_command(registry: &FormatRegistry) {
    println!("Available formats:\n");
    for entry in registry.entries() {
        let format = entry.format();
        let direction = match entry.direction() {
            Some(_) if !entry.is_enabled() => "disabled".to_string(),
            Some(direction) => direction.to_string(),
            None => "-".to_string(),
        };
        let extensions = format
            .file_extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:<12} {:<9} {:<18} {}",
            format.name(),
            direction,
            extensions,
            format.description()
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> NoteBabelConfig {
    let loader = Loader::new().with_optional_file("notebabel.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
