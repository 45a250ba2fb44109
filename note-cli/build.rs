use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the format names registered by note_babel::FormatRegistry::with_defaults
// We need to duplicate this here since build scripts can't access the library
const AVAILABLE_FORMATS: &[&str] = &["apple-notes", "enex", "keep", "markdown"];
const READABLE_FORMATS: &[&str] = &["enex", "keep", "markdown"];

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format")
        .value_parser(clap::builder::PossibleValuesParser::new(READABLE_FORMATS))
        .value_hint(ValueHint::Other)
}

fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .help("Input files or .zip bundles")
        .required(true)
        .num_args(1..)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("notebabel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert note exports between Evernote, Google Keep and Markdown")
        .arg_required_else_help(true)
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
                .help("Increase log verbosity")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between note formats (default command)")
                .arg(inputs_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_FORMATS,
                        ))
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the canonical notes read from the inputs as JSON")
                .arg(inputs_arg())
                .arg(from_arg()),
        )
        .subcommand(Command::new("formats").about("List available formats"));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "notebabel", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "notebabel", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "notebabel", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
