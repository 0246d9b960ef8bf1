//! lexedit - Command-line driver for the editor core.
//!
//! Usage: lexedit [--options FILE] <COMMAND> FILE ...

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lexedit_core::{
    Document, Encoding, FindOptions, FindResultWriter, LanguageProfile, TextBuffer, TextOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lexedit", version, about = "Indent, lex and search source files")]
struct Cli {
    /// JSON file with text options (tab_stop, shift_width, expand_tab, ...)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[arg(long, global = true)]
    tab_stop: Option<usize>,

    #[arg(long, global = true)]
    shift_width: Option<usize>,

    /// Indent with tabs instead of spaces
    #[arg(long, global = true)]
    tabs: bool,

    /// Encoding of the input file
    #[arg(long, global = true, value_enum, default_value_t = EncodingArg::Utf8)]
    encoding: EncodingArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-indent a file, or print the computed indent of one line
    Indent {
        file: PathBuf,
        /// Only print the indent width of this 1-based line
        #[arg(long)]
        line: Option<usize>,
        /// Write the result back instead of printing it
        #[arg(long)]
        in_place: bool,
    },
    /// List every match of a pattern
    Find {
        file: PathBuf,
        pattern: String,
        #[command(flatten)]
        find: FindArgs,
    },
    /// Replace every match of a pattern
    Replace {
        file: PathBuf,
        pattern: String,
        replacement: String,
        #[command(flatten)]
        find: FindArgs,
        #[arg(long)]
        in_place: bool,
    },
    /// Print the lexical spans of every line
    Lex { file: PathBuf },
}

#[derive(Args, Debug)]
struct FindArgs {
    /// Treat the pattern as a regular expression
    #[arg(long)]
    regex: bool,
    #[arg(long)]
    case_sensitive: bool,
    #[arg(long)]
    whole_word: bool,
}

impl From<&FindArgs> for FindOptions {
    fn from(args: &FindArgs) -> Self {
        FindOptions {
            use_regex: args.regex,
            case_sensitive: args.case_sensitive,
            match_whole_word: args.whole_word,
            reverse: false,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Utf8,
    Utf16le,
    Utf16be,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Utf16le => Encoding::Utf16Le,
            EncodingArg::Utf16be => Encoding::Utf16Be,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Indent {
            file,
            line,
            in_place,
        } => {
            let mut doc = open(&cli, file)?;
            if let Some(line) = *line {
                let indent = doc.compute_indent(line)?;
                println!("{}", doc.options().indent_width(&indent));
                return Ok(());
            }
            let last = doc.buffer().line_count();
            let changed = doc.reindent_lines(1, last)?;
            log::info!("Re-indented {} line(s) in {}", changed, file.display());
            emit(&doc, file, *in_place)?;
        }
        Command::Find {
            file,
            pattern,
            find,
        } => {
            let doc = open(&cli, file)?;
            let mut writer = FindResultWriter::new();
            let count = writer.find_all(
                &file.display().to_string(),
                doc.buffer(),
                pattern,
                &FindOptions::from(find),
            )?;
            if count == 0 {
                log::info!("No match for {:?}", pattern);
                return Ok(());
            }
            for line in writer.buffer().lines() {
                println!("{}", line.text());
            }
        }
        Command::Replace {
            file,
            pattern,
            replacement,
            find,
            in_place,
        } => {
            let mut doc = open(&cli, file)?;
            let range = doc.buffer().range();
            let count = doc.replace_all(pattern, replacement, range, &FindOptions::from(find))?;
            log::info!("Replaced {} match(es) in {}", count, file.display());
            emit(&doc, file, *in_place)?;
        }
        Command::Lex { file } => {
            let doc = open(&cli, file)?;
            for (nr, line) in doc.buffer().lines().enumerate() {
                let spans: Vec<String> = line
                    .spans()
                    .iter()
                    .map(|s| format!("{:?}@{}+{}", s.kind, s.offset, s.len))
                    .collect();
                println!("{:>4} {}", nr + 1, spans.join(" "));
            }
        }
    }
    Ok(())
}

/// Loads `path` into a document with the options resolved from the command
/// line.
fn open(cli: &Cli, path: &Path) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let profile = LanguageProfile::for_path(path)?;
    log::debug!("{} detected as {}", path.display(), profile.language().name());

    let buffer = TextBuffer::from_bytes(&bytes, cli.encoding.into(), profile)?;
    let mut doc = Document::with_buffer(buffer);
    let options = resolve_options(cli, doc.options().clone())?;
    doc.set_options(options)?;
    Ok(doc)
}

fn resolve_options(cli: &Cli, defaults: TextOptions) -> Result<TextOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid options in {}", path.display()))?
        }
        None => defaults,
    };
    if let Some(tab_stop) = cli.tab_stop {
        options.tab_stop = tab_stop;
    }
    if let Some(shift_width) = cli.shift_width {
        options.shift_width = shift_width;
    }
    if cli.tabs {
        options.expand_tab = false;
    }
    Ok(options)
}

fn emit(doc: &Document, path: &Path, in_place: bool) -> Result<()> {
    let text = doc.text();
    if !in_place {
        print!("{}", text);
        return Ok(());
    }
    if !doc.is_modified() {
        log::info!("{} unchanged", path.display());
        return Ok(());
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
