//! weft command-line front end
//!
//! Parses a file or an inline string and prints the tree in the html5lib
//! test format, the token stream, or the parse errors.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use weft_common::warning::clear_warnings;
use weft_dom::dump::{test_format, test_format_nodes};
use weft_dom::{DomTree, Namespace};
use weft_html::{
    HTMLTokenizer, InputStream, ParseError, ParserOptions, parse_document, parse_fragment,
    parse_text_with,
};

/// weft: a WHATWG HTML parser
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    weft page.html

    # Parse inline HTML and show the parse errors too
    weft --html '<p>1<p>2' --errors

    # Show the token stream instead of the tree
    weft --tokens page.html

    # Parse bytes whose server said they were KOI8-R
    weft --encoding 'text/html; charset=koi8-r' page.html

    # Parse a fragment as the contents of a <tr>
    weft --fragment tr --html '<td>x'
"#)]
struct Cli {
    /// Path to an HTML file, read as bytes
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Print tokens instead of the tree
    #[arg(short = 't', long)]
    tokens: bool,

    /// Print parse errors after the output
    #[arg(short = 'e', long)]
    errors: bool,

    /// Transport-layer encoding: a label or a Content-Type value
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Parse as the contents of an HTML element with this name
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Parser options as a JSON file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parse with the scripting flag enabled
    #[arg(long)]
    scripting: bool,

    /// Log parser decisions to stderr (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Echoes `log` records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {} {}",
                record.level().cyan(),
                record.target().dimmed(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// The input, as given on the command line.
enum Input {
    Bytes(Vec<u8>),
    Text(String),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("{e}"))?;
        log::set_max_level(if cli.verbose > 1 {
            LevelFilter::Trace
        } else {
            LevelFilter::Debug
        });
    }
    clear_warnings();

    let options = load_options(&cli)?;
    let input = load_input(&cli)?;

    let errors = if cli.tokens {
        print_tokens(&input, cli.encoding.as_deref(), &options)
    } else if let Some(context) = &cli.fragment {
        let text = match input {
            Input::Text(text) => text,
            Input::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        let (dom, output) = parse_fragment(context, Namespace::Html, &text, &options)
            .with_context(|| format!("cannot parse in the context of <{context}>"))?;
        print!("{}", test_format_nodes(&dom, &output.nodes));
        output.errors
    } else {
        let output = match input {
            Input::Text(text) => parse_text_with(DomTree::new(), &text, &options),
            Input::Bytes(bytes) => parse_document(&bytes, cli.encoding.as_deref(), &options)?,
        };
        print!("{}", test_format(&output.dom));
        println!(
            "{}",
            format!(
                "# {} ({:?}), {:?}",
                output.encoding.name(),
                output.confidence,
                output.quirks_mode
            )
            .dimmed()
        );
        output.errors
    };

    if cli.errors {
        print_errors(&errors);
    }
    Ok(())
}

/// Options from `--config`, then the individual flags on top.
fn load_options(cli: &Cli) -> anyhow::Result<ParserOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => ParserOptions::default(),
    };
    if cli.scripting {
        options.scripting = true;
    }
    options.validate()?;
    Ok(options)
}

fn load_input(cli: &Cli) -> anyhow::Result<Input> {
    match (&cli.html, &cli.path) {
        (Some(html), _) => Ok(Input::Text(html.clone())),
        (None, Some(path)) => fs::read(path)
            .map(Input::Bytes)
            .with_context(|| format!("cannot read {}", path.display())),
        (None, None) => bail!("nothing to parse: give a FILE or --html"),
    }
}

fn print_tokens(input: &Input, declared: Option<&str>, options: &ParserOptions) -> Vec<ParseError> {
    let stream = match input {
        Input::Text(text) => InputStream::from_text(text),
        Input::Bytes(bytes) => InputStream::new(bytes, declared, None, options),
    };
    let mut tokenizer = HTMLTokenizer::new(stream);
    for token in tokenizer.by_ref() {
        println!("{token}");
    }
    tokenizer.take_errors()
}

fn print_errors(errors: &[ParseError]) {
    if errors.is_empty() {
        eprintln!("{}", "no parse errors".green());
        return;
    }
    for error in errors {
        eprintln!(
            "{} {} {}",
            format!("{}:{}", error.line, error.column).dimmed(),
            error.code.red(),
            error.message
        );
    }
}
