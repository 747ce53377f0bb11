//! blockpaste - convert pasted content into blocks

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;

use blockpaste::util::decode_text;
use blockpaste::{Converted, Mode, PasteOptions, convert};

#[derive(Parser)]
#[command(name = "blockpaste")]
#[command(version, about = "Convert pasted HTML, Markdown and shortcodes into blocks", long_about = None)]
#[command(after_help = "EXAMPLES:
    blockpaste page.html                  Convert HTML to blocks (JSON)
    blockpaste --plain notes.md           Convert plain text / Markdown
    blockpaste --mode inline snippet.html Sanitize as inline content
    pbpaste | blockpaste                  Read HTML from stdin")]
struct Cli {
    /// HTML input file (stdin when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Plain-text alternative of the pasted content
    #[arg(long, value_name = "FILE")]
    plain: Option<String>,

    /// Conversion mode: auto, inline or blocks
    #[arg(short, long, default_value = "auto")]
    mode: Mode,

    /// Tag of the element being pasted into
    #[arg(short, long)]
    tag: Option<String>,

    /// Keep iframe embeds
    #[arg(long)]
    allow_unfiltered: bool,

    /// Keep source whitespace in inline results
    #[arg(long)]
    preserve_whitespace: bool,

    /// Print JSON on a single line
    #[arg(short, long)]
    compact: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> blockpaste::Result<()> {
    let html = match (&cli.input, &cli.plain) {
        (Some(path), _) => read_file(path)?,
        // Plain text alone is a complete paste.
        (None, Some(_)) => String::new(),
        (None, None) => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            decode_text(&bytes, None).into_owned()
        }
    };
    let plain_text = match &cli.plain {
        Some(path) => read_file(path)?,
        None => String::new(),
    };

    let mut options = PasteOptions::html(html)
        .with_plain_text(plain_text)
        .with_mode(cli.mode)
        .with_unfiltered_html(cli.allow_unfiltered)
        .with_preserved_white_space(cli.preserve_whitespace);
    options.tag_name = cli.tag.clone();

    match convert(&options) {
        Converted::Inline(html) => println!("{html}"),
        Converted::Blocks(blocks) => {
            let json = if cli.compact {
                serde_json::to_string(&blocks)?
            } else {
                serde_json::to_string_pretty(&blocks)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

fn read_file(path: &str) -> blockpaste::Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_text(&bytes, None).into_owned())
}
