use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use mail2ticket::config::{DisclaimerList, HeaderStrategy, ParserConfig};
use mail2ticket::description::{Labels, generate_base_description, generate_full_description};
use mail2ticket::models::{EmailContent, MessageMeta};
use mail2ticket::{ConversationParser, get_email_content, init_logger, parse_raw_message};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(
    name = "mail2ticket",
    about = "Reconstruct the conversation history of reply emails"
)]
struct Args {
    /// Input files; stdin is read when none are given.
    files: Vec<PathBuf>,

    /// Treat input as raw RFC 5322 messages instead of plain-text bodies.
    #[arg(long)]
    eml: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Header detection strategy (`grammar` or `token-scan`).
    #[arg(long)]
    header_strategy: Option<HeaderStrategy>,

    /// JSON array of disclaimer phrases that end a message body.
    #[arg(long)]
    disclaimers: Option<PathBuf>,

    /// Count `> > text` as two quote levels.
    #[arg(long)]
    spaced_quotes: bool,
}

struct Input {
    label: String,
    bytes: Vec<u8>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let args = Args::parse();

    let mut config = ParserConfig::from_env();
    if let Some(strategy) = args.header_strategy {
        config = config.with_header_strategy(strategy);
    }
    if let Some(path) = &args.disclaimers {
        config = config.with_disclaimers(DisclaimerList::from_json_file(path)?);
    }
    if args.spaced_quotes {
        config = config.with_spaced_quotes(true);
    }
    let parser = ConversationParser::new(config);
    let labels = Labels::default();

    let inputs = if args.files.is_empty() {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        vec![Ok(Input {
            label: "<stdin>".to_string(),
            bytes,
        })]
    } else {
        args.files
            .iter()
            .map(|path| {
                fs::read(path)
                    .map(|bytes| Input {
                        label: path.display().to_string(),
                        bytes,
                    })
                    .map_err(|err| format!("{}: {}", path.display(), err))
            })
            .collect::<Vec<_>>()
    };

    let results: Vec<Result<String, String>> = inputs
        .into_par_iter()
        .map(|input| {
            let input = input?;
            let content = load_content(&input, args.eml, &parser)
                .map_err(|err| format!("{}: {}", input.label, err))?;
            render(&content, args.format, &labels)
                .map_err(|err| format!("{}: {}", input.label, err))
        })
        .collect();

    let mut stdout = io::stdout().lock();
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(output) => writeln!(stdout, "{output}")?,
            Err(err) => {
                log::error!("{}", err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        writeln!(io::stderr(), "error: {failures} input(s) could not be processed")?;
        std::process::exit(1);
    }
    Ok(())
}

fn load_content(
    input: &Input,
    eml: bool,
    parser: &ConversationParser,
) -> Result<EmailContent, Box<dyn std::error::Error + Send + Sync>> {
    if eml {
        let message = parse_raw_message(&input.bytes)?;
        return Ok(get_email_content(&message, parser));
    }

    let body = String::from_utf8_lossy(&input.bytes);
    Ok(EmailContent {
        meta: MessageMeta::default(),
        attachments: Vec::new(),
        conversation_history: parser.parse(&*body),
    })
}

fn render(
    content: &EmailContent,
    format: OutputFormat,
    labels: &Labels,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(content),
        OutputFormat::Markdown => {
            let base =
                generate_base_description(&content.conversation_history, &content.meta, labels);
            Ok(generate_full_description(
                "",
                &base,
                &content.attachments,
                labels,
            ))
        }
    }
}
