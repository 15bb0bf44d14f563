use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use diag_xml::{
    Category, Config, Converter, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_SEARCH_LIMIT,
    FieldPolicy, XmlLayout,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "diag-xml",
    version,
    author,
    about = "Convert tab-delimited diagnostic code lists to XML",
    long_about = "Convert tab-delimited diagnostic code lists to XML.\n\n\
    Each input line must hold a code and a description separated by a single tab. \
    The output holds one <diag> element per line, with <name> and <desc> children, \
    in input order. A malformed line aborts the conversion and leaves the output untouched.\n\n\
    USAGE EXAMPLES:\n  \
      # Convert the default file\n  \
      diag-xml\n\n  \
      # Convert a specific list\n  \
      diag-xml --input icd10.txt --output icd10.xml\n\n  \
      # Pretty-print and check the result\n  \
      diag-xml -i icd10.txt -o icd10.xml --indent 2 --verify\n\n  \
      # Search a converted file\n  \
      diag-xml search --xml icd10.xml breast --category malignant",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    convert: ConvertArgs,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a converted XML file for codes
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Tab-delimited input file (CODE<TAB>DESCRIPTION per line)
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH, value_name = "PATH")]
    input: PathBuf,

    /// XML output file (overwritten if present)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, value_name = "PATH")]
    output: PathBuf,

    /// Pretty-print with this many spaces per level (compact when omitted)
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Treat everything after the first tab as the description
    #[arg(long)]
    join_extra_fields: bool,

    /// Skip blank lines instead of failing on them
    #[arg(long)]
    skip_blank_lines: bool,

    /// Back up an existing output file before replacing it
    #[arg(long)]
    backup: bool,

    /// Dry run (don't write files)
    #[arg(long)]
    dry_run: bool,

    /// Read the output back after writing and compare records
    #[arg(long)]
    verify: bool,

    /// Print a conversion summary
    #[arg(long, conflicts_with = "stats_json")]
    summary: bool,

    /// Print conversion statistics as JSON
    #[arg(long)]
    stats_json: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Words that must all appear in the code or description
    query: Vec<String>,

    /// Converted XML file to search
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, value_name = "PATH")]
    xml: PathBuf,

    /// Restrict to a category (can be used multiple times)
    #[arg(short, long, value_enum)]
    category: Vec<CliCategory>,

    /// Maximum number of matches to print
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliCategory {
    /// Malignant neoplasms
    Malignant,
    /// Neoplasms in situ
    InSitu,
    /// Benign neoplasms
    Benign,
    /// Personal history of neoplasm
    PersonalHistory,
}

impl From<CliCategory> for Category {
    fn from(c: CliCategory) -> Self {
        match c {
            CliCategory::Malignant => Self::Malignant,
            CliCategory::InSitu => Self::InSitu,
            CliCategory::Benign => Self::Benign,
            CliCategory::PersonalHistory => Self::PersonalHistory,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Some(Command::Search(args)) => run_search(args),
        None => run_convert(cli.convert),
    }
}

fn run_convert(cli: ConvertArgs) -> anyhow::Result<()> {
    let layout = cli.indent.map_or(XmlLayout::Compact, XmlLayout::Indented);
    let field_policy = if cli.join_extra_fields {
        FieldPolicy::JoinTrailing
    } else {
        FieldPolicy::Strict
    };

    let config = Config::builder()
        .input_path(cli.input)
        .output_path(cli.output)
        .layout(layout)
        .field_policy(field_policy)
        .skip_blank_lines(cli.skip_blank_lines)
        .backup_existing(cli.backup)
        .dry_run(cli.dry_run)
        .verify(cli.verify)
        .build()
        .context("Failed to build configuration")?;

    let stats = Converter::new(config)
        .context("Failed to create converter")?
        .run()
        .context("Conversion failed")?;

    if cli.stats_json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{json}");
    } else if cli.summary || cli.dry_run {
        stats.print_summary();
    }

    Ok(())
}

fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let records = diag_xml::load_records(&args.xml)
        .with_context(|| format!("Failed to load {}", args.xml.display()))?;

    let categories: Vec<Category> = args.category.into_iter().map(Into::into).collect();
    let query = args.query.join(" ");

    for record in diag_xml::search(&records, &query, &categories, args.limit) {
        println!("{}\t{}", record.code, record.description);
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("diag_xml=info"),
        1 => EnvFilter::new("diag_xml=debug"),
        _ => EnvFilter::new("diag_xml=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}
