//! Wordlist Forge - candidate password list generation
//!
//! Generated words go to stdout (one per line) or to a file with `--output`;
//! progress, estimates and logs go to stderr.

use std::io::{BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use wordlist_forge::{
    output::{remove_duplicates, save_wordlist, sort_by_length, WordListStats},
    CharacterSet, Destination, ForgeConfig, ForgeError, GenerationRequest, JobEvent, JobReport,
    JobRunner, JobState, Result, Rule, RuleSet, SinkOutput, WordList,
};

#[derive(Parser)]
#[command(name = "wordlist-forge")]
#[command(about = "Generate candidate password lists for credential audits")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Maximum number of words kept in memory when writing to stdout
    #[arg(long, global = true, value_name = "N")]
    memory_limit: Option<u64>,

    /// Flush file output every N lines
    #[arg(long, global = true, value_name = "N")]
    flush_interval: Option<u64>,

    /// Hide the progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Generate(GenerateCommand),

    /// Print the expected size and run time without generating anything
    Estimate {
        #[command(subcommand)]
        mode: GenerateCommand,
    },

    /// Remove duplicate words from a list, keeping first occurrences
    Dedup(ListArgs),

    /// Sort a list by word length, then alphabetically
    Sort(ListArgs),

    /// Show statistics about a list
    Stats {
        /// Word list file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Every string of a fixed length over the chosen character sets
    Brute(BruteArgs),
    /// Rule variants of each base word
    Rules(RulesArgs),
    /// Rule variants of every ordered permutation of the base words
    Permute(PermuteArgs),
    /// Rule variants of every pair drawn from two word lists
    Pairwise(PairwiseArgs),
}

#[derive(Args, Debug)]
struct BruteArgs {
    /// Character sets: uppercase, lowercase, numbers, special
    #[arg(short, long, value_delimiter = ',', default_value = "lowercase")]
    charset: Vec<CharacterSet>,

    /// Word length (1-10)
    #[arg(short, long)]
    length: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct RulesArgs {
    #[command(flatten)]
    words: WordsArgs,

    #[command(flatten)]
    rules: RuleArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct PermuteArgs {
    #[command(flatten)]
    words: WordsArgs,

    #[command(flatten)]
    rules: RuleArgs,

    /// Also emit every permutation joined with each single word, both ways round
    #[arg(long)]
    combine_words: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct PairwiseArgs {
    /// First list, comma-separated
    #[arg(long, value_name = "WORDS", required_unless_present = "left_file")]
    left: Option<String>,

    /// First list, one word per line
    #[arg(long, value_name = "FILE", conflicts_with = "left")]
    left_file: Option<PathBuf>,

    /// Second list, comma-separated
    #[arg(long, value_name = "WORDS", required_unless_present = "right_file")]
    right: Option<String>,

    /// Second list, one word per line
    #[arg(long, value_name = "FILE", conflicts_with = "right")]
    right_file: Option<PathBuf>,

    /// Also join every pair in reverse order
    #[arg(long)]
    both_orders: bool,

    #[command(flatten)]
    rules: RuleArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct WordsArgs {
    /// Base words, comma-separated
    #[arg(short, long, value_name = "WORDS", required_unless_present = "input")]
    words: Option<String>,

    /// Base words, one per line
    #[arg(short, long, value_name = "FILE", conflicts_with = "words")]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RuleArgs {
    /// Rules to apply, comma-separated (leet_speak, case_variations,
    /// append_numbers, prepend_numbers, append_special_characters,
    /// prepend_special_characters)
    #[arg(short, long, value_delimiter = ',')]
    rules: Vec<Rule>,

    /// Apply every rule
    #[arg(long)]
    all_rules: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write words to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save a JSON job report here
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print only the first words of an in-memory result
    #[arg(long)]
    preview: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Word list file
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RuleArgs {
    fn rule_set(&self) -> RuleSet {
        if self.all_rules {
            RuleSet::from_rules(&Rule::ALL)
        } else {
            RuleSet::from_rules(&self.rules)
        }
    }
}

impl WordsArgs {
    fn load(&self) -> Result<Vec<String>> {
        read_words("words", self.words.as_deref(), self.input.as_deref(), "--words or --input")
    }
}

impl OutputArgs {
    fn destination(&self) -> Destination {
        match &self.output {
            Some(path) => Destination::File(path.clone()),
            None => Destination::Memory,
        }
    }
}

impl GenerateCommand {
    fn request(&self) -> Result<GenerationRequest> {
        let request = match self {
            GenerateCommand::Brute(args) => GenerationRequest::BruteForce {
                sets: args.charset.clone(),
                length: args.length,
            },
            GenerateCommand::Rules(args) => GenerationRequest::Rules {
                words: args.words.load()?,
                rules: args.rules.rule_set(),
            },
            GenerateCommand::Permute(args) => GenerationRequest::Permutations {
                words: args.words.load()?,
                rules: args.rules.rule_set(),
                combine_words: args.combine_words,
            },
            GenerateCommand::Pairwise(args) => GenerationRequest::Pairwise {
                left: read_words("left", args.left.as_deref(), args.left_file.as_deref(), "--left or --left-file")?,
                right: read_words("right", args.right.as_deref(), args.right_file.as_deref(), "--right or --right-file")?,
                rules: args.rules.rule_set(),
                both_orders: args.both_orders,
            },
        };
        Ok(request)
    }

    fn output(&self) -> &OutputArgs {
        match self {
            GenerateCommand::Brute(args) => &args.output,
            GenerateCommand::Rules(args) => &args.output,
            GenerateCommand::Permute(args) => &args.output,
            GenerateCommand::Pairwise(args) => &args.output,
        }
    }
}

fn read_words(parameter: &str, typed: Option<&str>, file: Option<&Path>, flags: &str) -> Result<Vec<String>> {
    let list = match (typed, file) {
        (Some(text), _) => WordList::parse_typed(text)?,
        (None, Some(path)) => WordList::load(path)?,
        (None, None) => return Err(ForgeError::cli(format!("Provide {}", flags))),
    };
    list.require_non_empty(parameter)?;
    Ok(list.into_vec())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the library
    if let Err(e) = wordlist_forge::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", e.user_message());
        process::exit(if e.is_recoverable() { 2 } else { 1 });
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ForgeConfig::from_env()?;
    if let Some(limit) = cli.config.memory_limit {
        config.memory_limit = limit;
    }
    if let Some(interval) = cli.config.flush_interval {
        config.flush_interval = interval;
    }
    let show_progress = !cli.config.no_progress && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Generate(command) => {
            let runner = JobRunner::new(config);
            generate(&runner, &command, show_progress).await
        }
        Commands::Estimate { mode } => {
            let estimate = mode.request()?.estimate()?;
            let kind = if estimate.exact { "exact" } else { "upper bound" };
            println!("Candidates: {} ({})", estimate.count, kind);
            println!("Estimated time: {}", estimate.bucket);
            Ok(())
        }
        Commands::Dedup(args) => {
            let words = WordList::load(&args.input)?.into_vec();
            let (unique, removed) = remove_duplicates(words);
            write_list(&unique, args.output.as_deref(), &config)?;
            eprintln!("🧹 Removed {} duplicate words", removed);
            Ok(())
        }
        Commands::Sort(args) => {
            let mut words = WordList::load(&args.input)?.into_vec();
            sort_by_length(&mut words);
            write_list(&words, args.output.as_deref(), &config)?;
            eprintln!("🔤 Sorted {} words by length and alphabetically", words.len());
            Ok(())
        }
        Commands::Stats { input, json } => {
            let words = WordList::load(&input)?;
            let stats = WordListStats::compute(words.words())
                .ok_or_else(|| ForgeError::invalid_parameter("input", "Word list is empty"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", stats);
            }
            Ok(())
        }
    }
}

/// Run a generation command, offering a file rerun when memory runs out
async fn generate(runner: &JobRunner, command: &GenerateCommand, show_progress: bool) -> Result<()> {
    let request = command.request()?;
    let output = command.output();

    let estimate = request.estimate()?;
    eprintln!(
        "📊 {} {} candidates, about {}",
        if estimate.exact { "Exactly" } else { "Up to" },
        estimate.count,
        estimate.bucket
    );

    let mut destination = output.destination();
    let report = loop {
        match run_job(runner, request.clone(), destination.clone(), output.preview, show_progress).await {
            Err(e @ ForgeError::CapacityExceeded { .. }) if destination.is_memory() => {
                match prompt_file_destination(&e)? {
                    Some(path) => destination = Destination::File(path),
                    None => return Err(e),
                }
            }
            other => break other?,
        }
    };

    if let Some(path) = &output.report {
        report.save(path)?;
        tracing::info!(path = %path.display(), "Saved job report");
    }
    Ok(())
}

async fn run_job(
    runner: &JobRunner,
    request: GenerationRequest,
    destination: Destination,
    preview: bool,
    show_progress: bool,
) -> Result<JobReport> {
    let mut handle = runner.submit(request, destination)?;

    let bar = if show_progress {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .map_err(|e| ForgeError::internal(format!("Progress template: {}", e)))?
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let cancel = handle.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next_event().await {
        match event {
            JobEvent::Started { total, .. } => bar.set_length(clamp(total)),
            JobEvent::Progress(progress) => {
                bar.set_position(clamp(progress.processed));
                bar.set_message(format!("{} words", progress.emitted));
            }
            JobEvent::Finished(_) => break,
        }
    }
    ctrl_c.abort();
    bar.finish_and_clear();

    let result = handle.wait().await?;
    let report = result.report.clone();

    match result.into_output()? {
        SinkOutput::Words(words) => {
            let limit = if preview { runner.config().preview_limit } else { words.len() };
            print_words(words.iter().take(limit))?;
            if words.len() > limit {
                eprintln!("… {} more words not shown", words.len() - limit);
            }
        }
        SinkOutput::File { path, lines } => {
            eprintln!("💾 Wrote {} words to {}", lines, path.display());
        }
        SinkOutput::Discarded => {}
    }

    match report.state {
        JobState::Cancelled => eprintln!(
            "⏹️  Cancelled after {} of {} units ({:.1}%)",
            report.processed,
            report.total,
            report.progress_percent()
        ),
        _ => eprintln!(
            "✅ {} words, {} duplicates skipped in {:.2}s",
            report.emitted,
            report.duplicates_skipped,
            report.elapsed().num_milliseconds() as f64 / 1000.0
        ),
    }

    Ok(report)
}

/// Ask for an output file after an in-memory run hit the limit
fn prompt_file_destination(error: &ForgeError) -> Result<Option<PathBuf>> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    eprintln!("{}", error.user_message());

    let confirmed = match inquire::Confirm::new("Write the list to a file instead?")
        .with_default(true)
        .prompt()
    {
        Ok(answer) => answer,
        Err(inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted) => false,
        Err(e) => return Err(ForgeError::cli(e.to_string())),
    };
    if !confirmed {
        return Ok(None);
    }

    match inquire::Text::new("Output file:").with_default("wordlist.txt").prompt() {
        Ok(path) => Ok(Some(PathBuf::from(path.trim()))),
        Err(inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(ForgeError::cli(e.to_string())),
    }
}

fn write_list(words: &[String], output: Option<&Path>, config: &ForgeConfig) -> Result<()> {
    match output {
        Some(path) => {
            save_wordlist(path, words, config.flush_interval)?;
            Ok(())
        }
        None => print_words(words.iter()),
    }
}

fn print_words<'a>(words: impl Iterator<Item = &'a String>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for word in words {
        writeln!(out, "{}", word)?;
    }
    out.flush()?;
    Ok(())
}

fn clamp(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
