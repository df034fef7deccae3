//! CLI entrypoint for `hashcathelper`.
//!
//! `ntlm` runs the multi-stage cracking pipeline against a pwdump file,
//! `analytics` summarizes a finished run (as text or JSON), and `submit`
//! stores a saved JSON summary in a CSV report store.
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use hashcathelper::{
    analytics::{
        ReportData, create_report, create_report_from_passwords, load_report, report_json,
    },
    error::{PipelineError, RunError},
    extract::{load_passwords, load_results},
    filter::load_account_filter,
    hashfile::load_accounts,
    pipeline::{CrackOptions, Pipeline},
    report::render_report,
    runner::{SystemRunner, engine_version, install_interrupt_handler},
    store::{CsvReportStore, ReportStore, submit},
};
use log::{LevelFilter, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hashcathelper",
    version,
    about = "Multi-stage hashcat wrapper for pwdump files (Rust)"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    /// Suppress summary output
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crack a pwdump file: LM brute force, NT upgrade, then wordlist + rules
    Ntlm(NtlmArgs),
    /// Print statistics about a cracked pwdump file
    Analytics(ReportArgs),
    /// Store a JSON report (from `analytics -f json`) in the report store
    Submit(SubmitArgs),
}

#[derive(ClapArgs, Debug)]
struct NtlmArgs {
    /// Path to the pwdump file (<account>:<id>:<lm hash>:<nt hash>:::)
    hashfile: PathBuf,

    /// Wordlist used in the final stage
    #[arg(short = 'w', long = "wordlist")]
    wordlist: PathBuf,

    /// Rule set used in the final stage
    #[arg(short = 'r', long = "rules")]
    ruleset: Option<PathBuf>,

    /// Additional wordlists for the final stage, tried after --wordlist
    #[arg(short = 'e', long = "extra-words")]
    extra_words: Vec<PathBuf>,

    /// Skip cracking LM hashes and the LM-to-NT upgrade
    #[arg(long = "skip-lm")]
    skip_lm: bool,

    /// Do not try account names as passwords
    #[arg(long = "no-usernames")]
    no_usernames: bool,

    /// Directory for intermediate and result files (never cleaned up)
    #[arg(short = 'd', long = "directory", default_value = ".")]
    directory: PathBuf,

    /// Path to the hashcat binary
    #[arg(long = "hashcat-bin", default_value = "hashcat")]
    hashcat_bin: PathBuf,
}

#[derive(ClapArgs, Debug)]
#[command(group(ArgGroup::new("cracked").required(true).args(["results", "passwords"])))]
struct ReportArgs {
    /// Path to the pwdump file
    #[arg(short = 'H', long = "hashes")]
    hashes: PathBuf,

    /// Path to the result of `ntlm` (<account>:<password>)
    #[arg(short = 'A', long = "accounts-plus-passwords")]
    results: Option<PathBuf>,

    /// Path to a file with only passwords, one per line
    #[arg(short = 'P', long = "passwords-only")]
    passwords: Option<PathBuf>,

    /// Only analyze the accounts named in this file (one per line)
    #[arg(short = 'F', long = "filter-accounts")]
    filter: Option<PathBuf>,

    /// Only output statistics without sensitive information
    #[arg(short = 'c', long = "censor")]
    censor: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "outfile")]
    outfile: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct SubmitArgs {
    /// Path to a report written by `analytics -f json`
    report: PathBuf,

    /// Path to the CSV report store (created if missing)
    #[arg(long = "db")]
    db: PathBuf,

    /// Email address of the submitter
    #[arg(long = "email")]
    email: String,

    /// Name of the wordlist used for cracking
    #[arg(long = "wordlist-name")]
    wordlist_name: String,

    /// Name of the rule set used for cracking
    #[arg(long = "rule-set-name", default_value = "")]
    rule_set_name: String,

    /// Hashcat version; detected with `--hashcat-bin --version` if omitted
    #[arg(long = "hashcat-version")]
    hashcat_version: Option<String>,

    /// Path to the hashcat binary
    #[arg(long = "hashcat-bin", default_value = "hashcat")]
    hashcat_bin: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_ntlm_inputs(args: &NtlmArgs) -> Result<()> {
    if !args.hashfile.is_file() {
        bail!("hash file not found: {}", args.hashfile.display());
    }
    if !args.wordlist.is_file() {
        bail!("wordlist not found: {}", args.wordlist.display());
    }
    if let Some(r) = &args.ruleset {
        if !r.is_file() {
            bail!("rule set not found: {}", r.display());
        }
    }
    for p in &args.extra_words {
        if !p.is_file() {
            bail!("extra wordlist not found: {}", p.display());
        }
    }
    Ok(())
}

fn verify_report_inputs(args: &ReportArgs) -> Result<()> {
    let inputs = [Some(&args.hashes), args.results.as_ref(), args.passwords.as_ref()];
    for p in inputs.into_iter().flatten() {
        if !p.is_file() {
            bail!("file not found: {}", p.display());
        }
    }
    if let Some(f) = &args.filter {
        if !f.is_file() {
            bail!("filter file not found: {}", f.display());
        }
    }
    Ok(())
}

fn exit_code(e: &PipelineError) -> i32 {
    match e {
        PipelineError::Run(RunError::Interrupted) => 130,
        PipelineError::CrackFailed { .. } | PipelineError::Run(RunError::Spawn { .. }) => 3,
        PipelineError::ShowFailed { .. } => 4,
        _ => 5,
    }
}

fn build_report(args: &ReportArgs) -> Result<ReportData> {
    let accounts = load_accounts(&args.hashes)?;
    let filter = match &args.filter {
        Some(p) => Some(load_account_filter(p)?),
        None => None,
    };
    let data = match (&args.results, &args.passwords) {
        (Some(r), _) => create_report(&accounts, &load_results(r)?, filter.as_ref()),
        (None, Some(p)) => {
            create_report_from_passwords(&accounts, &load_passwords(p)?, filter.as_ref())
        }
        (None, None) => bail!("either -A or -P is required"),
    };
    Ok(if args.censor { data.censored() } else { data })
}

fn format_report(data: &ReportData, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_report(data)),
        OutputFormat::Json => report_json(data),
    }
}

fn run_ntlm(args: NtlmArgs, quiet: bool) {
    if let Err(e) = verify_ntlm_inputs(&args) {
        error!("{}", e);
        process::exit(2);
    }
    let runner = SystemRunner::new();
    if let Err(e) = install_interrupt_handler(&runner) {
        warn!("failed to install signal handler: {}", e);
    }
    let pipeline = Pipeline::new(runner, &args.hashcat_bin, &args.hashfile, &args.directory);
    let opts = CrackOptions {
        wordlist: args.wordlist.clone(),
        ruleset: args.ruleset.clone(),
        extra_words: args.extra_words.clone(),
        skip_lm: args.skip_lm,
        prepend_usernames: !args.no_usernames,
    };
    let result = match pipeline.crack_pwdump(&opts) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            process::exit(exit_code(&e));
        }
    };
    println!("{} {}", "Result written to:".bold().green(), result.display());

    if !quiet {
        let report_args = ReportArgs {
            hashes: args.hashfile,
            results: Some(result),
            passwords: None,
            filter: None,
            censor: false,
            format: OutputFormat::Text,
            outfile: None,
        };
        match build_report(&report_args) {
            Ok(data) => println!("{}", render_report(&data)),
            Err(e) => warn!("failed to summarize result: {:#}", e),
        }
    }
}

fn run_analytics(args: ReportArgs, quiet: bool) {
    if let Err(e) = verify_report_inputs(&args) {
        error!("{}", e);
        process::exit(2);
    }
    let data = match build_report(&args) {
        Ok(d) => d,
        Err(e) => {
            error!("failed to load inputs: {:#}", e);
            process::exit(3);
        }
    };
    if args.outfile.is_some() {
        colored::control::set_override(false);
    }
    let out = match format_report(&data, args.format) {
        Ok(o) => o,
        Err(e) => {
            error!("failed to format report: {:#}", e);
            process::exit(5);
        }
    };
    match &args.outfile {
        Some(path) => {
            let written = fs::write(path, &out);
            if let Err(e) = written.with_context(|| format!("writing {}", path.display())) {
                error!("{:#}", e);
                process::exit(5);
            }
            info!("report written to {}", path.display());
        }
        None if !quiet => print!("{}", out),
        None => {}
    }
}

fn run_submit(args: SubmitArgs) {
    if !args.report.is_file() {
        error!("report not found: {}", args.report.display());
        process::exit(2);
    }
    let data = match load_report(&args.report) {
        Ok(d) => d,
        Err(e) => {
            error!("{:#}", e);
            process::exit(2);
        }
    };
    let hashcat_version = match args.hashcat_version {
        Some(v) => v,
        None => match engine_version(&SystemRunner::new(), &args.hashcat_bin) {
            Ok(v) if !v.is_empty() => v,
            Ok(_) => {
                error!("could not determine hashcat version, use --hashcat-version");
                process::exit(5);
            }
            Err(e) => {
                error!("could not determine hashcat version: {}", e);
                process::exit(5);
            }
        },
    };

    let mut store = match CsvReportStore::open(&args.db) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            process::exit(5);
        }
    };
    info!("report store: {}", store.path().display());
    let id = match submit(
        &mut store,
        &args.email,
        &args.wordlist_name,
        &args.rule_set_name,
        &hashcat_version,
        &data,
    ) {
        Ok(id) => id,
        Err(e) => {
            error!("{}", e);
            process::exit(5);
        }
    };
    if let Err(e) = store.close() {
        error!("{}", e);
        process::exit(5);
    }
    println!("Submitted report with ID {}", id);
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    match args.command {
        Command::Ntlm(a) => run_ntlm(a, args.quiet),
        Command::Analytics(a) => run_analytics(a, args.quiet),
        Command::Submit(a) => run_submit(a),
    }
}
