use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scanlens_core::cache::CaseCache;
use scanlens_core::config::{Config, CONFIG_FILE_NAME};
use scanlens_core::report::{severity_counts, to_markdown};
use scanlens_core::state::CaseBook;
use scanlens_core::types::{ForensicCase, Severity};
use scanlens_core::{
    normalize_dir, normalize_file, NormalizeOptions, ShapeFallback, DEFAULT_MAX_TOTAL_BYTES,
};

#[derive(Parser, Debug)]
#[command(
    name = "scanlens",
    version,
    about = "Normalize forensic scanner output into a stable case schema"
)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Normalize {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "scanlens-out")]
        out: PathBuf,

        /// Reject payloads that match no known scanner schema
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        cache: Option<PathBuf>,

        /// Exit with status 2 when any finding is at or above this severity
        #[arg(long)]
        fail_on: Option<FailOn>,
    },
    Batch {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        strict: bool,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        cache: Option<PathBuf>,
    },
    Cases {
        #[command(subcommand)]
        action: CasesAction,

        #[arg(long, global = true)]
        cache: Option<PathBuf>,

        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum CasesAction {
    List,
    Remove { case_id: String },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FailOn {
    Low,
    Medium,
    High,
}

impl From<FailOn> for Severity {
    fn from(f: FailOn) -> Self {
        match f {
            FailOn::Low => Severity::Low,
            FailOn::Medium => Severity::Medium,
            FailOn::High => Severity::High,
        }
    }
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    cyan: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    cyan: "\x1b[36m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    cyan: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let res = match cli.cmd {
        Commands::Normalize {
            input,
            out,
            strict,
            config,
            cache,
            fail_on,
        } => {
            let cfg = load_config(config.as_deref());
            let opts = resolve_options(&cfg, strict);
            let cache = resolve_cache(cache, &cfg);
            run_normalize(&input, &out, &opts, cache.as_ref(), fail_on.map(Severity::from))
        }
        Commands::Batch {
            input,
            strict,
            config,
            cache,
        } => {
            let cfg = load_config(config.as_deref());
            let opts = resolve_options(&cfg, strict);
            let cache = resolve_cache(cache, &cfg);
            run_batch(&input, &opts, cache.as_ref())
        }
        Commands::Cases {
            action,
            cache,
            config,
        } => {
            let cfg = load_config(config.as_deref());
            match resolve_cache(cache, &cfg) {
                Some(cache) => run_cases(action, &cache),
                None => Err(anyhow::anyhow!(
                    "no case cache configured; pass --cache or set cache_path in scanlens.toml"
                )),
            }
        }
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}scan{reset}{cyan}|{reset}{dim}lens{reset}  {dim}forensic result normalizer{reset}\n",
        bold = s.bold,
        cyan = s.cyan,
        dim = s.dim,
        reset = s.reset,
    );
}

fn severity_color(sev: &Severity) -> &'static str {
    let s = style();
    match sev {
        Severity::High => s.red,
        Severity::Medium => s.yellow,
        Severity::Low => s.dim,
    }
}

fn commas(n: u64) -> String {
    let s = n.to_string();
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

fn print_case(case: &ForensicCase, out: &Path) {
    let s = style();

    eprintln!(
        "  {dim}case            {reset}{bold}{}{reset}",
        case.case_id,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}disk            {reset}{}",
        case.summary.disk_name,
        dim = s.dim,
        reset = s.reset
    );
    eprintln!(
        "  {dim}total_files     {reset}{bold}{}{reset}",
        commas(case.summary.total_files),
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}deleted_files   {reset}{bold}{}{reset}",
        commas(case.summary.deleted_files),
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}timeline        {reset}{} events",
        case.timeline.len(),
        dim = s.dim,
        reset = s.reset
    );

    if !case.suspicious_findings.is_empty() {
        eprintln!();
        for (sev, n) in severity_counts(case) {
            if n == 0 {
                continue;
            }
            let sc = severity_color(&sev);
            eprintln!(
                "  {sc}{:<6}{reset}  {}",
                sev.as_str(),
                n,
                sc = sc,
                reset = s.reset
            );
        }
    }

    eprintln!();
    for name in ["case.json", "case.md"] {
        eprintln!(
            "  {dim}\u{2192} {}{reset}",
            out.join(name).display(),
            dim = s.dim,
            reset = s.reset
        );
    }
    eprintln!();
}

fn load_config(path: Option<&Path>) -> Config {
    let (source, loaded) = match path {
        Some(p) => (p.to_path_buf(), Config::load(p)),
        None => match Config::discover() {
            Some(res) => (PathBuf::from(CONFIG_FILE_NAME), res),
            None => return Config::default(),
        },
    };

    match loaded {
        Ok(cfg) => {
            tracing::debug!(path = %source.display(), "loaded config");
            cfg
        }
        Err(e) => {
            eprintln!(
                "{}{}warning:{} failed to load config {}: {:#}",
                style().bold,
                style().yellow,
                style().reset,
                source.display(),
                e
            );
            Config::default()
        }
    }
}

fn resolve_options(cfg: &Config, strict: bool) -> NormalizeOptions {
    let mut opts = cfg.normalize_options();
    if strict {
        opts.shape_fallback = ShapeFallback::Strict;
    }
    opts
}

fn resolve_cache(cli: Option<PathBuf>, cfg: &Config) -> Option<CaseCache> {
    cli.or_else(|| cfg.cache_path.clone()).map(CaseCache::new)
}

fn breaches(case: &ForensicCase, threshold: Option<Severity>) -> bool {
    match (threshold, case.max_severity()) {
        (Some(t), Some(max)) => max >= t,
        _ => false,
    }
}

fn run_normalize(
    input: &Path,
    out: &Path,
    opts: &NormalizeOptions,
    cache: Option<&CaseCache>,
    fail_on: Option<Severity>,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    print_banner();

    let case = normalize_file(input, opts)?;

    std::fs::create_dir_all(out).with_context(|| format!("create out dir {}", out.display()))?;

    let json_path = out.join("case.json");
    let md_path = out.join("case.md");

    let json = serde_json::to_vec_pretty(&case).context("serialize case json")?;
    std::fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
    std::fs::write(&md_path, to_markdown(&case))
        .with_context(|| format!("write {}", md_path.display()))?;

    if let Some(cache) = cache {
        let mut book = CaseBook::new(cache.load());
        let replaced = book.add_case(case.clone());
        tracing::debug!(
            path = %cache.path().display(),
            case_id = %case.case_id,
            replaced,
            "cached case"
        );
        cache.save(book.cases());
    }

    // Machine-parseable line on stdout
    println!(
        "case_id={} files={} findings={} high={}",
        case.case_id,
        case.files.len(),
        case.suspicious_findings.len(),
        case.count_severity(Severity::High)
    );

    // Human-readable output on stderr
    print_case(&case, out);

    let exit = match fail_on {
        Some(threshold) if breaches(&case, Some(threshold)) => {
            eprintln!(
                "  {red}{bold}FINDINGS AT OR ABOVE {}{reset}",
                threshold.as_str().to_uppercase(),
                red = s.red,
                bold = s.bold,
                reset = s.reset,
            );
            std::process::ExitCode::from(2)
        }
        _ => {
            eprintln!(
                "  {green}{bold}OK{reset}",
                green = s.green,
                bold = s.bold,
                reset = s.reset
            );
            std::process::ExitCode::from(0)
        }
    };

    eprintln!();

    Ok(exit)
}

fn run_batch(
    input: &Path,
    opts: &NormalizeOptions,
    cache: Option<&CaseCache>,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    let outcome = normalize_dir(input, opts, DEFAULT_MAX_TOTAL_BYTES)
        .with_context(|| format!("normalize directory {}", input.display()))?;

    for r in &outcome.rejected {
        eprintln!(
            "  {yellow}rejected{reset} {}  {dim}{}{reset}",
            r.path,
            r.reason,
            yellow = s.yellow,
            dim = s.dim,
            reset = s.reset
        );
    }

    if let Some(cache) = cache {
        let mut book = CaseBook::new(cache.load());
        for case in &outcome.cases {
            book.add_case(case.clone());
        }
        tracing::debug!(path = %cache.path().display(), cached = book.len(), "updated case cache");
        cache.save(book.cases());
    }

    println!(
        "accepted={} rejected={}",
        outcome.cases.len(),
        outcome.rejected.len()
    );

    if outcome.cases.is_empty() && !outcome.rejected.is_empty() {
        return Ok(std::process::ExitCode::from(1));
    }
    Ok(std::process::ExitCode::from(0))
}

fn run_cases(action: CasesAction, cache: &CaseCache) -> anyhow::Result<std::process::ExitCode> {
    let mut book = CaseBook::new(cache.load());

    match action {
        CasesAction::List => {
            for case in book.cases() {
                println!(
                    "{}\t{}\t{}\tfiles={}\tfindings={}\tmax={}",
                    case.case_id,
                    case.summary.disk_name,
                    case.summary.scan_timestamp,
                    case.files.len(),
                    case.suspicious_findings.len(),
                    case.max_severity().map(|s| s.as_str()).unwrap_or("-")
                );
            }
        }
        CasesAction::Remove { case_id } => {
            if book.remove_case(&case_id).is_none() {
                anyhow::bail!("case {} is not in {}", case_id, cache.path().display());
            }
            cache
                .try_save(book.cases())
                .with_context(|| format!("write {}", cache.path().display()))?;
            println!("removed={}", case_id);
        }
    }

    Ok(std::process::ExitCode::from(0))
}
