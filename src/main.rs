use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use drawspec::{Error, InputFormat, Level, Theme};
use log::{LevelFilter, error, info, log};

/// Compile graph specifications into draw.io diagrams
#[derive(Parser, Debug)]
#[command(name = "drawspec", version)]
#[command(about = "Compile YAML/JSON or sectioned specifications into draw.io XML", long_about = None)]
struct Args {
    /// Input specification (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .drawio file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Input format
    #[arg(long, value_enum, default_value_t = SourceFormat::Auto)]
    from: SourceFormat,

    /// Built-in theme name or path to a theme file (TOML or YAML)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Report complexity findings; exit non-zero on error-level findings
    #[arg(long)]
    audit: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceFormat {
    Auto,
    Yaml,
    Json,
    Sections,
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(err) => {
            error!(err:err; "Compilation failed");
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the audit reported an error-level finding.
fn run(args: &Args) -> Result<bool, Error> {
    let stdin = args.input.to_str() == Some("-");
    let text = if stdin {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)?
    };

    let format = match args.from {
        SourceFormat::Yaml => InputFormat::Yaml,
        SourceFormat::Json => InputFormat::Json,
        SourceFormat::Sections => InputFormat::Sections,
        SourceFormat::Auto => (!stdin)
            .then(|| InputFormat::from_path(&args.input))
            .flatten()
            .unwrap_or_else(|| InputFormat::sniff(&text)),
    };
    info!(input:? = args.input, format:? = format; "Reading specification");

    let spec = format.source().read(&text)?;

    let mut clean = true;
    if args.audit {
        let findings = drawspec::audit(&spec);
        info!(findings = findings.len(); "Audit finished");
        for finding in &findings {
            log!(log::Level::from(finding.level), "{}", finding.message);
        }
        clean = !findings.iter().any(|f| f.level == Level::Error);
    }

    let theme = args.theme.as_deref().map(load_theme).transpose()?;
    let xml = drawspec::compile(&spec, theme.as_ref())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &xml)?;
            info!(output:? = path; "Diagram written");
        }
        None => std::io::stdout().write_all(xml.as_bytes())?,
    }

    Ok(clean)
}

/// Built-in name first, then a theme file.
fn load_theme(name_or_path: &str) -> Result<Theme, Error> {
    if let Some(theme) = Theme::builtin(name_or_path) {
        return Ok(theme.clone());
    }

    let path = Path::new(name_or_path);
    if !path.is_file() {
        return Theme::from_builtin(name_or_path).cloned();
    }
    Theme::from_path(path)
}
