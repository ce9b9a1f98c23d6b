use chatter::render::{
    EmbeddedFont, HeadlessError, LayoutOptions, RenderOptions, build_timeline_with_rng, error_svg,
    load_font_or_fallback, try_generate_svg_with_rng,
};
use chatter::{
    AvatarConfig, ChatConfig, ConfigFormat, ConversationEvent, Substitutions, ThemeName,
    parse_conversation_json,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Chatter(chatter::Error),
    Headless(HeadlessError),
    Json(serde_json::Error),
    InvalidConfig(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Chatter(err) => write!(f, "{err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::InvalidConfig(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<chatter::Error> for CliError {
    fn from(value: chatter::Error) -> Self {
        if value.is_configuration() {
            Self::InvalidConfig(value.to_string())
        } else {
            Self::Chatter(value)
        }
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        match value {
            HeadlessError::Core(err) => err.into(),
            HeadlessError::Render(err) => Self::InvalidConfig(err.to_string()),
            other => Self::Headless(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Timeline,
    Validate,
    Themes,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    theme: Option<ThemeName>,
    vars: Option<String>,
    font: Option<String>,
    font_family: Option<String>,
    no_avatars: bool,
    seed: Option<u64>,
    document_id: Option<String>,
    out: Option<String>,
    pretty: bool,
    strict: bool,
}

fn usage() -> &'static str {
    "chatter-cli\n\
\n\
USAGE:\n\
  chatter-cli [render] [--config <path>] [--theme ios|android] [--vars <path>] [--font <path>] [--font-family <name>] [--no-avatars] [--seed <n>] [--id <document-id>] [--out <path>] [--strict] [<events.json>|-]\n\
  chatter-cli timeline [--config <path>] [--theme ios|android] [--vars <path>] [--no-avatars] [--seed <n>] [--pretty] [<events.json>|-]\n\
  chatter-cli validate [--config <path>] [--theme ios|android]\n\
  chatter-cli themes\n\
\n\
NOTES:\n\
  - If <events.json> is omitted or '-', the conversation is read from stdin.\n\
  - --config accepts JSON5 (.json/.json5) or YAML (.yaml/.yml).\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - An invalid configuration renders the configuration error graphic unless --strict is set.\n\
  - --seed makes reading-time jitter reproducible.\n\
  - Set RUST_LOG (e.g. RUST_LOG=chatter_render=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "timeline" => args.command = Command::Timeline,
            "validate" => args.command = Command::Validate,
            "themes" => args.command = Command::Themes,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--no-avatars" => args.no_avatars = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--theme" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme = Some(
                    name.parse::<ThemeName>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--vars" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.vars = Some(path.clone());
            }
            "--font" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.font = Some(path.clone());
            }
            "--font-family" => {
                let Some(family) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !family.trim().is_empty() {
                    args.font_family = Some(family.trim().to_string());
                }
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.document_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

/// Configuration file (if any) with command-line overrides layered on top.
fn load_config(args: &Args) -> Result<ChatConfig, chatter::Error> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| chatter::Error::ConfigParse {
                format: "file",
                message: format!("{path}: {e}"),
            })?;
            ChatConfig::from_str_with_format(&text, ConfigFormat::from_path(Path::new(path)))?
        }
        None => ChatConfig::default(),
    };
    if let Some(theme) = args.theme {
        config = config.with_theme(theme);
    }
    if args.no_avatars {
        config = config.with_avatars(AvatarConfig::disabled());
    }
    Ok(config)
}

fn load_vars(path: Option<&str>) -> Result<Substitutions, CliError> {
    match path {
        None => Ok(Substitutions::new()),
        Some(path) => Ok(Substitutions::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn load_events(input: Option<&str>) -> Result<Vec<ConversationEvent>, CliError> {
    let text = read_input(input)?;
    Ok(parse_conversation_json(&text)?)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn render(args: &Args) -> Result<(), CliError> {
    let events = load_events(args.input.as_deref())?;
    let vars = load_vars(args.vars.as_deref())?;

    let font: Option<EmbeddedFont> = args.font.as_deref().and_then(|path| {
        load_font_or_fallback(Path::new(path), args.font_family.as_deref().unwrap_or("Inter"))
    });
    let options = RenderOptions {
        document_id: args.document_id.clone(),
        font,
    };

    let generated = load_config(args)
        .map_err(HeadlessError::from)
        .and_then(|config| {
            let mut rng = make_rng(args.seed);
            try_generate_svg_with_rng(&events, &config, &vars, &options, &mut rng)
        });
    let svg = match generated {
        Ok(svg) => svg,
        Err(err) if args.strict => return Err(err.into()),
        Err(err) => error_svg(&err),
    };
    write_text(&svg, args.out.as_deref())
}

fn timeline(args: &Args) -> Result<(), CliError> {
    let events = load_events(args.input.as_deref())?;
    let vars = load_vars(args.vars.as_deref())?;
    let config = load_config(args)?;

    let result = build_timeline_with_rng(
        &events,
        &config,
        &vars,
        &LayoutOptions::for_config(&config),
        &mut make_rng(args.seed),
    )
    .map_err(HeadlessError::from)?;
    write_json(&result, args.pretty)
}

fn validate(args: &Args) -> Result<(), CliError> {
    let config = load_config(args)?;
    match config.validate() {
        Ok(()) => {
            println!("ok ({} theme)", config.theme_name);
            Ok(())
        }
        Err(err) => {
            for issue in &err.issues {
                eprintln!("{issue}");
            }
            Err(CliError::InvalidConfig(format!(
                "{} configuration issue(s)",
                err.issues.len()
            )))
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Render => render(&args),
        Command::Timeline => timeline(&args),
        Command::Validate => validate(&args),
        Command::Themes => {
            for name in ThemeName::ALL {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::InvalidConfig(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
