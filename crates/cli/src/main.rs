use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use report::{ApplyReport, CheckReport, DiscoveredFile};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use widen_directive::{read_header, DirectiveReader, DirectiveSet, Namespace, Recorder};
use widen_processor::{ModPlatform, ProcessorConfig, StaticEnvironment, TransitiveWidenerProcessor};
use widen_remap::MappingsEngine;

mod classpath;
mod report;

#[derive(Parser)]
#[command(name = "widen")]
#[command(about = "Transitive access widener discovery and application", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an access widener and summarise it
    Check {
        /// Access widener file
        file: PathBuf,
    },

    /// List the transitive access wideners found on the classpath
    Discover(EnvArgs),

    /// Print the cache identity of the discovered wideners, or null
    Key(EnvArgs),

    /// Discover, merge and apply transitive access wideners to a jar in place
    Apply {
        /// Jar to widen
        jar: PathBuf,

        #[command(flatten)]
        env: EnvArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct EnvArgs {
    /// Processor configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compile classpath entry; directories are searched for jars
    #[arg(long = "classpath", value_name = "PATH")]
    classpath: Vec<PathBuf>,

    /// Platform jar in the source namespace, used to resolve symbols
    #[arg(long = "namespace-jar", value_name = "PATH")]
    namespace_jars: Vec<PathBuf>,

    /// Tiny v2 mappings between the source and target namespaces
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// The project's own access widener, in the target namespace
    #[arg(long)]
    local: Option<PathBuf>,

    /// Source namespace (overrides config)
    #[arg(long)]
    from: Option<Namespace>,

    /// Target namespace (overrides config)
    #[arg(long)]
    to: Option<Namespace>,

    /// Mod platform (repeatable, overrides config)
    #[arg(long = "platform", value_name = "PLATFORM")]
    platforms: Vec<ModPlatform>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Check { file } => run_check(&file),
        Commands::Discover(args) => run_discover(&args),
        Commands::Key(args) => run_key(&args),
        Commands::Apply { jar, env } => run_apply(&jar, &env),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_check(file: &Path) -> Result<()> {
    let content = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let header = read_header(&content).with_context(|| format!("Invalid {}", file.display()))?;

    let mut reader = DirectiveReader::new(Recorder::default());
    reader
        .read(&content)
        .with_context(|| format!("Invalid {}", file.display()))?;
    let recorder = reader.into_inner();

    let transitive = recorder.directives.iter().filter(|d| d.transitive).count();
    let targets = recorder
        .directives
        .iter()
        .cloned()
        .collect::<DirectiveSet>()
        .len();

    print_json(&CheckReport {
        path: file.to_path_buf(),
        version: header.version,
        namespace: header.namespace,
        directives: recorder.directives.len(),
        transitive,
        targets,
    })
}

fn run_discover(args: &EnvArgs) -> Result<()> {
    let processor = build_processor(args)?;
    let files: Vec<DiscoveredFile> = processor
        .transitive_files()
        .iter()
        .map(DiscoveredFile::from)
        .collect();
    print_json(&files)
}

fn run_key(args: &EnvArgs) -> Result<()> {
    let processor = build_processor(args)?;
    let identity = if processor.is_empty() {
        None
    } else {
        Some(processor.cache_identity()?)
    };
    print_json(&identity)
}

fn run_apply(jar: &Path, args: &EnvArgs) -> Result<()> {
    if !jar.is_file() {
        bail!("{} is not a file", jar.display());
    }

    let processor = build_processor(args)?;
    let changed = if processor.is_empty() {
        log::info!("No transitive access wideners found, leaving {} as is", jar.display());
        false
    } else {
        processor
            .process(jar)
            .with_context(|| format!("Failed to widen {}", jar.display()))?
    };

    print_json(&ApplyReport {
        archive: jar.to_path_buf(),
        transitive_files: processor.transitive_files().len(),
        cache_identity: processor.cache_key().map(|key| key.identity()),
        changed,
    })
}

fn load_config(args: &EnvArgs) -> Result<ProcessorConfig> {
    let mut config = match &args.config {
        Some(path) => ProcessorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    if let Some(namespace) = args.from {
        config.source_namespace = namespace;
    }
    if let Some(namespace) = args.to {
        config.target_namespace = namespace;
    }
    if !args.platforms.is_empty() {
        config.platforms = args.platforms.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_processor(
    args: &EnvArgs,
) -> Result<TransitiveWidenerProcessor<StaticEnvironment, MappingsEngine>> {
    let config = load_config(args)?;

    let env = StaticEnvironment::new(config.platforms.clone())
        .with_artifacts(classpath::expand(&args.classpath)?)
        .with_namespace_jars(
            config.source_namespace,
            classpath::expand(&args.namespace_jars)?,
        );

    // Without mappings, symbols resolve only by being present on the namespace jars.
    let engine = match &args.mappings {
        Some(path) => MappingsEngine::open(path)
            .with_context(|| format!("Failed to read mappings {}", path.display()))?,
        None => MappingsEngine::from_tiny(format!(
            "tiny\t2\t0\t{}\t{}\n",
            config.source_namespace, config.target_namespace
        )),
    };

    let local = match &args.local {
        Some(path) => read_local(path, config.target_namespace)?,
        None => DirectiveSet::new(),
    };

    let processor = TransitiveWidenerProcessor::new(config, env, engine)?.with_local(local);
    Ok(processor)
}

fn read_local(path: &Path, namespace: Namespace) -> Result<DirectiveSet> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut reader = DirectiveReader::new(DirectiveSet::new());
    reader
        .read_expecting(&content, namespace)
        .with_context(|| format!("Invalid local access widener {}", path.display()))?;
    Ok(reader.into_inner())
}
