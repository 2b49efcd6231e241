//! `w4play` - the WASM-4 playground without the browser.
//!
//! Compiles AssemblyScript or Roland sources through the same worker,
//! storage and share-link machinery the playground uses, and packs
//! compiled cartridges into standalone native executables.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use w4play_bundle::{AssetDir, Bundler, Platform};
use w4play_compiler::{AscOptions, CompilationArtifact, Dispatcher, Language, RolandOptions, Source};
use w4play_session::{
    CompilationState, FileStorage, Location, MemoryStorage, Origin, Playground, Storage, resolve,
    share_url,
};

#[derive(Parser, Debug)]
#[command(name = "w4play")]
#[command(about = "WASM-4 playground - compile, share and bundle fantasy console cartridges")]
#[command(version)]
struct Cli {
    /// Command line for the AssemblyScript compiler
    #[arg(long, global = true, env = "W4PLAY_ASC", default_value = "asc")]
    asc: String,

    /// Command line for the Roland compiler
    #[arg(long, global = true, env = "W4PLAY_ROLANDC", default_value = "rolandc")]
    rolandc: String,

    /// JSON file that remembers the last source per language
    #[arg(long, global = true, env = "W4PLAY_STORAGE", value_name = "FILE")]
    storage: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source file into a cartridge module
    Compile {
        /// Input source file (.ts or .rol)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Source language, when the extension does not say
        #[arg(short, long)]
        lang: Option<Language>,

        /// Where to write the module (defaults to FILE with a .wasm extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the text-format disassembly here
        #[arg(long, value_name = "FILE")]
        wat: Option<PathBuf>,
    },

    /// Compile a source file and pack it into a native executable
    Bundle {
        /// Input source file (.ts or .rol)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long)]
        lang: Option<Language>,

        /// Target platform: linux, windows or macos
        #[arg(short, long, default_value = "linux")]
        platform: Platform,

        /// Directory holding the wasm4-toywasm-*.exe loaders
        #[arg(long, env = "W4PLAY_ASSETS", value_name = "DIR", default_value = "assets/native")]
        assets: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Title recorded in the bundle footer
        #[arg(long)]
        title: Option<String>,
    },

    /// Print a link that opens the playground on a source file
    Share {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long)]
        lang: Option<Language>,

        /// Playground address to link to
        #[arg(long, default_value = "http://localhost:5173/")]
        base: String,
    },

    /// Print the source the playground would open with
    Open {
        /// Playground address, possibly carrying a share link
        #[arg(value_name = "ADDRESS")]
        address: Option<String>,

        #[arg(short, long)]
        lang: Option<Language>,

        /// Write the source here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Serve compile requests as JSON lines on stdin/stdout
    Worker,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Compile {
            ref input,
            lang,
            ref output,
            ref wat,
        } => {
            let artifact = compile_file(&cli, input, lang).await?;
            let module_path = output
                .clone()
                .unwrap_or_else(|| input.with_extension("wasm"));
            tokio::fs::write(&module_path, &artifact.module)
                .await
                .with_context(|| format!("failed to write {}", module_path.display()))?;
            println!("Wrote: {} ({} bytes)", module_path.display(), artifact.module.len());

            if let Some(wat_path) = wat {
                match &artifact.text {
                    Some(text) => {
                        tokio::fs::write(wat_path, text)
                            .await
                            .with_context(|| format!("failed to write {}", wat_path.display()))?;
                        println!("Wrote: {}", wat_path.display());
                    }
                    None => eprintln!("No disassembly available for this language"),
                }
            }
            Ok(())
        }

        Command::Bundle {
            ref input,
            lang,
            platform,
            ref assets,
            ref output,
            ref title,
        } => {
            let artifact = compile_file(&cli, input, lang).await?;
            let mut bundler = Bundler::new(AssetDir::new(assets));
            if let Some(title) = title {
                bundler = bundler.with_title(title.as_str());
            }
            let bundle = bundler.bundle(platform, &artifact).await?;
            let path = bundle.write_to(output).await?;
            println!("Wrote: {} ({} bytes)", path.display(), bundle.bytes.len());
            Ok(())
        }

        Command::Share {
            ref input,
            lang,
            ref base,
        } => {
            let lang = language_for(input, lang)?;
            let text = read_source(input).await?;
            println!("{}", share_url(base, &Source::new(text, lang)));
            Ok(())
        }

        Command::Open {
            ref address,
            lang,
            ref output,
        } => {
            let location = match address {
                Some(address) => Location::parse(address)?,
                None => Location::empty(),
            };
            let store = open_storage(cli.storage.as_deref()).await?;
            let (source, origin) = resolve(&location, store.storage.as_ref(), lang);
            let origin = match origin {
                Origin::ShareLink => "share link",
                Origin::Storage => "storage",
                Origin::Sample => "built-in sample",
            };
            eprintln!("{} source from {}", source.lang.display_name(), origin);

            match output {
                Some(path) => tokio::fs::write(path, &source.text)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{}", source.text),
            }
            Ok(())
        }

        Command::Worker => {
            tracing::info!("serving compile requests on stdio");
            dispatcher(&cli)
                .serve(tokio::io::stdin(), tokio::io::stdout())
                .await?;
            Ok(())
        }
    }
}

fn dispatcher(cli: &Cli) -> Dispatcher {
    Dispatcher::with_toolchains(
        AscOptions::new().command_line(&cli.asc),
        RolandOptions::new().command_line(&cli.rolandc),
    )
}

/// The session store, plus the file-backed store behind it (if any) so
/// pending writes can be awaited before the process exits.
struct SessionStore {
    storage: Arc<dyn Storage>,
    file: Option<Arc<FileStorage>>,
}

impl SessionStore {
    async fn flushed(&self) {
        if let Some(file) = &self.file {
            file.flushed().await;
        }
    }
}

async fn open_storage(path: Option<&Path>) -> anyhow::Result<SessionStore> {
    match path {
        Some(path) => {
            let file = Arc::new(FileStorage::open(path).await?);
            let storage: Arc<dyn Storage> = file.clone();
            Ok(SessionStore {
                storage,
                file: Some(file),
            })
        }
        None => Ok(SessionStore {
            storage: Arc::new(MemoryStorage::new()),
            file: None,
        }),
    }
}

fn language_for(input: &Path, lang: Option<Language>) -> anyhow::Result<Language> {
    match lang.or_else(|| Language::from_path(input)) {
        Some(lang) => Ok(lang),
        None => bail!(
            "cannot tell the language of {}; pass --lang ts or --lang rol",
            input.display()
        ),
    }
}

async fn read_source(input: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))
}

/// Run `input` through a playground session and return the artifact.
/// Diagnostics are printed and end the process.
async fn compile_file(
    cli: &Cli,
    input: &Path,
    lang: Option<Language>,
) -> anyhow::Result<CompilationArtifact> {
    let lang = language_for(input, lang)?;
    let text = read_source(input).await?;
    let store = open_storage(cli.storage.as_deref()).await?;

    let playground = Playground::new(
        dispatcher(cli).spawn(),
        store.storage.clone(),
        Location::empty(),
        Some(lang),
    );
    playground.set_text(text);

    if cli.verbose {
        println!("Compiling {} as {}...", input.display(), lang.display_name());
    }

    let state = playground.compile().await;
    store.flushed().await;

    match state {
        CompilationState::Success(artifact) => Ok(artifact),
        CompilationState::Failure(diagnostic) => {
            eprintln!("Compilation failed:\n{}", diagnostic);
            process::exit(1);
        }
        state => bail!("compile ended in unexpected state {:?}", state),
    }
}
