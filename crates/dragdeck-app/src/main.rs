//! Command-line entry point (native).

#[cfg(feature = "native")]
mod cli {
    use clap::{Parser, Subcommand};
    use dragdeck_app::{ReplayResult, Scene, Trace, replay};
    use dragdeck_core::DeckConfig;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    #[derive(Parser, Debug)]
    #[command(name = "dragdeck", about = "Replay pointer traces against a DragDeck scene")]
    struct Cli {
        /// Increase log verbosity (-v debug, -vv trace).
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Replay a trace and print drag events as JSON lines.
        Replay {
            scene: PathBuf,
            trace: PathBuf,
            /// Config file overriding the scene's config.
            #[arg(long)]
            config: Option<PathBuf>,
            /// Also print the presentation state after every frame.
            #[arg(long)]
            frames: bool,
        },
        /// Validate a scene file and an optional config file.
        Check {
            scene: PathBuf,
            #[arg(long)]
            config: Option<PathBuf>,
        },
    }

    fn load_scene(path: &Path, config: Option<&Path>) -> ReplayResult<Scene> {
        let mut scene = Scene::load(path)?;
        if let Some(config) = config {
            scene.config = DeckConfig::load(config)?;
        }
        Ok(scene)
    }

    fn run(cli: Cli) -> ReplayResult<()> {
        match cli.command {
            Command::Replay {
                scene,
                trace,
                config,
                frames,
            } => {
                let scene = load_scene(&scene, config.as_deref())?;
                let trace = Trace::load(&trace)?;
                let outcome = replay(&scene, &trace)?;

                for event in &outcome.events {
                    println!("{}", serde_json::to_string(event)?);
                }
                if frames {
                    for (index, frame) in outcome.frames.iter().enumerate() {
                        println!(
                            "{}",
                            serde_json::json!({ "frame": index, "output": frame })
                        );
                    }
                }
                println!(
                    "{}",
                    serde_json::json!({ "scroll": outcome.scroll, "items": outcome.items })
                );
            }
            Command::Check { scene, config } => {
                let scene = load_scene(&scene, config.as_deref())?;
                let deck = scene.build()?;
                log::info!(
                    "Scene ok: {} items, content {:?}, client {:?}",
                    deck.len(),
                    deck.viewport.content_size,
                    deck.viewport.client_size
                );
            }
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        let cli = Cli::parse();
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        log::debug!("Starting DragDeck");

        match run(cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{}", err);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
