//! Reference render host: runs the rig in-process against a scene description and writes
//! preview frames. Accepts the same command line as a real host.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use facecast::{FacecastResult, PreviewHost, RigEnv, Scene, ScriptArgs, rig, run_rig};

#[derive(Parser, Debug)]
#[command(name = "facecast-host", version)]
struct Cli {
    /// Run without a UI (always the case here; accepted for compatibility).
    #[arg(long)]
    headless: bool,

    /// Scene description JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Script a 3D host would run; the rig is built in.
    #[arg(long)]
    script: Option<PathBuf>,

    /// `<curve.csv> <audio> <output> <fps> [selector...]`
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "rig failed");
            eprintln!("{}", rig::error_line(&e));
            ExitCode::from(rig::exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> FacecastResult<()> {
    if !cli.headless {
        tracing::debug!("interactive mode is not supported, running headless");
    }
    if let Some(script) = &cli.script {
        tracing::debug!(script = %script.display(), "ignoring host script, using built-in rig");
    }

    let args = ScriptArgs::parse(&cli.args)?;
    let scene = Scene::from_path(&cli.scene)?;
    let env = RigEnv::from_env();

    let mut host = PreviewHost::new(&scene);
    let report = run_rig(&scene, &args, &env, &mut host)?;
    tracing::info!(
        frames = report.frames_rendered,
        keyframes = report.keyframes,
        dir = %env.frames_dir.display(),
        "done"
    );
    Ok(())
}
