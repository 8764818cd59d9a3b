use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use facecast::config::PipelineConfig;
use facecast::curve::artifact::read_curve;
use facecast::launch::host::host_failure;
use facecast::pipeline::frames_pattern_for;
use facecast::{
    AudioBuffer, CancelSignal, HostInvocation, HttpSpeechClient, ModelConfig, Muxer, Pipeline,
    RunRequest, ScriptArgs, SpeechSource, StreamingClient, TargetSelector, WsConnector,
};

#[derive(Parser, Debug)]
#[command(name = "facecast", version)]
struct Cli {
    /// Pipeline configuration JSON (every field optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream a WAV file to the inference service and write the curve CSV.
    Infer(InferArgs),
    /// Launch the render host on a curve.
    Render(RenderArgs),
    /// Mux rendered frames with audio.
    Mux(MuxArgs),
    /// Text or audio in, video out.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct InferArgs {
    /// Mono 16-bit WAV input.
    #[arg(long)]
    audio: PathBuf,

    /// Curve CSV output.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene file handed to the host.
    #[arg(long)]
    scene: PathBuf,

    #[arg(long)]
    curve: PathBuf,

    #[arg(long)]
    audio: PathBuf,

    /// Video path forwarded to the host script.
    #[arg(long)]
    out: PathBuf,

    /// Override `render.fps`.
    #[arg(long)]
    fps: Option<u32>,

    /// Target selector arguments (`collection [group]` or a comma-separated name list).
    #[arg(last = true)]
    selector: Vec<String>,
}

#[derive(Parser, Debug)]
struct MuxArgs {
    #[arg(long)]
    audio: PathBuf,

    #[arg(long)]
    out: PathBuf,

    /// Frame pattern; defaults to the configured frames directory and prefix.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Override `render.fps`.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Text to speak.
    #[arg(long, conflicts_with = "audio", required_unless_present = "audio")]
    text: Option<String>,

    /// Pre-recorded WAV instead of synthesized speech.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Voice preset (belinda, broom_salesman, chadwick, en_man, en_woman, mabel, vex, zh_man_sichuan).
    #[arg(long, default_value = "belinda")]
    preset: String,

    /// Directory for the speech and curve artifacts.
    #[arg(long, default_value = "facecast_out")]
    work_dir: PathBuf,

    /// Final video path.
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let cancel = CancelSignal::ctrl_c();
    match cli.cmd {
        Command::Infer(args) => cmd_infer(&config, args).await,
        Command::Render(args) => cmd_render(&config, args, &cancel).await,
        Command::Mux(args) => cmd_mux(&config, args, &cancel).await,
        Command::Run(args) => cmd_run(config, args, &cancel).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => PipelineConfig::from_path(p)?,
        None => PipelineConfig::default(),
    };
    config.apply_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn fps_override(config: &PipelineConfig, fps: Option<u32>) -> anyhow::Result<facecast::Fps> {
    match fps {
        Some(f) => Ok(facecast::Fps::whole(f)?),
        None => Ok(config.render.fps()?),
    }
}

async fn cmd_infer(config: &PipelineConfig, args: InferArgs) -> anyhow::Result<()> {
    let audio = AudioBuffer::read_wav(&args.audio)?;
    let model = match &config.inference.model_config {
        Some(p) => ModelConfig::from_path(p)?,
        None => ModelConfig::default(),
    };
    let client = StreamingClient::new(WsConnector::new(&config.inference), &config.inference);
    let path = client
        .infer(&audio, &model, &args.out)
        .await
        .with_context(|| format!("inference for '{}'", args.audio.display()))?;
    let curve = read_curve(&path)?;
    eprintln!(
        "wrote {} ({} rows, {} channels)",
        path.display(),
        curve.len(),
        curve.channels().len()
    );
    Ok(())
}

async fn cmd_render(
    config: &PipelineConfig,
    args: RenderArgs,
    cancel: &CancelSignal,
) -> anyhow::Result<()> {
    read_curve(&args.curve)?
        .ensure_animatable()
        .with_context(|| format!("curve '{}'", args.curve.display()))?;

    let script_args = ScriptArgs {
        curve: args.curve,
        audio: args.audio,
        output: args.out,
        fps: fps_override(config, args.fps)?,
        selector: TargetSelector::from_args(&args.selector)?,
    };
    let inv = HostInvocation::from_config(
        &config.render,
        args.scene,
        script_args,
        &config.inference.channel_prefix,
    )?;
    let finished = facecast::launch(&inv, cancel, &mut |_| {}).await?;
    if let Some(err) = host_failure(&finished) {
        return Err(err.into());
    }
    eprintln!("frames in {}", config.render.frames_dir.display());
    Ok(())
}

async fn cmd_mux(config: &PipelineConfig, args: MuxArgs, cancel: &CancelSignal) -> anyhow::Result<()> {
    let pattern = args.frames.unwrap_or_else(|| frames_pattern_for(config));
    let muxer = Muxer::from_config(&config.encoder)?;
    let out = muxer
        .mux(&pattern, &args.audio, &args.out, fps_override(config, args.fps)?, cancel)
        .await?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

async fn cmd_run(config: PipelineConfig, args: RunArgs, cancel: &CancelSignal) -> anyhow::Result<()> {
    let speech = match (args.text, args.audio) {
        (_, Some(wav)) => SpeechSource::Wav(wav),
        (Some(text), None) => SpeechSource::Text(text),
        (None, None) => anyhow::bail!("either --text or --audio is required"),
    };
    let synth = HttpSpeechClient::new(&config.speech)?;
    let connector = WsConnector::new(&config.inference);
    let pipeline = Pipeline::new(config, Box::new(synth), connector)?;

    let req = RunRequest {
        speech,
        preset: args.preset,
        work_dir: args.work_dir,
        output: args.out,
    };
    let out = pipeline.run(&req, cancel).await?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
