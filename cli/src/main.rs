use std::path::PathBuf;
use std::time::Duration;

use canvas::engine::{Action, EngineCore};
use canvas::input::PointerSample;
use canvas::raster::RasterSurface;
use canvas::surface::{Point, RecordingSurface, SurfaceError};
use clap::{Args, Parser, Subcommand};
use frames::{EventKind, Frame, Tool};
use futures_util::{SinkExt, StreamExt};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const GREETING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check returned HTTP {0}")]
    Unhealthy(u16),
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for the relay greeting")]
    Timeout,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("invalid width {0:?}; expected a positive number")]
    InvalidWidth(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "scribble", about = "Headless peer for the whiteboard relay")]
struct Cli {
    #[arg(long, env = "SCRIBBLE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the relay answers `/healthz`.
    Ping,
    /// Draw one straight stroke, sent as a run of segments.
    Draw(DrawArgs),
    /// Clear every other peer's canvas.
    Clear,
    /// Print relayed events and render them, writing a PNG on exit.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[arg(long, value_parser = parse_point, default_value = "10,10")]
    from: Point,
    #[arg(long, value_parser = parse_point, default_value = "200,200")]
    to: Point,
    /// Number of segments the stroke is split into.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    steps: u32,
    #[arg(long, default_value = "pencil")]
    tool: Tool,
    #[arg(long)]
    color: Option<String>,
    #[arg(long, default_value = "5")]
    width: String,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[arg(long, default_value_t = 10)]
    seconds: u64,
    #[arg(long, default_value = "whiteboard.png")]
    out: PathBuf,
    #[arg(long, value_parser = parse_size, default_value = "800x600")]
    size: (u32, u32),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "scribble=info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ping => run_ping(&cli.base_url).await,
        Command::Draw(args) => run_draw(&cli.base_url, args).await,
        Command::Clear => run_clear(&cli.base_url).await,
        Command::Watch(args) => run_watch(&cli.base_url, args).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let url = format!("{}/healthz", base_url.trim_end_matches('/'));
    let status = reqwest::get(url).await?.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_draw(base_url: &str, args: DrawArgs) -> Result<(), CliError> {
    let frames = stroke_frames(&args)?;
    let mut stream = connect(base_url).await?;
    for frame in &frames {
        send(&mut stream, frame).await?;
    }
    stream.close(None).await?;
    eprintln!("sent {} segments", frames.len());
    Ok(())
}

async fn run_clear(base_url: &str) -> Result<(), CliError> {
    let mut stream = connect(base_url).await?;
    send(&mut stream, &Frame::clear_canvas()).await?;
    stream.close(None).await?;
    eprintln!("sent clear-canvas");
    Ok(())
}

async fn run_watch(base_url: &str, args: WatchArgs) -> Result<(), CliError> {
    let (width, height) = args.size;
    let mut engine = EngineCore::new(RasterSurface::new(width, height)?);
    let mut stream = connect(base_url).await?;

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut received = 0_usize;
    loop {
        let next = tokio::time::timeout_at(deadline, stream.next()).await;
        let Ok(message) = next else {
            break;
        };
        let Some(message) = message else {
            tracing::warn!("relay closed the connection");
            break;
        };
        match message? {
            Message::Text(text) => {
                received = received.saturating_add(1);
                println!("{}", text.as_str());
                engine.apply_remote_text(text.as_str())?;
            }
            Message::Close(_) => {
                tracing::warn!("relay sent close");
                break;
            }
            _ => {}
        }
    }

    let png = engine.surface().encode_png()?;
    tokio::fs::write(&args.out, png)
        .await
        .map_err(|source| CliError::Write { path: args.out.clone(), source })?;
    eprintln!("received {received} frames; wrote {}", args.out.display());
    Ok(())
}

/// Drive a recording engine through one pointer stroke and collect the
/// frames it emits.
fn stroke_frames(args: &DrawArgs) -> Result<Vec<Frame>, CliError> {
    let mut engine = EngineCore::new(RecordingSurface::new(0, 0));
    if let Some(color) = &args.color {
        engine.select_color(color);
    }
    engine.select_tool(args.tool);
    if !engine.set_width_input(&args.width) {
        return Err(CliError::InvalidWidth(args.width.clone()));
    }

    let mut actions = engine.on_pointer_down(&PointerSample::mouse(args.from.x, args.from.y));
    for step in 1..=args.steps {
        let t = f64::from(step) / f64::from(args.steps);
        let x = args.from.x + (args.to.x - args.from.x) * t;
        let y = args.from.y + (args.to.y - args.from.y) * t;
        actions.extend(engine.on_pointer_move(&PointerSample::mouse(x, y)));
    }
    engine.on_pointer_up();

    Ok(actions
        .into_iter()
        .filter_map(|action| match action {
            Action::Emit(frame) => Some(frame),
            Action::SuppressScroll => None,
        })
        .collect())
}

/// Connect to the relay and wait for its `connected` greeting.
async fn connect(base_url: &str) -> Result<WsStream, CliError> {
    let url = ws_url(base_url)?;
    let (mut stream, _) = connect_async(url.as_str()).await?;
    let peer_id = wait_for_greeting(&mut stream).await?;
    tracing::info!(%url, %peer_id, "connected");
    Ok(stream)
}

async fn wait_for_greeting(stream: &mut WsStream) -> Result<String, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message? {
                Message::Text(text) => {
                    let frame = frames::decode_frame(text.as_str())?;
                    if frame.kind() == Some(EventKind::Connected) {
                        return Ok(frame.data_str(frames::FRAME_PEER_ID).unwrap_or_default().to_owned());
                    }
                }
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(GREETING_TIMEOUT, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}

async fn send(stream: &mut WsStream, frame: &Frame) -> Result<(), CliError> {
    tracing::debug!(event = %frame.event, "send");
    stream.send(Message::Text(frames::encode_frame(frame).into())).await?;
    Ok(())
}

fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected x,y but got {raw:?}"))?;
    let coord = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("bad coordinate {s:?}: {e}"));
    Ok(Point::new(coord(x)?, coord(y)?))
}

fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw.split_once('x').ok_or_else(|| format!("expected WIDTHxHEIGHT but got {raw:?}"))?;
    let dim = |s: &str| match s.trim().parse::<u32>() {
        Ok(0) => Err("size must be non-zero".to_owned()),
        Ok(v) => Ok(v),
        Err(e) => Err(format!("bad dimension {s:?}: {e}")),
    };
    Ok((dim(w)?, dim(h)?))
}
