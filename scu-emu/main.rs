use anyhow::{bail, Context};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::{Parser, Subcommand};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use scu_emu::config::parse_u32;
use scu_emu::script::{self, ScriptOp};
use scu_emu::{
    AccessObserver, DeviceConfig, FileConfig, LockEnforcement, Scu, ScuError, ScuMetricExporter,
    ScuOptions, ScuSnapshot, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "scu-emu")]
#[command(about = "ASPEED System Control Unit register emulator")]
struct Args {
    #[arg(
        long,
        global = true,
        value_parser = parse_variant,
        help = "SCU generation: ast2400, ast2500 or ast2600 (default: from the silicon revision)"
    )]
    variant: Option<Variant>,

    #[arg(long, global = true, value_parser = parse_word, help = "Silicon revision, e.g. 0x04010303")]
    silicon_rev: Option<u32>,

    #[arg(long, global = true, value_parser = parse_word, help = "Hardware strap word 1")]
    hw_strap1: Option<u32>,

    #[arg(long, global = true, value_parser = parse_word, help = "Hardware strap word 2")]
    hw_strap2: Option<u32>,

    #[arg(long, global = true, value_parser = parse_word, help = "Initial protection key cell")]
    hw_prot_key: Option<u32>,

    #[arg(long, global = true, value_parser = parse_lock, help = "Lock policy override: advisory or block")]
    lock_enforcement: Option<LockEnforcement>,

    #[arg(long, global = true, help = "JSON device configuration; flags override its fields")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Enable verbose logging (shows every guest access)"
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the reset register image as a JSON snapshot
    Dump,

    /// Print the APB clock frequency after reset
    Apb,

    /// Apply a sequence of accesses and print every read
    Run {
        #[arg(value_parser = parse_op, help = "r:OFF[/W], w:OFF=VAL[/W], reset or apb")]
        ops: Vec<ScriptOp>,

        #[arg(long, help = "Restore this snapshot before running")]
        load: Option<PathBuf>,

        #[arg(long, help = "Write the final state to this snapshot file")]
        save: Option<PathBuf>,
    },

    /// Serve one device over HTTP with Prometheus metrics
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        #[arg(long, default_value_t = 5, help = "Gauge refresh interval in seconds")]
        interval: u64,

        #[arg(long, help = "Disable the /metrics exporter")]
        no_metrics: bool,
    },
}

fn parse_word(s: &str) -> Result<u32, String> {
    parse_u32(s).map_err(|e| e.to_string())
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    s.parse().map_err(|e: ScuError| e.to_string())
}

fn parse_op(s: &str) -> Result<ScriptOp, String> {
    s.parse().map_err(|e: ScuError| e.to_string())
}

fn parse_lock(s: &str) -> Result<LockEnforcement, String> {
    match s.to_ascii_lowercase().as_str() {
        "advisory" => Ok(LockEnforcement::Advisory),
        "block" => Ok(LockEnforcement::Block),
        other => Err(format!("unknown lock enforcement '{other}'")),
    }
}

/// Revision used when only the variant is given
fn default_revision(variant: Variant) -> u32 {
    use scu_raw::revision;

    match variant {
        Variant::Ast2400 => revision::AST2400_A1,
        Variant::Ast2500 => revision::AST2500_A1,
        Variant::Ast2600 => revision::AST2600_A1,
    }
}

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &Args) -> anyhow::Result<(Variant, DeviceConfig, ScuOptions)> {
    let mut file = match &args.config {
        Some(path) => FileConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => FileConfig::default(),
    };

    if let Some(variant) = args.variant {
        file.variant = Some(variant);
    }
    if let Some(rev) = args.silicon_rev {
        file.device.silicon_rev = rev;
    }
    if let Some(value) = args.hw_strap1 {
        file.device.hw_strap1 = value;
    }
    if let Some(value) = args.hw_strap2 {
        file.device.hw_strap2 = value;
    }
    if let Some(value) = args.hw_prot_key {
        file.device.hw_prot_key = value;
    }
    if args.lock_enforcement.is_some() {
        file.options.lock_enforcement = args.lock_enforcement;
    }

    if file.device.silicon_rev == 0 {
        match file.variant {
            Some(variant) => file.device.silicon_rev = default_revision(variant),
            None => bail!("either --variant or --silicon-rev is required"),
        }
    }

    let variant = file.resolve_variant()?;
    Ok((variant, file.device, file.options))
}

struct AppState {
    scu: Arc<Scu>,
    exporter: Option<Arc<ScuMetricExporter>>,
}

type HttpError = (StatusCode, String);

fn bad_request(e: ScuError) -> HttpError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[derive(Debug, Deserialize)]
struct WidthQuery {
    width: Option<u32>,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Some(ref exporter) = state.exporter {
        exporter.collect(&state.scu);
    }
    scu_emu::gather_metrics!(buffer, encoder, state.exporter, "SCU");

    let content_type = encoder.format_type().to_string();
    (
        [("Content-Type", content_type)],
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

async fn read_handler(
    State(state): State<Arc<AppState>>,
    Path(offset): Path<String>,
    Query(query): Query<WidthQuery>,
) -> Result<String, HttpError> {
    let offset = parse_u32(&offset).map_err(bad_request)?;
    let value = state
        .scu
        .checked_read(u64::from(offset), query.width.unwrap_or(4))
        .map_err(bad_request)?;
    Ok(format!("0x{value:08X}\n"))
}

async fn write_handler(
    State(state): State<Arc<AppState>>,
    Path(offset): Path<String>,
    Query(query): Query<WidthQuery>,
    body: String,
) -> Result<StatusCode, HttpError> {
    let offset = parse_u32(&offset).map_err(bad_request)?;
    let value = parse_u32(&body).map_err(bad_request)?;
    state
        .scu
        .checked_write(u64::from(offset), query.width.unwrap_or(4), u64::from(value))
        .map_err(bad_request)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.scu.reset();
    StatusCode::NO_CONTENT
}

async fn apb_handler(State(state): State<Arc<AppState>>) -> String {
    format!("{}\n", state.scu.apb_frequency())
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<ScuSnapshot> {
    Json(state.scu.snapshot())
}

/// Refresh exporter gauges until cancelled
async fn refresh_loop(state: Arc<AppState>, period: Duration, cancel_token: CancellationToken) {
    let Some(exporter) = state.exporter.clone() else {
        return;
    };

    tracing::info!("Starting gauge refresh every {:?}", period);
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!("Gauge refresh stopped");
                break;
            }
            _ = interval.tick() => {
                exporter.collect(&state.scu);
            }
        }
    }
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Ctrl+C received!");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("SIGTERM received!");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("Shutdown signal received, initiating graceful shutdown...");
    cancel_token.cancel();
}

async fn serve(
    scu: Scu,
    exporter: Option<Arc<ScuMetricExporter>>,
    listen: SocketAddr,
    interval: u64,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        scu: Arc::new(scu),
        exporter,
    });

    let cancel_token = CancellationToken::new();
    let refresh_handle = tokio::spawn(refresh_loop(
        Arc::clone(&state),
        Duration::from_secs(interval.max(1)),
        cancel_token.clone(),
    ));

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/regs/{offset}", get(read_handler).put(write_handler))
        .route("/reset", post(reset_handler))
        .route("/apb", get(apb_handler))
        .route("/snapshot", get(snapshot_handler))
        .with_state(state);

    tracing::warn!("Starting HTTP server on {}", listen);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding {listen}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    tracing::info!("Server shutdown complete, waiting for refresh loop to finish...");
    let _ = refresh_handle.await;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (variant, config, options) = resolve_config(&args)?;
    tracing::info!(
        "Using {} SCU, silicon rev 0x{:08X}",
        variant.name(),
        config.silicon_rev
    );

    let scu = Scu::new(variant, config)?.with_options(options);

    match args.command {
        Command::Dump => {
            println!("{}", scu.snapshot().to_json()?);
        }
        Command::Apb => {
            println!("{}", scu.apb_frequency());
        }
        Command::Run { ops, load, save } => {
            if let Some(path) = load {
                let snapshot = ScuSnapshot::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
                scu.restore(&snapshot)?;
            }
            for line in script::run(&scu, &ops)? {
                println!("{line}");
            }
            if let Some(path) = save {
                scu.snapshot().save(&path)?;
            }
        }
        Command::Serve {
            listen,
            interval,
            no_metrics,
        } => {
            let (scu, exporter) = if no_metrics {
                (scu, None)
            } else {
                let exporter = Arc::new(ScuMetricExporter::new(variant)?);
                let scu = scu.with_observer(Arc::clone(&exporter) as Arc<dyn AccessObserver>);
                (scu, Some(exporter))
            };
            serve(scu, exporter, listen, interval).await?;
        }
    }

    Ok(())
}
