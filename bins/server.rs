use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
    info!(service = "notes", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    // load .env first so RUST_LOG, CONFIG_PATH and overrides apply
    dotenv().ok();

    let config = AppConfig::load_and_validate();
    init_logging(config.as_ref().map(|c| c.log.format).unwrap_or_default());
    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "notes", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "notes",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = config.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "notes", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "notes",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        data_file = %config.storage.data_file.display(),
        "notes service starting"
    );

    match rt.block_on(server::run(config)) {
        Ok(()) => {
            info!(service = "notes", event = "stop", %service_id, pid, "notes service stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "notes", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
