use anyhow::Result;
use clap::Parser;
use playlist_convert::backend::HttpBackend;
use playlist_convert::cli::{
    execute_convert, execute_detect, execute_expand, execute_status, execute_subscribe,
    until_cancelled, Cli, Commands, FailureReport, GlobalArgs,
};
use playlist_convert::domain::ConvertError;
use playlist_convert::polling::DefaultPollConfig;
use playlist_convert::{App, ConvertOptions};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("playlist_convert={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("ログの初期化に失敗: {e}"))
}

/// Ctrl-C でトークンをキャンセルする
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}

/// 引数から変換サービスのクライアントを組み立てる
fn build_app(global: &GlobalArgs) -> Result<App<HttpBackend, DefaultPollConfig>> {
    let config = global.client_config()?;
    debug!(
        base_url = %config.base_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        max_attempts = ?config.max_attempts,
        "client configuration"
    );
    Ok(App::new(config.build_backend()?, config.poll_config()?))
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    match cli.command {
        Commands::Convert {
            playlist,
            invert_order,
            quiet,
        } => {
            let app = build_app(&cli.global)?;
            let options = ConvertOptions::new(playlist).with_invert_order(invert_order);
            execute_convert(&app, options, quiet, cancel).await
        }
        Commands::Expand { url } => execute_expand(&build_app(&cli.global)?, &url).await,
        Commands::Status { task_id } => execute_status(&build_app(&cli.global)?, &task_id).await,
        Commands::Detect { url } => execute_detect(&url),
        Commands::Subscribe { email } => {
            execute_subscribe(&build_app(&cli.global)?, &email).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.global.log_level) {
        eprintln!("⚠️  {e}");
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    // Ctrl-C はどのサブコマンドの実行中でも中断する
    let Err(error) = until_cancelled(run(cli, &cancel), &cancel).await else {
        return ExitCode::SUCCESS;
    };

    if let Some(convert_error) = error.downcast_ref::<ConvertError>() {
        debug!(error = %convert_error, severity = convert_error.severity().as_str(), "command failed");
    }

    let report = FailureReport::from_error(&error);
    if let Some(message) = &report.message {
        eprintln!("{message}");
    }
    ExitCode::from(report.exit_code)
}
