use clap::Parser;
use emotion_bridge::app::http;
use emotion_bridge::utils::{error::ErrorSeverity, logger};
use emotion_bridge::{CliArgs, CommandChannel, CommandSink, LineReader};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init(args.verbose, args.json_logs);

    tracing::info!("Starting emotion-server");

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 序列埠只開一次；失敗時伺服器照常啟動，每次請求都回報錯誤
    let (channel, reader) = CommandChannel::connect(&config);
    let _reader_task = reader.map(LineReader::spawn_logger);
    let sink: Arc<dyn CommandSink> = Arc::new(channel);

    let app = http::router_with_assets(sink, config.static_dir());

    let listener = match TcpListener::bind((config.host.as_str(), config.http_port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("❌ Failed to bind {}:{}: {}", config.host, config.http_port, e);
            eprintln!("❌ Port {} is not available: {}", config.http_port, e);
            std::process::exit(3);
        }
    };
    tracing::info!("Open this URL in your browser!");

    if let Err(e) = http::serve(listener, app, shutdown_signal()).await {
        tracing::error!(
            "❌ Server stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
