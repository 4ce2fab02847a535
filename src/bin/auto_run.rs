use clap::Parser;
use emotion_bridge::app::script::{ScriptOutcome, ScriptRunner};
use emotion_bridge::utils::logger;
use emotion_bridge::{CliArgs, CommandChannel, CommandSink, LineReader};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init(args.verbose, args.json_logs);

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let (channel, reader) = CommandChannel::connect(&config);
    let _reader_task = reader.map(LineReader::spawn_logger);
    let sink: Arc<dyn CommandSink> = Arc::new(channel);

    let script = config.script();
    tracing::info!(
        "🎬 Demo of {} emotions over {:?}",
        script.steps.len(),
        script.total_duration()
    );

    let handle = ScriptRunner::new(sink, script).spawn();
    let cancel = handle.cancellation_token();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, stopping demo");
            cancel.cancel();
            return Ok(());
        }
        report = handle.join() => {
            let report = report?;
            tracing::info!(
                "Demo finished: {} sent, {} failed",
                report.sent,
                report.failed
            );
            if report.outcome != ScriptOutcome::Completed {
                return Ok(());
            }
        }
    }

    // 示範結束後保持序列埠開啟，繼續顯示機器人的回應
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    Ok(())
}
