use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 函式庫與兩個執行檔各自有自己的 target
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "emotion_bridge=debug,emotion_server=debug,auto_run=debug,info"
    } else {
        "emotion_bridge=info,emotion_server=info,auto_run=info,warn"
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

/// 依命令列旗標選擇輸出格式
pub fn init(verbose: bool, json: bool) {
    if json {
        init_json_logger(verbose);
    } else {
        init_cli_logger(verbose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_with(verbose: bool, check: impl FnOnce() -> bool) -> bool {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(default_directives(verbose)));
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn test_binary_targets_log_info_by_default() {
        assert!(enabled_with(false, || tracing::enabled!(target: "emotion_server", Level::INFO)));
        assert!(enabled_with(false, || tracing::enabled!(target: "auto_run", Level::INFO)));
        assert!(enabled_with(false, || tracing::enabled!(target: "emotion_bridge", Level::INFO)));
    }

    #[test]
    fn test_other_crates_stay_quiet_by_default() {
        assert!(!enabled_with(false, || tracing::enabled!(target: "hyper", Level::INFO)));
        assert!(!enabled_with(false, || tracing::enabled!(target: "emotion_server", Level::DEBUG)));
    }

    #[test]
    fn test_verbose_enables_debug_for_binaries() {
        assert!(enabled_with(true, || tracing::enabled!(target: "emotion_server", Level::DEBUG)));
        assert!(enabled_with(true, || tracing::enabled!(target: "auto_run", Level::DEBUG)));
        assert!(!enabled_with(true, || tracing::enabled!(target: "hyper", Level::DEBUG)));
    }
}
