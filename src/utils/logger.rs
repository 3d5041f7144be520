use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "delete_guard=debug,info"
    } else {
        "delete_guard=info"
    }
}

/// 初始化全域 subscriber；`json` 給日誌收集系統用，否則輸出精簡格式
pub fn init_logger(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    fn base_layer<S>() -> fmt::Layer<S> {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    }
    let (json_layer, compact_layer) = if json {
        (Some(base_layer().json()), None)
    } else {
        (None, Some(base_layer().compact()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for verbose in [false, true] {
            let directive = default_directive(verbose);
            assert!(directive.parse::<EnvFilter>().is_ok(), "{directive}");
        }
        assert!(default_directive(true).contains("debug"));
    }
}
