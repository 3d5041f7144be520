use clap::Parser;
use delete_guard::app::{delete_from_config_file, render_report};
use delete_guard::domain::model::{ActorId, ResourceKind};
use delete_guard::utils::{logger, validation};
use delete_guard::{CliConfig, GuardConfig, GuardError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 載入 TOML 配置
    let config = match GuardConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose();
    logger::init_logger(verbose, config.json_logs());

    tracing::info!("Starting delete-guard");
    tracing::debug!("CLI args: {:?}", args);

    let kind = ResourceKind::from(args.kind);
    let outcome = run(&args, kind).await;

    if args.json {
        match render_report(kind, &args.name, &outcome) {
            Ok(report) => println!("{}", report),
            Err(e) => {
                eprintln!("❌ Failed to render report: {}", e);
                std::process::exit(e.exit_code());
            }
        }
    }

    match outcome {
        Ok(()) => {
            tracing::info!("✅ {} '{}' deleted", kind, args.name);
            if !args.json {
                println!("✅ {} '{}' deleted", kind, args.name);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Delete failed: {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            if !args.json {
                eprintln!("❌ {}", e);
                eprintln!("💡 {}", e.recovery_suggestion());
            }
            std::process::exit(e.exit_code());
        }
    }
}

// 刪除成功後會把 inventory 寫回 --config 檔案
async fn run(args: &CliConfig, kind: ResourceKind) -> Result<(), GuardError> {
    let actor = ActorId(*validation::validate_required_field("--actor", &args.actor)?);
    delete_from_config_file(&args.config, kind, &args.name, actor).await
}
