use clap::Parser;
use colored::Colorize;

use slideforge::cli::{Cli, Commands};
use slideforge::config::{get_config, init_config};
use slideforge::runtime::modes;
use slideforge::system::logging::init_logging;
use slideforge::system::panic_handler::{RunMode, install_panic_hook};

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_config(cli.config.as_deref());

    match cli.command {
        None | Some(Commands::Serve) => run_server_mode().await,
        Some(cmd) => run_cli_mode(cmd).await,
    }
}

async fn run_server_mode() {
    install_panic_hook(RunMode::Server);

    // guard 必须存活到进程结束，否则缓冲中的日志会丢失
    let _guard = match init_logging(&get_config().logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    if let Err(e) = modes::run_server().await {
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_cli_mode(cmd: Commands) {
    install_panic_hook(RunMode::Cli);

    // 只有生成命令需要日志；失败时继续执行
    let _guard = match &cmd {
        Commands::Generate { .. } => init_logging(&get_config().logging).ok(),
        _ => None,
    };

    if let Err(e) = modes::run_cli(cmd).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
