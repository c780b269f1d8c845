use clap::Parser;

use clicktag::config::StaticConfig;
use clicktag::runtime::modes::run_server;
use clicktag::system::init_logging;

#[derive(Debug, Parser)]
#[command(name = "clicktag", version, about = "Click tracking redirect service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    dotenvy::dotenv().ok();

    // 缺少 backend 配置时在启动阶段直接失败
    let config = match StaticConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    run_server(config).await
}
