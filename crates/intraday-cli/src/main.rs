//! 분봉 캐시 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # AAPL 1분봉 조회 (캐시 우선)
//! intraday get -s AAPL
//!
//! # S&P 500 지수 5분봉, 날짜 범위 지정
//! intraday get -s ^GSPC -k index -i 5min -f 2024-01-02 -t 2024-01-05
//!
//! # 여러 종목 배치 조회
//! intraday batch -s AAPL,MSFT,NVDA
//!
//! # Redis/제공자 상태 확인
//! intraday health
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intraday_cli::commands::{
    build_service,
    fetch::{run_batch, run_get, FetchOptions},
    health::check_health,
    split_symbols,
};
use intraday_core::{init_logging, AppConfig, LogConfig, DEFAULT_CONFIG_PATH};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "intraday")]
#[command(about = "Intraday market data cache - stale-while-revalidate over FMP", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값과 환경 변수만 사용)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 심볼 분봉 조회
    Get {
        /// 종목/지수 심볼 (예: AAPL, ^GSPC)
        #[arg(short, long)]
        symbol: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// 여러 심볼 배치 조회
    Batch {
        /// 쉼표로 구분된 심볼 목록 (예: AAPL,MSFT,NVDA)
        #[arg(short, long)]
        symbols: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// 시스템 상태 확인
    Health,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// 데이터 종류 (stock, index)
    #[arg(short, long, default_value = "stock")]
    kind: String,

    /// 분봉 간격 (1min, 5min, 15min, 30min, 1hour, 4hour)
    #[arg(short, long, default_value = "1min")]
    interval: String,

    /// 시작 날짜 (YYYY-MM-DD)
    #[arg(short = 'f', long)]
    from: Option<String>,

    /// 종료 날짜 (YYYY-MM-DD)
    #[arg(short, long)]
    to: Option<String>,

    /// 종료 전 백그라운드 갱신 대기 시간 (초)
    #[arg(long, default_value = "10")]
    refresh_wait: u64,
}

impl QueryArgs {
    fn options(&self) -> Result<FetchOptions> {
        FetchOptions::parse(
            &self.kind,
            &self.interval,
            self.from.as_deref(),
            self.to.as_deref(),
            self.refresh_wait,
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;
    init_logging(LogConfig::from(&config.logging))?;

    debug!(config = %cli.config, "Configuration loaded");

    match cli.command {
        Commands::Get { symbol, query } => {
            let options = query.options()?;
            let service = build_service(&config).await?;

            let result = run_get(&service, &symbol, &options).await?;
            print_json(&result)?;

            debug!(metrics = ?service.metrics(), "Cache metrics");
        }

        Commands::Batch { symbols, query } => {
            let options = query.options()?;
            let symbols = split_symbols(&symbols);
            let service = build_service(&config).await?;

            let outcome = run_batch(&service, &symbols, &options).await?;
            info!(
                results = outcome.results.len(),
                errors = outcome.errors.len(),
                "Batch completed"
            );
            print_json(&outcome)?;

            debug!(metrics = ?service.metrics(), "Cache metrics");
        }

        Commands::Health => {
            let report = check_health(&config).await;
            print_json(&report)?;

            if !report.healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
