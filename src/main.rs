use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablescope::{AppConfig, DatabaseId, LogLevel, TablesParams, TablesState};

#[derive(Parser)]
#[command(
    name = "tablescope",
    version,
    about = "查询数据库的 schema 与表元数据"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径（默认 ~/.tablescope/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 服务端地址，覆盖配置文件
    #[arg(long, env = "TABLESCOPE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Bearer Token，覆盖配置文件
    #[arg(long, env = "TABLESCOPE_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// 日志级别：trace/debug/info/warn/error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出数据库中某个 schema 的表
    Tables {
        /// 数据库 id
        #[arg(long)]
        db: String,

        /// schema 名称
        #[arg(long)]
        schema: String,

        /// 要求服务端跳过缓存
        #[arg(long)]
        force: bool,
    },

    /// 列出数据库的 schema
    Schemas {
        /// 数据库 id
        #[arg(long)]
        db: String,

        /// 要求服务端跳过缓存
        #[arg(long)]
        force: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(&AppConfig::default_path()?)?,
    };

    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(token) = &cli.token {
        config.server.access_token = Some(token.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log.level = LogLevel::parse(level)?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tablescope::init_logger(&config.log)?;

    let fetcher = tablescope::connect(&config).context("创建查询服务失败")?;

    match cli.command {
        Commands::Tables { db, schema, force } => {
            let params = TablesParams::new(db, schema);
            let query = fetcher.query(params.clone());
            let state = if force {
                query.refetch_state().await?
            } else {
                query.state().await?
            };

            match state {
                TablesState::Resolved(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                TablesState::Skipped => {
                    tracing::warn!(
                        db_id = %params.db_id,
                        schema = %params.schema,
                        "schema 不存在或已废弃"
                    );
                    println!("null");
                }
                TablesState::Disabled => anyhow::bail!("数据库 id 和 schema 不能为空"),
            }
        }
        Commands::Schemas { db, force } => {
            let db_id = DatabaseId::from(db);
            let schemas = if force {
                fetcher.schemas().refetch(&db_id).await?
            } else {
                fetcher.schemas().fetch(&db_id).await?
            };
            let schemas = schemas.context("数据库 id 不能为空")?;
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }

    Ok(())
}
