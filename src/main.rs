use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use notion_course_tree::models::{builtin_course, load_hierarchy, Hierarchy};
use notion_course_tree::testing::InMemoryService;
use notion_course_tree::utils::logging;
use notion_course_tree::workflow::walk_collect;
use notion_course_tree::{CollectionReader, Config, CourseWriter, NotionClient, ReadMode};

#[derive(Parser, Debug)]
#[command(name = "notion-course-tree")]
#[command(about = "Build and read course page hierarchies in Notion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the course hierarchy under the root page
    Build {
        /// Parent page id or URL (defaults to the built-in root page)
        #[arg(long)]
        parent: Option<String>,

        /// TOML file describing the hierarchy (defaults to the built-in course)
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Build against an in-memory service and print the resulting tree
        #[arg(long)]
        dry_run: bool,
    },
    /// Walk every page of the collection and print all blocks
    Read,
    /// Print a section-aware outline of every course page in the collection
    Outline,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Build {
            parent,
            spec,
            dry_run,
        } => build(&config, parent.as_deref(), spec, dry_run).await,
        Command::Read => read(&config, ReadMode::Blocks).await,
        Command::Outline => read(&config, ReadMode::Outline).await,
    }
}

async fn build(
    config: &Config,
    parent: Option<&str>,
    spec: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    logging::log_startup(if dry_run { "build (dry run)" } else { "build" });

    let root = config.root_page_id(parent)?;
    let hierarchy: Hierarchy = match spec {
        Some(path) => load_hierarchy(&path)
            .await
            .with_context(|| format!("无法加载层级描述: {}", path.display()))?,
        None => builtin_course()?,
    };
    info!(
        "📋 根页面 {}，共 {} 个页面待创建",
        root,
        hierarchy.page_count()
    );

    if dry_run {
        let service = InMemoryService::new();
        let report = CourseWriter::new(&service).run(&root, &hierarchy).await;
        logging::print_build_stats(&report);

        let tree = walk_collect(&service, root.as_block_id()).await;
        let mut stdout = std::io::stdout().lock();
        for line in tree.lines() {
            writeln!(stdout, "{}", line)?;
        }
        return Ok(());
    }

    let client = NotionClient::new(config)?;
    let report = CourseWriter::new(&client).run(&root, &hierarchy).await;
    logging::print_build_stats(&report);
    Ok(())
}

async fn read(config: &Config, mode: ReadMode) -> Result<()> {
    logging::log_startup(match mode {
        ReadMode::Blocks => "read",
        ReadMode::Outline => "outline",
    });

    let client = NotionClient::new(config)?;
    let database_id = config.require_database_id()?;

    let mut stdout = std::io::stdout().lock();
    let stats = CollectionReader::new(&client)
        .run(&database_id, mode, &mut stdout)
        .await?;
    logging::print_read_stats(&stats);
    Ok(())
}
