/// 日志工具模块
///
/// 初始化 tracing 订阅者，并提供启动/统计信息的输出函数。
/// 日志写到 stderr，stdout 只留给渲染结果。
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::orchestrator::ReadStats;
use crate::workflow::BuildReport;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则 verbose 时为 debug，默认 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!(
        "🕒 {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 打印构建统计
pub fn print_build_stats(report: &BuildReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 构建完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已创建页面: {}", report.created.len());
    info!("❌ 失败: {}", report.failures.len());
    for failure in &report.failures {
        warn!("  - {}", failure);
    }
    info!("{}", "=".repeat(60));
}

/// 打印读取统计
pub fn print_read_stats(stats: &ReadStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 读取完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 页面: {}", stats.pages);
    info!("📝 输出行数: {}", stats.lines);
    info!("❌ 失败子树: {}", stats.failures);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
