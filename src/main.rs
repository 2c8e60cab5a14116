// ==========================================
// 积载计划系统 - 命令行入口
// ==========================================
// 用法:
//   freight-loading-planner [db_path] [demand.csv] [--save]
//
// 读取需求 CSV，按库中登记的容器/卡车计算积载计划，
// 以 JSON 输出 PlanReport（stdout）；日志输出到 stderr。
// ==========================================

use anyhow::{bail, Context, Result};
use freight_loading_planner::api::TransportApi;
use freight_loading_planner::db::get_default_db_path;
use freight_loading_planner::i18n::{t, t_with_args};
use freight_loading_planner::logging;
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let mut save = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--save" => save = true,
            "-h" | "--help" => {
                eprintln!("{}", t("cli.usage"));
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let db_path = positional
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    let Some(csv_path) = positional.next().map(PathBuf::from) else {
        eprintln!("{}", t("cli.usage"));
        bail!("missing demand csv path");
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", freight_loading_planner::APP_NAME, freight_loading_planner::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let api = TransportApi::new(&db_path).context("failed to open planner database")?;
    api.apply_configured_locale()?;

    let outcome = api
        .plan_from_csv(&csv_path, save)
        .with_context(|| format!("failed to plan from {}", csv_path.display()))?;

    for rejected in &outcome.rejected {
        let row = rejected.row().map(|r| r.to_string()).unwrap_or_default();
        eprintln!(
            "{}",
            t_with_args(
                "cli.rejected_row",
                &[("row", row.as_str()), ("reason", rejected.to_string().as_str())]
            )
        );
    }

    println!("{}", outcome.report.to_json_pretty()?);
    Ok(())
}
