//! Console output helpers

use crate::simulator::SimulationReport;

/// ANSI color codes for terminal output
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_GREEN: &str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
}

/// Print status line with icon and color
pub fn print_status(icon: &str, message: &str, status: StatusType) {
    let color = match status {
        StatusType::Success => colors::BRIGHT_GREEN,
        StatusType::Info => colors::BRIGHT_CYAN,
        StatusType::Warning => colors::BRIGHT_YELLOW,
        StatusType::Error => colors::BRIGHT_RED,
    };
    eprintln!("{}[{}]{} {} {}", color, icon, colors::RESET, color, message);
}

/// Status types for colored output
#[derive(Debug, Clone, Copy)]
pub enum StatusType {
    Success,
    Info,
    Warning,
    Error,
}

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET);
    println!("{}  {}{}{}", colors::BRIGHT_CYAN, colors::BOLD, title, colors::RESET);
    println!("{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET);
    println!();
}

/// Print key-value pair in a formatted way
pub fn print_kv(key: &str, value: &str) {
    println!("  {}{}:{} {}{}{}", colors::BRIGHT_WHITE, key, colors::RESET, colors::BRIGHT_CYAN, value, colors::RESET);
}

/// Format a base unit amount as coins with eight decimals
pub fn format_coins(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let amount = amount.unsigned_abs();
    format!("{}{}.{:08}", sign, amount / 100_000_000, amount % 100_000_000)
}

/// Print a simulation report
pub fn print_report(report: &SimulationReport) {
    print_section("Simulation");
    print_kv("Height", &report.height.to_string());
    print_kv("Tip", &report.tip);
    print_kv("PoW blocks", &report.pow_blocks.to_string());
    print_kv("Bee blocks", &report.bee_blocks.to_string());
    print_kv("Missed bee searches", &report.missed_bee_searches.to_string());

    print_section("Bee Population");
    print_kv("Immature bees", &format!("{} in {} BCTs", report.hive.immature_bees, report.hive.immature_bcts));
    print_kv("Mature bees", &format!("{} in {} BCTs", report.hive.mature_bees, report.hive.mature_bcts));
    print_kv("Potential lifespan rewards", &format_coins(report.hive.potential_lifespan_rewards));
    if let Some(graph) = &report.hive.graph {
        for point in graph.iter().filter(|p| p.immature > 0 || p.mature > 0).step_by(10) {
            print_kv(&format!("  height {}", point.height), &format!("{} immature, {} mature", point.immature, point.mature));
        }
    }
}
