// Terminal UI utilities
// Record and refresh-report renderers sit below the generic helpers.

use colored::Colorize;

use crate::domain::TrackedRepository;
use crate::services::RefreshReport;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

pub fn print_repository(repo: &TrackedRepository) {
    let marker = if repo.seen {
        "seen".dimmed()
    } else {
        "new".bright_green().bold()
    };
    println!(
        "   {:<40} {:<20} {}  [{}]",
        repo.name,
        repo.release_title,
        repo.published_at.to_rfc3339(),
        marker
    );
}

pub fn print_refresh_report(report: &RefreshReport) {
    if report.updated.is_empty() {
        print_info("No repositories advanced");
    } else {
        print_success(&format!("{} repositories advanced", report.updated.len()));
        for repo in &report.updated {
            print_repository(repo);
        }
    }

    for failure in &report.failed {
        print_warning(&format!(
            "{} skipped ({}): {}",
            failure.name,
            failure.error.as_str(),
            failure.message
        ));
    }
}
