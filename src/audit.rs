use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Write an entry to the audit log
pub fn log(entry: &str) -> Result<()> {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
    let log_dir = config_dir.join("campusguide");
    std::fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("audit.log");

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        entry
    )?;
    Ok(())
}

/// Log an operator mutation with who did it and what changed
pub fn log_operator_action(operator: &str, action: &str) -> Result<()> {
    log(&format!("OPERATOR {}: {}", operator, action))
}
