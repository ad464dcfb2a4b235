//! Robot registry listing and configuration dump

use anyhow::Result;

use crate::config::Config;
use crate::utils::{report_row, report_table};

pub fn execute(config: &Config, paths_only: bool) -> Result<()> {
    if paths_only {
        for name in config.robots.keys() {
            if let Some(path) = config.robot_xml(name) {
                println!("{}", path.display());
            }
        }
        return Ok(());
    }

    let mut table = report_table(&["Robot", "Description", "Installed"]);
    for name in config.robots.keys() {
        let Some(path) = config.robot_xml(name) else {
            continue;
        };
        let installed = if path.is_file() { "yes" } else { "no" };
        report_row(&mut table, [name.clone(), path.display().to_string(), installed.to_string()]);
    }
    table.printstd();
    println!("{} robots registered", config.robots.len());
    Ok(())
}

pub fn print_config(config: &Config) -> Result<()> {
    print!("{}", serde_yaml_ng::to_string(config)?);
    Ok(())
}
