use anyhow::Result;
use colored::Colorize;
use lepton::types::FileType;

use super::client;

pub fn ls(path: &str) -> Result<()> {
    let entries = client()?.storage().get_dir(path)?;
    for entry in entries {
        match entry.kind {
            FileType::Dir => println!("{}/", entry.name.blue().bold()),
            _ => println!("{} {}", entry.name, entry.size.unwrap_or(0)),
        }
    }
    Ok(())
}
