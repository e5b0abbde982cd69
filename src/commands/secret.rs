use anyhow::Result;

use super::client;

pub fn list() -> Result<()> {
    let names = client()?.secret().list_all()?;
    if names.is_empty() {
        println!("No secrets found.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
