use std::io::Write;

use anyhow::Result;

use super::client;

pub fn get(namespace: &str, key: &str) -> Result<()> {
    let value = client()?.kv().get(namespace, key)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

pub fn put(namespace: &str, key: &str, value: &str) -> Result<()> {
    client()?.kv().put(namespace, key, value)?;
    println!("Set {namespace}/{key}");
    Ok(())
}
