use anyhow::Result;
use colored::Colorize;

use super::{client, label};

pub fn list() -> Result<()> {
    let pods = client()?.pod().list_all()?;
    if pods.is_empty() {
        println!("No pods found.");
    }
    for pod in pods {
        let state = pod.status.as_ref().map(|s| s.state).unwrap_or_default();
        println!("{} {state}", label(pod.metadata.as_ref()).bold());
    }
    Ok(())
}
