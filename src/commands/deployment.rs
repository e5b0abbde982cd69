use anyhow::{bail, Result};
use colored::Colorize;

use super::{client, label};

pub fn list() -> Result<()> {
    let deployments = client()?.deployment().list_all()?;
    for deployment in deployments.iter().filter(|d| !d.is_pod()) {
        let state = deployment
            .status
            .as_ref()
            .map(|s| s.state.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        println!("{} {state}", label(deployment.metadata.as_ref()).bold());
    }
    Ok(())
}

pub fn status(id: &str) -> Result<()> {
    let client = client()?;
    let api = client.deployment();
    let deployment = api.get(id)?;
    println!("{}", label(deployment.metadata.as_ref()).bold());
    if let Some(status) = &deployment.status {
        println!("  state: {}", status.state);
        if let Some(endpoint) = &status.endpoint {
            if !endpoint.external_endpoint.is_empty() {
                println!("  endpoint: {}", endpoint.external_endpoint);
            }
        }
    }

    let replicas = api.get_replicas(id)?;
    println!("  replicas: {}", replicas.len());
    for (replica, issues) in api.get_readiness(id)? {
        for issue in issues {
            println!("  {} {}: {}", replica.yellow(), issue.reason, issue.message);
        }
    }
    Ok(())
}

pub fn log(id: &str, replica: Option<&str>) -> Result<()> {
    let client = client()?;
    let api = client.deployment();
    let replica = match replica {
        Some(replica) => replica.to_string(),
        None => {
            let replicas = api.get_replicas(id)?;
            match replicas.as_slice() {
                [only] => only.metadata.id.clone().unwrap_or_default(),
                [] => bail!("Deployment {id} has no replicas"),
                _ => bail!(
                    "Deployment {id} has {} replicas, pick one with --replica",
                    replicas.len()
                ),
            }
        }
    };
    for line in api.get_log(id, replica.as_str(), None)? {
        println!("{line}");
    }
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    client()?.deployment().delete(id)?;
    println!("Deployment {} deleted", id.green());
    Ok(())
}

pub fn restart(id: &str) -> Result<()> {
    client()?.deployment().restart(id)?;
    println!("Deployment {} restarted", id.green());
    Ok(())
}
