use anyhow::Result;
use colored::Colorize;

use super::client;

pub fn list(with_nodes: bool) -> Result<()> {
    let client = client()?;
    let api = client.nodegroup();
    let groups = api.list_all()?;
    if groups.is_empty() {
        println!("No node groups found.");
        return Ok(());
    }

    let nodes = if with_nodes {
        api.batch_fetch_nodes_each(&groups, None)?
    } else {
        Vec::new()
    };

    for (i, group) in groups.iter().enumerate() {
        let name = group.metadata.name.as_deref().unwrap_or("-");
        let id = group.metadata.id.as_deref().unwrap_or("-");
        println!(
            "{} ({id}) ready nodes: {}",
            name.bold(),
            group.status.ready_nodes
        );
        match nodes.get(i) {
            Some(Ok(nodes)) => {
                for node in nodes {
                    let node_id = node.metadata.id.as_deref().unwrap_or("-");
                    let idle = if node.is_idle() { "idle".green() } else { "busy".yellow() };
                    println!("  {node_id} {idle}");
                }
            }
            Some(Err(e)) => println!("  {} {e}", "failed to list nodes:".red()),
            None => {}
        }
    }
    Ok(())
}
