use anyhow::Result;
use colored::Colorize;
use lepton::WorkspaceRecord;

pub fn list() -> Result<()> {
    let record = WorkspaceRecord::global()?;
    let current = record.current_workspace_id();
    let workspaces = record.workspaces();
    if workspaces.is_empty() {
        println!("No workspaces recorded. Run 'lep login' first.");
        return Ok(());
    }
    for info in workspaces {
        let marker = if current.as_deref() == Some(info.id.as_str()) {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        let name = info.display_name.as_deref().unwrap_or("");
        println!("{marker} {} {name} {}", info.id.bold(), info.url.dimmed());
    }
    Ok(())
}

pub fn current() -> Result<()> {
    let record = WorkspaceRecord::global()?;
    match record.current() {
        Some(info) => {
            println!("id:   {}", info.id);
            if let Some(name) = &info.display_name {
                println!("name: {name}");
            }
            println!("url:  {}", info.url);
            if let Some(expires_at) = info.token_expires_at {
                let when = chrono::DateTime::from_timestamp(expires_at, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| expires_at.to_string());
                println!("token expires: {when}");
            }
            if let Some(dashboard) = record.get_dashboard_base_url(None) {
                println!("dashboard: {dashboard}");
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn remove(workspace_id: &str) -> Result<()> {
    WorkspaceRecord::global()?.remove(workspace_id)?;
    println!("Removed {workspace_id} from the local record");
    Ok(())
}
