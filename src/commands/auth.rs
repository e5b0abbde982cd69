use anyhow::{bail, Context, Result};
use colored::Colorize;
use lepton::record::LoginParams;
use lepton::resolver::WorkspaceFlavor;
use lepton::WorkspaceRecord;

pub struct LoginArgs {
    pub credentials: Option<String>,
    pub workspace_id: Option<String>,
    pub token: Option<String>,
    pub url: Option<String>,
    pub classic: bool,
}

pub fn login(args: LoginArgs) -> Result<()> {
    let record = WorkspaceRecord::global()?;

    let (mut workspace_id, mut token) = (args.workspace_id, args.token);
    if let Some(credentials) = args.credentials {
        let (id, tok) = credentials
            .split_once(':')
            .context("Credentials must look like <workspace_id>:<token>")?;
        workspace_id = Some(id.to_string());
        token = Some(tok.to_string());
    }

    let workspace_id = match workspace_id {
        Some(id) => id,
        None => {
            let env = lepton::config::EnvConfig::from_env();
            if env.workspace_id.is_some() {
                record.login_with(&env)?;
                return report_login(record);
            }
            match record.current_workspace_id() {
                Some(id) => id,
                None => bail!("No workspace given. Use 'lep login -c <workspace_id>:<token>'."),
            }
        }
    };

    if token.is_none() {
        token = record.get(&workspace_id).and_then(|info| info.auth_token);
    }
    if token.is_none() {
        token = prompt_token()?;
    }

    let mut params = LoginParams::new(&workspace_id).could_be_new_token(true);
    if let Some(token) = token {
        params = params.token(token);
    }
    if let Some(url) = args.url {
        params = params.url(url);
    }
    if args.classic {
        params = params.flavor(WorkspaceFlavor::Classic);
    }
    record.set_or_exit(params)?;
    report_login(record)
}

fn report_login(record: &WorkspaceRecord) -> Result<()> {
    let client = record.client(None)?;
    let info = client
        .info()
        .with_context(|| format!("Could not reach workspace {}", client.get_workspace_id()))?;
    let name = info
        .workspace_name
        .or_else(|| client.get_workspace_name().map(str::to_string))
        .unwrap_or_else(|| client.get_workspace_id().to_string());
    println!("{} {}", "Logged in to your workspace".green(), name.bold());
    if let Some(dashboard) = client.get_dashboard_base_url() {
        println!("  dashboard: {dashboard}");
    }
    Ok(())
}

/// Masked token prompt, only when a human is at the terminal.
fn prompt_token() -> Result<Option<String>> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let term = console::Term::stderr();
    term.write_str("Token: ")?;
    let token = term.read_secure_line()?;
    Ok(Some(token.trim().to_string()).filter(|t| !t.is_empty()))
}

pub fn logout(purge: bool) -> Result<()> {
    let record = WorkspaceRecord::global()?;
    let id = record.current_workspace_id();
    record.logout(purge)?;
    match (id, purge) {
        (Some(id), true) => println!("Logged out of {id} and removed it from the local record"),
        (Some(id), false) => println!("Logged out of {id}"),
        (None, _) => println!("Logged out"),
    }
    Ok(())
}
