use anyhow::Result;
use colored::Colorize;
use lepton::api::JobListQuery;
use lepton::types::JobQueryMode;

use super::{client, label};

pub fn list(archived: bool) -> Result<()> {
    let mode = if archived {
        JobQueryMode::AliveAndArchive
    } else {
        JobQueryMode::AliveOnly
    };
    let jobs = client()?.job().list_all(&JobListQuery::mode(mode))?;
    if jobs.is_empty() {
        println!("No jobs found.");
    }
    for job in jobs {
        let state = job.status.as_ref().map(|s| s.state).unwrap_or_default();
        println!("{} {state}", label(job.metadata.as_ref()).bold());
    }
    Ok(())
}
