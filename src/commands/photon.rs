use anyhow::Result;
use colored::Colorize;

use super::client;

pub fn list(public: bool) -> Result<()> {
    let photons = client()?.photon().list_all(public)?;
    if photons.is_empty() {
        println!("No photons found.");
    }
    for photon in photons {
        println!("{} {} {}", photon.name.bold(), photon.id, photon.model.dimmed());
    }
    Ok(())
}

pub fn list_local() -> Result<()> {
    let photons = lepton::photon::LocalPhotonDb::open_default()?.list()?;
    if photons.is_empty() {
        println!("No local photons found.");
    }
    for photon in photons {
        println!(
            "{} {} {}",
            photon.name.bold(),
            photon.id,
            photon.path.display().to_string().dimmed()
        );
    }
    Ok(())
}

pub fn remove(target: &str, local: bool, all: bool) -> Result<()> {
    if local {
        let removed = lepton::photon::LocalPhotonDb::open_default()?.remove(target, all)?;
        if removed.is_empty() {
            println!("No local photon named {target}");
        }
        for photon in removed {
            println!("Removed {} ({})", photon.name, photon.path.display());
        }
        return Ok(());
    }
    client()?.photon().delete(target, false)?;
    println!("Photon {} deleted", target.green());
    Ok(())
}
