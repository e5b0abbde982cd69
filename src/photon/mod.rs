//! Photon helpers that live on this machine
//!
//! - [`PhotonModelSpec`] parses the `<schema>:<model>` strings used to
//!   build photons (`hf:gpt2@main`, `py:app.py:Server`, `docker:nginx`).
//! - [`LocalPhotonDb`] indexes photons downloaded into the cache directory.
//!
//! ```ignore
//! let db = LocalPhotonDb::open_default()?;
//! for photon in db.list()? {
//!     println!("{} {}", photon.name, photon.path.display());
//! }
//! ```

mod local;
mod spec;

pub use local::{LocalPhoton, LocalPhotonDb};
pub use spec::PhotonModelSpec;
