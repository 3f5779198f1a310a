//! Loading and saving the tournament state file.
//!
//! The whole [`Tournament`] is stored as one JSON document. Saving writes a sibling temporary
//! file first and renames it over the state file, so a crash never leaves a half written state.
use std::io;
use std::path::{Path, PathBuf};

use knockout_core::Tournament;
use tokio::fs;

use crate::Error;

/// Loads the tournament from `path`. If the file does not exist a new empty tournament with
/// the given `capacity` is created.
pub async fn load<P>(path: P, capacity: usize) -> Result<Tournament, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let buf = match fs::read(path).await {
        Ok(buf) => buf,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!(
                "No state at {}, creating a new tournament for {} participants",
                path.display(),
                capacity
            );

            return Ok(Tournament::new(capacity)?);
        }
        Err(err) => return Err(err.into()),
    };

    let tournament: Tournament = serde_json::from_slice(&buf)?;

    if tournament.capacity() != capacity {
        log::warn!(
            "Stored tournament has capacity {}, ignoring configured capacity {}",
            tournament.capacity(),
            capacity
        );
    }

    Ok(tournament)
}

pub async fn save<P>(path: P, tournament: &Tournament) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let buf = serde_json::to_vec_pretty(tournament)?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &buf).await?;
    fs::rename(&tmp, path).await?;

    log::debug!("Saved tournament to {} ({} bytes)", path.display(), buf.len());

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
