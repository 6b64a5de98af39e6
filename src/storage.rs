use crate::model::Reseau;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Dernier instantané du réseau.
    fn load(&self) -> anyhow::Result<Reseau>;
    fn save(&self, reseau: &Reseau) -> anyhow::Result<()>;
}

/// Instantané JSON (forme de `GET /api/lignes` + conducteurs + véhicules), pour
/// travailler hors-ligne sur le dernier état récupéré.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Reseau> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, reseau: &Reseau) -> anyhow::Result<()> {
        ecrire_atomique(&self.path, &serde_json::to_vec_pretty(reseau)?)
    }
}

/// Écrit `bytes` dans un fichier temporaire voisin puis le renomme sur `path`.
pub(crate) fn ecrire_atomique(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).context("creating temp file")?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("atomic rename to {}", path.display()))?;
    Ok(())
}
