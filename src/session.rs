use crate::storage;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Utilisateur connecté (régulateur, chef de dépôt…).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilisateur {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Session injectée dans les composants qui signent des actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub utilisateur: Utilisateur,
    pub ouverte_le: DateTime<Utc>,
}

impl Session {
    pub fn ouvrir(utilisateur: Utilisateur, now: DateTime<Utc>) -> Self {
        Self {
            utilisateur,
            ouverte_le: now,
        }
    }

    /// Valeur des champs `validatedBy` / `markedBy`.
    pub fn signature(&self) -> String {
        format!("{} {}", self.utilisateur.prenom, self.utilisateur.nom)
    }
}

/// Fichier de session (remplace le stockage navigateur).
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `None` si aucune session n'est ouverte.
    pub fn load(&self) -> anyhow::Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let session = serde_json::from_slice(&data).context("parsing session")?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        storage::ecrire_atomique(&self.path, &serde_json::to_vec_pretty(session)?)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }
}
