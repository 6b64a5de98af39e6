//! Rafraîchissements périodiques (minuterie + re-fetch), démarrés au montage d'un
//! écran et arrêtés à son démontage.
//!
//! Intervalle fixe, sans backoff ni gigue. Chaque exécution est lancée dans sa
//! propre tâche : une requête lente n'empêche pas la suivante de partir.

use crate::horloge;
use chrono::Local;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct Poller {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Poller {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Exécute `task` immédiatement puis toutes les `period`.
    pub fn every<F, Fut>(&mut self, name: &'static str, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        info!(name, period_ms = period.as_millis() as u64, "polling started");
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                debug!(name, "poll");
                lancer(name, task());
            }
        });
        self.tasks.push((name, handle));
    }

    /// Exécute `task` à chaque minuit local.
    pub fn daily_at_midnight<F, Fut>(&mut self, name: &'static str, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        info!(name, "midnight refresh scheduled");
        let handle = tokio::spawn(async move {
            loop {
                let wait = horloge::duree_jusqu_a_minuit(Local::now().naive_local())
                    .to_std()
                    .unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(wait).await;
                debug!(name, "midnight refresh");
                lancer(name, task());
            }
        });
        self.tasks.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Démontage : annule toutes les minuteries. Les requêtes déjà parties vont à leur terme.
    pub fn stop(&mut self) {
        for (name, handle) in self.tasks.drain(..) {
            handle.abort();
            debug!(name, "polling stopped");
        }
    }
}

/// Lance une exécution ; une panique est journalisée sans arrêter la minuterie.
fn lancer<Fut>(name: &'static str, run: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(run);
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            if e.is_panic() {
                warn!(name, "poll run panicked");
            }
        }
    });
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
