#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use plannings::{
    filtre::{self, Filtre},
    io,
    model::{ConducteurId, NumeroParc, ServiceId},
    pointage::{NonAssurance, PointageDemande},
    scheduler::Planning,
    session::{Session, SessionStore, Utilisateur},
    storage::{JsonStorage, Storage},
    Config,
};
#[cfg(feature = "remote")]
use plannings::{
    api::{ApiClient, ApiClientParams, MiseAJourService},
    horloge::{self, EtatHorloge},
    pointage::Pointage,
    polling::Poller,
};
#[cfg(feature = "remote")]
use std::sync::Arc;
#[cfg(feature = "remote")]
use tracing::warn;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI des plannings du réseau (affectations, pointage, conflits)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Instantané JSON du réseau (lignes, conducteurs, véhicules)
    #[arg(long, global = true, default_value = "reseau.json")]
    reseau: String,

    /// Fichier de configuration JSON (optionnel)
    #[arg(long, global = true, default_value = "plannings.json")]
    config: String,

    /// Fichier de session
    #[arg(long, global = true, default_value = "session.json")]
    session: String,

    /// Heure locale forcée, `YYYY-MM-DDTHH:MM`
    #[arg(long, global = true)]
    now: Option<String>,

    /// Répercute les modifications sur l'API (après contrôle d'horloge)
    #[cfg(feature = "remote")]
    #[arg(long, global = true)]
    remote: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Services du jour, groupés par ligne
    Services {
        /// YYYY-MM-DD (défaut : aujourd'hui)
        #[arg(long)]
        date: Option<String>,
        /// Contrainte de ligne (répétable, OU logique)
        #[arg(long = "contrainte")]
        contraintes: Vec<String>,
    },

    /// Services de la semaine ISO
    Semaine {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        conducteur: Option<String>,
    },

    /// Vérifier qu'un conducteur peut prendre un service
    Check {
        #[arg(long)]
        service: String,
        #[arg(long)]
        conducteur: String,
    },

    /// Relever les conflits des affectations existantes
    Conflits {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Affecter un conducteur
    Assigner {
        #[arg(long)]
        service: String,
        #[arg(long)]
        conducteur: String,
    },

    /// Retirer le conducteur d'un service
    Desassigner {
        #[arg(long)]
        service: String,
    },

    /// Affecter un véhicule (numéro de parc)
    Vehicule {
        #[arg(long)]
        service: String,
        #[arg(long)]
        parc: String,
    },

    /// Déclarer un service non assuré
    NonAssure {
        #[arg(long)]
        service: String,
        #[arg(long)]
        motif: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Pointer la prise de service
    Pointer {
        #[arg(long)]
        service: String,
        #[arg(long)]
        conducteur: Option<String>,
        #[arg(long)]
        vehicle_type: Option<String>,
        /// Permis contrôlé
        #[arg(long)]
        permis: bool,
        /// Chronotachygraphe contrôlé
        #[arg(long)]
        chrono: bool,
    },

    /// Supprimer un service
    Supprimer {
        #[arg(long)]
        service: String,
    },

    /// Ouvrir une session
    Login {
        #[arg(long)]
        id: String,
        #[arg(long)]
        nom: String,
        #[arg(long)]
        prenom: String,
        #[arg(long)]
        role: Option<String>,
    },

    /// Fermer la session
    Logout,

    /// Télécharger l'instantané du réseau depuis l'API
    #[cfg(feature = "remote")]
    Fetch,

    /// Contrôler la dérive d'horloge avec le serveur
    #[cfg(feature = "remote")]
    Horloge,

    /// Rafraîchir périodiquement les services et l'horloge (Ctrl-C pour quitter)
    #[cfg(feature = "remote")]
    Surveiller {
        #[arg(long = "contrainte")]
        contraintes: Vec<String>,
    },
}

/// Modification à répercuter sur l'API.
#[cfg(feature = "remote")]
enum Envoi {
    MiseAJour(ServiceId, MiseAJourService),
    Suppression(ServiceId),
    Pointage(Pointage),
    NonAssure(ServiceId, NonAssurance),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = Config::load_or_default(&cli.config)?;
    let storage = JsonStorage::open(&cli.reseau)?;
    let sessions = SessionStore::open(&cli.session);
    let now = maintenant(cli.now.as_deref())?;

    let load_planning = || -> Result<Planning> {
        let reseau = storage
            .load()
            .with_context(|| format!("no network snapshot at {}", cli.reseau))?;
        Ok(Planning::with_options(reseau, config.assign_options()))
    };

    #[cfg(feature = "remote")]
    let remote = cli.remote;
    #[cfg(not(feature = "remote"))]
    let remote = false;

    let code = match cli.cmd {
        Commands::Services { date, contraintes } => {
            let planning = load_planning()?;
            let date = parse_date(date.as_deref(), now)?;
            let filtre = Filtre::jour(date).with_contraintes(contraintes);
            let groupes = filtre::grouper_par_ligne(filtre::services_visibles(
                planning.reseau(),
                &filtre,
            ));
            if groupes.is_empty() {
                println!("Aucun service le {date}");
            } else {
                print!("{}", filtre::render_groupes(&groupes, now));
            }
            0
        }
        Commands::Semaine { date, conducteur } => {
            let planning = load_planning()?;
            let date = parse_date(date.as_deref(), now)?;
            let conducteur = conducteur.map(ConducteurId::new);
            let vues = filtre::services_semaine(planning.reseau(), date, conducteur.as_ref());
            let mut total = 0i64;
            for v in &vues {
                total += v.service.duree_minutes();
                println!(
                    "{} {}-{} ligne {} | {} | {}",
                    v.service.date,
                    v.service.heure_debut,
                    v.service.heure_fin,
                    v.ligne.numero,
                    v.service.id,
                    v.service
                        .conducteur_id
                        .as_ref()
                        .map_or("-", |c| c.as_str())
                );
            }
            println!("Total: {}h{:02}", total / 60, total % 60);
            0
        }
        Commands::Check {
            service,
            conducteur,
        } => {
            let planning = load_planning()?;
            match planning.check_assignment(&ServiceId::new(service), &ConducteurId::new(conducteur))
            {
                Ok(()) => {
                    println!("OK: assignable");
                    0
                }
                Err(conflict) => {
                    println!(
                        "REFUSED: {}{}",
                        conflict.kind.as_str(),
                        conflict
                            .other
                            .as_ref()
                            .map(|o| format!(" (with service {o})"))
                            .unwrap_or_default()
                    );
                    2
                }
            }
        }
        Commands::Conflits { report } => {
            let planning = load_planning()?;
            let conflicts = planning.detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    println!(
                        "{} | {} | {} | {}",
                        c.conducteur,
                        c.service,
                        c.other.as_ref().map_or("-", |o| o.as_str()),
                        c.kind.as_str()
                    );
                }
                if let Some(path) = report {
                    io::export_conflicts_csv(path, &conflicts)?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Assigner {
            service,
            conducteur,
        } => {
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let sid = ServiceId::new(service);
            let cid = ConducteurId::new(conducteur);
            planning.assigner_conducteur(&sid, &cid)?;
            #[cfg(feature = "remote")]
            if remote {
                envoyer(
                    &config,
                    Envoi::MiseAJour(sid, MiseAJourService::Conducteur(Some(cid))),
                )?;
            }
            storage.save(planning.reseau())?;
            0
        }
        Commands::Desassigner { service } => {
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let sid = ServiceId::new(service);
            planning.desassigner_conducteur(&sid)?;
            #[cfg(feature = "remote")]
            if remote {
                envoyer(&config, Envoi::MiseAJour(sid, MiseAJourService::Conducteur(None)))?;
            }
            storage.save(planning.reseau())?;
            0
        }
        Commands::Vehicule { service, parc } => {
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let sid = ServiceId::new(service);
            let parc = NumeroParc::new(parc);
            planning.assigner_vehicule(&sid, &parc)?;
            #[cfg(feature = "remote")]
            if remote {
                envoyer(
                    &config,
                    Envoi::MiseAJour(sid, MiseAJourService::Vehicule(Some(parc))),
                )?;
            }
            storage.save(planning.reseau())?;
            0
        }
        Commands::NonAssure {
            service,
            motif,
            notes,
        } => {
            let session = session_ouverte(&sessions)?;
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let sid = ServiceId::new(service);
            let motif = NonAssurance {
                motif,
                notes,
                marked_by: session.signature(),
            };
            planning.marquer_non_assure(&sid, motif.clone())?;
            #[cfg(feature = "remote")]
            if remote {
                envoyer(&config, Envoi::NonAssure(sid, motif))?;
            }
            #[cfg(not(feature = "remote"))]
            let _ = motif;
            storage.save(planning.reseau())?;
            0
        }
        Commands::Pointer {
            service,
            conducteur,
            vehicle_type,
            permis,
            chrono,
        } => {
            let session = session_ouverte(&sessions)?;
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let demande = PointageDemande {
                conducteur_id: conducteur.map(ConducteurId::new),
                vehicle_type,
                permis_checked: permis,
                chronometer_checked: chrono,
            };
            let pointage =
                planning.pointer(&ServiceId::new(service), demande, &session.signature(), now)?;
            if pointage.is_late {
                println!(
                    "Pointé avec {} min de retard ({})",
                    pointage.late_minutes, pointage.service_id
                );
            } else {
                println!("Pointé à l'heure ({})", pointage.service_id);
            }
            #[cfg(feature = "remote")]
            if remote {
                envoyer(&config, Envoi::Pointage(pointage))?;
            }
            storage.save(planning.reseau())?;
            0
        }
        Commands::Supprimer { service } => {
            let mut planning = load_planning()?;
            synchroniser_horloge(&mut planning, &config, remote)?;
            let sid = ServiceId::new(service);
            planning.supprimer_service(&sid)?;
            #[cfg(feature = "remote")]
            if remote {
                envoyer(&config, Envoi::Suppression(sid))?;
            }
            storage.save(planning.reseau())?;
            0
        }
        Commands::Login {
            id,
            nom,
            prenom,
            role,
        } => {
            let session = Session::ouvrir(
                Utilisateur {
                    id,
                    nom,
                    prenom,
                    role,
                },
                Utc::now(),
            );
            sessions.save(&session)?;
            println!("Session ouverte pour {}", session.signature());
            0
        }
        Commands::Logout => {
            sessions.clear()?;
            0
        }
        #[cfg(feature = "remote")]
        Commands::Fetch => {
            let client = client(&config);
            let reseau = runtime()?.block_on(client.fetch_reseau())?;
            storage.save(&reseau)?;
            println!(
                "{} ligne(s), {} service(s), {} conducteur(s)",
                reseau.lignes.len(),
                reseau.services().len(),
                reseau.conducteurs.len()
            );
            0
        }
        #[cfg(feature = "remote")]
        Commands::Horloge => {
            let client = client(&config);
            let server = runtime()?.block_on(client.server_time())?;
            match horloge::verifier_derive(server, Utc::now(), config.derive_max()) {
                EtatHorloge::Synchronise => {
                    println!("OK: clock in sync with server");
                    0
                }
                EtatHorloge::Degrade { ecart_secondes } => {
                    println!("DEGRADED: clock drift of {ecart_secondes}s, mutations disabled");
                    2
                }
            }
        }
        #[cfg(feature = "remote")]
        Commands::Surveiller { contraintes } => {
            runtime()?.block_on(surveiller(&config, &cli.reseau, contraintes))?;
            0
        }
    };

    std::process::exit(code);
}

fn maintenant(raw: Option<&str>) -> Result<NaiveDateTime> {
    match raw {
        None => Ok(Local::now().naive_local()),
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .with_context(|| format!("invalid --now value: {s}")),
    }
}

fn parse_date(raw: Option<&str>, now: NaiveDateTime) -> Result<NaiveDate> {
    match raw {
        None => Ok(now.date()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date (YYYY-MM-DD): {s}")),
    }
}

fn session_ouverte(sessions: &SessionStore) -> Result<Session> {
    match sessions.load()? {
        Some(s) => Ok(s),
        None => bail!("no open session: run `plannings-cli login` first"),
    }
}

#[cfg(feature = "remote")]
fn synchroniser_horloge(planning: &mut Planning, config: &Config, remote: bool) -> Result<()> {
    if !remote {
        return Ok(());
    }
    let server = runtime()?.block_on(client(config).server_time())?;
    let etat = horloge::verifier_derive(server, Utc::now(), config.derive_max());
    if let EtatHorloge::Degrade { ecart_secondes } = etat {
        warn!(ecart_secondes, "clock drift, mutations disabled");
        eprintln!("Mode dégradé : horloge locale désynchronisée du serveur");
    }
    planning.set_horloge(etat);
    Ok(())
}

#[cfg(not(feature = "remote"))]
fn synchroniser_horloge(_planning: &mut Planning, _config: &Config, _remote: bool) -> Result<()> {
    Ok(())
}

#[cfg(feature = "remote")]
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("starting tokio runtime")
}

#[cfg(feature = "remote")]
fn client(config: &Config) -> ApiClient {
    ApiClient::new(ApiClientParams {
        base_url: config.api.base_url.clone(),
        idempotency_keys: config.api.idempotency_keys,
    })
}

#[cfg(feature = "remote")]
fn envoyer(config: &Config, envoi: Envoi) -> Result<()> {
    let client = client(config);
    runtime()?.block_on(async {
        match envoi {
            Envoi::MiseAJour(id, maj) => client.update_service(&id, &maj).await,
            Envoi::Suppression(id) => client.delete_service(&id).await,
            Envoi::Pointage(p) => client.post_pointage(&p).await,
            Envoi::NonAssure(id, motif) => client.mark_non_assure(&id, &motif).await,
        }
    })?;
    Ok(())
}

#[cfg(feature = "remote")]
async fn surveiller(config: &Config, reseau_path: &str, contraintes: Vec<String>) -> Result<()> {
    let client = Arc::new(client(config));
    let mut poller = Poller::new();

    {
        let client = client.clone();
        let path = reseau_path.to_string();
        let contraintes = Arc::new(contraintes);
        poller.every("services", config.polling.services(), move || {
            let client = client.clone();
            let path = path.clone();
            let contraintes = contraintes.clone();
            async move {
                let reseau = match client.fetch_reseau().await {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "services poll failed");
                        eprintln!("Erreur: {e}");
                        return;
                    }
                };
                let now = Local::now().naive_local();
                let filtre = Filtre::jour(now.date()).with_contraintes(contraintes.iter().cloned());
                let groupes =
                    filtre::grouper_par_ligne(filtre::services_visibles(&reseau, &filtre));
                print!("{}", filtre::render_groupes(&groupes, now));
                let saved = JsonStorage::open(&path).and_then(|s| s.save(&reseau));
                if let Err(e) = saved {
                    warn!(error = %format!("{e:#}"), "snapshot save failed");
                    eprintln!("Erreur: {e:#}");
                }
            }
        });
    }

    {
        let client = client.clone();
        let seuil = config.derive_max();
        poller.every("horloge", config.polling.horloge(), move || {
            let client = client.clone();
            async move {
                match client.server_time().await {
                    Ok(server) => {
                        if let EtatHorloge::Degrade { ecart_secondes } =
                            horloge::verifier_derive(server, Utc::now(), seuil)
                        {
                            warn!(ecart_secondes, "clock drift, degraded mode");
                            eprintln!("Mode dégradé : dérive d'horloge de {ecart_secondes}s");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "server time poll failed");
                        eprintln!("Erreur: {e}");
                    }
                }
            }
        });
    }

    {
        let client = client.clone();
        poller.daily_at_midnight("jour", move || {
            let client = client.clone();
            async move {
                match client.today().await {
                    Ok(date) => println!("Nouveau jour d'exploitation : {date}"),
                    Err(e) => {
                        warn!(error = %e, "today poll failed");
                        eprintln!("Erreur: {e}");
                    }
                }
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    poller.stop();
    Ok(())
}
