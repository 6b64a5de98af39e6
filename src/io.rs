use crate::scheduler::Conflict;
use csv::WriterBuilder;
use std::path::Path;

/// Rapport CSV des conflits: header `conducteur,service,other,kind,semaine,total_minutes`
pub fn export_conflicts_csv<P: AsRef<Path>>(path: P, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["conducteur", "service", "other", "kind", "semaine", "total_minutes"])?;
    for c in conflicts {
        let semaine = c.semaine.map(|d| d.to_string()).unwrap_or_default();
        let total = c.total_minutes.map(|t| t.to_string()).unwrap_or_default();
        w.write_record([
            c.conducteur.as_str(),
            c.service.as_str(),
            c.other.as_ref().map_or("", |o| o.as_str()),
            c.kind.as_str(),
            semaine.as_str(),
            total.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
