//! The ETL run: fetch, create schema, and load each entity kind, then write
//! the summary row and commit once.

use std::fmt;
use tracing::{info, warn};

use crate::entity::{EntityCounts, EntityKind};
use crate::error::Result;
use crate::graphql::Source;
use crate::schema::ALL_VITRINE;
use crate::ui::{EntityStatus, Phase, Ui};
use crate::writer::{SchemaStatus, SqliteWriter};

/// What to do when a bulk load fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Record the failure, keep going, commit what succeeded
    #[default]
    Continue,
    /// Stop the run; nothing is committed
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct EntityReport {
    pub kind: EntityKind,
    pub fetched: usize,
    pub schema: SchemaStatus,
    pub outcome: LoadOutcome,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub entities: Vec<EntityReport>,
    pub summary_schema: SchemaStatus,
    /// Id of the inserted `all_vitrine` row
    pub summary_id: i64,
}

impl RunReport {
    /// True when every entity was loaded
    pub fn is_complete(&self) -> bool {
        self.entities
            .iter()
            .all(|e| matches!(e.outcome, LoadOutcome::Loaded(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (EntityKind, &str)> {
        self.entities.iter().filter_map(|e| match &e.outcome {
            LoadOutcome::Failed(msg) => Some((e.kind, msg.as_str())),
            LoadOutcome::Loaded(_) => None,
        })
    }

    /// Fetched row counts, as written to the summary row
    pub fn counts(&self) -> EntityCounts {
        let mut counts = EntityCounts::default();
        for e in &self.entities {
            counts.set(e.kind, e.fetched);
        }
        counts
    }

    pub fn loaded_rows(&self) -> usize {
        self.entities
            .iter()
            .map(|e| match e.outcome {
                LoadOutcome::Loaded(n) => n,
                LoadOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entities {
            let outcome = match &e.outcome {
                LoadOutcome::Loaded(n) => format!("loaded {}", n),
                LoadOutcome::Failed(msg) => format!("FAILED ({})", msg),
            };
            writeln!(
                f,
                "  {:<9} fetched {:>4}, {}, table {}",
                e.kind.as_str(),
                e.fetched,
                outcome,
                e.schema
            )?;
        }
        write!(
            f,
            "  {:<9} row {}, table {}",
            ALL_VITRINE.name, self.summary_id, self.summary_schema
        )
    }
}

/// Run the whole ETL inside one transaction.
///
/// Fetch and schema errors always abort, rolling back everything. Load
/// errors are handled per `policy`.
pub fn run(
    source: &impl Source,
    writer: &mut SqliteWriter,
    policy: FailurePolicy,
    ui: &mut impl Ui,
) -> Result<RunReport> {
    let total_steps = EntityKind::ALL.len() as u64 + 1;
    let mut session = writer.session()?;
    let mut entities = Vec::with_capacity(EntityKind::ALL.len());

    for (step, kind) in EntityKind::ALL.into_iter().enumerate() {
        ui.set_progress(step as u64, total_steps, kind.as_str());

        ui.set_phase(Phase::Fetching);
        let table = source.fetch(kind)?;
        let fetched = table.len();
        ui.set_entity(kind, EntityStatus::Fetched(fetched));

        ui.set_phase(Phase::CreatingSchema);
        let schema = session.ensure_table(kind.schema())?;
        if schema == SchemaStatus::AlreadyExists {
            ui.log(format!("Table {} already exists", kind));
        }

        ui.set_phase(Phase::Loading);
        let outcome = match session.load_rows(kind.schema(), &table) {
            Ok(count) => {
                ui.set_entity(kind, EntityStatus::Loaded(count));
                LoadOutcome::Loaded(count)
            }
            Err(err) if policy == FailurePolicy::Continue => {
                warn!(%kind, error = %err, "load failed, continuing");
                ui.set_entity(kind, EntityStatus::Failed(err.to_string()));
                LoadOutcome::Failed(err.to_string())
            }
            Err(err) => {
                ui.set_entity(kind, EntityStatus::Failed(err.to_string()));
                return Err(err);
            }
        };

        entities.push(EntityReport {
            kind,
            fetched,
            schema,
            outcome,
        });
    }

    ui.set_progress(total_steps - 1, total_steps, ALL_VITRINE.name);
    ui.set_phase(Phase::Summarizing);
    let summary_schema = session.ensure_table(&ALL_VITRINE)?;

    let report = RunReport {
        entities,
        summary_schema,
        summary_id: 0,
    };
    let summary_id = session.insert_summary(&report.counts())?;
    session.commit()?;
    ui.set_progress(total_steps, total_steps, "done");

    info!(
        loaded = report.loaded_rows(),
        complete = report.is_complete(),
        summary_id,
        "run finished"
    );

    Ok(RunReport {
        summary_id,
        ..report
    })
}
