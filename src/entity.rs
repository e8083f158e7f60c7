//! The closed set of entity kinds driving query, schema and load selection

use std::fmt;
use std::str::FromStr;

use crate::error::EtlError;
use crate::graphql::query::build_query;
use crate::schema::{TableSchema, LAUNCHES, MISSIONS, ROCKETS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum EntityKind {
    Missions,
    Rockets,
    Launches,
}

impl EntityKind {
    /// All kinds, in the order a run processes them
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Missions,
        EntityKind::Rockets,
        EntityKind::Launches,
    ];

    /// GraphQL root field and table name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Missions => "missions",
            EntityKind::Rockets => "rockets",
            EntityKind::Launches => "launches",
        }
    }

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            EntityKind::Missions => &MISSIONS,
            EntityKind::Rockets => &ROCKETS,
            EntityKind::Launches => &LAUNCHES,
        }
    }

    pub fn query(&self) -> &'static str {
        build_query(*self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EtlError::UnknownKind(s.to_string()))
    }
}

/// Number of fetched rows per kind, as recorded in the summary row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub missions: usize,
    pub rockets: usize,
    pub launches: usize,
}

impl EntityCounts {
    pub fn get(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Missions => self.missions,
            EntityKind::Rockets => self.rockets,
            EntityKind::Launches => self.launches,
        }
    }

    pub fn set(&mut self, kind: EntityKind, count: usize) {
        match kind {
            EntityKind::Missions => self.missions = count,
            EntityKind::Rockets => self.rockets = count,
            EntityKind::Launches => self.launches = count,
        }
    }
}
