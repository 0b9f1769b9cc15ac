//! One repository per collection, addressable by entity kind.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use gymdesk_database::{
    CheckIn, EntityKind, Equipment, GymClass, Member, RecordBackend, Repository, StoreResult,
};

use crate::query::{filter_records, Searchable, StatusFilter};
use crate::stats::{compute_stats, DashboardStats};

/// A record of any collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityRecord {
    Member(Member),
    Equipment(Equipment),
    Class(GymClass),
    CheckIn(CheckIn),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Member(_) => EntityKind::Member,
            EntityRecord::Equipment(_) => EntityKind::Equipment,
            EntityRecord::Class(_) => EntityKind::Class,
            EntityRecord::CheckIn(_) => EntityKind::CheckIn,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRecord::Member(m) => &m.id,
            EntityRecord::Equipment(e) => &e.id,
            EntityRecord::Class(c) => &c.id,
            EntityRecord::CheckIn(c) => &c.id,
        }
    }
}

impl Searchable for EntityRecord {
    fn person_name(&self) -> Option<String> {
        match self {
            EntityRecord::Member(m) => m.person_name(),
            _ => None,
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            EntityRecord::Equipment(e) => e.name(),
            EntityRecord::Class(c) => c.name(),
            _ => None,
        }
    }

    fn email(&self) -> Option<&str> {
        match self {
            EntityRecord::Member(m) => m.email(),
            _ => None,
        }
    }

    fn status(&self) -> Option<&str> {
        match self {
            EntityRecord::Member(m) => m.status(),
            EntityRecord::Equipment(e) => e.status(),
            _ => None,
        }
    }
}

macro_rules! wrap_all {
    ($variant:ident, $records:expr) => {
        $records.into_iter().map(EntityRecord::$variant).collect()
    };
}

/// The four collections of the gym record store over one backend.
#[derive(Clone)]
pub struct GymStores {
    pub members: Repository<Member>,
    pub equipment: Repository<Equipment>,
    pub classes: Repository<GymClass>,
    pub check_ins: Repository<CheckIn>,
}

impl GymStores {
    pub fn new(backend: Arc<dyn RecordBackend>, timeout: Option<Duration>) -> Self {
        Self {
            members: Repository::new(Arc::clone(&backend)).with_timeout(timeout),
            equipment: Repository::new(Arc::clone(&backend)).with_timeout(timeout),
            classes: Repository::new(Arc::clone(&backend)).with_timeout(timeout),
            check_ins: Repository::new(backend).with_timeout(timeout),
        }
    }

    pub async fn load(&self, kind: EntityKind) -> StoreResult<Vec<EntityRecord>> {
        Ok(match kind {
            EntityKind::Member => wrap_all!(Member, self.members.get_all().await?),
            EntityKind::Equipment => wrap_all!(Equipment, self.equipment.get_all().await?),
            EntityKind::Class => wrap_all!(Class, self.classes.get_all().await?),
            EntityKind::CheckIn => wrap_all!(CheckIn, self.check_ins.get_all().await?),
        })
    }

    pub async fn get_by_id(&self, kind: EntityKind, id: &str) -> StoreResult<Option<EntityRecord>> {
        Ok(match kind {
            EntityKind::Member => self.members.get_by_id(id).await?.map(EntityRecord::Member),
            EntityKind::Equipment => self
                .equipment
                .get_by_id(id)
                .await?
                .map(EntityRecord::Equipment),
            EntityKind::Class => self.classes.get_by_id(id).await?.map(EntityRecord::Class),
            EntityKind::CheckIn => self
                .check_ins
                .get_by_id(id)
                .await?
                .map(EntityRecord::CheckIn),
        })
    }

    /// Load `kind` and apply the list screen filters.
    pub async fn search(
        &self,
        kind: EntityKind,
        search_term: &str,
        status_filter: &StatusFilter,
    ) -> StoreResult<Vec<EntityRecord>> {
        let records = self.load(kind).await?;
        Ok(filter_records(&records, search_term, status_filter))
    }

    pub async fn create_from_payload(
        &self,
        kind: EntityKind,
        payload: &Map<String, Value>,
    ) -> StoreResult<EntityRecord> {
        Ok(match kind {
            EntityKind::Member => EntityRecord::Member(self.members.create_from_payload(payload).await?),
            EntityKind::Equipment => {
                EntityRecord::Equipment(self.equipment.create_from_payload(payload).await?)
            }
            EntityKind::Class => EntityRecord::Class(self.classes.create_from_payload(payload).await?),
            EntityKind::CheckIn => {
                EntityRecord::CheckIn(self.check_ins.create_from_payload(payload).await?)
            }
        })
    }

    pub async fn update_from_payload(
        &self,
        kind: EntityKind,
        id: &str,
        payload: &Map<String, Value>,
    ) -> StoreResult<EntityRecord> {
        Ok(match kind {
            EntityKind::Member => {
                EntityRecord::Member(self.members.update_from_payload(id, payload).await?)
            }
            EntityKind::Equipment => {
                EntityRecord::Equipment(self.equipment.update_from_payload(id, payload).await?)
            }
            EntityKind::Class => {
                EntityRecord::Class(self.classes.update_from_payload(id, payload).await?)
            }
            EntityKind::CheckIn => {
                EntityRecord::CheckIn(self.check_ins.update_from_payload(id, payload).await?)
            }
        })
    }

    pub async fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<EntityRecord> {
        Ok(match kind {
            EntityKind::Member => EntityRecord::Member(self.members.delete(id).await?),
            EntityKind::Equipment => EntityRecord::Equipment(self.equipment.delete(id).await?),
            EntityKind::Class => EntityRecord::Class(self.classes.delete(id).await?),
            EntityKind::CheckIn => EntityRecord::CheckIn(self.check_ins.delete(id).await?),
        })
    }

    /// True when no collection holds a record.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        for kind in EntityKind::ALL {
            if !self.load(kind).await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn dashboard_stats<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> StoreResult<DashboardStats> {
        let members = self.members.get_all().await?;
        let equipment = self.equipment.get_all().await?;
        let classes = self.classes.get_all().await?;
        let check_ins = self.check_ins.get_all().await?;

        Ok(compute_stats(&members, &equipment, &classes, &check_ins, now))
    }
}
