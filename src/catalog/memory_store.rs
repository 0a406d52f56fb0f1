//! In-memory [`CatalogStore`] backed by an ordered map.
//!
//! Keys are assigned on insertion, starting at 1 and never reused, so removing records leaves
//! gaps in the key range exactly as a database table would.
use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;

use crate::{
    asterviz_errors::AstervizError,
    catalog::{CatalogStore, Category, CategoryFilter, SmallBody},
    constants::ObjectId,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    bodies: BTreeMap<ObjectId, SmallBody>,
    by_designator: HashMap<String, ObjectId>,
    last_id: ObjectId,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog by inserting every body in order.
    ///
    /// Return
    /// ------
    /// * The catalog, or [`AstervizError::Store`] on a duplicate designator.
    pub fn from_bodies<I>(bodies: I) -> Result<Self, AstervizError>
    where
        I: IntoIterator<Item = SmallBody>,
    {
        let mut catalog = Self::new();
        for body in bodies {
            catalog.insert(body)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Records in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &SmallBody> {
        self.bodies.values()
    }

    /// Insert a new record under the next key. The `id` carried by `body` is ignored.
    ///
    /// Return
    /// ------
    /// * The assigned key, or [`AstervizError::Store`] if the designator already exists.
    pub fn insert(&mut self, mut body: SmallBody) -> Result<ObjectId, AstervizError> {
        if self.by_designator.contains_key(&body.spkid) {
            return Err(AstervizError::Store(format!(
                "duplicate designator: {}",
                body.spkid
            )));
        }
        self.last_id += 1;
        body.id = self.last_id;
        self.by_designator.insert(body.spkid.clone(), body.id);
        self.bodies.insert(body.id, body);
        Ok(self.last_id)
    }

    /// Insert the record, or replace the one with the same designator while keeping its key.
    ///
    /// Return
    /// ------
    /// * `(key, created)`: `created` is `false` when an existing record was replaced.
    pub fn upsert(&mut self, mut body: SmallBody) -> (ObjectId, bool) {
        match self.by_designator.get(&body.spkid) {
            Some(&id) => {
                body.id = id;
                self.bodies.insert(id, body);
                (id, false)
            }
            None => {
                self.last_id += 1;
                body.id = self.last_id;
                self.by_designator.insert(body.spkid.clone(), body.id);
                self.bodies.insert(body.id, body);
                (self.last_id, true)
            }
        }
    }

    /// Insert the record unless its designator is already known; existing records are left
    /// untouched.
    pub fn get_or_create(&mut self, body: SmallBody) -> (ObjectId, bool) {
        match self.by_designator.get(&body.spkid) {
            Some(&id) => (id, false),
            None => self.upsert(body),
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SmallBody> {
        let body = self.bodies.remove(&id)?;
        self.by_designator.remove(&body.spkid);
        Some(body)
    }

    /// Number of records per category, every category present.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for body in self.bodies.values() {
            *counts.entry(body.category).or_default() += 1;
        }
        counts
    }

    fn eligible<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl DoubleEndedIterator<Item = &'a SmallBody> + 'a {
        self.bodies
            .values()
            .filter(move |body| filter.matches(body.category))
    }
}

impl CatalogStore for MemoryCatalog {
    fn count(&self, filter: &CategoryFilter) -> Result<usize, AstervizError> {
        Ok(match filter {
            CategoryFilter::Any => self.bodies.len(),
            _ => self.eligible(filter).count(),
        })
    }

    fn max_key(&self, filter: &CategoryFilter) -> Result<Option<ObjectId>, AstervizError> {
        Ok(self.eligible(filter).next_back().map(|body| body.id))
    }

    fn first_at_or_after(
        &self,
        filter: &CategoryFilter,
        key: ObjectId,
    ) -> Result<Option<SmallBody>, AstervizError> {
        Ok(self
            .bodies
            .range(key..)
            .map(|(_, body)| body)
            .find(|body| filter.matches(body.category))
            .cloned())
    }

    fn first_n_excluding(
        &self,
        filter: &CategoryFilter,
        n: usize,
        excluded: &HashSet<ObjectId>,
    ) -> Result<Vec<SmallBody>, AstervizError> {
        Ok(self
            .eligible(filter)
            .filter(|body| !excluded.contains(&body.id))
            .take(n)
            .cloned()
            .collect())
    }

    fn get(&self, id: ObjectId) -> Result<Option<SmallBody>, AstervizError> {
        Ok(self.bodies.get(&id).cloned())
    }

    fn get_by_designator(&self, spkid: &str) -> Result<Option<SmallBody>, AstervizError> {
        Ok(self
            .by_designator
            .get(spkid)
            .and_then(|id| self.bodies.get(id))
            .cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<SmallBody>, AstervizError> {
        let wanted = name.to_lowercase();
        Ok(self
            .bodies
            .values()
            .find(|body| body.name.to_lowercase() == wanted)
            .cloned())
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<SmallBody>, AstervizError> {
        let needle = query.to_lowercase();
        Ok(self
            .bodies
            .values()
            .filter(|body| {
                body.name.to_lowercase().contains(&needle)
                    || body.spkid.to_lowercase().contains(&needle)
            })
            .sorted_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)))
            .take(limit)
            .cloned()
            .collect())
    }
}
