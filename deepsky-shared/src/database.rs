use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use deepsky_lib::{
    math::frustum::Frustum,
    octree::{DynamicOctree, ObjectHandler, OctreeParams, OctreeProcStats, StaticOctree},
};
use glam::{DVec3, Quat};
use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    config::CatalogConfig,
    dso::{DeepSkyObject, DsoType, INVALID_CATALOG_NUMBER},
    fields::{FieldBlock, FieldError},
    names::NameDatabase,
    record::{CatalogRecord, RecordError},
};

/// The first catalog number handed out to records without one. Later ones count down.
pub const FIRST_AUTO_CATALOG_NUMBER: u32 = 0xFFFF_FFFE;

/// Why a call to [`DsoDatabaseBuilder::load`] failed.
///
/// `record` is the zero-based position of the offending record within the stream.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("record {record}: missing object type")]
    MissingType { record: usize },
    #[error("record {record}: catalog number {number:#x} is reserved")]
    InvalidCatalogNumber { record: usize, number: u32 },
    #[error("record {record}: {source}")]
    Record { record: usize, source: RecordError },
    #[error("record {record}: fields should be a key-value block")]
    FieldBlock { record: usize },
    #[error("record {record}: {source}")]
    Fields { record: usize, source: FieldError },
}

/// Collects deep sky objects from one or more record streams.
///
/// Call [`Self::finish`] once everything is loaded to get a queryable [`DsoDatabase`].
#[derive(Clone, Debug)]
pub struct DsoDatabaseBuilder {
    config: CatalogConfig,
    objects: Vec<DeepSkyObject>,
    /// Index into `objects` for every catalog number in use.
    indices: HashMap<u32, usize>,
    /// Catalog numbers that were assigned automatically rather than read from a record.
    auto_catalog_numbers: HashSet<u32>,
    next_auto_catalog_number: u32,
    names: Option<NameDatabase>,
}

impl DsoDatabaseBuilder {
    /// Constructs an empty builder with an empty [`NameDatabase`].
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_names(config, Some(NameDatabase::new()))
    }

    /// Constructs an empty builder with the given name directory.
    ///
    /// Without a name directory, names of loaded records are dropped.
    pub fn with_names(config: CatalogConfig, names: Option<NameDatabase>) -> Self {
        Self {
            config,
            objects: Vec::new(),
            indices: HashMap::new(),
            auto_catalog_numbers: HashSet::new(),
            next_auto_catalog_number: FIRST_AUTO_CATALOG_NUMBER,
            names,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> Option<&NameDatabase> {
        self.names.as_ref()
    }

    /// Loads all `records` and returns how many objects were added or replaced.
    ///
    /// Records without a catalog number get one counting down from
    /// [`FIRST_AUTO_CATALOG_NUMBER`], skipping numbers already in use. A record with an explicit
    /// catalog number that is already in use replaces the existing object, unless that object got
    /// its number automatically. It then moves to the next automatic number, keeping its names. If
    /// a record has names, they replace all previous names of its catalog number.
    ///
    /// Records with an unknown type are skipped with a warning, as long as their fields are a
    /// key-value block.
    ///
    /// Loading stops at the first invalid record. Objects loaded before that are kept.
    pub fn load(
        &mut self,
        records: impl IntoIterator<Item = Result<CatalogRecord, RecordError>>,
        resource_path: &Path,
    ) -> Result<usize, LoadError> {
        let mut loaded = 0;
        for (record, result) in records.into_iter().enumerate() {
            let entry = result.map_err(|source| LoadError::Record { record, source })?;
            if self.load_record(record, &entry, resource_path)? {
                loaded += 1;
            }
        }

        info!("loaded {loaded} deep sky objects");
        Ok(loaded)
    }

    /// Returns `false` if the record was skipped.
    fn load_record(
        &mut self,
        record: usize,
        entry: &CatalogRecord,
        resource_path: &Path,
    ) -> Result<bool, LoadError> {
        let object_type = entry
            .object_type
            .as_deref()
            .ok_or(LoadError::MissingType { record })?;

        if let Some(number @ INVALID_CATALOG_NUMBER) = entry.catalog_number {
            return Err(LoadError::InvalidCatalogNumber { record, number });
        }

        let fields = FieldBlock::from_value(&entry.fields).ok_or(LoadError::FieldBlock { record })?;

        let Some(dso_type) = DsoType::from_tag(object_type) else {
            warn!("record {record}: skipping unknown object type {object_type:?}");
            return Ok(false);
        };

        let mut object = DeepSkyObject::from_fields(dso_type, fields, resource_path)
            .map_err(|source| LoadError::Fields { record, source })?;

        let catalog_number = match entry.catalog_number {
            Some(catalog_number) => {
                if self.auto_catalog_numbers.contains(&catalog_number) {
                    self.renumber_auto_object(record, catalog_number);
                }
                catalog_number
            }
            None => {
                let catalog_number = self.next_auto_catalog_number();
                self.auto_catalog_numbers.insert(catalog_number);
                catalog_number
            }
        };
        object.set_catalog_number(catalog_number);

        match self.indices.get(&catalog_number).copied() {
            Some(index) => {
                debug!("record {record}: replacing object {catalog_number}");
                self.objects[index] = object;
            }
            None => {
                self.indices.insert(catalog_number, self.objects.len());
                self.push(object);
            }
        }

        if let Some(names) = &mut self.names {
            if !entry.names.is_empty() {
                names.erase(catalog_number);
                for name in entry.name_list() {
                    names.add(catalog_number, name);
                }
            }
        }

        Ok(true)
    }

    /// Moves the object with the automatic `catalog_number` to a fresh automatic number.
    fn renumber_auto_object(&mut self, record: usize, catalog_number: u32) {
        let new_catalog_number = self.next_auto_catalog_number();
        let index = self
            .indices
            .remove(&catalog_number)
            .expect("automatic catalog numbers should be in use");
        self.auto_catalog_numbers.remove(&catalog_number);
        self.auto_catalog_numbers.insert(new_catalog_number);
        self.indices.insert(new_catalog_number, index);
        self.objects[index].set_catalog_number(new_catalog_number);

        if let Some(names) = &mut self.names {
            let moved = names.names(catalog_number).map(str::to_owned).collect_vec();
            names.erase(catalog_number);
            for name in &moved {
                names.add(new_catalog_number, name);
            }
        }

        debug!("record {record}: moved object {catalog_number} to {new_catalog_number}");
    }

    fn next_auto_catalog_number(&mut self) -> u32 {
        loop {
            let catalog_number = self.next_auto_catalog_number;
            self.next_auto_catalog_number = catalog_number
                .checked_sub(1)
                .expect("automatic catalog numbers should not run out");
            if !self.indices.contains_key(&catalog_number) {
                break catalog_number;
            }
        }
    }

    /// Appends `object`, growing the list by at least 5% at a time.
    fn push(&mut self, object: DeepSkyObject) {
        let len = self.objects.len();
        if len == self.objects.capacity() {
            let capacity = (len + len / 20).max(len + 1).max(self.config.min_capacity);
            self.objects.reserve_exact(capacity - len);
        }
        self.objects.push(object);
    }

    /// The configured octree layout, with the root doubled in size until it encloses every object.
    ///
    /// Objects with non-finite coordinates cannot be enclosed and stay outside of the root.
    fn octree_params(&self) -> OctreeParams {
        let extent = self
            .objects
            .iter()
            .map(|object| object.position().abs().max_element())
            .filter(|extent| extent.is_finite())
            .fold(0.0, f64::max);

        let mut config = self.config.clone();
        while config.octree_root_size > 0.0 && config.octree_root_size < extent {
            config.octree_root_size *= 2.0;
        }
        if config.octree_root_size != self.config.octree_root_size {
            warn!(
                "growing the octree root from {} ly to {} ly to enclose all deep sky objects",
                self.config.octree_root_size, config.octree_root_size
            );
        }
        config.octree_params()
    }

    /// Builds the octree and the catalog number index.
    ///
    /// The octree root grows past the configured size if necessary, so that queries see every
    /// object with a finite position. Objects are reordered by the octree, so indices from before
    /// this call are meaningless.
    pub fn finish(self) -> DsoDatabase {
        let params = self.octree_params();
        let mut octree = DynamicOctree::new(params);
        for (index, object) in self.objects.iter().enumerate() {
            octree.insert(index, object);
        }

        let outside = octree.objects_outside_root();
        if outside > 0 {
            warn!(
                "{outside} deep sky objects lie outside of the octree root (half size {} ly)",
                params.root().half_size()
            );
        }

        let octree = octree.rebuild_and_sort(self.objects);
        debug!(
            "built deep sky octree with {} nodes for {} objects",
            octree.node_count(),
            octree.len()
        );

        let catalog_index = (0..octree.len())
            .sorted_unstable_by_key(|&index| octree.objects()[index].catalog_number())
            .collect_vec();
        debug!("built catalog number index");

        let (sum, count) = octree
            .objects()
            .iter()
            .filter(|object| object.has_absolute_magnitude())
            .fold((0.0, 0u32), |(sum, count), object| {
                (sum + f64::from(object.absolute_magnitude()), count + 1)
            });
        let average_absolute_magnitude = (sum / f64::from(count.max(1))) as f32;

        DsoDatabase {
            octree,
            catalog_index,
            names: self.names,
            average_absolute_magnitude,
        }
    }
}

impl Default for DsoDatabaseBuilder {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

/// A sealed deep sky catalog that answers lookups and spatial queries.
#[derive(Clone, Debug)]
pub struct DsoDatabase {
    octree: StaticOctree<DeepSkyObject>,
    /// Indices into the octree objects sorted by catalog number.
    catalog_index: Vec<usize>,
    names: Option<NameDatabase>,
    average_absolute_magnitude: f32,
}

impl DsoDatabase {
    pub fn len(&self) -> usize {
        self.octree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.octree.is_empty()
    }

    /// All objects in octree order.
    pub fn objects(&self) -> &[DeepSkyObject] {
        self.octree.objects()
    }

    pub fn octree(&self) -> &StaticOctree<DeepSkyObject> {
        &self.octree
    }

    pub fn names(&self) -> Option<&NameDatabase> {
        self.names.as_ref()
    }

    /// The average over all objects with a catalogued absolute magnitude, or `0` if there are none.
    pub fn average_absolute_magnitude(&self) -> f32 {
        self.average_absolute_magnitude
    }

    /// Objects sorted by catalog number.
    pub fn iter_by_catalog_number(&self) -> impl Iterator<Item = &DeepSkyObject> {
        self.catalog_index
            .iter()
            .map(|&index| &self.octree.objects()[index])
    }

    pub fn find(&self, catalog_number: u32) -> Option<&DeepSkyObject> {
        let objects = self.octree.objects();
        self.catalog_index
            .binary_search_by_key(&catalog_number, |&index| objects[index].catalog_number())
            .ok()
            .map(|position| &objects[self.catalog_index[position]])
    }

    /// Looks up an object by any of its names, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&DeepSkyObject> {
        if name.is_empty() {
            return None;
        }
        self.find(self.names.as_ref()?.find_catalog_number_by_name(name)?)
    }

    /// The first name of `dso`.
    pub fn name(&self, dso: &DeepSkyObject) -> Option<&str> {
        self.names.as_ref()?.first_name(dso.catalog_number())
    }

    /// Up to `max_names` names of `dso`, separated by `" / "`.
    pub fn name_list(&self, dso: &DeepSkyObject, max_names: usize) -> String {
        self.names
            .iter()
            .flat_map(|names| names.names(dso.catalog_number()))
            .take(max_names)
            .join(" / ")
    }

    /// Names starting with `prefix`, ignoring case.
    pub fn completion(&self, prefix: &str) -> Vec<&str> {
        self.names
            .as_ref()
            .map(|names| names.completion(prefix))
            .unwrap_or_default()
    }

    /// Reports objects that might be visible to the given observer and are brighter than
    /// `limiting_magnitude`.
    ///
    /// `orientation` rotates world space into camera space, the camera looks down its negative Z
    /// axis. `fov_y` is the vertical field of view in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn find_visible_objects(
        &self,
        handler: &mut impl ObjectHandler<DeepSkyObject>,
        observer: DVec3,
        orientation: Quat,
        fov_y: f32,
        aspect_ratio: f32,
        limiting_magnitude: f32,
        stats: Option<&mut OctreeProcStats>,
    ) {
        let frustum = Frustum::from_view(observer, orientation, fov_y, aspect_ratio);
        self.octree
            .process_visible_objects(handler, observer, &frustum, limiting_magnitude, stats);
    }

    /// Reports all objects within `radius` light years of `observer`.
    pub fn find_close_objects(
        &self,
        handler: &mut impl ObjectHandler<DeepSkyObject>,
        observer: DVec3,
        radius: f64,
    ) {
        self.octree.process_close_objects(handler, observer, radius);
    }
}
