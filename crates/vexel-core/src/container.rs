//! Ordered, exclusively-owning shape collection with stable identifiers.

use crate::geom::boxes_overlap;
use crate::shapes::{Shape, ShapeRegistry};
use crate::storage::{Storage, StorageResult};
use crate::style::ShapeStyle;
use crate::surface::DrawSurface;
use kurbo::{Point, Rect};

/// A shape as stored in a container: the geometry plus its drawing style,
/// container-assigned identifier, and an opaque caller tag.
///
/// The id is assigned exactly once at insertion and is stable for the
/// entry's lifetime inside its container; it is never zero.
#[derive(Debug)]
pub struct ShapeEntry {
    shape: Box<dyn Shape>,
    style: ShapeStyle,
    id: u32,
    tag: i32,
}

impl ShapeEntry {
    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    /// Mutable geometry access. Callers must `update()` after point
    /// mutation before relying on the extent.
    pub fn shape_mut(&mut self) -> &mut dyn Shape {
        self.shape.as_mut()
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Opaque caller bookkeeping value; the container never interprets it.
    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn set_tag(&mut self, tag: i32) {
        self.tag = tag;
    }

    /// Per-member value equality: same identity, tag, style, and shape data.
    pub fn equals(&self, other: &ShapeEntry) -> bool {
        self.id == other.id
            && self.tag == other.tag
            && self.style == other.style
            && self.shape.equals(other.shape.as_ref())
    }

    fn clone_entry(&self) -> ShapeEntry {
        ShapeEntry {
            shape: self.shape.clone_box(),
            style: self.style.clone(),
            id: self.id,
            tag: self.tag,
        }
    }
}

/// Nearest member found by [`Shapes::hit_test`].
#[derive(Debug)]
pub struct ContainerHit<'a> {
    pub entry: &'a ShapeEntry,
    pub distance: f64,
    pub nearest: Point,
    pub segment: i32,
}

/// Ordered collection of exclusively-owned shapes.
///
/// Iteration borrows the live backing sequence; the borrow checker rejects
/// mutation mid-iteration, so the sharp edge of index-based cursors over a
/// mutating list cannot occur.
#[derive(Debug, Default)]
pub struct Shapes {
    entries: Vec<ShapeEntry>,
}

impl Shapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone `shape` into the container, assign it a fresh unique id, and
    /// return the stored entry. The clone is owned by the container.
    pub fn add_copy(&mut self, shape: &dyn Shape, style: ShapeStyle) -> &ShapeEntry {
        let id = self.next_id();
        log::debug!("add shape kind {} as id {}", shape.type_tag(), id);
        self.entries.push(ShapeEntry {
            shape: shape.clone_box(),
            style,
            id,
            tag: 0,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Smallest id greater than the last assigned one, probed upward past
    /// any id still in use. Uniqueness is guaranteed; reuse of ids freed by
    /// deletion is not.
    fn next_id(&self) -> u32 {
        let mut id = self.entries.last().map_or(1, |e| e.id.saturating_add(1));
        while self.find(id).is_some() {
            id += 1;
        }
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forward iteration over current members.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ShapeEntry> {
        self.entries.iter_mut()
    }

    /// Linear scan by id.
    pub fn find(&self, id: u32) -> Option<&ShapeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut ShapeEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Union of every member's extent; empty container yields a degenerate
    /// zero box.
    pub fn extent(&self) -> Rect {
        let mut iter = self.entries.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first.shape.extent(), |r, e| r.union(e.shape.extent()))
    }

    /// Nearest member within `limits`: broad-phase extent filter, then each
    /// survivor is probed at the box center with half the box width as the
    /// tolerance. Strict `<` against the running minimum keeps the first
    /// member seen on ties. None when nothing lies within `limits.width()`
    /// of the center.
    pub fn hit_test(&self, limits: Rect) -> Option<ContainerHit<'_>> {
        let center = limits.center();
        let tol = limits.width() / 2.0;
        let mut dist_min = limits.width();
        let mut best = None;
        for entry in &self.entries {
            if !boxes_overlap(entry.shape.extent(), limits) {
                continue;
            }
            let hit = entry.shape.hit_test(center, tol);
            if hit.distance < dist_min {
                dist_min = hit.distance;
                best = Some(ContainerHit {
                    entry,
                    distance: hit.distance,
                    nearest: hit.nearest,
                    segment: hit.segment,
                });
            }
        }
        best
    }

    /// Draw every member whose extent intersects the surface clip region;
    /// the rest are culled for this frame. Returns the number dispatched.
    pub fn draw(&self, surface: &mut dyn DrawSurface, style_override: Option<&ShapeStyle>) -> usize {
        let clip = surface.clip_bounds();
        let mut drawn = 0;
        for entry in &self.entries {
            if boxes_overlap(entry.shape.extent(), clip) {
                surface.draw_shape(entry.shape.as_ref(), style_override.unwrap_or(&entry.style));
                drawn += 1;
            }
        }
        log::trace!("drew {} of {} shapes", drawn, self.entries.len());
        drawn
    }

    /// Remove the member with `id`, transferring ownership to the caller;
    /// dropping the returned entry releases it.
    pub fn remove(&mut self, id: u32) -> Option<ShapeEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        log::debug!("remove shape id {}", id);
        Some(self.entries.remove(pos))
    }

    /// Release every member.
    pub fn clear(&mut self) {
        log::debug!("clear {} shapes", self.entries.len());
        self.entries.clear();
    }

    /// Per-member sequence value equality.
    pub fn equals(&self, other: &Shapes) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.equals(b))
    }

    /// Replace this container's members with deep copies of `src`'s,
    /// preserving their identities.
    pub fn copy_from(&mut self, src: &Shapes) {
        self.entries = src.entries.iter().map(ShapeEntry::clone_entry).collect();
    }

    pub fn save(&self, s: &mut dyn Storage) -> StorageResult<()> {
        s.begin_section("shapes")?;
        let result = self.save_entries(s);
        s.end_section()?;
        result
    }

    fn save_entries(&self, s: &mut dyn Storage) -> StorageResult<()> {
        s.write_u32("count", self.entries.len() as u32)?;
        for (i, entry) in self.entries.iter().enumerate() {
            s.begin_section(&format!("shape{i}"))?;
            let result = Self::save_entry(entry, s);
            s.end_section()?;
            result?;
        }
        Ok(())
    }

    fn save_entry(entry: &ShapeEntry, s: &mut dyn Storage) -> StorageResult<()> {
        s.write_u32("kind", entry.shape.type_tag())?;
        s.write_u32("id", entry.id)?;
        s.write_i32("tag", entry.tag)?;
        entry.style.save(s)?;
        entry.shape.save(s)
    }

    /// All-or-nothing load: members are fully reconstructed through the
    /// registry before the container is touched.
    pub fn load(&mut self, s: &mut dyn Storage, registry: &ShapeRegistry) -> StorageResult<()> {
        s.begin_section("shapes")?;
        let entries = Self::load_entries(s, registry);
        s.end_section()?;
        self.entries = entries?;
        Ok(())
    }

    fn load_entries(s: &mut dyn Storage, registry: &ShapeRegistry) -> StorageResult<Vec<ShapeEntry>> {
        let count = s.read_u32("count")?;
        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count {
            s.begin_section(&format!("shape{i}"))?;
            let entry = Self::load_entry(s, registry);
            s.end_section()?;
            entries.push(entry?);
        }
        Ok(entries)
    }

    fn load_entry(s: &mut dyn Storage, registry: &ShapeRegistry) -> StorageResult<ShapeEntry> {
        let kind = s.read_u32("kind")?;
        let id = s.read_u32("id")?;
        let tag = s.read_i32("tag")?;
        let style = ShapeStyle::load(s)?;
        let mut shape = registry.create(kind)?;
        shape.load(s)?;
        Ok(ShapeEntry {
            shape,
            style,
            id,
            tag,
        })
    }
}

impl Clone for Shapes {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.iter().map(ShapeEntry::clone_entry).collect(),
        }
    }
}
