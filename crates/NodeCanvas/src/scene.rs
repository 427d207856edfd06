//! # Scene Registry
//!
//! The [`Scene`] owns every entity, their paint order, the drawing surface and the
//! redraw batch. All mutation goes through it so the box/arrow relationships stay
//! consistent:
//!
//! - every connected arrow appears exactly once in each endpoint's `connected_lines`;
//! - removing an entity cascades to the arrows attached to it;
//! - list order is paint order and, reversed, hit-test priority.

use glam::Vec2;
use slotmap::{SecondaryMap, SlotMap};

use crate::batch::{Batch, FrameHandle, FrameScheduler};
use crate::config::{AnchorMode, SceneConfig};
use crate::error::{Result, SceneError};
use crate::interaction::{EventHub, PointerState};
use crate::layout;
use crate::model::{
    ArrowData, ArrowOptions, BoxOptions, Entity, EntityFlags, EntityId, EntityKind, StylePatch,
    Uuid,
};
use crate::painter::{self, DrawCallback};
use crate::surface::Surface;

/// Which end of an arrow an anchor is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnchorRole {
    /// The arrow's tail (`position`); the endpoint is its `from`.
    Start,
    /// The arrow's tip (`end_position`); the endpoint is its `to`.
    End,
}

/// Everything an anchor override needs to pick an attachment point.
#[derive(Debug)]
pub struct AnchorRequest<'a> {
    /// The box the arrow is attached to.
    pub endpoint: &'a Entity,
    /// The arrow being re-anchored.
    pub arrow: &'a Entity,
    pub role: AnchorRole,
    /// The point the scene would use without an override.
    pub default: Vec2,
}

/// Custom anchor rule.
pub type AnchorFn = Box<dyn Fn(&AnchorRequest<'_>) -> Vec2>;

/// A deferred scene mutation queued on the redraw batch.
pub type SceneCallback<S> = Box<dyn FnOnce(&mut Scene<S>)>;

/// The scene registry.
pub struct Scene<S> {
    entities: SlotMap<EntityId, Entity>,
    /// Paint order. Lower index = Background, higher index = Foreground.
    order: Vec<EntityId>,
    surface: S,
    size: Vec2,
    config: SceneConfig,
    batch: Batch<Scene<S>, EntityId>,
    anchor_overrides: SecondaryMap<EntityId, AnchorFn>,
    global_anchor: Option<AnchorFn>,
    draw_callbacks: SecondaryMap<EntityId, Vec<DrawCallback<S>>>,
    pub(crate) events: EventHub<S>,
    pub(crate) pointer: PointerState,
}

impl<S: Surface> std::fmt::Debug for Scene<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.order.len())
            .field("size", &self.size)
            .field("batch", &self.batch)
            .field("pointer", &self.pointer)
            .finish()
    }
}

impl<S: Surface + 'static> Scene<S> {
    /// Binds a new scene to `surface`, taking its logical size.
    pub fn new(surface: S, scheduler: impl FrameScheduler + 'static, config: SceneConfig) -> Self {
        let size = surface.size();
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            surface,
            size,
            config,
            batch: Batch::new(Box::new(scheduler)),
            anchor_overrides: SecondaryMap::new(),
            global_anchor: None,
            draw_callbacks: SecondaryMap::new(),
            events: EventHub::default(),
            pointer: PointerState::default(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Logical size used when clearing.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Re-reads the surface size (e.g. after the host resized it) and repaints.
    pub fn bind_size(&mut self) {
        self.size = self.surface.size();
        self.redraw_all();
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Entities in paint order (bottom first).
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(*id))
    }

    /// Paint order (bottom first).
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(SceneError::NotFound(id))
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(id).ok_or(SceneError::NotFound(id))
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Creates a box, paints it on top of the current frame and registers it as topmost.
    pub fn create_box(&mut self, options: BoxOptions) -> EntityId {
        let BoxOptions {
            name,
            position,
            path,
            raw_rect,
            style,
            text,
            hidden,
        } = options;

        let mut flags = EntityFlags::default();
        flags.set(EntityFlags::HIDDEN, hidden);

        let entity = Entity {
            id: EntityId::default(),
            uuid: Uuid::new_v4(),
            name,
            position,
            path,
            raw_rect,
            style: style.unwrap_or_else(|| self.config.style.box_default.clone()),
            text,
            flags,
            connected_lines: Vec::new(),
            kind: EntityKind::Box,
        };
        let id = self.insert(entity);
        self.draw(id);
        self.order.push(id);
        tracing::debug!(entity = ?id, uuid = %self.entities[id].uuid, "box created");
        id
    }

    /// Creates an arrow starting (and, until moved, ending) at `options.start`.
    ///
    /// If `options.end` is set the arrow is then moved there with a full repaint.
    pub fn create_arrow(&mut self, options: ArrowOptions) -> EntityId {
        let ArrowOptions {
            name,
            start,
            end,
            ratio,
            style,
        } = options;

        let entity = Entity {
            id: EntityId::default(),
            uuid: Uuid::new_v4(),
            name,
            position: start,
            path: None,
            raw_rect: None,
            style: style.unwrap_or_else(|| self.config.style.arrow_default.clone()),
            text: String::new(),
            flags: EntityFlags::default(),
            connected_lines: Vec::new(),
            kind: EntityKind::Arrow(ArrowData {
                from: None,
                to: None,
                end_position: start,
                ratio: layout::clamp_ratio(ratio.unwrap_or(self.config.arrow_ratio)),
            }),
        };
        let id = self.insert(entity);
        self.draw(id);
        self.order.push(id);
        tracing::debug!(entity = ?id, uuid = %self.entities[id].uuid, "arrow created");

        if let Some(end) = end {
            self.reposition(id, end);
        }
        id
    }

    /// Creates an arrow from `start`, optionally stretched to `end`.
    pub fn create_line(&mut self, start: Vec2, end: Option<Vec2>) -> EntityId {
        self.create_arrow(ArrowOptions {
            name: "line".to_string(),
            start,
            end,
            ..Default::default()
        })
    }

    fn insert(&mut self, mut entity: Entity) -> EntityId {
        self.entities.insert_with_key(|key| {
            entity.id = key;
            entity
        })
    }

    // ---------------------------------------------------------------------
    // Relationships
    // ---------------------------------------------------------------------

    /// Connects `arrow` from one box to another.
    ///
    /// Any previous connection of the arrow is dropped first, so calling this twice
    /// never duplicates back-references. The arrow is re-anchored immediately but not
    /// repainted.
    pub fn connect(&mut self, arrow: EntityId, from: EntityId, to: EntityId) -> Result<()> {
        if self.get(arrow)?.arrow().is_none() {
            return Err(SceneError::NotAnArrow(arrow));
        }
        for endpoint in [from, to] {
            if self.get(endpoint)?.raw_rect.is_none() {
                return Err(SceneError::MissingGeometry(endpoint));
            }
        }

        self.detach_arrow(arrow);

        if let Some(data) = self.entities[arrow].arrow_mut() {
            data.from = Some(from);
            data.to = Some(to);
        }
        for endpoint in [from, to] {
            let lines = &mut self.entities[endpoint].connected_lines;
            if !lines.contains(&arrow) {
                lines.push(arrow);
            }
        }

        self.sync_line(arrow);
        tracing::debug!(?arrow, ?from, ?to, "arrow connected");
        Ok(())
    }

    /// Drops the arrow's endpoints, leaving it free-standing where it is.
    pub fn disconnect(&mut self, arrow: EntityId) -> Result<()> {
        if self.get(arrow)?.arrow().is_none() {
            return Err(SceneError::NotAnArrow(arrow));
        }
        self.detach_arrow(arrow);
        Ok(())
    }

    /// Clears `from`/`to` and removes the arrow from both endpoints' line lists.
    fn detach_arrow(&mut self, arrow: EntityId) {
        let Some(data) = self.entities.get_mut(arrow).and_then(Entity::arrow_mut) else {
            return;
        };
        let ends = [data.from.take(), data.to.take()];
        for end in ends.into_iter().flatten() {
            if let Some(entity) = self.entities.get_mut(end) {
                entity.connected_lines.retain(|&line| line != arrow);
            }
        }
    }

    /// Installs an anchor rule for arrows attached to `id`. Takes priority over the
    /// global rule.
    pub fn set_anchor_override(
        &mut self,
        id: EntityId,
        anchor: impl Fn(&AnchorRequest<'_>) -> Vec2 + 'static,
    ) -> Result<()> {
        self.get(id)?;
        self.anchor_overrides.insert(id, Box::new(anchor));
        Ok(())
    }

    pub fn clear_anchor_override(&mut self, id: EntityId) -> Result<()> {
        self.get(id)?;
        self.anchor_overrides.remove(id);
        Ok(())
    }

    /// Installs (or, with `None`, removes) the scene-wide anchor rule.
    pub fn set_global_anchor(&mut self, anchor: Option<AnchorFn>) {
        self.global_anchor = anchor;
    }

    /// Anchor for the `role` end of `line`, attached to `endpoint`.
    ///
    /// Priority: per-entity override, then the global rule, then the configured default.
    pub fn anchor_for(&self, endpoint: EntityId, line: EntityId, role: AnchorRole) -> Option<Vec2> {
        let node = self.entities.get(endpoint)?;
        let arrow_entity = self.entities.get(line)?;
        let arrow = arrow_entity.arrow()?;
        let bounds = node.bounds()?;

        let default = match self.config.anchor_mode {
            AnchorMode::Center => layout::endpoint_center(bounds),
            AnchorMode::Edge => {
                let center_of = |id: Option<EntityId>| {
                    id.and_then(|id| self.entities.get(id))
                        .and_then(Entity::bounds)
                        .map(|b| b.center())
                };
                let start = center_of(arrow.from).unwrap_or(arrow_entity.position);
                let end = center_of(arrow.to).unwrap_or(arrow.end_position);
                layout::place_point_on_edge(
                    start,
                    end,
                    bounds,
                    role == AnchorRole::Start,
                    self.config.direction_margin,
                )
            }
        };

        let request = AnchorRequest {
            endpoint: node,
            arrow: arrow_entity,
            role,
            default,
        };
        let anchor = if let Some(custom) = self.anchor_overrides.get(endpoint) {
            custom(&request)
        } else if let Some(global) = &self.global_anchor {
            global(&request)
        } else {
            default
        };
        Some(anchor)
    }

    /// Re-anchors every arrow attached to `id`. Does not repaint them.
    fn update_line_positions(&mut self, id: EntityId) {
        let Some(node) = self.entities.get(id) else {
            return;
        };
        for line in node.connected_lines.clone() {
            self.sync_line(line);
        }
    }

    /// Recomputes both ends of a connected arrow.
    ///
    /// In edge mode either anchor depends on both endpoints, so the two ends are always
    /// refreshed together.
    fn sync_line(&mut self, line: EntityId) {
        let Some(arrow) = self.entities.get(line).and_then(Entity::arrow) else {
            return;
        };
        let (from, to) = (arrow.from, arrow.to);

        let start = from.and_then(|from| self.anchor_for(from, line, AnchorRole::Start));
        let end = to.and_then(|to| self.anchor_for(to, line, AnchorRole::End));

        let entity = &mut self.entities[line];
        if let Some(start) = start {
            entity.position = start;
        }
        if let Some(end) = end
            && let Some(data) = entity.arrow_mut()
        {
            data.end_position = end;
        }
    }

    // ---------------------------------------------------------------------
    // Painting and movement
    // ---------------------------------------------------------------------

    /// Clears the surface and paints every entity in order.
    pub fn redraw_all(&mut self) {
        self.surface.clear_rect(Vec2::ZERO, self.size);
        self.surface.save();
        for id in self.order.clone() {
            self.draw(id);
        }
        self.surface.restore();
    }

    fn draw(&mut self, id: EntityId) {
        let Self {
            entities,
            surface,
            config,
            draw_callbacks,
            ..
        } = self;
        if let Some(entity) = entities.get(id) {
            painter::draw_entity(surface, entity, config, draw_callbacks.get_mut(id));
        }
    }

    /// Moves one entity and repaints the whole scene.
    ///
    /// Arrows attached to the target are re-anchored before anything is painted.
    ///
    /// For an arrow, `pos` is the new tip; the tail stays put.
    pub fn move_to(&mut self, target: EntityId, pos: Vec2) -> Result<()> {
        self.get(target)?;
        self.reposition(target, pos);
        Ok(())
    }

    fn reposition(&mut self, target: EntityId, pos: Vec2) {
        let Some(entity) = self.entities.get_mut(target) else {
            return;
        };
        match entity.arrow_mut() {
            Some(arrow) => {
                arrow.end_position = pos;
                self.sync_line(target);
            }
            None => {
                entity.position = pos;
                self.update_line_positions(target);
            }
        }
        self.redraw_all();
    }

    /// Moves an entity by `delta`.
    pub fn move_by(&mut self, target: EntityId, delta: Vec2) -> Result<()> {
        let entity = self.get(target)?;
        let current = entity.arrow().map_or(entity.position, |a| a.end_position);
        self.move_to(target, current + delta)
    }

    /// Raises an entity to the top of the paint order and repaints.
    pub fn bring_to_front(&mut self, id: EntityId) -> Result<()> {
        self.get(id)?;
        self.order.retain(|&other| other != id);
        self.order.push(id);
        self.redraw_all();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------------

    /// Removes an entity, every arrow attached to it, and repaints.
    ///
    /// Returns the ids that were removed, the target first.
    pub fn remove(&mut self, target: EntityId) -> Result<Vec<EntityId>> {
        let removed = self.unlink(target)?;
        self.redraw_all();
        Ok(removed)
    }

    /// Cancels an arrow (e.g. one being drawn that was dropped on empty space).
    pub fn abort(&mut self, arrow: EntityId) -> Result<()> {
        if self.get(arrow)?.arrow().is_none() {
            return Err(SceneError::NotAnArrow(arrow));
        }
        self.remove(arrow).map(|_| ())
    }

    fn unlink(&mut self, target: EntityId) -> Result<Vec<EntityId>> {
        let entity = self.get(target)?;
        let lines = entity.connected_lines.clone();
        let mut removed = vec![target];

        self.order.retain(|&id| id != target);

        for line in lines {
            self.order.retain(|&id| id != line);
            self.detach_arrow(line);
            if self.entities.remove(line).is_some() {
                self.forget(line);
                removed.push(line);
            }
        }

        self.detach_arrow(target);
        self.entities.remove(target);
        self.forget(target);

        tracing::debug!(entity = ?target, cascaded = removed.len() - 1, "entity removed");
        Ok(removed)
    }

    /// Drops everything keyed by a removed entity.
    fn forget(&mut self, id: EntityId) {
        self.anchor_overrides.remove(id);
        self.draw_callbacks.remove(id);
        self.events.forget_entity(id);
        self.pointer.forget_entity(id);
    }

    // ---------------------------------------------------------------------
    // Style mutation and batched redraw
    // ---------------------------------------------------------------------

    /// Applies a style patch. If anything changed, a redraw is scheduled for the next
    /// frame. Returns whether the style changed.
    pub fn set_style(&mut self, id: EntityId, patch: &StylePatch) -> Result<bool> {
        let changed = patch.apply(&mut self.get_mut(id)?.style);
        if changed {
            self.schedule_redraw(id);
        }
        Ok(changed)
    }

    /// Replaces a box's label and schedules a redraw.
    pub fn set_text(&mut self, id: EntityId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let entity = self.get_mut(id)?;
        if entity.text != text {
            entity.text = text;
            self.schedule_redraw(id);
        }
        Ok(())
    }

    /// Shows or hides an entity and schedules a redraw.
    pub fn set_displayed(&mut self, id: EntityId, displayed: bool) -> Result<()> {
        let entity = self.get_mut(id)?;
        if entity.displayed() != displayed {
            entity.flags.set(EntityFlags::HIDDEN, !displayed);
            self.schedule_redraw(id);
        }
        Ok(())
    }

    /// Moves an arrow's head along its curve and schedules a redraw.
    pub fn set_ratio(&mut self, arrow: EntityId, ratio: f32) -> Result<()> {
        let data = self
            .get_mut(arrow)?
            .arrow_mut()
            .ok_or(SceneError::NotAnArrow(arrow))?;
        data.ratio = layout::clamp_ratio(ratio);
        self.schedule_redraw(arrow);
        Ok(())
    }

    /// Queues a full repaint for the next frame, coalesced per entity.
    pub fn schedule_redraw(&mut self, key: EntityId) {
        self.batch.add(|scene: &mut Scene<S>| scene.redraw_all(), Some(key));
    }

    /// Queues an arbitrary scene callback for the next frame.
    pub fn defer(&mut self, callback: impl FnOnce(&mut Scene<S>) + 'static, key: Option<EntityId>) {
        self.batch.add(callback, key);
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_callbacks(&self) -> usize {
        self.batch.len()
    }

    /// The frame the batch is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.batch.pending_frame()
    }

    /// Runs the queued callbacks. Call this when the host's animation tick `handle`
    /// fires. Returns how many callbacks ran; stale handles run nothing.
    pub fn run_frame(&mut self, handle: FrameHandle) -> usize {
        let Some(callbacks) = self.batch.take_frame(handle) else {
            return 0;
        };
        let count = callbacks.len();
        tracing::debug!(?handle, count, "running batched frame");
        for callback in callbacks {
            callback(self);
        }
        count
    }

    /// Registers a hook that runs after `id` is painted.
    pub fn add_draw_callback(
        &mut self,
        id: EntityId,
        callback: impl FnMut(&Entity, &mut S) + 'static,
    ) -> Result<()> {
        self.get(id)?;
        match self.draw_callbacks.get_mut(id) {
            Some(list) => list.push(Box::new(callback)),
            None => {
                self.draw_callbacks.insert(id, vec![Box::new(callback)]);
            }
        }
        Ok(())
    }

    pub(crate) fn set_flag(&mut self, id: EntityId, flag: EntityFlags, on: bool) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.flags.set(flag, on);
        }
    }
}
