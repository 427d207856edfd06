//! # Pointer Events
//!
//! The host forwards raw [`PointerInput`]s; the scene resolves them against its entities
//! and emits entity-level [`PointerEvent`]s to subscribers.
//!
//! The host surface only reports "the pointer moved", so hover and hover-out are
//! synthesized: hover-out fires when the previously hovered entity stops being the
//! resolved target on a later move.

use glam::Vec2;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SceneError};
use crate::input::{PointerInput, PointerKind};
use crate::model::{EntityFlags, EntityId};
use crate::scene::Scene;
use crate::surface::Surface;

new_key_type! {
    /// Handle returned by [`Scene::on`], used to unsubscribe.
    pub struct SubscriptionId;
}

/// Entity-level pointer events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The pointer entered an entity.
    Hover,
    /// The pointer left the previously hovered entity.
    HoverOut,
    /// A click landed on an entity.
    Click,
    /// The pointer moved while over an entity.
    MouseMove,
    /// The pointer left the surface while over an entity.
    MouseOut,
}

/// An event delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: EventKind,
    /// The entity the event is about.
    pub entity: EntityId,
    /// Surface-local pointer position.
    pub pos: Vec2,
}

/// Subscriber callback. Gets the scene back so handlers can mutate it.
pub type EventCallback<S> = Box<dyn FnMut(&mut Scene<S>, &PointerEvent)>;

struct Subscription<S> {
    kind: EventKind,
    /// Only fire for this entity.
    entity: Option<EntityId>,
    /// `None` while the callback is running.
    callback: Option<EventCallback<S>>,
}

/// Registry of pointer-event subscribers.
pub(crate) struct EventHub<S> {
    subs: SlotMap<SubscriptionId, Subscription<S>>,
}

impl<S> Default for EventHub<S> {
    fn default() -> Self {
        Self {
            subs: SlotMap::with_key(),
        }
    }
}

impl<S> EventHub<S> {
    /// Drops subscriptions bound to a removed entity.
    pub(crate) fn forget_entity(&mut self, id: EntityId) {
        self.subs.retain(|_, sub| sub.entity != Some(id));
    }

    fn matching(&self, event: &PointerEvent) -> Vec<SubscriptionId> {
        self.subs
            .iter()
            .filter(|(_, sub)| {
                sub.kind == event.kind && sub.entity.is_none_or(|id| id == event.entity)
            })
            .map(|(key, _)| key)
            .collect()
    }
}

/// An in-progress drag of a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    pub entity: EntityId,
    /// Pointer position minus the box's position at grab time.
    pub grab_offset: Vec2,
}

/// Hover and drag state carried between pointer events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PointerState {
    pub(crate) hovered: Option<EntityId>,
    pub(crate) drag: Option<Drag>,
}

impl PointerState {
    pub(crate) fn forget_entity(&mut self, id: EntityId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.drag.is_some_and(|d| d.entity == id) {
            self.drag = None;
        }
    }
}

impl<S: Surface + 'static> Scene<S> {
    /// Subscribes to every event of `kind`.
    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&mut Scene<S>, &PointerEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribe(kind, None, Box::new(callback))
    }

    /// Subscribes to events of `kind` that target `entity` only.
    pub fn on_entity(
        &mut self,
        entity: EntityId,
        kind: EventKind,
        callback: impl FnMut(&mut Scene<S>, &PointerEvent) + 'static,
    ) -> Result<SubscriptionId> {
        if !self.contains(entity) {
            return Err(SceneError::NotFound(entity));
        }
        Ok(self.subscribe(kind, Some(entity), Box::new(callback)))
    }

    fn subscribe(
        &mut self,
        kind: EventKind,
        entity: Option<EntityId>,
        callback: EventCallback<S>,
    ) -> SubscriptionId {
        self.events.subs.insert(Subscription {
            kind,
            entity,
            callback: Some(callback),
        })
    }

    /// Removes one subscription.
    pub fn off(&mut self, subscription: SubscriptionId) -> Result<()> {
        self.events
            .subs
            .remove(subscription)
            .map(|_| ())
            .ok_or(SceneError::SubscriptionNotFound)
    }

    /// Removes every subscription for `kind`, returning how many were dropped.
    pub fn off_all(&mut self, kind: EventKind) -> usize {
        let before = self.events.subs.len();
        self.events.subs.retain(|_, sub| sub.kind != kind);
        before - self.events.subs.len()
    }

    /// The entity currently under the pointer, as of the last move.
    pub fn hovered(&self) -> Option<EntityId> {
        self.pointer.hovered
    }

    /// The drag in progress, if any.
    pub fn drag(&self) -> Option<Drag> {
        self.pointer.drag
    }

    /// Feeds one native pointer event through the resolver.
    ///
    /// Subscribers are called synchronously; the emitted events are also returned in
    /// dispatch order. Events whose entity was removed by an earlier handler are
    /// dropped.
    pub fn handle_pointer(&mut self, input: PointerInput) -> Vec<PointerEvent> {
        let PointerInput { kind, pos } = input;
        let mut events = Vec::new();

        match kind {
            PointerKind::Move => {
                if let Some(drag) = self.pointer.drag {
                    // The box may have been removed by a handler.
                    if self.move_to(drag.entity, pos - drag.grab_offset).is_err() {
                        self.pointer.drag = None;
                    }
                }

                let target = self.top_entity_at(pos);
                let previous = self.pointer.hovered;
                if previous != target {
                    if let Some(prev) = previous {
                        events.push(PointerEvent {
                            kind: EventKind::HoverOut,
                            entity: prev,
                            pos,
                        });
                    }
                    if let Some(entity) = target {
                        events.push(PointerEvent {
                            kind: EventKind::Hover,
                            entity,
                            pos,
                        });
                    }
                    self.pointer.hovered = target;
                }
                if let Some(entity) = target {
                    events.push(PointerEvent {
                        kind: EventKind::MouseMove,
                        entity,
                        pos,
                    });
                }
            }
            PointerKind::Down => {
                if let Some(entity) = self.top_box_at(pos)
                    && let Some(node) = self.entity(entity)
                {
                    let grab_offset = pos - node.position;
                    self.pointer.drag = Some(Drag {
                        entity,
                        grab_offset,
                    });
                    self.set_flag(entity, EntityFlags::DRAGGING, true);
                    tracing::debug!(?entity, "drag started");
                }
            }
            PointerKind::Up => {
                if let Some(drag) = self.pointer.drag.take() {
                    self.set_flag(drag.entity, EntityFlags::DRAGGING, false);
                    tracing::debug!(entity = ?drag.entity, "drag ended");
                }
            }
            PointerKind::Click => {
                if let Some(entity) = self.top_entity_at(pos) {
                    events.push(PointerEvent {
                        kind: EventKind::Click,
                        entity,
                        pos,
                    });
                }
            }
            PointerKind::Out => {
                if let Some(prev) = self.pointer.hovered.take() {
                    events.push(PointerEvent {
                        kind: EventKind::MouseOut,
                        entity: prev,
                        pos,
                    });
                    events.push(PointerEvent {
                        kind: EventKind::HoverOut,
                        entity: prev,
                        pos,
                    });
                }
            }
        }

        // A handler may remove the entity a later event targets.
        events.retain(|event| {
            if !self.contains(event.entity) {
                return false;
            }
            self.dispatch(event);
            true
        });
        events
    }

    fn dispatch(&mut self, event: &PointerEvent) {
        for key in self.events.matching(event) {
            // Take the callback out so it can borrow the scene mutably.
            let Some(mut callback) = self
                .events
                .subs
                .get_mut(key)
                .and_then(|sub| sub.callback.take())
            else {
                continue;
            };
            callback(self, event);
            if let Some(sub) = self.events.subs.get_mut(key) {
                sub.callback = Some(callback);
            }
        }
    }
}
