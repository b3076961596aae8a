use std::rc::Rc;

use glam::Vec2;

use crate::api::behavior::{Behavior, RoomBehavior};
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::geometry::Rect;
use crate::core::registry::Registry;

/// Rectangular window into a room, mapped onto a region of the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Top-left corner of the window in room coordinates.
    pub x: f32,
    pub y: f32,
    /// Top-left corner of the window on the display.
    pub xport: f32,
    pub yport: f32,
    pub width: f32,
    pub height: f32,
}

impl View {
    pub fn new(x: f32, y: f32, xport: f32, yport: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            xport,
            yport,
            width,
            height,
        }
    }

    /// A view taking all the display space right of and below its port.
    pub fn fill(x: f32, y: f32, xport: f32, yport: f32, display: Vec2) -> Self {
        Self::new(x, y, xport, yport, display.x - xport, display.y - yport)
    }

    /// Area of the room this view shows.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn room_to_screen(&self, p: Vec2) -> Vec2 {
        p - Vec2::new(self.x, self.y) + Vec2::new(self.xport, self.yport)
    }

    pub fn screen_to_room(&self, p: Vec2) -> Vec2 {
        p - Vec2::new(self.xport, self.yport) + Vec2::new(self.x, self.y)
    }

    /// Whether any part of `area` is inside the view.
    pub fn contains(&self, area: &Rect) -> bool {
        self.rect().overlaps(area)
    }
}

type Factory = Rc<dyn Fn() -> Box<dyn Behavior>>;

struct Declared {
    entity: Entity,
    make: Factory,
}

/// A bounded simulation space: its declared starting entities and views,
/// and the live state the scheduler runs while the room is active.
pub struct Room {
    pub width: f32,
    pub height: f32,
    declared: Vec<Declared>,
    declared_views: Vec<View>,
    pub(crate) registry: Registry,
    pub(crate) views: Vec<View>,
    pub(crate) behavior: Option<Box<dyn RoomBehavior>>,
    started: bool,
}

impl Room {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            declared: Vec::new(),
            declared_views: Vec::new(),
            registry: Registry::new(),
            views: Vec::new(),
            behavior: Some(Box::new(())),
            started: false,
        }
    }

    // -- Builder pattern --

    /// Declare an entity that exists whenever the room is (re)started.
    /// `make` builds a fresh behaviour for each start.
    pub fn with_entity<B, F>(mut self, entity: Entity, make: F) -> Self
    where
        B: Behavior + 'static,
        F: Fn() -> B + 'static,
    {
        self.declared.push(Declared {
            entity,
            make: Rc::new(move || Box::new(make()) as Box<dyn Behavior>),
        });
        self
    }

    /// Declare a view. Without any, the room gets one view filling the display.
    pub fn with_view(mut self, view: View) -> Self {
        self.declared_views.push(view);
        self
    }

    pub fn with_behavior(mut self, behavior: impl RoomBehavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Add an entity to the room's live state. It joins at the next frame
    /// boundary; it is not part of the declared set.
    pub fn add(&mut self, entity: Entity, behavior: impl Behavior + 'static) -> EntityId {
        self.registry.create(entity, Box::new(behavior))
    }

    pub fn entities(&self) -> &Registry {
        &self.registry
    }

    pub fn entities_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut Vec<View> {
        &mut self.views
    }

    /// Whether the room has been started at least once.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Discard the live state and queue the declared set again.
    pub(crate) fn reset(&mut self, display: Vec2) {
        self.registry.clear();
        self.views = if self.declared_views.is_empty() {
            vec![View::fill(0.0, 0.0, 0.0, 0.0, display)]
        } else {
            self.declared_views.clone()
        };
        for declared in &self.declared {
            self.registry
                .create(declared.entity.clone(), (declared.make)());
        }
        self.started = true;
    }
}
