//! Per-entity and per-room notification surfaces.
//!
//! Every method has a default so implementors only override what they
//! react to. Handlers receive the frame [`Context`] and the identifier of
//! the entity they belong to.

use crate::api::context::Context;
use crate::api::error::EventResult;
use crate::api::types::{Activity, EntityId, Key, Side};
use crate::input::queue::InputEvent;

/// Behaviour attached to an entity at creation time.
pub trait Behavior {
    /// Raised once when the entity joins the room.
    fn create(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    /// Raised once when the entity is removed by `destroy`.
    fn destroy(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn begin_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    /// Runs after automatic movement, before collisions.
    fn step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn end_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn inactive_begin_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn inactive_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn inactive_end_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    /// Automatic movement for active entities. Override to replace the
    /// default `pos += velocity * delta_mult`.
    fn update_position(&mut self, ctx: &mut Context, me: EntityId) -> EventResult {
        let delta_mult = ctx.frame.delta_mult;
        if let Some(entity) = ctx.entities.get_mut(me) {
            entity.integrate(delta_mult);
        }
        Ok(())
    }

    /// An alarm reached zero. It has already been cleared; call
    /// `ctx.set_alarm` again to re-arm it.
    fn alarm(&mut self, _ctx: &mut Context, _me: EntityId, _id: &Key) -> EventResult {
        Ok(())
    }

    /// The sprite animation completed a cycle.
    fn animation_end(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
        Ok(())
    }

    fn input(&mut self, _ctx: &mut Context, _me: EntityId, _event: &InputEvent) -> EventResult {
        Ok(())
    }

    fn inactive_input(
        &mut self,
        _ctx: &mut Context,
        _me: EntityId,
        _event: &InputEvent,
    ) -> EventResult {
        Ok(())
    }

    /// Collision with no clear entry side, including collisions that were
    /// already happening last frame.
    fn collision(&mut self, _ctx: &mut Context, _me: EntityId, _other: EntityId) -> EventResult {
        Ok(())
    }

    fn collision_left(&mut self, ctx: &mut Context, me: EntityId, other: EntityId) -> EventResult {
        self.collision(ctx, me, other)
    }

    fn collision_right(&mut self, ctx: &mut Context, me: EntityId, other: EntityId) -> EventResult {
        self.collision(ctx, me, other)
    }

    fn collision_top(&mut self, ctx: &mut Context, me: EntityId, other: EntityId) -> EventResult {
        self.collision(ctx, me, other)
    }

    fn collision_bottom(&mut self, ctx: &mut Context, me: EntityId, other: EntityId) -> EventResult {
        self.collision(ctx, me, other)
    }
}

/// An entity with no behaviour of its own.
impl Behavior for () {}

/// Room-level notifications.
pub trait RoomBehavior {
    fn room_start(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn room_end(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn begin_step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn end_step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    /// Each input event, after the game and before the room's entities.
    fn input(&mut self, _ctx: &mut Context, _event: &InputEvent) -> EventResult {
        Ok(())
    }
}

impl RoomBehavior for () {}

/// The three synchronized phases of a frame that every entity sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Begin,
    Step,
    End,
}

// Dispatch tables: the (activity, event) pair picks the notification that
// fires, so the scheduler never branches on activity itself.

pub(crate) fn step_event_name(activity: Activity, phase: StepPhase) -> &'static str {
    match (activity, phase) {
        (Activity::Active, StepPhase::Begin) => "begin_step",
        (Activity::Active, StepPhase::Step) => "step",
        (Activity::Active, StepPhase::End) => "end_step",
        (Activity::Inactive, StepPhase::Begin) => "inactive_begin_step",
        (Activity::Inactive, StepPhase::Step) => "inactive_step",
        (Activity::Inactive, StepPhase::End) => "inactive_end_step",
    }
}

pub(crate) fn dispatch_step(
    behavior: &mut dyn Behavior,
    activity: Activity,
    phase: StepPhase,
    ctx: &mut Context,
    me: EntityId,
) -> EventResult {
    match (activity, phase) {
        (Activity::Active, StepPhase::Begin) => behavior.begin_step(ctx, me),
        (Activity::Active, StepPhase::Step) => behavior.step(ctx, me),
        (Activity::Active, StepPhase::End) => behavior.end_step(ctx, me),
        (Activity::Inactive, StepPhase::Begin) => behavior.inactive_begin_step(ctx, me),
        (Activity::Inactive, StepPhase::Step) => behavior.inactive_step(ctx, me),
        (Activity::Inactive, StepPhase::End) => behavior.inactive_end_step(ctx, me),
    }
}

pub(crate) fn input_event_name(activity: Activity) -> &'static str {
    match activity {
        Activity::Active => "input",
        Activity::Inactive => "inactive_input",
    }
}

pub(crate) fn dispatch_input(
    behavior: &mut dyn Behavior,
    activity: Activity,
    ctx: &mut Context,
    me: EntityId,
    event: &InputEvent,
) -> EventResult {
    match activity {
        Activity::Active => behavior.input(ctx, me, event),
        Activity::Inactive => behavior.inactive_input(ctx, me, event),
    }
}

pub(crate) fn collision_event_name(side: Option<Side>) -> &'static str {
    match side {
        None => "collision",
        Some(Side::Left) => "collision_left",
        Some(Side::Right) => "collision_right",
        Some(Side::Top) => "collision_top",
        Some(Side::Bottom) => "collision_bottom",
    }
}

pub(crate) fn dispatch_collision(
    behavior: &mut dyn Behavior,
    side: Option<Side>,
    ctx: &mut Context,
    me: EntityId,
    other: EntityId,
) -> EventResult {
    match side {
        None => behavior.collision(ctx, me, other),
        Some(Side::Left) => behavior.collision_left(ctx, me, other),
        Some(Side::Right) => behavior.collision_right(ctx, me, other),
        Some(Side::Top) => behavior.collision_top(ctx, me, other),
        Some(Side::Bottom) => behavior.collision_bottom(ctx, me, other),
    }
}
