//! The frame scheduler.
//!
//! One call to [`Simulation::frame`] runs the whole pipeline for the active
//! room, in this order:
//!
//! 1. flush queued creations and destructions, remember frame-start positions
//! 2. begin-step (game, room, entities)
//! 3. input redistribution (game, room, then entities)
//! 4. position integration and animation for active entities
//! 5. step
//! 6. collision notifications, then pointer contacts
//! 7. end-step
//! 8. alarms
//! 9. `previous := frame start` for every entity
//! 10. flush again, then apply deferred room/game commands
//!
//! Notification handlers only ever see the world through a [`Context`];
//! anything that would restructure the world mid-frame is deferred.

use std::time::Duration;

use glam::Vec2;

use crate::api::behavior::{self, Behavior, RoomBehavior, StepPhase};
use crate::api::context::{Command, Context, FrameInfo};
use crate::api::error::{EngineError, EngineResult, EventResult};
use crate::api::game::{Game, GameConfig};
use crate::api::types::{Activity, EntityId};
use crate::components::entity::Entity;
use crate::core::collision;
use crate::core::registry::Registry;
use crate::core::room::Room;
use crate::core::time::{DeltaClock, FrameTimer};
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::state::InputState;
use crate::renderer::instance::RenderBuffer;
use crate::systems::{animation, render};

/// Runs a game: owns the rooms, the clock and the input queue.
pub struct Simulation<G: Game> {
    game: G,
    config: GameConfig,
    clock: DeltaClock,
    timer: FrameTimer,
    rooms: Vec<Room>,
    current: Option<usize>,
    input: InputQueue,
    held: InputState,
    commands: Vec<Command>,
    faults: Vec<EngineError>,
    frame: FrameInfo,
    mouse: Option<Vec2>,
    mouse_prev: Option<Vec2>,
    running: bool,
    paused: bool,
}

impl<G: Game> Simulation<G> {
    /// Build a simulation. The game's configuration is read once, here.
    pub fn new(game: G) -> Self {
        let config = game.config();
        let clock = DeltaClock::new(config.fps, config.delta, config.delta_min);
        Self {
            game,
            config,
            clock,
            timer: FrameTimer::new(),
            rooms: Vec::new(),
            current: None,
            input: InputQueue::new(),
            held: InputState::new(),
            commands: Vec::new(),
            faults: Vec::new(),
            frame: FrameInfo::default(),
            mouse: None,
            mouse_prev: None,
            running: false,
            paused: false,
        }
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Append a room and return its index.
    pub fn add_room(&mut self, room: Room) -> usize {
        self.rooms.push(room);
        self.rooms.len() - 1
    }

    // -- Lifecycle --

    /// Start the game in the first room.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.rooms.is_empty() {
            return Err(EngineError::room(0));
        }
        self.running = true;
        self.paused = false;
        self.frame = FrameInfo::default();
        self.timer.reset();
        self.commands.clear();
        self.held.clear();

        let display = self.display();
        self.current = Some(0);
        self.rooms[0].reset(display);
        log::debug!("game started");
        self.notify_game("game_start", |game, ctx| game.game_start(ctx));
        self.flush();
        self.notify_room("room_start", |room, ctx| room.room_start(ctx));
        Ok(())
    }

    /// End the game. The active room ends first. No further frames run.
    pub fn end(&mut self) {
        if !self.running {
            return;
        }
        self.notify_room("room_end", |room, ctx| room.room_end(ctx));
        self.notify_game("game_end", |game, ctx| game.game_end(ctx));
        self.running = false;
        self.paused = false;
        log::debug!("game ended after {} frames", self.frame.number);
    }

    pub fn pause(&mut self) {
        if self.running && !self.paused {
            log::debug!("paused");
            self.paused = true;
        }
    }

    pub fn unpause(&mut self) {
        if self.paused {
            log::debug!("unpaused");
            self.paused = false;
            // A long pause must not count as one giant frame.
            self.timer.reset();
        }
    }

    /// Restart room `index` from its declared state and make it active.
    pub fn start_room(&mut self, index: usize) -> EngineResult<()> {
        if index >= self.rooms.len() {
            return Err(EngineError::room(index));
        }
        self.leave_room();
        self.current = Some(index);
        let display = self.display();
        self.rooms[index].reset(display);
        log::debug!("room {index} started");
        self.flush();
        self.notify_room("room_start", |room, ctx| room.room_start(ctx));
        Ok(())
    }

    /// Make room `index` active without resetting it. A room that was
    /// never started is started instead.
    pub fn resume_room(&mut self, index: usize) -> EngineResult<()> {
        let Some(room) = self.rooms.get(index) else {
            return Err(EngineError::room(index));
        };
        if !room.is_started() {
            return self.start_room(index);
        }
        if self.current != Some(index) {
            self.leave_room();
            self.current = Some(index);
        }
        log::debug!("room {index} resumed");
        Ok(())
    }

    /// End the active room and start the next one, or end the game after
    /// the last room.
    pub fn end_room(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        if index + 1 < self.rooms.len() {
            if let Err(err) = self.start_room(index + 1) {
                log::warn!("cannot advance room: {err}");
            }
        } else {
            self.end();
        }
    }

    fn leave_room(&mut self) {
        if let Some(index) = self.current {
            self.notify_room("room_end", |room, ctx| room.room_end(ctx));
            log::debug!("room {index} ended");
        }
    }

    // -- Frames --

    /// Queue an input event for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame, measuring the time since the previous `tick`.
    pub fn tick(&mut self) {
        let time_passed = self.timer.lap(self.clock.frame_time());
        self.frame(time_passed);
    }

    /// Run one frame that took `time_passed` of wall time.
    pub fn frame(&mut self, time_passed: Duration) {
        if !self.running || self.current.is_none() {
            return;
        }
        if self.paused {
            self.paused_frame();
            return;
        }

        self.frame = FrameInfo {
            number: self.frame.number + 1,
            time_passed,
            delta_mult: self.clock.delta_mult(time_passed),
        };
        self.flush();
        let ids = self.begin_frame();
        log::trace!(
            "frame {} (delta_mult {:.3}, {} entities)",
            self.frame.number,
            self.frame.delta_mult,
            ids.len()
        );

        self.step_phase(StepPhase::Begin, &ids);
        self.dispatch_input(&ids);
        self.integrate(&ids);
        self.step_phase(StepPhase::Step, &ids);
        self.collide();
        self.step_phase(StepPhase::End, &ids);
        self.tick_alarms(&ids);
        self.commit_previous(&ids);

        self.flush();
        self.apply_commands();
    }

    fn paused_frame(&mut self) {
        for event in self.input.drain() {
            self.record_input(&event);
            self.notify_game("paused_input", |game, ctx| game.paused_input(ctx, &event));
        }
        self.apply_commands();
    }

    /// Snapshot the live set and record where each entity starts the frame.
    fn begin_frame(&mut self) -> Vec<EntityId> {
        let Some(registry) = self.registry_mut() else {
            return Vec::new();
        };
        for entity in registry.iter_mut() {
            entity.begin_frame();
        }
        registry.ids()
    }

    fn step_phase(&mut self, phase: StepPhase, ids: &[EntityId]) {
        match phase {
            StepPhase::Begin => {
                self.notify_game("begin_step", |game, ctx| game.begin_step(ctx));
                self.notify_room("room_begin_step", |room, ctx| room.begin_step(ctx));
            }
            StepPhase::Step => {
                self.notify_game("step", |game, ctx| game.step(ctx));
                self.notify_room("room_step", |room, ctx| room.step(ctx));
            }
            StepPhase::End => {
                self.notify_game("end_step", |game, ctx| game.end_step(ctx));
                self.notify_room("room_end_step", |room, ctx| room.end_step(ctx));
            }
        }

        for &id in ids {
            let Some(activity) = self.activity_of(id) else {
                continue;
            };
            self.notify_entity(id, behavior::step_event_name(activity, phase), |b, ctx| {
                behavior::dispatch_step(b, activity, phase, ctx, id)
            });
        }
    }

    fn dispatch_input(&mut self, ids: &[EntityId]) {
        for event in self.input.drain() {
            self.record_input(&event);
            self.notify_game("input", |game, ctx| game.input(ctx, &event));
            self.notify_room("room_input", |room, ctx| room.input(ctx, &event));
            for &id in ids {
                let Some(activity) = self.activity_of(id) else {
                    continue;
                };
                self.notify_entity(id, behavior::input_event_name(activity), |b, ctx| {
                    behavior::dispatch_input(b, activity, ctx, id, &event)
                });
            }
        }
    }

    /// Update the pointer and held-input state before anyone sees `event`.
    fn record_input(&mut self, event: &InputEvent) {
        if let InputEvent::MouseMove { x, y } = *event {
            self.mouse = Some(Vec2::new(x, y));
        }
        self.held.apply(event);
    }

    fn integrate(&mut self, ids: &[EntityId]) {
        for &id in ids {
            if self.activity_of(id) != Some(Activity::Active) {
                continue;
            }
            self.notify_entity(id, "update_position", |b, ctx| b.update_position(ctx, id));
        }

        let (fps, delta_mult) = (self.config.fps, self.frame.delta_mult);
        let ended = match self.registry_mut() {
            Some(registry) => animation::tick_animations(registry, ids, fps, delta_mult),
            None => Vec::new(),
        };
        for id in ended {
            self.notify_entity(id, "animation_end", |b, ctx| b.animation_end(ctx, id));
        }
    }

    fn collide(&mut self) {
        let contacts = match self.registry() {
            Some(registry) => collision::detect_contacts(registry),
            None => return,
        };
        for contact in contacts {
            let collision::Contact { entity, other, side } = contact;
            self.notify_entity(entity, behavior::collision_event_name(side), |b, ctx| {
                behavior::dispatch_collision(b, side, ctx, entity, other)
            });
        }

        let Some(now) = self.mouse else {
            return;
        };
        let prev = self.mouse_prev.unwrap_or(now);
        self.mouse_prev = Some(now);
        let touched = match self.registry() {
            Some(registry) => collision::pointer_contacts(registry, now, prev),
            None => return,
        };
        for (other, side) in touched {
            self.notify_game("mouse_collision", |game, ctx| game.mouse_collision(ctx, other, side));
        }
    }

    fn tick_alarms(&mut self, ids: &[EntityId]) {
        let amount = self.frame.delta_mult;
        for &id in ids {
            let fired = match self.registry_mut().and_then(|r| r.get_mut(id)) {
                Some(entity) => entity.alarms.tick(amount),
                None => continue,
            };
            for alarm in fired {
                self.notify_entity(id, "alarm", |b, ctx| b.alarm(ctx, id, &alarm));
            }
        }
    }

    fn commit_previous(&mut self, ids: &[EntityId]) {
        let Some(registry) = self.registry_mut() else {
            return;
        };
        for &id in ids {
            if let Some(entity) = registry.get_mut(id) {
                entity.commit_previous();
            }
        }
    }

    /// Resolve queued destructions and creations until nothing is left,
    /// firing `destroy` before removal and `create` after insertion.
    fn flush(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        for _ in 0..self.config.max_flush_rounds {
            if !self.rooms[index].registry.has_pending_work() {
                return;
            }

            let doomed = self.rooms[index].registry.doomed_live();
            for &id in &doomed {
                self.notify_entity(id, "destroy", |b, ctx| b.destroy(ctx, id));
            }
            self.rooms[index].registry.remove(&doomed);

            let created = self.rooms[index].registry.commit_pending();
            for &id in &created {
                self.notify_entity(id, "create", |b, ctx| b.create(ctx, id));
            }
        }
        if self.rooms[index].registry.has_pending_work() {
            log::warn!(
                "creation/destruction still pending after {} rounds; deferring to the next frame",
                self.config.max_flush_rounds
            );
        }
    }

    fn apply_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            if !self.running {
                break;
            }
            let result = match command {
                Command::StartRoom(index) => self.start_room(index),
                Command::ResumeRoom(index) => self.resume_room(index),
                Command::EndRoom => {
                    self.end_room();
                    Ok(())
                }
                Command::EndGame => {
                    self.end();
                    Ok(())
                }
                Command::Pause => {
                    self.pause();
                    Ok(())
                }
                Command::Unpause => {
                    self.unpause();
                    Ok(())
                }
            };
            if let Err(err) = result {
                log::warn!("{command:?} ignored: {err}");
            }
        }
    }

    // -- Notification plumbing --

    /// Build a context over the active room and hand it to `f`.
    fn with_context<R>(&mut self, f: impl FnOnce(&mut G, &mut Context) -> R) -> Option<R> {
        let index = self.current?;
        let Simulation {
            game,
            rooms,
            commands,
            config,
            frame,
            mouse,
            held,
            ..
        } = self;
        let room = rooms.get_mut(index)?;
        let room_size = room.size();
        let mut ctx = Context {
            entities: &mut room.registry,
            views: &mut room.views,
            frame: *frame,
            commands,
            config,
            room_index: index,
            room_size,
            mouse: *mouse,
            held,
        };
        Some(f(game, &mut ctx))
    }

    fn notify_game(&mut self, event: &'static str, f: impl FnOnce(&mut G, &mut Context) -> EventResult) {
        if let Some(Err(err)) = self.with_context(f) {
            self.report(None, event, err);
        }
    }

    fn notify_room(
        &mut self,
        event: &'static str,
        f: impl FnOnce(&mut dyn RoomBehavior, &mut Context) -> EventResult,
    ) {
        let Some(index) = self.current else {
            return;
        };
        let Some(mut handler) = self.rooms.get_mut(index).and_then(|r| r.behavior.take()) else {
            return;
        };
        let result = self.with_context(|_, ctx| f(handler.as_mut(), ctx));
        if let Some(room) = self.rooms.get_mut(index) {
            room.behavior = Some(handler);
        }
        if let Some(Err(err)) = result {
            self.report(None, event, err);
        }
    }

    fn notify_entity(
        &mut self,
        id: EntityId,
        event: &'static str,
        f: impl FnOnce(&mut dyn Behavior, &mut Context) -> EventResult,
    ) {
        let Some(index) = self.current else {
            return;
        };
        let Some(mut handler) = self.rooms[index].registry.take_behavior(id) else {
            return;
        };
        let result = self.with_context(|_, ctx| f(handler.as_mut(), ctx));
        self.rooms[index].registry.restore_behavior(id, handler);
        if let Some(Err(err)) = result {
            self.report(Some(id), event, err);
        }
    }

    fn report(&mut self, entity: Option<EntityId>, event: &'static str, source: anyhow::Error) {
        let fault = EngineError::NotificationFault { entity, event, source };
        log::warn!("{fault}");
        self.game.fault(&fault);
        self.faults.push(fault);
    }

    // -- Queries --

    fn display(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    fn activity_of(&self, id: EntityId) -> Option<Activity> {
        self.registry()?.get(id).map(|e| e.activity)
    }

    fn registry(&self) -> Option<&Registry> {
        self.room().map(|r| &r.registry)
    }

    fn registry_mut(&mut self) -> Option<&mut Registry> {
        self.room_mut().map(|r| &mut r.registry)
    }

    /// Queue an entity in the active room. It joins at the next frame boundary.
    pub fn create(&mut self, entity: Entity, behavior: impl Behavior + 'static) -> EngineResult<EntityId> {
        let registry = self.registry_mut().ok_or_else(|| EngineError::InvalidReference {
            what: "active room".into(),
        })?;
        Ok(registry.create(entity, Box::new(behavior)))
    }

    /// Mark an entity of the active room for destruction at the next frame boundary.
    pub fn destroy(&mut self, id: EntityId) -> EngineResult<()> {
        match self.registry_mut() {
            Some(registry) => registry.destroy(id),
            None => Err(EngineError::entity(id)),
        }
    }

    /// Entities of the active room.
    pub fn entities(&self) -> Option<&Registry> {
        self.registry()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry()?.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.registry_mut()?.get_mut(id)
    }

    /// The active room.
    pub fn room(&self) -> Option<&Room> {
        self.rooms.get(self.current?)
    }

    pub fn room_mut(&mut self) -> Option<&mut Room> {
        let index = self.current?;
        self.rooms.get_mut(index)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn current_room_index(&self) -> Option<usize> {
        self.current
    }

    /// Fill `buffer` with the draw list for view `view` of the active room.
    pub fn render(&self, view: usize, buffer: &mut RenderBuffer) -> EngineResult<()> {
        let room = self.room().ok_or_else(|| EngineError::InvalidReference {
            what: "active room".into(),
        })?;
        let view = room.views().get(view).ok_or_else(|| EngineError::InvalidReference {
            what: format!("view {view}"),
        })?;
        render::build_render_buffer(&room.registry, view, buffer);
        Ok(())
    }

    /// Handler failures collected since the last call.
    pub fn take_faults(&mut self) -> Vec<EngineError> {
        std::mem::take(&mut self.faults)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame_info(&self) -> FrameInfo {
        self.frame
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mouse(&self) -> Option<Vec2> {
        self.mouse
    }

    /// Keys and buttons held down as of the last drained input.
    pub fn input_state(&self) -> &InputState {
        &self.held
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Key;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every notification it receives, tagged with its name.
    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Recorder {
        fn push(&self, what: impl std::fmt::Display) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, what));
        }
    }

    impl Behavior for Recorder {
        fn create(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("create");
            Ok(())
        }
        fn destroy(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("destroy");
            Ok(())
        }
        fn begin_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("begin_step");
            Ok(())
        }
        fn step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("step");
            Ok(())
        }
        fn end_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("end_step");
            Ok(())
        }
        fn inactive_step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
            self.push("inactive_step");
            Ok(())
        }
        fn alarm(&mut self, _ctx: &mut Context, _me: EntityId, alarm: &Key) -> EventResult {
            self.push(format!("alarm {alarm}"));
            Ok(())
        }
        fn input(&mut self, _ctx: &mut Context, _me: EntityId, _event: &InputEvent) -> EventResult {
            self.push("input");
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Recorder {
        Recorder {
            name,
            log: Rc::clone(log),
        }
    }

    fn started(room: Room) -> Simulation<()> {
        let mut sim = Simulation::new(()).with_room(room);
        sim.start().unwrap();
        sim
    }

    #[test]
    fn start_requires_a_room() {
        let mut sim = Simulation::new(());
        assert!(sim.start().is_err());
        assert!(!sim.is_running());
    }

    /// Game and room handlers that log the frame phases they see.
    struct Tracer(Log);

    impl Game for Tracer {
        fn input(&mut self, _ctx: &mut Context, _event: &InputEvent) -> EventResult {
            self.0.borrow_mut().push("game:input".into());
            Ok(())
        }
    }

    impl RoomBehavior for Tracer {
        fn begin_step(&mut self, _ctx: &mut Context) -> EventResult {
            self.0.borrow_mut().push("room:begin_step".into());
            Ok(())
        }
        fn input(&mut self, _ctx: &mut Context, _event: &InputEvent) -> EventResult {
            self.0.borrow_mut().push("room:input".into());
            Ok(())
        }
        fn step(&mut self, _ctx: &mut Context) -> EventResult {
            self.0.borrow_mut().push("room:step".into());
            Ok(())
        }
    }

    #[test]
    fn phases_run_in_order() {
        let log: Log = Rc::default();
        let l = Rc::clone(&log);
        let room = Room::new(100.0, 100.0)
            .with_behavior(Tracer(Rc::clone(&log)))
            .with_entity(Entity::new(Vec2::ZERO), move || recorder("a", &l));
        let mut sim = Simulation::new(Tracer(Rc::clone(&log))).with_room(room);
        sim.start().unwrap();
        assert_eq!(*log.borrow(), vec!["a:create"]);

        log.borrow_mut().clear();
        sim.push_input(InputEvent::Close);
        sim.frame(Duration::from_millis(16));
        assert_eq!(
            *log.borrow(),
            vec![
                "room:begin_step",
                "a:begin_step",
                "game:input",
                "room:input",
                "a:input",
                "room:step",
                "a:step",
                "a:end_step",
            ]
        );
    }

    #[test]
    fn held_input_is_visible_to_handlers() {
        struct Watcher {
            seen: Rc<RefCell<Vec<bool>>>,
        }
        impl Behavior for Watcher {
            fn step(&mut self, ctx: &mut Context, _me: EntityId) -> EventResult {
                self.seen.borrow_mut().push(ctx.key_pressed("space"));
                Ok(())
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sim = started(Room::new(100.0, 100.0));
        sim.create(Entity::new(Vec2::ZERO), Watcher { seen: Rc::clone(&seen) })
            .unwrap();

        sim.push_input(InputEvent::KeyPress { key: "space".into(), ch: Some(' ') });
        sim.frame(Duration::ZERO);
        // Held keys persist across frames until released.
        sim.frame(Duration::ZERO);
        sim.push_input(InputEvent::KeyRelease { key: "space".into() });
        sim.frame(Duration::ZERO);

        assert_eq!(*seen.borrow(), vec![true, true, false]);
        assert!(!sim.input_state().key_pressed("space"));
    }

    #[test]
    fn inactive_entities_get_inactive_notifications() {
        let log: Log = Rc::default();
        let mut sim = started(Room::new(100.0, 100.0));
        sim.create(
            Entity::new(Vec2::ZERO).with_activity(Activity::Inactive),
            recorder("a", &log),
        )
        .unwrap();
        sim.frame(Duration::ZERO);
        assert_eq!(*log.borrow(), vec!["a:create", "a:inactive_step"]);
    }

    #[test]
    fn destroy_fires_once_at_frame_end() {
        let log: Log = Rc::default();
        let mut sim = started(Room::new(100.0, 100.0));
        let id = sim.create(Entity::new(Vec2::ZERO), recorder("a", &log)).unwrap();
        sim.frame(Duration::ZERO);
        log.borrow_mut().clear();

        sim.destroy(id).unwrap();
        sim.destroy(id).unwrap();
        assert!(sim.entity(id).is_some());
        sim.frame(Duration::ZERO);
        assert_eq!(*log.borrow(), vec!["a:destroy"]);
        assert!(sim.entity(id).is_none());
        assert!(sim.destroy(id).is_err());
    }

    #[test]
    fn alarms_fire_after_end_step() {
        let log: Log = Rc::default();
        let mut sim = started(Room::new(100.0, 100.0));
        let id = sim.create(Entity::new(Vec2::ZERO), recorder("a", &log)).unwrap();
        sim.frame(Duration::ZERO);
        sim.entity_mut(id).unwrap().alarms.set(Key::from(3), Some(1.0));
        log.borrow_mut().clear();

        sim.frame(Duration::ZERO);
        assert_eq!(
            *log.borrow(),
            vec!["a:begin_step", "a:step", "a:end_step", "a:alarm 3"]
        );
    }

    #[test]
    fn paused_frames_only_deliver_paused_input() {
        #[derive(Default)]
        struct Pauser {
            paused_inputs: usize,
        }
        impl Game for Pauser {
            fn paused_input(&mut self, ctx: &mut Context, _event: &InputEvent) -> EventResult {
                self.paused_inputs += 1;
                ctx.unpause();
                Ok(())
            }
        }

        let log: Log = Rc::default();
        let mut sim = Simulation::new(Pauser::default()).with_room(Room::new(10.0, 10.0));
        sim.start().unwrap();
        sim.create(Entity::new(Vec2::ZERO), recorder("a", &log)).unwrap();
        sim.frame(Duration::ZERO);
        log.borrow_mut().clear();

        sim.pause();
        sim.frame(Duration::ZERO);
        assert!(log.borrow().is_empty());
        assert!(sim.is_paused());

        sim.push_input(InputEvent::KeyPress { key: "p".into(), ch: Some('p') });
        sim.frame(Duration::ZERO);
        assert_eq!(sim.game().paused_inputs, 1);
        assert!(log.borrow().is_empty());
        assert!(!sim.is_paused());
    }

    #[test]
    fn end_room_advances_then_ends_game() {
        struct Ender;
        impl Behavior for Ender {
            fn step(&mut self, ctx: &mut Context, _me: EntityId) -> EventResult {
                ctx.end_room();
                Ok(())
            }
        }

        let mut sim = Simulation::new(())
            .with_room(Room::new(10.0, 10.0).with_entity(Entity::new(Vec2::ZERO), || Ender))
            .with_room(Room::new(20.0, 20.0).with_entity(Entity::new(Vec2::ZERO), || Ender));
        sim.start().unwrap();

        sim.frame(Duration::ZERO);
        assert_eq!(sim.current_room_index(), Some(1));
        assert!(sim.is_running());

        sim.frame(Duration::ZERO);
        assert!(!sim.is_running());
    }

    #[test]
    fn faults_are_reported_not_fatal() {
        struct Broken;
        impl Behavior for Broken {
            fn step(&mut self, _ctx: &mut Context, _me: EntityId) -> EventResult {
                anyhow::bail!("no fuel")
            }
        }

        let log: Log = Rc::default();
        let mut sim = started(Room::new(10.0, 10.0));
        let broken = sim.create(Entity::new(Vec2::ZERO), Broken).unwrap();
        sim.create(Entity::new(Vec2::ZERO), recorder("ok", &log)).unwrap();
        sim.frame(Duration::ZERO);

        assert!(log.borrow().contains(&"ok:step".to_string()));
        let faults = sim.take_faults();
        assert_eq!(faults.len(), 1);
        assert!(matches!(
            &faults[0],
            EngineError::NotificationFault { entity: Some(id), event: "step", .. } if *id == broken
        ));
        assert!(sim.take_faults().is_empty());
    }

    #[test]
    fn delta_timing_scales_motion() {
        struct Delta;
        impl Game for Delta {
            fn config(&self) -> GameConfig {
                GameConfig {
                    fps: 50.0,
                    delta: true,
                    delta_min: 5.0,
                    ..Default::default()
                }
            }
        }

        let mut sim = Simulation::new(Delta).with_room(Room::new(100.0, 100.0));
        sim.start().unwrap();
        let id = sim
            .create(Entity::new(Vec2::ZERO).with_velocity(Vec2::new(3.0, 0.0)), ())
            .unwrap();
        sim.frame(Duration::from_millis(40));
        assert!((sim.frame_info().delta_mult - 2.0).abs() < 1e-4);
        assert!((sim.entity(id).unwrap().pos.x - 6.0).abs() < 1e-3);
    }
}
