//! Timeline playback of compiled commands

use std::collections::{HashMap, VecDeque};

use crate::compile::Evaluation;
use crate::defaults;
use crate::types::{Ratio, mix_f64};

use super::command::{Command, CommandKind, ExecutionContext, RenderState};
use super::renderer::Renderer;

/// Playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Seconds one command takes at speed 1
    pub base_duration: f64,
    /// Used when a line's speed is not positive
    pub default_speed: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_duration: defaults::BASE_DURATION,
            default_speed: defaults::DEFAULT_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: u32,
    ratio: f64,
}

/// Owns the renderer and one [`ExecutionContext`] per live command.
///
/// Commands from an [`Evaluation`] are queued on a sequential timeline and
/// drawn one after another as [`Controller::tick`] advances time.
pub struct Controller<R: Renderer> {
    renderer: R,
    config: ControllerConfig,
    commands: HashMap<u32, Command>,
    contexts: HashMap<u32, ExecutionContext>,
    /// Statement name to id, for effect targets
    names: HashMap<String, u32>,
    timeline: VecDeque<Entry>,
}

impl<R: Renderer> Controller<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, ControllerConfig::default())
    }

    pub fn with_config(renderer: R, config: ControllerConfig) -> Self {
        Self {
            renderer,
            config,
            commands: HashMap::new(),
            contexts: HashMap::new(),
            names: HashMap::new(),
            timeline: VecDeque::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn state(&self, id: u32) -> Option<RenderState> {
        self.contexts.get(&id).map(ExecutionContext::state)
    }

    pub fn context(&self, id: u32) -> Option<&ExecutionContext> {
        self.contexts.get(&id)
    }

    /// True when nothing is waiting on the timeline
    pub fn is_idle(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Bring the drawing in line with a new evaluation.
    ///
    /// Output of dirty commands and of commands the evaluation no longer
    /// produces (removed lines, and every line from a failing index on) is
    /// torn down. Clean commands keep their output.
    pub fn apply(&mut self, evaluation: &Evaluation) {
        let stale: Vec<u32> = self
            .contexts
            .keys()
            .copied()
            .filter(|id| evaluation.dirty.contains(id) || evaluation.command(*id).is_none())
            .collect();
        for id in stale {
            self.teardown(id);
        }

        self.commands = evaluation.commands.iter().map(|c| (c.id, c.clone())).collect();
        self.names = evaluation.names.clone();

        for command in &evaluation.commands {
            if self.contexts.contains_key(&command.id) {
                if evaluation.restyled.contains(&command.id) {
                    if let Some(cx) = self.contexts.get_mut(&command.id) {
                        cx.restyle(command, &mut self.renderer);
                    }
                }
                continue;
            }
            self.contexts.insert(command.id, ExecutionContext::new(command.id));
            self.timeline.push_back(Entry {
                id: command.id,
                ratio: 0.0,
            });
        }
        crate::log::debug!(
            commands = self.commands.len(),
            queued = self.timeline.len(),
            failed = evaluation.error.is_some(),
            "applied evaluation"
        );
    }

    fn teardown(&mut self, id: u32) {
        self.timeline.retain(|e| e.id != id);
        let Some(mut cx) = self.contexts.remove(&id) else {
            return;
        };
        // an effect hands its target back the opacity it found
        if let (Some(from), Some(Command {
            kind: CommandKind::Effect(effect),
            ..
        })) = (cx.effect_from, self.commands.get(&id))
        {
            let target = self.names.get(&effect.effect.target).copied();
            if let Some(target) = target.and_then(|t| self.contexts.get_mut(&t)) {
                target.set_opacity(from, &mut self.renderer);
            }
        }
        cx.teardown(&mut self.renderer);
        crate::log::debug!(id, "torn down");
    }

    /// Advance playback by `dt` seconds. Time left over when a command
    /// finishes carries into the next one. Returns true while work remains.
    pub fn tick(&mut self, dt: f64) -> bool {
        let mut budget = dt.max(0.0);
        while let Some(mut entry) = self.timeline.pop_front() {
            let rate = self.rate(entry.id);
            let needed = (1.0 - entry.ratio) / rate;
            if budget < needed {
                entry.ratio += budget * rate;
                self.draw(entry.id, Ratio::clamped(entry.ratio));
                self.timeline.push_front(entry);
                return true;
            }
            budget -= needed;
            self.draw(entry.id, Ratio::ONE);
        }
        false
    }

    /// Draw every queued command to completion at once.
    pub fn draw_all(&mut self) {
        while let Some(entry) = self.timeline.pop_front() {
            self.draw(entry.id, Ratio::ONE);
        }
    }

    /// Ratio gained per second for a command
    fn rate(&self, id: u32) -> f64 {
        let speed = self
            .commands
            .get(&id)
            .map(|c| c.style.speed)
            .filter(|s| *s > 0.0 && s.is_finite())
            .unwrap_or(self.config.default_speed);
        speed / self.config.base_duration.max(f64::EPSILON)
    }

    fn draw(&mut self, id: u32, ratio: Ratio) {
        let Some(command) = self.commands.get(&id) else {
            return;
        };
        if let CommandKind::Effect(effect) = &command.kind {
            let target = self.names.get(&effect.effect.target).copied();
            let current = target.and_then(|t| self.contexts.get(&t)).map(ExecutionContext::opacity);
            match (target, current) {
                (Some(target), Some(current)) => {
                    let from = match self.contexts.get_mut(&id) {
                        Some(cx) => *cx.effect_from.get_or_insert(current),
                        None => current,
                    };
                    let opacity = mix_f64(from, effect.effect.opacity, ratio.raw());
                    if let Some(cx) = self.contexts.get_mut(&target) {
                        cx.set_opacity(opacity, &mut self.renderer);
                    }
                }
                _ => {
                    crate::log::warn!(target = %effect.effect.target, "effect target has no output");
                }
            }
        }
        if let Some(cx) = self.contexts.get_mut(&id) {
            cx.draw(command, ratio, &mut self.renderer);
        }
    }
}
