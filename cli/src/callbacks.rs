//! Guide callbacks shipped with the CLI, available to guides as `func` actions.

use warden_core::guide::{CallbackRegistry, TextAction, TextKind};

/// Seconds counted down by `countdown`.
const COUNTDOWN_FROM: u64 = 3;

pub fn builtin() -> CallbackRegistry {
    let mut callbacks = CallbackRegistry::new();

    // "3", "2", "1" one second apart, starting when the callback fires
    callbacks.register("countdown", |handler, _action, _entity| {
        for (step, remaining) in (1..=COUNTDOWN_FROM).rev().enumerate() {
            handler.schedule(&TextAction::new(
                TextKind::Message,
                remaining.to_string(),
                step as u64 * 1000,
            ));
        }
    });

    callbacks
}
