use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use warden_core::Effect;

/// Render an effect the way the REPL prints it.
pub fn describe(effect: &Effect) -> String {
    match effect {
        Effect::SpawnObject {
            object_id,
            item_id,
            amount,
            location,
        } => format!(
            "[spawn] object {object_id} item {item_id} x{amount} at ({:.1}, {:.1}, {:.1}) facing {:.2}",
            location.x, location.y, location.z, location.w
        ),
        Effect::DespawnObject {
            object_id,
            collected,
        } => format!("[despawn] object {object_id} collected={collected}"),
        Effect::PlaySound { sound_id } => format!("[sound] {sound_id}"),
        Effect::EventMessage { message, kind } => format!("[message:{kind}] {message}"),
        Effect::ChatNotification {
            channel,
            author,
            message,
        } => format!("[chat:{channel}] {author}: {message}"),
    }
}

/// Print effects to stdout as they arrive.
pub fn spawn_printer(mut rx: UnboundedReceiver<Effect>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(effect) = rx.recv().await {
            println!("{}", describe(&effect));
        }
    })
}
