use serenity::async_trait;
use songbird::tracks::PlayMode;
use tracing::debug;

use super::player::TrackEndSignal;

/// Event handler for when a track ends or errors. Forwards the event to the
/// guild's player task.
pub struct TrackEndNotifier {
    signal: TrackEndSignal,
}

impl TrackEndNotifier {
    pub fn new(signal: TrackEndSignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            let error = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(e.to_string()),
                _ => None,
            });
            debug!(
                "Track event for generation {} (error: {:?})",
                self.signal.generation(),
                error
            );
            self.signal.send(error).await;
        }
        None
    }
}
