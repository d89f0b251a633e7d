//! Simulator listener callbacks

use async_trait::async_trait;

/// Callbacks the rendering side registers on the simulator
#[async_trait]
pub trait SimulatorListener: Send + Sync {
    /// A message was appended to the transcript; JSON of the message
    async fn on_message_appended(&self, message_json: String);

    /// `true` when a reply is outstanding (typing indicator)
    async fn on_typing_changed(&self, typing: bool);

    /// The visitor hit the message ceiling
    async fn on_rate_limit_reached(&self, identifier: String);
}

/// No-op listener
pub struct EmptySimulatorListener;

#[async_trait]
impl SimulatorListener for EmptySimulatorListener {
    async fn on_message_appended(&self, _message_json: String) {}
    async fn on_typing_changed(&self, _typing: bool) {}
    async fn on_rate_limit_reached(&self, _identifier: String) {}
}
