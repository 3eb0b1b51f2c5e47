/// Daemon lifecycle notifications
#[derive(Debug, Clone)]
pub enum Event {
    /// A shutdown frame was accepted; servers must stop and stay stopped
    Shutdown,
}
