/// A collaborator that can report whether it is reachable.
///
/// Kept apart from the component contracts so health reporting can be composed
/// over any backend without widening them.
#[async_trait::async_trait]
pub trait Liveness: Send + Sync {
    async fn is_alive(&self) -> bool;
}
