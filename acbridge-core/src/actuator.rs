use crate::ac::AcState;

/// Boundary to the physical transmitter. Rendering is fire-and-forget:
/// retries and failure handling stay inside the implementation.
pub trait Actuator {
    fn render(&mut self, state: &AcState);
}
