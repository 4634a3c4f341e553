mod attention;
mod clock;
mod debounce;
mod multiplicity;
mod objects;
mod presence;
mod scheduler;
mod session;

pub use attention::AttentionTimer;
pub use clock::SessionClock;
pub use debounce::{DebounceTimer, TimerState};
pub use multiplicity::MultiplicityGate;
pub use objects::ObjectFlagEvaluator;
pub use presence::PresenceTimer;
pub use scheduler::{MonitorHandle, SamplingScheduler};
pub use session::{AxisStates, MonitorSession, SessionOutcome};
