// src/session/registry.rs

use super::Session;
use crate::common::hal_traits::{ScipInstant, ScipSerial, ScipTimer};
use alloc::collections::BTreeMap;
use core::fmt::Debug;

/// Handle identifying one registered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SensorId(u32);

impl core::fmt::Display for SensorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sensor#{}", self.0)
    }
}

/// Owns the open sessions of a multi-sensor setup and hands out stable
/// handles to them. Removing a session yields it back so the caller can
/// close it properly; dropping the registry just drops the sessions.
#[derive(Debug)]
pub struct SensorRegistry<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    sessions: BTreeMap<SensorId, Session<IF>>,
    next_id: u32,
}

impl<IF> SensorRegistry<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    pub fn new() -> Self {
        SensorRegistry {
            sessions: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Adds a session and returns its handle. Handles are never reused,
    /// so a stale handle cannot silently address a different sensor.
    pub fn register(&mut self, session: Session<IF>) -> SensorId {
        let id = SensorId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, session);
        log::debug!("{} registered", id);
        id
    }

    pub fn get_mut(&mut self, id: SensorId) -> Option<&mut Session<IF>> {
        self.sessions.get_mut(&id)
    }

    /// Takes a session out of the registry, e.g. to close it.
    pub fn remove(&mut self, id: SensorId) -> Option<Session<IF>> {
        self.sessions.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.sessions.keys().copied()
    }
}

impl<IF> Default for SensorRegistry<IF>
where
    IF: ScipSerial + ScipTimer,
    IF::Error: Debug,
    IF::Instant: ScipInstant,
{
    fn default() -> Self {
        Self::new()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{frame_bytes, MockInterface};

    #[test]
    fn register_and_lookup() {
        let mut registry = SensorRegistry::new();
        assert!(registry.is_empty());

        let a = registry.register(Session::open(MockInterface::new()));
        let b = registry.register(Session::open(MockInterface::new()));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.get_mut(a).is_some());
        assert!(registry.get_mut(b).is_some());
    }

    #[test]
    fn removed_session_is_usable_and_handle_goes_stale() {
        let mut registry = SensorRegistry::new();
        let mut mock = MockInterface::new();
        mock.script_response(&frame_bytes(b"BM", b"00", &[]));
        let id = registry.register(Session::open(mock));

        let mut session = registry.remove(id).unwrap();
        assert!(registry.get_mut(id).is_none());
        assert!(registry.remove(id).is_none());

        session.set_laser(true).unwrap();
        assert!(session.state().laser_on);
    }

    #[test]
    fn handles_are_never_reused() {
        let mut registry = SensorRegistry::new();
        let a = registry.register(Session::open(MockInterface::new()));
        registry.remove(a);
        let b = registry.register(Session::open(MockInterface::new()));
        assert_ne!(a, b);
    }

    #[test]
    fn ids_iterates_registered_handles() {
        let mut registry = SensorRegistry::new();
        let a = registry.register(Session::open(MockInterface::new()));
        let b = registry.register(Session::open(MockInterface::new()));
        let ids: alloc::vec::Vec<_> = registry.ids().collect();
        assert_eq!(ids, alloc::vec![a, b]);
    }
}
