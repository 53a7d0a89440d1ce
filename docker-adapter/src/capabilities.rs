//! Daemon capability probe, used at startup to decide which tools to register.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub engine: bool,
    pub swarm_manager: bool,
    pub swarm_worker_or_manager: bool,
}

impl Capabilities {
    pub fn engine_only() -> Self {
        Self {
            engine: true,
            swarm_manager: false,
            swarm_worker_or_manager: false,
        }
    }

    pub fn satisfies(&self, required: &str) -> bool {
        match required {
            "engine" => self.engine,
            "swarm-manager" => self.swarm_manager,
            "swarm-worker-or-manager" => self.swarm_worker_or_manager,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_only_satisfies_engine_but_not_swarm() {
        let caps = Capabilities::engine_only();
        assert!(caps.satisfies("engine"));
        assert!(!caps.satisfies("swarm-manager"));
        assert!(!caps.satisfies("swarm-worker-or-manager"));
    }

    #[test]
    fn test_swarm_manager_satisfies_all_three() {
        let caps = Capabilities {
            engine: true,
            swarm_manager: true,
            swarm_worker_or_manager: true,
        };
        assert!(caps.satisfies("engine"));
        assert!(caps.satisfies("swarm-manager"));
        assert!(caps.satisfies("swarm-worker-or-manager"));
    }

    #[test]
    fn test_swarm_worker_does_not_satisfy_swarm_manager() {
        let caps = Capabilities {
            engine: true,
            swarm_manager: false,
            swarm_worker_or_manager: true,
        };
        assert!(!caps.satisfies("swarm-manager"));
        assert!(caps.satisfies("swarm-worker-or-manager"));
    }

    #[test]
    fn test_unknown_capability_name_is_never_satisfied() {
        let caps = Capabilities {
            engine: true,
            swarm_manager: true,
            swarm_worker_or_manager: true,
        };
        assert!(!caps.satisfies("not-a-real-capability"));
    }
}
