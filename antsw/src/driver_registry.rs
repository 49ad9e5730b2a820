//! Pin driver lookup by name.
//!
//! The binary picks a backend from `--driver`, `--simulate` or the
//! `[driver]` table; this maps that name to a constructor. One registry is
//! built in `main` and dropped once the engine owns its driver.

use antsw_common::hal::driver::{DriverFactory, HalError, PinDriver};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::drivers::register_all_drivers;

/// Driver names mapped to their constructors.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Registry with no drivers.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry holding `simulation` and `sysfs`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_all_drivers(&mut registry);
        registry
    }

    /// Add a backend under `name`.
    ///
    /// # Panics
    /// Two backends under one name is a wiring bug in `register_all_drivers`.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        match self.factories.entry(name) {
            Entry::Occupied(_) => panic!("pin driver '{name}' registered twice"),
            Entry::Vacant(slot) => {
                slot.insert(factory);
            }
        }
    }

    /// Constructor registered under `name`.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Construct the backend registered under `name`.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` for a name nothing was registered under,
    /// typically a typo in `[driver] name`.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn PinDriver>, HalError> {
        self.get_factory(name)
            .map(|make| make())
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))
    }

    /// Registered names in alphabetical order, for the startup log.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antsw_common::relay::PinRef;

    struct TestDriver;

    impl PinDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn configure_output(&mut self, _pin: PinRef) -> Result<(), HalError> {
            Ok(())
        }

        fn write_pin(&mut self, _pin: PinRef, _high: bool) -> Result<(), HalError> {
            Ok(())
        }

        fn release_all(&mut self) {}
    }

    fn create_test_driver() -> Box<dyn PinDriver> {
        Box::new(TestDriver)
    }

    #[test]
    fn registry_register_and_create() {
        let mut reg = DriverRegistry::new();
        reg.register("test_driver", create_test_driver);

        let driver = reg.create_driver("test_driver").expect("should create");
        assert_eq!(driver.name(), "test");
    }

    #[test]
    fn unknown_name_reported_verbatim() {
        let reg = DriverRegistry::with_builtin();
        match reg.create_driver("sysf") {
            Err(HalError::DriverNotFound(name)) => assert_eq!(name, "sysf"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(driver) => panic!("resolved to {}", driver.name()),
        }
        assert!(reg.get_factory("gpiod").is_none());
    }

    #[test]
    fn builtin_drivers_registered() {
        let reg = DriverRegistry::with_builtin();
        assert_eq!(reg.list_drivers(), vec!["simulation", "sysfs"]);
        assert_eq!(reg.create_driver("simulation").unwrap().name(), "simulation");
        assert_eq!(reg.create_driver("sysfs").unwrap().name(), "sysfs");
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn registry_duplicate_panics() {
        let mut reg = DriverRegistry::new();
        reg.register("dup", create_test_driver);
        reg.register("dup", create_test_driver);
    }
}
