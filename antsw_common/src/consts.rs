//! System-wide constants for the antenna switch workspace.
//!
//! Single source of truth for relay counts and default paths.

/// Number of relays managed by the configuration table.
pub const RELAY_COUNT: usize = 6;

/// Number of configurations shipped in the built-in table.
pub const CONFIGURATION_COUNT: usize = 5;

/// Canonical service name used in logs.
pub const SERVICE_NAME: &str = "antsw";

/// Default station configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/antsw/antsw.toml";

/// Default Linux sysfs GPIO root.
pub const DEFAULT_SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Default driver name.
pub const DEFAULT_DRIVER: &str = "sysfs";

/// Default dwell between steps of the relay identification walk.
pub const DEFAULT_IDENTIFY_DWELL_MS: u64 = 1000;
