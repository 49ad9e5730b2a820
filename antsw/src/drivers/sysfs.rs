//! Linux sysfs GPIO driver.
//!
//! Drives pins through `<root>/export`, `<root>/gpioN/direction`,
//! `<root>/gpioN/value` and `<root>/unexport`. The root defaults to
//! `/sys/class/gpio` and is configurable so the driver can run against
//! a plain directory tree.

use antsw_common::consts::DEFAULT_SYSFS_GPIO_ROOT;
use antsw_common::hal::config::DriverConfig;
use antsw_common::hal::driver::{HalError, PinDriver};
use antsw_common::relay::PinRef;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Attempts at opening `direction` after export; udev may still be
/// fixing permissions on a freshly exported line.
const DIRECTION_RETRIES: u32 = 10;

/// Pause between direction attempts.
const DIRECTION_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Sysfs GPIO driver implementing the `PinDriver` trait.
pub struct SysfsDriver {
    root: PathBuf,
    /// Pins this driver configured, in claim order
    claimed: Vec<PinRef>,
}

impl SysfsDriver {
    /// Create a driver rooted at the default sysfs GPIO path.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_SYSFS_GPIO_ROOT)
    }

    /// Create a driver rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            claimed: Vec::new(),
        }
    }

    /// Sysfs root in use.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pin_dir(&self, pin: PinRef) -> PathBuf {
        self.root.join(format!("gpio{}", pin.0))
    }

    fn set_direction_out(&self, pin: PinRef) -> io::Result<()> {
        let path = self.pin_dir(pin).join("direction");
        let mut attempt = 0;
        loop {
            match fs::write(&path, "out") {
                Ok(()) => return Ok(()),
                Err(e)
                    if attempt + 1 < DIRECTION_RETRIES
                        && matches!(
                            e.kind(),
                            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                        ) =>
                {
                    attempt += 1;
                    std::thread::sleep(DIRECTION_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for SysfsDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for SysfsDriver {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &DriverConfig) -> Result<(), HalError> {
        if !config.sysfs_root.is_dir() {
            return Err(HalError::ConfigError(format!(
                "sysfs GPIO root {:?} is not a directory",
                config.sysfs_root
            )));
        }
        self.root = config.sysfs_root.clone();
        info!("sysfs driver using {:?}", self.root);
        Ok(())
    }

    fn configure_output(&mut self, pin: PinRef) -> Result<(), HalError> {
        let init_err = |reason: String| HalError::HardwareInit { pin, reason };

        if self.pin_dir(pin).is_dir() {
            debug!("{} already exported", pin);
        } else {
            fs::write(self.root.join("export"), pin.0.to_string())
                .map_err(|e| init_err(format!("export failed: {e}")))?;
        }

        self.set_direction_out(pin)
            .map_err(|e| init_err(format!("set direction failed: {e}")))?;

        if !self.claimed.contains(&pin) {
            self.claimed.push(pin);
        }
        debug!("{} configured as output", pin);
        Ok(())
    }

    fn write_pin(&mut self, pin: PinRef, high: bool) -> Result<(), HalError> {
        if !self.claimed.contains(&pin) {
            return Err(HalError::HardwarePin {
                pin,
                reason: "not configured as output".to_string(),
            });
        }
        fs::write(self.pin_dir(pin).join("value"), if high { "1" } else { "0" }).map_err(|e| {
            HalError::HardwarePin {
                pin,
                reason: e.to_string(),
            }
        })
    }

    fn release_all(&mut self) {
        for pin in self.claimed.drain(..) {
            if let Err(e) = fs::write(self.root.join("unexport"), pin.0.to_string()) {
                warn!("Failed to unexport {}: {}", pin, e);
            }
        }
    }
}

/// Factory function to create a sysfs driver instance.
pub fn create_driver() -> Box<dyn PinDriver> {
    Box::new(SysfsDriver::new())
}
