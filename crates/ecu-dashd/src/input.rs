//! Button inputs
//!
//! Inputs are polled. `is_active` reports the logical press state with any
//! active-low inversion already applied.

use std::io;
use std::path::{Path, PathBuf};

/// A polled binary input
pub trait InputPin: Send {
    fn is_active(&mut self) -> io::Result<bool>;
}

impl<P: InputPin + ?Sized> InputPin for Box<P> {
    fn is_active(&mut self) -> io::Result<bool> {
        (**self).is_active()
    }
}

/// GPIO exposed as a sysfs value file containing "0" or "1"
///
/// Each sample is a blocking read on the runtime thread. Sysfs GPIO reads are
/// served from kernel memory and return in microseconds.
#[derive(Debug, Clone)]
pub struct SysfsPin {
    path: PathBuf,
    active_low: bool,
}

impl SysfsPin {
    pub fn new(path: impl AsRef<Path>, active_low: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            active_low,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InputPin for SysfsPin {
    fn is_active(&mut self) -> io::Result<bool> {
        let content = std::fs::read_to_string(&self.path)?;
        let high = match content.trim() {
            "0" => false,
            "1" => true,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected GPIO value {:?} in {}", other, self.path.display()),
                ))
            }
        };
        Ok(high != self.active_low)
    }
}

/// Stand-in for setups without a button
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPressed;

impl InputPin for NeverPressed {
    fn is_active(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin_file(value: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), value).unwrap();
        file
    }

    #[test]
    fn test_active_low() {
        let file = pin_file("0\n");
        let mut pin = SysfsPin::new(file.path(), true);
        assert!(pin.is_active().unwrap());

        std::fs::write(file.path(), "1\n").unwrap();
        assert!(!pin.is_active().unwrap());
    }

    #[test]
    fn test_active_high() {
        let file = pin_file("1");
        let mut pin = SysfsPin::new(file.path(), false);
        assert!(pin.is_active().unwrap());
    }

    #[test]
    fn test_garbage_value() {
        let file = pin_file("high");
        let mut pin = SysfsPin::new(file.path(), true);
        let err = pin.is_active().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_missing_file() {
        let mut pin = SysfsPin::new("/nonexistent/gpio17/value", true);
        assert!(pin.is_active().is_err());
    }

    #[test]
    fn test_never_pressed() {
        assert!(!NeverPressed.is_active().unwrap());
    }
}
