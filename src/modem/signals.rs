//! Modem control-line bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of modem control lines.
///
/// Bit positions follow the Linux `TIOCM_*` layout so a raw `TIOCMGET`
/// reading on that platform maps one to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModemSignals(u32);

impl ModemSignals {
    /// Line enable.
    pub const LE: Self = Self(0x001);
    /// Data Terminal Ready.
    pub const DTR: Self = Self(0x002);
    /// Request To Send.
    pub const RTS: Self = Self(0x004);
    /// Secondary transmit.
    pub const ST: Self = Self(0x008);
    /// Secondary receive.
    pub const SR: Self = Self(0x010);
    /// Clear To Send.
    pub const CTS: Self = Self(0x020);
    /// Carrier detect.
    pub const CAR: Self = Self(0x040);
    /// Ring indicator.
    pub const RNG: Self = Self(0x080);
    /// Data Set Ready.
    pub const DSR: Self = Self(0x100);

    /// Lines listed in verbose readings, in display order.
    const REPORTED: [(Self, &'static str); 5] = [
        (Self::DTR, "DTR"),
        (Self::RTS, "RTS"),
        (Self::CTS, "CTS"),
        (Self::CAR, "CAR"),
        (Self::DSR, "DSR"),
    ];

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// No line is asserted. For a reading this means no signal information.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every line in `other` is asserted in `self`.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Short label for a set/clear request: `RTS`, `DTR`, `RTS+DTR`, or `NULL`.
    ///
    /// Only the two output lines are named; input lines in the mask are ignored.
    pub fn label(self) -> String {
        let names: Vec<&str> = [(Self::RTS, "RTS"), (Self::DTR, "DTR")]
            .iter()
            .filter(|(line, _)| self.contains(*line))
            .map(|(_, name)| *name)
            .collect();

        if names.is_empty() {
            "NULL".to_string()
        } else {
            names.join("+")
        }
    }
}

impl BitOr for ModemSignals {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModemSignals {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModemSignals {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::LowerHex for ModemSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Renders the reported lines as `(DTR|RTS|CTS)`; `()` when none are set.
impl fmt::Display for ModemSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let mut first = true;
        for (line, name) in Self::REPORTED {
            if self.contains(line) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_reported_lines_in_order() {
        let reading = ModemSignals::CTS | ModemSignals::DTR | ModemSignals::RTS;
        assert_eq!(reading.to_string(), "(DTR|RTS|CTS)");
        assert_eq!(ModemSignals::empty().to_string(), "()");
    }

    #[test]
    fn test_display_ignores_unreported_lines() {
        let reading = ModemSignals::LE | ModemSignals::RNG | ModemSignals::DSR;
        assert_eq!(reading.to_string(), "(DSR)");
    }

    #[test]
    fn test_hex_rendering() {
        let reading = ModemSignals::DTR | ModemSignals::RTS | ModemSignals::CTS;
        assert_eq!(format!("{:x}", reading), "26");
    }

    #[test]
    fn test_label() {
        assert_eq!(ModemSignals::RTS.label(), "RTS");
        assert_eq!(ModemSignals::DTR.label(), "DTR");
        assert_eq!((ModemSignals::DTR | ModemSignals::RTS).label(), "RTS+DTR");
        assert_eq!(ModemSignals::empty().label(), "NULL");
        assert_eq!((ModemSignals::RTS | ModemSignals::CTS).label(), "RTS");
        assert_eq!((ModemSignals::CTS | ModemSignals::DSR).label(), "NULL");
    }

    #[test]
    fn test_contains_and_mutation() {
        let mut lines = ModemSignals::CTS;
        assert!(lines.contains(ModemSignals::CTS));
        assert!(!lines.contains(ModemSignals::RTS));
        assert!(!lines.contains(ModemSignals::empty()));

        lines.insert(ModemSignals::RTS);
        assert!(lines.contains(ModemSignals::CTS | ModemSignals::RTS));

        lines.remove(ModemSignals::CTS);
        assert_eq!(lines, ModemSignals::RTS);
        assert_eq!((lines & ModemSignals::CTS).bits(), 0);
    }
}
