//! Analysis settings.
use crate::bridges::validate_order;
use crate::error::BridgeError;

/// Bridge order used when none is given
pub const DEFAULT_ORDER: usize = 2;

/// Parameters shared by every entry of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Number of aromatic residues per bridge
    pub order: usize,
    /// Group bridge counts by top-level EC class
    pub group_by_ec: bool,
    /// Only use metal atoms as scalene triangle anchors
    pub metals_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            group_by_ec: false,
            metals_only: false,
        }
    }
}

impl Settings {
    /// Reject settings that would make the whole run meaningless.
    pub fn validate(&self) -> Result<(), BridgeError> {
        validate_order(self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.order, 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn low_order_rejected() {
        for order in [0, 1] {
            let settings = Settings {
                order,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(BridgeError::InvalidConfiguration(_))
            ));
        }
    }
}
