//! Configuration table: configuration identifier → relay target vector.
//!
//! Validated once at construction. A malformed table never reaches the
//! engine, so selection at runtime only has to look a row up.

use antsw_common::consts::RELAY_COUNT;
use antsw_common::relay::position::{BEAM, J_POLE, OFF, OMNI, ON, SDR_BUS, TS2K_BUS};
use antsw_common::relay::{ConfigurationId, RelayId};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Malformed configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Table has no rows.
    #[error("configuration table is empty")]
    Empty,

    /// A row does not have one entry per relay.
    #[error("configuration '{id}' has {actual} targets, expected {expected}")]
    WrongLength {
        /// Offending row
        id: ConfigurationId,
        /// Relay count
        expected: usize,
        /// Row length
        actual: usize,
    },

    /// Two rows share an identifier.
    #[error("configuration '{0}' defined twice")]
    Duplicate(ConfigurationId),

    /// Default configuration has no row.
    #[error("default configuration '{0}' is not in the table")]
    MissingDefault(ConfigurationId),
}

// Columns follow RelayId::ALL.
#[rustfmt::skip]
const BUILTIN_ROWS: [(ConfigurationId, &[bool]); 5] = [
    //                               70Pre 2mPre 2mBeam    70Beam    TS2KAnt SDRAnt
    (ConfigurationId::UvSatcom,      &[OFF, ON,  TS2K_BUS, TS2K_BUS, BEAM,   OMNI]),
    (ConfigurationId::VuSatcom,      &[ON,  OFF, TS2K_BUS, TS2K_BUS, BEAM,   OMNI]),
    (ConfigurationId::LocalRepeater, &[OFF, OFF, TS2K_BUS, TS2K_BUS, J_POLE, OMNI]),
    (ConfigurationId::UhfTelemetry,  &[ON,  OFF, TS2K_BUS, SDR_BUS,  BEAM,   SDR_BUS]),
    (ConfigurationId::VhfTelemetry,  &[OFF, ON,  SDR_BUS,  TS2K_BUS, BEAM,   SDR_BUS]),
];

/// One row: a configuration and its target for every relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationRow {
    /// Row identifier.
    pub id: ConfigurationId,
    /// Operator-facing label.
    pub label: &'static str,
    /// Target logical state per relay, in `RelayId::ALL` order.
    pub targets: Vec<bool>,
}

/// Immutable, validated configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationTable {
    rows: Vec<ConfigurationRow>,
    default: ConfigurationId,
}

impl ConfigurationTable {
    /// Build and validate a table.
    ///
    /// # Errors
    /// Returns `TableError` if the table is empty, any row length differs
    /// from the relay count, an identifier repeats, or `default` has no row.
    pub fn new(
        rows: impl IntoIterator<Item = (ConfigurationId, Vec<bool>)>,
        default: ConfigurationId,
    ) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::new();

        for (id, targets) in rows {
            if targets.len() != RELAY_COUNT {
                return Err(TableError::WrongLength {
                    id,
                    expected: RELAY_COUNT,
                    actual: targets.len(),
                });
            }
            if !seen.insert(id) {
                return Err(TableError::Duplicate(id));
            }
            validated.push(ConfigurationRow {
                id,
                label: id.label(),
                targets,
            });
        }

        if validated.is_empty() {
            return Err(TableError::Empty);
        }
        if !seen.contains(&default) {
            return Err(TableError::MissingDefault(default));
        }

        Ok(Self {
            rows: validated,
            default,
        })
    }

    /// The table shipped with the station.
    pub fn builtin() -> Result<Self, TableError> {
        Self::new(
            BUILTIN_ROWS
                .iter()
                .map(|(id, targets)| (*id, targets.to_vec())),
            ConfigurationId::DEFAULT,
        )
    }

    /// Target vector for `id`, if present.
    pub fn targets(&self, id: ConfigurationId) -> Option<&[bool]> {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.targets.as_slice())
    }

    /// Target for one relay under `id`.
    pub fn target(&self, id: ConfigurationId, relay: RelayId) -> Option<bool> {
        self.targets(id).map(|t| t[relay.index()])
    }

    /// Configuration applied at startup.
    pub fn default_configuration(&self) -> ConfigurationId {
        self.default
    }

    /// `(identifier, label)` pairs in table order.
    pub fn configurations(&self) -> impl Iterator<Item = (ConfigurationId, &'static str)> + '_ {
        self.rows.iter().map(|row| (row.id, row.label))
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_of(table: &ConfigurationTable, id: ConfigurationId, relay: RelayId) -> bool {
        table.target(id, relay).expect("row present")
    }

    #[test]
    fn builtin_table_is_valid_and_complete() {
        let table = ConfigurationTable::builtin().expect("builtin table");
        assert_eq!(table.len(), ConfigurationId::ALL.len());
        for id in ConfigurationId::ALL {
            assert!(table.targets(id).is_some(), "missing {id}");
        }
        assert_eq!(table.default_configuration(), ConfigurationId::LocalRepeater);
    }

    #[test]
    fn builtin_rows_match_station_wiring() {
        use ConfigurationId::*;
        use RelayId::*;
        let table = ConfigurationTable::builtin().unwrap();

        assert_eq!(
            table.targets(LocalRepeater).unwrap(),
            &[OFF, OFF, TS2K_BUS, TS2K_BUS, J_POLE, OMNI]
        );
        assert_eq!(
            table.targets(UvSatcom).unwrap(),
            &[OFF, ON, TS2K_BUS, TS2K_BUS, BEAM, OMNI]
        );

        // Telemetry rows route exactly one beam to the SDR bus.
        assert_eq!(target_of(&table, UhfTelemetry, Beam70), SDR_BUS);
        assert_eq!(target_of(&table, UhfTelemetry, Beam2m), TS2K_BUS);
        assert_eq!(target_of(&table, VhfTelemetry, Beam2m), SDR_BUS);
        assert_eq!(target_of(&table, VhfTelemetry, Beam70), TS2K_BUS);
        assert_eq!(target_of(&table, VhfTelemetry, SdrAntenna), SDR_BUS);

        // Satellite rows put exactly one preamp on the downlink band.
        assert_eq!(target_of(&table, UvSatcom, Preamp2m), ON);
        assert_eq!(target_of(&table, VuSatcom, Preamp70), ON);
        assert_eq!(target_of(&table, VuSatcom, Preamp2m), OFF);
    }

    #[test]
    fn configurations_listed_in_table_order() {
        let table = ConfigurationTable::builtin().unwrap();
        let labels: Vec<_> = table.configurations().map(|(_, label)| label).collect();
        assert_eq!(
            labels,
            vec![
                "U/v Satcom",
                "V/u Satcom",
                "Local Repeater",
                "UHF Telemetry",
                "VHF Telemetry"
            ]
        );
    }

    #[test]
    fn short_row_rejected() {
        let err = ConfigurationTable::new(
            [(ConfigurationId::LocalRepeater, vec![false; RELAY_COUNT - 1])],
            ConfigurationId::LocalRepeater,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::WrongLength {
                id: ConfigurationId::LocalRepeater,
                expected: RELAY_COUNT,
                actual: RELAY_COUNT - 1,
            }
        );
    }

    #[test]
    fn long_row_rejected() {
        let result = ConfigurationTable::new(
            [(ConfigurationId::UvSatcom, vec![true; RELAY_COUNT + 2])],
            ConfigurationId::UvSatcom,
        );
        assert!(matches!(result, Err(TableError::WrongLength { actual: 8, .. })));
    }

    #[test]
    fn duplicate_row_rejected() {
        let result = ConfigurationTable::new(
            [
                (ConfigurationId::UvSatcom, vec![false; RELAY_COUNT]),
                (ConfigurationId::UvSatcom, vec![true; RELAY_COUNT]),
            ],
            ConfigurationId::UvSatcom,
        );
        assert_eq!(result, Err(TableError::Duplicate(ConfigurationId::UvSatcom)));
    }

    #[test]
    fn empty_and_missing_default_rejected() {
        let empty: Vec<(ConfigurationId, Vec<bool>)> = Vec::new();
        assert_eq!(
            ConfigurationTable::new(empty, ConfigurationId::LocalRepeater),
            Err(TableError::Empty)
        );

        let result = ConfigurationTable::new(
            [(ConfigurationId::UvSatcom, vec![false; RELAY_COUNT])],
            ConfigurationId::LocalRepeater,
        );
        assert_eq!(
            result,
            Err(TableError::MissingDefault(ConfigurationId::LocalRepeater))
        );
    }
}
