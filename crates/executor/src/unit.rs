//! Execution unit and group model.
//!
//! Units are produced by the (external) routing stage and consumed read-only
//! here. A group collects the units that will share one physical connection
//! for the duration of a logical execution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One bind value of a physical statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Concrete SQL text plus its ordered bind values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlUnit {
    pub sql: String,
    pub parameters: Vec<ParamValue>,
}

impl SqlUnit {
    pub fn new(sql: impl Into<String>, parameters: Vec<ParamValue>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

/// One physical statement bound to one backend data source.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionUnit {
    pub data_source_name: String,
    pub sql_unit: SqlUnit,
}

impl ExecutionUnit {
    pub fn new(data_source_name: impl Into<String>, sql_unit: SqlUnit) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            sql_unit,
        }
    }
}

/// Connection reuse policy for one logical execution.
///
/// Supplied by the caller; the engine branches its scheduling on it but never
/// decides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Each unit gets its own connection. Units may run fully concurrently
    /// at the cost of one held connection per unit.
    ExclusiveConnection,
    /// Units targeting the same data source reuse one connection and run
    /// strictly sequentially on it, bounding the connection count.
    SharedConnection,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::ExclusiveConnection => write!(f, "exclusive"),
            ConnectionMode::SharedConnection => write!(f, "shared"),
        }
    }
}

/// Units that share one physical connection, in input order.
///
/// Members carry their position in the original unit sequence so results can
/// be reassembled in input order no matter when they complete.
#[derive(Debug, Clone)]
pub struct ExecutionGroup {
    data_source_name: String,
    mode: ConnectionMode,
    members: Vec<(usize, ExecutionUnit)>,
}

impl ExecutionGroup {
    /// Partition `units` into groups according to the connection mode.
    ///
    /// Exclusive mode yields one group per unit; shared mode yields one group
    /// per distinct data source with members in input order. Group order
    /// follows first appearance in the input.
    pub fn build(units: Vec<ExecutionUnit>, mode: ConnectionMode) -> Vec<ExecutionGroup> {
        match mode {
            ConnectionMode::ExclusiveConnection => units
                .into_iter()
                .enumerate()
                .map(|(index, unit)| ExecutionGroup {
                    data_source_name: unit.data_source_name.clone(),
                    mode,
                    members: vec![(index, unit)],
                })
                .collect(),
            ConnectionMode::SharedConnection => {
                let mut groups: Vec<ExecutionGroup> = Vec::new();
                let mut positions: HashMap<String, usize> = HashMap::new();
                for (index, unit) in units.into_iter().enumerate() {
                    match positions.get(&unit.data_source_name) {
                        Some(&at) => groups[at].members.push((index, unit)),
                        None => {
                            positions.insert(unit.data_source_name.clone(), groups.len());
                            groups.push(ExecutionGroup {
                                data_source_name: unit.data_source_name.clone(),
                                mode,
                                members: vec![(index, unit)],
                            });
                        }
                    }
                }
                groups
            }
        }
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn members(&self) -> &[(usize, ExecutionUnit)] {
        &self.members
    }

    pub fn into_members(self) -> Vec<(usize, ExecutionUnit)> {
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(ds: &str, sql: &str) -> ExecutionUnit {
        ExecutionUnit::new(ds, SqlUnit::new(sql, vec![]))
    }

    #[test]
    fn test_exclusive_mode_one_group_per_unit() {
        let units = vec![unit("ds_0", "a"), unit("ds_0", "b"), unit("ds_1", "c")];
        let groups = ExecutionGroup::build(units, ConnectionMode::ExclusiveConnection);

        assert_eq!(groups.len(), 3);
        for (i, group) in groups.iter().enumerate() {
            assert_eq!(group.members().len(), 1);
            assert_eq!(group.members()[0].0, i);
        }
    }

    #[test]
    fn test_shared_mode_groups_by_data_source() {
        let units = vec![
            unit("ds_0", "a"),
            unit("ds_1", "b"),
            unit("ds_0", "c"),
            unit("ds_1", "d"),
        ];
        let groups = ExecutionGroup::build(units, ConnectionMode::SharedConnection);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].data_source_name(), "ds_0");
        assert_eq!(groups[1].data_source_name(), "ds_1");

        let ds0_order: Vec<usize> = groups[0].members().iter().map(|(i, _)| *i).collect();
        let ds1_order: Vec<usize> = groups[1].members().iter().map(|(i, _)| *i).collect();
        assert_eq!(ds0_order, vec![0, 2]);
        assert_eq!(ds1_order, vec![1, 3]);
    }

    #[test]
    fn test_shared_mode_member_order_is_input_order() {
        let units = vec![unit("ds_0", "a"), unit("ds_0", "b"), unit("ds_0", "c")];
        let groups = ExecutionGroup::build(units, ConnectionMode::SharedConnection);

        assert_eq!(groups.len(), 1);
        let sqls: Vec<&str> = groups[0]
            .members()
            .iter()
            .map(|(_, u)| u.sql_unit.sql.as_str())
            .collect();
        assert_eq!(sqls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_connection_mode_display() {
        assert_eq!(ConnectionMode::ExclusiveConnection.to_string(), "exclusive");
        assert_eq!(ConnectionMode::SharedConnection.to_string(), "shared");
    }
}
