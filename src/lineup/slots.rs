use serde::{Deserialize, Serialize};

use crate::provider::types::Position;

/// Lineup slot counts as written in the config file.
///
/// Example YAML:
/// ```yaml
/// slots:
///   qb: 1
///   rb: 2
///   wr: 2
///   te: 1
///   flex: 1
///   k: 1
///   def: 1
///   flex_positions: [RB, WR, TE]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SlotConfig {
    #[serde(default)]
    pub qb: Option<u8>,
    #[serde(default)]
    pub rb: Option<u8>,
    #[serde(default)]
    pub wr: Option<u8>,
    #[serde(default)]
    pub te: Option<u8>,
    #[serde(default)]
    pub flex: Option<u8>,
    #[serde(default)]
    pub k: Option<u8>,
    #[serde(default)]
    pub def: Option<u8>,

    /// Positions eligible for FLEX (default: RB, WR, TE)
    #[serde(default)]
    pub flex_positions: Option<Vec<String>>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            qb: Some(1),
            rb: Some(2),
            wr: Some(2),
            te: Some(1),
            flex: Some(1),
            k: Some(1),
            def: Some(1),
            flex_positions: Some(vec!["RB".to_string(), "WR".to_string(), "TE".to_string()]),
        }
    }
}

/// What a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotKind {
    Fixed(Position),
    Flex,
}

/// One named slot in the fixed table, e.g. 2 x RB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub kind: SlotKind,
    pub count: u8,
}

/// One concrete slot to fill, e.g. "RB2".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInstance {
    pub name: String,
    pub kind: SlotKind,
}

impl SlotInstance {
    pub fn is_flex(&self) -> bool {
        self.kind == SlotKind::Flex
    }
}

/// Required lineup slots. Bench is unlimited and not listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequirement {
    pub specs: Vec<SlotSpec>,
    pub flex_positions: Vec<Position>,
}

impl Default for SlotRequirement {
    /// 1 QB, 2 RB, 2 WR, 1 TE, 1 FLEX (RB/WR/TE), 1 K, 1 DEF.
    fn default() -> Self {
        Self {
            specs: vec![
                SlotSpec { kind: SlotKind::Fixed(Position::Qb), count: 1 },
                SlotSpec { kind: SlotKind::Fixed(Position::Rb), count: 2 },
                SlotSpec { kind: SlotKind::Fixed(Position::Wr), count: 2 },
                SlotSpec { kind: SlotKind::Fixed(Position::Te), count: 1 },
                SlotSpec { kind: SlotKind::Flex, count: 1 },
                SlotSpec { kind: SlotKind::Fixed(Position::K), count: 1 },
                SlotSpec { kind: SlotKind::Fixed(Position::Def), count: 1 },
            ],
            flex_positions: vec![Position::Rb, Position::Wr, Position::Te],
        }
    }
}

impl SlotRequirement {
    /// Build from config; fields left out take the standard counts.
    /// Call `validate_slots` first: unknown flex positions are dropped here.
    pub fn from_config(config: &SlotConfig) -> Self {
        let defaults = SlotConfig::default();
        let count = |value: Option<u8>, default: Option<u8>| value.or(default).unwrap_or(0);

        let specs = [
            (SlotKind::Fixed(Position::Qb), count(config.qb, defaults.qb)),
            (SlotKind::Fixed(Position::Rb), count(config.rb, defaults.rb)),
            (SlotKind::Fixed(Position::Wr), count(config.wr, defaults.wr)),
            (SlotKind::Fixed(Position::Te), count(config.te, defaults.te)),
            (SlotKind::Flex, count(config.flex, defaults.flex)),
            (SlotKind::Fixed(Position::K), count(config.k, defaults.k)),
            (SlotKind::Fixed(Position::Def), count(config.def, defaults.def)),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| SlotSpec { kind, count })
        .collect();

        let flex_positions = match &config.flex_positions {
            Some(names) => names
                .iter()
                .map(|n| Position::parse(n))
                .filter(Position::is_playable)
                .collect(),
            None => SlotRequirement::default().flex_positions,
        };

        Self { specs, flex_positions }
    }

    /// Expand into named instances: QB, RB1, RB2, WR1, WR2, TE, FLEX, K, DEF.
    pub fn instances(&self) -> Vec<SlotInstance> {
        let mut instances = Vec::new();
        for spec in &self.specs {
            let base = match spec.kind {
                SlotKind::Fixed(position) => position.as_str(),
                SlotKind::Flex => "FLEX",
            };
            for i in 1..=spec.count {
                let name = if spec.count > 1 {
                    format!("{}{}", base, i)
                } else {
                    base.to_string()
                };
                instances.push(SlotInstance { name, kind: spec.kind });
            }
        }
        instances
    }

    pub fn total_slots(&self) -> usize {
        self.specs.iter().map(|s| s.count as usize).sum()
    }

    pub fn accepts(&self, kind: SlotKind, position: Position) -> bool {
        match kind {
            SlotKind::Fixed(slot_position) => slot_position == position,
            SlotKind::Flex => self.flex_positions.contains(&position),
        }
    }
}

/// Validate slot configuration, collecting every problem.
pub fn validate_slots(config: &SlotConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(names) = &config.flex_positions {
        if names.is_empty() {
            errors.push("slots.flex_positions: must list at least one position".to_string());
        }
        for name in names {
            if !Position::parse(name).is_playable() {
                errors.push(format!("slots.flex_positions: unknown position '{}'", name));
            }
        }
    }

    if SlotRequirement::from_config(config).total_slots() == 0 {
        errors.push("slots: at least one starting slot is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_instances() {
        let names: Vec<String> = SlotRequirement::default()
            .instances()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["QB", "RB1", "RB2", "WR1", "WR2", "TE", "FLEX", "K", "DEF"]);
    }

    #[test]
    fn test_from_config_matches_default() {
        let from_config = SlotRequirement::from_config(&SlotConfig::default());
        assert_eq!(from_config, SlotRequirement::default());
    }

    #[test]
    fn test_partial_slot_config() {
        let yaml = r#"
wr: 3
k: 0
flex_positions: [WR, TE]
"#;
        let config: SlotConfig = serde_saphyr::from_str(yaml).unwrap();
        let slots = SlotRequirement::from_config(&config);
        assert_eq!(slots.total_slots(), 9);
        assert!(!slots.instances().iter().any(|i| i.name == "K"));
        assert!(slots.instances().iter().any(|i| i.name == "WR3"));
        assert!(!slots.accepts(SlotKind::Flex, Position::Rb));
        assert!(slots.accepts(SlotKind::Flex, Position::Te));
    }

    #[test]
    fn test_validate_slots() {
        assert!(validate_slots(&SlotConfig::default()).is_ok());

        let config = SlotConfig {
            qb: Some(0),
            rb: Some(0),
            wr: Some(0),
            te: Some(0),
            flex: Some(0),
            k: Some(0),
            def: Some(0),
            flex_positions: Some(vec!["RB".to_string(), "LS".to_string()]),
        };
        let errors = validate_slots(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("'LS'"));
    }
}
