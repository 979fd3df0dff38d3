use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::provider::types::{canonical_team, PoolSnapshot, Position};

use super::normalize::{normalize_name, tokens, variant_forms};

/// One pool player as the resolver sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub full_name: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    pub position: Position,
    /// Canonical team abbreviation, `None` for free agents
    pub team: Option<String>,
    pub active: bool,
}

/// Read-only name lookup tables for one player-pool snapshot.
///
/// Built once per snapshot and shared behind an `Arc`; a pool refresh builds
/// a new index with a new `version` rather than mutating this one.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    version: u64,
    entries: BTreeMap<String, IndexEntry>,
    exact: HashMap<String, Vec<String>>,
    normalized: HashMap<String, Vec<String>>,
    variants: HashMap<String, Vec<String>>,
    by_last_initial: HashMap<char, Vec<String>>,
}

/// Provider ids are numeric strings; order them numerically when possible.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn push_id(map: &mut HashMap<String, Vec<String>>, key: String, id: &str) {
    if key.is_empty() {
        return;
    }
    let ids = map.entry(key).or_default();
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

impl NameIndex {
    pub fn build(snapshot: &PoolSnapshot) -> Self {
        let mut index = NameIndex {
            version: snapshot.version,
            ..Default::default()
        };

        for (id, player) in &snapshot.players {
            let full_name = player.full_name();
            let normalized = normalize_name(&full_name);
            if normalized.is_empty() {
                continue;
            }

            push_id(&mut index.exact, full_name.to_lowercase(), id);
            push_id(&mut index.normalized, normalized.clone(), id);
            for form in variant_forms(&player.first_name, &player.last_name) {
                if form != normalized {
                    push_id(&mut index.variants, form, id);
                }
            }

            let entry_tokens = tokens(&full_name);
            if let Some(initial) = entry_tokens.last().and_then(|t| t.chars().next()) {
                index.by_last_initial.entry(initial).or_default().push(id.clone());
            }

            index.entries.insert(
                id.clone(),
                IndexEntry {
                    id: id.clone(),
                    full_name,
                    normalized,
                    tokens: entry_tokens,
                    position: player.position,
                    team: player
                        .team
                        .as_deref()
                        .map(canonical_team)
                        .filter(|t| !t.is_empty()),
                    active: player.active,
                },
            );
        }

        // Deterministic candidate order regardless of snapshot hash order
        for ids in index
            .exact
            .values_mut()
            .chain(index.normalized.values_mut())
            .chain(index.variants.values_mut())
            .chain(index.by_last_initial.values_mut())
        {
            ids.sort_by(|a, b| compare_ids(a, b));
        }

        index
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn exact(&self, lowered: &str) -> Vec<&IndexEntry> {
        self.lookup(&self.exact, lowered)
    }

    pub fn normalized(&self, normalized: &str) -> Vec<&IndexEntry> {
        self.lookup(&self.normalized, normalized)
    }

    pub fn variant(&self, normalized: &str) -> Vec<&IndexEntry> {
        self.lookup(&self.variants, normalized)
    }

    /// Entries whose last name token starts with `initial`.
    pub fn with_last_initial(&self, initial: char) -> Vec<&IndexEntry> {
        self.by_last_initial
            .get(&initial)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    fn lookup(&self, map: &HashMap<String, Vec<String>>, key: &str) -> Vec<&IndexEntry> {
        map.get(key)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::PoolPlayer;

    fn player(first: &str, last: &str, position: Position, team: Option<&str>) -> PoolPlayer {
        PoolPlayer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            position,
            team: team.map(str::to_string),
            active: true,
            injury_status: None,
        }
    }

    fn snapshot() -> PoolSnapshot {
        let mut players = HashMap::new();
        players.insert("4034".to_string(), player("Christian", "McCaffrey", Position::Rb, Some("SF")));
        players.insert("9999".to_string(), player("Luke", "McCaffrey", Position::Wr, Some("WSH")));
        players.insert("4983".to_string(), player("A.J.", "Brown", Position::Wr, Some("PHI")));
        players.insert("100".to_string(), player("", "", Position::Wr, None));
        PoolSnapshot::new(players)
    }

    #[test]
    fn test_build_skips_nameless_and_canonicalizes_team() {
        let index = NameIndex::build(&snapshot());
        assert_eq!(index.len(), 3);
        assert!(index.get("100").is_none());
        assert_eq!(index.get("9999").unwrap().team.as_deref(), Some("WAS"));
    }

    #[test]
    fn test_lookup_tables() {
        let index = NameIndex::build(&snapshot());
        assert_eq!(index.exact("christian mccaffrey")[0].id, "4034");
        assert_eq!(index.normalized("aj brown")[0].id, "4983");
        assert_eq!(index.variant("c mccaffrey")[0].id, "4034");
        assert_eq!(index.variant("l mccaffrey")[0].id, "9999");
        assert!(index.variant("aj brown").is_empty());

        let m: Vec<&str> = index.with_last_initial('m').iter().map(|e| e.id.as_str()).collect();
        assert_eq!(m, vec!["4034", "9999"]);
    }

    #[test]
    fn test_version_follows_snapshot() {
        let snap = snapshot();
        let index = NameIndex::build(&snap);
        assert_eq!(index.version(), snap.version);
        assert_eq!(NameIndex::empty().version(), 0);
        assert!(NameIndex::empty().is_empty());
    }

    #[test]
    fn test_compare_ids_numeric_order() {
        assert_eq!(compare_ids("99", "100"), Ordering::Less);
        assert_eq!(compare_ids("100", "100"), Ordering::Equal);
        assert_eq!(compare_ids("abc", "abd"), Ordering::Less);
    }
}
