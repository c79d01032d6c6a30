//! Identity resolution: internal display names to external platform ids.
//!
//! The tables are immutable configuration loaded once at startup and
//! injected into the resolver; lookups are pure map accesses. Absence is a
//! legitimate outcome ("not mapped", the platform is skipped), never an
//! error. A plan may be present on zero, one, two, or all three platforms.

mod tables;

use crate::normalization::lot::community_key;
use crate::normalization::normalize_plan_name;
use crate::sync_ops::PlatformKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// External platform-side numeric id (plan, lot, or community/location).
pub type ExternalId = i64;

/// Per-platform identity maps. Plan maps are keyed by normalized plan name,
/// lot maps by `"community:lot"` with the community lowercased.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityTables {
    #[serde(default)]
    pub homefiniti_plans: HashMap<String, ExternalId>,
    #[serde(default)]
    pub anewgo_plans: HashMap<String, ExternalId>,
    #[serde(default)]
    pub newhomefeed_plans: HashMap<String, ExternalId>,
    #[serde(default)]
    pub anewgo_lots: HashMap<String, ExternalId>,
    #[serde(default)]
    pub anewgo_communities: HashMap<String, ExternalId>,
}

impl IdentityTables {
    /// The hand-maintained production tables compiled into the binary.
    pub fn builtin() -> Self {
        fn collect(pairs: &[(&str, ExternalId)]) -> HashMap<String, ExternalId> {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        }
        Self {
            homefiniti_plans: collect(tables::homefiniti_plans()),
            anewgo_plans: collect(tables::anewgo_plans()),
            newhomefeed_plans: collect(tables::newhomefeed_plans()),
            anewgo_lots: collect(tables::anewgo_lots()),
            anewgo_communities: collect(tables::anewgo_communities()),
        }
    }

    /// Load tables from a JSON file (same shape as the struct). Keys are
    /// re-normalized on load so the file may use display spellings; the
    /// lookup path applies the identical normalization.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading identity tables from {}", path.display()))?;
        let parsed: IdentityTables =
            serde_json::from_str(&raw).context("parsing identity tables JSON")?;
        Ok(parsed.normalized())
    }

    fn normalized(self) -> Self {
        fn norm_plans(m: HashMap<String, ExternalId>) -> HashMap<String, ExternalId> {
            m.into_iter()
                .map(|(k, v)| (normalize_plan_name(&k), v))
                .collect()
        }
        fn norm_lots(m: HashMap<String, ExternalId>) -> HashMap<String, ExternalId> {
            m.into_iter()
                .map(|(k, v)| match k.split_once(':') {
                    Some((community, lot)) => {
                        (format!("{}:{}", community_key(community), lot.trim()), v)
                    }
                    None => (k, v),
                })
                .collect()
        }
        fn norm_communities(m: HashMap<String, ExternalId>) -> HashMap<String, ExternalId> {
            m.into_iter().map(|(k, v)| (community_key(&k), v)).collect()
        }
        Self {
            homefiniti_plans: norm_plans(self.homefiniti_plans),
            anewgo_plans: norm_plans(self.anewgo_plans),
            newhomefeed_plans: norm_plans(self.newhomefeed_plans),
            anewgo_lots: norm_lots(self.anewgo_lots),
            anewgo_communities: norm_communities(self.anewgo_communities),
        }
    }
}

/// Read-only resolver over injected identity tables.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    tables: Arc<IdentityTables>,
}

impl IdentityResolver {
    pub fn new(tables: IdentityTables) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    fn plan_map(&self, kind: PlatformKind) -> &HashMap<String, ExternalId> {
        match kind {
            PlatformKind::Homefiniti => &self.tables.homefiniti_plans,
            PlatformKind::Anewgo => &self.tables.anewgo_plans,
            PlatformKind::NewHomeFeed => &self.tables.newhomefeed_plans,
        }
    }

    /// Resolve a plan display name to the platform's plan id.
    pub fn resolve_plan(&self, kind: PlatformKind, display_name: &str) -> Option<ExternalId> {
        self.plan_map(kind)
            .get(&normalize_plan_name(display_name))
            .copied()
    }

    /// Resolve a (community, lot number) pair to the platform's lot id.
    /// Only the inventory-syndication platform carries lot identities.
    pub fn resolve_lot(
        &self,
        kind: PlatformKind,
        community: &str,
        lot_number: &str,
    ) -> Option<ExternalId> {
        let map = match kind {
            PlatformKind::Anewgo => &self.tables.anewgo_lots,
            _ => return None,
        };
        let key = format!("{}:{}", community_key(community), lot_number.trim());
        map.get(&key).copied()
    }

    /// Resolve a community name to the inventory platform's location id.
    pub fn resolve_community(&self, kind: PlatformKind, community: &str) -> Option<ExternalId> {
        match kind {
            PlatformKind::Anewgo => self
                .tables
                .anewgo_communities
                .get(&community_key(community))
                .copied(),
            _ => None,
        }
    }

    /// Known (normalized) plan names for a platform, for diagnostics.
    pub fn known_plans(&self, kind: PlatformKind) -> Vec<String> {
        let mut names: Vec<String> = self.plan_map(kind).keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_display_names() {
        let resolver = IdentityResolver::new(IdentityTables::builtin());
        assert_eq!(
            resolver.resolve_plan(PlatformKind::Anewgo, "The Balboa"),
            Some(6286)
        );
        assert_eq!(
            resolver.resolve_plan(PlatformKind::Homefiniti, "  the balboa "),
            Some(178661)
        );
        assert_eq!(
            resolver.resolve_plan(PlatformKind::NewHomeFeed, "Sophia Mountain Modern"),
            Some(5069429)
        );
    }

    #[test]
    fn unmapped_plan_is_none_not_error() {
        let resolver = IdentityResolver::new(IdentityTables::builtin());
        // "Cambridge" exists on Homefiniti and ANewGo but not NewHomeFeed
        assert!(resolver
            .resolve_plan(PlatformKind::Homefiniti, "Cambridge")
            .is_some());
        assert!(resolver
            .resolve_plan(PlatformKind::NewHomeFeed, "Cambridge")
            .is_none());
        assert!(resolver
            .resolve_plan(PlatformKind::Anewgo, "Nonexistent Plan")
            .is_none());
    }

    #[test]
    fn lots_restricted_to_inventory_platform() {
        let resolver = IdentityResolver::new(IdentityTables::builtin());
        assert_eq!(
            resolver.resolve_lot(PlatformKind::Anewgo, "Windflower", "429"),
            Some(19780)
        );
        assert_eq!(
            resolver.resolve_lot(PlatformKind::Homefiniti, "Windflower", "429"),
            None
        );
        assert_eq!(
            resolver.resolve_lot(PlatformKind::Anewgo, "Windflower", "9999"),
            None
        );
    }

    #[test]
    fn community_lookup_folds_case() {
        let resolver = IdentityResolver::new(IdentityTables::builtin());
        assert_eq!(
            resolver.resolve_community(PlatformKind::Anewgo, "Bella Vita"),
            Some(1659)
        );
        assert_eq!(
            resolver.resolve_community(PlatformKind::Anewgo, "BELLA VITA"),
            Some(1659)
        );
    }

    #[test]
    fn fixture_tables_substitute_cleanly() {
        let mut tables = IdentityTables::default();
        tables
            .anewgo_plans
            .insert("balboa".to_string(), 199724);
        let resolver = IdentityResolver::new(tables);
        assert_eq!(
            resolver.resolve_plan(PlatformKind::Anewgo, "The Balboa"),
            Some(199724)
        );
        assert_eq!(resolver.resolve_plan(PlatformKind::Homefiniti, "The Balboa"), None);
    }
}
