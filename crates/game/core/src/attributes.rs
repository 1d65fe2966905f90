//! Named numeric attributes and the watcher that diffs them for clients.
//!
//! An attribute with a [`Descriptor`] is exposed: clients see it in full
//! snapshots and receive its changes. An attribute without a descriptor is
//! pure bookkeeping (e.g. an ability's usability cache) and never leaves the
//! server.
//!
//! # Diff semantics
//!
//! Changes are compared against the **last exported** value, not the previous
//! set value. Any number of changes between two exports collapse into one net
//! diff, and a value that returns to its exported baseline produces no diff at
//! all. Observers never see transient intermediate values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Engine-computed attributes exposed through the same watcher as authored
/// ones.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Builtin {
    /// Team: number of players still in the game.
    PlayerCount,
    /// Player: number of ships owned.
    ShipCount,
    /// Ship: number of abilities attached.
    AbilityCount,
    /// Ability: 1 when usable right now, 0 otherwise. Bookkeeping only.
    Usable,
    /// Ability: uses spent during the current turn. Bookkeeping only.
    UsesThisTurn,
}

/// Key of an attribute within one watcher.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKey {
    Custom(String),
    Builtin(Builtin),
}

impl AttributeKey {
    const BUILTIN_PREFIX: &'static str = "builtin.";

    pub fn custom(name: impl Into<String>) -> Self {
        AttributeKey::Custom(name.into())
    }
}

impl From<Builtin> for AttributeKey {
    fn from(builtin: Builtin) -> Self {
        AttributeKey::Builtin(builtin)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Custom(name) => f.write_str(name),
            AttributeKey::Builtin(builtin) => write!(f, "{}{}", Self::BUILTIN_PREFIX, builtin),
        }
    }
}

impl FromStr for AttributeKey {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(Self::BUILTIN_PREFIX) {
            Some(rest) => rest.parse().map(AttributeKey::Builtin),
            None => Ok(AttributeKey::Custom(s.to_owned())),
        }
    }
}

// Serialized as its display string so diff maps stay string-keyed on the wire.
#[cfg(feature = "serde")]
impl serde::Serialize for AttributeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AttributeKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            <D::Error as serde::de::Error>::custom(format_args!("invalid attribute key `{raw}`"))
        })
    }
}

/// Human-readable description of an exposed attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor {
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl Descriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A single attribute value and its optional descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub value: i64,
    pub descriptor: Option<Descriptor>,
}

impl Attribute {
    /// Exposed attribute.
    pub fn exposed(value: i64, descriptor: Descriptor) -> Self {
        Self {
            value,
            descriptor: Some(descriptor),
        }
    }

    /// Bookkeeping attribute, invisible to clients.
    pub fn hidden(value: i64) -> Self {
        Self {
            value,
            descriptor: None,
        }
    }
}

/// Full-state entry for one exposed attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeInfo {
    pub key: AttributeKey,
    pub descriptor: Descriptor,
    pub value: i64,
}

/// Net changes since the previous export, keyed by attribute.
pub type AttributeDiff = BTreeMap<AttributeKey, i64>;

/// Owner of one object's attributes; records client-visible changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeWatcher {
    custom: BTreeMap<String, Attribute>,
    builtin: BTreeMap<Builtin, Attribute>,
    exported: BTreeMap<AttributeKey, i64>,
    pending: AttributeDiff,
}

impl AttributeWatcher {
    /// Builds a watcher; the current value of every exposed attribute becomes
    /// the initial export baseline.
    pub fn new(
        custom: impl IntoIterator<Item = (String, Attribute)>,
        builtin: impl IntoIterator<Item = (Builtin, Attribute)>,
    ) -> Self {
        let custom: BTreeMap<_, _> = custom.into_iter().collect();
        let builtin: BTreeMap<_, _> = builtin.into_iter().collect();

        let mut watcher = Self {
            custom,
            builtin,
            exported: BTreeMap::new(),
            pending: BTreeMap::new(),
        };
        watcher.exported = watcher
            .exposed()
            .map(|(key, _, attribute)| (key, attribute.value))
            .collect();
        watcher
    }

    fn attribute(&self, key: &AttributeKey) -> Option<&Attribute> {
        match key {
            AttributeKey::Custom(name) => self.custom.get(name),
            AttributeKey::Builtin(builtin) => self.builtin.get(builtin),
        }
    }

    fn attribute_mut(&mut self, key: &AttributeKey) -> Option<&mut Attribute> {
        match key {
            AttributeKey::Custom(name) => self.custom.get_mut(name),
            AttributeKey::Builtin(builtin) => self.builtin.get_mut(builtin),
        }
    }

    fn exposed(&self) -> impl Iterator<Item = (AttributeKey, &Descriptor, &Attribute)> + '_ {
        let builtin = self.builtin.iter().filter_map(|(b, attribute)| {
            attribute
                .descriptor
                .as_ref()
                .map(|d| (AttributeKey::Builtin(*b), d, attribute))
        });
        let custom = self.custom.iter().filter_map(|(name, attribute)| {
            attribute
                .descriptor
                .as_ref()
                .map(|d| (AttributeKey::Custom(name.clone()), d, attribute))
        });
        builtin.chain(custom)
    }

    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.attribute(key).is_some()
    }

    pub fn is_exposed(&self, key: &AttributeKey) -> bool {
        self.attribute(key).is_some_and(|a| a.descriptor.is_some())
    }

    pub fn get(&self, key: &AttributeKey) -> Option<i64> {
        self.attribute(key).map(|a| a.value)
    }

    pub fn builtin(&self, builtin: Builtin) -> Option<i64> {
        self.builtin.get(&builtin).map(|a| a.value)
    }

    /// Sets a value. Returns false if the attribute does not exist.
    pub fn set(&mut self, key: &AttributeKey, value: i64) -> bool {
        let Some(attribute) = self.attribute_mut(key) else {
            return false;
        };
        attribute.value = value;
        if attribute.descriptor.is_none() {
            return true;
        }

        if self.exported.get(key) == Some(&value) {
            self.pending.remove(key);
        } else {
            self.pending.insert(key.clone(), value);
        }
        true
    }

    /// Adds or replaces a custom attribute. Like attributes present at
    /// construction, an exposed value starts out as already exported.
    pub fn insert(&mut self, name: impl Into<String>, attribute: Attribute) {
        let name = name.into();
        let key = AttributeKey::Custom(name.clone());
        self.pending.remove(&key);
        if attribute.descriptor.is_some() {
            self.exported.insert(key, attribute.value);
        } else {
            self.exported.remove(&key);
        }
        self.custom.insert(name, attribute);
    }

    pub fn set_builtin(&mut self, builtin: Builtin, value: i64) -> bool {
        self.set(&AttributeKey::Builtin(builtin), value)
    }

    /// Adds `delta` and returns the new value.
    pub fn adjust(&mut self, key: &AttributeKey, delta: i64) -> Option<i64> {
        let value = self.get(key)?.saturating_add(delta);
        self.set(key, value);
        Some(value)
    }

    /// Full snapshot of exposed attributes; resets the diff baseline.
    pub fn export_attribute_info(&mut self) -> Vec<AttributeInfo> {
        let info = self.snapshot();
        self.exported = info.iter().map(|i| (i.key.clone(), i.value)).collect();
        self.pending.clear();
        info
    }

    /// Full snapshot of exposed attributes without touching the baseline.
    pub fn snapshot(&self) -> Vec<AttributeInfo> {
        self.exposed()
            .map(|(key, descriptor, attribute)| AttributeInfo {
                key,
                descriptor: descriptor.clone(),
                value: attribute.value,
            })
            .collect()
    }

    /// Returns and clears the accumulated net diff.
    pub fn export_updates(&mut self) -> AttributeDiff {
        let updates = std::mem::take(&mut self.pending);
        for (key, value) in &updates {
            self.exported.insert(key.clone(), *value);
        }
        updates
    }

    pub fn has_updates(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hull() -> AttributeKey {
        AttributeKey::custom("hull")
    }

    fn watcher() -> AttributeWatcher {
        AttributeWatcher::new(
            [
                (
                    "hull".to_owned(),
                    Attribute::exposed(10, Descriptor::new("Hull")),
                ),
                ("cooldown".to_owned(), Attribute::hidden(0)),
            ],
            [
                (
                    Builtin::AbilityCount,
                    Attribute::exposed(2, Descriptor::new("Abilities")),
                ),
                (Builtin::Usable, Attribute::hidden(1)),
            ],
        )
    }

    #[test]
    fn export_updates_is_idempotent_without_changes() {
        let mut w = watcher();
        w.set(&hull(), 7);
        assert_eq!(w.export_updates().get(&hull()), Some(&7));
        assert!(w.export_updates().is_empty());
        assert!(w.export_updates().is_empty());
    }

    #[test]
    fn returning_to_exported_value_suppresses_diff() {
        let mut w = watcher();
        w.set(&hull(), 3);
        w.set(&hull(), 10);
        assert!(w.export_updates().is_empty());
        assert_eq!(w.get(&hull()), Some(10));
    }

    #[test]
    fn oscillation_collapses_to_net_change() {
        let mut w = watcher();
        w.set(&hull(), 3);
        w.set(&hull(), 5);
        w.adjust(&hull(), 1);

        let diff = w.export_updates();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get(&hull()), Some(&6));

        // Baseline moved to 6: setting 6 again is not a change.
        w.set(&hull(), 6);
        assert!(w.export_updates().is_empty());
    }

    #[test]
    fn hidden_attributes_never_produce_diffs() {
        let mut w = watcher();
        assert!(w.set(&AttributeKey::custom("cooldown"), 4));
        assert!(w.set_builtin(Builtin::Usable, 0));
        assert!(w.export_updates().is_empty());
        assert_eq!(w.builtin(Builtin::Usable), Some(0));
        assert!(!w.is_exposed(&Builtin::Usable.into()));
    }

    #[test]
    fn inserted_attributes_start_from_their_value() {
        let mut w = watcher();
        let morale = AttributeKey::custom("morale");
        w.insert("morale", Attribute::exposed(4, Descriptor::new("Morale")));
        assert!(w.export_updates().is_empty());

        w.adjust(&morale, 1);
        assert_eq!(w.export_updates().get(&morale), Some(&5));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut w = watcher();
        assert!(!w.set(&AttributeKey::custom("shields"), 1));
        assert_eq!(w.adjust(&AttributeKey::custom("shields"), 1), None);
    }

    #[test]
    fn export_attribute_info_resets_baseline_and_skips_hidden() {
        let mut w = watcher();
        w.set(&hull(), 4);

        let info = w.export_attribute_info();
        let keys: Vec<_> = info.iter().map(|i| i.key.to_string()).collect();
        assert_eq!(keys, ["builtin.ability_count", "hull"]);
        assert_eq!(info[1].value, 4);

        assert!(w.export_updates().is_empty());
        w.set(&hull(), 10);
        assert_eq!(w.export_updates().get(&hull()), Some(&10));
    }

    #[test]
    fn snapshot_keeps_pending_diff() {
        let mut w = watcher();
        w.set(&hull(), 1);
        assert_eq!(w.snapshot().len(), 2);
        assert!(w.has_updates());
    }

    #[test]
    fn keys_parse_from_display_form() {
        assert_eq!(
            "builtin.ship_count".parse::<AttributeKey>().ok(),
            Some(AttributeKey::Builtin(Builtin::ShipCount))
        );
        assert_eq!(
            "fuel".parse::<AttributeKey>().ok(),
            Some(AttributeKey::custom("fuel"))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn keys_serialize_as_strings() {
        let key = AttributeKey::from(Builtin::PlayerCount);
        let json = serde_json::to_string(&key).expect("serializable");
        assert_eq!(json, "\"builtin.player_count\"");
        assert_eq!(serde_json::from_str::<AttributeKey>(&json).ok(), Some(key));
        assert_eq!(
            serde_json::from_str::<AttributeKey>("\"fuel\"").ok(),
            Some(AttributeKey::custom("fuel"))
        );

        let err = serde_json::from_str::<AttributeKey>("\"builtin.warp_core\"")
            .expect_err("unknown builtin");
        assert!(err.to_string().contains("invalid attribute key `builtin.warp_core`"));
    }
}
