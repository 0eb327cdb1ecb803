use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::GameConfig;
use crate::state::{Ability, EquipSlot, Item};

use super::{ContentError, ContentOracle, EnemyVariant, LayerRoster, PlayerClass};

/// In-memory content store implementing [`ContentOracle`].
///
/// Built incrementally with the `insert_*` methods and checked once with
/// [`validate`](Self::validate) before use.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    abilities: BTreeMap<String, Arc<Ability>>,
    items: BTreeMap<String, Arc<Item>>,
    enemies: BTreeMap<String, EnemyVariant>,
    rosters: BTreeMap<u8, LayerRoster>,
    classes: BTreeMap<String, PlayerClass>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ability(&mut self, ability: Ability) -> &mut Self {
        self.abilities
            .insert(ability.id.clone(), Arc::new(ability));
        self
    }

    pub fn insert_item(&mut self, item: Item) -> &mut Self {
        self.items.insert(item.id.clone(), Arc::new(item));
        self
    }

    pub fn insert_enemy(&mut self, variant: EnemyVariant) -> &mut Self {
        self.enemies.insert(variant.id.clone(), variant);
        self
    }

    pub fn insert_roster(&mut self, roster: LayerRoster) -> &mut Self {
        self.rosters.insert(roster.layer, roster);
        self
    }

    pub fn insert_class(&mut self, class: PlayerClass) -> &mut Self {
        self.classes.insert(class.id.clone(), class);
        self
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Checks cross references: every ability and item id resolves, starting
    /// weapons are weapons, every roster entry names a known enemy, every
    /// layer has a roster with a boss.
    pub fn validate(&self) -> Result<(), ContentError> {
        let check_abilities = |owner: &str, ids: &[String]| -> Result<(), ContentError> {
            if ids.len() > GameConfig::MAX_ABILITIES {
                return Err(ContentError::TooManyAbilities {
                    owner: owner.to_owned(),
                    count: ids.len(),
                });
            }
            for id in ids {
                if !self.abilities.contains_key(id) {
                    return Err(ContentError::UnknownAbility {
                        owner: owner.to_owned(),
                        ability: id.clone(),
                    });
                }
            }
            Ok(())
        };

        let check_item = |owner: &str, id: &str| -> Result<&Arc<Item>, ContentError> {
            self.items.get(id).ok_or_else(|| ContentError::UnknownItem {
                owner: owner.to_owned(),
                item: id.to_owned(),
            })
        };

        for variant in self.enemies.values() {
            check_abilities(&variant.id, &variant.abilities)?;
            for entry in &variant.loot {
                check_item(&variant.id, &entry.item)?;
            }
        }
        for class in self.classes.values() {
            check_abilities(&class.id, &class.abilities)?;
            if let Some(weapon) = &class.weapon {
                if check_item(&class.id, weapon)?.equip_slot() != Some(EquipSlot::Weapon) {
                    return Err(ContentError::NotAWeapon {
                        owner: class.id.clone(),
                        item: weapon.clone(),
                    });
                }
            }
            for item in &class.items {
                check_item(&class.id, item)?;
            }
        }

        for layer in 1..=GameConfig::MAX_LAYERS {
            let roster = self
                .rosters
                .get(&layer)
                .ok_or(ContentError::MissingRoster(layer))?;
            if roster.regulars.is_empty() {
                return Err(ContentError::EmptyRoster(layer));
            }
            for id in &roster.regulars {
                if !self.enemies.contains_key(id) {
                    return Err(ContentError::UnknownEnemy {
                        layer,
                        variant: id.clone(),
                    });
                }
            }
            let boss = self
                .enemies
                .get(&roster.boss)
                .ok_or_else(|| ContentError::UnknownEnemy {
                    layer,
                    variant: roster.boss.clone(),
                })?;
            if !boss.boss {
                return Err(ContentError::NotABoss {
                    layer,
                    variant: roster.boss.clone(),
                });
            }
        }
        Ok(())
    }
}

impl ContentOracle for ContentCatalog {
    fn ability(&self, id: &str) -> Option<Arc<Ability>> {
        if id == Ability::BASIC_ATTACK_ID {
            return Some(Ability::basic_attack());
        }
        self.abilities.get(id).cloned()
    }

    fn item(&self, id: &str) -> Option<Arc<Item>> {
        self.items.get(id).cloned()
    }

    fn enemy_variant(&self, id: &str) -> Option<&EnemyVariant> {
        self.enemies.get(id)
    }

    fn layer_roster(&self, layer: u8) -> Option<&LayerRoster> {
        self.rosters.get(&layer)
    }

    fn player_class(&self, id: &str) -> Option<&PlayerClass> {
        self.classes.get(id)
    }

    fn player_classes(&self) -> Vec<&PlayerClass> {
        self.classes.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;

    #[test]
    fn fixture_catalog_validates() {
        fixtures::catalog().validate().unwrap();
    }

    #[test]
    fn missing_roster_is_reported() {
        let mut catalog = fixtures::catalog();
        catalog.rosters.remove(&3);
        assert_eq!(catalog.validate(), Err(ContentError::MissingRoster(3)));
    }

    #[test]
    fn unknown_class_ability_is_reported() {
        let mut catalog = fixtures::catalog();
        let mut class = catalog.classes["crusader"].clone();
        class.abilities.push("missing".into());
        catalog.insert_class(class);
        assert!(matches!(
            catalog.validate(),
            Err(ContentError::UnknownAbility { .. })
        ));
    }

    #[test]
    fn unknown_loot_item_is_reported() {
        let mut catalog = fixtures::catalog();
        let mut imp = catalog.enemies["imp"].clone();
        imp.loot[0].item = "missing".into();
        catalog.insert_enemy(imp);
        assert_eq!(
            catalog.validate(),
            Err(ContentError::UnknownItem {
                owner: "imp".into(),
                item: "missing".into(),
            })
        );
    }

    #[test]
    fn starting_weapon_must_be_a_weapon() {
        let mut catalog = fixtures::catalog();
        let mut class = catalog.classes["crusader"].clone();
        class.weapon = Some("potion".into());
        catalog.insert_class(class);
        assert!(matches!(
            catalog.validate(),
            Err(ContentError::NotAWeapon { .. })
        ));
    }

    #[test]
    fn basic_attack_resolves_without_registration() {
        let catalog = ContentCatalog::new();
        assert!(catalog.ability(Ability::BASIC_ATTACK_ID).is_some());
    }
}
