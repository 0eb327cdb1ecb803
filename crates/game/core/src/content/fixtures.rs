//! Small hand-built catalog shared by unit tests.

use crate::content::{
    AiPattern, ContentCatalog, EnemyVariant, LayerRoster, LootEntry, PlayerClass, Rarity,
};
use crate::state::{
    Ability, BaseStats, EffectSpec, EquipSlot, Formula, Item, ItemKind, RollProfile,
    StackingPolicy, StatBonus, StatusKind, StatusSpec, TargetSelector,
};

pub(crate) fn ability(id: &str, selector: TargetSelector, power: u32) -> Ability {
    Ability {
        id: id.to_owned(),
        name: id.to_owned(),
        selector,
        power,
        cost: 0,
        cooldown: 0,
        effects: vec![EffectSpec::Damage],
        rolls: None,
    }
}

pub(crate) fn equipment(id: &str, slot: EquipSlot, bonus: StatBonus) -> Item {
    Item {
        id: id.to_owned(),
        name: id.to_owned(),
        rarity: Rarity::Common,
        kind: ItemKind::Equipment { slot, bonus },
    }
}

pub(crate) fn catalog() -> ContentCatalog {
    let mut catalog = ContentCatalog::new();

    catalog
        .insert_ability(Ability {
            cooldown: 2,
            cost: 5,
            ..ability("smite", TargetSelector::SingleEnemy, 150)
        })
        .insert_ability(Ability {
            effects: vec![EffectSpec::Heal(Formula::Flat(20))],
            ..ability("mend", TargetSelector::SelfOnly, 0)
        })
        .insert_ability(Ability {
            effects: vec![
                EffectSpec::Damage,
                EffectSpec::ApplyStatus(StatusSpec {
                    kind: StatusKind::Poison,
                    magnitude: 3,
                    duration: 2,
                    stacking: StackingPolicy::Refresh,
                }),
            ],
            rolls: Some(RollProfile {
                accuracy: 95,
                crit_bonus: 0,
                status_chance: 60,
            }),
            ..ability("venom", TargetSelector::SingleEnemy, 80)
        })
        .insert_ability(Ability {
            effects: vec![EffectSpec::ApplyStatus(StatusSpec {
                kind: StatusKind::DefenseUp,
                magnitude: 50,
                duration: 1,
                stacking: StackingPolicy::Refresh,
            })],
            ..ability("guard", TargetSelector::SelfOnly, 0)
        })
        .insert_ability(ability("sweep", TargetSelector::AllEnemies, 60));

    catalog
        .insert_item(Item {
            id: "potion".into(),
            name: "Potion".into(),
            rarity: Rarity::Common,
            kind: ItemKind::Consumable {
                selector: TargetSelector::SelfOnly,
                power: 0,
                effects: vec![EffectSpec::Heal(Formula::Flat(30))],
            },
        })
        .insert_item(equipment(
            "essence",
            EquipSlot::Artifact,
            StatBonus {
                attack: 1,
                ..StatBonus::default()
            },
        ))
        .insert_item(equipment(
            "blade",
            EquipSlot::Weapon,
            StatBonus {
                attack: 5,
                ..StatBonus::default()
            },
        ));

    catalog
        .insert_enemy(EnemyVariant {
            id: "imp".into(),
            name: "Imp".into(),
            stats: BaseStats {
                max_health: 30,
                attack: 10,
                defense: 2,
                speed: 12,
            },
            abilities: vec!["venom".into()],
            resource: 0,
            experience: 20,
            currency: 10,
            loot: vec![LootEntry {
                item: "essence".into(),
                rarity: Rarity::Common,
                chance: 50,
            }],
            boss: false,
            ai: AiPattern::Tactical,
            unlock: None,
        })
        .insert_enemy(EnemyVariant {
            id: "brute".into(),
            name: "Brute".into(),
            stats: BaseStats {
                max_health: 80,
                attack: 14,
                defense: 6,
                speed: 5,
            },
            abilities: vec!["smite".into()],
            resource: 20,
            experience: 40,
            currency: 25,
            loot: Vec::new(),
            boss: true,
            ai: AiPattern::Aggressive,
            unlock: Some("boss:brute".into()),
        });

    for layer in 1..=7 {
        catalog.insert_roster(LayerRoster {
            layer,
            regulars: vec!["imp".into()],
            boss: "brute".into(),
        });
    }

    catalog.insert_class(PlayerClass {
        id: "crusader".into(),
        name: "Crusader".into(),
        description: String::new(),
        stats: BaseStats {
            max_health: 100,
            attack: 15,
            defense: 10,
            speed: 8,
        },
        abilities: vec!["smite".into(), "mend".into(), "guard".into(), "sweep".into()],
        resource: 30,
        requires: None,
        weapon: None,
        items: vec!["potion".into()],
    });

    catalog
}
