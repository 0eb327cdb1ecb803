//! Bundled data files, embedded at compile time.
//!
//! The layout matches what [`ContentFactory`](crate::ContentFactory) expects
//! in a data directory.

pub const ABILITIES_FILE: &str = "abilities.ron";
pub const ITEMS_FILE: &str = "items.ron";
pub const ENEMIES_FILE: &str = "enemies.ron";
pub const CLASSES_FILE: &str = "classes.ron";
pub const ROSTERS_FILE: &str = "rosters.ron";
pub const CONFIG_FILE: &str = "config.toml";

pub const ABILITIES: &str = include_str!("../data/abilities.ron");
pub const ITEMS: &str = include_str!("../data/items.ron");
pub const ENEMIES: &str = include_str!("../data/enemies.ron");
pub const CLASSES: &str = include_str!("../data/classes.ron");
pub const ROSTERS: &str = include_str!("../data/rosters.ron");
pub const CONFIG: &str = include_str!("../data/config.toml");
