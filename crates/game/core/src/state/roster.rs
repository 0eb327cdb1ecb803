use super::entity::{Entity, EntityId, Faction};

/// Battle participants in registration order.
///
/// Registration order is the tie-break for equal speed and the iteration
/// order for multi-target abilities and round-start ticks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn register(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_alive)
    }

    pub fn living(&self, faction: Faction) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.faction == faction && entity.is_alive())
    }

    pub fn any_living(&self, faction: Faction) -> bool {
        self.living(faction).next().is_some()
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.is_player())
    }

    /// Removes defeated enemies, returning them in registration order.
    ///
    /// Defeated allies stay so that the battle can report them.
    pub fn prune_defeated_enemies(&mut self) -> Vec<Entity> {
        let (fallen, kept): (Vec<Entity>, Vec<Entity>) = std::mem::take(&mut self.entities)
            .into_iter()
            .partition(|entity| entity.faction == Faction::Enemy && entity.is_defeated());
        self.entities = kept;
        fallen
    }

    /// Removes and returns the player-controlled entity.
    pub fn take_player(&mut self) -> Option<Entity> {
        let index = self.entities.iter().position(Entity::is_player)?;
        Some(self.entities.remove(index))
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}
