use strum::IntoEnumIterator;

/// Visual and narrative theme of a layer; one per layer index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::EnumCount, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Biome {
    #[strum(to_string = "The Gates of Hell")]
    GatesOfHell,
    #[strum(to_string = "The Burning Plains")]
    BurningPlains,
    #[strum(to_string = "The Frozen Depths")]
    FrozenDepths,
    #[strum(to_string = "The Abyss of Pain")]
    AbyssOfPain,
    #[strum(to_string = "The Void of Souls")]
    VoidOfSouls,
    #[strum(to_string = "The Fallen Kingdom")]
    FallenKingdom,
    #[strum(to_string = "Satan's Throne")]
    SatansThrone,
}

impl Biome {
    /// Theme for a 1-based layer index. Indices past the last theme reuse it.
    pub fn for_layer(index: u8) -> Self {
        Self::iter()
            .nth(usize::from(index.saturating_sub(1)))
            .unwrap_or(Self::SatansThrone)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GatesOfHell => "The entrance to the underworld, guarded by lesser demons.",
            Self::BurningPlains => "Endless fields of fire and brimstone.",
            Self::FrozenDepths => "Ice-cold caverns where betrayers are trapped.",
            Self::AbyssOfPain => "A realm of eternal torment and suffering.",
            Self::VoidOfSouls => "Where lost souls wander in eternal darkness.",
            Self::FallenKingdom => "The realm of fallen angels and corrupted divinity.",
            Self::SatansThrone => "The final layer, where the Prince of Darkness awaits.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_map_to_themes_in_order() {
        assert_eq!(Biome::for_layer(1), Biome::GatesOfHell);
        assert_eq!(Biome::for_layer(7), Biome::SatansThrone);
        assert_eq!(Biome::for_layer(9), Biome::SatansThrone);
        assert_eq!(Biome::for_layer(3).to_string(), "The Frozen Depths");
    }
}
