//! Damage calculation.

// ============================================================================
// Damage Calculation
// ============================================================================

/// Calculate damage from an ability hit.
///
/// # Formula
///
/// ```text
/// raw    = floor(attack × power / 100) − defense
/// damage = max(raw, 1)   offensive abilities
/// damage = max(raw, 0)   everything else
/// ```
///
/// Critical hits are applied afterwards with [`apply_critical`].
pub fn calculate_damage(attack: u32, power: u32, defense: u32, offensive: bool) -> u32 {
    let scaled = i64::from(attack) * i64::from(power) / 100;
    let raw = scaled - i64::from(defense);
    let floor = if offensive { 1 } else { 0 };
    raw.max(floor) as u32
}

/// Multiply damage by a critical percentage (150 = ×1.5), flooring.
pub fn apply_critical(damage: u32, crit_damage_percent: u32) -> u32 {
    (u64::from(damage) * u64::from(crit_damage_percent) / 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_formula_subtracts_defense() {
        assert_eq!(calculate_damage(15, 100, 5, true), 10);
        assert_eq!(calculate_damage(15, 150, 5, true), 17);
    }

    #[test]
    fn plain_hit_at_full_power() {
        // floor(10 × 100 / 100) − 3 = 7
        assert_eq!(calculate_damage(10, 100, 3, true), 7);
    }

    #[test]
    fn offensive_damage_never_drops_below_one() {
        assert_eq!(calculate_damage(5, 100, 50, true), 1);
        assert_eq!(calculate_damage(5, 100, 50, false), 0);
    }

    #[test]
    fn critical_floors() {
        assert_eq!(apply_critical(11, 150), 16);
        assert_eq!(apply_critical(1, 150), 1);
    }
}
