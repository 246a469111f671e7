//! Character roster and boss parameter tables passed to the game contract constructor.

use alloy_core::primitives::U256;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A playable character, minted as an NFT by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub image_url: String,
    pub hp: u64,
    pub attack: u64,
    pub power_attack: u64,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        image_url: impl Into<String>,
        hp: u64,
        attack: u64,
        power_attack: u64,
    ) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            hp,
            attack,
            power_attack,
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Character #{} has an empty name", index);
        }
        if self.hp == 0 || self.attack == 0 || self.power_attack == 0 {
            anyhow::bail!(
                "Character #{} ({}) must have hp, attack and power_attack greater than zero",
                index,
                self.name
            );
        }
        Ok(())
    }
}

/// The boss every minted character fights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRecord {
    pub name: String,
    pub image_url: String,
    pub hp: u64,
    pub attack: u64,
}

impl BossRecord {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>, hp: u64, attack: u64) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            hp,
            attack,
        }
    }

    /// The default boss used by the `boss` preset.
    pub fn bald_bull() -> Self {
        Self::new(
            "Bald Bull",
            "https://charactersdb.com/wp-content/uploads/bald-bull-punch-out.jpg",
            10_000,
            50,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Boss has an empty name");
        }
        if self.hp == 0 || self.attack == 0 {
            anyhow::bail!("Boss {} must have hp and attack greater than zero", self.name);
        }
        Ok(())
    }
}

/// Column-major view of a roster, in the argument order of the contract constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterColumns {
    pub names: Vec<String>,
    pub image_urls: Vec<String>,
    pub hp: Vec<U256>,
    pub attack: Vec<U256>,
    pub power_attack: Vec<U256>,
}

/// Ordered list of characters. The position in the list is the character index used by
/// `mintCharacter`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterRoster(Vec<Character>);

impl CharacterRoster {
    pub fn new(characters: Vec<Character>) -> Self {
        Self(characters)
    }

    /// Build a roster from five parallel arrays, as the contract constructor takes them.
    pub fn from_columns(
        names: Vec<String>,
        image_urls: Vec<String>,
        hp: Vec<u64>,
        attack: Vec<u64>,
        power_attack: Vec<u64>,
    ) -> Result<Self> {
        let len = names.len();
        if [image_urls.len(), hp.len(), attack.len(), power_attack.len()]
            .iter()
            .any(|l| *l != len)
        {
            anyhow::bail!(
                "Roster columns have mismatched lengths: names={}, image_urls={}, hp={}, attack={}, power_attack={}",
                len,
                image_urls.len(),
                hp.len(),
                attack.len(),
                power_attack.len()
            );
        }

        let characters = names
            .into_iter()
            .zip(image_urls)
            .zip(hp)
            .zip(attack)
            .zip(power_attack)
            .map(|((((name, image_url), hp), attack), power_attack)| Character {
                name,
                image_url,
                hp,
                attack,
                power_attack,
            })
            .collect();

        Ok(Self(characters))
    }

    /// The six Punch-Out!! fighters deployed by default.
    pub fn punch_out() -> Self {
        Self(vec![
            Character::new(
                "Mike Tyson",
                "https://charactersdb.com/wp-content/uploads/mike-tyson-punch-out-1.jpg",
                1000,
                90,
                300,
            ),
            Character::new(
                "Piston Honda",
                "https://charactersdb.com/wp-content/uploads/piston-honda-punch-out.jpg",
                900,
                30,
                80,
            ),
            Character::new(
                "Mr. Sandman",
                "https://charactersdb.com/wp-content/uploads/mr.sandman-punch-out.jpg",
                700,
                50,
                100,
            ),
            Character::new(
                "Soda Popinksi",
                "https://charactersdb.com/wp-content/uploads/soda-popinski-punch-out.jpg",
                600,
                60,
                120,
            ),
            Character::new(
                "Super Macho Man",
                "https://charactersdb.com/wp-content/uploads/super-macho-man-punch-out.jpg",
                500,
                70,
                150,
            ),
            Character::new(
                "Von Kaiser",
                "https://charactersdb.com/wp-content/uploads/von-kaiser-punch-out-nes.jpg",
                400,
                80,
                200,
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn characters(&self) -> &[Character] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Character> {
        self.0.get(index)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            anyhow::bail!("Character roster is empty");
        }
        for (index, character) in self.0.iter().enumerate() {
            character.validate(index)?;
        }
        Ok(())
    }

    /// Split the roster into the constructor's parallel arrays.
    pub fn columns(&self) -> RosterColumns {
        let mut columns = RosterColumns {
            names: Vec::with_capacity(self.len()),
            image_urls: Vec::with_capacity(self.len()),
            hp: Vec::with_capacity(self.len()),
            attack: Vec::with_capacity(self.len()),
            power_attack: Vec::with_capacity(self.len()),
        };

        for c in &self.0 {
            columns.names.push(c.name.clone());
            columns.image_urls.push(c.image_url.clone());
            columns.hp.push(U256::from(c.hp));
            columns.attack.push(U256::from(c.attack));
            columns.power_attack.push(U256::from(c.power_attack));
        }

        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punch_out_roster_is_valid() {
        let roster = CharacterRoster::punch_out();
        assert_eq!(roster.len(), 6);
        assert!(roster.validate().is_ok());
        assert_eq!(roster.get(0).unwrap().name, "Mike Tyson");
        assert_eq!(roster.get(5).unwrap().power_attack, 200);
    }

    #[test]
    fn test_columns_keep_index_alignment() {
        let columns = CharacterRoster::punch_out().columns();

        assert_eq!(columns.names.len(), 6);
        assert_eq!(columns.image_urls.len(), 6);
        assert_eq!(columns.hp.len(), 6);
        assert_eq!(columns.attack.len(), 6);
        assert_eq!(columns.power_attack.len(), 6);

        assert_eq!(columns.names[2], "Mr. Sandman");
        assert_eq!(columns.hp[2], U256::from(700));
        assert_eq!(columns.attack[2], U256::from(50));
        assert_eq!(columns.power_attack[2], U256::from(100));
    }

    #[test]
    fn test_from_columns_rejects_mismatched_lengths() {
        let result = CharacterRoster::from_columns(
            vec!["a".to_string(), "b".to_string()],
            vec!["ia".to_string(), "ib".to_string()],
            vec![10, 20],
            vec![1],
            vec![5, 6],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_columns_builds_records() {
        let roster = CharacterRoster::from_columns(
            vec!["a".to_string(), "b".to_string()],
            vec!["ia".to_string(), "ib".to_string()],
            vec![10, 20],
            vec![1, 2],
            vec![5, 6],
        )
        .unwrap();

        assert_eq!(roster.get(1), Some(&Character::new("b", "ib", 20, 2, 6)));
    }

    #[test]
    fn test_validate_rejects_zero_stats() {
        let roster = CharacterRoster::new(vec![Character::new("a", "ia", 10, 0, 5)]);
        assert!(roster.validate().is_err());

        let boss = BossRecord::new("boss", "img", 0, 10);
        assert!(boss.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_roster() {
        assert!(CharacterRoster::default().validate().is_err());
    }
}
