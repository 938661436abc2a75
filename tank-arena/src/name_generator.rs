/// Viewer name generation for participants that join without choosing a name
use markov_namegen::{CharacterChainGenerator, RandomTextGenerator};

/// Call-sign style handles used as training data
const CALL_SIGNS: &[&str] = &[
    // Armour
    "Panzer", "Sherman", "Abrams", "Tiger", "Leopard", "Centurion", "Crusader", "Matilda",
    "Chaffee", "Pershing", "Cromwell", "Churchill", "Patton", "Walker", "Stuart", "Grant",
    // Artillery
    "Howitzer", "Mortar", "Cannon", "Bombard", "Culverin", "Falcon", "Basilisk", "Saker",
    // Radio call signs
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Hotel", "India",
    "Kilo", "Lima", "Oscar", "Romeo", "Sierra", "Tango", "Victor", "Zulu",
    // Stream chat regulars
    "Sparky", "Gunner", "Rook", "Tread", "Turret", "Shell", "Spotter", "Sapper",
];

fn create_name_generator() -> CharacterChainGenerator {
    CharacterChainGenerator::builder()
        .with_order(2)
        .with_prior(0.01)
        .train(CALL_SIGNS.iter().copied())
        .build()
}

/// Generate a pronounceable call sign
///
/// Only alphanumeric names up to 12 characters are returned, so the result
/// is always a valid participant name.
pub fn generate_random_name() -> String {
    let mut generator = create_name_generator();

    loop {
        let name = generator.generate_one();
        if !name.is_empty() && name.len() <= 12 && name.chars().all(|c| c.is_alphanumeric()) {
            return name;
        }
    }
}

/// Generate a call sign with a numeric suffix, e.g. "Tanko_42"
pub fn generate_viewer_name() -> String {
    let suffix: u16 = rand::random::<u16>() % 1000;
    format!("{}_{}", generate_random_name(), suffix)
}
