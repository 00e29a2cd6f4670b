//! Random identifiers.

use rand::seq::SliceRandom;
use rand::Rng;

/// Alphabet of generated usernames.
pub const USERNAME_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
/// Length of generated usernames.
pub const USERNAME_LENGTH: usize = 29;
/// Alphabet of generated scene ids.
pub const SCENE_ID_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-";
/// Length of generated scene ids.
pub const SCENE_ID_LENGTH: usize = 15;

const HEX_ALPHABET: &str = "0123456789abcdef";

/// Produce a string of `length` characters drawn uniformly from `alphabet`.
///
/// An empty alphabet yields an empty string.
pub fn random_string(length: usize, alphabet: &str) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let mut rng = rand::thread_rng();
    (0..length)
        .filter_map(|_| chars.choose(&mut rng))
        .collect()
}

/// A new pairing username.
pub fn username() -> String {
    random_string(USERNAME_LENGTH, USERNAME_ALPHABET)
}

/// A new scene id.
pub fn scene_id() -> String {
    random_string(SCENE_ID_LENGTH, SCENE_ID_ALPHABET)
}

/// A light unique id such as `00:17:88:01:02:f0:5b:bc-0b`.
pub fn light_uniqueid() -> String {
    let octets: Vec<String> = (0..8).map(|_| random_string(2, HEX_ALPHABET)).collect();
    format!("{}-{}", octets.join(":"), random_string(2, HEX_ALPHABET))
}

/// Uniform index in `0..len`, or `None` when `len` is zero.
pub(crate) fn index(len: usize) -> Option<usize> {
    (len > 0).then(|| rand::thread_rng().gen_range(0..len))
}
