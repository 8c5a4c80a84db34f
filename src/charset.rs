// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The build character set

/// Punctuation included in every build
pub const PUNCTUATION: [char; 7] = ['-', '!', '?', '\'', '"', ',', '.'];

/// The set of characters rendered into an atlas
///
/// Contents are fixed: uppercase Latin `A–Z`, lowercase `a–z` (omitted in
/// caps-only mode), digits `0–9` and [`PUNCTUATION`]. The sequence is
/// ordered and free of duplicates. Note that the *packing* order is not this
/// order: the packer sorts by code point (see [`crate::build_atlas`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<char>,
    caps_only: bool,
}

impl Charset {
    /// Construct the active character set
    ///
    /// With `caps_only` set, lowercase letters are excluded; the packer later
    /// synthesizes their glyph entries as aliases of the uppercase glyphs.
    pub fn new(caps_only: bool) -> Self {
        let mut chars = Vec::with_capacity(26 + 26 + 10 + PUNCTUATION.len());
        chars.extend('A'..='Z');
        if !caps_only {
            chars.extend('a'..='z');
        }
        chars.extend('0'..='9');
        chars.extend(PUNCTUATION);
        Charset { chars, caps_only }
    }

    /// Whether lowercase letters were excluded
    #[inline]
    pub fn caps_only(&self) -> bool {
        self.caps_only
    }

    /// Number of characters
    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Iterate over the characters in set order
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

/// The uppercase alias source for a lowercase letter
///
/// Returns `Some` only for `a–z`; used by caps-only alias synthesis.
pub fn alias_source(c: char) -> Option<char> {
    c.is_ascii_lowercase().then(|| c.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set() {
        let set = Charset::new(false);
        assert_eq!(set.len(), 26 + 26 + 10 + 7);
        assert!(!set.caps_only());

        // ordered, deduplicated
        let chars: Vec<char> = set.iter().collect();
        let mut sorted = chars.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), chars.len());
        assert_eq!(chars[0], 'A');
        assert_eq!(chars[26], 'a');
    }

    #[test]
    fn caps_only_set() {
        let set = Charset::new(true);
        assert_eq!(set.len(), 26 + 10 + 7);
        assert!(set.iter().all(|c| !c.is_ascii_lowercase()));
    }

    #[test]
    fn aliases() {
        assert_eq!(alias_source('a'), Some('A'));
        assert_eq!(alias_source('z'), Some('Z'));
        assert_eq!(alias_source('A'), None);
        assert_eq!(alias_source('7'), None);
        assert_eq!(alias_source('!'), None);
    }
}
