//! Randomised stress test against a reference map.
//!
//! Each turn builds a tree from random lowercase words, then runs random
//! get, insert, remove and longest-suffix operations, checking the tree's
//! structure after every mutation. A failing turn prints the operation log
//! and the tree contents.

use radix_suffix::Tree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const WORD_NUM: usize = 256;
const OP_NUM: usize = 2048;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const MISMATCH_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

struct Turn {
    tree: Tree<String>,
    /// Word -> whether it is currently stored
    words: HashMap<String, bool>,
    ops: Vec<String>,
}

impl Turn {
    fn new() -> Self {
        Turn {
            tree: Tree::new(),
            words: HashMap::new(),
            ops: Vec::new(),
        }
    }

    fn fail(&self, msg: String) -> ! {
        for op in &self.ops {
            eprintln!("{}", op);
        }
        eprintln!("\nWord status:");
        for (word, stored) in &self.words {
            eprintln!("{:?} {}", word, if *stored { "stored" } else { "removed" });
        }
        eprintln!("\nTree: {:?}", self.tree);
        panic!("{}", msg);
    }

    fn check_structure(&self) {
        if let Err(err) = self.tree.check_invariants() {
            self.fail(err.to_string());
        }
    }

    fn insert(&mut self, word: &str) {
        self.ops.push(format!("Insert\t{}", word));
        let stored = self.words.get(word).copied().unwrap_or(false);
        let old = self.tree.insert(word, word.to_string());
        if stored != old.is_some() {
            self.fail(format!("insert {:?} returned {:?}, stored: {}", word, old, stored));
        }
        if let Some(old) = old {
            if old != word {
                self.fail(format!("insert {:?} replaced {:?}", word, old));
            }
        }
        self.words.insert(word.to_string(), true);
        if self.tree.get(word).map(String::as_str) != Some(word) {
            self.fail(format!("expect get {:?} after insertion", word));
        }
        self.check_structure();
    }

    fn get(&mut self, word: &str) {
        self.ops.push(format!("Get\t{}", word));
        let stored = self.words[word];
        match self.tree.get(word) {
            Some(value) if !stored => {
                self.fail(format!("expect not found {:?}, got {:?}", word, value))
            }
            Some(value) if value != word => {
                self.fail(format!("expect get {:?}, got {:?}", word, value))
            }
            None if stored => self.fail(format!("expect found {:?}, got nothing", word)),
            _ => {}
        }
    }

    fn remove(&mut self, word: &str) {
        self.ops.push(format!("Remove\t{}", word));
        let stored = self.words[word];
        match self.tree.remove(word) {
            Some(value) => {
                if !stored {
                    self.fail(format!("expect not found {:?} in removal", word));
                }
                if value != word {
                    self.fail(format!("expect remove {:?}, got {:?}", word, value));
                }
                if self.tree.get(word).is_some() {
                    self.fail(format!("expect {:?} gone after removal", word));
                }
                self.check_structure();
            }
            None if stored => self.fail(format!("expect found {:?} in removal", word)),
            None => {}
        }
        self.words.insert(word.to_string(), false);
    }

    fn longest_suffix(&mut self, rng: &mut StdRng, word: &str) {
        let mut query: String = (0..rng.gen_range(0..3))
            .map(|_| MISMATCH_LETTERS[rng.gen_range(0..MISMATCH_LETTERS.len())] as char)
            .collect();
        query.push_str(word);
        self.ops.push(format!("LongestSuffix\t{}", query));

        let expected = self
            .words
            .iter()
            .filter(|(stored, present)| **present && query.ends_with(stored.as_str()))
            .map(|(stored, _)| stored.as_str())
            .max_by_key(|stored| stored.len());

        match self.tree.longest_suffix(&query) {
            Some((key, value)) => {
                if Some(key) != expected.map(str::as_bytes) || key != value.as_bytes() {
                    self.fail(format!(
                        "longest suffix of {:?}: got {:?}, expect {:?}",
                        query,
                        String::from_utf8_lossy(key),
                        expected
                    ));
                }
            }
            None if expected.is_some() => self.fail(format!(
                "longest suffix of {:?}: got nothing, expect {:?}",
                query, expected
            )),
            None => {}
        }
    }
}

fn random_word(rng: &mut StdRng) -> String {
    (0..rng.gen_range(0..12))
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

fn run_turn(rng: &mut StdRng) {
    let mut turn = Turn::new();

    while turn.words.len() < WORD_NUM {
        let word = random_word(rng);
        turn.insert(&word);
    }
    let words: Vec<String> = turn.words.keys().cloned().collect();

    for _ in 0..OP_NUM {
        let stored = turn.words.values().filter(|stored| **stored).count();
        if turn.tree.len() != stored {
            turn.fail(format!("expect len {}, got {}", stored, turn.tree.len()));
        }

        let word = &words[rng.gen_range(0..words.len())];
        match rng.gen_range(0..4) {
            0 => turn.get(word),
            1 => turn.insert(word),
            2 => turn.remove(word),
            _ => turn.longest_suffix(rng, word),
        }
    }
}

#[test]
fn stress_short() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..4 {
        run_turn(&mut rng);
    }
}

#[test]
#[ignore]
fn stress_timed() {
    let secs = std::env::var("RADIX_SUFFIX_STRESS_SECS")
        .ok()
        .and_then(|secs| secs.parse().ok())
        .unwrap_or(30);
    let deadline = Instant::now() + Duration::from_secs(secs);
    let mut rng = StdRng::from_entropy();

    let mut turns = 0;
    while Instant::now() < deadline {
        run_turn(&mut rng);
        turns += 1;
    }
    eprintln!("{} turns of stress tests passed", turns);
}
