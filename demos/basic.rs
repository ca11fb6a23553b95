//! Tour of the tree's operations.
//!
//! Run with `cargo run --example basic`.

use radix_suffix::Tree;

fn main() {
    let mut tree = Tree::new();

    // Insert hands back the value it replaced
    tree.insert("sth", "sth");
    if let Some(old) = tree.insert("sth", "else") {
        println!("replaced: {}", old);
    }
    if let Some(value) = tree.get("sth") {
        println!("get sth: {}", value);
    }

    // Longest stored key that the query ends with
    tree.insert("table", "table");
    tree.insert("able", "able");
    tree.insert("present", "present");
    if let Some((key, value)) = tree.longest_suffix("presentable") {
        println!("matched key: {} -> {}", String::from_utf8_lossy(key), value);
    }

    if let Some(old) = tree.remove("sth") {
        println!("removed: {}", old);
    }
    if tree.get("sth").is_none() {
        println!("already removed");
    }

    println!("walk:");
    tree.walk(|key, value| {
        println!("  {} -> {}", String::from_utf8_lossy(key), value);
        false
    });

    println!("walk keys ending with \"able\", stopping at the first:");
    tree.walk_suffix("able", |key, _| {
        println!("  {}", String::from_utf8_lossy(key));
        true
    });

    let view = tree.view_suffix("able");
    println!("{} keys end with {:?}", view.len(), String::from_utf8_lossy(view.suffix()));
}
