use super::*;

#[test]
fn test_identifier_is_interned_once() {
    let a = Name::identifier("member");
    let b = Name::identifier("member");
    assert_eq!(a, b);
    assert_eq!(a.atom(), b.atom());
    assert_eq!(&*a.as_str(), "member");
}

#[test]
fn test_special_names_are_distinct_from_identifiers() {
    let init = Name::init();
    assert!(init.is_special());
    assert_eq!(init.to_string(), "<init>");
    assert!(!Name::identifier("init").is_special());
    assert_ne!(init, Name::identifier("init"));
}

#[test]
fn test_sharded_interner_roundtrip_across_shards() {
    let interner = ShardedInterner::new();
    let atoms: Vec<Atom> = (0..200)
        .map(|i| interner.intern(&format!("name{i}")))
        .collect();
    for (i, atom) in atoms.iter().enumerate() {
        assert_eq!(&*interner.resolve(*atom), format!("name{i}").as_str());
    }
    assert_eq!(interner.len(), 201);
}

#[test]
fn test_empty_string_is_none_atom() {
    let interner = ShardedInterner::new();
    assert_eq!(interner.intern(""), Atom::NONE);
    assert!(interner.is_empty());
}

#[test]
fn test_name_serializes_as_text() {
    let json = serde_json::to_string(&Name::identifier("copy")).unwrap();
    assert_eq!(json, "\"copy\"");
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "could not be interned")]
fn test_poisoned_shard_does_not_collapse_to_the_empty_name() {
    let interner = ShardedInterner::new();
    let shard = &interner.shards[ShardedInterner::shard_for("victim")];
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = shard.state.write();
        panic!("poison the shard");
    }));
    interner.intern("victim");
}
