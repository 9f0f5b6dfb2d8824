use super::*;

#[test]
fn mints_24_char_lowercase_hex_strings() {
    let minter = RandomHexMinter;
    let id = minter.mint();
    match id {
        Value::String(s) => {
            assert_eq!(s.len(), 24);
            assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
        _ => panic!("expected a string id"),
    }
}

#[test]
fn mints_are_effectively_unique() {
    let minter = RandomHexMinter;
    let a = minter.mint();
    let b = minter.mint();
    assert_ne!(a, b);
}

#[test]
fn blob_name_uses_string_ids_verbatim() {
    assert_eq!(blob_name(&Value::String("abc".to_string())), "abc");
}

#[test]
fn blob_name_falls_back_to_hex_for_non_string_ids() {
    let name = blob_name(&Value::Int(7));
    assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(name, "");
}
