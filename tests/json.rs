// Test serialization using json
#![cfg(feature = "serde")]

use bitfont::{FontAsset, PixelRect, Rgb};
use serde::{de::Deserialize, ser::Serialize};
use std::cmp::PartialEq;
use std::collections::BTreeMap;
use std::fmt::Debug;

fn test<X: Debug + PartialEq + Serialize + for<'a> Deserialize<'a>>(x: X, t: &str) {
    match serde_json::to_string(&x) {
        Ok(text) => assert_eq!(text, t),
        Err(err) => panic!("Ser of '{x:?}' failed: {err}"),
    }

    match serde_json::from_str::<X>(t) {
        Ok(v) => assert_eq!(v, x),
        Err(err) => panic!("Deser of '{t}' failed: {err}"),
    }
}

#[test]
fn rgb() {
    test(Rgb(255, 0, 254), "[255,0,254]");
}

#[test]
fn rect() {
    test(
        PixelRect::new(1, 2, 10, 12),
        "{\"x\":1,\"y\":2,\"width\":10,\"height\":12}",
    );
}

#[test]
fn asset() {
    let mut glyphs = BTreeMap::new();
    glyphs.insert('A', PixelRect::new(1, 1, 8, 9));
    let asset = FontAsset {
        name: String::from("Test"),
        image_resource_id: 7,
        char_height: 9,
        glyphs,
    };
    test(
        asset,
        "{\"name\":\"Test\",\"image_resource_id\":7,\"char_height\":9,\
         \"glyphs\":{\"A\":{\"x\":1,\"y\":1,\"width\":8,\"height\":9}}}",
    );
}
