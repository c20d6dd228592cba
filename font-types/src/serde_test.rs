//! ensure serde is working as expected

use super::*;

#[test]
fn test_serde() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct MyTypes {
        f1: Fixed,
        f3: F2Dot14,
        gid: GlyphId16,
        gid32: GlyphId,
        tag: Tag,
        point: Point<i32>,
        bbox: BoundingBox<i16>,
    }

    let my_instance = MyTypes {
        f1: Fixed::from_f64(521.5),
        f3: F2Dot14::from_f32(1.2),
        gid: GlyphId16::new(69),
        gid32: GlyphId::new(70_000),
        tag: Tag::new(b"cool"),
        point: Point::new(-5, 12),
        bbox: BoundingBox {
            x_min: -10,
            y_min: -20,
            x_max: 300,
            y_max: 700,
        },
    };

    let dumped = serde_json::to_string(&my_instance).unwrap();
    assert!(dumped.contains("\"cool\""));
    let loaded: MyTypes = serde_json::from_str(&dumped).unwrap();
    assert_eq!(my_instance, loaded)
}
