use arena::{Coordinates, Orientation, Ship};
use proptest::prelude::*;

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

fn placed(length: usize, x: i32, y: i32, orientation: Orientation) -> Ship {
    let mut ship = Ship::new(length);
    ship.place(Coordinates::new(x, y), orientation).unwrap();
    ship
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn is_at_matches_occupied_range(
        length in 1usize..6,
        x in -5i32..15,
        y in -5i32..15,
        orient in orientation(),
        cx in -10i32..20,
        cy in -10i32..20,
    ) {
        let ship = placed(length, x, y, orient);
        let c = Coordinates::new(cx, cy);
        let expected = match orient {
            Orientation::Horizontal => cy == y && cx >= x && cx < x + length as i32,
            Orientation::Vertical => cx == x && cy >= y && cy < y + length as i32,
        };
        prop_assert_eq!(ship.is_at(c), expected);
        prop_assert_eq!(ship.cells().any(|cell| cell == c), expected);
        prop_assert!(!Ship::new(length).is_at(c));
    }

    #[test]
    fn sunk_after_every_cell_and_not_before(
        length in 1usize..6,
        x in 0i32..10,
        y in 0i32..10,
        orient in orientation(),
        skip in 0usize..6,
    ) {
        let ship = placed(length, x, y, orient);
        let cells: Vec<Coordinates> = ship.cells().collect();
        prop_assert_eq!(cells.len(), length);
        prop_assert!(ship.is_sunk(&cells));

        let mut partial = cells.clone();
        partial.remove(skip % length);
        prop_assert_eq!(partial.len(), length - 1);
        prop_assert!(!ship.is_sunk(&partial));
    }
}
