#![cfg(feature = "serde")]

use vanguard_nav::{CostPatch, GridCell, WorldPos};

#[test]
fn grid_cell_roundtrips_through_json() {
    let cell = GridCell::new(7, -3);
    let json = serde_json::to_string(&cell).unwrap();
    let back: GridCell = serde_json::from_str(&json).unwrap();
    assert_eq!(cell, back);
}

#[test]
fn cost_patch_roundtrips_through_json() {
    let patch = CostPatch {
        cell: GridCell::new(2, 5),
        cost: 1.25,
    };
    let json = serde_json::to_string(&patch).unwrap();
    let back: CostPatch = serde_json::from_str(&json).unwrap();
    assert_eq!(patch, back);
}

#[test]
fn world_pos_roundtrips_through_json() {
    let pos = WorldPos::new(123.5, -0.25);
    let json = serde_json::to_string(&pos).unwrap();
    let back: WorldPos = serde_json::from_str(&json).unwrap();
    assert_eq!(pos, back);
}
