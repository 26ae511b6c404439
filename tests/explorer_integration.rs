//! Explorer tree building over stub graphs and real figures

mod common;

use std::sync::Arc;

use common::builders::{stub_axes, FigureBuilder};
use common::stubs::{drawable, StubBuilder, StubObject};
use figure_forge::drawable::{same_object, DrawableRef};
use figure_forge::explorer::{ExplorerTree, NodeId, TreeError, MAX_DEPTH};
use proptest::prelude::*;

#[test]
fn test_stub_tree_labels_and_order() {
    let fixture = stub_axes("main");
    let figure = StubBuilder::new("Figure").child(drawable(&fixture.axes)).build();

    let tree = ExplorerTree::build(&drawable(&figure)).unwrap();
    let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Figure", "Axes - main", "Line2D - signal", "XAxis", "Text"]
    );

    let line = tree.iter().find(|n| n.type_name == "Line2D").unwrap();
    assert_eq!(line.depth, 2);
    assert_eq!(tree.ancestors(line.id), vec![NodeId::ROOT, NodeId(1)]);
}

#[test]
fn test_restore_by_identity_after_rebuild() {
    let fixture = stub_axes("main");
    let root = drawable(&fixture.axes);
    let line = drawable(&fixture.line);

    let before = ExplorerTree::build(&root).unwrap();
    let old_id = before.restore(&line).unwrap();

    // A new first child shifts every id after it
    fixture.axes.insert_child(0, drawable(&StubBuilder::new("Text").build()));
    let after = ExplorerTree::build(&root).unwrap();
    let new_id = after.restore(&line).unwrap();

    assert_ne!(new_id, old_id);
    let node = after.node(new_id).unwrap();
    assert!(same_object(&node.object().unwrap(), &line));
    assert_eq!(node.label, before.node(old_id).unwrap().label);
}

#[test]
fn test_dropped_objects_are_not_restored() {
    let fixture = stub_axes("main");
    let root = drawable(&fixture.axes);
    let tree = ExplorerTree::build(&root).unwrap();

    let stranger: DrawableRef = StubBuilder::new("Line2D").build();
    assert!(tree.restore(&stranger).is_none());
}

#[test]
fn test_cycle_is_reported_as_too_deep() {
    let a = StubBuilder::new("Group").build();
    let b = StubBuilder::new("Group").child(drawable(&a)).build();
    a.add_child(drawable(&b));

    let err = ExplorerTree::build(&drawable(&a)).unwrap_err();
    match err {
        TreeError::TooDeep { limit, .. } => assert_eq!(limit, MAX_DEPTH),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_real_figure_tree() {
    let fig = FigureBuilder::new()
        .axes("left", vec![vec![(0.0, 1.0), (1.0, 2.0)]])
        .axes("right", vec![vec![(0.0, 0.0)], vec![(1.0, 1.0)]])
        .with_legend()
        .build();
    let root: DrawableRef = fig;
    let tree = ExplorerTree::build(&root).unwrap();

    let lines = tree.iter().filter(|n| n.type_name == "Line2D").count();
    let legends = tree.iter().filter(|n| n.type_name == "Legend").count();
    assert_eq!(lines, 3);
    assert_eq!(legends, 2);
    assert_eq!(tree.children(NodeId::ROOT).count(), 2);
}

/// Build a stub tree from a list of child counts, breadth first
fn build_shape(counts: &[usize]) -> (Arc<StubObject>, usize) {
    let root = StubBuilder::new("Node").build();
    let mut frontier = vec![root.clone()];
    let mut total = 1;
    for &count in counts {
        let Some(parent) = frontier.first().cloned() else {
            break;
        };
        frontier.remove(0);
        for _ in 0..count {
            let child = StubBuilder::new("Node").build();
            parent.add_child(drawable(&child));
            frontier.push(child);
            total += 1;
        }
    }
    (root, total)
}

proptest! {
    #[test]
    fn prop_tree_is_consistent_preorder(counts in prop::collection::vec(0usize..4, 0..12)) {
        let (root, total) = build_shape(&counts);
        let tree = ExplorerTree::build(&drawable(&root)).unwrap();

        prop_assert_eq!(tree.len(), total);
        for (i, node) in tree.iter().enumerate() {
            prop_assert_eq!(node.id, NodeId(i as u32));
            for child in &node.children {
                let child_node = tree.node(*child).unwrap();
                prop_assert_eq!(child_node.parent, node.id);
                prop_assert_eq!(child_node.depth, node.depth + 1);
                prop_assert!(child.0 > node.id.0);
            }
        }
    }
}
