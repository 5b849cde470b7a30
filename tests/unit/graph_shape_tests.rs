//! Unit tests for the static node graph shape.

use agent_parley::engine::{NodeId, StepEngine};

#[test]
fn transition_table_matches_the_fixed_graph() {
    assert_eq!(
        NodeId::Decide.successors(),
        &[NodeId::Dispatch, NodeId::Respond][..]
    );
    assert_eq!(NodeId::Dispatch.successors(), &[NodeId::Decide][..]);
    assert!(NodeId::Respond.successors().is_empty());
}

#[test]
fn labels_are_stable() {
    assert_eq!(NodeId::Decide.label(), "decide");
    assert_eq!(NodeId::Dispatch.label(), "dispatch");
    assert_eq!(NodeId::Respond.label(), "respond");
}

#[test]
fn mermaid_diagram_covers_every_edge() {
    let diagram = StepEngine::mermaid_diagram();
    assert!(diagram.starts_with("graph TD"));
    assert!(diagram.contains("decide --> dispatch"));
    assert!(diagram.contains("decide --> respond"));
    assert!(diagram.contains("dispatch --> decide"));
    assert!(diagram.contains("respond --> __end__"));
}
