#[cfg(test)]
mod tests {
    use crate::word_graph::{WordGraph, WordGraphError};

    #[test]
    fn test_new_graph_is_empty() {
        let graph = WordGraph::new(3, 2);
        assert_eq!(graph.number_of_nodes(), 3);
        assert_eq!(graph.out_degree(), 2);
        assert_eq!(graph.number_of_edges(), 0);
        assert_eq!(graph.target(0, 0), None);
    }

    #[test]
    fn test_set_and_remove_target() {
        let mut graph = WordGraph::new(2, 2);
        graph.set_target(0, 1, 1);
        assert_eq!(graph.target(0, 1), Some(1));
        assert_eq!(graph.number_of_edges(), 1);

        graph.remove_target(0, 1);
        assert_eq!(graph.target(0, 1), None);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn test_add_nodes_appends() {
        let mut graph = WordGraph::new(1, 3);
        graph.set_target(0, 0, 0);
        let first = graph.add_nodes(2);
        assert_eq!(first, 1);
        assert_eq!(graph.number_of_nodes(), 3);
        // Existing edges survive growth.
        assert_eq!(graph.target(0, 0), Some(0));
        assert_eq!(graph.target(2, 0), None);
    }

    #[test]
    fn test_try_set_target_bounds() {
        let mut graph = WordGraph::new(2, 1);
        assert_eq!(
            graph.try_set_target(5, 0, 0),
            Err(WordGraphError::NodeOutOfRange { node: 5, nodes: 2 })
        );
        assert_eq!(
            graph.try_set_target(0, 3, 1),
            Err(WordGraphError::LetterOutOfRange {
                letter: 3,
                out_degree: 1
            })
        );
        assert!(graph.try_set_target(0, 0, 1).is_ok());
    }

    #[test]
    fn test_follow_path() {
        // Cycle 0 -a-> 1 -a-> 0 with a self-loop 0 -b-> 0.
        let mut graph = WordGraph::new(2, 2);
        graph.set_target(0, 0, 1);
        graph.set_target(1, 0, 0);
        graph.set_target(0, 1, 0);

        assert_eq!(graph.follow_path(0, &[0, 0]), Some(0));
        assert_eq!(graph.follow_path(0, &[0, 0, 1, 0]), Some(1));
        assert_eq!(graph.follow_path(0, &[]), Some(0));
        // b is undefined at node 1.
        assert_eq!(graph.follow_path(0, &[0, 1]), None);
    }

    #[test]
    fn test_is_complete_and_compatible() {
        let mut graph = WordGraph::new(2, 1);
        graph.set_target(0, 0, 1);
        assert!(!graph.is_complete(0..2));

        graph.set_target(1, 0, 1);
        assert!(graph.is_complete(0..2));

        // Single rule aa = a holds at node 0 and node 1.
        let lhs = vec![0u8, 0];
        let rhs = vec![0u8];
        let rules = vec![(&lhs, &rhs)];
        assert!(graph.is_compatible(0..2, rules.iter().copied()));

        // aa = a fails at node 0 once 1 -a-> 0.
        graph.set_target(1, 0, 0);
        assert!(!graph.is_compatible(0..1, rules.iter().copied()));
    }

    #[test]
    fn test_incompatible_when_path_undefined() {
        let graph = WordGraph::new(1, 1);
        let lhs = vec![0u8];
        let rhs = vec![0u8];
        let rules = vec![(&lhs, &rhs)];
        // Both paths undefined: undefined is not equal to anything.
        assert!(!graph.is_compatible(0..1, rules.iter().copied()));
    }
}
