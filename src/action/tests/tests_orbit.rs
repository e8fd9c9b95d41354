#[cfg(test)]
mod tests {
    use crate::action::{Action, ActionSide};

    #[test]
    fn test_orbit_of_rotation() {
        // One generator: rotate a point of Z/6 by +2; the orbit of 0 is
        // {0, 2, 4}.
        let mut orbit = Action::new(ActionSide::Right, vec![2u8], |g, p: &u8| (p + g) % 6);
        orbit.add_seed(0);
        orbit.run();

        assert_eq!(orbit.len(), 3);
        assert!(orbit.is_done());
        assert_eq!(orbit.position(&4), Some(2));
        assert_eq!(orbit.position(&1), None);
        assert_eq!(*orbit.point(1), 2);
    }

    #[test]
    fn test_orbit_graph_and_schreier_tree() {
        // Generators +1 and +3 on Z/4: orbit of 0 is everything.
        let mut orbit = Action::new(ActionSide::Right, vec![1u8, 3u8], |g, p: &u8| (p + g) % 4);
        orbit.add_seed(0);
        orbit.run();

        assert_eq!(orbit.len(), 4);
        // The orbit graph is complete over both generators.
        assert!(orbit.graph().is_complete(0..4));

        // Witness words reproduce their points.
        for index in 0..orbit.len() {
            let word = orbit.word_to(index);
            let mut point = 0u8;
            for letter in word {
                point = (point + [1u8, 3u8][usize::from(letter)]) % 4;
            }
            assert_eq!(point, *orbit.point(index));
        }
    }

    #[test]
    fn test_multiple_seeds_and_batching() {
        let mut orbit = Action::new(ActionSide::Left, vec![10u8], |g, p: &u8| {
            p.saturating_add(*g).min(40)
        });
        orbit.add_seed(0);
        orbit.add_seed(5);
        assert_eq!(orbit.len(), 2);

        // Drive the closure one point at a time.
        let mut steps = 0;
        while !orbit.is_done() {
            assert_eq!(orbit.process_batch(1), 1);
            steps += 1;
        }
        // 0 -> 10 -> 20 -> 30 -> 40 and 5 -> 15 -> 25 -> 35 -> 40 (40 fixed).
        assert_eq!(orbit.len(), 9);
        assert_eq!(steps, 9);
        assert_eq!(orbit.position(&40), Some(8));
    }
}
