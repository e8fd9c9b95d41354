#[cfg(test)]
mod tests {
    use crate::CongruenceKind;
    use crate::presentation::Presentation;
    use crate::runner::Cardinality;
    use crate::todd_coxeter::{Strategy, ToddCoxeter, ToddCoxeterConfig};
    use tracing::Level;
    use tracing_subscriber::fmt::Subscriber;

    fn init_tracing() {
        let _ = Subscriber::builder()
            .with_max_level(Level::DEBUG)
            .try_init();
    }

    /// <a, b | aaa = a, bbbb = b, ababab = aa>, a 27-element semigroup.
    fn small_two_sided() -> Presentation {
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 0, 0], &[0]).unwrap();
        p.add_rule(&[1, 1, 1, 1], &[1]).unwrap();
        p.add_rule(&[0, 1, 0, 1, 0, 1], &[0, 0]).unwrap();
        p
    }

    /// <0, 1 | 000 = 0, 0 = 11>, a 5-element semigroup.
    fn five_classes() -> Presentation {
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 0, 0], &[0]).unwrap();
        p.add_rule(&[0], &[1, 1]).unwrap();
        p
    }

    /// Coxeter presentation of the symmetric group S3.
    fn symmetric_group_3() -> Presentation {
        let mut p = Presentation::new(2);
        p.set_contains_empty_word(true);
        p.add_rule(&[0, 0], &[]).unwrap();
        p.add_rule(&[1, 1], &[]).unwrap();
        p.add_rule(&[0, 1, 0, 1, 0, 1], &[]).unwrap();
        p
    }

    #[test]
    fn test_small_two_sided_congruence_all_strategies() {
        init_tracing();
        for strategy in [
            Strategy::Hlt,
            Strategy::Felsch,
            Strategy::Cr,
            Strategy::Rc,
            Strategy::ROverC,
            Strategy::CrPrime,
        ] {
            let mut tc = ToddCoxeter::with_config(
                CongruenceKind::TwoSided,
                small_two_sided(),
                ToddCoxeterConfig {
                    strategy,
                    // Tiny phase limits so the mixed strategies really
                    // alternate on this small example.
                    hlt_defs: 8,
                    f_defs: 8,
                    ..ToddCoxeterConfig::default()
                },
            )
            .unwrap();
            assert_eq!(
                tc.number_of_classes(),
                Cardinality::Finite(27),
                "strategy {strategy:?}"
            );
            assert!(tc.finished());
        }
    }

    #[test]
    fn test_small_two_sided_congruence_with_save() {
        let mut tc = ToddCoxeter::with_config(
            CongruenceKind::TwoSided,
            small_two_sided(),
            ToddCoxeterConfig {
                save: true,
                ..ToddCoxeterConfig::default()
            },
        )
        .unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(27));
    }

    #[test]
    fn test_bulk_collapse_mode() {
        let mut tc = ToddCoxeter::with_config(
            CongruenceKind::TwoSided,
            small_two_sided(),
            ToddCoxeterConfig {
                // Any queued coincidence beyond one entry triggers bulk
                // processing.
                large_collapse: 0,
                ..ToddCoxeterConfig::default()
            },
        )
        .unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(27));
    }

    #[test]
    fn test_five_class_congruence_word_queries() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(5));

        assert_eq!(
            tc.index_of(&[0, 0, 1]).unwrap(),
            tc.index_of(&[0, 0, 0, 0, 1]).unwrap()
        );
        assert_eq!(
            tc.index_of(&[0, 1, 1, 0, 0, 1]).unwrap(),
            tc.index_of(&[0, 0, 0, 0, 1]).unwrap()
        );
        assert_ne!(tc.index_of(&[0, 0, 0]).unwrap(), tc.index_of(&[1]).unwrap());

        assert!(tc.contains(&[0, 0, 0], &[0]).unwrap());
        assert!(!tc.contains(&[0], &[1]).unwrap());
    }

    #[test]
    fn test_obviously_infinite() {
        // Free monoid on one letter.
        let p = Presentation::new(1);
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, p).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Infinite);
        assert!(!tc.finished());
    }

    #[test]
    fn test_symmetric_group_coxeter() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, symmetric_group_3()).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(6));
    }

    #[test]
    fn test_one_sided_congruence_differs_from_two_sided() {
        // The right congruence generated by (s0, empty) on S3 has the
        // cosets of <s0> as classes; the two-sided closure collapses
        // everything (transpositions generate S3).
        let mut right = ToddCoxeter::new(CongruenceKind::Right, symmetric_group_3()).unwrap();
        right.add_generating_pair(&[0], &[]).unwrap();
        assert_eq!(right.number_of_classes(), Cardinality::Finite(3));

        let mut left = ToddCoxeter::new(CongruenceKind::Left, symmetric_group_3()).unwrap();
        left.add_generating_pair(&[0], &[]).unwrap();
        assert_eq!(left.number_of_classes(), Cardinality::Finite(3));

        let mut two_sided =
            ToddCoxeter::new(CongruenceKind::TwoSided, symmetric_group_3()).unwrap();
        two_sided.add_generating_pair(&[0], &[]).unwrap();
        assert_eq!(two_sided.number_of_classes(), Cardinality::Finite(1));
    }

    #[test]
    fn test_generating_pair_collapse() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        tc.add_generating_pair(&[0], &[1]).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(1));
    }

    #[test]
    fn test_generating_pair_added_mid_run() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        // Resolve the congruence fully, then refine it further before
        // completion is declared final for the refined congruence.
        tc.run_until(|tc| tc.number_of_nodes_active() > 2);
        tc.add_generating_pair(&[0], &[1]).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(1));
    }

    #[test]
    fn test_adopted_word_graph() {
        // 0 -a-> 1 -a-> 1 satisfies aa = a; one non-trivial class.
        let mut graph = crate::word_graph::WordGraph::new(2, 1);
        graph.set_target(0, 0, 1);
        graph.set_target(1, 0, 1);
        let mut p = Presentation::new(1);
        p.add_rule(&[0, 0], &[0]).unwrap();
        let mut tc = ToddCoxeter::with_word_graph(CongruenceKind::TwoSided, p, &graph).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(1));
    }

    #[test]
    fn test_stats_track_work() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, small_two_sided()).unwrap();
        tc.run();
        let stats = tc.stats();
        assert!(stats.definitions >= 27);
    }

    #[test]
    fn test_human_readable_repr() {
        let tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        let repr = tc.to_string();
        assert!(repr.contains("2-sided ToddCoxeter"));
        assert!(repr.contains("semigroup presentation with 2 letters + 2 rules"));
    }
}
