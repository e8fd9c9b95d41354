#[cfg(test)]
mod tests {
    use crate::CongruenceKind;
    use crate::presentation::Presentation;
    use crate::runner::{Cardinality, Tril};
    use crate::todd_coxeter::ToddCoxeter;
    use crate::word::WordOrder;

    fn five_classes() -> Presentation {
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 0, 0], &[0]).unwrap();
        p.add_rule(&[0], &[1, 1]).unwrap();
        p
    }

    #[test]
    fn test_shortlex_standardization() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        tc.run();
        tc.standardize(WordOrder::Shortlex);
        assert!(tc.is_standardized());
        assert!(tc.is_standardized_as(WordOrder::Shortlex));

        assert_eq!(tc.word_of(0).unwrap(), vec![0]);
        assert_eq!(tc.word_of(1).unwrap(), vec![1]);
        assert_eq!(tc.word_of(2).unwrap(), vec![0, 0]);
        assert_eq!(
            tc.normal_forms().unwrap(),
            vec![
                vec![0],
                vec![1],
                vec![0, 0],
                vec![0, 1],
                vec![0, 0, 1],
            ]
        );
    }

    #[test]
    fn test_lex_standardization() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        tc.run();
        tc.standardize(WordOrder::Lex);
        assert!(tc.is_standardized_as(WordOrder::Lex));
        assert!(!tc.is_standardized_as(WordOrder::Shortlex));

        assert_eq!(tc.word_of(0).unwrap(), vec![0]);
        assert_eq!(tc.word_of(1).unwrap(), vec![0, 0]);
        assert_eq!(tc.word_of(2).unwrap(), vec![0, 0, 1]);
        assert_eq!(tc.word_of(3).unwrap(), vec![0, 0, 1, 0]);
        assert_eq!(tc.word_of(4).unwrap(), vec![1]);
        assert_eq!(tc.index_of(&[0, 0, 0, 1]).unwrap(), 3);
        assert_eq!(tc.index_of(&[0, 1]).unwrap(), 3);
    }

    #[test]
    fn test_standardization_is_idempotent() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        tc.run();
        assert!(tc.standardize(WordOrder::Shortlex));
        assert!(!tc.standardize(WordOrder::Shortlex));
        assert!(tc.standardize(WordOrder::Lex));
        assert!(tc.standardize(WordOrder::Shortlex));
    }

    #[test]
    fn test_every_order_gives_consistent_numbering() {
        for order in [WordOrder::Shortlex, WordOrder::Lex, WordOrder::Recursive] {
            let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
            tc.run();
            tc.standardize(order);
            let forms = tc.normal_forms().unwrap();
            assert_eq!(forms.len(), 5);
            for (i, w) in forms.iter().enumerate() {
                assert_eq!(tc.index_of(w).unwrap(), i, "order {order:?}");
            }
            // All normal forms name distinct classes.
            for (i, u) in forms.iter().enumerate() {
                for v in &forms[i + 1..] {
                    assert_ne!(u, v);
                }
            }
        }
    }

    #[test]
    fn test_currently_contains_is_tri_valued() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        assert_eq!(tc.currently_contains(&[0], &[0]).unwrap(), Tril::True);
        assert_eq!(tc.currently_contains(&[0], &[1]).unwrap(), Tril::Unknown);

        tc.run();
        assert_eq!(
            tc.currently_contains(&[0, 0, 1], &[0, 0, 0, 0, 1]).unwrap(),
            Tril::True
        );
        assert_eq!(tc.currently_contains(&[0], &[1]).unwrap(), Tril::False);
    }

    #[test]
    fn test_non_trivial_classes() {
        let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, five_classes()).unwrap();
        assert_eq!(tc.number_of_classes(), Cardinality::Finite(5));
        let classes = tc
            .non_trivial_classes([
                vec![0],
                vec![1],
                vec![0, 0],
                vec![0, 1],
                vec![0, 0, 1],
                vec![0, 0, 0],
                vec![1, 1],
            ])
            .unwrap();
        assert_eq!(classes, vec![vec![vec![0], vec![0, 0, 0], vec![1, 1]]]);
    }
}
