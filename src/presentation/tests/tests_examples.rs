#[cfg(test)]
mod tests {
    use crate::CongruenceKind;
    use crate::presentation::{PresentationError, examples};
    use crate::runner::Cardinality;
    use crate::todd_coxeter::ToddCoxeter;

    fn classes(p: crate::presentation::Presentation) -> Cardinality {
        ToddCoxeter::new(CongruenceKind::TwoSided, p)
            .unwrap()
            .number_of_classes()
    }

    #[test]
    fn test_symmetric_group() {
        assert_eq!(classes(examples::symmetric_group(1).unwrap()), Cardinality::Finite(1));
        assert_eq!(classes(examples::symmetric_group(3).unwrap()), Cardinality::Finite(6));
        assert_eq!(classes(examples::symmetric_group(4).unwrap()), Cardinality::Finite(24));
        assert!(matches!(
            examples::symmetric_group(0),
            Err(PresentationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_full_transformation_monoid_small() {
        assert_eq!(
            classes(examples::full_transformation_monoid(2).unwrap()),
            Cardinality::Finite(4)
        );
        assert_eq!(
            classes(examples::full_transformation_monoid(3).unwrap()),
            Cardinality::Finite(27)
        );
        assert!(examples::full_transformation_monoid(1).is_err());
    }

    #[test]
    fn test_symmetric_inverse_monoid_small() {
        // |I_n| = sum C(n, k)^2 k!.
        assert_eq!(
            classes(examples::symmetric_inverse_monoid(2).unwrap()),
            Cardinality::Finite(7)
        );
        assert_eq!(
            classes(examples::symmetric_inverse_monoid(3).unwrap()),
            Cardinality::Finite(34)
        );
        assert!(examples::symmetric_inverse_monoid(17).is_err());
    }

    #[test]
    fn test_partition_monoid_small() {
        // |P_n| = Bell(2n).
        assert_eq!(
            classes(examples::partition_monoid(2).unwrap()),
            Cardinality::Finite(15)
        );
        assert!(examples::partition_monoid(1).is_err());
    }

    #[test]
    fn test_temperley_lieb_monoid() {
        // Catalan numbers 5, 14, 42.
        assert_eq!(
            classes(examples::temperley_lieb_monoid(3).unwrap()),
            Cardinality::Finite(5)
        );
        assert_eq!(
            classes(examples::temperley_lieb_monoid(4).unwrap()),
            Cardinality::Finite(14)
        );
        assert_eq!(
            classes(examples::temperley_lieb_monoid(5).unwrap()),
            Cardinality::Finite(42)
        );
    }

    #[test]
    fn test_stylic_monoid() {
        // |Styl(n)| = Bell(n + 1): 2, 5, 15.
        assert_eq!(classes(examples::stylic_monoid(1).unwrap()), Cardinality::Finite(2));
        assert_eq!(classes(examples::stylic_monoid(2).unwrap()), Cardinality::Finite(5));
        assert_eq!(classes(examples::stylic_monoid(3).unwrap()), Cardinality::Finite(15));
    }

    #[test]
    fn test_infinite_families() {
        assert_eq!(classes(examples::plactic_monoid(2).unwrap()), Cardinality::Infinite);
        assert_eq!(classes(examples::chinese_monoid(2).unwrap()), Cardinality::Infinite);
    }

    #[test]
    fn test_monogenic_semigroup() {
        assert_eq!(
            classes(examples::monogenic_semigroup(2, 3).unwrap()),
            Cardinality::Finite(4)
        );
        assert_eq!(
            classes(examples::monogenic_semigroup(1, 1).unwrap()),
            Cardinality::Finite(1)
        );
        assert!(examples::monogenic_semigroup(0, 1).is_err());
    }

    #[test]
    fn test_fibonacci_semigroup_shape() {
        let p = examples::fibonacci_semigroup(2, 5).unwrap();
        assert_eq!(p.alphabet_size(), 5);
        assert_eq!(p.number_of_rules(), 5);
        assert!(!p.contains_empty_word());
        assert!(examples::fibonacci_semigroup(1, 5).is_err());
    }
}
