#[cfg(test)]
mod tests {
    use crate::element::{Bipartition, Element, ElementWithOne};
    use crate::froidure_pin::FroidurePin;

    #[test]
    fn test_identity() {
        let one = Bipartition::one_of_degree(3);
        let s = Bipartition::transposition(3, 1);
        assert_eq!(one.compose(&s), s);
        assert_eq!(s.compose(&one), s);
        assert_eq!(s.compose(&s), one);
    }

    #[test]
    fn test_generators_are_idempotent_where_expected() {
        let p = Bipartition::projection(4);
        let b = Bipartition::join(4);
        assert_eq!(p.compose(&p), p);
        assert_eq!(b.compose(&b), b);
    }

    #[test]
    fn test_projection_composition_loses_strands() {
        // Projecting away point 0 then joining 0 and 1 keeps only the
        // strand through point 1's block.
        let p = Bipartition::projection(2);
        let b = Bipartition::join(2);
        let pb = p.compose(&b);
        // Top 0 is a singleton; bottom row is one block joined with top 1.
        assert_ne!(pb.top(0), pb.top(1));
        assert_eq!(pb.bottom(0), pb.bottom(1));
        assert_eq!(pb.top(1), pb.bottom(0));
    }

    #[test]
    fn test_partition_monoid_of_degree_two() {
        // The partition monoid P_2 has Bell(4) = 15 elements.
        let mut s = FroidurePin::new(vec![
            Bipartition::transposition(2, 0),
            Bipartition::projection(2),
            Bipartition::join(2),
        ])
        .unwrap();
        assert_eq!(s.size(), 15);
    }

    #[test]
    fn test_rotation_generates_cycle() {
        let r = Bipartition::rotation(4);
        let mut power = r.clone();
        for _ in 0..3 {
            power = power.compose(&r);
        }
        assert_eq!(power, Bipartition::one_of_degree(4));
    }
}
