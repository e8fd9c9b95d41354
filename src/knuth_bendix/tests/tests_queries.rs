#[cfg(test)]
mod tests {
    use crate::CongruenceKind;
    use crate::knuth_bendix::KnuthBendix;
    use crate::presentation::Presentation;
    use crate::runner::Tril;

    fn small_presentation() -> Presentation {
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 0, 0], &[0]).unwrap();
        p.add_rule(&[0], &[1, 1]).unwrap();
        p
    }

    #[test]
    fn test_normal_forms_in_shortlex_order() {
        let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();
        kb.run().unwrap();

        let forms: Vec<Vec<u8>> = kb.normal_forms().collect();
        assert_eq!(
            forms,
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
    fn test_contains_and_reduction() {
        let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();

        assert!(kb.contains(&[0, 0, 1], &[0, 0, 0, 0, 1]).unwrap());
        assert!(!kb.contains(&[0, 0, 0], &[1]).unwrap());

        // Normal-form uniqueness: reduce is idempotent and decides
        // equivalence.
        let u = kb.reduce(&[0, 1, 1, 0, 0, 1]).unwrap();
        assert_eq!(kb.reduce(&u).unwrap(), u);
        assert_eq!(
            kb.reduce(&[0, 0, 1]).unwrap(),
            kb.reduce(&[0, 0, 0, 0, 1]).unwrap()
        );
    }

    #[test]
    fn test_currently_contains_tri_valued() {
        let kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();
        // Identical reductions are definite without a run.
        assert_eq!(kb.currently_contains(&[0], &[0]).unwrap(), Tril::True);
        // 0 and 1 do not reduce together before completion.
        assert_eq!(kb.currently_contains(&[0], &[1]).unwrap(), Tril::Unknown);

        let mut kb = kb;
        kb.run().unwrap();
        assert_eq!(kb.currently_contains(&[0], &[1]).unwrap(), Tril::False);
    }

    #[test]
    fn test_substitutivity_of_equivalence() {
        let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();
        kb.run().unwrap();

        let pairs = [(vec![0u8, 0, 1], vec![0u8, 0, 0, 0, 1])];
        for (u, v) in &pairs {
            assert!(kb.contains(u, v).unwrap());
            for w in [vec![0u8], vec![1u8, 0], vec![0u8, 1, 1]] {
                let mut uw = u.clone();
                uw.extend_from_slice(&w);
                let mut vw = v.clone();
                vw.extend_from_slice(&w);
                assert!(kb.contains(&uw, &vw).unwrap());

                let mut wu = w.clone();
                wu.extend_from_slice(u);
                let mut wv = w;
                wv.extend_from_slice(v);
                assert!(kb.contains(&wu, &wv).unwrap());
            }
        }
    }

    #[test]
    fn test_finite_case_count_law() {
        let mut kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();
        let n = kb.number_of_classes().unwrap().as_finite().unwrap();
        let forms: Vec<_> = kb.normal_forms().collect();
        assert_eq!(forms.len() as u64, n);
        // All distinct and all irreducible.
        for (i, u) in forms.iter().enumerate() {
            assert_eq!(&kb.reduce(u).unwrap(), u);
            for v in &forms[i + 1..] {
                assert_ne!(u, v);
            }
        }
    }

    #[test]
    fn test_human_readable_repr() {
        let kb = KnuthBendix::new(CongruenceKind::TwoSided, small_presentation()).unwrap();
        let repr = kb.to_string();
        assert!(repr.contains("2-sided KnuthBendix"));
        assert!(repr.contains("semigroup presentation with 2 letters + 2 rules"));
        assert!(repr.contains("0 generating pairs"));
    }
}
