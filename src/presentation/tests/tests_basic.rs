#[cfg(test)]
mod tests {
    use crate::presentation::{
        Presentation, PresentationError, add_identity_rules, add_inverse_rules, from_symbols,
        remove_duplicate_rules, sort_each_rule, sort_rules,
    };
    use crate::word::WordError;

    #[test]
    fn test_add_rule_validates_letters() {
        let mut p = Presentation::new(2);
        assert_eq!(
            p.add_rule(&[0, 2], &[1]),
            Err(PresentationError::Word(WordError::LetterOutOfRange {
                letter: 2,
                alphabet_size: 2
            }))
        );
        assert!(p.add_rule(&[0, 1], &[1]).is_ok());
        assert_eq!(p.number_of_rules(), 1);
    }

    #[test]
    fn test_empty_word_needs_flag() {
        let mut p = Presentation::new(1);
        assert_eq!(
            p.add_rule(&[0, 0], &[]),
            Err(PresentationError::EmptyWordForbidden)
        );
        p.set_contains_empty_word(true);
        assert!(p.add_rule(&[0, 0], &[]).is_ok());
    }

    #[test]
    fn test_from_symbols() {
        let p = from_symbols("ab", &[("aaa", "a"), ("bbbb", "b")], false).unwrap();
        assert_eq!(p.alphabet_size(), 2);
        assert_eq!(p.number_of_rules(), 2);
        let rules: Vec<_> = p.rules().collect();
        assert_eq!(rules[0], (&vec![0, 0, 0], &vec![0]));

        assert_eq!(
            from_symbols("aa", &[], false).unwrap_err(),
            PresentationError::Word(WordError::DuplicateLetter('a'))
        );
    }

    #[test]
    fn test_identity_and_inverse_helpers() {
        let mut p = Presentation::new(3);
        p.set_contains_empty_word(true);
        add_identity_rules(&mut p, 2).unwrap();
        // e·a = a, a·e = a for both other letters, plus e·e = e.
        assert_eq!(p.number_of_rules(), 5);

        let mut q = Presentation::new(2);
        q.set_contains_empty_word(true);
        add_inverse_rules(&mut q, &[1, 0]).unwrap();
        assert_eq!(q.number_of_rules(), 2);
        let rules: Vec<_> = q.rules().collect();
        assert_eq!(rules[0], (&vec![0, 1], &vec![]));

        let mut bad = Presentation::new(2);
        bad.set_contains_empty_word(true);
        assert!(matches!(
            add_inverse_rules(&mut bad, &[0, 0]),
            Err(PresentationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rule_normalisation_helpers() {
        let mut p = Presentation::new(2);
        p.add_rule(&[0], &[0, 0]).unwrap();
        p.add_rule(&[0, 0], &[0]).unwrap();
        p.add_rule(&[1], &[1]).unwrap();

        sort_each_rule(&mut p);
        remove_duplicate_rules(&mut p);
        assert_eq!(p.number_of_rules(), 1);
        assert_eq!(p.rules().next().unwrap(), (&vec![0, 0], &vec![0]));

        let mut q = Presentation::new(2);
        q.add_rule(&[1, 1], &[1]).unwrap();
        q.add_rule(&[0, 0], &[0]).unwrap();
        sort_rules(&mut q);
        assert_eq!(q.rules().next().unwrap(), (&vec![0, 0], &vec![0]));
    }

    #[test]
    fn test_summary() {
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 0], &[1]).unwrap();
        assert_eq!(p.summary(), "semigroup presentation with 2 letters + 1 rules");
        p.set_contains_empty_word(true);
        assert!(p.summary().starts_with("monoid presentation"));
    }
}
