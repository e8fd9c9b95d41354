#[cfg(test)]
mod tests {
    use crate::presentation::{Presentation, obviously_infinite};

    #[test]
    fn test_free_monoid_is_obviously_infinite() {
        let p = Presentation::new(2);
        assert!(obviously_infinite(&p, &[]));
    }

    #[test]
    fn test_balanced_rules_are_not_caught() {
        // Every rule preserves letter counts; the abelianisation is
        // Z^2, but the rank check needs unbalanced rules to see it.
        let mut p = Presentation::new(2);
        p.add_rule(&[0, 1], &[1, 0]).unwrap();
        assert!(obviously_infinite(&p, &[]));

        // A rule system of full abelianised rank is not obviously
        // infinite, even when letters collapse.
        let mut q = Presentation::new(2);
        q.add_rule(&[0, 0], &[0]).unwrap();
        q.add_rule(&[1, 1, 1], &[1]).unwrap();
        assert!(!obviously_infinite(&q, &[]));
    }

    #[test]
    fn test_extra_pairs_contribute_rank() {
        // One letter, no rules: infinite; with the pair a^2 = a: caught
        // as not obviously infinite.
        let p = Presentation::new(1);
        assert!(obviously_infinite(&p, &[]));
        assert!(!obviously_infinite(&p, &[(vec![0, 0], vec![0])]));
    }

    #[test]
    fn test_empty_alphabet() {
        let p = Presentation::new(0);
        assert!(!obviously_infinite(&p, &[]));
    }
}
