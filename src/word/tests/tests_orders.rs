#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::word::{WordOrder, lex_cmp, recursive_path_cmp, shortlex_cmp};

    #[test]
    fn test_shortlex_length_first() {
        assert_eq!(shortlex_cmp(&[0, 1], &[2]), Ordering::Greater);
        assert_eq!(shortlex_cmp(&[2], &[0, 1]), Ordering::Less);
        assert_eq!(shortlex_cmp(&[0, 1], &[0, 2]), Ordering::Less);
        assert_eq!(shortlex_cmp(&[], &[0]), Ordering::Less);
        assert_eq!(shortlex_cmp(&[1, 1], &[1, 1]), Ordering::Equal);
    }

    #[test]
    fn test_lex_prefix_precedes_extension() {
        assert_eq!(lex_cmp(&[0], &[0, 0]), Ordering::Less);
        assert_eq!(lex_cmp(&[0, 0, 1], &[0, 1]), Ordering::Less);
        assert_eq!(lex_cmp(&[1], &[0, 1, 1]), Ordering::Greater);
    }

    #[test]
    fn test_recursive_path_powers_below_larger_letter() {
        // a^k < b for every k under the recursive path order.
        for k in 1..10 {
            let u = vec![0u8; k];
            assert_eq!(recursive_path_cmp(&u, &[1]), Ordering::Less);
            assert_eq!(recursive_path_cmp(&[1], &u), Ordering::Greater);
        }
    }

    #[test]
    fn test_recursive_path_is_total_on_small_words() {
        // Strict total order: trichotomy and antisymmetry over all words of
        // length <= 3 on two letters.
        let mut words: Vec<Vec<u8>> = vec![vec![]];
        for len in 1..=3 {
            for n in 0..(1 << len) {
                words.push((0..len).map(|i| ((n >> i) & 1) as u8).collect());
            }
        }
        for u in &words {
            assert_eq!(recursive_path_cmp(u, u), Ordering::Equal);
            for v in &words {
                if u != v {
                    let uv = recursive_path_cmp(u, v);
                    let vu = recursive_path_cmp(v, u);
                    assert_ne!(uv, Ordering::Equal, "{u:?} vs {v:?}");
                    assert_eq!(uv, vu.reverse(), "{u:?} vs {v:?}");
                }
            }
        }
    }

    #[test]
    fn test_recursive_path_subword_smaller() {
        assert_eq!(recursive_path_cmp(&[1], &[0, 1]), Ordering::Less);
        assert_eq!(recursive_path_cmp(&[0, 1], &[0, 0, 1]), Ordering::Less);
        assert_eq!(recursive_path_cmp(&[], &[0]), Ordering::Less);
    }

    #[test]
    fn test_word_order_dispatch() {
        assert_eq!(WordOrder::Shortlex.compare(&[1], &[0, 0]), Ordering::Less);
        assert_eq!(WordOrder::Lex.compare(&[1], &[0, 0]), Ordering::Greater);
        assert_eq!(WordOrder::default(), WordOrder::Shortlex);
    }
}
