#[cfg(test)]
mod tests {
    use crate::word::{Alphabet, WordError};

    #[test]
    fn test_word_round_trip() {
        let alphabet = Alphabet::new("abc").unwrap();
        let word = alphabet.word("abca").unwrap();
        assert_eq!(word, vec![0, 1, 2, 0]);
        assert_eq!(alphabet.string_of(&word), "abca");
    }

    #[test]
    fn test_empty_alphabet_is_legal() {
        let alphabet = Alphabet::new("").unwrap();
        assert!(alphabet.is_empty());
        assert_eq!(alphabet.word("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_duplicate_letter_rejected() {
        assert_eq!(
            Alphabet::new("aba").unwrap_err(),
            WordError::DuplicateLetter('a')
        );
    }

    #[test]
    fn test_unknown_letter_rejected() {
        let alphabet = Alphabet::new("ab").unwrap();
        assert_eq!(
            alphabet.word("abc").unwrap_err(),
            WordError::UnknownLetter('c')
        );
    }
}
