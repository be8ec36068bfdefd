/// One inflected form from the `exchange` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflection<'a> {
    /// Form code: `p` past tense, `d` past participle, `i` present
    /// participle, `3` third person singular, `r` comparative, `t`
    /// superlative, `s` plural, `0` lemma, `1` lemma form kind.
    pub code: &'a str,
    pub word: &'a str,
}

/// Splits an exchange string like `p:loved/3:loves/i:loving` into its
/// segments. Segments without a `:` are skipped; only the first `:` splits.
pub fn parse_exchange(exchange: &str) -> impl Iterator<Item = Inflection<'_>> {
    exchange
        .split('/')
        .filter_map(|segment| segment.split_once(':'))
        .map(|(code, word)| Inflection { code, word })
}
