use serde::Serialize;

/// Canonical nucleotide symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseCode {
    /// Adenine.
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine.
    T = 3,
}

impl BaseCode {
    /// Attempt to parse an ASCII base into a [`BaseCode`].
    pub fn from_ascii(base: u8) -> Option<Self> {
        match base {
            b'A' | b'a' => Some(BaseCode::A),
            b'C' | b'c' => Some(BaseCode::C),
            b'G' | b'g' => Some(BaseCode::G),
            b'T' | b't' => Some(BaseCode::T),
            _ => None,
        }
    }

    /// Watson-Crick partner.
    pub fn complement(self) -> Self {
        match self {
            BaseCode::A => BaseCode::T,
            BaseCode::C => BaseCode::G,
            BaseCode::G => BaseCode::C,
            BaseCode::T => BaseCode::A,
        }
    }

    /// Uppercase ASCII symbol.
    pub fn to_ascii(self) -> u8 {
        match self {
            BaseCode::A => b'A',
            BaseCode::C => b'C',
            BaseCode::G => b'G',
            BaseCode::T => b'T',
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Whether `base` is one of A, C, G, T (any case).
#[inline]
pub fn is_acgt(base: u8) -> bool {
    BaseCode::from_ascii(base).is_some()
}

/// Reverse complement of an ASCII sequence.
///
/// Symbols outside the ACGT alphabet are kept (uppercased) so that callers
/// can still detect them after the transform.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&base| match BaseCode::from_ascii(base) {
            Some(code) => code.complement().to_ascii(),
            None => base.to_ascii_uppercase(),
        })
        .collect()
}

/// Per-symbol counts over a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    /// Adenine count.
    pub a: usize,
    /// Cytosine count.
    pub c: usize,
    /// Guanine count.
    pub g: usize,
    /// Thymine count.
    pub t: usize,
    /// Everything else (N, IUPAC ambiguity codes, gaps).
    pub other: usize,
}

impl Composition {
    /// Count symbols in `sequence`.
    pub fn of(sequence: &[u8]) -> Self {
        let mut counts = [0usize; 4];
        let mut other = 0usize;
        for &base in sequence {
            match BaseCode::from_ascii(base) {
                Some(code) => counts[code.index()] += 1,
                None => other += 1,
            }
        }
        Self {
            a: counts[BaseCode::A.index()],
            c: counts[BaseCode::C.index()],
            g: counts[BaseCode::G.index()],
            t: counts[BaseCode::T.index()],
            other,
        }
    }

    /// G + C.
    pub fn gc(&self) -> usize {
        self.g + self.c
    }

    /// All symbols counted, ambiguous ones included.
    pub fn total(&self) -> usize {
        self.a + self.c + self.g + self.t + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_handles_mixed_case_and_ambiguity() {
        assert_eq!(reverse_complement(b"ATGc"), b"GCAT".to_vec());
        assert_eq!(reverse_complement(b"TTA"), b"TAA".to_vec());
        assert_eq!(reverse_complement(b"AnG"), b"CNT".to_vec());
        assert!(reverse_complement(b"").is_empty());
    }

    #[test]
    fn composition_counts_every_symbol() {
        let comp = Composition::of(b"AACGTTNNg");
        assert_eq!(comp.a, 2);
        assert_eq!(comp.c, 1);
        assert_eq!(comp.g, 2);
        assert_eq!(comp.t, 2);
        assert_eq!(comp.other, 2);
        assert_eq!(comp.gc(), 3);
        assert_eq!(comp.total(), 9);
    }
}
