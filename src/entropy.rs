/// Shannon entropy of a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Entropy {
    /// Entropy in bits per byte.
    pub bits: f64,
    /// `log2` of the number of distinct bytes seen.
    pub max_entropy: f64,
    /// `bits / max_entropy`, or 0 when fewer than two distinct bytes are seen.
    pub ratio: f64,
    /// Number of distinct bytes seen.
    pub tokens: usize,
}

/// Compute the Shannon entropy of `buf` from its byte frequencies.
pub fn shannon_entropy(buf: &[u8]) -> Entropy {
    if buf.is_empty() {
        return Entropy::default();
    }
    let mut freqs = [0u64; 256];
    for &b in buf {
        freqs[b as usize] += 1;
    }

    let total = buf.len() as f64;
    let mut tokens = 0;
    let mut sum = 0.0;
    for &freq in freqs.iter().filter(|&&f| f > 0) {
        tokens += 1;
        let p = freq as f64 / total;
        sum += p * p.log2();
    }

    // a single token sums to 0.0; negating it would give -0.0
    let bits = if sum < 0.0 { -sum } else { 0.0 };
    let max_entropy = (tokens as f64).log2();
    let ratio = if max_entropy > 0.0 {
        bits / max_entropy
    } else {
        0.0
    };
    Entropy {
        bits,
        max_entropy,
        ratio,
        tokens,
    }
}
